use std::env;
use std::path::PathBuf;

fn main() {
    // Get the target directory
    let out_path = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };
    let target_dir = match out_path.ancestors().nth(3) {
        Some(dir) => dir.to_path_buf(),
        None => return,
    };

    // Copy header file next to the static library
    let header_src = "include/pdf_compressor_core.h";
    let header_dst = target_dir.join("pdf_compressor_core.h");

    if std::path::Path::new(header_src).exists() {
        if let Err(e) = std::fs::copy(header_src, &header_dst) {
            println!("cargo:warning=Failed to copy header file: {}", e);
        }
        println!("cargo:rerun-if-changed={}", header_src);
    }

    println!("cargo:rerun-if-changed=build.rs");
}
