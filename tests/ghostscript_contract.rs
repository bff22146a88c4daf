//! Drives the real process path with stand-in `gs` scripts.
#![cfg(unix)]

use once_cell::sync::Lazy;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use pdf_compressor_core::domains::compression::{CompressionConfig, CompressionJob, JobStatus, QualityLevel};
use pdf_compressor_core::ErrorKind;

// Records its arguments, one per line, followed by the staged input.
const ECHO_GS: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "10.02.1"; exit 0; fi
out=""
for arg in "$@"; do
  case "$arg" in
    -sOutputFile=*) out="${arg#-sOutputFile=}" ;;
  esac
  last="$arg"
done
{ printf '%s\n' "$@"; cat "$last"; } > "$out"
"#;

const FAILING_GS: &str = r#"#!/bin/sh
echo "Error: /syntaxerror in --token--" >&2
exit 1
"#;

const SILENT_GS: &str = "#!/bin/sh\nexit 0\n";

const EMPTY_GS: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -sOutputFile=*) : > "${arg#-sOutputFile=}" ;;
  esac
done
"#;

const SLOW_GS: &str = "#!/bin/sh\nsleep 5\n";

struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    fn tool(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }
}

// All scripts are written before any test spawns a process, so no child can
// inherit a write handle to an executable (ETXTBSY).
static FIXTURES: Lazy<Fixtures> = Lazy::new(|| {
    let dir = tempfile::tempdir().unwrap();
    for (name, body, mode) in [
        ("echo-gs", ECHO_GS, 0o755),
        ("failing-gs", FAILING_GS, 0o755),
        ("silent-gs", SILENT_GS, 0o755),
        ("empty-gs", EMPTY_GS, 0o755),
        ("slow-gs", SLOW_GS, 0o755),
        ("not-executable-gs", ECHO_GS, 0o644),
    ] {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
    }
    Fixtures { dir }
});

fn fixtures() -> &'static Fixtures {
    &FIXTURES
}

fn job(tool: String, work_root: &Path) -> CompressionJob {
    CompressionJob::with_ghostscript(CompressionConfig {
        ghostscript_path: tool,
        work_dir: Some(work_root.to_path_buf()),
        ..CompressionConfig::default()
    })
}

fn assert_root_empty(root: &Path) {
    let leftovers: Vec<PathBuf> = std::fs::read_dir(root).unwrap().map(|e| e.unwrap().path()).collect();
    assert!(leftovers.is_empty(), "working area leaked: {:?}", leftovers);
}

fn sample_pdf(marker: &str) -> Vec<u8> {
    format!("%PDF-1.4\n% {}\n%%EOF\n", marker).into_bytes()
}

#[tokio::test]
async fn passes_the_documented_arguments_for_each_level() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = job(fx.tool("echo-gs"), root.path());

    for (quality, preset) in [
        (QualityLevel::High, "/screen"),
        (QualityLevel::Medium, "/ebook"),
        (QualityLevel::Low, "/printer"),
    ] {
        let input = sample_pdf(quality.as_str());
        let result = job.compress(input.clone(), quality, "report.pdf").await;

        assert!(result.success, "{:?}", result.error);
        let output = result.output.clone().unwrap();
        assert_eq!(result.compressed_size, output.len() as u64);
        assert_eq!(result.original_size, input.len() as u64);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let settings = format!("-dPDFSETTINGS={}", preset);
        assert_eq!(
            &lines[..6],
            &["-sDEVICE=pdfwrite", "-dCompatibilityLevel=1.4", settings.as_str(), "-dNOPAUSE", "-dQUIET", "-dBATCH"]
        );
        assert!(lines[6].starts_with("-sOutputFile="));
        assert!(Path::new(lines[7]).starts_with(root.path()));
        assert!(text.ends_with(std::str::from_utf8(&input).unwrap()));
    }

    assert_root_empty(root.path());
}

#[tokio::test]
async fn non_zero_exit_is_invocation_failure() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = job(fx.tool("failing-gs"), root.path());

    let result = job.compress(b"definitely not a pdf".to_vec(), QualityLevel::High, "bad.pdf").await;

    assert_eq!(result.status, JobStatus::Failed);
    assert_eq!(result.error_kind(), Some(ErrorKind::ToolInvocationFailed));
    let message = &result.error.as_ref().unwrap().message;
    assert!(message.contains("exit code 1"), "{}", message);
    assert!(message.contains("/syntaxerror"), "{}", message);
    assert!(result.output.is_none());
    assert_root_empty(root.path());
}

#[tokio::test]
async fn zero_exit_without_output_is_empty_output() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();

    for tool in ["silent-gs", "empty-gs"] {
        let result = job(fx.tool(tool), root.path())
            .compress(sample_pdf(tool), QualityLevel::Medium, "a.pdf")
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::EmptyOutput), "{}", tool);
        assert!(result.output.is_none());
    }

    assert_root_empty(root.path());
}

#[tokio::test]
async fn missing_binary_is_tool_not_found() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = job(fx.tool("no-such-gs"), root.path());

    let result = job.compress(sample_pdf("missing"), QualityLevel::Low, "a.pdf").await;
    assert_eq!(result.error_kind(), Some(ErrorKind::ToolNotFound));

    let probe = job.compressor().probe().await.unwrap_err();
    assert_eq!(probe.kind(), ErrorKind::ToolNotFound);
    assert_root_empty(root.path());
}

#[tokio::test]
async fn unlaunchable_binary_is_invocation_failure() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = job(fx.tool("not-executable-gs"), root.path());

    let result = job.compress(sample_pdf("denied"), QualityLevel::Low, "a.pdf").await;
    assert_eq!(result.error_kind(), Some(ErrorKind::ToolInvocationFailed));
    assert_root_empty(root.path());
}

#[tokio::test]
async fn no_compression_never_reaches_the_tool() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    // A missing binary would fail loudly if it were ever launched.
    let job = job(fx.tool("no-such-gs"), root.path());

    let result = job.compress(sample_pdf("skip"), QualityLevel::NoCompression, "a.pdf").await;
    assert!(result.is_skipped());
    assert_eq!(result.error_kind(), Some(ErrorKind::SkippedNoCompression));
    assert_root_empty(root.path());
}

#[tokio::test]
async fn slow_tool_is_killed_after_timeout() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = CompressionJob::with_ghostscript(CompressionConfig {
        ghostscript_path: fx.tool("slow-gs"),
        work_dir: Some(root.path().to_path_buf()),
        timeout_secs: Some(1),
        ..CompressionConfig::default()
    });

    let result = job.compress(sample_pdf("slow"), QualityLevel::High, "a.pdf").await;
    assert_eq!(result.error_kind(), Some(ErrorKind::ToolTimedOut));
    assert_root_empty(root.path());
}

#[tokio::test]
async fn zero_timeout_means_no_limit() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = CompressionJob::with_ghostscript(CompressionConfig {
        ghostscript_path: fx.tool("echo-gs"),
        work_dir: Some(root.path().to_path_buf()),
        timeout_secs: Some(0),
        ..CompressionConfig::default()
    });

    let result = job.compress(sample_pdf("unbounded"), QualityLevel::Medium, "a.pdf").await;
    assert!(result.success, "{:?}", result.error);
    assert_root_empty(root.path());
}

#[tokio::test]
async fn probe_reports_version() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = job(fx.tool("echo-gs"), root.path());

    assert_eq!(job.compressor().probe().await.unwrap(), "10.02.1");
    assert_eq!(job.compressor().compressor_name(), "GhostscriptCompressor");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_jobs_do_not_share_files() {
    let fx = fixtures();
    let root = tempfile::tempdir().unwrap();
    let job = job(fx.tool("echo-gs"), root.path());

    let first = sample_pdf("first upload");
    let second = sample_pdf("second upload");

    let (a, b) = tokio::join!(
        tokio::spawn({
            let job = job.clone();
            let data = first.clone();
            async move { job.compress(data, QualityLevel::High, "same-name.pdf").await }
        }),
        tokio::spawn({
            let job = job.clone();
            let data = second.clone();
            async move { job.compress(data, QualityLevel::Low, "same-name.pdf").await }
        }),
    );

    let a = String::from_utf8(a.unwrap().output.unwrap()).unwrap();
    let b = String::from_utf8(b.unwrap().output.unwrap()).unwrap();

    assert!(a.contains("-dPDFSETTINGS=/screen") && a.ends_with("% first upload\n%%EOF\n"));
    assert!(b.contains("-dPDFSETTINGS=/printer") && b.ends_with("% second upload\n%%EOF\n"));
    assert!(!a.contains("second upload"));
    assert!(!b.contains("first upload"));
    assert_root_empty(root.path());
}
