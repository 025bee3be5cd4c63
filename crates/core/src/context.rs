use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tracing_subscriber::fmt::MakeWriter;

/// Run timestamp format shared by the report and every artifact name.
pub const RUN_STAMP_FORMAT: &str = "%Y_%m_%d_T%H_%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    StepLog,
    Screenshot,
    NetworkLog,
}

impl ArtifactKind {
    fn extension(self) -> &'static str {
        match self {
            ArtifactKind::StepLog => "log",
            ArtifactKind::Screenshot => "png",
            ArtifactKind::NetworkLog => "json",
        }
    }
}

/// Everything a run needs to know about where its output goes, constructed
/// once per process and passed down explicitly.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_stamp: String,
    pub report_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub step_log_dir: PathBuf,
    pub network_log_dir: PathBuf,
    pub report_path: PathBuf,
    pub log_buffer: LogBuffer,
}

impl RunContext {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        let stamp = Local::now().format(RUN_STAMP_FORMAT).to_string();
        Self::with_stamp(report_dir, &stamp)
    }

    /// Deterministic construction for a known timestamp.
    pub fn with_stamp(report_dir: impl Into<PathBuf>, stamp: &str) -> Self {
        let report_dir = report_dir.into();
        Self {
            run_stamp: stamp.to_string(),
            screenshot_dir: report_dir.join("screenshots"),
            step_log_dir: report_dir.join("test_steps_logs"),
            network_log_dir: report_dir.join("network_logs"),
            report_path: report_dir.join(format!("report_{stamp}.html")),
            report_dir,
            log_buffer: LogBuffer::new(),
        }
    }

    pub fn ensure_directories(&self) -> io::Result<()> {
        for dir in [
            &self.report_dir,
            &self.screenshot_dir,
            &self.step_log_dir,
            &self.network_log_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// `<dir>/<test_name>_<run_stamp>.<ext>` — stable for a given run.
    pub fn artifact_path(&self, kind: ArtifactKind, test_name: &str) -> PathBuf {
        let dir = match kind {
            ArtifactKind::StepLog => &self.step_log_dir,
            ArtifactKind::Screenshot => &self.screenshot_dir,
            ArtifactKind::NetworkLog => &self.network_log_dir,
        };
        dir.join(format!(
            "{test_name}_{stamp}.{ext}",
            stamp = self.run_stamp,
            ext = kind.extension()
        ))
    }

    /// Link target relative to the HTML report, for embedding.
    pub fn link_from_report(&self, path: &Path) -> String {
        path.strip_prefix(&self.report_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

/// In-memory sink for per-test step logs. A tracing fmt layer writes into it
/// for the whole run; the runner drains it per test and persists the slice on
/// failure.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while a writer holds the lock cannot leave a byte buffer in a
    // bad state, so poisoning is ignored rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take everything buffered so far, leaving the buffer empty.
    pub fn drain(&self) -> String {
        let mut guard = self.lock();
        String::from_utf8_lossy(&std::mem::take(&mut *guard)).into_owned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

pub struct LogBufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_are_deterministic() {
        let ctx = RunContext::with_stamp("reports", "2025_01_02_T03_04");
        assert_eq!(
            ctx.artifact_path(ArtifactKind::Screenshot, "test_login_valid"),
            PathBuf::from("reports/screenshots/test_login_valid_2025_01_02_T03_04.png")
        );
        assert_eq!(
            ctx.artifact_path(ArtifactKind::StepLog, "test_login_valid"),
            PathBuf::from("reports/test_steps_logs/test_login_valid_2025_01_02_T03_04.log")
        );
        assert_eq!(
            ctx.report_path,
            PathBuf::from("reports/report_2025_01_02_T03_04.html")
        );
    }

    #[test]
    fn report_links_are_relative() {
        let ctx = RunContext::with_stamp("reports", "2025_01_02_T03_04");
        let path = ctx.artifact_path(ArtifactKind::NetworkLog, "test_x");
        assert_eq!(
            ctx.link_from_report(&path),
            "network_logs/test_x_2025_01_02_T03_04.json"
        );
    }

    #[test]
    fn log_buffer_drains_and_clears() {
        let buffer = LogBuffer::new();
        let mut writer = buffer.make_writer();
        writer.write_all(b"step one\n").unwrap();
        writer.write_all(b"step two\n").unwrap();

        assert!(!buffer.is_empty());
        assert_eq!(buffer.drain(), "step one\nstep two\n");
        assert!(buffer.is_empty());
    }

    #[test]
    fn poisoned_log_buffer_still_drains() {
        let buffer = LogBuffer::new();
        let mut writer = buffer.make_writer();
        writer.write_all(b"before the panic\n").unwrap();

        let poisoner = buffer.clone();
        std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("holder dies with the lock");
        })
        .join()
        .unwrap_err();

        writer.write_all(b"after the panic\n").unwrap();
        assert_eq!(buffer.drain(), "before the panic\nafter the panic\n");
    }
}
