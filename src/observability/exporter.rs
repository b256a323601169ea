//! File span exporter with size-based rotation.

use super::otlp;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_BACKUP_FILES: usize = 3;

/// Builds a tracer provider that exports every finished span to `file_path`.
pub fn tracer_provider(file_path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter {
        file: RotatingFile::new(file_path, MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES),
        resource: resource.clone(),
        is_shutdown: AtomicBool::new(false),
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}

#[derive(Debug)]
struct FileSpanExporter {
    file: RotatingFile,
    resource: Resource,
    is_shutdown: AtomicBool,
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown.load(Ordering::SeqCst) {
            Err(TraceError::from("exporter is shut down"))
        } else {
            let line = otlp::batch(&self.resource, "shopfront", &batch).to_string();
            self.file
                .write_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = resource.clone();
    }
}

/// Append-only line file that is renamed to `<name>.json.<timestamp>` once it
/// grows past `max_bytes`, keeping the newest `max_backups` renamed files.
#[derive(Debug)]
struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    handle: Mutex<Option<File>>,
}

impl RotatingFile {
    const fn new(path: PathBuf, max_bytes: u64, max_backups: usize) -> Self {
        Self {
            path,
            max_bytes,
            max_backups,
            handle: Mutex::new(None),
        }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("lock poisoned: {e}")))?;

        if fs::metadata(&self.path).is_ok_and(|m| m.len() > self.max_bytes) {
            *handle = None;
            self.rotate()?;
        }

        if handle.is_none() {
            *handle = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?,
            );
        }
        let file = handle
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "trace file unavailable"))?;

        writeln!(file, "{line}")?;
        file.flush()
    }

    fn rotate(&self) -> io::Result<()> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.6f");
        fs::rename(&self.path, self.path.with_extension(format!("json.{stamp}")))?;

        let mut backups = self.backups()?;
        backups.sort_by_key(|path| {
            std::cmp::Reverse(fs::metadata(path).and_then(|m| m.modified()).ok())
        });
        for stale in backups.iter().skip(self.max_backups) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }

    fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let prefix = match self.path.file_name().and_then(|n| n.to_str()) {
            Some(name) => format!("{name}."),
            None => return Ok(Vec::new()),
        };

        Ok(fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_keeps_bounded_backups() {
        let dir = tempfile::tempdir().unwrap();
        let file = RotatingFile::new(dir.path().join("spans.json"), 16, 2);

        for i in 0..8 {
            file.write_line(&format!("{{\"batch\":{i},\"pad\":\"xxxxxxxx\"}}")).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        assert!(dir.path().join("spans.json").exists());
        assert!(file.backups().unwrap().len() <= 2);
    }

    #[test]
    fn lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spans.json");
        let file = RotatingFile::new(path.clone(), MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES);

        file.write_line("{\"a\":1}").unwrap();
        file.write_line("{\"b\":2}").unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
