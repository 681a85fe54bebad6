//! Export artifacts and the sinks that deliver them

use crate::{ReceiptError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Kind of exported file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Png,
    Jpeg,
}

impl ArtifactKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Png => "image/png",
            ArtifactKind::Jpeg => "image/jpeg",
        }
    }
}

/// A finished document or raster, owned by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: &str, kind: ArtifactKind, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            kind,
            bytes,
        }
    }
}

/// Destination of finished artifacts (the download step)
pub trait ExportSink {
    fn deliver(&mut self, artifact: &Artifact) -> Result<()>;
}

/// Writes artifacts into a directory under their filename
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for FileSink {
    fn deliver(&mut self, artifact: &Artifact) -> Result<()> {
        let path = self.dir.join(&artifact.filename);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, &artifact.bytes))
            .map_err(|e| ReceiptError::ExportError(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), bytes = artifact.bytes.len(), "artifact written");
        Ok(())
    }
}

/// Keeps delivered artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<Artifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn last(&self) -> Option<&Artifact> {
        self.artifacts.last()
    }

    pub fn take(&mut self) -> Vec<Artifact> {
        std::mem::take(&mut self.artifacts)
    }
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, artifact: &Artifact) -> Result<()> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.deliver(&Artifact::new("keerai.pdf", ArtifactKind::Pdf, vec![1, 2]))
            .unwrap();

        assert_eq!(sink.artifacts().len(), 1);
        assert_eq!(sink.last().unwrap().filename, "keerai.pdf");
        assert_eq!(sink.take().len(), 1);
        assert!(sink.artifacts().is_empty());
    }

    #[test]
    fn test_file_sink_writes_file() {
        let dir = std::env::temp_dir().join(format!("receipt-sink-{}", std::process::id()));
        let mut sink = FileSink::new(&dir);
        sink.deliver(&Artifact::new("receipt.png", ArtifactKind::Png, vec![9, 8, 7]))
            .unwrap();

        assert_eq!(std::fs::read(dir.join("receipt.png")).unwrap(), vec![9, 8, 7]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_sink_reports_failure() {
        let file = std::env::temp_dir().join(format!("receipt-sink-file-{}", std::process::id()));
        std::fs::write(&file, b"x").unwrap();

        // A regular file cannot act as the target directory
        let mut sink = FileSink::new(&file);
        let result = sink.deliver(&Artifact::new("a.pdf", ArtifactKind::Pdf, vec![]));

        assert!(matches!(result, Err(ReceiptError::ExportError(_))));
        std::fs::remove_file(&file).unwrap();
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ArtifactKind::Pdf.mime_type(), "application/pdf");
        assert_eq!(ArtifactKind::Jpeg.mime_type(), "image/jpeg");
    }
}
