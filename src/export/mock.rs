use super::DocumentExporter;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Placeholder bytes written in place of a real PDF.
pub const MOCK_DOCUMENT: &[u8] = b"%PDF-1.4\n% mock document\n";

/// Exporter that writes the markup and a placeholder document.
#[derive(Clone)]
pub struct MockExporter {
    export_count: Arc<Mutex<usize>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockExporter {
    pub fn new() -> Self {
        Self {
            export_count: Arc::new(Mutex::new(0)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Fail conversion with `message` after the markup has been written.
    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_export_count(&self) -> usize {
        *self.export_count.lock().unwrap()
    }
}

impl Default for MockExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExporter for MockExporter {
    async fn export(&self, markup: &str, markup_path: &Path, document_path: &Path) -> Result<()> {
        *self.export_count.lock().unwrap() += 1;

        tokio::fs::write(markup_path, markup).await?;

        let failure = self.failure.lock().unwrap().clone();
        if let Some(message) = failure {
            return Err(Error::Export(message));
        }

        tokio::fs::write(document_path, MOCK_DOCUMENT).await?;
        Ok(())
    }
}
