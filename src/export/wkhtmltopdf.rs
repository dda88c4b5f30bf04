use super::DocumentExporter;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Converts HTML to PDF by running the `wkhtmltopdf` binary.
pub struct WkhtmltopdfExporter {
    binary: PathBuf,
    timeout: Duration,
}

impl WkhtmltopdfExporter {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    async fn convert(&self, markup_path: &Path, document_path: &Path) -> Result<()> {
        let mut command = Command::new(&self.binary);
        command
            .arg("--quiet")
            .arg("--encoding")
            .arg("utf-8")
            .arg("--enable-local-file-access")
            .arg(markup_path)
            .arg(document_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                Error::Export(format!(
                    "{} did not finish within {:?}",
                    self.binary.display(),
                    self.timeout
                ))
            })?
            .map_err(|e| {
                Error::Export(format!(
                    "Failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Export(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        if !tokio::fs::try_exists(document_path).await.unwrap_or(false) {
            return Err(Error::Export(format!(
                "{} reported success but wrote no document at {}",
                self.binary.display(),
                document_path.display()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentExporter for WkhtmltopdfExporter {
    async fn export(&self, markup: &str, markup_path: &Path, document_path: &Path) -> Result<()> {
        tokio::fs::write(markup_path, markup).await?;
        tracing::info!("Saved markup at: {}", markup_path.display());

        self.convert(markup_path, document_path).await.map_err(|e| {
            tracing::error!("Document conversion failed: {}", e);
            e
        })?;

        tracing::info!("Saved document at: {}", document_path.display());
        Ok(())
    }
}
