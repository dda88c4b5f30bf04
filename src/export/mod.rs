//! Document export
//!
//! Persists rendered markup and converts it into a page-formatted PDF through
//! an external conversion engine.

pub mod mock;
pub mod wkhtmltopdf;

pub use mock::MockExporter;
pub use wkhtmltopdf::WkhtmltopdfExporter;

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait DocumentExporter: Send + Sync {
    /// Write `markup` to `markup_path`, then produce the document at
    /// `document_path`.
    ///
    /// The markup file is left in place when conversion fails.
    async fn export(&self, markup: &str, markup_path: &Path, document_path: &Path) -> Result<()>;
}
