use super::RenderContext;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, info};

/// Read-only template collection, loaded once and shared across runs.
///
/// Values are inserted verbatim: autoescaping is off for every extension.
#[derive(Debug)]
pub struct TemplateRenderer {
    tera: Tera,
    names: Vec<String>,
}

impl TemplateRenderer {
    /// Load every regular file directly inside `dir`, named by file name.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::Render(format!(
                "Cannot read template directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut files: Vec<(PathBuf, String)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_file() && !name.starts_with('.') {
                files.push((path, name));
            }
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let mut tera = Tera::default();
        tera.add_template_files(
            files
                .iter()
                .map(|(path, name)| (path.as_path(), Some(name.as_str())))
                .collect::<Vec<_>>(),
        )
        .map_err(|e| Error::Render(describe(&e)))?;
        tera.autoescape_on(vec![]);

        let names: Vec<String> = files.into_iter().map(|(_, name)| name).collect();
        info!(
            "Loaded {} templates from {}: {}",
            names.len(),
            dir.display(),
            names.join(", ")
        );

        Ok(Self { tera, names })
    }

    /// Build a collection from in-memory `(name, source)` pairs.
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(sources.iter().copied())
            .map_err(|e| Error::Render(describe(&e)))?;
        tera.autoescape_on(vec![]);

        let mut names: Vec<String> = sources.iter().map(|(name, _)| name.to_string()).collect();
        names.sort();

        Ok(Self { tera, names })
    }

    /// Template identifiers, sorted by name.
    pub fn available_templates(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn render(&self, name: &str, context: &RenderContext) -> Result<String> {
        if !self.contains(name) {
            return Err(Error::Render(format!(
                "Unknown template '{}'. Available: {}",
                name,
                self.names.join(", ")
            )));
        }

        debug!("Rendering template {}", name);
        self.tera
            .render(name, &context.to_tera()?)
            .map_err(|e| Error::Render(describe(&e)))
    }
}

/// Flatten a tera error and its sources into one line.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}
