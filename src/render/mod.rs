//! Template rendering
//!
//! Builds the flat [`RenderContext`] for a run and evaluates it against the
//! template collection loaded at startup.

pub mod context;
pub mod templates;

pub use context::RenderContext;
pub use templates::TemplateRenderer;
