//! Resume builder - assembles a resume from structured applicant data and a
//! target job description
//!
//! Parses the structured sections, asks a generative-text provider for a
//! professional summary and a skills list, renders an HTML template and
//! converts it into a PDF.

pub mod ai;
pub mod app;
pub mod error;
pub mod export;
pub mod models;
pub mod photo;
pub mod prompts;
pub mod render;
pub mod sections;

pub use error::{Error, ErrorKind, Result};
