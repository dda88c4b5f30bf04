use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resume_builder::app::App;
use resume_builder::models::{Config, ResumeRequest};
use resume_builder::photo::RawImage;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "resume-builder")]
#[command(about = "Build an AI-assisted resume from structured input")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available template identifiers.
    Templates,
    /// Build a resume from a request file.
    Build {
        /// JSON file holding the resume request fields.
        #[arg(long, value_name = "FILE")]
        request: PathBuf,
        /// Optional profile photo, replacing any pixels in the request file.
        #[arg(long, value_name = "IMAGE")]
        photo: Option<PathBuf>,
    },
}

fn load_request(path: &Path, photo: Option<&Path>) -> Result<ResumeRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    let mut request: ResumeRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid request file {}", path.display()))?;

    if let Some(photo) = photo {
        request.profile_image = Some(
            RawImage::open(photo)
                .with_context(|| format!("Failed to load photo {}", photo.display()))?,
        );
    }
    Ok(request)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_builder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let app = match Config::from_env().and_then(|config| App::new(&config)) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Templates => {
            for name in app.available_templates() {
                println!("{}", name);
            }
        }
        Command::Build { request, photo } => {
            let request = load_request(&request, photo.as_deref())?;
            let artifact = app.build_resume(&request).await;
            let done = artifact.is_done();

            match artifact.into_pair() {
                (markup, Some(document)) => {
                    info!("Resume generation completed successfully");
                    println!("{}", markup);
                    println!("{}", document.display());
                }
                (message, None) => {
                    eprintln!("{}", message);
                }
            }

            if !done {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
