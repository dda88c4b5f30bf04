//! Pipeline orchestration for building one resume per submission.

use crate::ai::{
    CohereTextClient, ContentGenerator, GeminiTextClient, OpenAiTextClient, TextGenerationService,
};
use crate::error::ErrorKind;
use crate::export::{DocumentExporter, WkhtmltopdfExporter};
use crate::models::{AiProvider, Config, ResumeRequest};
use crate::photo;
use crate::render::{RenderContext, TemplateRenderer};
use crate::sections;
use crate::{Error, Result};
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

pub const MARKUP_FILE_NAME: &str = "resume.html";
pub const DOCUMENT_FILE_NAME: &str = "resume.pdf";

const RETRY_INTERVAL: Duration = Duration::from_millis(2000);

/// Pipeline stage a run was in when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    Generating,
    Encoding,
    Rendering,
    Exporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parsing => "parsing",
            Stage::Generating => "generating",
            Stage::Encoding => "encoding",
            Stage::Rendering => "rendering",
            Stage::Exporting => "exporting",
        };
        f.write_str(name)
    }
}

/// Outcome of one run. There is no partial success.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Done {
        run_id: Uuid,
        markup_path: PathBuf,
        document_path: PathBuf,
    },
    Failed {
        stage: Stage,
        kind: ErrorKind,
        message: String,
    },
}

impl Artifact {
    fn failed(stage: Stage, err: &Error) -> Self {
        let message = match err {
            Error::Parse(detail) => format!(
                "Invalid JSON in education, experience, or references section: {}",
                detail
            ),
            other => format!("Resume generation failed: {}", other),
        };

        Artifact::Failed {
            stage,
            kind: err.kind(),
            message,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Artifact::Done { .. })
    }

    /// The front-end's two-slot view: markup path and document path on
    /// success, message and nothing on failure.
    pub fn into_pair(self) -> (String, Option<PathBuf>) {
        match self {
            Artifact::Done {
                markup_path,
                document_path,
                ..
            } => (markup_path.display().to_string(), Some(document_path)),
            Artifact::Failed { message, .. } => (message, None),
        }
    }
}

/// Output locations owned by a single run.
#[derive(Debug, Clone)]
pub struct RunLayout {
    pub id: Uuid,
    pub dir: PathBuf,
    pub markup_path: PathBuf,
    pub document_path: PathBuf,
}

impl RunLayout {
    pub fn new(output_root: &Path) -> Self {
        let id = Uuid::new_v4();
        let date = Local::now().format("%Y-%m-%d");
        let dir = output_root.join(format!("{}_{}", date, id));

        Self {
            id,
            markup_path: dir.join(MARKUP_FILE_NAME),
            document_path: dir.join(DOCUMENT_FILE_NAME),
            dir,
        }
    }
}

/// Long-lived capability handles, constructed once and shared by every run.
pub struct App {
    generator: ContentGenerator,
    renderer: TemplateRenderer,
    exporter: Box<dyn DocumentExporter>,
    output_dir: PathBuf,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub generator: ContentGenerator,
    pub renderer: TemplateRenderer,
    pub exporter: Box<dyn DocumentExporter>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, output_dir: PathBuf) -> Self {
        Self {
            generator: services.generator,
            renderer: services.renderer,
            exporter: services.exporter,
            output_dir,
        }
    }

    fn build_text_client(config: &Config) -> Box<dyn TextGenerationService> {
        let http_client = reqwest::Client::new();
        let (api_key, model, timeout) = (
            config.api_key.clone(),
            config.model.clone(),
            config.generation_timeout,
        );

        match config.provider {
            AiProvider::Cohere => {
                info!("Text provider: Cohere (model: {})", model);
                Box::new(CohereTextClient::new_with_client(
                    api_key,
                    Some(model),
                    timeout,
                    http_client,
                ))
            }
            AiProvider::OpenAi => {
                info!("Text provider: OpenAI (model: {})", model);
                Box::new(OpenAiTextClient::new_with_client(
                    api_key,
                    model,
                    timeout,
                    http_client,
                ))
            }
            AiProvider::Gemini => {
                info!("Text provider: Gemini (model: {})", model);
                Box::new(GeminiTextClient::new_with_client(
                    api_key,
                    model,
                    timeout,
                    http_client,
                ))
            }
        }
    }

    /// Construct an app from configuration (see [`Config::from_env`]).
    pub fn new(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.output_dir)?;
        info!("Output directory: {}", config.output_dir.display());

        let generator = ContentGenerator::new(Self::build_text_client(config))
            .with_retries(config.generation_retries, RETRY_INTERVAL);
        let renderer = TemplateRenderer::from_dir(&config.templates_dir)?;
        let exporter = Box::new(WkhtmltopdfExporter::new(
            config.wkhtmltopdf_path.clone(),
            config.export_timeout,
        ));

        Ok(Self::with_services(
            AppServices {
                generator,
                renderer,
                exporter,
            },
            config.output_dir.clone(),
        ))
    }

    pub fn available_templates(&self) -> &[String] {
        self.renderer.available_templates()
    }

    /// Run the whole pipeline for one submission.
    ///
    /// Never returns an error: every failure is folded into
    /// [`Artifact::Failed`]. Files written before a late failure are kept.
    pub async fn build_resume(&self, request: &ResumeRequest) -> Artifact {
        let layout = RunLayout::new(&self.output_dir);
        info!("[{}] Building resume '{}'", layout.id, request.resume_title);

        match self.run(request, &layout).await {
            Ok(()) => {
                info!(
                    "[{}] Resume ready: {} and {}",
                    layout.id,
                    layout.markup_path.display(),
                    layout.document_path.display()
                );
                Artifact::Done {
                    run_id: layout.id,
                    markup_path: layout.markup_path,
                    document_path: layout.document_path,
                }
            }
            Err((stage, e)) => {
                error!("[{}] Failed while {}: {}", layout.id, stage, e);
                Artifact::failed(stage, &e)
            }
        }
    }

    async fn run(
        &self,
        request: &ResumeRequest,
        layout: &RunLayout,
    ) -> std::result::Result<(), (Stage, Error)> {
        info!("[{}] Parsing structured sections", layout.id);
        let sections = sections::parse_sections(request).map_err(|e| (Stage::Parsing, e))?;
        info!(
            "[{}] Parsed {} education, {} experience, {} reference records and {} languages",
            layout.id,
            sections.education.len(),
            sections.experience.len(),
            sections.references.len(),
            sections.languages.len()
        );

        // An unknown template must not cost any generation calls.
        if !self.renderer.contains(&request.template_name) {
            return Err((
                Stage::Rendering,
                Error::Render(format!(
                    "Unknown template '{}'. Available: {}",
                    request.template_name,
                    self.renderer.available_templates().join(", ")
                )),
            ));
        }

        info!("[{}] Generating content and encoding photo", layout.id);
        let (generated, image) = tokio::join!(
            self.generator
                .generate(&request.full_name, &request.job_description),
            photo::encode_profile_image_blocking(request.profile_image.clone()),
        );
        let generated = generated.map_err(|e| (Stage::Generating, e))?;
        let image = image.map_err(|e| (Stage::Encoding, e))?;
        if image.is_absent() {
            info!("[{}] No profile photo supplied", layout.id);
        }

        info!(
            "[{}] Rendering template {}",
            layout.id, request.template_name
        );
        let context = RenderContext::build(request, sections, generated, image);
        let markup = self
            .renderer
            .render(&request.template_name, &context)
            .map_err(|e| (Stage::Rendering, e))?;

        info!("[{}] Exporting to {}", layout.id, layout.dir.display());
        tokio::fs::create_dir_all(&layout.dir)
            .await
            .map_err(|e| (Stage::Exporting, Error::from(e)))?;
        self.exporter
            .export(&markup, &layout.markup_path, &layout.document_path)
            .await
            .map_err(|e| (Stage::Exporting, e))?;

        Ok(())
    }
}
