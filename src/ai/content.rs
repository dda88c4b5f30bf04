//! Summary and skills generation for one resume.

use super::TextGenerationService;
use crate::models::GeneratedContent;
use crate::{prompts, Error, Result};
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{info, warn};

/// Output budget for the 2-3 sentence summary.
pub const SUMMARY_MAX_TOKENS: u32 = 150;
/// Output budget for the five-item skills list.
pub const SKILLS_MAX_TOKENS: u32 = 60;

const SKILL_DELIMITER: char = ',';

pub struct ContentGenerator {
    service: Box<dyn TextGenerationService>,
    retries: usize,
    retry_interval: Duration,
}

impl ContentGenerator {
    pub fn new(service: Box<dyn TextGenerationService>) -> Self {
        Self {
            service,
            retries: 0,
            retry_interval: Duration::from_millis(2000),
        }
    }

    /// Allow `retries` extra attempts per prompt, `interval` apart.
    pub fn with_retries(mut self, retries: usize, interval: Duration) -> Self {
        self.retries = retries;
        self.retry_interval = interval;
        self
    }

    pub async fn generate(&self, name: &str, job_description: &str) -> Result<GeneratedContent> {
        let summary_prompt = prompts::render(
            prompts::SUMMARY,
            &[("name", name), ("job_description", job_description)],
        );
        let skills_prompt =
            prompts::render(prompts::SKILLS, &[("job_description", job_description)]);

        let (summary, skills_raw) = tokio::try_join!(
            self.generate_with_retry("summary", &summary_prompt, SUMMARY_MAX_TOKENS),
            self.generate_with_retry("skills", &skills_prompt, SKILLS_MAX_TOKENS),
        )?;

        if summary.trim().is_empty() {
            return Err(Error::Generation("Provider returned an empty summary".to_string()));
        }

        let skills = normalize_skills(&skills_raw);
        info!(
            "Generated summary ({} chars) and {} skills",
            summary.len(),
            skills.len()
        );

        Ok(GeneratedContent { summary, skills })
    }

    async fn generate_with_retry(
        &self,
        label: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let strategy = FixedInterval::new(self.retry_interval).take(self.retries);

        Retry::start(strategy, move || async move {
            self.service
                .generate(prompt, max_tokens)
                .await
                .map_err(|e| {
                    warn!("[{}] Generation attempt failed: {}", label, e);
                    e
                })
        })
        .await
        .map_err(|e| match e {
            Error::Generation(_) => e,
            other => Error::Generation(other.to_string()),
        })
    }
}

/// Turn a newline or comma separated skills reply into a clean list.
pub fn normalize_skills(raw: &str) -> Vec<String> {
    raw.replace('\n', &SKILL_DELIMITER.to_string())
        .split(SKILL_DELIMITER)
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(String::from)
        .collect()
}
