//! Data models and structures
//!
//! Defines the resume request collected from the front-end, the record shapes
//! of the structured sections, generated content, and runtime configuration.

use crate::photo::RawImage;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Everything a single submission provides. Never mutated by the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// JSON list of education records.
    pub education: String,
    /// JSON list of experience records.
    pub experience: String,
    /// JSON list of reference records.
    pub references: String,
    /// Comma separated language names.
    pub languages: String,
    pub job_description: String,
    pub resume_title: String,
    pub template_name: String,
    pub profile_image: Option<RawImage>,
}

/// Accepts any JSON value. Scalars read as their text (`"year": 2023` reads
/// like `"2023"`), arrays and objects as their compact JSON.
fn text_field<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    #[serde(default, deserialize_with = "text_field")]
    pub degree: String,
    #[serde(default, deserialize_with = "text_field")]
    pub institution: String,
    #[serde(default, deserialize_with = "text_field")]
    pub year: String,
    /// Keys outside the known shape, passed through to templates untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    #[serde(default, deserialize_with = "text_field")]
    pub position: String,
    #[serde(default, deserialize_with = "text_field")]
    pub company: String,
    #[serde(default, deserialize_with = "text_field")]
    pub years: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(default, deserialize_with = "text_field")]
    pub name: String,
    #[serde(default, deserialize_with = "text_field")]
    pub contact: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed form of the free-text sections of a [`ResumeRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredSections {
    pub education: Vec<EducationRecord>,
    pub experience: Vec<ExperienceRecord>,
    pub references: Vec<ReferenceRecord>,
    pub languages: Vec<String>,
}

/// Text produced by the generative-text provider for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedContent {
    pub summary: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Cohere,
    OpenAi,
    Gemini,
}

impl AiProvider {
    pub fn api_key_var(self) -> &'static str {
        match self {
            AiProvider::Cohere => "COHERE_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            AiProvider::Cohere => "command",
            AiProvider::OpenAi => "gpt-4o-mini",
            AiProvider::Gemini => "gemini-2.0-flash",
        }
    }
}

impl FromStr for AiProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cohere" => Ok(AiProvider::Cohere),
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            other => Err(Error::Config(format!(
                "Unknown AI_PROVIDER '{}'. Expected one of: cohere, openai, gemini",
                other
            ))),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: AiProvider,
    pub api_key: String,
    pub model: String,
    pub generation_timeout: Duration,
    pub generation_retries: usize,
    pub wkhtmltopdf_path: PathBuf,
    pub export_timeout: Duration,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("AI_PROVIDER") {
            Some(value) => value.parse()?,
            None => AiProvider::Cohere,
        };

        let api_key = lookup(provider.api_key_var())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{} not set", provider.api_key_var())))?;

        let model = lookup("GENERATION_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        Ok(Self {
            provider,
            api_key,
            model,
            generation_timeout: Duration::from_secs(parse_number(
                &lookup,
                "GENERATION_TIMEOUT_SECS",
                30,
            )?),
            generation_retries: parse_number(&lookup, "GENERATION_RETRIES", 0)? as usize,
            wkhtmltopdf_path: lookup("WKHTMLTOPDF_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("wkhtmltopdf")),
            export_timeout: Duration::from_secs(parse_number(&lookup, "EXPORT_TIMEOUT_SECS", 60)?),
            templates_dir: lookup("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates")),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a whole number, got '{}'", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults_to_cohere() {
        let config = Config::from_lookup(lookup_from(&[("COHERE_API_KEY", "secret")])).unwrap();

        assert_eq!(config.provider, AiProvider::Cohere);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "command");
        assert_eq!(config.generation_timeout, Duration::from_secs(30));
        assert_eq!(config.generation_retries, 0);
        assert_eq!(config.wkhtmltopdf_path, PathBuf::from("wkhtmltopdf"));
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_config_missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("COHERE_API_KEY"));
    }

    #[test]
    fn test_config_blank_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[("COHERE_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_selects_provider_key() {
        let config = Config::from_lookup(lookup_from(&[
            ("AI_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "sk-test"),
            ("GENERATION_MODEL", "gpt-test"),
            ("WKHTMLTOPDF_PATH", "/opt/wkhtmltopdf"),
            ("EXPORT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.provider, AiProvider::OpenAi);
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-test");
        assert_eq!(config.wkhtmltopdf_path, PathBuf::from("/opt/wkhtmltopdf"));
        assert_eq!(config.export_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[("AI_PROVIDER", "llama")])).unwrap_err();
        assert!(err.to_string().contains("llama"));

        let err = Config::from_lookup(lookup_from(&[
            ("COHERE_API_KEY", "k"),
            ("GENERATION_RETRIES", "three"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GENERATION_RETRIES"));
    }

    #[test]
    fn test_record_accepts_numeric_year_and_extra_keys() {
        let record: EducationRecord = serde_json::from_str(
            r#"{"degree": "BS CS", "institution": "ABC University", "year": 2023, "gpa": "3.9"}"#,
        )
        .unwrap();

        assert_eq!(record.degree, "BS CS");
        assert_eq!(record.year, "2023");
        assert_eq!(record.extra.get("gpa"), Some(&Value::from("3.9")));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["gpa"], "3.9");
        assert_eq!(json["institution"], "ABC University");
    }

    #[test]
    fn test_record_missing_keys_default_to_empty() {
        let record: ReferenceRecord = serde_json::from_str(r#"{"name": "John Doe"}"#).unwrap();
        assert_eq!(record.name, "John Doe");
        assert_eq!(record.contact, "");
    }

    #[test]
    fn test_record_accepts_nested_value_in_known_field() {
        let record: ExperienceRecord = serde_json::from_str(
            r#"{"position": "Dev", "company": "X", "years": {"from": 2019, "to": 2021}}"#,
        )
        .unwrap();
        assert_eq!(record.years, r#"{"from":2019,"to":2021}"#);

        let record: ExperienceRecord =
            serde_json::from_str(r#"{"position": ["Developer", true]}"#).unwrap();
        assert_eq!(record.position, r#"["Developer",true]"#);
    }

    #[test]
    fn test_request_fields_default_when_absent() {
        let request: ResumeRequest =
            serde_json::from_str(r#"{"full_name": "Jane Roe", "template_name": "classic.html"}"#)
                .unwrap();
        assert_eq!(request.full_name, "Jane Roe");
        assert_eq!(request.education, "");
        assert!(request.profile_image.is_none());
    }
}
