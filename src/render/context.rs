use crate::models::{
    EducationRecord, ExperienceRecord, GeneratedContent, ReferenceRecord, ResumeRequest,
    StructuredSections,
};
use crate::photo::ImageAsset;
use crate::{Error, Result};
use serde::Serialize;

/// Every value a template can reference, keyed by field name.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub resume_title: String,
    pub education: Vec<EducationRecord>,
    pub experience: Vec<ExperienceRecord>,
    pub references: Vec<ReferenceRecord>,
    pub languages: Vec<String>,
    pub summary: String,
    pub skills: Vec<String>,
    pub profile_image: ImageAsset,
}

impl RenderContext {
    pub fn build(
        request: &ResumeRequest,
        sections: StructuredSections,
        generated: GeneratedContent,
        profile_image: ImageAsset,
    ) -> Self {
        Self {
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            resume_title: request.resume_title.clone(),
            education: sections.education,
            experience: sections.experience,
            references: sections.references,
            languages: sections.languages,
            summary: generated.summary,
            skills: generated.skills,
            profile_image,
        }
    }

    pub fn to_tera(&self) -> Result<tera::Context> {
        tera::Context::from_serialize(self)
            .map_err(|e| Error::Render(format!("Failed to build template context: {}", e)))
    }
}
