//! Request orchestration around the engine: reads uploads, runs the
//! collaborators under a time box and degrades when they fail.

pub mod handlers;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::engine::matcher::MatchResult;
use crate::engine::normalize::SkillSet;
use crate::engine::report::Explanation;
use crate::errors::AppError;
use crate::extraction::{load_document, Document, DocumentKind, SkillExtractor};
use crate::state::AppState;

/// The uploaded `file` part.
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A parsed multipart form: the `file` part plus every text field.
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<Upload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if name == "file" {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                form.file = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    pub fn take_file(&mut self) -> Result<Upload, AppError> {
        self.file.take().ok_or_else(|| missing_field("file"))
    }

    pub fn take_text(&mut self, name: &str) -> Result<String, AppError> {
        self.fields.remove(name).ok_or_else(|| missing_field(name))
    }
}

fn missing_field(name: &str) -> AppError {
    AppError::MalformedBody(format!("Missing form field '{name}'"))
}

/// Validates the upload type and extracts its text.
pub async fn read_document(upload: Upload) -> Result<Document, AppError> {
    let kind = DocumentKind::detect(
        upload.file_name.as_deref(),
        upload.content_type.as_deref(),
        &upload.bytes,
    )?;
    load_document(upload.bytes, kind).await
}

/// Runs `fut` under the collaborator time box. `None` on overrun.
async fn time_boxed<F: Future>(limit: Duration, what: &str, fut: F) -> Option<F::Output> {
    match tokio::time::timeout(limit, fut).await {
        Ok(output) => Some(output),
        Err(_) => {
            warn!("{what} timed out after {}s", limit.as_secs_f32());
            None
        }
    }
}

/// Extracts and normalizes the skills in `text`. An overrunning extractor
/// is replaced by the dictionary scan.
pub async fn extract_skill_set(state: &AppState, text: &str) -> SkillSet {
    let raw = match time_boxed(
        state.config.collaborator_timeout,
        "Skill extraction",
        state.extractor.extract(text),
    )
    .await
    {
        Some(raw) => raw,
        None => state.fallback_extractor.extract(text).await,
    };

    let skills = state.engine.normalize_values(&raw);
    debug!(
        backend = state.extractor.backend(),
        raw = raw.len(),
        normalized = skills.len(),
        "Skills extracted"
    );
    skills
}

/// Asks the explainer for text. Failures and overruns yield `None`.
pub async fn explain_match(
    state: &AppState,
    resume_skills: &SkillSet,
    job_skills: &SkillSet,
    result: &MatchResult,
) -> Option<Explanation> {
    let outcome = time_boxed(
        state.config.collaborator_timeout,
        "Explanation",
        state.explainer.explain(resume_skills, job_skills, result),
    )
    .await?;

    match outcome {
        Ok(explanation) => Some(explanation),
        Err(e) => {
            warn!(backend = state.explainer.backend(), "Explanation failed: {e:#}");
            None
        }
    }
}

/// First `max_chars` characters of the document text.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
