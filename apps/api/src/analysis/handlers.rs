use axum::{
    extract::{rejection::JsonRejection, multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::{explain_match, extract_skill_set, preview, read_document, UploadForm};
use crate::engine::matcher::EvaluationReport;
use crate::engine::normalize::SkillSet;
use crate::engine::report::{assemble_match, AtsReport, MatchEnvelope};
use crate::errors::AppError;
use crate::profile::build_profile;
use crate::state::AppState;

/// Characters of document text echoed back by `/extract-skills/`.
const TEXT_PREVIEW_CHARS: usize = 1000;

#[derive(Serialize)]
pub struct ExtractSkillsResponse {
    pub skills: SkillSet,
    pub text: String,
}

#[derive(Deserialize)]
pub struct EvaluationRequest {
    pub resume_text: String,
    pub job_description: String,
    /// Entries that are not strings are dropped.
    pub ground_truth_skills: Vec<Value>,
}

fn read_multipart(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, AppError> {
    multipart.map_err(|e| AppError::Validation(e.body_text()))
}

/// POST /extract-skills/
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractSkillsResponse>, AppError> {
    let span = info_span!("extract_skills", analysis_id = %Uuid::new_v4());
    extract_skills(state, multipart).instrument(span).await
}

async fn extract_skills(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractSkillsResponse>, AppError> {
    let mut form = UploadForm::read(read_multipart(multipart)?).await?;
    let document = read_document(form.take_file()?).await?;
    let skills = extract_skill_set(&state, &document.text).await;

    info!(skills = skills.len(), "Skills extracted from upload");
    Ok(Json(ExtractSkillsResponse {
        skills,
        text: preview(&document.text, TEXT_PREVIEW_CHARS),
    }))
}

/// POST /match-job/
pub async fn handle_match_job(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MatchEnvelope>, AppError> {
    let span = info_span!("match_job", analysis_id = %Uuid::new_v4());
    match_job(state, multipart).instrument(span).await
}

async fn match_job(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MatchEnvelope>, AppError> {
    let mut form = UploadForm::read(read_multipart(multipart)?).await?;
    let job_description = form.take_text("job_description")?;
    let document = read_document(form.take_file()?).await?;

    let (resume_skills, job_skills) = tokio::join!(
        extract_skill_set(&state, &document.text),
        extract_skill_set(&state, &job_description),
    );

    let result = state.engine.match_skills(&resume_skills, &job_skills);
    info!(
        resume = result.resume_count,
        job = result.job_count,
        matched = result.matched.len(),
        score = result.score,
        "Match computed"
    );

    let explanation = explain_match(&state, &resume_skills, &job_skills, &result).await;
    Ok(Json(assemble_match(
        resume_skills,
        job_skills,
        result,
        explanation,
    )))
}

/// POST /ats-score/
pub async fn handle_ats_score(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AtsReport>, AppError> {
    let span = info_span!("ats_score", analysis_id = %Uuid::new_v4());
    ats_score(state, multipart).instrument(span).await
}

async fn ats_score(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AtsReport>, AppError> {
    let mut form = UploadForm::read(read_multipart(multipart)?).await?;
    let document = read_document(form.take_file()?).await?;
    let skills = extract_skill_set(&state, &document.text).await;

    let profile = build_profile(&document, skills);
    let report = state.engine.score_resume(&profile);
    info!(
        overall = report.overall_score,
        grade = %report.grade,
        "ATS score computed"
    );
    Ok(Json(report))
}

/// POST /evaluate-matching/
pub async fn handle_evaluate_matching(
    State(state): State<AppState>,
    body: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<EvaluationReport>, AppError> {
    let span = info_span!("evaluate_matching", analysis_id = %Uuid::new_v4());
    evaluate_matching(state, body).instrument(span).await
}

async fn evaluate_matching(
    state: AppState,
    body: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<EvaluationReport>, AppError> {
    let Json(req) = body.map_err(|e| AppError::MalformedBody(e.body_text()))?;

    let (resume_skills, job_skills) = tokio::join!(
        extract_skill_set(&state, &req.resume_text),
        extract_skill_set(&state, &req.job_description),
    );
    let result = state.engine.match_skills(&resume_skills, &job_skills);
    let ground_truth = state.engine.normalize_values(&req.ground_truth_skills);

    let report = state.engine.evaluate(&result.matched, &ground_truth);
    info!(
        tp = report.tp,
        fp = report.fp,
        fn_ = report.fn_,
        f1 = report.f1,
        "Evaluation computed"
    );
    Ok(Json(report))
}
