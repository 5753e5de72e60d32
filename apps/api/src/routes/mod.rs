pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route(
            "/health",
            get(health::health_handler).fallback(method_not_allowed),
        )
        .route(
            "/extract-skills/",
            post(handlers::handle_extract_skills).fallback(method_not_allowed),
        )
        .route(
            "/match-job/",
            post(handlers::handle_match_job).fallback(method_not_allowed),
        )
        .route(
            "/ats-score/",
            post(handlers::handle_ats_score).fallback(method_not_allowed),
        )
        .route(
            "/evaluate-matching/",
            post(handlers::handle_evaluate_matching).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::engine::config::EngineConfig;
    use crate::engine::ScoringEngine;

    const BOUNDARY: &str = "skillmatch-test-boundary";

    const RESUME: &str = "\
Jane Q Doe
Austin, TX | jane.doe@example.com | (512) 555-0137

Experience
Senior Software Engineer, Initech
Jan 2020 - Present
• Led migration of 12 services to Docker, cutting deploy time by 60%
• Built Python ingestion pipeline handling 2M events/day with SQL storage

Education
B.S. Computer Science
University of Texas at Austin, 2016

Skills
Python, SQL, Git
";

    enum Part<'a> {
        File {
            name: &'a str,
            content_type: &'a str,
            bytes: &'a [u8],
        },
        Text(&'a str, &'a str),
    }

    fn app_with(config: Config) -> Router {
        let engine = ScoringEngine::new(EngineConfig::default()).unwrap();
        build_router(AppState::new(config, engine, None))
    }

    fn app() -> Router {
        app_with(Config::default())
    }

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File {
                    name,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn resume_file(text: &str) -> Part<'_> {
        Part::File {
            name: "resume.txt",
            content_type: "text/plain",
            bytes: text.as_bytes(),
        }
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "skillmatch");
    }

    #[tokio::test]
    async fn test_unknown_paths_return_detail_404() {
        for uri in ["/nope/", "/match-job"] {
            let request = multipart_request(uri, &[resume_file("Python")]);
            let (status, body) = send(app(), request).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({"detail": "Not Found"}));
        }
    }

    #[tokio::test]
    async fn test_wrong_method_returns_detail_405() {
        let request = Request::builder()
            .method("GET")
            .uri("/match-job/")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"detail": "Method Not Allowed"}));
    }

    #[tokio::test]
    async fn test_extract_skills() {
        let request = multipart_request("/extract-skills/", &[resume_file(RESUME)]);
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        let skills = body["skills"].as_array().unwrap();
        for skill in ["docker", "python", "sql", "git"] {
            assert!(skills.contains(&json!(skill)), "missing {skill} in {skills:?}");
        }
        assert!(body["text"].as_str().unwrap().starts_with("Jane Q Doe"));
    }

    #[tokio::test]
    async fn test_match_job_envelope() {
        let request = multipart_request(
            "/match-job/",
            &[
                resume_file("Skills: Python, SQL, Git"),
                Part::Text("job_description", "We need Python, SQL and Docker experience."),
            ],
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_skills"], json!(["python", "sql", "git"]));
        assert_eq!(body["job_skills"], json!(["python", "sql", "docker"]));
        assert_eq!(body["match"]["matched_skills"], json!(["python", "sql"]));
        assert_eq!(body["match"]["missing_skills"], json!(["docker"]));
        assert_eq!(body["match"]["score"], 67);
        assert_eq!(body["match"]["resume_count"], 3);
        assert_eq!(body["match"]["job_count"], 3);
        assert_eq!(body["match"]["verdict"], "Good Match");
        assert!(body["explain"]["explanation"].as_str().unwrap().contains("2 of 3"));
    }

    #[tokio::test]
    async fn test_match_job_with_empty_job_description() {
        let request = multipart_request(
            "/match-job/",
            &[resume_file("Python"), Part::Text("job_description", "")],
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["match"]["score"], 0);
        assert_eq!(body["match"]["missing_skills"], json!([]));
    }

    #[tokio::test]
    async fn test_match_job_requires_job_description() {
        let request = multipart_request("/match-job/", &[resume_file("Python")]);
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Missing form field 'job_description'");
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let request = multipart_request("/extract-skills/", &[resume_file("")]);
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Empty file");
    }

    #[tokio::test]
    async fn test_unsupported_file_type() {
        let request = multipart_request(
            "/ats-score/",
            &[Part::File {
                name: "resume.docx",
                content_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                bytes: b"PK\x03\x04",
            }],
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_rejected_with_detail() {
        let request = json_request("/match-job/", json!({"job_description": "x"}));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_upload_over_limit() {
        let config = Config {
            max_upload_bytes: 256,
            ..Config::default()
        };
        let big = "Python ".repeat(200);
        let request = multipart_request("/extract-skills/", &[resume_file(&big)]);
        let (status, body) = send(app_with(config), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_ats_score_report() {
        let request = multipart_request("/ats-score/", &[resume_file(RESUME)]);
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);

        let overall = body["overall_score"].as_u64().unwrap();
        assert!(overall <= 100);
        assert!(["A", "B", "C", "D", "F"].contains(&body["grade"].as_str().unwrap()));
        assert!(body["summary"].as_str().unwrap().contains(&format!("{overall}/100")));
        for key in [
            "contact_info",
            "work_experience",
            "education",
            "skills",
            "keywords",
            "formatting",
        ] {
            let section = &body["sections"][key];
            assert!(section["score"].as_u64().unwrap() <= 100, "{key}");
            assert!(section["feedback"].is_string(), "{key}");
        }
        assert_eq!(body["sections"]["contact_info"]["score"], 100);
        assert!(body["improvements"].is_array());
        assert!(body["keywords_missing"].is_array());
    }

    #[tokio::test]
    async fn test_evaluate_matching() {
        let request = json_request(
            "/evaluate-matching/",
            json!({
                "resume_text": "Python and SQL",
                "job_description": "Python, SQL, Docker",
                "ground_truth_skills": ["Python", "docker", 5]
            }),
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_matched"], json!(["python", "sql"]));
        assert_eq!(body["ground_truth"], json!(["Python", "docker"]));
        assert_eq!(body["tp"], 1);
        assert_eq!(body["fp"], 1);
        assert_eq!(body["fn"], 1);
        assert_eq!(body["precision"], 0.5);
        assert_eq!(body["recall"], 0.5);
        assert_eq!(body["f1"], 0.5);
    }

    #[tokio::test]
    async fn test_evaluate_matching_rejects_wrong_shape() {
        let request = json_request(
            "/evaluate-matching/",
            json!({
                "resume_text": "Python",
                "job_description": "Python",
                "ground_truth_skills": "python"
            }),
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }
}
