//! REST API server for the code playground
//!
//! ## Endpoints
//!
//! POST /execute - Run a snippet and return its output
//! GET /health - Liveness probe

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{info, warn};
use playground_exec::cli::RuntimeArgs;
use playground_exec::{utils, ExecutionOutcome, ExecutionRequest, Playground, PlaygroundError};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "playground-server")]
#[command(version, about = "HTTP service that runs playground snippets", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "PLAYGROUND_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind
    #[arg(short, long, env = "PLAYGROUND_PORT", default_value_t = 8001)]
    port: u16,

    #[command(flatten)]
    runtime: RuntimeArgs,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let playground = cli
        .runtime
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    if utils::is_root() {
        warn!("Running as root: snippets inherit root privileges");
    }
    if !playground.config().dependency_root.exists() {
        warn!(
            "Dependency root {} is missing; JavaScript imports will fail",
            playground.config().dependency_root.display()
        );
    }

    let state = web::Data::new(AppState { playground });

    info!(
        "Playground server starting on http://{}:{}",
        cli.host, cli.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .route("/execute", web::post().to(execute))
    })
    .bind((cli.host.as_str(), cli.port))?
    .run()
    .await
}

// ============ API Types ============

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecuteResponse {
    pub output: String,
    pub error: String,
    pub success: bool,
}

impl From<ExecutionOutcome> for ExecuteResponse {
    fn from(outcome: ExecutionOutcome) -> Self {
        Self {
            output: outcome.stdout,
            error: outcome.stderr,
            success: outcome.succeeded,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

// ============ Application State ============

pub struct AppState {
    playground: Playground,
}

// ============ Handlers ============

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" }))
}

/// Execute a snippet
async fn execute(req: web::Json<ExecutionRequest>, state: web::Data<AppState>) -> HttpResponse {
    match state.playground.execute(&req).await {
        Ok(outcome) => HttpResponse::Ok().json(ExecuteResponse::from(outcome)),
        Err(e @ PlaygroundError::UnsupportedLanguage(_)) => {
            HttpResponse::BadRequest().json(ErrorResponse {
                detail: e.to_string(),
            })
        }
        Err(e) => {
            HttpResponse::Ok().json(ExecuteResponse::from(ExecutionOutcome::from_error(&e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use playground_exec::{PlaygroundBuilder, COMPLETION_SENTINEL};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn state(scratch: &TempDir) -> web::Data<AppState> {
        let playground = PlaygroundBuilder::new()
            .scratch_dir(scratch.path())
            .deadline(Duration::from_secs(10))
            .build()
            .unwrap();
        web::Data::new(AppState { playground })
    }

    fn has_python() -> bool {
        utils::find_executable(Path::new("python3")).is_some()
    }

    #[actix_web::test]
    async fn health_endpoint_works() {
        let app = test::init_service(App::new().route("/health", web::get().to(health_check))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({ "status": "healthy" }));
    }

    #[actix_web::test]
    async fn unsupported_language_is_bad_request() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state(&scratch))
                .route("/execute", web::post().to(execute)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/execute")
            .set_json(serde_json::json!({ "code": "puts 1", "language": "ruby" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.detail, "Language 'ruby' is not supported");
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn malformed_body_is_bad_request() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state(&scratch))
                .route("/execute", web::post().to(execute)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/execute")
            .set_json(serde_json::json!({ "language": "python" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn python_defaults_and_succeeds() {
        if !has_python() {
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state(&scratch))
                .route("/execute", web::post().to(execute)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/execute")
            .set_json(serde_json::json!({ "code": "print(1+1)" }))
            .to_request();
        let body: ExecuteResponse = test::call_and_read_body_json(&app, req).await;

        assert!(body.success);
        assert!(body.output.starts_with("2\n"));
        assert!(body.output.contains(COMPLETION_SENTINEL));
    }

    #[actix_web::test]
    async fn runtime_failure_is_still_ok_status() {
        if !has_python() {
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state(&scratch))
                .route("/execute", web::post().to(execute)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/execute")
            .set_json(serde_json::json!({
                "code": "raise ValueError('bad input')",
                "language": "python"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: ExecuteResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert!(body.error.contains("ValueError: bad input"));
        assert!(!body.output.contains(COMPLETION_SENTINEL));
    }

    #[actix_web::test]
    async fn execute_response_from_outcome() {
        let response = ExecuteResponse::from(ExecutionOutcome {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            succeeded: false,
        });
        assert_eq!(
            response,
            ExecuteResponse {
                output: "out".to_string(),
                error: "err".to_string(),
                success: false,
            }
        );
    }
}
