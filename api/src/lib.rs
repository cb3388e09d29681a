//! HTTP surface of the research assistant.
//!
//! - `GET  /settings`        model catalog, ranges, web search availability
//! - `POST /ask`             one research round
//! - `GET  /history`         conversation log
//! - `GET  /history/export`  conversation as a Markdown attachment
//! - `GET  /health`          completion-service probe

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        ask::ask_route::ask_route,
        health::health_route::health_route,
        history::history_route::{export_history_route, history_route},
        settings::settings_route::settings_route,
    },
};

/// Builds state from env, binds `API_ADDRESS` and serves until Ctrl+C.
///
/// # Errors
/// Configuration errors (fatal at startup), bind and server I/O errors.
pub async fn start() -> Result<(), AppError> {
    let state = Arc::new(AppState::from_env()?);
    let address = state.config.address.clone();

    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "research assistant API listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// All routes over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.body_limit();

    Router::new()
        .route("/settings", get(settings_route))
        .route("/ask", post(ask_route))
        .route("/history", get(history_route))
        .route("/history/export", get(export_history_route))
        .route("/health", get(health_route))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        pin::Pin,
        sync::{Arc, Mutex},
    };

    use ai_llm_service::{
        AiLlmError, ChatCompletion, ChatMessage, CompletionParams, ModelId,
        config::completion_config::CompletionServiceConfig,
        error_handler::{Provider, ProviderError, ProviderErrorKind},
        health_service::HealthService,
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use research_core::ResearchAssistant;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use web_augmenter::{SearchResponse, SearchService, WebAugmenter, WebSearchError};

    use super::*;
    use crate::core::app_state::AppConfig;

    struct FakeCompletion {
        reply: &'static str,
        failing: Vec<ModelId>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ChatCompletion for FakeCompletion {
        fn complete<'a>(
            &'a self,
            messages: &'a [ChatMessage],
            params: &'a CompletionParams,
        ) -> Pin<Box<dyn Future<Output = Result<Option<String>, AiLlmError>> + Send + 'a>>
        {
            self.seen.lock().unwrap().push(messages.to_vec());
            let out = if self.failing.contains(&params.model) {
                Err(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into())
            } else {
                Ok(Some(self.reply.to_string()))
            };
            Box::pin(async move { out })
        }
    }

    struct OneHit;

    impl SearchService for OneHit {
        fn search<'a>(
            &'a self,
            _query: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<SearchResponse, WebSearchError>> + Send + 'a>>
        {
            Box::pin(async {
                web_augmenter::tavily::parse_response(
                    br#"{"results":[{"title":"Bell test","content":"Loophole-free.","url":"https://example.org/bell"}]}"#,
                )
            })
        }
    }

    fn state_with(failing: Vec<ModelId>, web: WebAugmenter) -> (Arc<AppState>, Arc<FakeCompletion>) {
        let fake = Arc::new(FakeCompletion {
            reply: "Entangled states are correlated.",
            failing,
            seen: Mutex::new(Vec::new()),
        });
        let cfg = CompletionServiceConfig {
            endpoint: "not-a-url".into(),
            api_key: "sk-test".into(),
            timeout_secs: Some(1),
        };
        let state = AppState::new(
            AppConfig {
                address: "127.0.0.1:0".into(),
                max_upload_bytes: 1024,
            },
            ResearchAssistant::new(fake.clone(), web),
            HealthService::new(Some(1)).unwrap(),
            cfg,
        );
        (Arc::new(state), fake)
    }

    fn app() -> (Router, Arc<FakeCompletion>) {
        let (state, fake) = state_with(Vec::new(), WebAugmenter::disabled());
        (router(state), fake)
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_ask(body: Value) -> Request<Body> {
        Request::post("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn ask_appends_two_turns_and_returns_the_reply() {
        let (app, fake) = app();
        let (status, body) = call(&app, post_ask(json!({"question": "What is quantum entanglement?"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["reply"], "Entangled states are correlated.");
        assert_eq!(body["data"]["model"], "gpt-4o");
        assert_eq!(body["data"]["fell_back"], false);
        assert_eq!(body["data"]["conversation"].as_array().unwrap().len(), 2);
        assert_eq!(fake.seen.lock().unwrap()[0].len(), 2);

        let (_, history) = call(&app, get("/history")).await;
        assert_eq!(history["data"]["turns"], 2);
        assert_eq!(history["data"]["conversation"][0]["role"], "user");
    }

    #[tokio::test]
    async fn blank_question_is_rejected_without_touching_history() {
        let (app, fake) = app();
        let (status, body) = call(&app, post_ask(json!({"question": "   "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_QUESTION");
        assert!(fake.seen.lock().unwrap().is_empty());

        let (_, history) = call(&app, get("/history")).await;
        assert_eq!(history["data"]["turns"], 0);
    }

    #[tokio::test]
    async fn double_failure_is_a_bad_gateway_and_keeps_the_question() {
        let (state, _) = state_with(vec![ModelId::MistralSmall, ModelId::Gpt4o], WebAugmenter::disabled());
        let app = router(state);
        let req = json!({"question": "q", "model": "mistralai/mistral-small-3.1-24b-instruct:free"});
        let (status, body) = call(&app, post_ask(req)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "COMPLETION_FAILED");

        let (_, history) = call(&app, get("/history")).await;
        assert_eq!(history["data"]["turns"], 1);
    }

    #[tokio::test]
    async fn fallback_is_reported() {
        let (state, _) = state_with(vec![ModelId::DeepseekChat], WebAugmenter::disabled());
        let app = router(state);
        let req = json!({"question": "q", "model": "deepseek/deepseek-chat-v3-0324:free"});
        let (status, body) = call(&app, post_ask(req)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["fell_back"], true);
        assert_eq!(body["data"]["model"], "gpt-4o");
        assert_eq!(body["data"]["statuses"][0]["level"], "warning");
    }

    #[tokio::test]
    async fn web_block_and_text_upload_reach_the_model() {
        let (state, fake) = state_with(Vec::new(), WebAugmenter::new(Arc::new(OneHit)));
        let app = router(state);
        let req = json!({
            "question": "Is entanglement real?",
            "use_web": true,
            "upload": {"file_name": "notes.txt", "data_base64": STANDARD.encode("lab notes")}
        });
        let (status, body) = call(&app, post_ask(req)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["web_results"], 1);
        assert_eq!(body["data"]["context_chars"], 9);

        let seen = fake.seen.lock().unwrap();
        let msgs = &seen[0];
        assert_eq!(msgs.len(), 4);
        assert!(msgs[1].content.ends_with("lab notes"));
        assert!(msgs[2].content.contains("([source](https://example.org/bell))"));
    }

    #[tokio::test]
    async fn unsupported_upload_type_is_a_warning() {
        let (app, fake) = app();
        let req = json!({
            "question": "q",
            "upload": {"file_name": "slides.pptx", "data_base64": STANDARD.encode("x")}
        });
        let (status, body) = call(&app, post_ask(req)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["context_chars"], 0);
        assert!(
            body["data"]["statuses"][0]["text"]
                .as_str()
                .unwrap()
                .starts_with("Upload ignored")
        );
        assert_eq!(fake.seen.lock().unwrap()[0].len(), 2);
    }

    #[tokio::test]
    async fn request_errors_use_the_envelope() {
        let (app, _) = app();

        let (status, body) = call(&app, post_ask(json!({"question": "q", "temperature": 3.0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["path"], "temperature");

        let (status, body) = call(
            &app,
            post_ask(json!({"question": "q", "upload": {"data_base64": "%%%"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["path"], "upload.data_base64");

        let big = STANDARD.encode(vec![b'a'; 2048]);
        let (status, body) = call(
            &app,
            post_ask(json!({"question": "q", "upload": {"file_name": "a.txt", "data_base64": big}})),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);

        let (status, body) = call(&app, post_ask(json!({"question": "q", "model": "gpt-5"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["path"], "model");

        let (status, body) = call(&app, post_ask(json!({"question": "q", "temperature": "hot"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
        assert_eq!(body["error"]["details"][0]["path"], "temperature");

        let (_, history) = call(&app, get("/history")).await;
        assert_eq!(history["data"]["turns"], 0);
    }

    #[tokio::test]
    async fn export_is_a_markdown_attachment() {
        let (app, _) = app();
        call(&app, post_ask(json!({"question": "Hello"}))).await;

        let res = app.clone().oneshot(get("/history/export")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"session_"));
        assert!(disposition.ends_with(".md\""));

        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(
            text,
            "**🧑 You:** Hello\n\n**🤖 Assistant:** Entangled states are correlated."
        );
    }

    #[tokio::test]
    async fn omitted_use_web_follows_search_availability() {
        let (state, fake) = state_with(Vec::new(), WebAugmenter::new(Arc::new(OneHit)));
        let app = router(state);

        let (_, settings) = call(&app, get("/settings")).await;
        assert_eq!(settings["data"]["use_web_default"], true);

        let (status, body) = call(&app, post_ask(json!({"question": "Is entanglement real?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["web_results"], 1);

        let (_, body) = call(&app, post_ask(json!({"question": "again", "use_web": false}))).await;
        assert_eq!(body["data"]["web_results"], 0);
        assert_eq!(fake.seen.lock().unwrap()[1].len(), 4);
    }

    #[tokio::test]
    async fn missing_content_type_uses_the_envelope() {
        let (app, _) = app();
        let req = Request::post("/ask")
            .body(Body::from(r#"{"question":"q"}"#))
            .unwrap();
        let (status, body) = call(&app, req).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert!(
            body["error"]["details"][0]["hint"]
                .as_str()
                .unwrap()
                .contains("Content-Type")
        );
    }

    #[tokio::test]
    async fn settings_lists_the_catalog() {
        let (app, _) = app();
        let (status, body) = call(&app, get("/settings")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["models"].as_array().unwrap().len(), 4);
        assert_eq!(body["data"]["fallback_model"], "gpt-4o");
        assert_eq!(body["data"]["temperature"]["max"], 1.5);
        assert_eq!(body["data"]["max_tokens"]["min"], 64);
        assert_eq!(body["data"]["web_search_available"], false);
        assert_eq!(body["data"]["use_web_default"], false);
    }

    #[tokio::test]
    async fn health_reports_invalid_endpoint_as_unavailable() {
        let (app, _) = app();
        let (status, body) = call(&app, get("/health")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["data"]["completion"]["ok"], false);
    }
}
