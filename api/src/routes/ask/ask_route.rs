//! POST /ask: runs one research round against the session conversation.

use std::sync::Arc;

use ai_llm_service::{
    AiLlmError, CompletionParams, ModelId, config::model_catalog, error_handler::ConfigError,
};
use axum::{
    extract::{Json, State},
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use context_extractor::{DocumentKind, Upload};
use research_core::{StatusMessage, Submission};
use tracing::{info, instrument, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::{AskRequest, AskResponse, UploadPayload},
};

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is quantum entanglement?","use_web":true}'
/// ```
#[instrument(name = "ask_route", skip_all)]
pub async fn ask_route(
    State(state): State<Arc<AppState>>,
    Json(r): Json<AskRequest>,
) -> AppResult<Response> {
    let params = params_from(&r)?;
    let mut leading = Vec::new();
    let upload = match r.upload {
        Some(payload) => decode_upload(payload, state.config.max_upload_bytes, &mut leading)?,
        None => None,
    };

    let submission = Submission {
        question: r.question,
        params,
        use_web: r.use_web.unwrap_or_else(|| state.assistant.web_available()),
        upload,
        pasted: r.pasted_text,
    };

    // Held for the whole round: one round at a time per session.
    let mut conversation = state.conversation.lock().await;
    let outcome = state.assistant.submit(&mut conversation, submission).await?;
    info!(
        model = %outcome.model,
        fell_back = outcome.fell_back,
        turns = conversation.len(),
        "round completed"
    );

    Ok(ApiResponse::ok(AskResponse::new(
        outcome,
        leading,
        conversation.clone(),
    )))
}

/// Generation settings with catalog defaults for omitted fields.
fn params_from(r: &AskRequest) -> AppResult<CompletionParams> {
    let model = match r.model.as_deref() {
        Some(id) => id.parse::<ModelId>().map_err(|e| {
            let ids: Vec<_> = ModelId::ALL.iter().map(|m| m.as_str()).collect();
            AppError::bad_field("model", e.to_string(), format!("Use one of: {}", ids.join(", ")))
        })?,
        None => ModelId::default(),
    };
    let temperature = r.temperature.unwrap_or(model_catalog::DEFAULT_TEMPERATURE);
    let max_tokens = r.max_tokens.unwrap_or(model_catalog::DEFAULT_MAX_TOKENS);

    CompletionParams::new(model, temperature, max_tokens).map_err(|e| {
        let (min_t, max_t) = model_catalog::TEMPERATURE_RANGE;
        let (min_n, max_n) = model_catalog::MAX_TOKENS_RANGE;
        let path = match &e {
            AiLlmError::Config(ConfigError::OutOfRange { field, .. }) => *field,
            _ => "max_tokens",
        };
        AppError::bad_field(
            path,
            e.to_string(),
            format!("temperature must be in {min_t}..={max_t}, max_tokens in {min_n}..={max_n}"),
        )
    })
}

/// Decodes the inline document.
///
/// Bad base64 and oversized payloads are request errors. An unsupported
/// document type only drops the upload and adds a warning.
fn decode_upload(
    payload: UploadPayload,
    limit: usize,
    statuses: &mut Vec<StatusMessage>,
) -> AppResult<Option<Upload>> {
    let bytes = STANDARD.decode(payload.data_base64.trim()).map_err(|e| {
        AppError::bad_field(
            "upload.data_base64",
            format!("upload is not valid base64: {e}"),
            "Encode the file with standard base64 (RFC 4648, with padding).",
        )
    })?;

    if bytes.len() > limit {
        return Err(AppError::PayloadTooLarge {
            size: bytes.len(),
            limit,
        });
    }

    let kind = match DocumentKind::detect(
        payload.content_type.as_deref(),
        payload.file_name.as_deref(),
    ) {
        Ok(kind) => kind,
        Err(e) => {
            warn!(file = ?payload.file_name, error = %e, "upload ignored");
            statuses.push(StatusMessage::warning(format!(
                "Upload ignored: {e}. Only PDF and plain-text files are supported."
            )));
            return Ok(None);
        }
    };

    let upload = Upload::new(kind, bytes);
    Ok(Some(match payload.file_name {
        Some(name) => upload.with_file_name(name),
        None => upload,
    }))
}
