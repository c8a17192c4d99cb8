//! Upload endpoints.
//!
//! Handlers never fail at the HTTP layer: transport problems (a body that
//! cannot be read, a broken multipart stream) are turned into an internal
//! rejection and reported in the same `IntakeResponse` body as validation
//! failures.
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use ingest::{
    report, IngestError, IngestSource, IntakeResponse, MultipartUpload, UploadedFile,
    ValidationOutcome, FILE_FIELD,
};

use crate::config::StatusCodePolicy;
use crate::state::ServerState;

/// `POST /pdf/upload`
pub async fn upload_pdf(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let outcome = match multipart {
        Ok(multipart) => match read_multipart(multipart).await {
            Ok(upload) => state.pipeline.process_multipart(upload).await,
            Err(err) => state.pipeline.reject(
                IngestSource::Multipart,
                IngestError::Internal(err.body_text()),
            ),
        },
        Err(rejection) => state.pipeline.reject(
            IngestSource::Multipart,
            IngestError::Internal(rejection.body_text()),
        ),
    };
    respond(state.config.status_codes, outcome)
}

/// `POST /pdf/upload-base64`
pub async fn upload_pdf_base64(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let outcome = match body {
        Ok(body) => state.pipeline.process_base64_body(&body).await,
        Err(rejection) => state.pipeline.reject(
            IngestSource::Base64,
            IngestError::Internal(rejection.body_text()),
        ),
    };
    respond(state.config.status_codes, outcome)
}

/// `POST /pdf/upload-any-json`
///
/// Accepts any readable body without parsing it.
pub async fn upload_any_json(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => Json(state.pipeline.acknowledge_raw_json(&body)).into_response(),
        Err(rejection) => {
            let err = IngestError::Internal(rejection.body_text());
            tracing::warn!(error = %err, "raw_json_unreadable");
            let status = status_for(state.config.status_codes, Some(&err));
            (status, Json(IntakeResponse::failure(err.to_string()))).into_response()
        }
    }
}

/// Buffers a multipart stream. The first `file` part that carries a filename
/// becomes the upload; every part without a filename is kept as a text field.
async fn read_multipart(mut multipart: Multipart) -> Result<MultipartUpload, MultipartError> {
    let mut upload = MultipartUpload::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match field.file_name().map(str::to_owned) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                if name == FILE_FIELD && upload.file.is_none() {
                    upload.file = Some(UploadedFile {
                        filename,
                        content_type,
                        bytes,
                    });
                } else {
                    tracing::debug!(field = %name, filename = %filename, "ignoring extra file part");
                }
            }
            None => {
                let value = field.text().await?;
                upload.push_field(name, value);
            }
        }
    }

    Ok(upload)
}

pub(crate) fn status_for(policy: StatusCodePolicy, rejection: Option<&IngestError>) -> StatusCode {
    match (policy, rejection) {
        (StatusCodePolicy::Conventional, Some(err)) => StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        _ => StatusCode::OK,
    }
}

fn respond(policy: StatusCodePolicy, outcome: ValidationOutcome) -> Response {
    let status = status_for(policy, outcome.rejection());
    (status, Json(report(outcome))).into_response()
}
