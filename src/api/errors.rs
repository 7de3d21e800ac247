// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP error surface.
//!
//! Domain errors ([`CryptoError`], [`StoreError`]) are folded into one
//! [`ApiError`] that knows its status code and serializes as a structured
//! `{ error_type, message, details }` body. Internal failures keep their
//! detail in the logs, not in the response.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::crypto::CryptoError;
use crate::storage::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    Unauthorized(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    SessionKeyNotFound { session_id: String },
    SessionAlreadyBound { session_id: String },
    TransformFailure(String),
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::SessionKeyNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::SessionAlreadyBound { .. } => StatusCode::CONFLICT,
            ApiError::TransformFailure(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::SessionKeyNotFound { session_id } => {
                let mut details = HashMap::new();
                details.insert(
                    "session_id".to_string(),
                    serde_json::Value::String(session_id.clone()),
                );
                (
                    "session_key_not_found",
                    "No session key found. Call generate-key first.".to_string(),
                    Some(details),
                )
            }
            ApiError::SessionAlreadyBound { session_id } => {
                let mut details = HashMap::new();
                details.insert(
                    "session_id".to_string(),
                    serde_json::Value::String(session_id.clone()),
                );
                (
                    "session_already_bound",
                    "Session already holds a key".to_string(),
                    Some(details),
                )
            }
            ApiError::TransformFailure(msg) => ("transform_failure", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ API error: {:?}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::SessionKeyNotFound { session_id } => {
                ApiError::SessionKeyNotFound { session_id }
            }
            CryptoError::SessionAlreadyBound { session_id } => {
                ApiError::SessionAlreadyBound { session_id }
            }
            CryptoError::InvalidKey { key_type, reason } => {
                ApiError::InvalidRequest(format!("invalid {} key: {}", key_type, reason))
            }
            CryptoError::InvalidPayload { field, reason } => ApiError::ValidationError {
                field,
                message: reason,
            },
            CryptoError::TransformFailure { operation, reason } => {
                ApiError::TransformFailure(format!("{} failed: {}", operation, reason))
            }
            CryptoError::Store(e) => {
                tracing::error!("❌ Key store failure: {}", e);
                ApiError::InternalError("key store failure".to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ChatNotFound { chat_id } => {
                ApiError::NotFound(format!("Chat '{}' not found", chat_id))
            }
            StoreError::Unauthorized { chat_id } => {
                ApiError::Unauthorized(format!("Chat '{}' belongs to another user", chat_id))
            }
            StoreError::MissingCiphertext { .. } => ApiError::ValidationError {
                field: "ciphertext".to_string(),
                message: "Encrypted chat requires ciphertext, iv and session_id".to_string(),
            },
            StoreError::Database(e) => {
                tracing::error!("❌ Database failure: {}", e);
                ApiError::InternalError("database failure".to_string())
            }
        }
    }
}
