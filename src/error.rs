// vault-core - Epic Games marketplace vault downloader core
// Copyright (C) 2026 vault-core contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Error types for vault-core
//!
//! Errors fall into a few distinct classes with different handling policies:
//!
//! - **Protocol contract violations** (`MissingCsrfToken`, `OauthStepFailed`,
//!   `InvalidApiResponse`): the platform no longer behaves the way this crate
//!   expects. Fatal, never retried; indicates upstream API drift.
//! - **Rejected credentials / MFA codes** are *not* errors at all: they come
//!   back as [`crate::api::auth::LoginStatus`] values so callers can re-prompt
//!   in a loop.
//! - **Transient network failures** are retried locally (chunk downloads) and
//!   escalated once the retry budget is exhausted.
//! - **Integrity failures** (`ManifestIntegrity`, `IncompleteChunkSet`): the
//!   chunk set cannot produce correct output files. Fatal for the asset and
//!   detected before any reassembled file is written.

use thiserror::Error;

/// Result type alias using [`VaultError`]
pub type Result<T> = std::result::Result<T, VaultError>;

/// Main error type for vault-core
#[derive(Error, Debug)]
pub enum VaultError {
    // ===== Protocol contract errors =====

    /// The XSRF-TOKEN cookie was absent from the jar when a step required it.
    /// The platform sets this cookie on every `/id/api/csrf` call; its absence
    /// means the cookie contract changed upstream.
    #[error("no XSRF-TOKEN cookie in the jar during {step}")]
    MissingCsrfToken { step: &'static str },

    /// One step of the OAuth exchange chain returned a non-200 status.
    /// The chain has no partial-success state; the whole exchange must be
    /// restarted from cookie priming.
    #[error("OAuth exchange failed at {step} (status {status_code})")]
    OauthStepFailed {
        step: &'static str,
        status_code: u16,
    },

    /// An API call that must succeed returned a non-200 status
    #[error("API request failed: {message}")]
    ApiRequestFailed {
        message: String,
        status_code: Option<u16>,
        endpoint: Option<String>,
    },

    /// The response body did not match the expected JSON shape
    #[error("invalid API response: {message}")]
    InvalidApiResponse {
        message: String,
        response_body: Option<String>,
    },

    // ===== Download errors =====

    /// A single chunk exhausted its retry budget
    #[error("chunk {guid} failed after {attempts} attempts: {last_error}")]
    ChunkDownloadFailed {
        guid: String,
        attempts: u32,
        last_error: String,
    },

    /// One or more chunks could not be downloaded; the set is unusable for
    /// reassembly and the operation must not proceed to decoding
    #[error("{} of {total} chunks failed to download", missing.len())]
    IncompleteChunkSet {
        missing: Vec<String>,
        total: usize,
    },

    // ===== Integrity errors =====

    /// A manifest file entry references a chunk guid with no corresponding
    /// hash/data-group entry, or a decoded chunk is missing at reassembly time
    #[error("manifest integrity violation: chunk {guid} is referenced but unavailable")]
    ManifestIntegrity { guid: String },

    /// A 24-digit encoded hash/offset/size field could not be decoded
    #[error("invalid 24-digit chunk hash encoding: {value:?}")]
    InvalidChunkHash { value: String },

    /// A chunk container header is truncated or malformed
    #[error("invalid chunk container: {0}")]
    ChunkHeader(String),

    /// A manifest filename would escape the extraction directory
    #[error("unsafe manifest filename: {0}")]
    UnsafeManifestPath(String),

    // ===== General errors =====

    /// Operation aborted through the cancellation token
    #[error("operation cancelled")]
    Cancelled,

    // ===== External library errors =====

    /// HTTP client error from reqwest (connect failure, timeout, bad URL)
    #[error("HTTP client error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Create an `ApiRequestFailed` error
    pub fn api_failed<S: Into<String>>(
        message: S,
        status_code: Option<u16>,
        endpoint: Option<String>,
    ) -> Self {
        VaultError::ApiRequestFailed {
            message: message.into(),
            status_code,
            endpoint,
        }
    }

    /// Create an `InvalidApiResponse` error
    pub fn invalid_response<S: Into<String>>(message: S, response_body: Option<String>) -> Self {
        VaultError::InvalidApiResponse {
            message: message.into(),
            response_body,
        }
    }

    /// Whether this error might succeed if the same request is retried.
    ///
    /// Integrity and contract violations never qualify; only transport-level
    /// failures do.
    pub fn is_retryable(&self) -> bool {
        match self {
            VaultError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            VaultError::ApiRequestFailed {
                status_code: Some(500..=599),
                ..
            } => true,
            _ => false,
        }
    }

    /// Whether this error means the session must be re-established from
    /// cookie priming onwards
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            VaultError::MissingCsrfToken { .. } | VaultError::OauthStepFailed { .. }
        )
    }
}
