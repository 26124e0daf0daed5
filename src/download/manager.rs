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


//! Concurrent chunk download with bounded waves and per-chunk retries
//!
//! Chunks are fetched in waves of `max_concurrent`; a wave completes before
//! the next one starts, so at most `max_concurrent` requests are ever in
//! flight. Each chunk retries independently inside its wave slot. Failures
//! never abort the run early: every chunk gets its full retry budget, and
//! only afterwards is the incomplete set reported as one error naming every
//! missing guid.

use crate::api::build::{Manifest, LAUNCHER_SERVICE};
use crate::api::transport::Transport;
use crate::download::chunks::AssetChunk;
use crate::download::progress::{Phase, PhaseReporter, ProgressSink};
use crate::error::{Result, VaultError};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Tuning knobs for the chunk download phase
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Upper bound on requests in flight at once
    pub max_concurrent: usize,
    /// Attempts per chunk before it counts as missing
    pub retry_attempts: u32,
    /// Per-request timeout; large chunks on slow links need generous room
    pub request_timeout: Duration,
    /// Launcher service base URL used by build-info fetches
    pub launcher_service: String,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            retry_attempts: 3,
            request_timeout: Duration::from_secs(50),
            launcher_service: LAUNCHER_SERVICE.to_string(),
        }
    }
}

/// Download every chunk in `chunk_list` into a fresh chunk directory.
///
/// The directory is `{download_dir}/{AppNameString}/chunks`, purged and
/// recreated before any request goes out so stale chunks from a previous run
/// can never leak into reassembly. Returns the chunk directory path.
pub async fn download_chunk_list(
    transport: &Transport,
    manifest: &Manifest,
    chunk_list: &[AssetChunk],
    download_dir: &Path,
    options: &DownloadOptions,
    progress: Option<&ProgressSink>,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let chunk_dir = download_dir
        .join(&manifest.app_name_string)
        .join("chunks");
    if chunk_dir.exists() {
        tokio::fs::remove_dir_all(&chunk_dir).await?;
    }
    tokio::fs::create_dir_all(&chunk_dir).await?;

    let reporter = PhaseReporter::start(progress, Phase::Download, chunk_list.len());

    let mut finished = 0usize;
    let mut missing: Vec<String> = Vec::new();

    for wave in chunk_list.chunks(options.max_concurrent.max(1)) {
        if cancel.is_cancelled() {
            return Err(VaultError::Cancelled);
        }

        let fetches = wave
            .iter()
            .map(|chunk| fetch_chunk(transport, chunk, &chunk_dir, options, cancel));
        let results = futures_util::future::join_all(fetches).await;

        for (chunk, result) in wave.iter().zip(results) {
            match result {
                Ok(()) => {
                    finished += 1;
                    reporter.progress(finished);
                }
                Err(VaultError::Cancelled) => return Err(VaultError::Cancelled),
                Err(e) => {
                    warn!(guid = %chunk.guid, error = %e, "chunk download failed");
                    missing.push(chunk.guid.clone());
                }
            }
        }
    }

    reporter.end();

    if !missing.is_empty() {
        return Err(VaultError::IncompleteChunkSet {
            missing,
            total: chunk_list.len(),
        });
    }

    Ok(chunk_dir)
}

/// Fetch one chunk with retries, writing it to `{chunk_dir}/{guid}.chunk`
async fn fetch_chunk(
    transport: &Transport,
    chunk: &AssetChunk,
    chunk_dir: &Path,
    options: &DownloadOptions,
    cancel: &CancellationToken,
) -> Result<()> {
    let attempts = options.retry_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(VaultError::Cancelled),
            outcome = fetch_chunk_once(transport, chunk, chunk_dir, options) => outcome,
        };

        match outcome {
            Ok(()) => {
                debug!(guid = %chunk.guid, attempt, "chunk stored");
                return Ok(());
            }
            Err(e) => {
                debug!(guid = %chunk.guid, attempt, error = %e, "chunk attempt failed");
                last_error = e.to_string();
            }
        }
    }

    Err(VaultError::ChunkDownloadFailed {
        guid: chunk.guid.clone(),
        attempts,
        last_error,
    })
}

async fn fetch_chunk_once(
    transport: &Transport,
    chunk: &AssetChunk,
    chunk_dir: &Path,
    options: &DownloadOptions,
) -> Result<()> {
    let response = transport
        .get_with_timeout(&chunk.url, HeaderMap::new(), options.request_timeout)
        .await?;

    if response.status() != StatusCode::OK {
        return Err(VaultError::api_failed(
            format!("chunk {} fetch returned non-200", chunk.guid),
            Some(response.status().as_u16()),
            Some(chunk.url.clone()),
        ));
    }

    let body = response.bytes().await?;
    tokio::fs::write(chunk_dir.join(&chunk.filename), &body).await?;
    Ok(())
}
