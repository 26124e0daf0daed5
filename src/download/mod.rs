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


//! Manifest-driven asset download pipeline
//!
//! [`download_asset`] runs the full sequence for one asset version:
//!
//! 1. fetch build info and the manifest it names
//! 2. derive chunk URLs ([`chunks`]) and validate manifest integrity
//! 3. download all chunks concurrently ([`manager`])
//! 4. decode chunk containers to raw payloads ([`decode`])
//! 5. reassemble output files from payload byte ranges ([`extract`])
//!
//! The phases are strict barriers: decoding starts only once every chunk is
//! on disk, reassembly only once every container is decoded. An incomplete
//! chunk set therefore aborts the run instead of producing silently corrupt
//! output files.

pub mod chunks;
pub mod decode;
pub mod extract;
pub mod manager;
pub mod progress;

pub use chunks::{build_chunk_list, AssetChunk};
pub use decode::{decode_chunk, decode_chunk_dir};
pub use extract::extract_asset_files;
pub use manager::{download_chunk_list, DownloadOptions};
pub use progress::{Phase, ProgressEvent, ProgressSink};

use crate::api::auth::OauthToken;
use crate::api::build::{get_build_info_from, get_manifest, DownloadRequest};
use crate::api::transport::Transport;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Download one asset version end to end, returning the directory holding
/// the reassembled files
pub async fn download_asset(
    transport: &Transport,
    token: &OauthToken,
    download_dir: &Path,
    request: &DownloadRequest,
    options: &DownloadOptions,
    progress: Option<ProgressSink>,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let build_info =
        get_build_info_from(transport, token, request, &options.launcher_service).await?;
    let manifest = get_manifest(transport, &build_info).await?;
    info!(
        asset = %build_info.asset_id,
        app = %manifest.app_name_string,
        files = manifest.file_manifest_list.len(),
        chunks = manifest.chunk_hash_list.len(),
        "starting asset download"
    );

    let chunk_list = build_chunk_list(&build_info, &manifest)?;

    let chunk_dir = download_chunk_list(
        transport,
        &manifest,
        &chunk_list,
        download_dir,
        options,
        progress.as_ref(),
        cancel,
    )
    .await?;

    decode_chunk_dir(&chunk_dir, progress.as_ref()).await?;

    let extract_dir = extract_asset_files(&manifest, &chunk_dir, progress.as_ref()).await?;
    info!(dir = %extract_dir.display(), "asset download complete");
    Ok(extract_dir)
}
