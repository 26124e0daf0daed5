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


//! File reassembly from decoded chunks
//!
//! Each manifest file entry lists the chunk parts that make it up, in output
//! order: for every part, `size` bytes are read from the named chunk's raw
//! payload starting at `offset`, and the slices are concatenated. Offsets are
//! positions inside the source chunk, not the output file.
//!
//! Output files land under `extracted/` next to the chunk directory, with the
//! manifest's relative path recreated beneath it. Manifest paths are data
//! from the network, so anything that would escape the extraction root is
//! rejected before a byte is written.

use crate::api::build::Manifest;
use crate::codec;
use crate::download::progress::{Phase, PhaseReporter, ProgressSink};
use crate::error::{Result, VaultError};
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

/// Reassemble every manifest file from `{guid}.chunk-raw` payloads in
/// `chunk_dir`, returning the extraction directory
pub async fn extract_asset_files(
    manifest: &Manifest,
    chunk_dir: &Path,
    progress: Option<&ProgressSink>,
) -> Result<PathBuf> {
    let extract_dir = chunk_dir
        .parent()
        .unwrap_or(chunk_dir)
        .join("extracted");
    if extract_dir.exists() {
        tokio::fs::remove_dir_all(&extract_dir).await?;
    }
    tokio::fs::create_dir_all(&extract_dir).await?;

    let reporter = PhaseReporter::start(progress, Phase::Extract, manifest.file_manifest_list.len());

    let mut finished = 0usize;
    for file in &manifest.file_manifest_list {
        let relative = safe_relative_path(&file.filename)?;
        let output_path = extract_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut total = 0usize;
        for part in &file.file_chunk_parts {
            total += codec::decode_packed_u64(&part.size)? as usize;
        }
        let mut buffer = vec![0u8; total];

        let mut cursor = 0usize;
        for part in &file.file_chunk_parts {
            let offset = codec::decode_packed_u64(&part.offset)?;
            let size = codec::decode_packed_u64(&part.size)? as usize;

            let raw_path = chunk_dir.join(format!("{}.chunk-raw", part.guid));
            let mut raw = tokio::fs::File::open(&raw_path).await.map_err(|_| {
                VaultError::ManifestIntegrity {
                    guid: part.guid.clone(),
                }
            })?;
            raw.seek(SeekFrom::Start(offset)).await?;
            raw.read_exact(&mut buffer[cursor..cursor + size]).await?;
            cursor += size;
        }

        tokio::fs::write(&output_path, &buffer).await?;
        debug!(file = %file.filename, bytes = total, "extracted");

        finished += 1;
        reporter.progress(finished);
    }

    reporter.end();
    Ok(extract_dir)
}

/// Validate a manifest filename as a relative path that stays inside the
/// extraction root
fn safe_relative_path(filename: &str) -> Result<PathBuf> {
    let path = Path::new(filename);
    let mut relative = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return Err(VaultError::UnsafeManifestPath(filename.to_string())),
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(VaultError::UnsafeManifestPath(filename.to_string()));
    }
    Ok(relative)
}
