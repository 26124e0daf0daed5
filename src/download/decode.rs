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


//! Chunk container decoding
//!
//! A downloaded `.chunk` file is a container: a variable-size header followed
//! by the payload. Byte 8 of the file holds the header size; byte 40 of the
//! header is the compression flag. Flag value 1 means the payload is a zlib
//! stream, anything else means the payload is stored as-is.
//!
//! Decoding writes a `{guid}.chunk-raw` sibling next to each container so
//! reassembly can seek into plain byte ranges without re-inflating.

use crate::download::progress::{Phase, PhaseReporter, ProgressSink};
use crate::error::{Result, VaultError};
use flate2::read::ZlibDecoder;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Offset of the header-size byte within the container
const HEADER_SIZE_OFFSET: usize = 8;
/// Offset of the compression flag within the header
const COMPRESSION_FLAG_OFFSET: usize = 40;
/// Compression flag value marking a zlib payload
const COMPRESSED: u8 = 1;

/// Decode one chunk container into its raw payload bytes
pub fn decode_chunk(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() <= HEADER_SIZE_OFFSET {
        return Err(VaultError::ChunkHeader(format!(
            "container is {} bytes, too short for a header-size field",
            data.len()
        )));
    }

    let header_size = data[HEADER_SIZE_OFFSET] as usize;
    if header_size <= COMPRESSION_FLAG_OFFSET || data.len() < header_size {
        return Err(VaultError::ChunkHeader(format!(
            "header size {} does not fit a {}-byte container",
            header_size,
            data.len()
        )));
    }

    let payload = &data[header_size..];
    if data[COMPRESSION_FLAG_OFFSET] == COMPRESSED {
        let mut raw = Vec::new();
        ZlibDecoder::new(payload)
            .read_to_end(&mut raw)
            .map_err(|e| VaultError::ChunkHeader(format!("zlib payload: {e}")))?;
        Ok(raw)
    } else {
        Ok(payload.to_vec())
    }
}

/// Decode every `.chunk` container in `chunk_dir` into a `.chunk-raw` sibling.
///
/// Returns the number of containers decoded. Emits one decode-phase
/// start/progress/end sequence over the sink.
pub async fn decode_chunk_dir(
    chunk_dir: &Path,
    progress: Option<&ProgressSink>,
) -> Result<usize> {
    let mut containers = Vec::new();
    let mut entries = tokio::fs::read_dir(chunk_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("chunk") {
            containers.push(path);
        }
    }
    containers.sort();

    let reporter = PhaseReporter::start(progress, Phase::Decode, containers.len());

    let mut finished = 0usize;
    for path in &containers {
        let data = tokio::fs::read(path).await?;
        let raw = decode_chunk(&data)?;

        let mut raw_path = path.clone();
        raw_path.set_extension("chunk-raw");
        tokio::fs::write(&raw_path, &raw).await?;
        debug!(container = %path.display(), raw_bytes = raw.len(), "decoded chunk");

        finished += 1;
        reporter.progress(finished);
    }

    reporter.end();
    Ok(finished)
}
