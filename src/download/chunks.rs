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


//! Chunk URL derivation from a manifest
//!
//! The chunk store layout is reverse-engineered from launcher traffic, e.g.:
//!
//! ```text
//! https://download.epicgames.com/Builds/Rocket/Automated/MagicEffects411/CloudDir/ChunksV3/22/AAC7EF867364B218_CE3BE4D54E7B4ECE663C8EAC2D8929D6.chunk
//! ```
//!
//! i.e. `{chunk distribution}{chunk path directory}/ChunksV3/{2-digit data
//! group}/{reversed-hex hash}_{guid}.chunk`. Any deviation from this
//! derivation produces 404s at download time, so it is covered by fixtures.

use crate::api::build::{BuildInfo, Manifest};
use crate::codec;
use crate::error::{Result, VaultError};

/// Suffix appended to the chunk path directory
const CHUNKS_V3_SEGMENT: &str = "/ChunksV3/";

/// Download location for one chunk, derived from manifest + build info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetChunk {
    pub guid: String,
    /// Canonical 16-char hex hash
    pub hash: String,
    pub url: String,
    /// Local name inside the chunk directory, `{guid}.chunk`
    pub filename: String,
}

/// Derive the download URL and local filename for every chunk the manifest
/// references.
///
/// Validates the manifest's integrity invariant first: every guid referenced
/// by a file entry must have a `ChunkHashList` and `DataGroupList` entry.
/// Violations fail here, before any network or filesystem work.
pub fn build_chunk_list(build_info: &BuildInfo, manifest: &Manifest) -> Result<Vec<AssetChunk>> {
    for guid in manifest.referenced_guids() {
        if !manifest.chunk_hash_list.contains_key(guid)
            || !manifest.data_group_list.contains_key(guid)
        {
            return Err(VaultError::ManifestIntegrity {
                guid: guid.to_string(),
            });
        }
    }

    let base_url = chunk_base_url(build_info);

    let mut chunks = Vec::with_capacity(manifest.chunk_hash_list.len());
    for (guid, encoded_hash) in &manifest.chunk_hash_list {
        let hash = codec::decode_chunk_hash(encoded_hash)?;
        let group_value = manifest
            .data_group_list
            .get(guid)
            .ok_or_else(|| VaultError::ManifestIntegrity { guid: guid.clone() })?
            .parse::<u64>()
            .map_err(|_| VaultError::ManifestIntegrity { guid: guid.clone() })?;
        let group = codec::pad_number_left(group_value, 2);

        chunks.push(AssetChunk {
            guid: guid.clone(),
            url: format!("{base_url}{group}/{hash}_{guid}.chunk"),
            filename: format!("{guid}.chunk"),
            hash,
        });
    }

    Ok(chunks)
}

/// Chunk store root: distribution + the directory part of the chunk path +
/// the ChunksV3 segment
fn chunk_base_url(build_info: &BuildInfo) -> String {
    let path = &build_info.items.chunks.path;
    let dir = match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => path.as_str(),
    };
    format!(
        "{}{}{}",
        build_info.items.chunks.distribution, dir, CHUNKS_V3_SEGMENT
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build::BuildInfo;

    fn build_info() -> BuildInfo {
        serde_json::from_value(serde_json::json!({
            "appName": "MagicEffects411",
            "buildVersion": "1.0.0",
            "catalogItemId": "cat1",
            "items": {
                "MANIFEST": {
                    "distribution": "https://download.example.com",
                    "path": "/Builds/MagicEffects411/CloudDir/manifest.json",
                    "signature": "sig"
                },
                "CHUNKS": {
                    "distribution": "https://download.example.com",
                    "path": "/Builds/MagicEffects411/CloudDir/chunks.json"
                }
            },
            "assetId": "MagicEffects"
        }))
        .unwrap()
    }

    fn manifest(json: serde_json::Value) -> Manifest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn derives_chunk_url_and_filename() {
        let manifest = manifest(serde_json::json!({
            "AppNameString": "MagicEffects411",
            "FileManifestList": [{
                "Filename": "a.uasset",
                "FileChunkParts": [
                    {"Guid": "CE3BE4D5", "Offset": "000000000000000000000000", "Size": "001000000000000000000000"}
                ]
            }],
            "ChunkHashList": {"CE3BE4D5": "024178100115134239199170"},
            "DataGroupList": {"CE3BE4D5": "22"}
        }));

        let chunks = build_chunk_list(&build_info(), &manifest).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].url,
            "https://download.example.com/Builds/MagicEffects411/CloudDir/ChunksV3/22/AAC7EF867364B218_CE3BE4D5.chunk"
        );
        assert_eq!(chunks[0].filename, "CE3BE4D5.chunk");
        assert_eq!(chunks[0].hash, "AAC7EF867364B218");
    }

    #[test]
    fn single_digit_data_group_is_zero_padded() {
        let manifest = manifest(serde_json::json!({
            "AppNameString": "App",
            "FileManifestList": [],
            "ChunkHashList": {"G1": "001002003004005006007008"},
            "DataGroupList": {"G1": "4"}
        }));

        let chunks = build_chunk_list(&build_info(), &manifest).unwrap();
        assert!(chunks[0].url.contains("/ChunksV3/04/"));
    }

    #[test]
    fn referenced_guid_missing_from_hash_list_is_fatal() {
        let manifest = manifest(serde_json::json!({
            "AppNameString": "App",
            "FileManifestList": [{
                "Filename": "a.uasset",
                "FileChunkParts": [
                    {"Guid": "MISSING", "Offset": "000000000000000000000000", "Size": "001000000000000000000000"}
                ]
            }],
            "ChunkHashList": {"OTHER": "001002003004005006007008"},
            "DataGroupList": {"OTHER": "0"}
        }));

        let err = build_chunk_list(&build_info(), &manifest).unwrap_err();
        assert!(matches!(
            err,
            VaultError::ManifestIntegrity { guid } if guid == "MISSING"
        ));
    }

    #[test]
    fn referenced_guid_missing_from_data_group_list_is_fatal() {
        let manifest = manifest(serde_json::json!({
            "AppNameString": "App",
            "FileManifestList": [{
                "Filename": "a.uasset",
                "FileChunkParts": [
                    {"Guid": "G1", "Offset": "000000000000000000000000", "Size": "001000000000000000000000"}
                ]
            }],
            "ChunkHashList": {"G1": "001002003004005006007008"},
            "DataGroupList": {}
        }));

        assert!(matches!(
            build_chunk_list(&build_info(), &manifest).unwrap_err(),
            VaultError::ManifestIntegrity { .. }
        ));
    }
}
