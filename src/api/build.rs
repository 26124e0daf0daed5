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


//! Build info and manifest retrieval for one asset version
//!
//! Both documents are fetched once per download and are immutable afterwards.
//! Field names mirror the wire format exactly (camelCase on the launcher
//! service, PascalCase inside manifests); neither fetch retries — a non-200
//! here is fatal for the operation.

use crate::api::auth::OauthToken;
use crate::api::parse_json;
use crate::api::transport::Transport;
use crate::error::{Result, VaultError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;

/// Production launcher service host
pub const LAUNCHER_SERVICE: &str = "https://launcher-public-service-prod06.ol.epicgames.com";

/// Asset and version the caller wants to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub asset_id: String,
    pub version_id: String,
}

/// Where to fetch one distribution artifact (manifest or chunk tree)
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionLocation {
    pub distribution: String,
    pub path: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(rename = "additionalDistributions", default)]
    pub additional_distributions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildItems {
    #[serde(rename = "MANIFEST")]
    pub manifest: DistributionLocation,
    #[serde(rename = "CHUNKS")]
    pub chunks: DistributionLocation,
}

/// Build metadata for one (asset, version) pair
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub app_name: String,
    #[serde(default)]
    pub label_name: String,
    pub build_version: String,
    pub catalog_item_id: String,
    #[serde(default)]
    pub expires: Option<String>,
    pub items: BuildItems,
    pub asset_id: String,
}

/// One byte range inside a chunk, as referenced by a file entry.
///
/// `offset` and `size` use the same 24-digit triplet encoding as chunk
/// hashes; decode them with [`crate::codec::decode_packed_u64`].
#[derive(Debug, Clone, Deserialize)]
pub struct FileChunkPart {
    #[serde(rename = "Guid")]
    pub guid: String,
    #[serde(rename = "Offset")]
    pub offset: String,
    #[serde(rename = "Size")]
    pub size: String,
}

/// One output file described by the manifest
#[derive(Debug, Clone, Deserialize)]
pub struct FileManifest {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "FileHash", default)]
    pub file_hash: String,
    #[serde(rename = "FileChunkParts")]
    pub file_chunk_parts: Vec<FileChunkPart>,
}

/// File manifest for one asset version.
///
/// Invariant: every guid referenced from `file_manifest_list` must appear in
/// `chunk_hash_list`; [`crate::download::chunks::build_chunk_list`] checks
/// this before any network or filesystem work happens.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(rename = "ManifestFileVersion", default)]
    pub manifest_file_version: Option<String>,
    #[serde(rename = "AppNameString")]
    pub app_name_string: String,
    #[serde(rename = "BuildVersionString", default)]
    pub build_version_string: Option<String>,
    #[serde(rename = "FileManifestList")]
    pub file_manifest_list: Vec<FileManifest>,
    #[serde(rename = "ChunkHashList")]
    pub chunk_hash_list: HashMap<String, String>,
    #[serde(rename = "ChunkShaList", default)]
    pub chunk_sha_list: HashMap<String, String>,
    #[serde(rename = "DataGroupList")]
    pub data_group_list: HashMap<String, String>,
    #[serde(rename = "ChunkFilesizeList", default)]
    pub chunk_filesize_list: HashMap<String, String>,
    #[serde(rename = "CustomFields", default)]
    pub custom_fields: Option<serde_json::Value>,
}

impl Manifest {
    /// Guids of every chunk referenced by at least one file entry
    pub fn referenced_guids(&self) -> impl Iterator<Item = &str> {
        self.file_manifest_list
            .iter()
            .flat_map(|f| f.file_chunk_parts.iter())
            .map(|p| p.guid.as_str())
    }
}

/// Fetch build info for one asset version from the production launcher service
pub async fn get_build_info(
    transport: &Transport,
    token: &OauthToken,
    request: &DownloadRequest,
) -> Result<BuildInfo> {
    get_build_info_from(transport, token, request, LAUNCHER_SERVICE).await
}

/// Fetch build info from an explicit launcher service base URL
pub async fn get_build_info_from(
    transport: &Transport,
    token: &OauthToken,
    request: &DownloadRequest,
    service_base: &str,
) -> Result<BuildInfo> {
    let endpoint = format!(
        "{}/launcher/api/public/assets/Windows/{}/{}?label=Live",
        service_base.trim_end_matches('/'),
        request.asset_id,
        request.version_id
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&token.authorization_value())
            .map_err(|_| VaultError::api_failed("invalid authorization header", None, None))?,
    );

    let response = transport.get(&endpoint, headers).await?;
    if response.status() != StatusCode::OK {
        return Err(VaultError::api_failed(
            format!("could not get build info for asset {}", request.asset_id),
            Some(response.status().as_u16()),
            Some(endpoint),
        ));
    }

    parse_json(response).await
}

/// Fetch the manifest named by a build info document.
///
/// The URL is `{distribution}{path}?{signature}` verbatim; the signature
/// query authorizes the fetch, so no bearer header is sent.
pub async fn get_manifest(transport: &Transport, build_info: &BuildInfo) -> Result<Manifest> {
    let location = &build_info.items.manifest;
    let url = format!(
        "{}{}?{}",
        location.distribution,
        location.path,
        location.signature.as_deref().unwrap_or_default()
    );

    let response = transport.get(&url, HeaderMap::new()).await?;
    if response.status() != StatusCode::OK {
        return Err(VaultError::api_failed(
            format!(
                "could not get the manifest for asset {}",
                build_info.asset_id
            ),
            Some(response.status().as_u16()),
            Some(url),
        ));
    }

    parse_json(response).await
}
