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


//! Owned marketplace asset listing
//!
//! The launcher assets index returns everything the account is entitled to,
//! including the engine itself and non-marketplace namespaces; the listing
//! here filters down to vault content (`ue` namespace, `assets` / `projects`
//! / `plugins` categories) and resolves each remaining item against the
//! catalog service for its human-readable detail. Detail fetches run
//! serially; the catalog service is touchy about session handshakes.

use crate::api::auth::OauthToken;
use crate::api::build::LAUNCHER_SERVICE;
use crate::api::parse_json;
use crate::api::transport::Transport;
use crate::error::{Result, VaultError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Production catalog service host
pub const CATALOG_SERVICE: &str = "https://catalog-public-service-prod06.ol.epicgames.com";

/// One row of the launcher assets index
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedAsset {
    pub app_name: String,
    #[serde(default)]
    pub label_name: String,
    pub build_version: String,
    pub catalog_item_id: String,
    pub namespace: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyImage {
    #[serde(rename = "type")]
    pub image_type: String,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    #[serde(default)]
    pub id: Option<String>,
    pub app_id: String,
    #[serde(default)]
    pub compatible_apps: Option<Vec<String>>,
    #[serde(default)]
    pub platform: Vec<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub version_title: Option<String>,
}

/// Catalog detail for one marketplace item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetail {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    /// HTML blob
    #[serde(default)]
    pub technical_details: Option<String>,
    #[serde(default)]
    pub key_images: Vec<KeyImage>,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub namespace: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub entitlement_name: Option<String>,
    #[serde(default)]
    pub release_info: Vec<ReleaseInfo>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub end_of_support: Option<bool>,
}

/// Engine version one release of an item is compatible with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    /// Display form, e.g. "4.23"
    pub title: String,
    /// Version id to request as the download `version_id`
    pub app_id: String,
    /// Raw compatible-app token, e.g. "UE_4.23"
    pub version: String,
    pub minor_version: u32,
}

/// Expand a catalog detail's release list into downloadable engine versions,
/// newest first
pub fn engine_versions_for_item(detail: &AssetDetail) -> Vec<EngineVersion> {
    let mut versions = Vec::new();

    for release in &detail.release_info {
        let Some(compatible) = &release.compatible_apps else {
            continue;
        };
        for app in compatible {
            let Ok(minor) = app.replace("UE_4.", "").parse::<u32>() else {
                continue;
            };
            versions.push(EngineVersion {
                title: format!("4.{minor}"),
                app_id: release.app_id.clone(),
                version: app.clone(),
                minor_version: minor,
            });
        }
    }

    versions.sort_by(|a, b| b.minor_version.cmp(&a.minor_version));
    versions
}

/// List the account's vault assets with catalog detail, sorted by title
pub async fn get_owned_assets(transport: &Transport, token: &OauthToken) -> Result<Vec<AssetDetail>> {
    get_owned_assets_from(transport, token, LAUNCHER_SERVICE, CATALOG_SERVICE).await
}

/// As [`get_owned_assets`], against explicit service base URLs
pub async fn get_owned_assets_from(
    transport: &Transport,
    token: &OauthToken,
    launcher_base: &str,
    catalog_base: &str,
) -> Result<Vec<AssetDetail>> {
    let auth_header = HeaderValue::from_str(&token.authorization_value())
        .map_err(|_| VaultError::api_failed("invalid authorization header", None, None))?;
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth_header.clone());

    let endpoint = format!(
        "{}/launcher/api/public/assets/Windows?label=Live",
        launcher_base.trim_end_matches('/')
    );
    let response = transport.get(&endpoint, headers).await?;
    if response.status() != StatusCode::OK {
        return Err(VaultError::api_failed(
            "could not list owned assets",
            Some(response.status().as_u16()),
            Some(endpoint),
        ));
    }
    let index: Vec<OwnedAsset> = parse_json(response).await?;

    // marketplace vault content lives in the "ue" namespace; "UE" is the
    // engine itself
    let assets: Vec<&OwnedAsset> = index
        .iter()
        .filter(|a| a.namespace == "ue" && a.asset_id != "UE")
        .collect();

    if assets.is_empty() {
        return Err(VaultError::api_failed(
            "no owned assets found; the account may need to accept the launcher EULA, \
             or it owns zero marketplace items",
            None,
            None,
        ));
    }

    let mut details: Vec<AssetDetail> = Vec::new();
    for asset in assets {
        let endpoint = format!(
            "{}/catalog/api/shared/bulk/items?id={}&includeDLCDetails=false\
             &includeMainGameDetails=false&country=US&locale=en",
            catalog_base.trim_end_matches('/'),
            asset.catalog_item_id
        );
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_header.clone());

        let response = transport.get(&endpoint, headers).await?;
        if response.status() != StatusCode::OK {
            return Err(VaultError::api_failed(
                format!("could not get catalog detail for asset {}", asset.asset_id),
                Some(response.status().as_u16()),
                Some(endpoint),
            ));
        }

        let mut by_id: HashMap<String, AssetDetail> = parse_json(response).await?;
        let Some(detail) = by_id.remove(&asset.catalog_item_id) else {
            debug!(catalog_item_id = %asset.catalog_item_id, "catalog response missing item");
            continue;
        };

        let is_vault_item = detail
            .categories
            .iter()
            .any(|c| matches!(c.path.as_str(), "assets" | "projects" | "plugins"));
        if is_vault_item {
            details.push(detail);
        }
    }

    details.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(details)
}
