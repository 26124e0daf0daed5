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


//! Client for the platform's id, launcher and catalog services
//!
//! [`transport`] carries the shared cookie-jar HTTP session, [`auth`] drives
//! the web login flow, [`build`] fetches build info and manifests, and
//! [`assets`] lists the account's purchased marketplace items.

pub mod assets;
pub mod auth;
pub mod build;
pub mod transport;

pub use assets::{get_owned_assets, AssetDetail, EngineVersion};
pub use auth::{AuthSession, LoginStatus, MfaMethod, OauthToken};
pub use build::{get_build_info, get_manifest, BuildInfo, Manifest};
pub use transport::Transport;

use crate::error::{Result, VaultError};

/// Parse a JSON response body, keeping the raw text for the error when the
/// shape does not match
pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let endpoint = response.url().path().to_string();
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        VaultError::invalid_response(format!("{endpoint}: {e}"), Some(text))
    })
}
