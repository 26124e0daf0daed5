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


//! Core library for downloading purchased Unreal Engine marketplace assets
//! from the vault, outside the launcher.
//!
//! The crate has two halves:
//!
//! - [`api`]: an HTTP session ([`Transport`]) plus the web login flow
//!   ([`AuthSession`]) that turns email/password (and MFA) into a launcher
//!   OAuth token, and the service calls that token unlocks: owned-asset
//!   listing, build info, manifests.
//! - [`download`]: the manifest-driven pipeline that fetches chunks
//!   concurrently, decodes their containers, and reassembles the asset's
//!   files byte-for-byte.
//!
//! Typical use:
//!
//! ```no_run
//! use vault_core::{
//!     download_asset, AuthSession, DownloadOptions, DownloadRequest, LoginStatus,
//! };
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> vault_core::Result<()> {
//! let session = AuthSession::new()?;
//! session.prime_cookies().await;
//! match session.login("user@example.com", "hunter2", "").await? {
//!     LoginStatus::LoggedIn => {}
//!     LoginStatus::NeedsMfa => { /* prompt, then session.submit_mfa(...) */ }
//!     LoginStatus::Error => { /* bad credentials or captcha challenge */ }
//! }
//! let token = session.exchange_oauth_token().await?;
//!
//! let request = DownloadRequest {
//!     asset_id: "MagicEffects".into(),
//!     version_id: "MagicEffects411".into(),
//! };
//! let extracted = download_asset(
//!     session.transport(),
//!     &token,
//!     Path::new("./downloads"),
//!     &request,
//!     &DownloadOptions::default(),
//!     None,
//!     &CancellationToken::new(),
//! )
//! .await?;
//! println!("asset files in {}", extracted.display());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod codec;
pub mod download;
pub mod error;

pub use api::assets::{engine_versions_for_item, get_owned_assets, AssetDetail, EngineVersion};
pub use api::auth::{AuthSession, LoginStatus, MfaMethod, OauthToken};
pub use api::build::{
    get_build_info, get_manifest, BuildInfo, DownloadRequest, FileManifest, Manifest,
};
pub use api::transport::Transport;
pub use download::{
    download_asset, DownloadOptions, Phase, ProgressEvent, ProgressSink,
};
pub use error::{Result, VaultError};
