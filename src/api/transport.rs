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


//! HTTP transport shared across the login-to-download lifecycle
//!
//! One [`Transport`] owns one reqwest client and one cookie jar, and every
//! request of a session goes through it: the login flow depends on cookies
//! set by earlier steps being replayed on later ones, including the
//! cross-domain hop to the secondary site during the OAuth exchange.
//!
//! Two deliberate non-features:
//!
//! - No status validation. Callers always get the [`Response`] back and
//!   inspect the status themselves; several login outcomes are encoded in
//!   non-2xx statuses and must not surface as transport errors.
//! - No retry or timeout policy. Those are layered per call site: the chunk
//!   downloader passes an explicit per-request timeout, the auth flow runs
//!   with the client defaults.

use crate::error::Result;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// User agent the launcher presents to the id and distribution services
pub const LAUNCHER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    EpicGamesLauncher/10.13.1-11497744+++Portal+Release-Live \
    UnrealEngine/4.23.0-11497744+++Portal+Release-Live \
    Chrome/59.0.3071.15 Safari/537.36";

/// HTTP session with a persistent cookie jar
///
/// Cheap to clone is not a goal; the session is owned by one
/// [`crate::api::auth::AuthSession`] and borrowed by the download pipeline.
#[derive(Debug)]
pub struct Transport {
    client: Client,
    jar: Arc<Jar>,
}

impl Transport {
    /// Build a transport with a fresh, empty cookie jar
    pub fn new() -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(LAUNCHER_USER_AGENT)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self { client, jar })
    }

    /// GET with explicit headers; any status is returned as `Ok`
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<Response> {
        let response = self.client.get(url).headers(headers).send().await?;
        Ok(response)
    }

    /// GET with a per-request timeout, used by the chunk downloader
    pub async fn get_with_timeout(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await?;
        Ok(response)
    }

    /// POST a JSON body with explicit headers
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    /// POST a url-encoded form body with explicit headers
    pub async fn post_form<B: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: HeaderMap,
        form: &B,
    ) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .form(form)
            .send()
            .await?;
        Ok(response)
    }

    /// Read a cookie value for `site` back out of the jar.
    ///
    /// The jar only exposes the assembled `Cookie` request header, so the
    /// value is recovered by splitting the `name=value` pairs.
    pub fn cookie_value(&self, site: &str, name: &str) -> Option<String> {
        let url = Url::parse(site).ok()?;
        let header = self.jar.cookies(&url)?;
        let cookies = header.to_str().ok()?.to_string();

        for pair in cookies.split("; ") {
            if let Some((key, value)) = pair.split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_reads_back_from_jar() {
        let transport = Transport::new().unwrap();
        let url = Url::parse("https://www.example.com/").unwrap();
        transport
            .jar
            .add_cookie_str("XSRF-TOKEN=abc123; Path=/", &url);
        transport.jar.add_cookie_str("other=zzz; Path=/", &url);

        assert_eq!(
            transport.cookie_value("https://www.example.com/", "XSRF-TOKEN"),
            Some("abc123".to_string())
        );
        assert_eq!(
            transport.cookie_value("https://www.example.com/", "other"),
            Some("zzz".to_string())
        );
        assert_eq!(
            transport.cookie_value("https://www.example.com/", "missing"),
            None
        );
        // different site, cookie does not apply
        assert_eq!(
            transport.cookie_value("https://elsewhere.com/", "XSRF-TOKEN"),
            None
        );
    }
}
