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


//! Web login flow against the id service
//!
//! The platform has no public credential-grant OAuth endpoint, so sessions
//! are established the way the launcher's embedded browser does it:
//!
//! 1. [`AuthSession::prime_cookies`] — a fixed sequence of bootstrap GETs
//!    whose only purpose is filling the jar with the tracking, reputation and
//!    locale cookies later calls expect. Best effort, failures ignored.
//! 2. [`AuthSession::login`] — fetch a fresh `XSRF-TOKEN` cookie, then POST
//!    the credentials (plus a pre-solved captcha token) with the CSRF token
//!    echoed in `X-XSRF-TOKEN`. Status 431 means an MFA challenge follows.
//! 3. [`AuthSession::submit_mfa`] — re-fetch the CSRF cookie (the token can
//!    rotate) and POST the code. 400/409 mean a wrong code; callers loop.
//! 4. [`AuthSession::exchange_oauth_token`] — walk the redirect → set-sid →
//!    authenticate → exchange chain to obtain a one-time exchange code, then
//!    swap it for a bearer token at the account service using the launcher's
//!    public client credentials.
//!
//! Ordering within the flow is load-bearing: each step reads cookie state the
//! previous step wrote, so no two steps may ever run concurrently on one
//! session. Rejections (wrong password, wrong code) are ordinary
//! [`LoginStatus`] values rather than errors; a missing CSRF cookie is the
//! opposite, a fatal [`VaultError::MissingCsrfToken`] signalling that the
//! platform changed its cookie contract.
//!
//! The issued token lives about eight hours. There is deliberately no refresh
//! logic; one token outlives one run and the next run logs in again.

use crate::api::parse_json;
use crate::api::transport::Transport;
use crate::error::{Result, VaultError};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

/// Production id service host
pub const ID_SERVICE: &str = "https://www.epicgames.com";

/// Secondary-domain host the session id is bound to during the exchange
pub const SID_BIND_SERVICE: &str = "https://www.unrealengine.com";

/// Account service token endpoint
pub const OAUTH_TOKEN_ENDPOINT: &str =
    "https://account-public-service-prod03.ol.epicgames.com/account/api/oauth/token";

/// Bootstrap script fetched during cookie priming
const TRACKING_SCRIPT: &str = "https://tracking.epicgames.com/tracking.js";

/// Fixed basic-auth header carrying the launcher's public client id/secret
const LAUNCHER_BASIC_AUTH: &str =
    "basic MzRhMDJjZjhmNDQxNGUyOWIxNTkyMTg3NmRhMzZmOWE6ZGFhZmJjY2M3Mzc3NDUwMzlkZmZlNTNkOTRmYzc2Y2Y=";

/// Strategy flags the id service expects on every login-flow request
const STRATEGY_FLAGS: &str = "guardianEmailVerifyEnabled=true;\
guardianEmbeddedDocusignEnabled=true;guardianKwsFlowEnabled=false;\
minorPreRegisterEnabled=false;registerEmailPreVerifyEnabled=false";

/// Outcome of a credential or MFA submission
///
/// `NeedsMfa` is an expected, loopable state, not a failure; `Error` covers
/// rejected credentials and unexpected statuses alike and leaves the decision
/// to re-prompt with the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    LoggedIn,
    NeedsMfa,
    Error,
}

/// Second-factor channel for [`AuthSession::submit_mfa`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaMethod {
    /// Code sent to the account email address
    Email,
    /// Code from an authenticator application
    Authenticator,
}

impl MfaMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MfaMethod::Email => "email",
            MfaMethod::Authenticator => "authenticator",
        }
    }
}

/// Bearer credential returned by the account service token endpoint.
///
/// Immutable once issued; subsequent API calls send
/// `Authorization: {token_type} {access_token}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthToken {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub account_id: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refresh_expires: Option<u64>,
    #[serde(default)]
    pub refresh_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub internal_client: Option<bool>,
    #[serde(default)]
    pub client_service: Option<String>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub in_app_id: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

impl OauthToken {
    /// Value for the `Authorization` header of authenticated API calls
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Deserialize)]
struct SidResponse {
    sid: String,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    code: String,
}

/// Login/MFA/OAuth-exchange state machine
///
/// Owns the [`Transport`] (and with it the cookie jar) for the whole
/// session; the jar plus the current XSRF token are the only mutable state.
#[derive(Debug)]
pub struct AuthSession {
    transport: Transport,
    id_base: String,
    sid_bind_base: String,
    token_endpoint: String,
}

impl AuthSession {
    /// Session against the production endpoints
    pub fn new() -> Result<Self> {
        Ok(Self::with_endpoints(
            Transport::new()?,
            ID_SERVICE,
            SID_BIND_SERVICE,
            OAUTH_TOKEN_ENDPOINT,
        ))
    }

    /// Session against explicit endpoints (fixture servers in tests)
    pub fn with_endpoints(
        transport: Transport,
        id_base: &str,
        sid_bind_base: &str,
        token_endpoint: &str,
    ) -> Self {
        Self {
            transport,
            id_base: id_base.trim_end_matches('/').to_string(),
            sid_bind_base: sid_bind_base.trim_end_matches('/').to_string(),
            token_endpoint: token_endpoint.to_string(),
        }
    }

    /// Borrow the underlying transport, e.g. for the download pipeline
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fill the cookie jar with the tracking/reputation/locale cookies the id
    /// service expects to see on later calls. Response bodies are discarded
    /// and individual failures are logged and ignored.
    pub async fn prime_cookies(&self) {
        let urls = [
            format!("{}/id/login", self.id_base),
            TRACKING_SCRIPT.to_string(),
            format!("{}/id/api/i18n", self.id_base),
            format!("{}/id/api/reputation", self.id_base),
            format!("{}/id/api/location", self.id_base),
            format!("{}/id/api/authenticate", self.id_base),
            format!("{}/id/api/analytics", self.id_base),
        ];

        for url in urls {
            if let Err(e) = self.transport.get(&url, HeaderMap::new()).await {
                debug!(url = %url, error = %e, "cookie priming request failed");
            }
        }
    }

    /// Submit credentials plus a pre-solved captcha token.
    ///
    /// Status mapping: 200 -> `LoggedIn`, 431 -> `NeedsMfa`, anything else ->
    /// `Error` (status and body are logged for diagnosis, not returned).
    pub async fn login(&self, email: &str, password: &str, captcha: &str) -> Result<LoginStatus> {
        self.fetch_csrf_cookie(None, "login").await?;
        let xsrf = self.xsrf_token("login")?;

        let body = json!({
            "email": email,
            "password": password,
            "rememberMe": true,
            "captcha": captcha,
        });

        let headers = self.event_headers("login", "/id/login", Some(&xsrf))?;
        let response = self
            .transport
            .post_json(&format!("{}/id/api/login", self.id_base), headers, &body)
            .await?;

        match response.status().as_u16() {
            200 => Ok(LoginStatus::LoggedIn),
            431 => Ok(LoginStatus::NeedsMfa),
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(status, body = %body, "login rejected");
                Ok(LoginStatus::Error)
            }
        }
    }

    /// Submit a second-factor code.
    ///
    /// The CSRF cookie is re-fetched first because the token may rotate after
    /// the credential submission. 400 and 409 mean the code was wrong and the
    /// caller should prompt again; 200 completes the login.
    pub async fn submit_mfa(&self, method: MfaMethod, code: &str) -> Result<LoginStatus> {
        let xsrf = self.xsrf_token("mfa")?;
        self.fetch_csrf_cookie(Some(&xsrf), "mfa").await?;
        let xsrf = self.xsrf_token("mfa")?;

        let body = json!({
            "method": method.as_str(),
            "code": code,
            "rememberDevice": true,
        });

        let headers = self.event_headers("mfa", "/id/login/mfa", Some(&xsrf))?;
        let response = self
            .transport
            .post_json(
                &format!("{}/id/api/login/mfa", self.id_base),
                headers,
                &body,
            )
            .await?;

        match response.status().as_u16() {
            200 => Ok(LoginStatus::LoggedIn),
            400 | 409 => Ok(LoginStatus::NeedsMfa),
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(status, body = %body, "MFA submission rejected");
                Ok(LoginStatus::Error)
            }
        }
    }

    /// Walk the redirect/set-sid/authenticate/exchange chain and swap the
    /// resulting one-time code for a bearer token.
    ///
    /// There is no partial success: a non-200 on any step fails the whole
    /// exchange with that step named, and recovery means starting over from
    /// [`AuthSession::prime_cookies`].
    pub async fn exchange_oauth_token(&self) -> Result<OauthToken> {
        let xsrf = self.xsrf_token("oauth exchange")?;

        // 1. a short-lived session id
        let headers = self.event_headers("login", "/id/login", Some(&xsrf))?;
        let response = self
            .transport
            .get(&format!("{}/id/api/redirect?", self.id_base), headers)
            .await?;
        let sid: SidResponse = Self::expect_200(response, "redirect").await?;
        debug!("obtained session id");

        // 2. bind the sid on the secondary domain
        let mut headers = self.event_headers("login", "/id/login", Some(&xsrf))?;
        headers.insert(
            reqwest::header::ORIGIN,
            HeaderValue::from_str(&self.id_base)
                .map_err(|_| VaultError::api_failed("invalid origin header", None, None))?,
        );
        headers.remove(HeaderName::from_static("referrer"));
        let response = self
            .transport
            .get(
                &format!("{}/id/api/set-sid?sid={}", self.sid_bind_base, sid.sid),
                headers,
            )
            .await?;
        Self::check_200(&response, "set-sid")?;

        // 3. authenticate; response body is irrelevant, the side effect counts
        let headers = self.event_headers("login", "/id/login/welcome", Some(&xsrf))?;
        let response = self
            .transport
            .get(&format!("{}/id/api/authenticate", self.id_base), headers)
            .await?;
        Self::check_200(&response, "authenticate")?;

        // 4. one-time exchange code
        let headers = self.event_headers("login", "/id/login/welcome", Some(&xsrf))?;
        let response = self
            .transport
            .get(&format!("{}/id/api/exchange", self.id_base), headers)
            .await?;
        let exchange: ExchangeResponse = Self::expect_200(response, "exchange").await?;
        debug!("obtained exchange code");

        // 5. swap the code for a bearer token using the launcher client creds
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_static(LAUNCHER_BASIC_AUTH),
        );
        let form = [
            ("grant_type", "exchange_code"),
            ("exchange_code", exchange.code.as_str()),
            ("token_type", "eg1"),
        ];
        let response = self
            .transport
            .post_form(&self.token_endpoint, headers, &form)
            .await?;
        let token: OauthToken = Self::expect_200(response, "token").await?;
        debug!(account_id = %token.account_id, "OAuth exchange complete");

        Ok(token)
    }

    /// GET `/id/api/csrf` so the jar holds a fresh XSRF-TOKEN cookie
    async fn fetch_csrf_cookie(&self, xsrf: Option<&str>, _step: &'static str) -> Result<()> {
        let headers = self.event_headers("login", "/id/login", xsrf)?;
        self.transport
            .get(&format!("{}/id/api/csrf", self.id_base), headers)
            .await?;
        Ok(())
    }

    /// Read the current XSRF token out of the jar; absence is fatal
    fn xsrf_token(&self, step: &'static str) -> Result<String> {
        self.transport
            .cookie_value(&self.id_base, "XSRF-TOKEN")
            .ok_or(VaultError::MissingCsrfToken { step })
    }

    /// Fixed header set the id service requires on login-flow requests.
    ///
    /// "Referrer" is the literal header name the platform checks for, not the
    /// standard "Referer".
    fn event_headers(
        &self,
        action: &'static str,
        referrer_path: &str,
        xsrf: Option<&str>,
    ) -> Result<HeaderMap> {
        let bad_value = |what: &str| VaultError::api_failed(format!("invalid {what}"), None, None);

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("referrer"),
            HeaderValue::from_str(&format!("{}{}", self.id_base, referrer_path))
                .map_err(|_| bad_value("referrer header"))?,
        );
        headers.insert(
            HeaderName::from_static("x-epic-event-action"),
            HeaderValue::from_static(action),
        );
        headers.insert(
            HeaderName::from_static("x-epic-event-category"),
            HeaderValue::from_static("login"),
        );
        headers.insert(
            HeaderName::from_static("x-epic-strategy-flags"),
            HeaderValue::from_static(STRATEGY_FLAGS),
        );
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        if let Some(token) = xsrf {
            headers.insert(
                HeaderName::from_static("x-xsrf-token"),
                HeaderValue::from_str(token).map_err(|_| bad_value("XSRF token value"))?,
            );
        }
        Ok(headers)
    }

    /// Non-200 on an exchange-chain step fails the whole chain
    fn check_200(response: &reqwest::Response, step: &'static str) -> Result<()> {
        if response.status() != StatusCode::OK {
            return Err(VaultError::OauthStepFailed {
                step,
                status_code: response.status().as_u16(),
            });
        }
        Ok(())
    }

    /// As [`Self::check_200`], then parse the JSON body
    async fn expect_200<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        step: &'static str,
    ) -> Result<T> {
        Self::check_200(&response, step)?;
        parse_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mfa_method_wire_names() {
        assert_eq!(MfaMethod::Email.as_str(), "email");
        assert_eq!(MfaMethod::Authenticator.as_str(), "authenticator");
    }

    #[test]
    fn token_authorization_value() {
        let token: OauthToken = serde_json::from_value(serde_json::json!({
            "access_token": "abc",
            "token_type": "bearer",
            "refresh_token": "def",
            "account_id": "acc1",
            "expires_in": 28800,
        }))
        .unwrap();
        assert_eq!(token.authorization_value(), "bearer abc");
        assert_eq!(token.expires_in, 28800);
        assert!(token.display_name.is_none());
    }

    #[test]
    fn token_parses_full_response() {
        let token: OauthToken = serde_json::from_value(serde_json::json!({
            "access_token": "eg1~abc",
            "expires_in": 28800,
            "expires_at": "2026-01-01T08:00:00.000Z",
            "token_type": "bearer",
            "refresh_token": "xyz",
            "refresh_expires": 1987200,
            "refresh_expires_at": "2026-01-24T00:00:00.000Z",
            "account_id": "0123456789abcdef",
            "client_id": "34a02cf8f4414e29b15921876da36f9a",
            "internal_client": true,
            "client_service": "launcher",
            "displayName": "someone",
            "app": "launcher",
            "in_app_id": "0123456789abcdef",
            "device_id": "fedcba9876543210"
        }))
        .unwrap();
        assert_eq!(token.display_name.as_deref(), Some("someone"));
        assert_eq!(token.refresh_expires, Some(1987200));
        assert!(token.expires_at.is_some());
    }
}
