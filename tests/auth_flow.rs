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


//! Login flow integration tests against a local fixture id service

use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use vault_core::{AuthSession, LoginStatus, MfaMethod, Transport, VaultError};

/// Serve a router on an ephemeral local port
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn set_csrf_cookie() -> impl IntoResponse {
    ([(header::SET_COOKIE, "XSRF-TOKEN=tok1; Path=/")], "")
}

/// Login handler mapping the submitted email onto the documented status codes
async fn login_by_email(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    match body["email"].as_str() {
        Some("ok@example.com") => StatusCode::OK,
        Some("mfa@example.com") => {
            // the id service signals a pending MFA challenge with 431
            StatusCode::from_u16(431).unwrap()
        }
        _ => StatusCode::FORBIDDEN,
    }
}

fn session_against(addr: SocketAddr) -> AuthSession {
    let base = format!("http://{addr}");
    let token_endpoint = format!("{base}/account/api/oauth/token");
    AuthSession::with_endpoints(Transport::new().unwrap(), &base, &base, &token_endpoint)
}

#[tokio::test]
async fn login_maps_status_codes_onto_outcomes() {
    let app = Router::new()
        .route("/id/api/csrf", get(set_csrf_cookie))
        .route("/id/api/login", post(login_by_email));
    let addr = serve(app).await;

    let session = session_against(addr);
    assert_eq!(
        session.login("ok@example.com", "pw", "").await.unwrap(),
        LoginStatus::LoggedIn
    );
    assert_eq!(
        session.login("mfa@example.com", "pw", "").await.unwrap(),
        LoginStatus::NeedsMfa
    );
    assert_eq!(
        session.login("wrong@example.com", "bad", "").await.unwrap(),
        LoginStatus::Error
    );
}

#[tokio::test]
async fn missing_csrf_cookie_is_fatal() {
    // csrf endpoint answers but never sets the cookie
    let app = Router::new().route("/id/api/csrf", get(|| async { "" }));
    let addr = serve(app).await;

    let session = session_against(addr);
    let err = session.login("ok@example.com", "pw", "").await.unwrap_err();
    assert!(matches!(err, VaultError::MissingCsrfToken { step: "login" }));
}

#[tokio::test]
async fn wrong_mfa_code_loops_correct_code_completes() {
    async fn mfa(Json(body): Json<serde_json::Value>) -> StatusCode {
        if body["code"] == "123456" && body["method"] == "email" {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        }
    }

    let app = Router::new()
        .route("/id/api/csrf", get(set_csrf_cookie))
        .route("/id/api/login", post(login_by_email))
        .route("/id/api/login/mfa", post(mfa));
    let addr = serve(app).await;

    let session = session_against(addr);
    assert_eq!(
        session.login("mfa@example.com", "pw", "").await.unwrap(),
        LoginStatus::NeedsMfa
    );
    assert_eq!(
        session.submit_mfa(MfaMethod::Email, "000000").await.unwrap(),
        LoginStatus::NeedsMfa
    );
    assert_eq!(
        session.submit_mfa(MfaMethod::Email, "123456").await.unwrap(),
        LoginStatus::LoggedIn
    );
}

#[tokio::test]
async fn oauth_exchange_walks_the_full_chain() {
    async fn set_sid(Query(params): Query<HashMap<String, String>>) -> StatusCode {
        if params.get("sid").map(String::as_str) == Some("sid-1") {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        }
    }

    async fn token(body: String) -> impl IntoResponse {
        assert!(body.contains("grant_type=exchange_code"));
        assert!(body.contains("exchange_code=code-1"));
        assert!(body.contains("token_type=eg1"));
        Json(serde_json::json!({
            "access_token": "eg1~abc",
            "token_type": "bearer",
            "refresh_token": "ref",
            "account_id": "acc1",
            "expires_in": 28800,
        }))
    }

    let app = Router::new()
        .route("/id/api/csrf", get(set_csrf_cookie))
        .route("/id/api/login", post(login_by_email))
        .route(
            "/id/api/redirect",
            get(|| async { Json(serde_json::json!({"sid": "sid-1"})) }),
        )
        .route("/id/api/set-sid", get(set_sid))
        .route("/id/api/authenticate", get(|| async { "" }))
        .route(
            "/id/api/exchange",
            get(|| async { Json(serde_json::json!({"code": "code-1"})) }),
        )
        .route("/account/api/oauth/token", post(token));
    let addr = serve(app).await;

    let session = session_against(addr);
    assert_eq!(
        session.login("ok@example.com", "pw", "").await.unwrap(),
        LoginStatus::LoggedIn
    );

    let token = session.exchange_oauth_token().await.unwrap();
    assert_eq!(token.access_token, "eg1~abc");
    assert_eq!(token.account_id, "acc1");
    assert_eq!(token.authorization_value(), "bearer eg1~abc");
}

#[tokio::test]
async fn failed_chain_step_names_the_step() {
    let app = Router::new()
        .route("/id/api/csrf", get(set_csrf_cookie))
        .route("/id/api/login", post(login_by_email))
        .route(
            "/id/api/redirect",
            get(|| async { Json(serde_json::json!({"sid": "sid-1"})) }),
        )
        .route(
            "/id/api/set-sid",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    let addr = serve(app).await;

    let session = session_against(addr);
    session.login("ok@example.com", "pw", "").await.unwrap();

    let err = session.exchange_oauth_token().await.unwrap_err();
    assert!(matches!(
        err,
        VaultError::OauthStepFailed {
            step: "set-sid",
            status_code: 500
        }
    ));
    assert!(err.is_session_fatal());
}
