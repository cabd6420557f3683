// HTTP request handlers
use crate::domain::credentials::ServiceAccountCredentials;
use crate::domain::navigation::{navigation_cards, PageId};
use crate::domain::session::Session;
use crate::infrastructure::chunked_stream::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Local, NaiveDate};
use serde_json::json;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "session";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn current_session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    state
        .sessions
        .resolve(jar.get(SESSION_COOKIE).map(|c| c.value()))
        .await
}

async fn require_session(state: &AppState, jar: &CookieJar) -> Result<Session, AppError> {
    current_session(state, jar).await.ok_or(AppError::Unauthenticated)
}

fn session_cookie(session: &Session, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.id.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Send the user back to the page they were on, or to the login page
pub async fn root(State(state): State<Arc<AppState>>, jar: CookieJar) -> Redirect {
    match current_session(&state, &jar).await {
        Some(session) => Redirect::to(&session.current_page.path()),
        None => Redirect::to("/login"),
    }
}

pub async fn login_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.renderer.login(None)?))
}

/// Credential upload: validate the file, prove it can reach the API, then open a session
pub async fn upload_credentials(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, AppError> {
    match live_login(&state, multipart).await {
        Ok(session) => {
            let target = session.current_page.path();
            Ok((jar.add(session_cookie(&session, state.secure_cookies)), Redirect::to(&target)).into_response())
        }
        Err(e) => {
            tracing::warn!("Login rejected: {}", e);
            let html = state.renderer.login(Some(&e.to_string()))?;
            Ok((e.status(), Html(html)).into_response())
        }
    }
}

async fn live_login(state: &AppState, mut multipart: Multipart) -> Result<Session, AppError> {
    let mut upload = None;
    let mut remember = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("credentials") => {
                let bytes = field.bytes().await.map_err(|e| AppError::BadRequest(e.to_string()))?;
                upload = Some(bytes);
            }
            Some("remember") => {
                let value = field.text().await.map_err(|e| AppError::BadRequest(e.to_string()))?;
                remember = matches!(value.as_str(), "on" | "true" | "1");
            }
            _ => {}
        }
    }

    let upload = upload
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("no credentials file uploaded".to_string()))?;

    let credentials = ServiceAccountCredentials::from_json(&upload)?;
    state.repository.check_connection(&credentials).await?;

    Ok(state.sessions.start_live(credentials, remember).await)
}

pub async fn demo_login(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let session = state.sessions.start_demo().await;
    let target = session.current_page.path();
    (jar.add(session_cookie(&session, state.secure_cookies)), Redirect::to(&target))
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(session) = current_session(&state, &jar).await {
        state.sessions.end(session.id).await;
        tracing::info!(session = %session.id, "Logged out");
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/login"),
    )
}

/// Render one dashboard page
pub async fn show_page(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(session) = current_session(&state, &jar).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let Some(page) = PageId::from_slug(&slug) else {
        let html = state.renderer.not_found(&slug)?;
        let err = AppError::NotFound(slug);
        tracing::debug!("{}", err);
        return Ok((err.status(), Html(html)).into_response());
    };

    state.sessions.visit(session.id, page).await;

    let as_of = today();
    let loaded = state.dashboard_service.load(&session, as_of).await;
    let html = state.renderer.page(page, &session, &loaded, as_of)?;
    Ok(Html(html).into_response())
}

pub async fn api_navigation() -> impl IntoResponse {
    Json(navigation_cards())
}

pub async fn api_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let session = require_session(&state, &jar).await?;
    let loaded = state.dashboard_service.load(&session, today()).await;

    Ok(match json_response(&loaded.summary, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    })
}

/// Stream the dashboard (progressive loading)
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let session = require_session(&state, &jar).await?;
    let compress = accepts_brotli(&headers);

    let rx = state.streaming_service.stream_dashboard(session, today()).await;
    Ok(stream_from_receiver(rx, compress).await.into_response())
}

pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = require_session(&state, &jar).await?;

    match session.credentials() {
        Some(credentials) => {
            state.repository.check_connection(credentials).await?;
            Ok(Json(json!({ "ok": true, "account": credentials.client_email })))
        }
        None => Ok(Json(json!({ "ok": true, "mode": "demo" }))),
    }
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = require_session(&state, &jar).await?;

    if let Some(owner) = session.cache_owner() {
        state.repository.invalidate(&owner).await;
    }
    Ok(Json(json!({ "refreshed": true })))
}
