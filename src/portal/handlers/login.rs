//! Captive-portal login: throttle gate, credential check, connection log,
//! gateway callback.
//!
//! The form posts URL-encoded fields and the page renders the JSON
//! `{success, message}` it gets back, one status line per attempt. Order
//! matters: a locked or rate-limited client is turned away before any
//! validation or network call, and only real credential failures count
//! toward the lockout ladder.

use crate::{
    identity::IdentityError,
    logbook::ConnectionRecord,
    portal::{
        handlers::token::valid_token_shape,
        state::PortalState,
        types::{LoginForm, LoginResponse},
    },
    throttle::{fingerprint, Gate},
};
use axum::{
    extract::{Extension, Form},
    http::{
        header::{RETRY_AFTER, USER_AGENT},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::Json,
};
use chrono::{Local, SecondsFormat, Timelike, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

type LoginResult = (StatusCode, HeaderMap, Json<LoginResponse>);

#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<PortalState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> LoginResult {
    let now = Utc::now();
    let now_ms = now.timestamp_millis();

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let key = fingerprint(user_agent);

    if let Gate::Deny(denial) = state.throttle.check(&key, now_ms) {
        debug!("Throttled submission from {key}: {denial}");
        return deny(
            StatusCode::TOO_MANY_REQUESTS,
            Some(denial.retry_after_seconds()),
            denial.to_string(),
        );
    }

    let hour = u8::try_from(Local::now().hour()).unwrap_or(0);
    if !state.hours.allows(hour) {
        return deny(
            StatusCode::SERVICE_UNAVAILABLE,
            None,
            state.hours.denial_message(),
        );
    }

    if !valid_token_shape(&form.csrf_token) {
        return deny(
            StatusCode::UNPROCESSABLE_ENTITY,
            None,
            "Invalid or missing form token".to_string(),
        );
    }

    match state.identity.sign_in(&form.username, &form.password).await {
        Ok(identity) => {
            let record = ConnectionRecord {
                uid: identity.uid.clone(),
                email: identity.email.clone(),
                mac: form.clientmac.clone(),
                ip: form.clientip.clone(),
                login_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            };

            if let Err(err) = state.logbook.record(&record, now_ms).await {
                warn!("Connection log write failed: {err:?}");
                let failed = state.throttle.failure(&key, now_ms);
                debug!(attempts = failed.attempts, "Recorded failed attempt");
                return deny(
                    StatusCode::BAD_GATEWAY,
                    None,
                    "Network error. Please try again".to_string(),
                );
            }

            notify_gateway(&state, &form).await;

            state.throttle.success(&key);
            info!(uid = %identity.uid, "Portal login succeeded");
            respond(
                StatusCode::OK,
                None,
                LoginResponse::ok("Login successful! Redirecting..."),
            )
        }
        Err(err) if err.is_validation() => {
            // Rejected before any network call; not a failed attempt.
            deny(StatusCode::UNPROCESSABLE_ENTITY, None, err.to_string())
        }
        Err(err) => {
            let failed = state.throttle.failure(&key, now_ms);
            debug!(attempts = failed.attempts, "Recorded failed attempt");
            deny(status_for(&err), None, err.to_string())
        }
    }
}

async fn notify_gateway(state: &PortalState, form: &LoginForm) {
    match (&form.gw_address, form.gw_port, &form.clientmac) {
        (Some(gw_address), Some(gw_port), Some(client_mac)) => {
            state.gateway.authorize(gw_address, gw_port, client_mac).await;
        }
        _ => debug!("No gateway parameters on submission; skipping portal callback"),
    }
}

fn status_for(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::UserNotFound
        | IdentityError::WrongPassword
        | IdentityError::Provider(_) => StatusCode::UNAUTHORIZED,
        IdentityError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn respond(status: StatusCode, retry_after: Option<i64>, body: LoginResponse) -> LoginResult {
    let mut headers = HeaderMap::new();
    if let Some(seconds) = retry_after {
        if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
            headers.insert(RETRY_AFTER, value);
        }
    }
    (status, headers, Json(body))
}

fn deny(status: StatusCode, retry_after: Option<i64>, message: String) -> LoginResult {
    respond(status, retry_after, LoginResponse::error(message))
}
