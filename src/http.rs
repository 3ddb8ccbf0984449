use crate::auth::{authorize_role_change, GateOutcome, RoleAction, TokenVerifier};
use crate::backend::{BookingOutcome, PortalBackend, RoleUpdate};
use crate::configuration::Configuration;
use crate::payments::PaymentGateway;
use crate::types::NewBooking;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{error, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct AppState<B, V, P> {
    backend: B,
    verifier: V,
    payments: P,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct UpsertUserRequest {
    #[validate(email)]
    email: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct RoleChangeRequest {
    #[validate(email)]
    email: String,
    action: RoleAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct BookingRequest {
    #[validate(length(min = 1))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    date: String,
    #[serde(flatten)]
    extra: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppointmentsQuery {
    email: String,
    date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookedResponse {
    message: String,
    inserted_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdminStatusResponse {
    admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct PaymentIntentRequest {
    #[validate(range(min = 1))]
    amount: u64,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_currency() -> String {
    "usd".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentResponse {
    client_secret: String,
}

pub fn create_app<B, V, P, C>(backend: B, verifier: V, payments: P, configuration: C) -> Router
where
    B: PortalBackend,
    V: TokenVerifier,
    P: PaymentGateway,
    C: Configuration,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        backend,
        verifier,
        payments,
    };

    Router::new()
        .route("/", get(welcome))
        .route("/users", get(all_users).put(upsert_user))
        .route("/users/admin", put(update_admin_role))
        .route("/users/:email", get(user_role))
        .route("/appoinments", get(list_appointments).post(book_appointment))
        .route("/availableslots", get(available_slots))
        .route("/create-payment-intent", post(create_payment_intent))
        .with_state(state)
        .layer(TimeoutLayer::new(configuration.request_timeout()))
        .layer(cors)
}

fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.into(),
    })
}

fn store_failure(err: String) -> Response {
    error!(?err, "Store operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, message("Storage unavailable")).into_response()
}

/// Turns the bearer header into an explicit caller identity. Missing or
/// rejected tokens resolve to `None`; verification failures are logged but
/// never fail the request.
async fn resolve_bearer<V: TokenVerifier>(verifier: &V, headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    match verifier.verify(token).await {
        Ok(email) => Some(email),
        Err(err) => {
            warn!(?err, "Bearer token verification failed");
            None
        }
    }
}

async fn welcome() -> &'static str {
    "Welcome to the Doctors Portal API"
}

async fn all_users<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
) -> Response {
    match state.backend.users() {
        Ok(users) => Json(users).into_response(),
        Err(err) => store_failure(err),
    }
}

async fn upsert_user<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
    Valid(Json(user)): Valid<Json<UpsertUserRequest>>,
) -> Response {
    match state.backend.upsert_user(&user.email, &user.display_name) {
        Ok(()) => message(format!("{} saved", user.email)).into_response(),
        Err(err) => store_failure(err),
    }
}

async fn user_role<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
    Path(email): Path<String>,
) -> Response {
    match state.backend.find_user(&email) {
        Ok(user) => Json(AdminStatusResponse {
            admin: user.is_some_and(|user| user.is_admin()),
        })
        .into_response(),
        Err(err) => store_failure(err),
    }
}

async fn update_admin_role<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
    headers: HeaderMap,
    Valid(Json(request)): Valid<Json<RoleChangeRequest>>,
) -> Response {
    let caller = resolve_bearer(&state.verifier, &headers).await;
    match authorize_role_change(
        &state.backend,
        caller.as_deref(),
        &request.email,
        request.action,
    ) {
        Ok(GateOutcome::SelfDemotion) => (
            StatusCode::FORBIDDEN,
            message("You can't remove your own admin role"),
        )
            .into_response(),
        Ok(GateOutcome::NoPermission) => (
            StatusCode::FORBIDDEN,
            message("You have no permission to modify roles"),
        )
            .into_response(),
        Ok(GateOutcome::Applied(update)) => {
            message(role_change_message(&request.email, request.action, update)).into_response()
        }
        Err(err) => store_failure(err),
    }
}

fn role_change_message(email: &str, action: RoleAction, update: RoleUpdate) -> String {
    let standing = match action {
        RoleAction::Grant => "an admin",
        RoleAction::Revoke => "a normal user",
    };
    match update {
        RoleUpdate {
            matched: true,
            modified: true,
        } => format!("{email} is now {standing}"),
        RoleUpdate {
            matched: true,
            modified: false,
        } => format!("{email} is already {standing}"),
        RoleUpdate { matched: false, .. } => format!("{email} is not a known user"),
    }
}

async fn book_appointment<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
    Valid(Json(request)): Valid<Json<BookingRequest>>,
) -> Response {
    let booking = NewBooking {
        slot_name: request.name,
        email: request.email,
        date: request.date,
        extra: request.extra,
    };
    match state.backend.book_appointment(booking) {
        Ok(BookingOutcome::Booked(id)) => Json(BookedResponse {
            message: "Booked".into(),
            inserted_id: id,
        })
        .into_response(),
        // Exhausted capacity is an outcome, not an error.
        Ok(BookingOutcome::SlotFull) => message("Not Booked").into_response(),
        Err(err) => store_failure(err),
    }
}

async fn list_appointments<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
    Query(query): Query<AppointmentsQuery>,
) -> Response {
    match state.backend.appointments(&query.email, &query.date) {
        Ok(bookings) => Json(bookings).into_response(),
        Err(err) => store_failure(err),
    }
}

async fn available_slots<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
) -> Response {
    match state.backend.available_slots() {
        Ok(slots) => Json(slots).into_response(),
        Err(err) => store_failure(err),
    }
}

async fn create_payment_intent<B: PortalBackend, V: TokenVerifier, P: PaymentGateway>(
    State(state): State<AppState<B, V, P>>,
    Valid(Json(request)): Valid<Json<PaymentIntentRequest>>,
) -> Response {
    match state
        .payments
        .create_payment_intent(request.amount, &request.currency)
        .await
    {
        Ok(intent) => Json(PaymentIntentResponse {
            client_secret: intent.client_secret,
        })
        .into_response(),
        Err(err) => {
            error!(?err, "Payment intent creation failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                message("Payment intent could not be created"),
            )
                .into_response()
        }
    }
}
