use axum::{
    Extension, Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        envelope::Envelope,
        users::{RegisterRequest, UpdateProfileRequest, UserResponse},
    },
    error::AppError,
    services::{access::Principal, user_service},
    state::SharedState,
};

/// Header carrying the id of the user authenticated by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Account endpoints. Registration is public, everything else needs a principal.
pub fn router(state: SharedState) -> Router<SharedState> {
    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/profile", put(update_profile))
        .route("/api/auth/users", get(list_users))
        .route_layer(middleware::from_fn_with_state(state, require_principal));

    Router::new()
        .route("/api/auth/register", post(register))
        .merge(protected)
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = Envelope<UserResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<UserResponse>>), AppError> {
    payload.validate()?;
    let user = user_service::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("User registered successfully", user)),
    ))
}

/// Profile of the caller.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    responses(
        (status = 200, description = "Current user", body = Envelope<UserResponse>),
        (status = 401, description = "Missing or unknown user id"),
    )
)]
pub async fn me(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Envelope<UserResponse>>, AppError> {
    let user = user_service::current_user(&state, &principal).await?;
    Ok(Json(Envelope::ok("User retrieved successfully", user)))
}

/// Update name, email, phone or credential hash of the caller.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Envelope<UserResponse>),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn update_profile(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<UserResponse>>, AppError> {
    payload.validate()?;
    let user = user_service::update_profile(&state, &principal, payload).await?;
    Ok(Json(Envelope::ok("Profile updated successfully", user)))
}

/// Every account. Admins only.
#[utoipa::path(
    get,
    path = "/api/auth/users",
    tag = "auth",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    responses(
        (status = 200, description = "All users", body = Envelope<Vec<UserResponse>>),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn list_users(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Envelope<Vec<UserResponse>>>, AppError> {
    let users = user_service::list_users(&state, &principal).await?;
    Ok(Json(Envelope::ok("Users retrieved successfully", users)))
}

/// Resolve `X-User-Id` into a [`Principal`] stored in the request extensions.
pub(crate) async fn require_principal(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no user id".into()))?;
    let id = Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Unauthorized("Not authorized, malformed user id".into()))?;

    let principal = user_service::resolve_principal(&state, id).await?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
