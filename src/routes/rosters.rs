use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        envelope::{Empty, Envelope},
        rosters::{
            AddRosterPlayerRequest, CreateRosterRequest, RosterQuery, RosterResponse,
            UpdateRosterRequest,
        },
    },
    error::AppError,
    routes::auth::require_principal,
    services::{access::Principal, roster_service},
    state::SharedState,
};

/// Roster endpoints. Every route needs a principal.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/rosters", get(list_rosters).post(create_roster))
        .route(
            "/api/rosters/{id}",
            get(get_roster).put(update_roster).delete(delete_roster),
        )
        .route("/api/rosters/{id}/players", post(add_player))
        .route("/api/rosters/{id}/players/{player_id}", delete(remove_player))
        .route_layer(middleware::from_fn_with_state(state, require_principal))
}

/// Create a roster for a team.
#[utoipa::path(
    post,
    path = "/api/rosters",
    tag = "rosters",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    request_body = CreateRosterRequest,
    responses(
        (status = 201, description = "Roster created", body = Envelope<RosterResponse>),
        (status = 404, description = "Team or player not found"),
        (status = 409, description = "Player listed twice"),
    )
)]
pub async fn create_roster(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateRosterRequest>,
) -> Result<(StatusCode, Json<Envelope<RosterResponse>>), AppError> {
    payload.validate()?;
    let roster = roster_service::create_roster(&state, &principal, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Roster created successfully", roster)),
    ))
}

/// Rosters filtered by team, type and season.
#[utoipa::path(
    get,
    path = "/api/rosters",
    tag = "rosters",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        RosterQuery,
    ),
    responses((status = 200, description = "Rosters", body = Envelope<Vec<RosterResponse>>))
)]
pub async fn list_rosters(
    State(state): State<SharedState>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Envelope<Vec<RosterResponse>>>, AppError> {
    let rosters = roster_service::list_rosters(&state, query).await?;
    Ok(Json(Envelope::ok("Rosters retrieved successfully", rosters)))
}

/// One roster.
#[utoipa::path(
    get,
    path = "/api/rosters/{id}",
    tag = "rosters",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Roster identifier"),
    ),
    responses(
        (status = 200, description = "Roster", body = Envelope<RosterResponse>),
        (status = 404, description = "Roster not found"),
    )
)]
pub async fn get_roster(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<RosterResponse>>, AppError> {
    let roster = roster_service::get_roster(&state, id).await?;
    Ok(Json(Envelope::ok("Roster retrieved successfully", roster)))
}

/// Edit a roster.
#[utoipa::path(
    put,
    path = "/api/rosters/{id}",
    tag = "rosters",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Roster identifier"),
    ),
    request_body = UpdateRosterRequest,
    responses(
        (status = 200, description = "Roster updated", body = Envelope<RosterResponse>),
        (status = 404, description = "Roster or player not found"),
        (status = 409, description = "Player listed twice"),
    )
)]
pub async fn update_roster(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRosterRequest>,
) -> Result<Json<Envelope<RosterResponse>>, AppError> {
    payload.validate()?;
    let roster = roster_service::update_roster(&state, &principal, id, payload).await?;
    Ok(Json(Envelope::ok("Roster updated successfully", roster)))
}

/// Remove a roster.
#[utoipa::path(
    delete,
    path = "/api/rosters/{id}",
    tag = "rosters",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Roster identifier"),
    ),
    responses(
        (status = 200, description = "Roster deleted", body = Envelope<Empty>),
        (status = 404, description = "Roster not found"),
    )
)]
pub async fn delete_roster(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    roster_service::delete_roster(&state, &principal, id).await?;
    Ok(Json(Envelope::ok("Roster deleted successfully", Empty {})))
}

/// Add one player to the roster.
#[utoipa::path(
    post,
    path = "/api/rosters/{id}/players",
    tag = "rosters",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Roster identifier"),
    ),
    request_body = AddRosterPlayerRequest,
    responses(
        (status = 200, description = "Player added", body = Envelope<RosterResponse>),
        (status = 404, description = "Roster or player not found"),
        (status = 409, description = "Player already in roster"),
    )
)]
pub async fn add_player(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddRosterPlayerRequest>,
) -> Result<Json<Envelope<RosterResponse>>, AppError> {
    payload.validate()?;
    let roster = roster_service::add_player(&state, &principal, id, payload).await?;
    Ok(Json(Envelope::ok(
        "Player added to roster successfully",
        roster,
    )))
}

/// Remove a player from the roster. Absent players are ignored.
#[utoipa::path(
    delete,
    path = "/api/rosters/{id}/players/{player_id}",
    tag = "rosters",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Roster identifier"),
        ("player_id" = Uuid, Path, description = "Player identifier"),
    ),
    responses(
        (status = 200, description = "Player removed", body = Envelope<RosterResponse>),
        (status = 404, description = "Roster not found"),
    )
)]
pub async fn remove_player(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<RosterResponse>>, AppError> {
    let roster = roster_service::remove_player(&state, &principal, id, player_id).await?;
    Ok(Json(Envelope::ok(
        "Player removed from roster successfully",
        roster,
    )))
}
