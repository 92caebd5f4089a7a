use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        envelope::{Empty, Envelope},
        players::{
            CreatePlayerRequest, PlayerQuery, PlayerResponse, PlayerStatisticsPatch,
            UpdatePlayerRequest,
        },
    },
    error::AppError,
    routes::auth::require_principal,
    services::{access::Principal, player_service},
    state::SharedState,
};

/// Player endpoints. Every route needs a principal.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/players", get(list_players).post(create_player))
        .route(
            "/api/players/{id}",
            get(get_player).put(update_player).delete(delete_player),
        )
        .route("/api/players/{id}/statistics", put(set_player_statistics))
        .route_layer(middleware::from_fn_with_state(state, require_principal))
}

/// Register a player in a team.
#[utoipa::path(
    post,
    path = "/api/players",
    tag = "players",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player created", body = Envelope<PlayerResponse>),
        (status = 404, description = "Team not found"),
        (status = 409, description = "Jersey number already taken"),
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<Envelope<PlayerResponse>>), AppError> {
    payload.validate()?;
    let player = player_service::create_player(&state, &principal, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Player created successfully", player)),
    ))
}

/// Players filtered by team and status.
#[utoipa::path(
    get,
    path = "/api/players",
    tag = "players",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        PlayerQuery,
    ),
    responses((status = 200, description = "Players", body = Envelope<Vec<PlayerResponse>>))
)]
pub async fn list_players(
    State(state): State<SharedState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<Envelope<Vec<PlayerResponse>>>, AppError> {
    let players = player_service::list_players(&state, query).await?;
    Ok(Json(Envelope::ok("Players retrieved successfully", players)))
}

/// One player.
#[utoipa::path(
    get,
    path = "/api/players/{id}",
    tag = "players",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Player identifier"),
    ),
    responses(
        (status = 200, description = "Player", body = Envelope<PlayerResponse>),
        (status = 404, description = "Player not found"),
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<PlayerResponse>>, AppError> {
    let player = player_service::get_player(&state, id).await?;
    Ok(Json(Envelope::ok("Player retrieved successfully", player)))
}

/// Update a player. The team cannot change here.
#[utoipa::path(
    put,
    path = "/api/players/{id}",
    tag = "players",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Player identifier"),
    ),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Player updated", body = Envelope<PlayerResponse>),
        (status = 404, description = "Player not found"),
        (status = 409, description = "Jersey number already taken"),
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlayerRequest>,
) -> Result<Json<Envelope<PlayerResponse>>, AppError> {
    payload.validate()?;
    let player = player_service::update_player(&state, &principal, id, payload).await?;
    Ok(Json(Envelope::ok("Player updated successfully", player)))
}

/// Remove a player.
#[utoipa::path(
    delete,
    path = "/api/players/{id}",
    tag = "players",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Player identifier"),
    ),
    responses(
        (status = 200, description = "Player deleted", body = Envelope<Empty>),
        (status = 404, description = "Player not found"),
    )
)]
pub async fn delete_player(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    player_service::delete_player(&state, &principal, id).await?;
    Ok(Json(Envelope::ok("Player deleted successfully", Empty {})))
}

/// Overwrite some player counters.
#[utoipa::path(
    put,
    path = "/api/players/{id}/statistics",
    tag = "players",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Player identifier"),
    ),
    request_body = PlayerStatisticsPatch,
    responses(
        (status = 200, description = "Player statistics updated", body = Envelope<PlayerResponse>),
        (status = 404, description = "Player not found"),
    )
)]
pub async fn set_player_statistics(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PlayerStatisticsPatch>,
) -> Result<Json<Envelope<PlayerResponse>>, AppError> {
    let player = player_service::set_player_statistics(&state, &principal, id, patch).await?;
    Ok(Json(Envelope::ok(
        "Player statistics updated successfully",
        player,
    )))
}
