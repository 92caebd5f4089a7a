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
        games::{
            CreateGameRequest, GameQuery, GameResponse, ParticipationRequest, UpdateGameRequest,
        },
    },
    error::AppError,
    routes::auth::require_principal,
    services::{access::Principal, game_service},
    state::SharedState,
};

/// Game endpoints. Every route needs a principal.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route(
            "/api/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/api/games/{id}/participation", put(update_participation))
        .route_layer(middleware::from_fn_with_state(state, require_principal))
}

/// Schedule or record a game.
#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = Envelope<GameResponse>),
        (status = 404, description = "Team or roster not found"),
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<Envelope<GameResponse>>), AppError> {
    payload.validate()?;
    let game = game_service::create_game(&state, &principal, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Game created successfully", game)),
    ))
}

/// Games filtered by team, status and season, earliest first.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        GameQuery,
    ),
    responses((status = 200, description = "Games", body = Envelope<Vec<GameResponse>>))
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Query(query): Query<GameQuery>,
) -> Result<Json<Envelope<Vec<GameResponse>>>, AppError> {
    let games = game_service::list_games(&state, query).await?;
    Ok(Json(Envelope::ok("Games retrieved successfully", games)))
}

/// One game with its participation.
#[utoipa::path(
    get,
    path = "/api/games/{id}",
    tag = "games",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Game identifier"),
    ),
    responses(
        (status = 200, description = "Game", body = Envelope<GameResponse>),
        (status = 404, description = "Game not found"),
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<GameResponse>>, AppError> {
    let game = game_service::get_game(&state, id).await?;
    Ok(Json(Envelope::ok("Game retrieved successfully", game)))
}

/// Update a game. Completing it propagates statistics once.
#[utoipa::path(
    put,
    path = "/api/games/{id}",
    tag = "games",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Game identifier"),
    ),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = Envelope<GameResponse>),
        (status = 400, description = "Invalid payload or status transition"),
        (status = 404, description = "Game not found"),
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGameRequest>,
) -> Result<Json<Envelope<GameResponse>>, AppError> {
    payload.validate()?;
    let game = game_service::update_game(&state, &principal, id, payload).await?;
    Ok(Json(Envelope::ok("Game updated successfully", game)))
}

/// Remove a game and take back its statistics.
#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    tag = "games",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Game identifier"),
    ),
    responses(
        (status = 200, description = "Game deleted", body = Envelope<Empty>),
        (status = 404, description = "Game not found"),
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    game_service::delete_game(&state, &principal, id).await?;
    Ok(Json(Envelope::ok("Game deleted successfully", Empty {})))
}

/// Record or replace one player's participation.
#[utoipa::path(
    put,
    path = "/api/games/{id}/participation",
    tag = "games",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Game identifier"),
    ),
    request_body = ParticipationRequest,
    responses(
        (status = 200, description = "Participation updated", body = Envelope<GameResponse>),
        (status = 404, description = "Game or player not found"),
    )
)]
pub async fn update_participation(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ParticipationRequest>,
) -> Result<Json<Envelope<GameResponse>>, AppError> {
    payload.validate()?;
    let game = game_service::update_participation(&state, &principal, id, payload).await?;
    Ok(Json(Envelope::ok(
        "Player participation updated successfully",
        game,
    )))
}
