use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::TeamStatistics,
    dto::{
        envelope::{Empty, Envelope},
        teams::{
            CreateTeamRequest, TeamResponse, TeamStatisticsPatch, TeamStatisticsSummary,
            UpdateTeamRequest,
        },
    },
    error::AppError,
    routes::auth::require_principal,
    services::{access::Principal, team_service},
    state::SharedState,
};

/// Team endpoints. Every route needs a principal.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/teams", get(list_teams).post(create_team))
        .route(
            "/api/teams/{id}",
            get(get_team).put(update_team).delete(delete_team),
        )
        .route(
            "/api/teams/{id}/statistics",
            get(team_statistics).put(set_team_statistics),
        )
        .route_layer(middleware::from_fn_with_state(state, require_principal))
}

/// Create a team coached by the caller.
#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "teams",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = Envelope<TeamResponse>),
        (status = 403, description = "Caller is neither coach nor admin"),
    )
)]
pub async fn create_team(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Envelope<TeamResponse>>), AppError> {
    payload.validate()?;
    let team = team_service::create_team(&state, &principal, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Team created successfully", team)),
    ))
}

/// Teams visible to the caller.
#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "teams",
    params(("X-User-Id" = Uuid, Header, description = "Authenticated user id")),
    responses((status = 200, description = "Teams", body = Envelope<Vec<TeamResponse>>))
)]
pub async fn list_teams(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Envelope<Vec<TeamResponse>>>, AppError> {
    let teams = team_service::list_teams(&state, &principal).await?;
    Ok(Json(Envelope::ok("Teams retrieved successfully", teams)))
}

/// Team with its players.
#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    tag = "teams",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Team identifier"),
    ),
    responses(
        (status = 200, description = "Team", body = Envelope<TeamResponse>),
        (status = 404, description = "Team not found"),
    )
)]
pub async fn get_team(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TeamResponse>>, AppError> {
    let team = team_service::get_team(&state, id).await?;
    Ok(Json(Envelope::ok("Team retrieved successfully", team)))
}

/// Update descriptive fields. Owning coach or admin.
#[utoipa::path(
    put,
    path = "/api/teams/{id}",
    tag = "teams",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Team identifier"),
    ),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = Envelope<TeamResponse>),
        (status = 403, description = "Caller does not own the team"),
        (status = 404, description = "Team not found"),
    )
)]
pub async fn update_team(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeamRequest>,
) -> Result<Json<Envelope<TeamResponse>>, AppError> {
    payload.validate()?;
    let team = team_service::update_team(&state, &principal, id, payload).await?;
    Ok(Json(Envelope::ok("Team updated successfully", team)))
}

/// Delete a team and its players. Owning coach or admin.
#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    tag = "teams",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Team identifier"),
    ),
    responses(
        (status = 200, description = "Team deleted", body = Envelope<Empty>),
        (status = 403, description = "Caller does not own the team"),
        (status = 404, description = "Team not found"),
    )
)]
pub async fn delete_team(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Empty>>, AppError> {
    team_service::delete_team(&state, &principal, id).await?;
    Ok(Json(Envelope::ok("Team deleted successfully", Empty {})))
}

/// Squad counts and team record.
#[utoipa::path(
    get,
    path = "/api/teams/{id}/statistics",
    tag = "teams",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Team identifier"),
    ),
    responses(
        (status = 200, description = "Team statistics", body = Envelope<TeamStatisticsSummary>),
        (status = 404, description = "Team not found"),
    )
)]
pub async fn team_statistics(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TeamStatisticsSummary>>, AppError> {
    let summary = team_service::team_statistics(&state, id).await?;
    Ok(Json(Envelope::ok(
        "Team statistics retrieved successfully",
        summary,
    )))
}

/// Overwrite some team counters. Owning coach or admin.
#[utoipa::path(
    put,
    path = "/api/teams/{id}/statistics",
    tag = "teams",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("id" = Uuid, Path, description = "Team identifier"),
    ),
    request_body = TeamStatisticsPatch,
    responses(
        (status = 200, description = "Team statistics updated", body = Envelope<TeamStatistics>),
        (status = 403, description = "Caller does not own the team"),
    )
)]
pub async fn set_team_statistics(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TeamStatisticsPatch>,
) -> Result<Json<Envelope<TeamStatistics>>, AppError> {
    let statistics = team_service::set_team_statistics(&state, &principal, id, patch).await?;
    Ok(Json(Envelope::ok(
        "Team statistics updated successfully",
        statistics,
    )))
}
