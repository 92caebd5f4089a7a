use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification of the team management API.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::register,
        crate::routes::auth::me,
        crate::routes::auth::update_profile,
        crate::routes::auth::list_users,
        crate::routes::teams::create_team,
        crate::routes::teams::list_teams,
        crate::routes::teams::get_team,
        crate::routes::teams::update_team,
        crate::routes::teams::delete_team,
        crate::routes::teams::team_statistics,
        crate::routes::teams::set_team_statistics,
        crate::routes::players::create_player,
        crate::routes::players::list_players,
        crate::routes::players::get_player,
        crate::routes::players::update_player,
        crate::routes::players::delete_player,
        crate::routes::players::set_player_statistics,
        crate::routes::rosters::create_roster,
        crate::routes::rosters::list_rosters,
        crate::routes::rosters::get_roster,
        crate::routes::rosters::update_roster,
        crate::routes::rosters::delete_roster,
        crate::routes::rosters::add_player,
        crate::routes::rosters::remove_player,
        crate::routes::games::create_game,
        crate::routes::games::list_games,
        crate::routes::games::get_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::games::update_participation,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::envelope::ErrorEnvelope,
            crate::dto::users::RegisterRequest,
            crate::dto::users::UpdateProfileRequest,
            crate::dto::users::UserResponse,
            crate::dto::teams::CreateTeamRequest,
            crate::dto::teams::UpdateTeamRequest,
            crate::dto::teams::TeamStatisticsPatch,
            crate::dto::teams::TeamResponse,
            crate::dto::teams::TeamStatisticsSummary,
            crate::dto::players::CreatePlayerRequest,
            crate::dto::players::UpdatePlayerRequest,
            crate::dto::players::PlayerStatisticsPatch,
            crate::dto::players::PlayerResponse,
            crate::dto::rosters::CreateRosterRequest,
            crate::dto::rosters::UpdateRosterRequest,
            crate::dto::rosters::AddRosterPlayerRequest,
            crate::dto::rosters::RosterResponse,
            crate::dto::games::CreateGameRequest,
            crate::dto::games::UpdateGameRequest,
            crate::dto::games::ParticipationRequest,
            crate::dto::games::GameResponse,
            crate::dao::models::Role,
            crate::dao::models::GameStatus,
            crate::dao::models::GameResult,
            crate::dao::models::TeamStatistics,
            crate::dao::models::PlayerStatistics,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and profiles"),
        (name = "teams", description = "Teams, ownership and team records"),
        (name = "players", description = "Players and their statistics"),
        (name = "rosters", description = "Rosters and their members"),
        (name = "games", description = "Games, results and participation"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/api/auth/register",
            "/api/teams/{id}/statistics",
            "/api/players/{id}",
            "/api/rosters/{id}/players/{player_id}",
            "/api/games/{id}/participation",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
