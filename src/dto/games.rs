//! Game payloads exposed under `/api/games`.

use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{
    GameEntity, GameFilter, GameResult, GameStatus, ParticipationEntity, Score,
};
use crate::dto::{
    format_system_time,
    validation::{validate_clock_time, validate_not_blank},
};

fn default_true() -> bool {
    true
}

/// Payload used to schedule a game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub team: Uuid,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub opponent: String,
    /// `YYYY-MM-DD`.
    pub date: Date,
    /// `HH:MM`.
    #[validate(custom(function = "validate_clock_time"))]
    pub time: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub location: String,
    #[serde(default = "default_true")]
    pub is_home_game: bool,
    pub status: Option<GameStatus>,
    pub score: Option<Score>,
    pub roster: Option<Uuid>,
    pub notes: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub season: String,
}

/// Partial game update. The result is derived from `score` when present.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub opponent: Option<String>,
    pub date: Option<Date>,
    #[validate(custom(function = "validate_clock_time"))]
    pub time: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub location: Option<String>,
    pub is_home_game: Option<bool>,
    pub status: Option<GameStatus>,
    pub score: Option<Score>,
    pub roster: Option<Uuid>,
    pub notes: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub season: Option<String>,
}

/// Performance of one player, recorded against a game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequest {
    pub player_id: Uuid,
    #[serde(default = "default_true")]
    pub participated: bool,
    pub minutes_played: Option<u32>,
    pub goals: Option<u32>,
    pub assists: Option<u32>,
    pub yellow_cards: Option<u32>,
    pub red_cards: Option<u32>,
}

impl From<ParticipationRequest> for ParticipationEntity {
    fn from(value: ParticipationRequest) -> Self {
        Self {
            player: value.player_id,
            participated: value.participated,
            minutes_played: value.minutes_played,
            goals: value.goals.unwrap_or_default(),
            assists: value.assists.unwrap_or_default(),
            yellow_cards: value.yellow_cards.unwrap_or_default(),
            red_cards: value.red_cards.unwrap_or_default(),
            statistics_applied: false,
        }
    }
}

/// Query string accepted by the game listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameQuery {
    /// Only games of this team.
    pub team: Option<Uuid>,
    /// Only games with this status.
    pub status: Option<GameStatus>,
    /// Only games of this season.
    pub season: Option<String>,
}

impl From<GameQuery> for GameFilter {
    fn from(value: GameQuery) -> Self {
        Self {
            team: value.team,
            status: value.status,
            season: value.season,
        }
    }
}

/// Participation record as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationResponse {
    pub player: Uuid,
    pub participated: bool,
    pub minutes_played: Option<u32>,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub statistics_applied: bool,
}

impl From<ParticipationEntity> for ParticipationResponse {
    fn from(value: ParticipationEntity) -> Self {
        Self {
            player: value.player,
            participated: value.participated,
            minutes_played: value.minutes_played,
            goals: value.goals,
            assists: value.assists,
            yellow_cards: value.yellow_cards,
            red_cards: value.red_cards,
            statistics_applied: value.statistics_applied,
        }
    }
}

/// Public projection of a game.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: Uuid,
    pub team: Uuid,
    pub opponent: String,
    pub date: Date,
    pub time: String,
    pub location: String,
    pub is_home_game: bool,
    pub status: GameStatus,
    pub score: Score,
    pub result: GameResult,
    pub roster: Option<Uuid>,
    pub player_participation: Vec<ParticipationResponse>,
    pub notes: Option<String>,
    pub season: String,
    pub statistics_applied: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameEntity> for GameResponse {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            team: value.team,
            opponent: value.opponent,
            date: value.date,
            time: value.time,
            location: value.location,
            is_home_game: value.is_home_game,
            status: value.status,
            score: value.score,
            result: value.result,
            roster: value.roster,
            player_participation: value
                .player_participation
                .into_iter()
                .map(Into::into)
                .collect(),
            notes: value.notes,
            season: value.season,
            statistics_applied: value.statistics_applied,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn participation_counters_default_to_zero() {
        let request: ParticipationRequest =
            serde_json::from_value(json!({"playerId": Uuid::nil(), "goals": 2})).unwrap();
        let record = ParticipationEntity::from(request);

        assert!(record.participated);
        assert_eq!(record.goals, 2);
        assert_eq!(record.assists, 0);
        assert_eq!(record.minutes_played, None);
        assert!(!record.statistics_applied);
    }

    #[test]
    fn create_request_defaults_to_home_game() {
        let request: CreateGameRequest = serde_json::from_value(json!({
            "team": Uuid::nil(),
            "opponent": "Rovers",
            "date": "2024-03-02",
            "time": "18:00",
            "location": "Main Stadium",
            "season": "2024",
        }))
        .unwrap();

        assert!(request.is_home_game);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn malformed_time_fails_validation() {
        let request = UpdateGameRequest {
            time: Some("6pm".into()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
