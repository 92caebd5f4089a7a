//! Team payloads exposed under `/api/teams`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{
    PlayerEntity, PlayerStatus, SportType, StaffMemberEntity, StaffRole, TeamEntity,
    TeamStatistics,
};
use crate::dto::{format_system_time, players::PlayerResponse, validation::validate_not_blank};

/// Staff member as sent and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffMemberDto {
    pub user: Uuid,
    pub role: StaffRole,
}

impl From<StaffMemberDto> for StaffMemberEntity {
    fn from(value: StaffMemberDto) -> Self {
        Self {
            user: value.user,
            role: value.role,
        }
    }
}

impl From<StaffMemberEntity> for StaffMemberDto {
    fn from(value: StaffMemberEntity) -> Self {
        Self {
            user: value.user,
            role: value.role,
        }
    }
}

/// Payload used to create a team. The caller becomes its coach.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    pub sport_type: SportType,
    #[validate(custom(function = "validate_not_blank"))]
    pub season: String,
    pub division: Option<String>,
    pub logo: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub staff: Vec<StaffMemberDto>,
    pub is_active: Option<bool>,
}

/// Partial team update. Statistics are not part of it.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub sport_type: Option<SportType>,
    #[validate(custom(function = "validate_not_blank"))]
    pub season: Option<String>,
    pub division: Option<String>,
    pub logo: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub staff: Option<Vec<StaffMemberDto>>,
    pub is_active: Option<bool>,
}

impl UpdateTeamRequest {
    /// Overwrite the fields present in the patch.
    pub fn apply(self, team: &mut TeamEntity) {
        if let Some(name) = self.name {
            team.name = name;
        }
        if let Some(sport_type) = self.sport_type {
            team.sport_type = sport_type;
        }
        if let Some(season) = self.season {
            team.season = season;
        }
        if self.division.is_some() {
            team.division = self.division;
        }
        if let Some(logo) = self.logo {
            team.logo = logo;
        }
        if self.description.is_some() {
            team.description = self.description;
        }
        if let Some(staff) = self.staff {
            team.staff = staff.into_iter().map(Into::into).collect();
        }
        if let Some(is_active) = self.is_active {
            team.is_active = is_active;
        }
    }
}

/// Field-by-field override of team counters. Missing fields keep their value.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatisticsPatch {
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub draws: Option<u32>,
    pub goals_for: Option<u32>,
    pub goals_against: Option<u32>,
}

impl TeamStatisticsPatch {
    /// Merge the patch into `current`.
    pub fn merge(&self, current: TeamStatistics) -> TeamStatistics {
        TeamStatistics {
            wins: self.wins.unwrap_or(current.wins),
            losses: self.losses.unwrap_or(current.losses),
            draws: self.draws.unwrap_or(current.draws),
            goals_for: self.goals_for.unwrap_or(current.goals_for),
            goals_against: self.goals_against.unwrap_or(current.goals_against),
        }
    }
}

/// Team with its members resolved from the players collection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub season: String,
    pub division: Option<String>,
    pub logo: String,
    pub description: Option<String>,
    pub coach: Uuid,
    pub staff: Vec<StaffMemberDto>,
    pub players: Vec<PlayerResponse>,
    pub statistics: TeamStatistics,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TeamResponse {
    /// Build the projection of `team` listing `players` as its members.
    pub fn new(team: TeamEntity, players: Vec<PlayerEntity>) -> Self {
        Self {
            id: team.id,
            name: team.name,
            sport_type: team.sport_type,
            season: team.season,
            division: team.division,
            logo: team.logo,
            description: team.description,
            coach: team.coach,
            staff: team.staff.into_iter().map(Into::into).collect(),
            players: players.into_iter().map(Into::into).collect(),
            statistics: team.statistics,
            is_active: team.is_active,
            created_at: format_system_time(team.created_at),
            updated_at: format_system_time(team.updated_at),
        }
    }
}

/// Squad availability counts next to the team record.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatisticsSummary {
    pub total_players: usize,
    pub active_players: usize,
    pub injured_players: usize,
    pub suspended_players: usize,
    pub team_record: TeamStatistics,
}

impl TeamStatisticsSummary {
    /// Count `players` by status.
    pub fn new(statistics: TeamStatistics, players: &[PlayerEntity]) -> Self {
        let count = |status: PlayerStatus| players.iter().filter(|p| p.status == status).count();
        Self {
            total_players: players.len(),
            active_players: count(PlayerStatus::Active),
            injured_players: count(PlayerStatus::Injured),
            suspended_players: count(PlayerStatus::Suspended),
            team_record: statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_patch_overwrites_present_fields_only() {
        let current = TeamStatistics {
            wins: 4,
            losses: 2,
            draws: 1,
            goals_for: 12,
            goals_against: 7,
        };
        let patch = TeamStatisticsPatch {
            wins: Some(5),
            goals_against: Some(0),
            ..Default::default()
        };

        assert_eq!(
            patch.merge(current),
            TeamStatistics {
                wins: 5,
                goals_against: 0,
                ..current
            }
        );
    }

    #[test]
    fn update_request_ignores_statistics() {
        let patch: UpdateTeamRequest =
            serde_json::from_str(r#"{"name": "Rovers", "statistics": {"wins": 99}}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Rovers"));
    }
}
