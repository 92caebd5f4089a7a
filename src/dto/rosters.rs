//! Roster payloads exposed under `/api/rosters`.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{RosterEntity, RosterEntryEntity, RosterFilter, RosterType};
use crate::dto::{format_system_time, validation::validate_not_blank};

/// Player slot of a roster.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntryDto {
    pub player: Uuid,
    pub position: Option<String>,
    #[serde(default)]
    pub is_starting: bool,
}

impl From<RosterEntryDto> for RosterEntryEntity {
    fn from(value: RosterEntryDto) -> Self {
        Self {
            player: value.player,
            position: value.position,
            is_starting: value.is_starting,
        }
    }
}

impl From<RosterEntryEntity> for RosterEntryDto {
    fn from(value: RosterEntryEntity) -> Self {
        Self {
            player: value.player,
            position: value.position,
            is_starting: value.is_starting,
        }
    }
}

/// Payload used to create a roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRosterRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    pub team: Uuid,
    #[serde(rename = "type", default)]
    pub roster_type: RosterType,
    #[serde(default)]
    #[validate(nested)]
    pub players: Vec<RosterEntryDto>,
    pub game: Option<Uuid>,
    #[validate(custom(function = "validate_not_blank"))]
    pub season: String,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial roster update. A `players` list replaces the current slots.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRosterRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub roster_type: Option<RosterType>,
    #[validate(nested)]
    pub players: Option<Vec<RosterEntryDto>>,
    pub game: Option<Uuid>,
    #[validate(custom(function = "validate_not_blank"))]
    pub season: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

/// Request adding one player to a roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddRosterPlayerRequest {
    pub player_id: Uuid,
    pub position: Option<String>,
    #[serde(default)]
    pub is_starting: bool,
}

impl From<AddRosterPlayerRequest> for RosterEntryEntity {
    fn from(value: AddRosterPlayerRequest) -> Self {
        Self {
            player: value.player_id,
            position: value.position,
            is_starting: value.is_starting,
        }
    }
}

/// Query string accepted by the roster listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RosterQuery {
    /// Only rosters of this team.
    pub team: Option<Uuid>,
    /// Only rosters of this kind.
    #[serde(rename = "type")]
    pub roster_type: Option<RosterType>,
    /// Only rosters of this season.
    pub season: Option<String>,
}

impl From<RosterQuery> for RosterFilter {
    fn from(value: RosterQuery) -> Self {
        Self {
            team: value.team,
            roster_type: value.roster_type,
            season: value.season,
        }
    }
}

/// Public projection of a roster.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub id: Uuid,
    pub name: String,
    pub team: Uuid,
    #[serde(rename = "type")]
    pub roster_type: RosterType,
    pub players: Vec<RosterEntryDto>,
    pub game: Option<Uuid>,
    pub season: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RosterEntity> for RosterResponse {
    fn from(value: RosterEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            team: value.team,
            roster_type: value.roster_type,
            players: value.players.into_iter().map(Into::into).collect(),
            game: value.game,
            season: value.season,
            notes: value.notes,
            is_active: value.is_active,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}
