//! Player payloads exposed under `/api/players`.

use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{
    EmergencyContact, PlayerEntity, PlayerFilter, PlayerStatistics, PlayerStatus,
};
use crate::dto::{format_system_time, validation::validate_not_blank};

/// Payload used to register a player in a team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    #[validate(length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`.
    pub date_of_birth: Date,
    #[validate(custom(function = "validate_not_blank"))]
    pub position: String,
    pub jersey_number: u32,
    pub photo: Option<String>,
    pub team: Uuid,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub status: Option<PlayerStatus>,
    pub notes: Option<String>,
}

/// Partial player update. The team of a player cannot be changed here.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    #[validate(custom(function = "validate_not_blank"))]
    pub position: Option<String>,
    pub jersey_number: Option<u32>,
    pub photo: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub status: Option<PlayerStatus>,
    pub notes: Option<String>,
}

impl UpdatePlayerRequest {
    /// Overwrite the fields present in the patch. Age is left to the caller.
    pub fn apply(self, player: &mut PlayerEntity) {
        if let Some(first_name) = self.first_name {
            player.first_name = first_name.trim().to_owned();
        }
        if let Some(last_name) = self.last_name {
            player.last_name = last_name.trim().to_owned();
        }
        if self.email.is_some() {
            player.email = self.email;
        }
        if self.phone.is_some() {
            player.phone = self.phone;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            player.date_of_birth = date_of_birth;
        }
        if let Some(position) = self.position {
            player.position = position;
        }
        if let Some(jersey_number) = self.jersey_number {
            player.jersey_number = jersey_number;
        }
        if let Some(photo) = self.photo {
            player.photo = photo;
        }
        if self.height.is_some() {
            player.height = self.height;
        }
        if self.weight.is_some() {
            player.weight = self.weight;
        }
        if self.emergency_contact.is_some() {
            player.emergency_contact = self.emergency_contact;
        }
        if let Some(status) = self.status {
            player.status = status;
        }
        if self.notes.is_some() {
            player.notes = self.notes;
        }
    }
}

/// Field-by-field override of player counters. Missing fields keep their value.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatisticsPatch {
    pub games_played: Option<u32>,
    pub goals: Option<u32>,
    pub assists: Option<u32>,
    pub yellow_cards: Option<u32>,
    pub red_cards: Option<u32>,
    pub minutes_played: Option<u32>,
}

impl PlayerStatisticsPatch {
    /// Merge the patch into `current`.
    pub fn merge(&self, current: PlayerStatistics) -> PlayerStatistics {
        PlayerStatistics {
            games_played: self.games_played.unwrap_or(current.games_played),
            goals: self.goals.unwrap_or(current.goals),
            assists: self.assists.unwrap_or(current.assists),
            yellow_cards: self.yellow_cards.unwrap_or(current.yellow_cards),
            red_cards: self.red_cards.unwrap_or(current.red_cards),
            minutes_played: self.minutes_played.unwrap_or(current.minutes_played),
        }
    }
}

/// Query string accepted by the player listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlayerQuery {
    /// Only players of this team.
    pub team: Option<Uuid>,
    /// Only players with this status.
    pub status: Option<PlayerStatus>,
}

impl From<PlayerQuery> for PlayerFilter {
    fn from(value: PlayerQuery) -> Self {
        Self {
            team: value.team,
            status: value.status,
        }
    }
}

/// Public projection of a player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Date,
    pub age: u32,
    pub position: String,
    pub jersey_number: u32,
    pub photo: String,
    pub team: Uuid,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub status: PlayerStatus,
    pub statistics: PlayerStatistics,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PlayerEntity> for PlayerResponse {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            date_of_birth: value.date_of_birth,
            age: value.age,
            position: value.position,
            jersey_number: value.jersey_number,
            photo: value.photo,
            team: value.team,
            height: value.height,
            weight: value.weight,
            emergency_contact: value.emergency_contact,
            status: value.status,
            statistics: value.statistics,
            notes: value.notes,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn create_request_reads_iso_birth_date() {
        let request: CreatePlayerRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Alex",
            "lastName": "Morgan",
            "dateOfBirth": "2001-04-20",
            "position": "Forward",
            "jerseyNumber": 13,
            "team": Uuid::nil(),
        }))
        .unwrap();

        assert_eq!(request.date_of_birth, date!(2001 - 04 - 20));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_names_are_rejected() {
        let request = UpdatePlayerRequest {
            first_name: Some("  ".into()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn statistics_patch_keeps_missing_counters() {
        let current = PlayerStatistics {
            games_played: 10,
            goals: 4,
            ..Default::default()
        };
        let merged = PlayerStatisticsPatch {
            goals: Some(6),
            ..Default::default()
        }
        .merge(current);
        assert_eq!(merged.games_played, 10);
        assert_eq!(merged.goals, 6);
    }
}
