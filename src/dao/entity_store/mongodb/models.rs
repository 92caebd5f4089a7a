use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use time::Date;
use uuid::Uuid;

use crate::dao::models::{
    EmergencyContact, GameEntity, GameResult, GameStatus, ParticipationEntity, PlayerEntity,
    PlayerStatistics, PlayerStatus, Role, RosterEntity, RosterEntryEntity, RosterType, Score,
    SportType, StaffMemberEntity, StaffRole, TeamEntity, TeamStatistics, UserEntity,
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Filter selecting a document by its primary key.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

/// Stored shape of a user.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub credential_hash: Option<String>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pub teams: Vec<Uuid>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            phone: value.phone,
            credential_hash: value.credential_hash,
            teams: value.teams,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            phone: value.phone,
            credential_hash: value.credential_hash,
            teams: value.teams,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Staff entry embedded in a team.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStaffDocument {
    #[serde_as(as = "DisplayFromStr")]
    pub user: Uuid,
    pub role: StaffRole,
}

/// Stored shape of a team.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub season: String,
    pub division: Option<String>,
    #[serde(default)]
    pub logo: String,
    pub description: Option<String>,
    #[serde_as(as = "DisplayFromStr")]
    pub coach: Uuid,
    #[serde(default)]
    pub staff: Vec<MongoStaffDocument>,
    #[serde(default)]
    pub statistics: TeamStatistics,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sport_type: value.sport_type,
            season: value.season,
            division: value.division,
            logo: value.logo,
            description: value.description,
            coach: value.coach,
            staff: value
                .staff
                .into_iter()
                .map(|member| MongoStaffDocument {
                    user: member.user,
                    role: member.role,
                })
                .collect(),
            statistics: value.statistics,
            is_active: value.is_active,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoTeamDocument> for TeamEntity {
    fn from(value: MongoTeamDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sport_type: value.sport_type,
            season: value.season,
            division: value.division,
            logo: value.logo,
            description: value.description,
            coach: value.coach,
            staff: value
                .staff
                .into_iter()
                .map(|member| StaffMemberEntity {
                    user: member.user,
                    role: member.role,
                })
                .collect(),
            statistics: value.statistics,
            is_active: value.is_active,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Stored shape of a player.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "iso_date")]
    pub date_of_birth: Date,
    pub age: u32,
    pub position: String,
    pub jersey_number: u32,
    #[serde(default)]
    pub photo: String,
    #[serde_as(as = "DisplayFromStr")]
    pub team: Uuid,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub status: PlayerStatus,
    #[serde(default)]
    pub statistics: PlayerStatistics,
    pub notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<PlayerEntity> for MongoPlayerDocument {
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
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
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
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Player slot embedded in a roster.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRosterEntryDocument {
    #[serde_as(as = "DisplayFromStr")]
    pub player: Uuid,
    pub position: Option<String>,
    #[serde(default)]
    pub is_starting: bool,
}

impl From<RosterEntryEntity> for MongoRosterEntryDocument {
    fn from(value: RosterEntryEntity) -> Self {
        Self {
            player: value.player,
            position: value.position,
            is_starting: value.is_starting,
        }
    }
}

impl From<MongoRosterEntryDocument> for RosterEntryEntity {
    fn from(value: MongoRosterEntryDocument) -> Self {
        Self {
            player: value.player,
            position: value.position,
            is_starting: value.is_starting,
        }
    }
}

/// Stored shape of a roster.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRosterDocument {
    #[serde(rename = "_id")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: Uuid,
    pub name: String,
    #[serde_as(as = "DisplayFromStr")]
    pub team: Uuid,
    #[serde(rename = "type")]
    pub roster_type: RosterType,
    #[serde(default)]
    pub players: Vec<MongoRosterEntryDocument>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub game: Option<Uuid>,
    pub season: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<RosterEntity> for MongoRosterDocument {
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
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoRosterDocument> for RosterEntity {
    fn from(value: MongoRosterDocument) -> Self {
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
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Participation record embedded in a game.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoParticipationDocument {
    #[serde_as(as = "DisplayFromStr")]
    pub player: Uuid,
    pub participated: bool,
    pub minutes_played: Option<u32>,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    #[serde(default)]
    pub statistics_applied: bool,
}

impl From<ParticipationEntity> for MongoParticipationDocument {
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

impl From<MongoParticipationDocument> for ParticipationEntity {
    fn from(value: MongoParticipationDocument) -> Self {
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

/// Stored shape of a game.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: Uuid,
    #[serde_as(as = "DisplayFromStr")]
    pub team: Uuid,
    pub opponent: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub time: String,
    pub location: String,
    pub is_home_game: bool,
    pub status: GameStatus,
    #[serde(default)]
    pub score: Score,
    pub result: GameResult,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub roster: Option<Uuid>,
    #[serde(default)]
    pub player_participation: Vec<MongoParticipationDocument>,
    pub notes: Option<String>,
    pub season: String,
    #[serde(default)]
    pub statistics_applied: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
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
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
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
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}
