use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use time::Date;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role granted to a user account.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every resource.
    Admin,
    /// Manages the teams they own.
    Coach,
    /// Read-only access.
    #[default]
    Viewer,
}

impl Role {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Coach => "coach",
            Role::Viewer => "viewer",
        }
    }
}

/// Sport practiced by a team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum SportType {
    Soccer,
    Basketball,
    Baseball,
    Football,
    Hockey,
    Volleyball,
    Cricket,
    Rugby,
    Tennis,
    Other,
}

/// Function of a staff member attached to a team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    AssistantCoach,
    Manager,
    Trainer,
    Other,
}

/// Availability of a player.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    #[default]
    Active,
    Injured,
    Suspended,
    Inactive,
}

impl PlayerStatus {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerStatus::Active => "active",
            PlayerStatus::Injured => "injured",
            PlayerStatus::Suspended => "suspended",
            PlayerStatus::Inactive => "inactive",
        }
    }
}

/// Kind of roster.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RosterType {
    #[default]
    Active,
    Injured,
    Suspended,
    Reserve,
    Starting,
}

impl RosterType {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            RosterType::Active => "active",
            RosterType::Injured => "injured",
            RosterType::Suspended => "suspended",
            RosterType::Reserve => "reserve",
            RosterType::Starting => "starting",
        }
    }
}

/// Lifecycle status of a game. Allowed moves live in [`crate::state::game_lifecycle`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Postponed,
}

impl GameStatus {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Cancelled => "cancelled",
            GameStatus::Postponed => "postponed",
        }
    }
}

/// Outcome of a game from the point of view of the owning team.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
    #[default]
    Pending,
}

impl GameResult {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::Win => "win",
            GameResult::Loss => "loss",
            GameResult::Draw => "draw",
            GameResult::Pending => "pending",
        }
    }
}

/// Stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    /// Lowercased, unique across users.
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    /// Opaque hash produced by the identity provider. Never exposed.
    pub credential_hash: Option<String>,
    /// Teams coached by this user.
    pub teams: Vec<Uuid>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Staff member attached to a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct StaffMemberEntity {
    pub user: Uuid,
    pub role: StaffRole,
}

/// Win/loss record of a team. Counters only change through the aggregator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatistics {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamStatistics {
    /// Add every counter of `delta` to `self`.
    pub fn accumulate(&mut self, delta: &TeamStatistics) {
        self.wins = self.wins.saturating_add(delta.wins);
        self.losses = self.losses.saturating_add(delta.losses);
        self.draws = self.draws.saturating_add(delta.draws);
        self.goals_for = self.goals_for.saturating_add(delta.goals_for);
        self.goals_against = self.goals_against.saturating_add(delta.goals_against);
    }

    /// Take back every counter of `delta`, stopping at zero.
    pub fn retract(&mut self, delta: &TeamStatistics) {
        self.wins = self.wins.saturating_sub(delta.wins);
        self.losses = self.losses.saturating_sub(delta.losses);
        self.draws = self.draws.saturating_sub(delta.draws);
        self.goals_for = self.goals_for.saturating_sub(delta.goals_for);
        self.goals_against = self.goals_against.saturating_sub(delta.goals_against);
    }
}

/// Stored team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamEntity {
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub season: String,
    pub division: Option<String>,
    pub logo: String,
    pub description: Option<String>,
    /// Owning coach.
    pub coach: Uuid,
    pub staff: Vec<StaffMemberEntity>,
    pub statistics: TeamStatistics,
    pub is_active: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Career totals of a player.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub minutes_played: u32,
}

impl PlayerStatistics {
    /// Add every counter of `delta` to `self`.
    pub fn accumulate(&mut self, delta: &PlayerStatistics) {
        self.games_played = self.games_played.saturating_add(delta.games_played);
        self.goals = self.goals.saturating_add(delta.goals);
        self.assists = self.assists.saturating_add(delta.assists);
        self.yellow_cards = self.yellow_cards.saturating_add(delta.yellow_cards);
        self.red_cards = self.red_cards.saturating_add(delta.red_cards);
        self.minutes_played = self.minutes_played.saturating_add(delta.minutes_played);
    }

    /// Take back every counter of `delta`, stopping at zero.
    pub fn retract(&mut self, delta: &PlayerStatistics) {
        self.games_played = self.games_played.saturating_sub(delta.games_played);
        self.goals = self.goals.saturating_sub(delta.goals);
        self.assists = self.assists.saturating_sub(delta.assists);
        self.yellow_cards = self.yellow_cards.saturating_sub(delta.yellow_cards);
        self.red_cards = self.red_cards.saturating_sub(delta.red_cards);
        self.minutes_played = self.minutes_played.saturating_sub(delta.minutes_played);
    }
}

/// Person to reach when something happens to a player.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
}

/// Stored player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntity {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Date,
    /// Derived from `date_of_birth`, refreshed on every save.
    pub age: u32,
    pub position: String,
    /// Unique within `team`.
    pub jersey_number: u32,
    pub photo: String,
    pub team: Uuid,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub status: PlayerStatus,
    pub statistics: PlayerStatistics,
    pub notes: Option<String>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl PlayerEntity {
    /// Recompute the derived age as of `today`.
    pub fn refresh_age(&mut self, today: Date) {
        self.age = age_on(self.date_of_birth, today);
    }
}

/// Whole years elapsed between `birth` and `today`. Zero for future dates.
pub fn age_on(birth: Date, today: Date) -> u32 {
    let mut years = today.year() - birth.year();
    if (today.month() as u8, today.day()) < (birth.month() as u8, birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Player slot inside a roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntryEntity {
    pub player: Uuid,
    pub position: Option<String>,
    pub is_starting: bool,
}

/// Stored roster. `players` never holds the same player twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntity {
    pub id: Uuid,
    pub name: String,
    pub team: Uuid,
    pub roster_type: RosterType,
    pub players: Vec<RosterEntryEntity>,
    pub game: Option<Uuid>,
    pub season: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl RosterEntity {
    /// Whether `player` already holds a slot.
    pub fn contains(&self, player: Uuid) -> bool {
        self.players.iter().any(|entry| entry.player == player)
    }
}

/// Final or running score of a game.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Score {
    pub team: u32,
    pub opponent: u32,
}

/// Performance of one player in one game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipationEntity {
    pub player: Uuid,
    pub participated: bool,
    pub minutes_played: Option<u32>,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    /// Set once this record has been added to the player's statistics.
    pub statistics_applied: bool,
}

/// Stored game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
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
    /// At most one record per player.
    pub player_participation: Vec<ParticipationEntity>,
    pub notes: Option<String>,
    pub season: String,
    /// Set once the result has been added to the team statistics.
    pub statistics_applied: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Outcome of a participation upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationUpsert {
    /// Game after the write.
    pub game: GameEntity,
    /// Record that was overwritten, as stored before the write.
    pub replaced: Option<ParticipationEntity>,
}

/// Query filter for team listings.
#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub coach: Option<Uuid>,
}

/// Query filter for player listings.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub team: Option<Uuid>,
    pub status: Option<PlayerStatus>,
}

impl PlayerFilter {
    /// Every player of `team`.
    pub fn team(team: Uuid) -> Self {
        Self {
            team: Some(team),
            status: None,
        }
    }

    /// Whether `player` passes the filter.
    pub fn matches(&self, player: &PlayerEntity) -> bool {
        self.team.is_none_or(|team| player.team == team)
            && self.status.is_none_or(|status| player.status == status)
    }
}

/// Query filter for roster listings.
#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
    pub team: Option<Uuid>,
    pub roster_type: Option<RosterType>,
    pub season: Option<String>,
}

impl RosterFilter {
    /// Whether `roster` passes the filter.
    pub fn matches(&self, roster: &RosterEntity) -> bool {
        self.team.is_none_or(|team| roster.team == team)
            && self
                .roster_type
                .is_none_or(|roster_type| roster.roster_type == roster_type)
            && self
                .season
                .as_deref()
                .is_none_or(|season| roster.season == season)
    }
}

/// Query filter for game listings.
#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    pub team: Option<Uuid>,
    pub status: Option<GameStatus>,
    pub season: Option<String>,
}

impl GameFilter {
    /// Whether `game` passes the filter.
    pub fn matches(&self, game: &GameEntity) -> bool {
        self.team.is_none_or(|team| game.team == team)
            && self.status.is_none_or(|status| game.status == status)
            && self
                .season
                .as_deref()
                .is_none_or(|season| game.season == season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn age_counts_completed_years_only() {
        let birth = date!(2000 - 06 - 15);
        assert_eq!(age_on(birth, date!(2024 - 06 - 14)), 23);
        assert_eq!(age_on(birth, date!(2024 - 06 - 15)), 24);
        assert_eq!(age_on(birth, date!(2024 - 12 - 01)), 24);
    }

    #[test]
    fn age_of_future_birth_date_is_zero() {
        assert_eq!(age_on(date!(2030 - 01 - 01), date!(2024 - 01 - 01)), 0);
    }

    #[test]
    fn statistics_accumulate_field_by_field() {
        let mut stats = TeamStatistics {
            wins: 2,
            goals_for: 5,
            ..Default::default()
        };
        stats.accumulate(&TeamStatistics {
            wins: 1,
            goals_for: 3,
            goals_against: 1,
            ..Default::default()
        });
        assert_eq!(
            stats,
            TeamStatistics {
                wins: 3,
                losses: 0,
                draws: 0,
                goals_for: 8,
                goals_against: 1,
            }
        );
    }

    #[test]
    fn retract_stops_at_zero() {
        let mut stats = PlayerStatistics {
            games_played: 1,
            goals: 1,
            ..Default::default()
        };
        stats.retract(&PlayerStatistics {
            games_played: 1,
            goals: 3,
            ..Default::default()
        });
        assert_eq!(stats, PlayerStatistics::default());
    }

    #[test]
    fn game_filter_combines_criteria() {
        let team = Uuid::new_v4();
        let game = GameEntity {
            id: Uuid::new_v4(),
            team,
            opponent: "Rovers".into(),
            date: date!(2024 - 03 - 02),
            time: "18:00".into(),
            location: "Home".into(),
            is_home_game: true,
            status: GameStatus::Scheduled,
            score: Score::default(),
            result: GameResult::Pending,
            roster: None,
            player_participation: Vec::new(),
            notes: None,
            season: "2024".into(),
            statistics_applied: false,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        };

        assert!(GameFilter::default().matches(&game));
        assert!(
            GameFilter {
                team: Some(team),
                status: Some(GameStatus::Scheduled),
                season: Some("2024".into()),
            }
            .matches(&game)
        );
        assert!(
            !GameFilter {
                season: Some("2023".into()),
                ..Default::default()
            }
            .matches(&game)
        );
    }
}
