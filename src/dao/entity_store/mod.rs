pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    GameEntity, GameFilter, ParticipationEntity, ParticipationUpsert, PlayerEntity, PlayerFilter,
    PlayerStatistics, RosterEntity, RosterEntryEntity, RosterFilter, TeamEntity, TeamFilter,
    TeamStatistics, UserEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the document store holding users, teams, players, rosters and games.
///
/// Every method is a single atomic operation on one document (or one filtered batch for
/// the `delete_*_by_*` helpers). Uniqueness constraints are enforced by the backend and
/// reported as [`crate::dao::storage::StorageError::Conflict`].
pub trait EntityStore: Send + Sync {
    /// Store a new user. Conflict when the email is taken.
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Persist profile fields. `teams` is owned by [`EntityStore::link_user_team`].
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Load one user.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Every user, oldest first.
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Record that `user` coaches `team`.
    fn link_user_team(&self, user: Uuid, team: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Drop `team` from the teams of `user`.
    fn unlink_user_team(&self, user: Uuid, team: Uuid) -> BoxFuture<'static, StorageResult<()>>;

    /// Store a new team.
    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Persist descriptive fields. `statistics` is left untouched.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Load one team.
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Teams matching `filter`, oldest first.
    fn list_teams(&self, filter: TeamFilter) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// Remove a team. `false` when it did not exist.
    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Add `delta` to the team counters. Returns `false` when the team is gone.
    fn increment_team_statistics(
        &self,
        id: Uuid,
        delta: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Subtract `delta` from the team counters, stopping at zero. Returns `false` when the
    /// team is gone.
    fn retract_team_statistics(
        &self,
        id: Uuid,
        delta: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Overwrite the team counters.
    fn set_team_statistics(
        &self,
        id: Uuid,
        statistics: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Store a new player. Conflict when the jersey number is taken in its team.
    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Persist descriptive fields. `statistics` and `team` are left untouched.
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Load one player.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Players matching `filter`.
    fn list_players(
        &self,
        filter: PlayerFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Remove a player. `false` when it did not exist.
    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove every player of `team` and return how many went.
    fn delete_players_by_team(&self, team: Uuid) -> BoxFuture<'static, StorageResult<u64>>;
    /// Add `delta` to the player counters. Returns `false` when the player is gone.
    fn increment_player_statistics(
        &self,
        id: Uuid,
        delta: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Subtract `delta` from the player counters, stopping at zero.
    fn retract_player_statistics(
        &self,
        id: Uuid,
        delta: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Overwrite the player counters.
    fn set_player_statistics(
        &self,
        id: Uuid,
        statistics: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Store a new roster.
    fn insert_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace a roster.
    fn save_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Load one roster.
    fn find_roster(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>>;
    /// Rosters matching `filter`.
    fn list_rosters(
        &self,
        filter: RosterFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<RosterEntity>>>;
    /// Remove a roster. `false` when it did not exist.
    fn delete_roster(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Append `entry` unless its player is already listed (conflict). `None` when the
    /// roster does not exist.
    fn push_roster_entry(
        &self,
        roster: Uuid,
        entry: RosterEntryEntity,
    ) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>>;
    /// Drop the slot of `player`, if any. `None` when the roster does not exist.
    fn pull_roster_entry(
        &self,
        roster: Uuid,
        player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>>;

    /// Store a new game.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Persist editable fields. Participation and the statistics flag are left untouched.
    /// Returns the game as stored before the write, `None` when it does not exist.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Load one game.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Games matching `filter`, ordered by date.
    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Remove a game and hand back what was stored.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Replace the record of `record.player` or append it. The stored
    /// `statistics_applied` flag of a replaced record is preserved. `None` when the game
    /// does not exist.
    fn upsert_participation(
        &self,
        game: Uuid,
        record: ParticipationEntity,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipationUpsert>>>;
    /// Flip the game statistics flag from unset to set, only while the game is completed
    /// with a known result. The single caller that performed the flip receives the game
    /// as claimed.
    fn claim_game_statistics(
        &self,
        game: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Same as [`EntityStore::claim_game_statistics`] for one participation record of a
    /// completed game.
    fn claim_participation_statistics(
        &self,
        game: Uuid,
        player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipationEntity>>>;

    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
