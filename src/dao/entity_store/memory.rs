//! In-process [`EntityStore`] backed by concurrent maps.
//!
//! Each map entry is locked while it is mutated, which gives the same per-document
//! atomicity a document database offers. Uniqueness constraints are kept in side
//! indexes claimed through the entry API.

use std::{sync::Arc, time::SystemTime};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{self, BoxFuture};
use uuid::Uuid;

use crate::dao::{
    entity_store::EntityStore,
    models::{
        GameEntity, GameFilter, GameResult, GameStatus, ParticipationEntity, ParticipationUpsert,
        PlayerEntity, PlayerFilter, PlayerStatistics, RosterEntity, RosterEntryEntity,
        RosterFilter, TeamEntity, TeamFilter, TeamStatistics, UserEntity,
    },
    storage::{StorageError, StorageResult},
};

/// In-memory store, used for tests and `STORE_BACKEND=memory`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: DashMap<Uuid, UserEntity>,
    emails: DashMap<String, Uuid>,
    teams: DashMap<Uuid, TeamEntity>,
    players: DashMap<Uuid, PlayerEntity>,
    /// `(team, jersey_number)` -> player holding it.
    jerseys: DashMap<(Uuid, u32), Uuid>,
    rosters: DashMap<Uuid, RosterEntity>,
    games: DashMap<Uuid, GameEntity>,
}

fn ready<T: Send + 'static>(value: T) -> BoxFuture<'static, T> {
    Box::pin(future::ready(value))
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_user(&self, user: UserEntity) -> StorageResult<()> {
        match self.inner.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(StorageError::email_taken(&user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.inner.users.insert(user.id, user);
        Ok(())
    }

    fn save_user(&self, user: UserEntity) -> StorageResult<()> {
        let Some(previous_email) = self.inner.users.get(&user.id).map(|u| u.email.clone()) else {
            return Ok(());
        };

        if previous_email != user.email {
            match self.inner.emails.entry(user.email.clone()) {
                Entry::Occupied(slot) if *slot.get() != user.id => {
                    return Err(StorageError::email_taken(&user.email));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
            self.inner
                .emails
                .remove_if(&previous_email, |_, owner| *owner == user.id);
        }

        if let Some(mut stored) = self.inner.users.get_mut(&user.id) {
            let teams = std::mem::take(&mut stored.teams);
            *stored = UserEntity { teams, ..user };
        }
        Ok(())
    }

    fn set_user_team(&self, user: Uuid, team: Uuid, linked: bool) {
        if let Some(mut stored) = self.inner.users.get_mut(&user) {
            stored.teams.retain(|id| *id != team);
            if linked {
                stored.teams.push(team);
            }
            stored.updated_at = SystemTime::now();
        }
    }

    fn save_team(&self, team: TeamEntity) {
        if let Some(mut stored) = self.inner.teams.get_mut(&team.id) {
            let statistics = stored.statistics;
            *stored = TeamEntity { statistics, ..team };
        }
    }

    fn list_teams(&self, filter: &TeamFilter) -> Vec<TeamEntity> {
        let mut teams: Vec<TeamEntity> = self
            .inner
            .teams
            .iter()
            .filter(|team| filter.coach.is_none_or(|coach| team.coach == coach))
            .map(|team| team.clone())
            .collect();
        teams.sort_by_key(|team| team.created_at);
        teams
    }

    fn update_team_statistics(
        &self,
        id: Uuid,
        update: impl FnOnce(&mut TeamStatistics),
    ) -> bool {
        match self.inner.teams.get_mut(&id) {
            Some(mut team) => {
                update(&mut team.statistics);
                team.updated_at = SystemTime::now();
                true
            }
            None => false,
        }
    }

    fn claim_jersey(&self, team: Uuid, jersey_number: u32, player: Uuid) -> StorageResult<()> {
        match self.inner.jerseys.entry((team, jersey_number)) {
            Entry::Occupied(slot) if *slot.get() != player => {
                Err(StorageError::jersey_taken(jersey_number))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(player);
                Ok(())
            }
        }
    }

    fn release_jersey(&self, team: Uuid, jersey_number: u32, player: Uuid) {
        self.inner
            .jerseys
            .remove_if(&(team, jersey_number), |_, owner| *owner == player);
    }

    fn insert_player(&self, player: PlayerEntity) -> StorageResult<()> {
        self.claim_jersey(player.team, player.jersey_number, player.id)?;
        self.inner.players.insert(player.id, player);
        Ok(())
    }

    fn save_player(&self, player: PlayerEntity) -> StorageResult<()> {
        let Some((team, previous_jersey)) = self
            .inner
            .players
            .get(&player.id)
            .map(|stored| (stored.team, stored.jersey_number))
        else {
            return Ok(());
        };

        if previous_jersey != player.jersey_number {
            self.claim_jersey(team, player.jersey_number, player.id)?;
            self.release_jersey(team, previous_jersey, player.id);
        }

        if let Some(mut stored) = self.inner.players.get_mut(&player.id) {
            let statistics = stored.statistics;
            *stored = PlayerEntity {
                team,
                statistics,
                ..player
            };
        }
        Ok(())
    }

    fn list_players(&self, filter: &PlayerFilter) -> Vec<PlayerEntity> {
        let mut players: Vec<PlayerEntity> = self
            .inner
            .players
            .iter()
            .filter(|player| filter.matches(player))
            .map(|player| player.clone())
            .collect();
        players.sort_by_key(|player| (player.created_at, player.jersey_number));
        players
    }

    fn delete_player(&self, id: Uuid) -> bool {
        match self.inner.players.remove(&id) {
            Some((_, player)) => {
                self.release_jersey(player.team, player.jersey_number, player.id);
                true
            }
            None => false,
        }
    }

    fn delete_players_by_team(&self, team: Uuid) -> u64 {
        let ids: Vec<Uuid> = self
            .inner
            .players
            .iter()
            .filter(|player| player.team == team)
            .map(|player| player.id)
            .collect();

        ids.into_iter().filter(|id| self.delete_player(*id)).count() as u64
    }

    fn update_player_statistics(
        &self,
        id: Uuid,
        update: impl FnOnce(&mut PlayerStatistics),
    ) -> bool {
        match self.inner.players.get_mut(&id) {
            Some(mut player) => {
                update(&mut player.statistics);
                player.updated_at = SystemTime::now();
                true
            }
            None => false,
        }
    }

    fn list_rosters(&self, filter: &RosterFilter) -> Vec<RosterEntity> {
        let mut rosters: Vec<RosterEntity> = self
            .inner
            .rosters
            .iter()
            .filter(|roster| filter.matches(roster))
            .map(|roster| roster.clone())
            .collect();
        rosters.sort_by_key(|roster| roster.created_at);
        rosters
    }

    fn push_roster_entry(
        &self,
        id: Uuid,
        entry: RosterEntryEntity,
    ) -> StorageResult<Option<RosterEntity>> {
        let Some(mut roster) = self.inner.rosters.get_mut(&id) else {
            return Ok(None);
        };
        if roster.contains(entry.player) {
            return Err(StorageError::already_in_roster());
        }
        roster.players.push(entry);
        roster.updated_at = SystemTime::now();
        Ok(Some(roster.clone()))
    }

    fn pull_roster_entry(&self, id: Uuid, player: Uuid) -> Option<RosterEntity> {
        let mut roster = self.inner.rosters.get_mut(&id)?;
        roster.players.retain(|entry| entry.player != player);
        roster.updated_at = SystemTime::now();
        Some(roster.clone())
    }

    fn save_game(&self, game: GameEntity) -> Option<GameEntity> {
        let mut stored = self.inner.games.get_mut(&game.id)?;
        let previous = stored.clone();
        *stored = GameEntity {
            player_participation: previous.player_participation.clone(),
            statistics_applied: previous.statistics_applied,
            ..game
        };
        Some(previous)
    }

    fn list_games(&self, filter: &GameFilter) -> Vec<GameEntity> {
        let mut games: Vec<GameEntity> = self
            .inner
            .games
            .iter()
            .filter(|game| filter.matches(game))
            .map(|game| game.clone())
            .collect();
        games.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        games
    }

    fn upsert_participation(
        &self,
        id: Uuid,
        mut record: ParticipationEntity,
    ) -> Option<ParticipationUpsert> {
        let mut game = self.inner.games.get_mut(&id)?;
        let replaced = match game
            .player_participation
            .iter_mut()
            .find(|existing| existing.player == record.player)
        {
            Some(existing) => {
                record.statistics_applied = existing.statistics_applied;
                Some(std::mem::replace(existing, record))
            }
            None => {
                game.player_participation.push(record);
                None
            }
        };
        game.updated_at = SystemTime::now();
        Some(ParticipationUpsert {
            game: game.clone(),
            replaced,
        })
    }

    fn claim_game_statistics(&self, id: Uuid) -> Option<GameEntity> {
        let mut game = self.inner.games.get_mut(&id)?;
        if game.statistics_applied
            || game.status != GameStatus::Completed
            || game.result == GameResult::Pending
        {
            return None;
        }
        game.statistics_applied = true;
        Some(game.clone())
    }

    fn claim_participation_statistics(&self, id: Uuid, player: Uuid) -> Option<ParticipationEntity> {
        let mut game = self.inner.games.get_mut(&id)?;
        if game.status != GameStatus::Completed {
            return None;
        }
        let record = game
            .player_participation
            .iter_mut()
            .find(|record| record.player == player && !record.statistics_applied)?;
        record.statistics_applied = true;
        Some(record.clone())
    }
}

impl EntityStore for MemoryStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        ready(self.insert_user(user))
    }

    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        ready(self.save_user(user))
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        ready(Ok(self.inner.users.get(&id).map(|user| user.clone())))
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let mut users: Vec<UserEntity> =
            self.inner.users.iter().map(|user| user.clone()).collect();
        users.sort_by_key(|user| user.created_at);
        ready(Ok(users))
    }

    fn link_user_team(&self, user: Uuid, team: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        self.set_user_team(user, team, true);
        ready(Ok(()))
    }

    fn unlink_user_team(&self, user: Uuid, team: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        self.set_user_team(user, team, false);
        ready(Ok(()))
    }

    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.teams.insert(team.id, team);
        ready(Ok(()))
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.save_team(team);
        ready(Ok(()))
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        ready(Ok(self.inner.teams.get(&id).map(|team| team.clone())))
    }

    fn list_teams(&self, filter: TeamFilter) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        ready(Ok(self.list_teams(&filter)))
    }

    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(self.inner.teams.remove(&id).is_some()))
    }

    fn increment_team_statistics(
        &self,
        id: Uuid,
        delta: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(
            self.update_team_statistics(id, |stats| stats.accumulate(&delta))
        ))
    }

    fn retract_team_statistics(
        &self,
        id: Uuid,
        delta: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(
            self.update_team_statistics(id, |stats| stats.retract(&delta))
        ))
    }

    fn set_team_statistics(
        &self,
        id: Uuid,
        statistics: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(
            self.update_team_statistics(id, |stats| *stats = statistics)
        ))
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        ready(self.insert_player(player))
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        ready(self.save_player(player))
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        ready(Ok(self.inner.players.get(&id).map(|player| player.clone())))
    }

    fn list_players(
        &self,
        filter: PlayerFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        ready(Ok(self.list_players(&filter)))
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(self.delete_player(id)))
    }

    fn delete_players_by_team(&self, team: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        ready(Ok(self.delete_players_by_team(team)))
    }

    fn increment_player_statistics(
        &self,
        id: Uuid,
        delta: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(
            self.update_player_statistics(id, |stats| stats.accumulate(&delta))
        ))
    }

    fn retract_player_statistics(
        &self,
        id: Uuid,
        delta: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(
            self.update_player_statistics(id, |stats| stats.retract(&delta))
        ))
    }

    fn set_player_statistics(
        &self,
        id: Uuid,
        statistics: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(
            self.update_player_statistics(id, |stats| *stats = statistics)
        ))
    }

    fn insert_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.rosters.insert(roster.id, roster);
        ready(Ok(()))
    }

    fn save_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>> {
        if let Some(mut stored) = self.inner.rosters.get_mut(&roster.id) {
            *stored = roster;
        }
        ready(Ok(()))
    }

    fn find_roster(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        ready(Ok(self.inner.rosters.get(&id).map(|roster| roster.clone())))
    }

    fn list_rosters(
        &self,
        filter: RosterFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<RosterEntity>>> {
        ready(Ok(self.list_rosters(&filter)))
    }

    fn delete_roster(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(self.inner.rosters.remove(&id).is_some()))
    }

    fn push_roster_entry(
        &self,
        roster: Uuid,
        entry: RosterEntryEntity,
    ) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        ready(self.push_roster_entry(roster, entry))
    }

    fn pull_roster_entry(
        &self,
        roster: Uuid,
        player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        ready(Ok(self.pull_roster_entry(roster, player)))
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.games.insert(game.id, game);
        ready(Ok(()))
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        ready(Ok(self.save_game(game)))
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        ready(Ok(self.inner.games.get(&id).map(|game| game.clone())))
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        ready(Ok(self.list_games(&filter)))
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        ready(Ok(self.inner.games.remove(&id).map(|(_, game)| game)))
    }

    fn upsert_participation(
        &self,
        game: Uuid,
        record: ParticipationEntity,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipationUpsert>>> {
        ready(Ok(self.upsert_participation(game, record)))
    }

    fn claim_game_statistics(
        &self,
        game: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        ready(Ok(self.claim_game_statistics(game)))
    }

    fn claim_participation_statistics(
        &self,
        game: Uuid,
        player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipationEntity>>> {
        ready(Ok(self.claim_participation_statistics(game, player)))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(()))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{PlayerStatus, Role};
    use time::macros::date;

    fn user(email: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            name: "Sam".into(),
            email: email.into(),
            role: Role::Coach,
            phone: None,
            credential_hash: None,
            teams: Vec::new(),
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    fn player(team: Uuid, jersey_number: u32) -> PlayerEntity {
        PlayerEntity {
            id: Uuid::new_v4(),
            first_name: "Alex".into(),
            last_name: "Morgan".into(),
            email: None,
            phone: None,
            date_of_birth: date!(2001 - 04 - 20),
            age: 0,
            position: "Forward".into(),
            jersey_number,
            photo: String::new(),
            team,
            height: None,
            weight: None,
            emergency_contact: None,
            status: PlayerStatus::Active,
            statistics: PlayerStatistics::default(),
            notes: None,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.insert_user(user("sam@example.com")).unwrap();
        let err = store.insert_user(user("sam@example.com")).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[test]
    fn changing_email_releases_the_previous_one() {
        let store = MemoryStore::new();
        let mut sam = user("sam@example.com");
        store.insert_user(sam.clone()).unwrap();

        sam.email = "samuel@example.com".into();
        store.save_user(sam).unwrap();

        store.insert_user(user("sam@example.com")).unwrap();
        assert!(store.insert_user(user("samuel@example.com")).is_err());
    }

    #[test]
    fn jersey_numbers_are_unique_per_team() {
        let store = MemoryStore::new();
        let team = Uuid::new_v4();
        store.insert_player(player(team, 9)).unwrap();

        assert!(matches!(
            store.insert_player(player(team, 9)),
            Err(StorageError::Conflict(_))
        ));
        store.insert_player(player(Uuid::new_v4(), 9)).unwrap();
    }

    #[test]
    fn saving_a_player_moves_the_jersey_claim() {
        let store = MemoryStore::new();
        let team = Uuid::new_v4();
        let mut first = player(team, 9);
        store.insert_player(first.clone()).unwrap();

        first.jersey_number = 10;
        store.save_player(first.clone()).unwrap();

        store.insert_player(player(team, 9)).unwrap();
        assert!(store.insert_player(player(team, 10)).is_err());

        // Saving with an unchanged number is not a conflict with itself.
        store.save_player(first).unwrap();
    }

    #[test]
    fn deleting_a_player_frees_the_jersey() {
        let store = MemoryStore::new();
        let team = Uuid::new_v4();
        let first = player(team, 4);
        store.insert_player(first.clone()).unwrap();
        assert!(store.delete_player(first.id));
        store.insert_player(player(team, 4)).unwrap();
    }

    #[test]
    fn statistics_claims_succeed_once() {
        let store = MemoryStore::new();
        let game_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();
        store.inner.games.insert(
            game_id,
            GameEntity {
                id: game_id,
                team: Uuid::new_v4(),
                opponent: "Rovers".into(),
                date: date!(2024 - 05 - 01),
                time: "18:00".into(),
                location: "Home".into(),
                is_home_game: true,
                status: GameStatus::Completed,
                score: Default::default(),
                result: GameResult::Draw,
                roster: None,
                player_participation: Vec::new(),
                notes: None,
                season: "2024".into(),
                statistics_applied: false,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            },
        );

        assert!(store.claim_game_statistics(game_id).is_some());
        assert!(store.claim_game_statistics(game_id).is_none());

        assert!(store.claim_participation_statistics(game_id, player_id).is_none());
        let record = ParticipationEntity {
            player: player_id,
            participated: true,
            minutes_played: Some(90),
            goals: 1,
            assists: 0,
            yellow_cards: 0,
            red_cards: 0,
            statistics_applied: false,
        };
        store.upsert_participation(game_id, record.clone()).unwrap();
        let claimed = store.claim_participation_statistics(game_id, player_id).unwrap();
        assert_eq!(claimed.goals, 1);

        // Replacing the record keeps the claim and hands back the counted values.
        let upsert = store
            .upsert_participation(game_id, ParticipationEntity { goals: 3, ..record })
            .unwrap();
        assert!(upsert.game.player_participation[0].statistics_applied);
        assert_eq!(upsert.replaced.map(|old| old.goals), Some(1));
        assert!(store.claim_participation_statistics(game_id, player_id).is_none());
    }

    #[test]
    fn unfinished_games_cannot_be_claimed() {
        let store = MemoryStore::new();
        let game_id = Uuid::new_v4();
        store.inner.games.insert(
            game_id,
            GameEntity {
                id: game_id,
                team: Uuid::new_v4(),
                opponent: "Rovers".into(),
                date: date!(2024 - 05 - 01),
                time: "18:00".into(),
                location: "Home".into(),
                is_home_game: true,
                status: GameStatus::InProgress,
                score: Default::default(),
                result: GameResult::Win,
                roster: None,
                player_participation: Vec::new(),
                notes: None,
                season: "2024".into(),
                statistics_applied: false,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            },
        );
        assert!(store.claim_game_statistics(game_id).is_none());

        let mut game = store.inner.games.get(&game_id).unwrap().clone();
        game.status = GameStatus::Completed;
        game.result = GameResult::Pending;
        let previous = store.save_game(game).unwrap();
        assert_eq!(previous.status, GameStatus::InProgress);
        assert!(store.claim_game_statistics(game_id).is_none());
    }
}
