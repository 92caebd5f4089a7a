use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{DateTime, Document, doc, serialize_to_bson, serialize_to_document},
    error::Error as MongoError,
    options::{IndexOptions, ReturnDocument, UpdateModifications},
};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{
        MongoGameDocument, MongoParticipationDocument, MongoPlayerDocument, MongoRosterDocument,
        MongoRosterEntryDocument, MongoTeamDocument, MongoUserDocument, doc_id,
    },
};
use crate::dao::{
    entity_store::EntityStore,
    models::{
        GameEntity, GameFilter, GameResult, GameStatus, ParticipationEntity, ParticipationUpsert,
        PlayerEntity, PlayerFilter, PlayerStatistics, RosterEntity, RosterEntryEntity,
        RosterFilter, TeamEntity, TeamFilter, TeamStatistics, UserEntity,
    },
    storage::{StorageError, StorageResult},
};

const USER_COLLECTION_NAME: &str = "users";
const TEAM_COLLECTION_NAME: &str = "teams";
const PLAYER_COLLECTION_NAME: &str = "players";
const ROSTER_COLLECTION_NAME: &str = "rosters";
const GAME_COLLECTION_NAME: &str = "games";

/// MongoDB implementation of [`EntityStore`].
#[derive(Clone)]
pub struct MongoEntityStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

/// Serialize `value` into a `$set` body, dropping the keys owned by other operations.
fn set_fields<T: Serialize>(value: &T, kind: &'static str, id: Uuid, skip: &[&str]) -> MongoResult<Document> {
    let mut fields = serialize_to_document(value).map_err(|err| MongoDaoError::Encode {
        kind,
        id,
        message: err.to_string(),
    })?;
    fields.remove("_id");
    fields.remove("created_at");
    for key in skip {
        fields.remove(*key);
    }
    Ok(fields)
}

fn write_error(
    kind: &'static str,
    id: Uuid,
    source: MongoError,
    conflict: impl FnOnce() -> StorageError,
) -> MongoDaoError {
    if is_duplicate_key(&source) {
        MongoDaoError::DuplicateKey {
            message: conflict().to_string(),
        }
    } else {
        MongoDaoError::Write { kind, id, source }
    }
}

fn team_counters(delta: &TeamStatistics) -> [(&'static str, u32); 5] {
    [
        ("wins", delta.wins),
        ("losses", delta.losses),
        ("draws", delta.draws),
        ("goalsFor", delta.goals_for),
        ("goalsAgainst", delta.goals_against),
    ]
}

fn player_counters(delta: &PlayerStatistics) -> [(&'static str, u32); 6] {
    [
        ("gamesPlayed", delta.games_played),
        ("goals", delta.goals),
        ("assists", delta.assists),
        ("yellowCards", delta.yellow_cards),
        ("redCards", delta.red_cards),
        ("minutesPlayed", delta.minutes_played),
    ]
}

fn statistics_increment(counters: &[(&str, u32)]) -> Document {
    let mut update = Document::new();
    for (field, amount) in counters {
        update.insert(format!("statistics.{field}"), i64::from(*amount));
    }
    doc! {"$inc": update, "$set": {"updated_at": DateTime::now()}}
}

/// Pipeline subtracting `counters` from the stored statistics, floored at zero.
fn statistics_retraction(counters: &[(&str, u32)]) -> Vec<Document> {
    let mut fields = Document::new();
    for (field, amount) in counters {
        let current = format!("$statistics.{field}");
        fields.insert(
            format!("statistics.{field}"),
            doc! {"$max": [0, {"$subtract": [{"$ifNull": [current, 0]}, i64::from(*amount)]}]},
        );
    }
    fields.insert("updated_at", DateTime::now());
    vec![doc! {"$set": fields}]
}

fn find_record(game: &MongoGameDocument, player: Uuid) -> Option<ParticipationEntity> {
    game.player_participation
        .iter()
        .find(|record| record.player == player)
        .cloned()
        .map(Into::into)
}

impl MongoEntityStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let indexes: [(&'static str, &'static str, Document, bool); 5] = [
            (USER_COLLECTION_NAME, "email", doc! {"email": 1}, true),
            (
                PLAYER_COLLECTION_NAME,
                "team,jersey_number",
                doc! {"team": 1, "jersey_number": 1},
                true,
            ),
            (TEAM_COLLECTION_NAME, "coach", doc! {"coach": 1}, false),
            (ROSTER_COLLECTION_NAME, "team", doc! {"team": 1}, false),
            (GAME_COLLECTION_NAME, "team,date", doc! {"team": 1, "date": 1}, false),
        ];

        let database = self.database().await;
        for (collection, index, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{collection}_{}_idx", index.replace(',', "_"))))
                        .unique(Some(unique))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database().await.collection(USER_COLLECTION_NAME)
    }

    async fn teams(&self) -> Collection<MongoTeamDocument> {
        self.database().await.collection(TEAM_COLLECTION_NAME)
    }

    async fn players(&self) -> Collection<MongoPlayerDocument> {
        self.database().await.collection(PLAYER_COLLECTION_NAME)
    }

    async fn rosters(&self) -> Collection<MongoRosterDocument> {
        self.database().await.collection(ROSTER_COLLECTION_NAME)
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database().await.collection(GAME_COLLECTION_NAME)
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    async fn insert_user(&self, user: UserEntity) -> MongoResult<()> {
        let (id, email) = (user.id, user.email.clone());
        let document: MongoUserDocument = user.into();
        self.users()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| write_error("user", id, source, || StorageError::email_taken(&email)))?;
        Ok(())
    }

    async fn save_user(&self, user: UserEntity) -> MongoResult<()> {
        let (id, email) = (user.id, user.email.clone());
        let fields = set_fields(&MongoUserDocument::from(user), "user", id, &["teams"])?;
        self.users()
            .await
            .update_one(doc_id(id), doc! {"$set": fields})
            .await
            .map_err(|source| write_error("user", id, source, || StorageError::email_taken(&email)))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                kind: "user",
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_users(&self) -> MongoResult<Vec<UserEntity>> {
        let documents: Vec<MongoUserDocument> = self
            .users()
            .await
            .find(doc! {})
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "users",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "users",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn update_user_teams(&self, user: Uuid, update: Document) -> MongoResult<()> {
        self.users()
            .await
            .update_one(doc_id(user), update)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "user",
                id: user,
                source,
            })?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    async fn insert_team(&self, team: TeamEntity) -> MongoResult<()> {
        let id = team.id;
        let document: MongoTeamDocument = team.into();
        self.teams()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "team",
                id,
                source,
            })?;
        Ok(())
    }

    async fn save_team(&self, team: TeamEntity) -> MongoResult<()> {
        let id = team.id;
        let fields = set_fields(&MongoTeamDocument::from(team), "team", id, &["statistics"])?;
        self.teams()
            .await
            .update_one(doc_id(id), doc! {"$set": fields})
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "team",
                id,
                source,
            })?;
        Ok(())
    }

    async fn find_team(&self, id: Uuid) -> MongoResult<Option<TeamEntity>> {
        let document = self
            .teams()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                kind: "team",
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_teams(&self, filter: TeamFilter) -> MongoResult<Vec<TeamEntity>> {
        let mut query = doc! {};
        if let Some(coach) = filter.coach {
            query.insert("coach", coach.to_string());
        }

        let documents: Vec<MongoTeamDocument> = self
            .teams()
            .await
            .find(query)
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "teams",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "teams",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_team(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .teams()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                kind: "team",
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn update_team_statistics(
        &self,
        id: Uuid,
        update: impl Into<UpdateModifications>,
    ) -> MongoResult<bool> {
        let result = self
            .teams()
            .await
            .update_one(doc_id(id), update)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "team",
                id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    async fn insert_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let (id, jersey_number) = (player.id, player.jersey_number);
        let document: MongoPlayerDocument = player.into();
        self.players()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                write_error("player", id, source, || {
                    StorageError::jersey_taken(jersey_number)
                })
            })?;
        Ok(())
    }

    async fn save_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let (id, jersey_number) = (player.id, player.jersey_number);
        let fields = set_fields(
            &MongoPlayerDocument::from(player),
            "player",
            id,
            &["statistics", "team"],
        )?;
        self.players()
            .await
            .update_one(doc_id(id), doc! {"$set": fields})
            .await
            .map_err(|source| {
                write_error("player", id, source, || {
                    StorageError::jersey_taken(jersey_number)
                })
            })?;
        Ok(())
    }

    async fn find_player(&self, id: Uuid) -> MongoResult<Option<PlayerEntity>> {
        let document = self
            .players()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                kind: "player",
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_players(&self, filter: PlayerFilter) -> MongoResult<Vec<PlayerEntity>> {
        let mut query = doc! {};
        if let Some(team) = filter.team {
            query.insert("team", team.to_string());
        }
        if let Some(status) = filter.status {
            query.insert("status", status.as_str());
        }

        let documents: Vec<MongoPlayerDocument> = self
            .players()
            .await
            .find(query)
            .sort(doc! {"created_at": 1, "jersey_number": 1})
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "players",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "players",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_player(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .players()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                kind: "player",
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_players_by_team(&self, team: Uuid) -> MongoResult<u64> {
        let result = self
            .players()
            .await
            .delete_many(doc! {"team": team.to_string()})
            .await
            .map_err(|source| MongoDaoError::Delete {
                kind: "players",
                source,
            })?;
        Ok(result.deleted_count)
    }

    async fn update_player_statistics(
        &self,
        id: Uuid,
        update: impl Into<UpdateModifications>,
    ) -> MongoResult<bool> {
        let result = self
            .players()
            .await
            .update_one(doc_id(id), update)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "player",
                id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    // -----------------------------------------------------------------------
    // Rosters
    // -----------------------------------------------------------------------

    async fn insert_roster(&self, roster: RosterEntity) -> MongoResult<()> {
        let id = roster.id;
        let document: MongoRosterDocument = roster.into();
        self.rosters()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "roster",
                id,
                source,
            })?;
        Ok(())
    }

    async fn save_roster(&self, roster: RosterEntity) -> MongoResult<()> {
        let id = roster.id;
        let document: MongoRosterDocument = roster.into();
        self.rosters()
            .await
            .replace_one(doc_id(id), &document)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "roster",
                id,
                source,
            })?;
        Ok(())
    }

    async fn find_roster(&self, id: Uuid) -> MongoResult<Option<RosterEntity>> {
        let document = self
            .rosters()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                kind: "roster",
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_rosters(&self, filter: RosterFilter) -> MongoResult<Vec<RosterEntity>> {
        let mut query = doc! {};
        if let Some(team) = filter.team {
            query.insert("team", team.to_string());
        }
        if let Some(roster_type) = filter.roster_type {
            query.insert("type", roster_type.as_str());
        }
        if let Some(season) = filter.season {
            query.insert("season", season);
        }

        let documents: Vec<MongoRosterDocument> = self
            .rosters()
            .await
            .find(query)
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "rosters",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "rosters",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_roster(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .rosters()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                kind: "roster",
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn push_roster_entry(
        &self,
        id: Uuid,
        entry: RosterEntryEntity,
    ) -> MongoResult<Option<RosterEntity>> {
        let player = entry.player.to_string();
        let entry = serialize_to_bson(&MongoRosterEntryDocument::from(entry)).map_err(|err| {
            MongoDaoError::Encode {
                kind: "roster",
                id,
                message: err.to_string(),
            }
        })?;

        let rosters = self.rosters().await;
        let updated = rosters
            .find_one_and_update(
                doc! {"_id": id.to_string(), "players.player": {"$ne": &player}},
                doc! {
                    "$push": {"players": entry},
                    "$set": {"updated_at": DateTime::now()},
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "roster",
                id,
                source,
            })?;

        match updated {
            Some(document) => Ok(Some(document.into())),
            // Either the roster is gone or the guard on `players.player` rejected the push.
            None => match self.find_roster(id).await? {
                Some(_) => Err(MongoDaoError::DuplicateKey {
                    message: StorageError::already_in_roster().to_string(),
                }),
                None => Ok(None),
            },
        }
    }

    async fn pull_roster_entry(&self, id: Uuid, player: Uuid) -> MongoResult<Option<RosterEntity>> {
        let updated = self
            .rosters()
            .await
            .find_one_and_update(
                doc_id(id),
                doc! {
                    "$pull": {"players": {"player": player.to_string()}},
                    "$set": {"updated_at": DateTime::now()},
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "roster",
                id,
                source,
            })?;
        Ok(updated.map(Into::into))
    }

    // -----------------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------------

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.games()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "game",
                id,
                source,
            })?;
        Ok(())
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<Option<GameEntity>> {
        let id = game.id;
        let fields = set_fields(
            &MongoGameDocument::from(game),
            "game",
            id,
            &["player_participation", "statistics_applied"],
        )?;
        let previous = self
            .games()
            .await
            .find_one_and_update(doc_id(id), doc! {"$set": fields})
            .return_document(ReturnDocument::Before)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "game",
                id,
                source,
            })?;
        Ok(previous.map(Into::into))
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                kind: "game",
                id,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_games(&self, filter: GameFilter) -> MongoResult<Vec<GameEntity>> {
        let mut query = doc! {};
        if let Some(team) = filter.team {
            query.insert("team", team.to_string());
        }
        if let Some(status) = filter.status {
            query.insert("status", status.as_str());
        }
        if let Some(season) = filter.season {
            query.insert("season", season);
        }

        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(query)
            .sort(doc! {"date": 1, "time": 1})
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "games",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                kind: "games",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let deleted = self
            .games()
            .await
            .find_one_and_delete(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                kind: "game",
                source,
            })?;
        Ok(deleted.map(Into::into))
    }

    async fn upsert_participation(
        &self,
        id: Uuid,
        record: ParticipationEntity,
    ) -> MongoResult<Option<ParticipationUpsert>> {
        let player_id = record.player;
        let player = player_id.to_string();
        let document = MongoParticipationDocument::from(record);
        let games = self.games().await;
        let write_err = |source| MongoDaoError::Write {
            kind: "game",
            id,
            source,
        };

        // Replace the values of an existing record, keeping its statistics flag.
        let before = games
            .find_one_and_update(
                doc! {"_id": id.to_string(), "player_participation.player": &player},
                doc! {"$set": {
                    "player_participation.$.participated": document.participated,
                    "player_participation.$.minutes_played": document.minutes_played.map(i64::from),
                    "player_participation.$.goals": i64::from(document.goals),
                    "player_participation.$.assists": i64::from(document.assists),
                    "player_participation.$.yellow_cards": i64::from(document.yellow_cards),
                    "player_participation.$.red_cards": i64::from(document.red_cards),
                    "updated_at": DateTime::now(),
                }},
            )
            .return_document(ReturnDocument::Before)
            .await
            .map_err(write_err)?;
        let replaced = before.and_then(|game| find_record(&game, player_id));

        if replaced.is_none() {
            let entry = serialize_to_bson(&document).map_err(|err| MongoDaoError::Encode {
                kind: "game",
                id,
                message: err.to_string(),
            })?;
            games
                .update_one(
                    doc! {"_id": id.to_string(), "player_participation.player": {"$ne": &player}},
                    doc! {
                        "$push": {"player_participation": entry},
                        "$set": {"updated_at": DateTime::now()},
                    },
                )
                .await
                .map_err(write_err)?;
        }

        let game = self.find_game(id).await?;
        Ok(game.map(|game| ParticipationUpsert { game, replaced }))
    }

    async fn claim_game_statistics(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let claimed = self
            .games()
            .await
            .find_one_and_update(
                doc! {
                    "_id": id.to_string(),
                    "statistics_applied": {"$ne": true},
                    "status": GameStatus::Completed.as_str(),
                    "result": {"$ne": GameResult::Pending.as_str()},
                },
                doc! {"$set": {"statistics_applied": true}},
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "game",
                id,
                source,
            })?;
        Ok(claimed.map(Into::into))
    }

    async fn claim_participation_statistics(
        &self,
        id: Uuid,
        player: Uuid,
    ) -> MongoResult<Option<ParticipationEntity>> {
        let claimed = self
            .games()
            .await
            .find_one_and_update(
                doc! {
                    "_id": id.to_string(),
                    "status": GameStatus::Completed.as_str(),
                    "player_participation": {"$elemMatch": {
                        "player": player.to_string(),
                        "statistics_applied": {"$ne": true},
                    }},
                },
                doc! {"$set": {"player_participation.$.statistics_applied": true}},
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::Write {
                kind: "game",
                id,
                source,
            })?;
        Ok(claimed.and_then(|game| find_record(&game, player)))
    }
}

impl EntityStore for MongoEntityStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await.map_err(Into::into) })
    }

    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_user(user).await.map_err(Into::into) })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id).await.map_err(Into::into) })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users().await.map_err(Into::into) })
    }

    fn link_user_team(&self, user: Uuid, team: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_user_teams(
                    user,
                    doc! {
                        "$addToSet": {"teams": team.to_string()},
                        "$set": {"updated_at": DateTime::now()},
                    },
                )
                .await
                .map_err(Into::into)
        })
    }

    fn unlink_user_team(&self, user: Uuid, team: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_user_teams(
                    user,
                    doc! {
                        "$pull": {"teams": team.to_string()},
                        "$set": {"updated_at": DateTime::now()},
                    },
                )
                .await
                .map_err(Into::into)
        })
    }

    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_team(team).await.map_err(Into::into) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_team(team).await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_team(id).await.map_err(Into::into) })
    }

    fn list_teams(&self, filter: TeamFilter) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams(filter).await.map_err(Into::into) })
    }

    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_team(id).await.map_err(Into::into) })
    }

    fn increment_team_statistics(
        &self,
        id: Uuid,
        delta: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_team_statistics(id, statistics_increment(&team_counters(&delta)))
                .await
                .map_err(Into::into)
        })
    }

    fn retract_team_statistics(
        &self,
        id: Uuid,
        delta: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_team_statistics(id, statistics_retraction(&team_counters(&delta)))
                .await
                .map_err(Into::into)
        })
    }

    fn set_team_statistics(
        &self,
        id: Uuid,
        statistics: TeamStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let statistics = serialize_to_bson(&statistics).map_err(|err| MongoDaoError::Encode {
                kind: "team",
                id,
                message: err.to_string(),
            })?;
            store
                .update_team_statistics(
                    id,
                    doc! {"$set": {"statistics": statistics, "updated_at": DateTime::now()}},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_player(player).await.map_err(Into::into) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_player(player).await.map_err(Into::into) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_player(id).await.map_err(Into::into) })
    }

    fn list_players(
        &self,
        filter: PlayerFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players(filter).await.map_err(Into::into) })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_player(id).await.map_err(Into::into) })
    }

    fn delete_players_by_team(&self, team: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.delete_players_by_team(team).await.map_err(Into::into) })
    }

    fn increment_player_statistics(
        &self,
        id: Uuid,
        delta: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_player_statistics(id, statistics_increment(&player_counters(&delta)))
                .await
                .map_err(Into::into)
        })
    }

    fn retract_player_statistics(
        &self,
        id: Uuid,
        delta: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_player_statistics(id, statistics_retraction(&player_counters(&delta)))
                .await
                .map_err(Into::into)
        })
    }

    fn set_player_statistics(
        &self,
        id: Uuid,
        statistics: PlayerStatistics,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let statistics = serialize_to_bson(&statistics).map_err(|err| MongoDaoError::Encode {
                kind: "player",
                id,
                message: err.to_string(),
            })?;
            store
                .update_player_statistics(
                    id,
                    doc! {"$set": {"statistics": statistics, "updated_at": DateTime::now()}},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn insert_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_roster(roster).await.map_err(Into::into) })
    }

    fn save_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_roster(roster).await.map_err(Into::into) })
    }

    fn find_roster(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_roster(id).await.map_err(Into::into) })
    }

    fn list_rosters(
        &self,
        filter: RosterFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<RosterEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_rosters(filter).await.map_err(Into::into) })
    }

    fn delete_roster(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_roster(id).await.map_err(Into::into) })
    }

    fn push_roster_entry(
        &self,
        roster: Uuid,
        entry: RosterEntryEntity,
    ) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .push_roster_entry(roster, entry)
                .await
                .map_err(Into::into)
        })
    }

    fn pull_roster_entry(
        &self,
        roster: Uuid,
        player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .pull_roster_entry(roster, player)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(filter).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn upsert_participation(
        &self,
        game: Uuid,
        record: ParticipationEntity,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipationUpsert>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_participation(game, record)
                .await
                .map_err(Into::into)
        })
    }

    fn claim_game_statistics(
        &self,
        game: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.claim_game_statistics(game).await.map_err(Into::into) })
    }

    fn claim_participation_statistics(
        &self,
        game: Uuid,
        player: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .claim_participation_statistics(game, player)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
