//! Game scheduling, status changes and participation recording.
//!
//! Every write that can leave a game `completed` is followed by the statistics
//! propagation in [`crate::services::statistics`].

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        entity_store::EntityStore,
        models::{GameEntity, GameResult, GameStatus, ParticipationEntity, Score},
    },
    dto::games::{
        CreateGameRequest, GameQuery, GameResponse, ParticipationRequest, UpdateGameRequest,
    },
    error::ServiceError,
    services::{
        access::{MANAGERS, Principal, authorize},
        player_service::load_player,
        statistics::{
            apply_game_statistics, apply_participation_statistics, correct_game_statistics,
            correct_participation_statistics, derive_result, retract_game_statistics,
        },
        team_service::load_team,
    },
    state::{SharedState, game_lifecycle::check_transition},
};

fn game_not_found() -> ServiceError {
    ServiceError::NotFound("Game not found".into())
}

async fn load_game(store: &dyn EntityStore, id: Uuid) -> Result<GameEntity, ServiceError> {
    store.find_game(id).await?.ok_or_else(game_not_found)
}

async fn check_roster(store: &dyn EntityStore, id: Uuid) -> Result<(), ServiceError> {
    store
        .find_roster(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Roster not found".into()))?;
    Ok(())
}

/// Whether any counter of the team or a player already includes this game.
fn is_counted(game: &GameEntity) -> bool {
    game.statistics_applied
        || game
            .player_participation
            .iter()
            .any(|record| record.statistics_applied)
}

/// Push the counters of a completed game to its team and players.
async fn propagate(store: &dyn EntityStore, game: &GameEntity) -> Result<(), ServiceError> {
    if game.status != GameStatus::Completed {
        return Ok(());
    }
    if apply_game_statistics(store, game).await? {
        info!(game = %game.id, team = %game.team, result = ?game.result, "team record updated");
    } else if game.result == GameResult::Pending {
        warn!(game = %game.id, "completed game has no score, team record unchanged");
    }
    apply_participation_statistics(store, game).await?;
    Ok(())
}

/// Create a game for an existing team. A completed game is counted right away.
pub async fn create_game(
    state: &SharedState,
    principal: &Principal,
    payload: CreateGameRequest,
) -> Result<GameResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    load_team(store.as_ref(), payload.team).await?;
    if let Some(roster) = payload.roster {
        check_roster(store.as_ref(), roster).await?;
    }

    let (score, result) = match payload.score {
        Some(score) => (score, derive_result(score)),
        None => (Score::default(), GameResult::Pending),
    };
    let now = SystemTime::now();
    let game = GameEntity {
        id: Uuid::new_v4(),
        team: payload.team,
        opponent: payload.opponent.trim().to_owned(),
        date: payload.date,
        time: payload.time,
        location: payload.location,
        is_home_game: payload.is_home_game,
        status: payload.status.unwrap_or_default(),
        score,
        result,
        roster: payload.roster,
        player_participation: Vec::new(),
        notes: payload.notes,
        season: payload.season,
        statistics_applied: false,
        created_at: now,
        updated_at: now,
    };

    store.insert_game(game.clone()).await?;
    info!(game = %game.id, team = %game.team, date = %game.date, "game created");

    // Games may be recorded after the fact, already completed, even in strict mode.
    propagate(store.as_ref(), &game).await?;
    Ok(load_game(store.as_ref(), game.id).await?.into())
}

/// Games matching the query, earliest first.
pub async fn list_games(
    state: &SharedState,
    query: GameQuery,
) -> Result<Vec<GameResponse>, ServiceError> {
    let store = state.require_store().await?;
    let games = store.list_games(query.into()).await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// Load one game.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameResponse, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_game(store.as_ref(), id).await?.into())
}

/// Update a game. A score always re-derives the result.
///
/// Edits of a game whose statistics are already counted are folded into the team
/// record. Such a game cannot leave `completed`.
pub async fn update_game(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateGameRequest,
) -> Result<GameResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    let mut game = load_game(store.as_ref(), id).await?;

    if let Some(status) = payload.status {
        if state.config().strict_game_status {
            check_transition(game.status, status)?;
        }
        if status != GameStatus::Completed && is_counted(&game) {
            return Err(ServiceError::InvalidInput(
                "statistics of this game are already counted, it must stay completed".into(),
            ));
        }
        game.status = status;
    }
    if let Some(score) = payload.score {
        game.score = score;
        game.result = derive_result(score);
    }
    if let Some(opponent) = payload.opponent {
        game.opponent = opponent.trim().to_owned();
    }
    if let Some(date) = payload.date {
        game.date = date;
    }
    if let Some(time) = payload.time {
        game.time = time;
    }
    if let Some(location) = payload.location {
        game.location = location;
    }
    if let Some(is_home_game) = payload.is_home_game {
        game.is_home_game = is_home_game;
    }
    if let Some(roster) = payload.roster {
        check_roster(store.as_ref(), roster).await?;
        game.roster = Some(roster);
    }
    if payload.notes.is_some() {
        game.notes = payload.notes;
    }
    if let Some(season) = payload.season {
        game.season = season;
    }
    game.updated_at = SystemTime::now();

    let previous = store
        .save_game(game.clone())
        .await?
        .ok_or_else(game_not_found)?;
    if correct_game_statistics(store.as_ref(), &previous, &game).await? {
        info!(game = %id, team = %game.team, result = ?game.result, "team record corrected");
    }
    let saved = load_game(store.as_ref(), id).await?;
    propagate(store.as_ref(), &saved).await?;

    Ok(load_game(store.as_ref(), id).await?.into())
}

/// Delete a game and take back whatever it added to the statistics.
pub async fn delete_game(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
) -> Result<(), ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    let game = store.delete_game(id).await?.ok_or_else(game_not_found)?;
    retract_game_statistics(store.as_ref(), &game).await?;
    info!(game = %id, counted = is_counted(&game), "game deleted");
    Ok(())
}

/// Record or replace the performance of one player in a game.
///
/// Replacing a record that was already counted corrects the player's totals.
pub async fn update_participation(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    payload: ParticipationRequest,
) -> Result<GameResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    load_game(store.as_ref(), id).await?;
    load_player(store.as_ref(), payload.player_id).await?;

    let record = ParticipationEntity::from(payload);
    let upsert = store
        .upsert_participation(id, record.clone())
        .await?
        .ok_or_else(game_not_found)?;
    if let Some(replaced) = &upsert.replaced {
        correct_participation_statistics(store.as_ref(), id, replaced, &record).await?;
    }
    apply_participation_statistics(store.as_ref(), &upsert.game).await?;

    Ok(load_game(store.as_ref(), id).await?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::{PlayerStatistics, Role, TeamStatistics},
        services::fixtures::{memory_state, memory_store, player, principal, team},
        state::AppState,
    };
    use time::macros::date;

    struct Fixture {
        state: SharedState,
        coach: Principal,
        team: Uuid,
    }

    async fn fixture(state: SharedState) -> Fixture {
        let coach = principal(&state, Role::Coach).await;
        let team = team(coach.id);
        state
            .require_store()
            .await
            .unwrap()
            .insert_team(team.clone())
            .await
            .unwrap();
        Fixture {
            state,
            coach,
            team: team.id,
        }
    }

    fn request(team: Uuid) -> CreateGameRequest {
        CreateGameRequest {
            team,
            opponent: "Rovers".into(),
            date: date!(2024 - 05 - 01),
            time: "18:00".into(),
            location: "Main Stadium".into(),
            is_home_game: true,
            status: None,
            score: None,
            roster: None,
            notes: None,
            season: "2024".into(),
        }
    }

    fn status(status: GameStatus) -> UpdateGameRequest {
        UpdateGameRequest {
            status: Some(status),
            ..Default::default()
        }
    }

    async fn team_record(f: &Fixture) -> TeamStatistics {
        let store = f.state.require_store().await.unwrap();
        store.find_team(f.team).await.unwrap().unwrap().statistics
    }

    #[tokio::test]
    async fn score_derives_result_before_completion() {
        let f = fixture(memory_state()).await;
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();
        assert_eq!(game.result, GameResult::Pending);

        let patch = UpdateGameRequest {
            score: Some(Score { team: 1, opponent: 3 }),
            ..Default::default()
        };
        let game = update_game(&f.state, &f.coach, game.id, patch).await.unwrap();
        assert_eq!(game.result, GameResult::Loss);
        assert_eq!(game.status, GameStatus::Scheduled);
        assert_eq!(team_record(&f).await.losses, 0);
    }

    #[tokio::test]
    async fn completing_a_game_updates_the_team_record_once() {
        let f = fixture(memory_state()).await;
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();
        update_game(&f.state, &f.coach, game.id, status(GameStatus::InProgress))
            .await
            .unwrap();

        let finish = || UpdateGameRequest {
            status: Some(GameStatus::Completed),
            score: Some(Score { team: 3, opponent: 1 }),
            ..Default::default()
        };
        let completed = update_game(&f.state, &f.coach, game.id, finish())
            .await
            .unwrap();
        assert_eq!(completed.result, GameResult::Win);
        assert!(completed.statistics_applied);

        // Writing the same final state again must not count twice.
        update_game(&f.state, &f.coach, game.id, finish())
            .await
            .unwrap();

        let record = team_record(&f).await;
        assert_eq!(record.wins, 1);
        assert_eq!(record.goals_for, 3);
        assert_eq!(record.goals_against, 1);
        assert_eq!(record.losses + record.draws, 0);
    }

    #[tokio::test]
    async fn strict_mode_rejects_illegal_transitions() {
        let f = fixture(memory_state()).await;
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();

        let err = update_game(&f.state, &f.coach, game.id, status(GameStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(
            get_game(&f.state, game.id).await.unwrap().status,
            GameStatus::Scheduled
        );
    }

    #[tokio::test]
    async fn permissive_mode_accepts_any_status() {
        let state = AppState::with_store(AppConfig::permissive(), memory_store());
        let f = fixture(state).await;
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();

        let game = update_game(&f.state, &f.coach, game.id, status(GameStatus::Completed))
            .await
            .unwrap();
        assert_eq!(game.status, GameStatus::Completed);
    }

    #[tokio::test]
    async fn participation_is_replaced_not_appended() {
        let f = fixture(memory_state()).await;
        let scorer = player(f.team, 9);
        f.state
            .require_store()
            .await
            .unwrap()
            .insert_player(scorer.clone())
            .await
            .unwrap();
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();

        let record = |goals| ParticipationRequest {
            player_id: scorer.id,
            participated: true,
            minutes_played: Some(90),
            goals: Some(goals),
            assists: None,
            yellow_cards: None,
            red_cards: None,
        };
        update_participation(&f.state, &f.coach, game.id, record(1))
            .await
            .unwrap();
        let game = update_participation(&f.state, &f.coach, game.id, record(2))
            .await
            .unwrap();

        assert_eq!(game.player_participation.len(), 1);
        assert_eq!(game.player_participation[0].goals, 2);
        assert_eq!(game.player_participation[0].assists, 0);
    }

    #[tokio::test]
    async fn participation_recorded_early_counts_on_completion() {
        let f = fixture(memory_state()).await;
        let store = f.state.require_store().await.unwrap();
        let scorer = player(f.team, 9);
        store.insert_player(scorer.clone()).await.unwrap();
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();

        let record = ParticipationRequest {
            player_id: scorer.id,
            participated: true,
            minutes_played: Some(75),
            goals: Some(1),
            assists: Some(1),
            yellow_cards: None,
            red_cards: None,
        };
        update_participation(&f.state, &f.coach, game.id, record)
            .await
            .unwrap();
        let untouched = store.find_player(scorer.id).await.unwrap().unwrap();
        assert_eq!(untouched.statistics.games_played, 0);

        update_game(&f.state, &f.coach, game.id, status(GameStatus::InProgress))
            .await
            .unwrap();
        update_game(&f.state, &f.coach, game.id, status(GameStatus::Completed))
            .await
            .unwrap();
        update_game(&f.state, &f.coach, game.id, status(GameStatus::Completed))
            .await
            .unwrap();

        let counted = store.find_player(scorer.id).await.unwrap().unwrap();
        assert_eq!(counted.statistics.games_played, 1);
        assert_eq!(counted.statistics.goals, 1);
        assert_eq!(counted.statistics.minutes_played, 75);
    }

    #[tokio::test]
    async fn participation_requires_known_game_and_player() {
        let f = fixture(memory_state()).await;
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();
        let record = |player_id| ParticipationRequest {
            player_id,
            participated: true,
            minutes_played: None,
            goals: None,
            assists: None,
            yellow_cards: None,
            red_cards: None,
        };

        assert!(matches!(
            update_participation(&f.state, &f.coach, game.id, record(Uuid::new_v4())).await,
            Err(ServiceError::NotFound(message)) if message == "Player not found"
        ));
        assert!(matches!(
            update_participation(&f.state, &f.coach, Uuid::new_v4(), record(Uuid::new_v4())).await,
            Err(ServiceError::NotFound(message)) if message == "Game not found"
        ));
    }

    async fn completed_win(f: &Fixture) -> GameResponse {
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();
        update_game(&f.state, &f.coach, game.id, status(GameStatus::InProgress))
            .await
            .unwrap();
        let finish = UpdateGameRequest {
            status: Some(GameStatus::Completed),
            score: Some(Score { team: 3, opponent: 1 }),
            ..Default::default()
        };
        update_game(&f.state, &f.coach, game.id, finish).await.unwrap()
    }

    fn scored(player_id: Uuid, goals: u32) -> ParticipationRequest {
        ParticipationRequest {
            player_id,
            participated: true,
            minutes_played: Some(90),
            goals: Some(goals),
            assists: None,
            yellow_cards: None,
            red_cards: None,
        }
    }

    #[tokio::test]
    async fn score_correction_after_completion_moves_the_team_record() {
        let f = fixture(memory_state()).await;
        let game = completed_win(&f).await;

        let correction = UpdateGameRequest {
            score: Some(Score { team: 1, opponent: 2 }),
            ..Default::default()
        };
        let game = update_game(&f.state, &f.coach, game.id, correction)
            .await
            .unwrap();
        assert_eq!(game.result, GameResult::Loss);

        let record = team_record(&f).await;
        assert_eq!(record.wins, 0);
        assert_eq!(record.losses, 1);
        assert_eq!(record.goals_for, 1);
        assert_eq!(record.goals_against, 2);
    }

    #[tokio::test]
    async fn replacing_a_counted_record_corrects_career_totals() {
        let f = fixture(memory_state()).await;
        let store = f.state.require_store().await.unwrap();
        let scorer = player(f.team, 9);
        store.insert_player(scorer.clone()).await.unwrap();
        let game = completed_win(&f).await;

        update_participation(&f.state, &f.coach, game.id, scored(scorer.id, 1))
            .await
            .unwrap();
        let game = update_participation(&f.state, &f.coach, game.id, scored(scorer.id, 3))
            .await
            .unwrap();
        assert_eq!(game.player_participation[0].goals, 3);

        let career = store.find_player(scorer.id).await.unwrap().unwrap().statistics;
        assert_eq!(career.goals, 3);
        assert_eq!(career.games_played, 1);
        assert_eq!(career.minutes_played, 90);
    }

    #[tokio::test]
    async fn counted_game_must_stay_completed() {
        let state = AppState::with_store(AppConfig::permissive(), memory_store());
        let f = fixture(state).await;
        let game = completed_win(&f).await;

        let err = update_game(&f.state, &f.coach, game.id, status(GameStatus::Scheduled))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(team_record(&f).await.wins, 1);
    }

    #[tokio::test]
    async fn deleting_a_counted_game_takes_back_its_statistics() {
        let f = fixture(memory_state()).await;
        let store = f.state.require_store().await.unwrap();
        let scorer = player(f.team, 9);
        store.insert_player(scorer.clone()).await.unwrap();
        let game = completed_win(&f).await;
        update_participation(&f.state, &f.coach, game.id, scored(scorer.id, 2))
            .await
            .unwrap();

        delete_game(&f.state, &f.coach, game.id).await.unwrap();

        assert_eq!(team_record(&f).await, TeamStatistics::default());
        let career = store.find_player(scorer.id).await.unwrap().unwrap().statistics;
        assert_eq!(career, PlayerStatistics::default());
        assert!(matches!(
            delete_game(&f.state, &f.coach, game.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_rejects_unknown_roster() {
        let f = fixture(memory_state()).await;
        let game = create_game(&f.state, &f.coach, request(f.team)).await.unwrap();

        let patch = UpdateGameRequest {
            roster: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(matches!(
            update_game(&f.state, &f.coach, game.id, patch).await,
            Err(ServiceError::NotFound(message)) if message == "Roster not found"
        ));
        assert_eq!(get_game(&f.state, game.id).await.unwrap().roster, None);
    }

    #[tokio::test]
    async fn game_recorded_as_completed_counts_once() {
        let f = fixture(memory_state()).await;
        let mut payload = request(f.team);
        payload.status = Some(GameStatus::Completed);
        payload.score = Some(Score { team: 2, opponent: 2 });

        let game = create_game(&f.state, &f.coach, payload).await.unwrap();
        assert_eq!(game.result, GameResult::Draw);
        assert!(game.statistics_applied);

        update_game(&f.state, &f.coach, game.id, status(GameStatus::Completed))
            .await
            .unwrap();
        let record = team_record(&f).await;
        assert_eq!(record.draws, 1);
        assert_eq!(record.goals_for, 2);
        assert_eq!(record.goals_against, 2);
    }

    #[tokio::test]
    async fn games_are_listed_by_date() {
        let f = fixture(memory_state()).await;
        let mut later = request(f.team);
        later.date = date!(2024 - 06 - 01);
        create_game(&f.state, &f.coach, later).await.unwrap();
        create_game(&f.state, &f.coach, request(f.team)).await.unwrap();

        let games = list_games(&f.state, GameQuery::default()).await.unwrap();
        assert_eq!(games[0].date, date!(2024 - 05 - 01));
        assert_eq!(games[1].date, date!(2024 - 06 - 01));
    }
}
