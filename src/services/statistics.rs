//! Derived statistics: game result from score, team and player deltas.
//!
//! Deltas are applied at most once per game and once per participation record.
//! The store flips the matching `statistics_applied` flag first and the counters
//! are only incremented by the caller that performed the flip, with the values
//! the flip observed. Later edits of a counted game or record are folded in as
//! corrections: the previously stored values are taken back and the new ones added.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::{
        entity_store::EntityStore,
        models::{
            GameEntity, GameResult, GameStatus, ParticipationEntity, PlayerStatistics, Score,
            TeamStatistics,
        },
    },
    error::ServiceError,
};

/// Outcome of a game seen from the owning team.
pub fn derive_result(score: Score) -> GameResult {
    use std::cmp::Ordering;

    match score.team.cmp(&score.opponent) {
        Ordering::Greater => GameResult::Win,
        Ordering::Less => GameResult::Loss,
        Ordering::Equal => GameResult::Draw,
    }
}

/// Counters a finished game adds to its team. `None` while the result is pending.
pub fn team_delta(score: Score, result: GameResult) -> Option<TeamStatistics> {
    let mut delta = TeamStatistics {
        goals_for: score.team,
        goals_against: score.opponent,
        ..Default::default()
    };
    match result {
        GameResult::Win => delta.wins = 1,
        GameResult::Loss => delta.losses = 1,
        GameResult::Draw => delta.draws = 1,
        GameResult::Pending => return None,
    }
    Some(delta)
}

/// What `game` currently contributes to its team record.
fn team_contribution(game: &GameEntity) -> Option<TeamStatistics> {
    if game.status != GameStatus::Completed {
        return None;
    }
    team_delta(game.score, game.result)
}

/// Counters one participation record adds to its player.
pub fn player_delta(record: &ParticipationEntity) -> PlayerStatistics {
    PlayerStatistics {
        games_played: 1,
        goals: record.goals,
        assists: record.assists,
        yellow_cards: record.yellow_cards,
        red_cards: record.red_cards,
        minutes_played: record.minutes_played.unwrap_or_default(),
    }
}

/// Add the result of a completed game to its team, once.
///
/// Returns `true` when this call applied the delta.
pub async fn apply_game_statistics(
    store: &dyn EntityStore,
    game: &GameEntity,
) -> Result<bool, ServiceError> {
    if game.statistics_applied || team_contribution(game).is_none() {
        return Ok(false);
    }

    let Some(claimed) = store.claim_game_statistics(game.id).await? else {
        debug!(game = %game.id, "team statistics already applied");
        return Ok(false);
    };
    let Some(delta) = team_contribution(&claimed) else {
        return Ok(false);
    };

    if !store.increment_team_statistics(claimed.team, delta).await? {
        warn!(game = %game.id, team = %claimed.team, "team vanished before statistics were applied");
        return Ok(false);
    }

    debug!(game = %game.id, team = %claimed.team, result = ?claimed.result, "team statistics applied");
    Ok(true)
}

/// Fold an edit of an already counted game into its team record.
///
/// `previous` is the game as stored right before the edit, `current` what was written.
/// Returns `true` when the team record changed.
pub async fn correct_game_statistics(
    store: &dyn EntityStore,
    previous: &GameEntity,
    current: &GameEntity,
) -> Result<bool, ServiceError> {
    if !previous.statistics_applied {
        return Ok(false);
    }
    let counted = team_contribution(previous);
    let updated = team_contribution(current);
    if counted == updated {
        return Ok(false);
    }

    if let Some(counted) = counted {
        store.retract_team_statistics(previous.team, counted).await?;
    }
    if let Some(updated) = updated {
        store.increment_team_statistics(current.team, updated).await?;
    }
    debug!(game = %current.id, team = %current.team, result = ?current.result, "team statistics corrected");
    Ok(true)
}

/// Add every pending participation record of a completed game to its player, once.
///
/// Returns the number of records applied by this call.
pub async fn apply_participation_statistics(
    store: &dyn EntityStore,
    game: &GameEntity,
) -> Result<usize, ServiceError> {
    if game.status != GameStatus::Completed {
        return Ok(0);
    }

    let mut applied = 0;
    for record in game
        .player_participation
        .iter()
        .filter(|record| !record.statistics_applied)
    {
        let Some(claimed) = store
            .claim_participation_statistics(game.id, record.player)
            .await?
        else {
            continue;
        };

        if store
            .increment_player_statistics(claimed.player, player_delta(&claimed))
            .await?
        {
            applied += 1;
        } else {
            warn!(game = %game.id, player = %claimed.player, "player vanished before statistics were applied");
        }
    }

    if applied > 0 {
        debug!(game = %game.id, applied, "player statistics applied");
    }
    Ok(applied)
}

/// Fold the replacement of an already counted participation record into the
/// player's totals. Returns `true` when the totals changed.
pub async fn correct_participation_statistics(
    store: &dyn EntityStore,
    game: Uuid,
    replaced: &ParticipationEntity,
    current: &ParticipationEntity,
) -> Result<bool, ServiceError> {
    if !replaced.statistics_applied {
        return Ok(false);
    }
    let counted = player_delta(replaced);
    let updated = player_delta(current);
    if counted == updated {
        return Ok(false);
    }

    store
        .retract_player_statistics(replaced.player, counted)
        .await?;
    store
        .increment_player_statistics(current.player, updated)
        .await?;
    debug!(%game, player = %current.player, "player statistics corrected");
    Ok(true)
}

/// Take back everything a removed game had added to its team and players.
pub async fn retract_game_statistics(
    store: &dyn EntityStore,
    game: &GameEntity,
) -> Result<(), ServiceError> {
    if game.statistics_applied {
        if let Some(counted) = team_contribution(game) {
            store.retract_team_statistics(game.team, counted).await?;
        }
    }
    for record in game
        .player_participation
        .iter()
        .filter(|record| record.statistics_applied)
    {
        store
            .retract_player_statistics(record.player, player_delta(record))
            .await?;
    }
    Ok(())
}
