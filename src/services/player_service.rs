//! Player management: team membership, jersey uniqueness and derived age.

use std::time::SystemTime;

use time::{Date, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        entity_store::EntityStore,
        models::{PlayerEntity, PlayerStatistics, age_on},
    },
    dto::players::{
        CreatePlayerRequest, PlayerQuery, PlayerResponse, PlayerStatisticsPatch,
        UpdatePlayerRequest,
    },
    error::ServiceError,
    services::{
        access::{MANAGERS, Principal, authorize},
        team_service::load_team,
    },
    state::SharedState,
};

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn player_not_found() -> ServiceError {
    ServiceError::NotFound("Player not found".into())
}

/// Load a player or fail with not found.
pub(crate) async fn load_player(
    store: &dyn EntityStore,
    id: Uuid,
) -> Result<PlayerEntity, ServiceError> {
    store.find_player(id).await?.ok_or_else(player_not_found)
}

/// Register a player in an existing team.
pub async fn create_player(
    state: &SharedState,
    principal: &Principal,
    payload: CreatePlayerRequest,
) -> Result<PlayerResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    load_team(store.as_ref(), payload.team).await?;

    let now = SystemTime::now();
    let player = PlayerEntity {
        id: Uuid::new_v4(),
        first_name: payload.first_name.trim().to_owned(),
        last_name: payload.last_name.trim().to_owned(),
        email: payload.email,
        phone: payload.phone,
        date_of_birth: payload.date_of_birth,
        age: age_on(payload.date_of_birth, today()),
        position: payload.position,
        jersey_number: payload.jersey_number,
        photo: payload.photo.unwrap_or_default(),
        team: payload.team,
        height: payload.height,
        weight: payload.weight,
        emergency_contact: payload.emergency_contact,
        status: payload.status.unwrap_or_default(),
        statistics: PlayerStatistics::default(),
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };

    store.insert_player(player.clone()).await?;
    info!(player = %player.id, team = %player.team, jersey = player.jersey_number, "player created");
    Ok(player.into())
}

/// Players matching the query.
pub async fn list_players(
    state: &SharedState,
    query: PlayerQuery,
) -> Result<Vec<PlayerResponse>, ServiceError> {
    let store = state.require_store().await?;
    let players = store.list_players(query.into()).await?;
    Ok(players.into_iter().map(Into::into).collect())
}

/// Load one player.
pub async fn get_player(state: &SharedState, id: Uuid) -> Result<PlayerResponse, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_player(store.as_ref(), id).await?.into())
}

/// Update a player. The jersey number stays unique within the team.
pub async fn update_player(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    payload: UpdatePlayerRequest,
) -> Result<PlayerResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    let mut player = load_player(store.as_ref(), id).await?;

    payload.apply(&mut player);
    player.refresh_age(today());
    player.updated_at = SystemTime::now();
    store.save_player(player).await?;

    Ok(load_player(store.as_ref(), id).await?.into())
}

/// Delete a player, freeing its jersey number.
pub async fn delete_player(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
) -> Result<(), ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    if !store.delete_player(id).await? {
        return Err(player_not_found());
    }
    info!(player = %id, "player deleted");
    Ok(())
}

/// Overwrite some counters of a player.
pub async fn set_player_statistics(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    patch: PlayerStatisticsPatch,
) -> Result<PlayerResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    let mut player = load_player(store.as_ref(), id).await?;

    player.statistics = patch.merge(player.statistics);
    if !store.set_player_statistics(id, player.statistics).await? {
        return Err(player_not_found());
    }
    info!(player = %id, "player statistics overridden");
    Ok(player.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::models::{PlayerFilter, PlayerStatus, Role},
        services::fixtures::{memory_state, principal, team},
    };
    use time::macros::date;

    fn request(team: Uuid, jersey_number: u32) -> CreatePlayerRequest {
        CreatePlayerRequest {
            first_name: "Alex".into(),
            last_name: "Morgan".into(),
            email: None,
            phone: None,
            date_of_birth: date!(2001 - 04 - 20),
            position: "Forward".into(),
            jersey_number,
            photo: None,
            team,
            height: None,
            weight: None,
            emergency_contact: None,
            status: None,
            notes: None,
        }
    }

    async fn seeded_team(state: &SharedState, coach: &Principal) -> Uuid {
        let team = team(coach.id);
        state
            .require_store()
            .await
            .unwrap()
            .insert_team(team.clone())
            .await
            .unwrap();
        team.id
    }

    #[tokio::test]
    async fn player_requires_an_existing_team() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;
        let err = create_player(&state, &coach, request(Uuid::new_v4(), 9))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(message) if message == "Team not found"));
    }

    #[tokio::test]
    async fn age_is_derived_from_birth_date() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;
        let team = seeded_team(&state, &coach).await;

        let player = create_player(&state, &coach, request(team, 9)).await.unwrap();
        assert_eq!(player.age, age_on(date!(2001 - 04 - 20), today()));
        assert_eq!(player.status, PlayerStatus::Active);
    }

    #[tokio::test]
    async fn jersey_numbers_stay_unique_across_create_and_update() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;
        let team = seeded_team(&state, &coach).await;

        create_player(&state, &coach, request(team, 9)).await.unwrap();
        let second = create_player(&state, &coach, request(team, 10)).await.unwrap();
        assert!(matches!(
            create_player(&state, &coach, request(team, 9)).await,
            Err(ServiceError::Conflict(_))
        ));

        let patch = UpdatePlayerRequest {
            jersey_number: Some(9),
            ..Default::default()
        };
        assert!(matches!(
            update_player(&state, &coach, second.id, patch).await,
            Err(ServiceError::Conflict(_))
        ));

        // Keeping its own number is not a conflict.
        let patch = UpdatePlayerRequest {
            jersey_number: Some(10),
            position: Some("Midfielder".into()),
            ..Default::default()
        };
        let updated = update_player(&state, &coach, second.id, patch).await.unwrap();
        assert_eq!(updated.position, "Midfielder");
    }

    #[tokio::test]
    async fn names_are_trimmed_on_update() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;
        let team = seeded_team(&state, &coach).await;
        let player = create_player(&state, &coach, request(team, 9)).await.unwrap();

        let patch = UpdatePlayerRequest {
            first_name: Some("  Jamie ".into()),
            last_name: Some(" Rivera  ".into()),
            ..Default::default()
        };
        let updated = update_player(&state, &coach, player.id, patch).await.unwrap();
        assert_eq!(updated.first_name, "Jamie");
        assert_eq!(updated.last_name, "Rivera");
    }

    #[tokio::test]
    async fn deleted_player_leaves_the_team() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;
        let team = seeded_team(&state, &coach).await;
        let player = create_player(&state, &coach, request(team, 9)).await.unwrap();

        delete_player(&state, &coach, player.id).await.unwrap();

        let store = state.require_store().await.unwrap();
        assert!(store.list_players(PlayerFilter::team(team)).await.unwrap().is_empty());
        assert!(matches!(
            delete_player(&state, &coach, player.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn viewers_cannot_edit_players() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;
        let viewer = principal(&state, Role::Viewer).await;
        let team = seeded_team(&state, &coach).await;
        let player = create_player(&state, &coach, request(team, 9)).await.unwrap();

        assert!(matches!(
            delete_player(&state, &viewer, player.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(get_player(&state, player.id).await.is_ok());
    }

    #[tokio::test]
    async fn statistics_override_is_not_additive() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;
        let team = seeded_team(&state, &coach).await;
        let player = create_player(&state, &coach, request(team, 9)).await.unwrap();

        let patch = || PlayerStatisticsPatch {
            goals: Some(5),
            ..Default::default()
        };
        set_player_statistics(&state, &coach, player.id, patch())
            .await
            .unwrap();
        let updated = set_player_statistics(&state, &coach, player.id, patch())
            .await
            .unwrap();
        assert_eq!(updated.statistics.goals, 5);
        assert_eq!(get_player(&state, player.id).await.unwrap().statistics.goals, 5);
    }
}
