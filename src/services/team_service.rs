//! Team management: ownership checks, derived membership and the delete cascade.

use std::{collections::HashMap, sync::Arc, time::SystemTime};

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    dao::{
        entity_store::EntityStore,
        models::{PlayerEntity, PlayerFilter, Role, TeamEntity, TeamFilter, TeamStatistics},
    },
    dto::teams::{
        CreateTeamRequest, TeamResponse, TeamStatisticsPatch, TeamStatisticsSummary,
        UpdateTeamRequest,
    },
    error::ServiceError,
    services::access::{MANAGERS, Principal, authorize, authorize_owner},
    state::SharedState,
};

fn team_not_found() -> ServiceError {
    ServiceError::NotFound("Team not found".into())
}

/// Load a team or fail with not found.
pub(crate) async fn load_team(
    store: &dyn EntityStore,
    id: Uuid,
) -> Result<TeamEntity, ServiceError> {
    store.find_team(id).await?.ok_or_else(team_not_found)
}

async fn members(store: &dyn EntityStore, team: Uuid) -> Result<Vec<PlayerEntity>, ServiceError> {
    Ok(store.list_players(PlayerFilter::team(team)).await?)
}

/// Create a team coached by the caller.
pub async fn create_team(
    state: &SharedState,
    principal: &Principal,
    payload: CreateTeamRequest,
) -> Result<TeamResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;

    let now = SystemTime::now();
    let team = TeamEntity {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_owned(),
        sport_type: payload.sport_type,
        season: payload.season,
        division: payload.division,
        logo: payload.logo.unwrap_or_default(),
        description: payload.description,
        coach: principal.id,
        staff: payload.staff.into_iter().map(Into::into).collect(),
        statistics: TeamStatistics::default(),
        is_active: payload.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    store.insert_team(team.clone()).await?;
    store.link_user_team(principal.id, team.id).await?;
    info!(team = %team.id, coach = %principal.id, "team created");

    Ok(TeamResponse::new(team, Vec::new()))
}

/// Teams visible to the caller. Coaches only see the teams they own.
pub async fn list_teams(
    state: &SharedState,
    principal: &Principal,
) -> Result<Vec<TeamResponse>, ServiceError> {
    let store = state.require_store().await?;
    let filter = TeamFilter {
        coach: (principal.role == Role::Coach).then_some(principal.id),
    };
    let teams = store.list_teams(filter).await?;

    let mut by_team: HashMap<Uuid, Vec<PlayerEntity>> = HashMap::new();
    for player in store.list_players(PlayerFilter::default()).await? {
        by_team.entry(player.team).or_default().push(player);
    }

    Ok(teams
        .into_iter()
        .map(|team| {
            let players = by_team.remove(&team.id).unwrap_or_default();
            TeamResponse::new(team, players)
        })
        .collect())
}

/// Team with its players.
pub async fn get_team(state: &SharedState, id: Uuid) -> Result<TeamResponse, ServiceError> {
    let store = state.require_store().await?;
    let team = load_team(store.as_ref(), id).await?;
    let players = members(store.as_ref(), id).await?;
    Ok(TeamResponse::new(team, players))
}

/// Update the descriptive fields of a team owned by the caller.
pub async fn update_team(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateTeamRequest,
) -> Result<TeamResponse, ServiceError> {
    let store = state.require_store().await?;
    let mut team = load_team(store.as_ref(), id).await?;
    authorize_owner(principal, team.coach, "update this team")?;

    payload.apply(&mut team);
    team.updated_at = SystemTime::now();
    store.save_team(team).await?;

    // Reload so the response carries the stored counters.
    let team = load_team(store.as_ref(), id).await?;
    let players = members(store.as_ref(), id).await?;
    Ok(TeamResponse::new(team, players))
}

/// Delete a team, its players and the link held by its coach.
pub async fn delete_team(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let team = load_team(store.as_ref(), id).await?;
    authorize_owner(principal, team.coach, "delete this team")?;

    cascade_delete(store, &team).await.map_err(|err| {
        error!(team = %id, error = %err, "team delete stopped partway");
        match err {
            ServiceError::Unavailable(source) => {
                ServiceError::Internal(format!("failed to delete team {id}: {source}"))
            }
            other => other,
        }
    })?;

    info!(team = %id, "team deleted");
    Ok(())
}

async fn cascade_delete(store: Arc<dyn EntityStore>, team: &TeamEntity) -> Result<(), ServiceError> {
    let removed = store.delete_players_by_team(team.id).await?;
    info!(team = %team.id, removed, "team players deleted");
    store.unlink_user_team(team.coach, team.id).await?;
    if !store.delete_team(team.id).await? {
        return Err(team_not_found());
    }
    Ok(())
}

/// Squad availability and win/loss record.
pub async fn team_statistics(
    state: &SharedState,
    id: Uuid,
) -> Result<TeamStatisticsSummary, ServiceError> {
    let store = state.require_store().await?;
    let team = load_team(store.as_ref(), id).await?;
    let players = members(store.as_ref(), id).await?;
    Ok(TeamStatisticsSummary::new(team.statistics, &players))
}

/// Overwrite some counters of a team owned by the caller.
pub async fn set_team_statistics(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    patch: TeamStatisticsPatch,
) -> Result<TeamStatistics, ServiceError> {
    let store = state.require_store().await?;
    let team = load_team(store.as_ref(), id).await?;
    authorize_owner(principal, team.coach, "update this team")?;

    let statistics = patch.merge(team.statistics);
    if !store.set_team_statistics(id, statistics).await? {
        return Err(team_not_found());
    }
    info!(team = %id, "team statistics overridden");
    Ok(statistics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::models::{PlayerStatus, SportType},
        services::fixtures::{memory_state, player, principal},
    };

    fn request(name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.into(),
            sport_type: SportType::Soccer,
            season: "2024".into(),
            division: None,
            logo: None,
            description: None,
            staff: Vec::new(),
            is_active: None,
        }
    }

    #[tokio::test]
    async fn creating_a_team_links_it_to_the_coach() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;

        let team = create_team(&state, &coach, request("Harbor City FC"))
            .await
            .unwrap();
        assert_eq!(team.coach, coach.id);

        let store = state.require_store().await.unwrap();
        let user = store.find_user(coach.id).await.unwrap().unwrap();
        assert_eq!(user.teams, vec![team.id]);
    }

    #[tokio::test]
    async fn viewers_cannot_create_teams() {
        let state = memory_state();
        let viewer = principal(&state, Role::Viewer).await;
        let err = create_team(&state, &viewer, request("Rovers"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn coaches_only_list_their_teams() {
        let state = memory_state();
        let first = principal(&state, Role::Coach).await;
        let second = principal(&state, Role::Coach).await;
        let admin = principal(&state, Role::Admin).await;
        create_team(&state, &first, request("A")).await.unwrap();
        create_team(&state, &second, request("B")).await.unwrap();

        let own = list_teams(&state, &first).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].name, "A");
        assert_eq!(list_teams(&state, &admin).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn non_owner_cannot_update_or_delete() {
        let state = memory_state();
        let owner = principal(&state, Role::Coach).await;
        let other = principal(&state, Role::Coach).await;
        let team = create_team(&state, &owner, request("Harbor City FC"))
            .await
            .unwrap();

        let patch = UpdateTeamRequest {
            name: Some("Hijacked".into()),
            ..Default::default()
        };
        assert!(matches!(
            update_team(&state, &other, team.id, patch).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            delete_team(&state, &other, team.id).await,
            Err(ServiceError::Forbidden(_))
        ));

        let stored = get_team(&state, team.id).await.unwrap();
        assert_eq!(stored.name, "Harbor City FC");
    }

    #[tokio::test]
    async fn update_does_not_touch_statistics() {
        let state = memory_state();
        let owner = principal(&state, Role::Coach).await;
        let team = create_team(&state, &owner, request("Harbor City FC"))
            .await
            .unwrap();
        let store = state.require_store().await.unwrap();
        store
            .increment_team_statistics(
                team.id,
                TeamStatistics {
                    wins: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = update_team(
            &state,
            &owner,
            team.id,
            UpdateTeamRequest {
                division: Some("North".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.division.as_deref(), Some("North"));
        assert_eq!(updated.statistics.wins, 1);
    }

    #[tokio::test]
    async fn delete_removes_players_and_coach_link() {
        let state = memory_state();
        let owner = principal(&state, Role::Coach).await;
        let team = create_team(&state, &owner, request("Harbor City FC"))
            .await
            .unwrap();
        let store = state.require_store().await.unwrap();
        let keeper = player(team.id, 1);
        store.insert_player(keeper.clone()).await.unwrap();

        delete_team(&state, &owner, team.id).await.unwrap();

        assert!(store.find_player(keeper.id).await.unwrap().is_none());
        assert!(matches!(
            get_team(&state, team.id).await,
            Err(ServiceError::NotFound(_))
        ));
        let user = store.find_user(owner.id).await.unwrap().unwrap();
        assert!(user.teams.is_empty());
    }

    #[tokio::test]
    async fn statistics_summary_counts_players_by_status() {
        let state = memory_state();
        let owner = principal(&state, Role::Coach).await;
        let team = create_team(&state, &owner, request("Harbor City FC"))
            .await
            .unwrap();
        let store = state.require_store().await.unwrap();
        store.insert_player(player(team.id, 1)).await.unwrap();
        let mut injured = player(team.id, 2);
        injured.status = PlayerStatus::Injured;
        store.insert_player(injured).await.unwrap();

        let summary = team_statistics(&state, team.id).await.unwrap();
        assert_eq!(summary.total_players, 2);
        assert_eq!(summary.active_players, 1);
        assert_eq!(summary.injured_players, 1);
        assert_eq!(summary.suspended_players, 0);
    }

    #[tokio::test]
    async fn statistics_override_merges_fields() {
        let state = memory_state();
        let owner = principal(&state, Role::Coach).await;
        let team = create_team(&state, &owner, request("Harbor City FC"))
            .await
            .unwrap();

        let statistics = set_team_statistics(
            &state,
            &owner,
            team.id,
            TeamStatisticsPatch {
                wins: Some(7),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(statistics.wins, 7);
        assert_eq!(statistics.losses, 0);

        let summary = team_statistics(&state, team.id).await.unwrap();
        assert_eq!(summary.team_record.wins, 7);
    }
}
