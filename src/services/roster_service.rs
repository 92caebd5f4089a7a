//! Roster management. A roster never lists the same player twice.

use std::{collections::HashSet, time::SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        entity_store::EntityStore,
        models::{RosterEntity, RosterEntryEntity},
        storage::StorageError,
    },
    dto::rosters::{
        AddRosterPlayerRequest, CreateRosterRequest, RosterEntryDto, RosterQuery, RosterResponse,
        UpdateRosterRequest,
    },
    error::ServiceError,
    services::{
        access::{MANAGERS, Principal, authorize},
        player_service::load_player,
        team_service::load_team,
    },
    state::SharedState,
};

fn roster_not_found() -> ServiceError {
    ServiceError::NotFound("Roster not found".into())
}

async fn load_roster(store: &dyn EntityStore, id: Uuid) -> Result<RosterEntity, ServiceError> {
    store.find_roster(id).await?.ok_or_else(roster_not_found)
}

/// Reject duplicated or unknown players in a full roster listing.
async fn check_entries(
    store: &dyn EntityStore,
    entries: Vec<RosterEntryDto>,
) -> Result<Vec<RosterEntryEntity>, ServiceError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        if !seen.insert(entry.player) {
            return Err(StorageError::already_in_roster().into());
        }
        load_player(store, entry.player).await?;
    }
    Ok(entries.into_iter().map(Into::into).collect())
}

/// Create a roster. Listed players must exist and appear once.
pub async fn create_roster(
    state: &SharedState,
    principal: &Principal,
    payload: CreateRosterRequest,
) -> Result<RosterResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    load_team(store.as_ref(), payload.team).await?;
    let players = check_entries(store.as_ref(), payload.players).await?;

    let now = SystemTime::now();
    let roster = RosterEntity {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_owned(),
        team: payload.team,
        roster_type: payload.roster_type,
        players,
        game: payload.game,
        season: payload.season,
        notes: payload.notes,
        is_active: payload.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    store.insert_roster(roster.clone()).await?;
    info!(roster = %roster.id, team = %roster.team, "roster created");
    Ok(roster.into())
}

/// Rosters matching the query.
pub async fn list_rosters(
    state: &SharedState,
    query: RosterQuery,
) -> Result<Vec<RosterResponse>, ServiceError> {
    let store = state.require_store().await?;
    let rosters = store.list_rosters(query.into()).await?;
    Ok(rosters.into_iter().map(Into::into).collect())
}

/// Load one roster.
pub async fn get_roster(state: &SharedState, id: Uuid) -> Result<RosterResponse, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_roster(store.as_ref(), id).await?.into())
}

/// Update a roster. A `players` list is checked like a creation request.
pub async fn update_roster(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateRosterRequest,
) -> Result<RosterResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    let mut roster = load_roster(store.as_ref(), id).await?;

    if let Some(entries) = payload.players {
        roster.players = check_entries(store.as_ref(), entries).await?;
    }
    if let Some(name) = payload.name {
        roster.name = name.trim().to_owned();
    }
    if let Some(roster_type) = payload.roster_type {
        roster.roster_type = roster_type;
    }
    if payload.game.is_some() {
        roster.game = payload.game;
    }
    if let Some(season) = payload.season {
        roster.season = season;
    }
    if payload.notes.is_some() {
        roster.notes = payload.notes;
    }
    if let Some(is_active) = payload.is_active {
        roster.is_active = is_active;
    }
    roster.updated_at = SystemTime::now();

    store.save_roster(roster.clone()).await?;
    Ok(roster.into())
}

/// Delete a roster.
pub async fn delete_roster(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
) -> Result<(), ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    if !store.delete_roster(id).await? {
        return Err(roster_not_found());
    }
    info!(roster = %id, "roster deleted");
    Ok(())
}

/// Add one player to a roster.
pub async fn add_player(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    payload: AddRosterPlayerRequest,
) -> Result<RosterResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    load_roster(store.as_ref(), id).await?;
    load_player(store.as_ref(), payload.player_id).await?;

    let roster = store
        .push_roster_entry(id, payload.into())
        .await?
        .ok_or_else(roster_not_found)?;
    Ok(roster.into())
}

/// Remove a player from a roster. Removing an absent player succeeds.
pub async fn remove_player(
    state: &SharedState,
    principal: &Principal,
    id: Uuid,
    player: Uuid,
) -> Result<RosterResponse, ServiceError> {
    authorize(principal, MANAGERS)?;
    let store = state.require_store().await?;
    let roster = store
        .pull_roster_entry(id, player)
        .await?
        .ok_or_else(roster_not_found)?;
    Ok(roster.into())
}
