//! Entity builders shared by the service tests.

use std::{sync::Arc, time::SystemTime};

use time::macros::date;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        entity_store::{EntityStore, memory::MemoryStore},
        models::{
            GameEntity, GameResult, GameStatus, PlayerEntity, PlayerStatistics, PlayerStatus,
            Role, Score, SportType, TeamEntity, TeamStatistics, UserEntity,
        },
    },
    services::access::Principal,
    state::{AppState, SharedState},
};

pub fn memory_store() -> Arc<dyn EntityStore> {
    Arc::new(MemoryStore::new())
}

pub fn memory_state() -> SharedState {
    AppState::with_store(AppConfig::default(), memory_store())
}

pub fn user(role: Role) -> UserEntity {
    let id = Uuid::new_v4();
    UserEntity {
        id,
        name: "Sam Carter".into(),
        email: format!("{id}@example.com"),
        role,
        phone: None,
        credential_hash: None,
        teams: Vec::new(),
        created_at: SystemTime::now(),
        updated_at: SystemTime::now(),
    }
}

/// Insert a user with `role` and return the matching principal.
pub async fn principal(state: &SharedState, role: Role) -> Principal {
    let user = user(role);
    let principal = Principal { id: user.id, role };
    state
        .store()
        .await
        .expect("store installed")
        .insert_user(user)
        .await
        .expect("insert user");
    principal
}

pub fn team(coach: Uuid) -> TeamEntity {
    TeamEntity {
        id: Uuid::new_v4(),
        name: "Harbor City FC".into(),
        sport_type: SportType::Soccer,
        season: "2024".into(),
        division: None,
        logo: String::new(),
        description: None,
        coach,
        staff: Vec::new(),
        statistics: TeamStatistics::default(),
        is_active: true,
        created_at: SystemTime::now(),
        updated_at: SystemTime::now(),
    }
}

pub fn player(team: Uuid, jersey_number: u32) -> PlayerEntity {
    PlayerEntity {
        id: Uuid::new_v4(),
        first_name: "Alex".into(),
        last_name: "Morgan".into(),
        email: None,
        phone: None,
        date_of_birth: date!(2001 - 04 - 20),
        age: 23,
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

pub fn game(team: Uuid) -> GameEntity {
    GameEntity {
        id: Uuid::new_v4(),
        team,
        opponent: "Rovers".into(),
        date: date!(2024 - 05 - 01),
        time: "18:00".into(),
        location: "Main Stadium".into(),
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
    }
}
