use axum::Router;

use crate::state::SharedState;

pub mod auth;
pub mod docs;
pub mod games;
pub mod health;
pub mod players;
pub mod rosters;
pub mod teams;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = auth::router(state.clone())
        .merge(teams::router(state.clone()))
        .merge(players::router(state.clone()))
        .merge(rosters::router(state.clone()))
        .merge(games::router(state.clone()));

    health::router()
        .merge(api_router)
        .merge(docs::router())
        .with_state(state)
}
