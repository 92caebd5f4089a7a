/// Role and ownership checks.
pub mod access;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game scheduling, status changes and participation.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Player management.
pub mod player_service;
/// Roster management.
pub mod roster_service;
/// Result derivation and exactly-once statistics propagation.
pub mod statistics;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
/// Team management and delete cascade.
pub mod team_service;
/// Registration, profiles and principal resolution.
pub mod user_service;

#[cfg(test)]
mod fixtures;
