//! Account registration, profile and principal resolution.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{Role, UserEntity},
    dto::users::{RegisterRequest, UpdateProfileRequest, UserResponse},
    error::ServiceError,
    services::access::{Principal, authorize},
    state::SharedState,
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Resolve the principal of a request from the id forwarded by the gateway.
pub async fn resolve_principal(state: &SharedState, id: Uuid) -> Result<Principal, ServiceError> {
    let store = state.require_store().await?;
    let user = store
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("Not authorized, user not found".into()))?;
    Ok(Principal {
        id: user.id,
        role: user.role,
    })
}

/// Create an account. The role defaults to viewer.
pub async fn register(
    state: &SharedState,
    payload: RegisterRequest,
) -> Result<UserResponse, ServiceError> {
    let store = state.require_store().await?;
    let now = SystemTime::now();
    let user = UserEntity {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_owned(),
        email: normalize_email(&payload.email),
        role: payload.role.unwrap_or_default(),
        phone: payload.phone,
        credential_hash: payload.credential_hash,
        teams: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    store.insert_user(user.clone()).await?;
    info!(user = %user.id, role = user.role.as_str(), "user registered");
    Ok(user.into())
}

/// Profile of the caller.
pub async fn current_user(
    state: &SharedState,
    principal: &Principal,
) -> Result<UserResponse, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_user(principal.id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))
}

/// Update the caller's own profile. Role and teams are not editable here.
pub async fn update_profile(
    state: &SharedState,
    principal: &Principal,
    payload: UpdateProfileRequest,
) -> Result<UserResponse, ServiceError> {
    let store = state.require_store().await?;
    let mut user = store
        .find_user(principal.id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

    if let Some(name) = payload.name {
        user.name = name.trim().to_owned();
    }
    if let Some(email) = payload.email {
        user.email = normalize_email(&email);
    }
    if payload.phone.is_some() {
        user.phone = payload.phone;
    }
    if payload.credential_hash.is_some() {
        user.credential_hash = payload.credential_hash;
    }
    user.updated_at = SystemTime::now();

    store.save_user(user.clone()).await?;
    Ok(user.into())
}

/// Every account, for administrators.
pub async fn list_users(
    state: &SharedState,
    principal: &Principal,
) -> Result<Vec<UserResponse>, ServiceError> {
    authorize(principal, &[Role::Admin])?;
    let store = state.require_store().await?;
    let users = store.list_users().await?;
    Ok(users.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{memory_state, principal};

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Jordan Lee".into(),
            email: email.into(),
            role: None,
            phone: None,
            credential_hash: Some("opaque-hash".into()),
        }
    }

    #[tokio::test]
    async fn registration_defaults_to_viewer_and_lowercases_email() {
        let state = memory_state();
        let user = register(&state, registration("Jordan@Example.com"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Viewer);
        assert_eq!(user.email, "jordan@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let state = memory_state();
        register(&state, registration("jordan@example.com"))
            .await
            .unwrap();

        let err = register(&state, registration("JORDAN@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_principal_is_unauthorized() {
        let state = memory_state();
        let err = resolve_principal(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn profile_update_keeps_role() {
        let state = memory_state();
        let coach = principal(&state, Role::Coach).await;

        let updated = update_profile(
            &state,
            &coach,
            UpdateProfileRequest {
                name: Some("Coach Carter".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Coach Carter");
        assert_eq!(updated.role, Role::Coach);
    }

    #[tokio::test]
    async fn only_admins_list_users() {
        let state = memory_state();
        let viewer = principal(&state, Role::Viewer).await;
        let admin = principal(&state, Role::Admin).await;

        assert!(matches!(
            list_users(&state, &viewer).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert_eq!(list_users(&state, &admin).await.unwrap().len(), 2);
    }
}
