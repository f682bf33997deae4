use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            CreateUserRequest, MessageResponse, ProfileView, SearchParams, UpdateUserRequest,
            UserView,
        },
        error::UserError,
        extractors::{JsonBody, UserKey},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:uuid",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me/:uuid", get(get_me).put(update_me).patch(update_me))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = services::list_users(state.users.as_ref(), params.search.as_deref()).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserKey(uuid): UserKey,
) -> Result<Json<Option<UserView>>, ApiError> {
    let user = match uuid {
        Some(uuid) => services::get_user(state.users.as_ref(), uuid).await?,
        None => None,
    };
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    UserKey(uuid): UserKey,
) -> Result<Json<Option<ProfileView>>, ApiError> {
    let profile = match uuid {
        Some(uuid) => services::get_profile(state.users.as_ref(), uuid).await?,
        None => None,
    };
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    services::create_user(state.users.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: "user created.",
        }),
    ))
}

async fn apply_update(
    state: &AppState,
    uuid: Option<Uuid>,
    payload: UpdateUserRequest,
) -> Result<Json<MessageResponse>, ApiError> {
    let uuid = uuid.ok_or(UserError::NotFound)?;
    services::update_user(state.users.as_ref(), uuid, payload)
        .await
        .map_err(|e| {
            ApiError::from_user_with(e, StatusCode::INTERNAL_SERVER_ERROR, "failed to update user.")
        })?;
    Ok(Json(MessageResponse {
        msg: "user updated.",
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    UserKey(uuid): UserKey,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    apply_update(&state, uuid, payload).await
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    UserKey(uuid): UserKey,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    apply_update(&state, uuid, payload).await
}

/// Backend failures answer 400 here, unlike the other write endpoints.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserKey(uuid): UserKey,
) -> Result<Json<MessageResponse>, ApiError> {
    let uuid = uuid.ok_or(UserError::NotFound)?;
    services::delete_user(state.users.as_ref(), uuid)
        .await
        .map_err(|e| ApiError::from_user_with(e, StatusCode::BAD_REQUEST, "failed to delete user."))?;
    Ok(Json(MessageResponse {
        msg: "user deleted.",
    }))
}
