// src/handlers/businesses.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        business::BusinessContext,
        rbac::{PermManageUsers, PermViewReports, RequirePermission},
    },
    models::business::{AddMemberPayload, Business, Event, Member},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetDefaultBusinessPayload {
    pub business_id: Uuid,
}

// GET /api/users/me/businesses
#[utoipa::path(
    get,
    path = "/api/users/me/businesses",
    tag = "Users",
    responses((status = 200, description = "Negócios dos quais o usuário é membro", body = Vec<Business>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_businesses(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Business>>, AppError> {
    let businesses = app_state
        .business_service
        .list_businesses_for_user(user.id)
        .await?;

    Ok(Json(businesses))
}

// PUT /api/users/me/default-business
#[utoipa::path(
    put,
    path = "/api/users/me/default-business",
    tag = "Users",
    request_body = SetDefaultBusinessPayload,
    responses(
        (status = 204, description = "Negócio padrão atualizado"),
        (status = 404, description = "O usuário não é membro desse negócio")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_default_business(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SetDefaultBusinessPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .business_service
        .set_default_business(payload.business_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/business/members
#[utoipa::path(
    get,
    path = "/api/business/members",
    tag = "Business",
    responses((status = 200, description = "Membros do negócio", body = Vec<Member>)),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    business: BusinessContext,
) -> Result<Json<Vec<Member>>, AppError> {
    let members = app_state.business_service.list_members(business.0).await?;
    Ok(Json(members))
}

// POST /api/business/members
#[utoipa::path(
    post,
    path = "/api/business/members",
    tag = "Business",
    request_body = AddMemberPayload,
    responses(
        (status = 201, description = "Membro adicionado", body = Member),
        (status = 403, description = "Sem permissão para gerenciar usuários"),
        (status = 404, description = "Usuário não cadastrado")
    ),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageUsers>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let member = app_state
        .business_service
        .add_member(business.0, user.id, &payload.email)
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

// DELETE /api/business/members/{user_id}
#[utoipa::path(
    delete,
    path = "/api/business/members/{user_id}",
    tag = "Business",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário a remover"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Membro removido"),
        (status = 403, description = "Sem permissão para gerenciar usuários, ou tentativa de remover o último membro")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageUsers>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .business_service
        .remove_member(business.0, user.id, member_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/business/events
#[utoipa::path(
    get,
    path = "/api/business/events",
    tag = "Business",
    responses(
        (status = 200, description = "Trilha de auditoria do negócio", body = Vec<Event>),
        (status = 403, description = "Sem permissão para ver relatórios")
    ),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    business: BusinessContext,
    _perm: RequirePermission<PermViewReports>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = app_state.business_service.list_events(business.0).await?;
    Ok(Json(events))
}
