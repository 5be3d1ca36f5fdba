// src/handlers/roles.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        business::BusinessContext,
        rbac::{PermAssignUsers, PermManageRoles, RequirePermission},
    },
    models::access::{
        CreateRolePayload, Role, RoleResponse, UpdatePermissionsPayload, UpdateRolePayload,
    },
};

// POST /api/business/roles
#[utoipa::path(
    post,
    path = "/api/business/roles",
    tag = "Roles",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado com sua linha de permissões", body = RoleResponse),
        (status = 403, description = "Sem permissão para gerenciar cargos")
    ),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageRoles>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let response = app_state
        .role_service
        .create_role(business.0, user.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/business/roles
#[utoipa::path(
    get,
    path = "/api/business/roles",
    tag = "Roles",
    responses((status = 200, description = "Cargos do negócio", body = Vec<Role>)),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    business: BusinessContext,
) -> Result<Json<Vec<Role>>, AppError> {
    let roles = app_state.role_service.list_roles(business.0).await?;
    Ok(Json(roles))
}

// GET /api/business/roles/{id}
#[utoipa::path(
    get,
    path = "/api/business/roles/{id}",
    tag = "Roles",
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Cargo + permissões", body = RoleResponse),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_role(
    State(app_state): State<AppState>,
    business: BusinessContext,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleResponse>, AppError> {
    let response = app_state.role_service.get_role(business.0, role_id).await?;
    Ok(Json(response))
}

// PUT /api/business/roles/{id}
#[utoipa::path(
    put,
    path = "/api/business/roles/{id}",
    tag = "Roles",
    request_body = UpdateRolePayload,
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Cargo atualizado", body = Role),
        (status = 405, description = "Cargo travado contra edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageRoles>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<Json<Role>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let role = app_state
        .role_service
        .update_role(business.0, user.id, role_id, payload)
        .await?;

    Ok(Json(role))
}

// PUT /api/business/roles/{id}/permissions
#[utoipa::path(
    put,
    path = "/api/business/roles/{id}/permissions",
    tag = "Roles",
    request_body = UpdatePermissionsPayload,
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Linha de permissões substituída", body = RoleResponse),
        (status = 405, description = "Cargo travado contra edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_permissions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageRoles>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionsPayload>,
) -> Result<Json<RoleResponse>, AppError> {
    let response = app_state
        .role_service
        .update_permissions(business.0, user.id, role_id, payload)
        .await?;

    Ok(Json(response))
}

// DELETE /api/business/roles/{id}
#[utoipa::path(
    delete,
    path = "/api/business/roles/{id}",
    tag = "Roles",
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Cargo removido (permissões e vínculos em cascata)"),
        (status = 405, description = "Cargo travado contra exclusão")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageRoles>,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .role_service
        .delete_role(business.0, user.id, role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/business/roles/{id}/users/{user_id}
#[utoipa::path(
    post,
    path = "/api/business/roles/{id}/users/{user_id}",
    tag = "Roles",
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Usuário vinculado ao cargo"),
        (status = 403, description = "Sem permissão para atribuir usuários")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermAssignUsers>,
    Path((role_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .role_service
        .assign_user(business.0, actor.id, role_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/business/roles/{id}/users/{user_id}
#[utoipa::path(
    delete,
    path = "/api/business/roles/{id}/users/{user_id}",
    tag = "Roles",
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Vínculo removido"),
        (status = 404, description = "Vínculo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn unassign_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermAssignUsers>,
    Path((role_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .role_service
        .unassign_user(business.0, actor.id, role_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
