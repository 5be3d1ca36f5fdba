// src/handlers/manuals.rs

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
        rbac::{PermAssignResources, PermManageResources, RequirePermission},
    },
    models::manual::{
        CreateManualPayload, CreatePolicyPayload, CreateSectionPayload, Manual,
        ManualAssignment, ManualSection, Policy, UpdateManualPayload,
    },
};

// POST /api/business/manuals
#[utoipa::path(
    post,
    path = "/api/business/manuals",
    tag = "Manuals",
    request_body = CreateManualPayload,
    responses(
        (status = 201, description = "Manual criado (não publicado)", body = Manual),
        (status = 403, description = "Sem permissão para gerenciar conteúdo")
    ),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn create_manual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Json(payload): Json<CreateManualPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let manual = app_state
        .manual_service
        .create_manual(business.0, user.id, &payload.title)
        .await?;

    Ok((StatusCode::CREATED, Json(manual)))
}

// GET /api/business/manuals
#[utoipa::path(
    get,
    path = "/api/business/manuals",
    tag = "Manuals",
    responses(
        (status = 200, description = "Manuais visíveis ao usuário (ADMIN/MANAGER veem tudo; USER só o que está atribuído e publicado)", body = Vec<Manual>)
    ),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn list_manuals(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
) -> Result<Json<Vec<Manual>>, AppError> {
    let manuals = app_state
        .manual_service
        .list_manuals(business.0, user.id)
        .await?;

    Ok(Json(manuals))
}

// GET /api/business/manuals/{id}
#[utoipa::path(
    get,
    path = "/api/business/manuals/{id}",
    tag = "Manuals",
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Manual", body = Manual),
        (status = 404, description = "Inexistente ou invisível para o usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_manual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(manual_id): Path<Uuid>,
) -> Result<Json<Manual>, AppError> {
    let manual = app_state
        .manual_service
        .get_manual(business.0, user.id, manual_id)
        .await?;

    Ok(Json(manual))
}

// PUT /api/business/manuals/{id}
#[utoipa::path(
    put,
    path = "/api/business/manuals/{id}",
    tag = "Manuals",
    request_body = UpdateManualPayload,
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Manual atualizado", body = Manual),
        (status = 405, description = "Manual travado contra edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_manual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(manual_id): Path<Uuid>,
    Json(payload): Json<UpdateManualPayload>,
) -> Result<Json<Manual>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let manual = app_state
        .manual_service
        .update_manual(
            business.0,
            user.id,
            manual_id,
            &payload.title,
            payload.published,
        )
        .await?;

    Ok(Json(manual))
}

// DELETE /api/business/manuals/{id}
#[utoipa::path(
    delete,
    path = "/api/business/manuals/{id}",
    tag = "Manuals",
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Manual removido"),
        (status = 405, description = "Manual travado contra exclusão")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_manual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(manual_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .manual_service
        .delete_manual(business.0, user.id, manual_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/business/manuals/{id}/sections
#[utoipa::path(
    post,
    path = "/api/business/manuals/{id}/sections",
    tag = "Manuals",
    request_body = CreateSectionPayload,
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses((status = 201, description = "Seção criada", body = ManualSection)),
    security(("api_jwt" = []))
)]
pub async fn create_section(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(manual_id): Path<Uuid>,
    Json(payload): Json<CreateSectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let section = app_state
        .manual_service
        .create_section(business.0, user.id, manual_id, &payload.title)
        .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

// GET /api/business/manuals/{id}/sections
#[utoipa::path(
    get,
    path = "/api/business/manuals/{id}/sections",
    tag = "Manuals",
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Seções visíveis ao usuário", body = Vec<ManualSection>),
        (status = 404, description = "Manual inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sections(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(manual_id): Path<Uuid>,
) -> Result<Json<Vec<ManualSection>>, AppError> {
    let sections = app_state
        .manual_service
        .list_sections(business.0, user.id, manual_id)
        .await?;

    Ok(Json(sections))
}

// POST /api/business/manual-sections/{id}/policies
#[utoipa::path(
    post,
    path = "/api/business/manual-sections/{id}/policies",
    tag = "Manuals",
    request_body = CreatePolicyPayload,
    params(
        ("id" = Uuid, Path, description = "ID da seção"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses((status = 201, description = "Política criada", body = Policy)),
    security(("api_jwt" = []))
)]
pub async fn create_policy(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<CreatePolicyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let policy = app_state
        .manual_service
        .create_policy(
            business.0,
            user.id,
            section_id,
            &payload.title,
            &payload.content,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(policy)))
}

// GET /api/business/manual-sections/{id}/policies
#[utoipa::path(
    get,
    path = "/api/business/manual-sections/{id}/policies",
    tag = "Manuals",
    params(
        ("id" = Uuid, Path, description = "ID da seção"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Políticas visíveis ao usuário", body = Vec<Policy>),
        (status = 404, description = "Seção inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_policies(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(section_id): Path<Uuid>,
) -> Result<Json<Vec<Policy>>, AppError> {
    let policies = app_state
        .manual_service
        .list_policies(business.0, user.id, section_id)
        .await?;

    Ok(Json(policies))
}

// POST /api/business/manuals/{id}/roles/{role_id}
#[utoipa::path(
    post,
    path = "/api/business/manuals/{id}/roles/{role_id}",
    tag = "Manuals",
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("role_id" = Uuid, Path, description = "ID do cargo"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Manual atribuído ao cargo"),
        (status = 403, description = "Sem permissão para atribuir conteúdo")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_manual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermAssignResources>,
    Path((manual_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .manual_service
        .assign_to_role(business.0, user.id, manual_id, role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/business/manuals/{id}/roles/{role_id}
#[utoipa::path(
    delete,
    path = "/api/business/manuals/{id}/roles/{role_id}",
    tag = "Manuals",
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("role_id" = Uuid, Path, description = "ID do cargo"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Atribuição removida"),
        (status = 404, description = "Atribuição não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn unassign_manual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermAssignResources>,
    Path((manual_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .manual_service
        .unassign_from_role(business.0, user.id, manual_id, role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/business/manuals/{id}/assignments
#[utoipa::path(
    get,
    path = "/api/business/manuals/{id}/assignments",
    tag = "Manuals",
    params(
        ("id" = Uuid, Path, description = "ID do manual"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses((status = 200, description = "Cargos com acesso ao manual", body = Vec<ManualAssignment>)),
    security(("api_jwt" = []))
)]
pub async fn list_assignments(
    State(app_state): State<AppState>,
    business: BusinessContext,
    _perm: RequirePermission<PermAssignResources>,
    Path(manual_id): Path<Uuid>,
) -> Result<Json<Vec<ManualAssignment>>, AppError> {
    let assignments = app_state
        .manual_service
        .list_assignments(business.0, manual_id)
        .await?;

    Ok(Json(assignments))
}
