// src/handlers/departments.rs

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
        rbac::{PermManageDepartments, RequirePermission},
    },
    models::business::{CreateDepartmentPayload, Department, UpdateDepartmentPayload},
};

// POST /api/business/departments
#[utoipa::path(
    post,
    path = "/api/business/departments",
    tag = "Departments",
    request_body = CreateDepartmentPayload,
    responses(
        (status = 201, description = "Departamento criado", body = Department),
        (status = 403, description = "Sem permissão para gerenciar departamentos"),
        (status = 409, description = "Nome duplicado no negócio")
    ),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageDepartments>,
    Json(payload): Json<CreateDepartmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let dept = app_state
        .business_service
        .create_department(business.0, user.id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(dept)))
}

// GET /api/business/departments
#[utoipa::path(
    get,
    path = "/api/business/departments",
    tag = "Departments",
    responses((status = 200, description = "Departamentos do negócio", body = Vec<Department>)),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn list_departments(
    State(app_state): State<AppState>,
    business: BusinessContext,
) -> Result<Json<Vec<Department>>, AppError> {
    let depts = app_state
        .business_service
        .list_departments(business.0)
        .await?;

    Ok(Json(depts))
}

// GET /api/business/departments/{id}
#[utoipa::path(
    get,
    path = "/api/business/departments/{id}",
    tag = "Departments",
    params(
        ("id" = Uuid, Path, description = "ID do departamento"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Departamento", body = Department),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_department(
    State(app_state): State<AppState>,
    business: BusinessContext,
    Path(department_id): Path<Uuid>,
) -> Result<Json<Department>, AppError> {
    let dept = app_state
        .business_service
        .get_department(business.0, department_id)
        .await?;

    Ok(Json(dept))
}

// PUT /api/business/departments/{id}
#[utoipa::path(
    put,
    path = "/api/business/departments/{id}",
    tag = "Departments",
    request_body = UpdateDepartmentPayload,
    params(
        ("id" = Uuid, Path, description = "ID do departamento"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Departamento atualizado", body = Department),
        (status = 405, description = "Departamento travado contra edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_department(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageDepartments>,
    Path(department_id): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentPayload>,
) -> Result<Json<Department>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let dept = app_state
        .business_service
        .update_department(business.0, user.id, department_id, &payload.name)
        .await?;

    Ok(Json(dept))
}

// DELETE /api/business/departments/{id}
#[utoipa::path(
    delete,
    path = "/api/business/departments/{id}",
    tag = "Departments",
    params(
        ("id" = Uuid, Path, description = "ID do departamento"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Departamento removido"),
        (status = 405, description = "Departamento travado contra exclusão")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_department(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageDepartments>,
    Path(department_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .business_service
        .delete_department(business.0, user.id, department_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
