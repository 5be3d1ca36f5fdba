// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::business::BusinessContext,
    models::{access::PermissionKey, auth::User},
};

/// 1. O Trait que define o que uma rota exige.
/// Mais de uma chave = "basta QUALQUER uma" (a variante global OU a de
/// departamento liberam a mesma rota).
pub trait PermissionDef: Send + Sync + 'static {
    fn required() -> &'static [PermissionKey];
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Usuário autenticado (injetado pelo auth_guard)
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::InvalidToken)?;

        // B. Contexto do negócio (injetado pelo business_guard)
        let business = parts
            .extensions
            .get::<BusinessContext>()
            .copied()
            .ok_or(AppError::NotFound)?;

        // C. Verifica no banco: união das permissões de todos os cargos.
        let allowed = app_state
            .access_service
            .has_any_permission(business.0, user.id, T::required())
            .await;

        if !allowed {
            return Err(AppError::Forbidden);
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermManageUsers;
impl PermissionDef for PermManageUsers {
    fn required() -> &'static [PermissionKey] {
        &[PermissionKey::GlobalCrudUsers]
    }
}

pub struct PermManageDepartments;
impl PermissionDef for PermManageDepartments {
    fn required() -> &'static [PermissionKey] {
        &[PermissionKey::GlobalCrudDepartment]
    }
}

pub struct PermManageRoles;
impl PermissionDef for PermManageRoles {
    fn required() -> &'static [PermissionKey] {
        &[PermissionKey::GlobalCrudRole, PermissionKey::DeptCrudRole]
    }
}

pub struct PermManageResources;
impl PermissionDef for PermManageResources {
    fn required() -> &'static [PermissionKey] {
        &[
            PermissionKey::GlobalCrudResources,
            PermissionKey::DeptCrudResources,
        ]
    }
}

pub struct PermAssignUsers;
impl PermissionDef for PermAssignUsers {
    fn required() -> &'static [PermissionKey] {
        &[
            PermissionKey::GlobalAssignUsersToRole,
            PermissionKey::DeptAssignUsersToRole,
        ]
    }
}

pub struct PermAssignResources;
impl PermissionDef for PermAssignResources {
    fn required() -> &'static [PermissionKey] {
        &[
            PermissionKey::GlobalAssignResourcesToRole,
            PermissionKey::DeptAssignResourcesToRole,
        ]
    }
}

pub struct PermViewReports;
impl PermissionDef for PermViewReports {
    fn required() -> &'static [PermissionKey] {
        &[
            PermissionKey::GlobalViewReports,
            PermissionKey::DeptViewReports,
        ]
    }
}
