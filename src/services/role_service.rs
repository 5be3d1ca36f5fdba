// src/services/role_service.rs
//
// Cargos e suas linhas de permissão. Cargo e linha de permissões nascem e
// morrem juntos (1:1); a exclusão cascateia pelo banco.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        guard::{check_mutation_allowed, MutationKind},
    },
    db::{AccessRepository, BusinessRepository, DepartmentRepository},
    models::access::{
        CreateRolePayload, PermissionSet, Role, RoleResponse, UpdatePermissionsPayload,
        UpdateRolePayload,
    },
};

#[derive(Clone)]
pub struct RoleService {
    access_repo: AccessRepository,
    department_repo: DepartmentRepository,
    business_repo: BusinessRepository,
    pool: PgPool,
}

impl RoleService {
    pub fn new(
        access_repo: AccessRepository,
        department_repo: DepartmentRepository,
        business_repo: BusinessRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            access_repo,
            department_repo,
            business_repo,
            pool,
        }
    }

    /// Cria o cargo E a sua linha de permissões em uma transação só: um cargo
    /// sem linha de permissões seria invisível para o resolvedor.
    pub async fn create_role(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        payload: CreateRolePayload,
    ) -> Result<RoleResponse, AppError> {
        // O departamento (quando informado) precisa pertencer a ESTE negócio.
        if let Some(dept_id) = payload.department_id {
            self.department_repo
                .find_by_id(business_id, dept_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        let set = PermissionSet::from_keys(&payload.permissions);

        let mut tx = self.pool.begin().await?;
        let role = self
            .access_repo
            .create_role(
                &mut *tx,
                business_id,
                payload.department_id,
                &payload.name,
                payload.access,
                false,
                false,
            )
            .await?;
        let permissions = self
            .access_repo
            .create_permission_row(&mut *tx, role.id, &set)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "role_created");

        Ok(RoleResponse {
            role,
            permissions: PermissionSet::union_all([&permissions]),
        })
    }

    pub async fn list_roles(&self, business_id: Uuid) -> Result<Vec<Role>, AppError> {
        self.access_repo.list_roles(business_id).await
    }

    pub async fn get_role(
        &self,
        business_id: Uuid,
        role_id: Uuid,
    ) -> Result<RoleResponse, AppError> {
        let role = self
            .access_repo
            .find_role(business_id, role_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let permissions = match self.access_repo.permission_row_for_role(role.id).await? {
            Some(row) => PermissionSet::union_all([&row]),
            None => PermissionSet::empty(),
        };

        Ok(RoleResponse { role, permissions })
    }

    pub async fn update_role(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        role_id: Uuid,
        payload: UpdateRolePayload,
    ) -> Result<Role, AppError> {
        if let Some(dept_id) = payload.department_id {
            self.department_repo
                .find_by_id(business_id, dept_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        let mut tx = self.pool.begin().await?;

        let role = self
            .access_repo
            .find_role_for_update(&mut *tx, business_id, role_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&role, MutationKind::Edit)?;

        let updated = self
            .access_repo
            .update_role(
                &mut *tx,
                business_id,
                role_id,
                payload.department_id,
                &payload.name,
                payload.access,
            )
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "role_updated");
        Ok(updated)
    }

    /// Substitui a linha de permissões inteira. Cargo travado para edição
    /// também não tem as permissões alteradas.
    pub async fn update_permissions(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        role_id: Uuid,
        payload: UpdatePermissionsPayload,
    ) -> Result<RoleResponse, AppError> {
        let set = PermissionSet::from_keys(&payload.permissions);

        let mut tx = self.pool.begin().await?;

        let role = self
            .access_repo
            .find_role_for_update(&mut *tx, business_id, role_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&role, MutationKind::Edit)?;

        let row = self
            .access_repo
            .update_permission_row(&mut *tx, role_id, &set)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "role_permissions_updated");

        Ok(RoleResponse {
            role,
            permissions: PermissionSet::union_all([&row]),
        })
    }

    pub async fn delete_role(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let role = self
            .access_repo
            .find_role_for_update(&mut *tx, business_id, role_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&role, MutationKind::Delete)?;

        self.access_repo
            .delete_role(&mut *tx, business_id, role_id)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "role_deleted");
        Ok(())
    }

    /// Vincula um membro do negócio a um cargo do MESMO negócio.
    pub async fn assign_user(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        role_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        self.access_repo
            .find_role(business_id, role_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !self
            .business_repo
            .membership_exists(business_id, user_id)
            .await?
        {
            return Err(AppError::NotFound);
        }

        self.access_repo
            .assign_user_to_role(&self.pool, user_id, role_id)
            .await?;

        self.record_event(business_id, Some(actor_id), "user_assigned_to_role");
        Ok(())
    }

    pub async fn unassign_user(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        role_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        self.access_repo
            .find_role(business_id, role_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let removed = self
            .access_repo
            .remove_user_from_role(&self.pool, user_id, role_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }

        self.record_event(business_id, Some(actor_id), "user_unassigned_from_role");
        Ok(())
    }

    fn record_event(&self, business_id: Uuid, user_id: Option<Uuid>, name: &'static str) {
        let repo = self.business_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.record_event(business_id, user_id, name).await {
                tracing::warn!("Falha ao registrar evento '{}': {}", name, e);
            }
        });
    }
}
