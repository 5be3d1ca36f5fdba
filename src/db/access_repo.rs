// src/db/access_repo.rs
//
// Consultas do Classificador de Acesso e do Resolvedor de Permissões.
// Cada consulta de resolução é uma função tipada com o grafo de joins
// documentado: nada de SQL ad-hoc espalhado pelas rotas.

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::access::{AccessLevel, Permission, PermissionSet, Role},
};

#[derive(Clone)]
pub struct AccessRepository {
    pool: PgPool,
}

impl AccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cargos que o usuário ocupa dentro de um negócio.
    ///
    /// Grafo: roles r ⋈ user_roles ur (ur.role_id = r.id)
    /// Filtros: ur.user_id = $1, r.business_id = $2
    /// (r.business_id cobre tanto cargos de departamento quanto cargos de
    /// escopo do negócio inteiro, onde department_id é NULL).
    ///
    /// Sem cache: cada chamada relê o estado atual, garantindo que edições
    /// de cargo concorrentes apareçam na classificação seguinte.
    pub async fn roles_for_user(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.*
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1 AND r.business_id = $2
            "#,
        )
        .bind(user_id)
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// Linhas de permissão de TODOS os cargos do usuário no negócio.
    ///
    /// Grafo: permissions p ⋈ roles r (p.role_id = r.id)
    ///        ⋈ user_roles ur (ur.role_id = r.id)
    ///        ⋈ memberships m (m.user_id = ur.user_id)
    /// Filtros: ur.user_id = $1, m.business_id = $2, r.business_id = $2
    ///
    /// A união lógica (OR) das linhas é feita pelo chamador via
    /// PermissionSet::union_all — permissões são aditivas entre cargos.
    pub async fn permissions_for_user(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Permission>, AppError> {
        let rows = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.*
            FROM permissions p
            JOIN roles r ON p.role_id = r.id
            JOIN user_roles ur ON ur.role_id = r.id
            JOIN memberships m ON m.user_id = ur.user_id
            WHERE ur.user_id = $1
              AND m.business_id = $2
              AND r.business_id = $2
            "#,
        )
        .bind(user_id)
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        department_id: Option<Uuid>,
        name: &str,
        access: AccessLevel,
        prevent_edit: bool,
        prevent_delete: bool,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (business_id, department_id, name, access, prevent_edit, prevent_delete)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(department_id)
        .bind(name)
        .bind(access)
        .bind(prevent_edit)
        .bind(prevent_delete)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    // Uma linha de permissões por cargo (1:1), sempre criada junto com ele.
    pub async fn create_permission_row<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        set: &PermissionSet,
    ) -> Result<Permission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Permission>(
            r#"
            INSERT INTO permissions (
                role_id,
                global_crud_users, global_crud_department, global_crud_role,
                global_crud_resources, global_assign_users_to_role,
                global_assign_resources_to_role, global_view_reports,
                dept_crud_role, dept_crud_resources, dept_assign_users_to_role,
                dept_assign_resources_to_role, dept_view_reports
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(set.global_crud_users)
        .bind(set.global_crud_department)
        .bind(set.global_crud_role)
        .bind(set.global_crud_resources)
        .bind(set.global_assign_users_to_role)
        .bind(set.global_assign_resources_to_role)
        .bind(set.global_view_reports)
        .bind(set.dept_crud_role)
        .bind(set.dept_crud_resources)
        .bind(set.dept_assign_users_to_role)
        .bind(set.dept_assign_resources_to_role)
        .bind(set.dept_view_reports)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn update_permission_row<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        set: &PermissionSet,
    ) -> Result<Permission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Permission>(
            r#"
            UPDATE permissions SET
                global_crud_users = $2, global_crud_department = $3,
                global_crud_role = $4, global_crud_resources = $5,
                global_assign_users_to_role = $6, global_assign_resources_to_role = $7,
                global_view_reports = $8, dept_crud_role = $9,
                dept_crud_resources = $10, dept_assign_users_to_role = $11,
                dept_assign_resources_to_role = $12, dept_view_reports = $13,
                updated_at = now()
            WHERE role_id = $1
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(set.global_crud_users)
        .bind(set.global_crud_department)
        .bind(set.global_crud_role)
        .bind(set.global_crud_resources)
        .bind(set.global_assign_users_to_role)
        .bind(set.global_assign_resources_to_role)
        .bind(set.global_view_reports)
        .bind(set.dept_crud_role)
        .bind(set.dept_crud_resources)
        .bind(set.dept_assign_users_to_role)
        .bind(set.dept_assign_resources_to_role)
        .bind(set.dept_view_reports)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn permission_row_for_role(
        &self,
        role_id: Uuid,
    ) -> Result<Option<Permission>, AppError> {
        let row =
            sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE role_id = $1")
                .bind(role_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row)
    }

    pub async fn find_role(
        &self,
        business_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE business_id = $1 AND id = $2",
        )
        .bind(business_id)
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    // Trava a linha para a Guarda de Mutação (checar e escrever na mesma transação).
    pub async fn find_role_for_update<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE business_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(business_id)
        .bind(role_id)
        .fetch_optional(executor)
        .await?;

        Ok(role)
    }

    pub async fn list_roles(&self, business_id: Uuid) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE business_id = $1 ORDER BY name",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn update_role<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        role_id: Uuid,
        department_id: Option<Uuid>,
        name: &str,
        access: AccessLevel,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET department_id = $3, name = $4, access = $5, updated_at = now()
            WHERE business_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(role_id)
        .bind(department_id)
        .bind(name)
        .bind(access)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    // A exclusão do cargo cascateia a linha de permissões e os user_roles (FK).
    pub async fn delete_role<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        role_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM roles WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(role_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn assign_user_to_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn remove_user_from_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
