// src/db/department_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::business::Department};

#[derive(Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        name: &str,
        prevent_edit: bool,
        prevent_delete: bool,
    ) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (business_id, name, prevent_edit, prevent_delete)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(name)
        .bind(prevent_edit)
        .bind(prevent_delete)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateName(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id(
        &self,
        business_id: Uuid,
        department_id: Uuid,
    ) -> Result<Option<Department>, AppError> {
        let dept = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE business_id = $1 AND id = $2",
        )
        .bind(business_id)
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dept)
    }

    // Trava a linha para a Guarda de Mutação: a checagem das flags e a escrita
    // acontecem na mesma transação, sem janela entre checar e escrever.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        department_id: Uuid,
    ) -> Result<Option<Department>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let dept = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE business_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(business_id)
        .bind(department_id)
        .fetch_optional(executor)
        .await?;

        Ok(dept)
    }

    pub async fn list_by_business(&self, business_id: Uuid) -> Result<Vec<Department>, AppError> {
        let depts = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE business_id = $1 ORDER BY name",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(depts)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        department_id: Uuid,
        name: &str,
    ) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET name = $3, updated_at = now()
            WHERE business_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(department_id)
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateName(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        department_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM departments WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(department_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
