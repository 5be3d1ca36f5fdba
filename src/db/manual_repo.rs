// src/db/manual_repo.rs
//
// Manuais, seções, políticas e atribuições de cargo. As consultas de
// visibilidade têm duas formas fixas: a privilegiada (ADMIN/MANAGER, tudo do
// negócio) e a básica (apenas manuais atribuídos a um cargo do usuário E
// publicados).

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::manual::{Manual, ManualAssignment, ManualSection, Policy},
};

#[derive(Clone)]
pub struct ManualRepository {
    pool: PgPool,
}

impl ManualRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        title: &str,
    ) -> Result<Manual, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Manual>(
            "INSERT INTO manuals (business_id, title) VALUES ($1, $2) RETURNING *",
        )
        .bind(business_id)
        .bind(title)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn find_by_id(
        &self,
        business_id: Uuid,
        manual_id: Uuid,
    ) -> Result<Option<Manual>, AppError> {
        let manual = sqlx::query_as::<_, Manual>(
            "SELECT * FROM manuals WHERE business_id = $1 AND id = $2",
        )
        .bind(business_id)
        .bind(manual_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(manual)
    }

    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        manual_id: Uuid,
    ) -> Result<Option<Manual>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let manual = sqlx::query_as::<_, Manual>(
            "SELECT * FROM manuals WHERE business_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(business_id)
        .bind(manual_id)
        .fetch_optional(executor)
        .await?;

        Ok(manual)
    }

    /// Todos os manuais do negócio (visão ADMIN/MANAGER, inclui não publicados).
    pub async fn list_all(&self, business_id: Uuid) -> Result<Vec<Manual>, AppError> {
        let manuals = sqlx::query_as::<_, Manual>(
            "SELECT * FROM manuals WHERE business_id = $1 ORDER BY title",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(manuals)
    }

    /// Manuais visíveis a um usuário comum.
    ///
    /// Grafo: manuals mn ⋈ manual_assignments ma (ma.manual_id = mn.id)
    ///        ⋈ user_roles ur (ur.role_id = ma.role_id)
    /// Filtros: mn.business_id = $1, ur.user_id = $2, mn.published = TRUE
    pub async fn list_assigned_published(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Manual>, AppError> {
        let manuals = sqlx::query_as::<_, Manual>(
            r#"
            SELECT DISTINCT mn.*
            FROM manuals mn
            JOIN manual_assignments ma ON ma.manual_id = mn.id
            JOIN user_roles ur ON ur.role_id = ma.role_id
            WHERE mn.business_id = $1
              AND ur.user_id = $2
              AND mn.published = TRUE
            ORDER BY mn.title
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(manuals)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        manual_id: Uuid,
        title: &str,
        published: bool,
    ) -> Result<Manual, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Manual>(
            r#"
            UPDATE manuals
            SET title = $3, published = $4, updated_at = now()
            WHERE business_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(manual_id)
        .bind(title)
        .bind(published)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        manual_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM manuals WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(manual_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn create_section<'e, E>(
        &self,
        executor: E,
        manual_id: Uuid,
        title: &str,
    ) -> Result<ManualSection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ManualSection>(
            "INSERT INTO manual_sections (manual_id, title) VALUES ($1, $2) RETURNING *",
        )
        .bind(manual_id)
        .bind(title)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    /// Seções de um manual, sem filtro de publicação (visão ADMIN/MANAGER).
    ///
    /// Grafo: manual_sections ms ⋈ manuals mn (mn.id = ms.manual_id)
    /// Filtros: mn.business_id = $1, mn.id = $2
    pub async fn sections_all(
        &self,
        business_id: Uuid,
        manual_id: Uuid,
    ) -> Result<Vec<ManualSection>, AppError> {
        let sections = sqlx::query_as::<_, ManualSection>(
            r#"
            SELECT ms.*
            FROM manual_sections ms
            JOIN manuals mn ON mn.id = ms.manual_id
            WHERE mn.business_id = $1 AND mn.id = $2
            ORDER BY ms.created_at
            "#,
        )
        .bind(business_id)
        .bind(manual_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    /// Seções visíveis a um usuário comum: manual atribuído E publicado.
    ///
    /// Grafo: manual_sections ms ⋈ manuals mn (mn.id = ms.manual_id)
    ///        ⋈ manual_assignments ma (ma.manual_id = mn.id)
    ///        ⋈ user_roles ur (ur.role_id = ma.role_id)
    /// Filtros: mn.business_id = $1, mn.id = $2, ur.user_id = $3,
    ///          mn.published = TRUE
    pub async fn sections_assigned_published(
        &self,
        business_id: Uuid,
        manual_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ManualSection>, AppError> {
        let sections = sqlx::query_as::<_, ManualSection>(
            r#"
            SELECT DISTINCT ms.*
            FROM manual_sections ms
            JOIN manuals mn ON mn.id = ms.manual_id
            JOIN manual_assignments ma ON ma.manual_id = mn.id
            JOIN user_roles ur ON ur.role_id = ma.role_id
            WHERE mn.business_id = $1
              AND mn.id = $2
              AND ur.user_id = $3
              AND mn.published = TRUE
            ORDER BY ms.created_at
            "#,
        )
        .bind(business_id)
        .bind(manual_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    pub async fn find_section(
        &self,
        business_id: Uuid,
        section_id: Uuid,
    ) -> Result<Option<ManualSection>, AppError> {
        let section = sqlx::query_as::<_, ManualSection>(
            r#"
            SELECT ms.*
            FROM manual_sections ms
            JOIN manuals mn ON mn.id = ms.manual_id
            WHERE mn.business_id = $1 AND ms.id = $2
            "#,
        )
        .bind(business_id)
        .bind(section_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(section)
    }

    pub async fn create_policy<'e, E>(
        &self,
        executor: E,
        section_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Policy, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Policy>(
            r#"
            INSERT INTO policies (manual_section_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(section_id)
        .bind(title)
        .bind(content)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    /// Políticas de uma seção, sem filtro de publicação (visão ADMIN/MANAGER).
    ///
    /// Grafo: policies po ⋈ manual_sections ms (ms.id = po.manual_section_id)
    ///        ⋈ manuals mn (mn.id = ms.manual_id)
    /// Filtros: mn.business_id = $1, ms.id = $2
    pub async fn policies_all(
        &self,
        business_id: Uuid,
        section_id: Uuid,
    ) -> Result<Vec<Policy>, AppError> {
        let policies = sqlx::query_as::<_, Policy>(
            r#"
            SELECT po.*
            FROM policies po
            JOIN manual_sections ms ON ms.id = po.manual_section_id
            JOIN manuals mn ON mn.id = ms.manual_id
            WHERE mn.business_id = $1 AND ms.id = $2
            ORDER BY po.created_at
            "#,
        )
        .bind(business_id)
        .bind(section_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(policies)
    }

    /// Políticas visíveis a um usuário comum: manual atribuído E publicado.
    ///
    /// Grafo: policies po ⋈ manual_sections ms ⋈ manuals mn
    ///        ⋈ manual_assignments ma (ma.manual_id = mn.id)
    ///        ⋈ user_roles ur (ur.role_id = ma.role_id)
    /// Filtros: mn.business_id = $1, ms.id = $2, ur.user_id = $3,
    ///          mn.published = TRUE
    pub async fn policies_assigned_published(
        &self,
        business_id: Uuid,
        section_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Policy>, AppError> {
        let policies = sqlx::query_as::<_, Policy>(
            r#"
            SELECT DISTINCT po.*
            FROM policies po
            JOIN manual_sections ms ON ms.id = po.manual_section_id
            JOIN manuals mn ON mn.id = ms.manual_id
            JOIN manual_assignments ma ON ma.manual_id = mn.id
            JOIN user_roles ur ON ur.role_id = ma.role_id
            WHERE mn.business_id = $1
              AND ms.id = $2
              AND ur.user_id = $3
              AND mn.published = TRUE
            ORDER BY po.created_at
            "#,
        )
        .bind(business_id)
        .bind(section_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(policies)
    }

    // Concede a um cargo a visibilidade do manual.
    pub async fn add_assignment<'e, E>(
        &self,
        executor: E,
        manual_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO manual_assignments (manual_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(manual_id)
        .bind(role_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn remove_assignment<'e, E>(
        &self,
        executor: E,
        manual_id: Uuid,
        role_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("DELETE FROM manual_assignments WHERE manual_id = $1 AND role_id = $2")
                .bind(manual_id)
                .bind(role_id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected())
    }

    pub async fn assignments_for_manual(
        &self,
        manual_id: Uuid,
    ) -> Result<Vec<ManualAssignment>, AppError> {
        let assignments = sqlx::query_as::<_, ManualAssignment>(
            "SELECT * FROM manual_assignments WHERE manual_id = $1",
        )
        .bind(manual_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }
}
