// src/db/business_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::business::{Business, Event, Member, Membership},
};

#[derive(Clone)]
pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, business_id: Uuid) -> Result<Option<Business>, AppError> {
        let business =
            sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = $1")
                .bind(business_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(business)
    }

    // Cria um novo negócio. Aceita um executor (pool ou transação).
    pub async fn create_business<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Business, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Business>(
            "INSERT INTO businesses (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::BusinessAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// Verifica se um usuário é membro de um negócio.
    /// Esta é a checagem de autorização que protege todas as rotas escopadas.
    pub async fn membership_exists(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        // SELECT EXISTS: a consulta mais barata possível, só true/false.
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM memberships
                WHERE business_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // Vincula um usuário a um negócio (tabela-ponte).
    pub async fn add_membership<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        user_id: Uuid,
        is_default: bool,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (business_id, user_id, is_default)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .bind(is_default)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn remove_membership<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("DELETE FROM memberships WHERE business_id = $1 AND user_id = $2")
                .bind(business_id)
                .bind(user_id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_members<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM memberships WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    // Zera o default anterior do usuário; o serviço liga o novo na mesma transação.
    pub async fn clear_default_membership<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE memberships SET is_default = FALSE WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn set_default_membership<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE memberships SET is_default = TRUE WHERE business_id = $1 AND user_id = $2",
        )
        .bind(business_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    // Negócios dos quais o usuário é membro
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Business>, AppError> {
        let businesses = sqlx::query_as::<_, Business>(
            r#"
            SELECT b.*
            FROM businesses b
            JOIN memberships m ON m.business_id = b.id
            WHERE m.user_id = $1
            ORDER BY b.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(businesses)
    }

    // Membros de um negócio (usuário + flag de membership padrão)
    pub async fn list_members(&self, business_id: Uuid) -> Result<Vec<Member>, AppError> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT u.id AS user_id, u.first_name, u.last_name, u.email, m.is_default
            FROM users u
            JOIN memberships m ON m.user_id = u.id
            WHERE m.business_id = $1
            ORDER BY u.last_name, u.first_name
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    // Trilha de auditoria: somente inserção, nunca bloqueia o fluxo principal.
    pub async fn record_event(
        &self,
        business_id: Uuid,
        user_id: Option<Uuid>,
        name: &str,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO events (business_id, user_id, name) VALUES ($1, $2, $3)")
            .bind(business_id)
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_events(&self, business_id: Uuid) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE business_id = $1 ORDER BY created_on DESC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
