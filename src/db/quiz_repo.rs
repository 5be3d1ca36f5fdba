// src/db/quiz_repo.rs
//
// Quizzes e toda a sua árvore (seções, questões, respostas, tentativas,
// resultados). Para usuários comuns a visibilidade exige manual atribuído,
// manual publicado E quiz publicado; a sonda de atribuição separada sustenta
// a distinção entre FORBIDDEN (sem atribuição) e lista vazia.

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::quiz::{
        Quiz, QuizAnswer, QuizAttempt, QuizQuestion, QuizResult, QuizSection,
    },
};

#[derive(Clone)]
pub struct QuizRepository {
    pool: PgPool,
}

impl QuizRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        manual_id: Uuid,
        title: &str,
        max_attempts: i32,
    ) -> Result<Quiz, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (manual_id, title, max_attempts)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(manual_id)
        .bind(title)
        .bind(max_attempts)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    /// Busca um quiz garantindo o escopo do negócio (via manual dono).
    ///
    /// Grafo: quizzes q ⋈ manuals mn (mn.id = q.manual_id)
    /// Filtros: mn.business_id = $1, q.id = $2
    pub async fn find_by_id(
        &self,
        business_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT q.*
            FROM quizzes q
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1 AND q.id = $2
            "#,
        )
        .bind(business_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        business_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<Quiz>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // FOR UPDATE OF q: trava só a linha do quiz, não a do manual.
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT q.*
            FROM quizzes q
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1 AND q.id = $2
            FOR UPDATE OF q
            "#,
        )
        .bind(business_id)
        .bind(quiz_id)
        .fetch_optional(executor)
        .await?;

        Ok(quiz)
    }

    /// Todos os quizzes do negócio (visão ADMIN/MANAGER).
    pub async fn list_all(&self, business_id: Uuid) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT q.*
            FROM quizzes q
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1
            ORDER BY q.title
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    /// Quizzes visíveis a um usuário comum.
    ///
    /// Grafo: quizzes q ⋈ manuals mn (mn.id = q.manual_id)
    ///        ⋈ manual_assignments ma (ma.manual_id = mn.id)
    ///        ⋈ user_roles ur (ur.role_id = ma.role_id)
    /// Filtros: mn.business_id = $1, ur.user_id = $2,
    ///          mn.published = TRUE, q.published = TRUE
    pub async fn list_assigned_published(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT DISTINCT q.*
            FROM quizzes q
            JOIN manuals mn ON mn.id = q.manual_id
            JOIN manual_assignments ma ON ma.manual_id = mn.id
            JOIN user_roles ur ON ur.role_id = ma.role_id
            WHERE mn.business_id = $1
              AND ur.user_id = $2
              AND mn.published = TRUE
              AND q.published = TRUE
            ORDER BY q.title
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        quiz_id: Uuid,
        title: &str,
        published: bool,
        max_attempts: i32,
    ) -> Result<Quiz, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET title = $2, published = $3, max_attempts = $4, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(quiz_id)
        .bind(title)
        .bind(published)
        .bind(max_attempts)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn delete<'e, E>(&self, executor: E, quiz_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// O manual deste quiz está atribuído a ALGUM cargo do usuário?
    ///
    /// Sonda da regra de acesso de usuários comuns: a ausência de atribuição
    /// é um 403 explícito, diferente de resultado vazio (quiz atribuído mas
    /// sem conteúdo) e de 404 (quiz inexistente).
    ///
    /// Grafo: manual_assignments ma ⋈ manuals mn ⋈ quizzes q
    ///        ⋈ user_roles ur (ur.role_id = ma.role_id)
    /// Filtros: q.id = $1, ur.user_id = $2
    pub async fn assignment_exists_for_quiz(
        &self,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM manual_assignments ma
                JOIN manuals mn ON mn.id = ma.manual_id
                JOIN quizzes q ON q.manual_id = mn.id
                JOIN user_roles ur ON ur.role_id = ma.role_id
                WHERE q.id = $1 AND ur.user_id = $2
            )
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Variante da sonda de atribuição para uma questão de quiz.
    pub async fn assignment_exists_for_question(
        &self,
        question_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM manual_assignments ma
                JOIN manuals mn ON mn.id = ma.manual_id
                JOIN quizzes q ON q.manual_id = mn.id
                JOIN quiz_sections qs ON qs.quiz_id = q.id
                JOIN quiz_questions qq ON qq.quiz_section_id = qs.id
                JOIN user_roles ur ON ur.role_id = ma.role_id
                WHERE qq.id = $1 AND ur.user_id = $2
            )
            "#,
        )
        .bind(question_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Variante da sonda de atribuição para uma seção de quiz.
    pub async fn assignment_exists_for_section(
        &self,
        section_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM manual_assignments ma
                JOIN manuals mn ON mn.id = ma.manual_id
                JOIN quizzes q ON q.manual_id = mn.id
                JOIN quiz_sections qs ON qs.quiz_id = q.id
                JOIN user_roles ur ON ur.role_id = ma.role_id
                WHERE qs.id = $1 AND ur.user_id = $2
            )
            "#,
        )
        .bind(section_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_section<'e, E>(
        &self,
        executor: E,
        quiz_id: Uuid,
        title: &str,
    ) -> Result<QuizSection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, QuizSection>(
            "INSERT INTO quiz_sections (quiz_id, title) VALUES ($1, $2) RETURNING *",
        )
        .bind(quiz_id)
        .bind(title)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    /// Seções de um quiz, sem filtro de publicação (visão ADMIN/MANAGER).
    pub async fn sections_all(
        &self,
        business_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Vec<QuizSection>, AppError> {
        let sections = sqlx::query_as::<_, QuizSection>(
            r#"
            SELECT qs.*
            FROM quiz_sections qs
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1 AND q.id = $2
            ORDER BY qs.created_at
            "#,
        )
        .bind(business_id)
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    /// Seções visíveis a um usuário comum: manual atribuído, manual publicado
    /// E quiz publicado.
    ///
    /// Grafo: quiz_sections qs ⋈ quizzes q ⋈ manuals mn
    ///        ⋈ manual_assignments ma (ma.manual_id = mn.id)
    ///        ⋈ user_roles ur (ur.role_id = ma.role_id)
    /// Filtros: mn.business_id = $1, q.id = $2, ur.user_id = $3,
    ///          mn.published = TRUE, q.published = TRUE
    pub async fn sections_assigned_published(
        &self,
        business_id: Uuid,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<QuizSection>, AppError> {
        let sections = sqlx::query_as::<_, QuizSection>(
            r#"
            SELECT DISTINCT qs.*
            FROM quiz_sections qs
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            JOIN manual_assignments ma ON ma.manual_id = mn.id
            JOIN user_roles ur ON ur.role_id = ma.role_id
            WHERE mn.business_id = $1
              AND q.id = $2
              AND ur.user_id = $3
              AND mn.published = TRUE
              AND q.published = TRUE
            ORDER BY qs.created_at
            "#,
        )
        .bind(business_id)
        .bind(quiz_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    pub async fn find_section(
        &self,
        business_id: Uuid,
        section_id: Uuid,
    ) -> Result<Option<QuizSection>, AppError> {
        let section = sqlx::query_as::<_, QuizSection>(
            r#"
            SELECT qs.*
            FROM quiz_sections qs
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1 AND qs.id = $2
            "#,
        )
        .bind(business_id)
        .bind(section_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(section)
    }

    pub async fn create_question<'e, E>(
        &self,
        executor: E,
        section_id: Uuid,
        question: &str,
        question_type: &str,
    ) -> Result<QuizQuestion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, QuizQuestion>(
            r#"
            INSERT INTO quiz_questions (quiz_section_id, question, question_type)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(section_id)
        .bind(question)
        .bind(question_type)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    /// Questões de uma seção, sem filtro de publicação (visão ADMIN/MANAGER).
    pub async fn questions_all(
        &self,
        business_id: Uuid,
        section_id: Uuid,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"
            SELECT qq.*
            FROM quiz_questions qq
            JOIN quiz_sections qs ON qs.id = qq.quiz_section_id
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1 AND qs.id = $2
            ORDER BY qq.created_at
            "#,
        )
        .bind(business_id)
        .bind(section_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Questões visíveis a um usuário comum (mesma regra das seções).
    pub async fn questions_assigned_published(
        &self,
        business_id: Uuid,
        section_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"
            SELECT DISTINCT qq.*
            FROM quiz_questions qq
            JOIN quiz_sections qs ON qs.id = qq.quiz_section_id
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            JOIN manual_assignments ma ON ma.manual_id = mn.id
            JOIN user_roles ur ON ur.role_id = ma.role_id
            WHERE mn.business_id = $1
              AND qs.id = $2
              AND ur.user_id = $3
              AND mn.published = TRUE
              AND q.published = TRUE
            ORDER BY qq.created_at
            "#,
        )
        .bind(business_id)
        .bind(section_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Busca uma questão garantindo o escopo do negócio (cadeia completa até
    /// o manual dono). Escritas na árvore do quiz passam por aqui antes de
    /// tocar uma questão vinda da rota.
    pub async fn find_question(
        &self,
        business_id: Uuid,
        question_id: Uuid,
    ) -> Result<Option<QuizQuestion>, AppError> {
        let question = sqlx::query_as::<_, QuizQuestion>(
            r#"
            SELECT qq.*
            FROM quiz_questions qq
            JOIN quiz_sections qs ON qs.id = qq.quiz_section_id
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1 AND qq.id = $2
            "#,
        )
        .bind(business_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    pub async fn create_answer<'e, E>(
        &self,
        executor: E,
        question_id: Uuid,
        answer: &str,
        correct: bool,
    ) -> Result<QuizAnswer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, QuizAnswer>(
            r#"
            INSERT INTO quiz_answers (quiz_question_id, answer, correct)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(question_id)
        .bind(answer)
        .bind(correct)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    /// Alternativas de uma questão, sem filtro de publicação
    /// (visão ADMIN/MANAGER).
    pub async fn answers_all(
        &self,
        business_id: Uuid,
        question_id: Uuid,
    ) -> Result<Vec<QuizAnswer>, AppError> {
        let answers = sqlx::query_as::<_, QuizAnswer>(
            r#"
            SELECT qa.*
            FROM quiz_answers qa
            JOIN quiz_questions qq ON qq.id = qa.quiz_question_id
            JOIN quiz_sections qs ON qs.id = qq.quiz_section_id
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            WHERE mn.business_id = $1 AND qa.quiz_question_id = $2
            ORDER BY qa.created_at
            "#,
        )
        .bind(business_id)
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    /// Alternativas visíveis a um usuário comum (mesma regra das questões:
    /// manual atribuído, manual publicado E quiz publicado).
    pub async fn answers_assigned_published(
        &self,
        business_id: Uuid,
        question_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<QuizAnswer>, AppError> {
        let answers = sqlx::query_as::<_, QuizAnswer>(
            r#"
            SELECT DISTINCT qa.*
            FROM quiz_answers qa
            JOIN quiz_questions qq ON qq.id = qa.quiz_question_id
            JOIN quiz_sections qs ON qs.id = qq.quiz_section_id
            JOIN quizzes q ON q.id = qs.quiz_id
            JOIN manuals mn ON mn.id = q.manual_id
            JOIN manual_assignments ma ON ma.manual_id = mn.id
            JOIN user_roles ur ON ur.role_id = ma.role_id
            WHERE mn.business_id = $1
              AND qa.quiz_question_id = $2
              AND ur.user_id = $3
              AND mn.published = TRUE
              AND q.published = TRUE
            ORDER BY qa.created_at
            "#,
        )
        .bind(business_id)
        .bind(question_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    /// A questão pertence ao quiz E a alternativa pertence à questão?
    ///
    /// Sonda do encadeamento de um resultado: impede gravar um par
    /// questão/alternativa que cruze quizzes (ou questões) distintos.
    pub async fn result_chain_valid(
        &self,
        quiz_id: Uuid,
        question_id: Uuid,
        answer_id: Uuid,
    ) -> Result<bool, AppError> {
        let valid = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM quiz_answers qa
                JOIN quiz_questions qq ON qq.id = qa.quiz_question_id
                JOIN quiz_sections qs ON qs.id = qq.quiz_section_id
                WHERE qa.id = $3 AND qq.id = $2 AND qs.quiz_id = $1
            )
            "#,
        )
        .bind(quiz_id)
        .bind(question_id)
        .bind(answer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(valid)
    }

    pub async fn count_attempts<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    pub async fn create_attempt<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<QuizAttempt, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, QuizAttempt>(
            "INSERT INTO quiz_attempts (user_id, quiz_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn find_attempt(&self, attempt_id: Uuid) -> Result<Option<QuizAttempt>, AppError> {
        let attempt =
            sqlx::query_as::<_, QuizAttempt>("SELECT * FROM quiz_attempts WHERE id = $1")
                .bind(attempt_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(attempt)
    }

    // Regrava a escolha se a questão já foi respondida nesta tentativa.
    pub async fn record_result<'e, E>(
        &self,
        executor: E,
        attempt_id: Uuid,
        question_id: Uuid,
        answer_id: Uuid,
    ) -> Result<QuizResult, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO quiz_results (attempt_id, quiz_question_id, quiz_answer_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (attempt_id, quiz_question_id)
            DO UPDATE SET quiz_answer_id = EXCLUDED.quiz_answer_id
            RETURNING *
            "#,
        )
        .bind(attempt_id)
        .bind(question_id)
        .bind(answer_id)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    pub async fn results_for_attempt(
        &self,
        attempt_id: Uuid,
    ) -> Result<Vec<QuizResult>, AppError> {
        let results = sqlx::query_as::<_, QuizResult>(
            "SELECT * FROM quiz_results WHERE attempt_id = $1 ORDER BY created_at",
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
