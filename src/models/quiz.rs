// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::guard::Lockable;

// Quiz amarrado a um manual (1:1 conceitual).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub manual_id: Uuid,
    #[schema(example = "Quiz - Manual de Atendimento")]
    pub title: String,
    pub published: bool,
    pub prevent_edit: bool,
    pub prevent_delete: bool,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lockable for Quiz {
    fn prevent_edit(&self) -> bool {
        self.prevent_edit
    }
    fn prevent_delete(&self) -> bool {
        self.prevent_delete
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizSection {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_section_id: Uuid,
    pub question: String,
    pub question_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub id: Uuid,
    pub quiz_question_id: Uuid,
    pub answer: String,
    // Nunca serializado para quem responde o quiz.
    #[serde(skip_serializing)]
    pub correct: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// A resposta escolhida para uma questão dentro de uma tentativa.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub attempt_id: Uuid,
    pub quiz_question_id: Uuid,
    pub quiz_answer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres"))]
    pub title: String,
    #[validate(range(min = 1, message = "O número de tentativas deve ser no mínimo 1"))]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

fn default_max_attempts() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres"))]
    pub title: String,
    pub published: bool,
    #[validate(range(min = 1, message = "O número de tentativas deve ser no mínimo 1"))]
    pub max_attempts: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizSectionPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres"))]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionPayload {
    #[validate(length(min = 2, message = "A pergunta deve ter no mínimo 2 caracteres"))]
    pub question: String,
    #[schema(example = "single correct - multiple choice")]
    pub question_type: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerPayload {
    #[validate(length(min = 1, message = "A resposta não pode ser vazia"))]
    pub answer: String,
    #[serde(default)]
    pub correct: bool,
}

// Registra a resposta escolhida para uma questão dentro de uma tentativa.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResultPayload {
    pub quiz_question_id: Uuid,
    pub quiz_answer_id: Uuid,
}
