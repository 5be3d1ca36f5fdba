// src/models/manual.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::guard::Lockable;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manual {
    pub id: Uuid,
    pub business_id: Uuid,
    #[schema(example = "Manual de Atendimento")]
    pub title: String,
    // Conteúdo não publicado é invisível para usuários comuns,
    // mesmo com o manual atribuído ao cargo deles.
    pub published: bool,
    pub prevent_edit: bool,
    pub prevent_delete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lockable for Manual {
    fn prevent_edit(&self) -> bool {
        self.prevent_edit
    }
    fn prevent_delete(&self) -> bool {
        self.prevent_delete
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualSection {
    pub id: Uuid,
    pub manual_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: Uuid,
    pub manual_section_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Concede aos usuários de um cargo a visibilidade de um manual.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualAssignment {
    pub manual_id: Uuid,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateManualPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Manual de Atendimento")]
    pub title: String,
}

// Nota: os payloads de edição não expõem prevent_edit/prevent_delete.
// As travas nunca são alteradas por rotas normais.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManualPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres"))]
    pub title: String,
    pub published: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres"))]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}
