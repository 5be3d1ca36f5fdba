// src/middleware/business.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::auth::User};

// O nome do nosso cabeçalho HTTP customizado
const BUSINESS_ID_HEADER: &str = "x-business-id";

// O contexto do negócio que a requisição quer acessar.
#[derive(Debug, Clone, Copy)]
pub struct BusinessContext(pub Uuid);

/// Middleware das rotas escopadas por negócio. Roda DEPOIS do auth_guard:
/// lê o X-Business-ID, confirma que o usuário autenticado é membro daquele
/// negócio e injeta o contexto. Sem membership = 404, para não confirmar a
/// existência de negócios alheios.
pub async fn business_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or(AppError::InvalidToken)?;

    let business_id = request
        .headers()
        .get(BUSINESS_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or(AppError::NotFound)?;

    let is_member = app_state
        .business_repo
        .membership_exists(business_id, user.id)
        .await?;
    if !is_member {
        return Err(AppError::NotFound);
    }

    request.extensions_mut().insert(BusinessContext(business_id));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for BusinessContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BusinessContext>()
            .copied()
            .ok_or(AppError::NotFound)
    }
}
