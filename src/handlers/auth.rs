// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{
        AuthResponse, ForgotPasswordPayload, LoginUserPayload, RegisterBusinessPayload,
        RegisterBusinessResponse, ResetPasswordPayload, User,
    },
};

// Handler de registro: cria o negócio e o dono em uma única transação.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterBusinessPayload,
    responses(
        (status = 201, description = "Negócio e dono criados", body = RegisterBusinessResponse),
        (status = 409, description = "E-mail ou nome de negócio já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterBusinessPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (business, token) = app_state
        .auth_service
        .register_business(
            &payload.business_name,
            &payload.first_name,
            &payload.last_name,
            &payload.email,
            &payload.password,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterBusinessResponse { business, token }),
    ))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Solicitação aceita (resposta idêntica para e-mails desconhecidos)")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // O token seria entregue por e-mail; sem serviço de envio configurado,
    // apenas registramos no log do servidor.
    if let Some(token) = app_state.auth_service.forgot_password(&payload.email).await? {
        tracing::info!("Token de redefinição gerado para {}: {}", payload.email, token);
    }

    // Resposta idêntica nos dois casos: não revelamos quais e-mails existem.
    Ok(Json(json!({
        "message": "Se o e-mail estiver cadastrado, um link de redefinição foi enviado."
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    params(("token" = String, Path, description = "Token de redefinição")),
    responses(
        (status = 200, description = "Senha redefinida"),
        (status = 401, description = "Token inválido ou expirado")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    axum::extract::Path(token): axum::extract::Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .auth_service
        .reset_password(&token, &payload.password)
        .await?;

    Ok(Json(json!({ "message": "Senha redefinida com sucesso." })))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, description = "Usuário autenticado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
