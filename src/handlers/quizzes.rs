// src/handlers/quizzes.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        business::BusinessContext,
        rbac::{PermManageResources, RequirePermission},
    },
    models::quiz::{
        CreateAnswerPayload, CreateQuestionPayload, CreateQuizPayload,
        CreateQuizSectionPayload, Quiz, QuizAnswer, QuizAttempt, QuizQuestion, QuizResult,
        QuizSection, RecordResultPayload, UpdateQuizPayload,
    },
};

// POST /api/business/manuals/{manual_id}/quizzes
#[utoipa::path(
    post,
    path = "/api/business/manuals/{manual_id}/quizzes",
    tag = "Quizzes",
    request_body = CreateQuizPayload,
    params(
        ("manual_id" = Uuid, Path, description = "ID do manual dono"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 201, description = "Quiz criado (não publicado)", body = Quiz),
        (status = 404, description = "Manual inexistente neste negócio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quiz(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(manual_id): Path<Uuid>,
    Json(payload): Json<CreateQuizPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let quiz = app_state
        .quiz_service
        .create_quiz(
            business.0,
            user.id,
            manual_id,
            &payload.title,
            payload.max_attempts,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

// GET /api/business/quizzes
#[utoipa::path(
    get,
    path = "/api/business/quizzes",
    tag = "Quizzes",
    responses(
        (status = 200, description = "Quizzes visíveis ao usuário (USER: atribuídos, com manual E quiz publicados)", body = Vec<Quiz>)
    ),
    params(("x-business-id" = Uuid, Header, description = "ID do Negócio")),
    security(("api_jwt" = []))
)]
pub async fn list_quizzes(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
) -> Result<Json<Vec<Quiz>>, AppError> {
    let quizzes = app_state
        .quiz_service
        .list_quizzes(business.0, user.id)
        .await?;

    Ok(Json(quizzes))
}

// GET /api/business/quizzes/{id}
#[utoipa::path(
    get,
    path = "/api/business/quizzes/{id}",
    tag = "Quizzes",
    params(
        ("id" = Uuid, Path, description = "ID do quiz"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Quiz", body = Quiz),
        (status = 403, description = "Quiz existe mas não está atribuído a nenhum cargo do usuário"),
        (status = 404, description = "Quiz inexistente ou não publicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quiz(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = app_state
        .quiz_service
        .get_quiz(business.0, user.id, quiz_id)
        .await?;

    Ok(Json(quiz))
}

// PUT /api/business/quizzes/{id}
#[utoipa::path(
    put,
    path = "/api/business/quizzes/{id}",
    tag = "Quizzes",
    request_body = UpdateQuizPayload,
    params(
        ("id" = Uuid, Path, description = "ID do quiz"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Quiz atualizado", body = Quiz),
        (status = 405, description = "Quiz travado contra edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quiz(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<UpdateQuizPayload>,
) -> Result<Json<Quiz>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let quiz = app_state
        .quiz_service
        .update_quiz(
            business.0,
            user.id,
            quiz_id,
            &payload.title,
            payload.published,
            payload.max_attempts,
        )
        .await?;

    Ok(Json(quiz))
}

// DELETE /api/business/quizzes/{id}
#[utoipa::path(
    delete,
    path = "/api/business/quizzes/{id}",
    tag = "Quizzes",
    params(
        ("id" = Uuid, Path, description = "ID do quiz"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 204, description = "Quiz removido"),
        (status = 405, description = "Quiz travado contra exclusão")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quiz(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .quiz_service
        .delete_quiz(business.0, user.id, quiz_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/business/quizzes/{id}/sections
#[utoipa::path(
    post,
    path = "/api/business/quizzes/{id}/sections",
    tag = "Quizzes",
    request_body = CreateQuizSectionPayload,
    params(
        ("id" = Uuid, Path, description = "ID do quiz"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses((status = 201, description = "Seção criada", body = QuizSection)),
    security(("api_jwt" = []))
)]
pub async fn create_section(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<CreateQuizSectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let section = app_state
        .quiz_service
        .create_section(business.0, user.id, quiz_id, &payload.title)
        .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

// GET /api/business/quizzes/{id}/sections
#[utoipa::path(
    get,
    path = "/api/business/quizzes/{id}/sections",
    tag = "Quizzes",
    params(
        ("id" = Uuid, Path, description = "ID do quiz"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Seções visíveis (vazio é resposta válida)", body = Vec<QuizSection>),
        (status = 403, description = "Manual do quiz sem atribuição a cargos do usuário"),
        (status = 404, description = "Quiz inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sections(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Vec<QuizSection>>, AppError> {
    let sections = app_state
        .quiz_service
        .list_sections(business.0, user.id, quiz_id)
        .await?;

    Ok(Json(sections))
}

// POST /api/business/quiz-sections/{id}/questions
#[utoipa::path(
    post,
    path = "/api/business/quiz-sections/{id}/questions",
    tag = "Quizzes",
    request_body = CreateQuestionPayload,
    params(
        ("id" = Uuid, Path, description = "ID da seção"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses((status = 201, description = "Questão criada", body = QuizQuestion)),
    security(("api_jwt" = []))
)]
pub async fn create_question(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(section_id): Path<Uuid>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let question = app_state
        .quiz_service
        .create_question(
            business.0,
            user.id,
            section_id,
            &payload.question,
            &payload.question_type,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(question)))
}

// GET /api/business/quiz-sections/{id}/questions
#[utoipa::path(
    get,
    path = "/api/business/quiz-sections/{id}/questions",
    tag = "Quizzes",
    params(
        ("id" = Uuid, Path, description = "ID da seção"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Questões visíveis", body = Vec<QuizQuestion>),
        (status = 403, description = "Manual do quiz sem atribuição a cargos do usuário"),
        (status = 404, description = "Seção inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_questions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(section_id): Path<Uuid>,
) -> Result<Json<Vec<QuizQuestion>>, AppError> {
    let questions = app_state
        .quiz_service
        .list_questions(business.0, user.id, section_id)
        .await?;

    Ok(Json(questions))
}

// POST /api/business/quiz-questions/{id}/answers
#[utoipa::path(
    post,
    path = "/api/business/quiz-questions/{id}/answers",
    tag = "Quizzes",
    request_body = CreateAnswerPayload,
    params(
        ("id" = Uuid, Path, description = "ID da questão"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses((status = 201, description = "Alternativa criada", body = QuizAnswer)),
    security(("api_jwt" = []))
)]
pub async fn create_answer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    _perm: RequirePermission<PermManageResources>,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<CreateAnswerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let answer = app_state
        .quiz_service
        .create_answer(
            business.0,
            user.id,
            question_id,
            &payload.answer,
            payload.correct,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(answer)))
}

// GET /api/business/quiz-questions/{id}/answers
#[utoipa::path(
    get,
    path = "/api/business/quiz-questions/{id}/answers",
    tag = "Quizzes",
    params(
        ("id" = Uuid, Path, description = "ID da questão"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Alternativas visíveis (o gabarito nunca é serializado)", body = Vec<QuizAnswer>),
        (status = 403, description = "Manual do quiz sem atribuição a cargos do usuário"),
        (status = 404, description = "Questão inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_answers(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(question_id): Path<Uuid>,
) -> Result<Json<Vec<QuizAnswer>>, AppError> {
    let answers = app_state
        .quiz_service
        .list_answers(business.0, user.id, question_id)
        .await?;

    Ok(Json(answers))
}

// POST /api/business/quizzes/{id}/attempts
#[utoipa::path(
    post,
    path = "/api/business/quizzes/{id}/attempts",
    tag = "Quizzes",
    params(
        ("id" = Uuid, Path, description = "ID do quiz"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 201, description = "Tentativa aberta", body = QuizAttempt),
        (status = 403, description = "Limite de tentativas atingido ou quiz não atribuído")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_attempt(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = app_state
        .quiz_service
        .start_attempt(business.0, user.id, quiz_id)
        .await?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

// POST /api/business/attempts/{id}/results
#[utoipa::path(
    post,
    path = "/api/business/attempts/{id}/results",
    tag = "Quizzes",
    request_body = RecordResultPayload,
    params(
        ("id" = Uuid, Path, description = "ID da tentativa"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Resposta registrada (regrava se a questão já foi respondida)", body = QuizResult),
        (status = 403, description = "A tentativa pertence a outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_result(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    business: BusinessContext,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<RecordResultPayload>,
) -> Result<Json<QuizResult>, AppError> {
    let result = app_state
        .quiz_service
        .record_result(
            business.0,
            user.id,
            attempt_id,
            payload.quiz_question_id,
            payload.quiz_answer_id,
        )
        .await?;

    Ok(Json(result))
}

// GET /api/business/attempts/{id}/results
#[utoipa::path(
    get,
    path = "/api/business/attempts/{id}/results",
    tag = "Quizzes",
    params(
        ("id" = Uuid, Path, description = "ID da tentativa"),
        ("x-business-id" = Uuid, Header, description = "ID do Negócio")
    ),
    responses(
        (status = 200, description = "Respostas registradas na tentativa", body = Vec<QuizResult>),
        (status = 403, description = "A tentativa pertence a outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_results(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(attempt_id): Path<Uuid>,
) -> Result<Json<Vec<QuizResult>>, AppError> {
    let results = app_state
        .quiz_service
        .list_results(user.id, attempt_id)
        .await?;

    Ok(Json(results))
}
