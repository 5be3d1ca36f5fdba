// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,

        // --- Users ---
        handlers::auth::get_me,
        handlers::businesses::list_my_businesses,
        handlers::businesses::set_default_business,

        // --- Business ---
        handlers::businesses::list_members,
        handlers::businesses::add_member,
        handlers::businesses::remove_member,
        handlers::businesses::list_events,

        // --- Departments ---
        handlers::departments::create_department,
        handlers::departments::list_departments,
        handlers::departments::get_department,
        handlers::departments::update_department,
        handlers::departments::delete_department,

        // --- Roles ---
        handlers::roles::create_role,
        handlers::roles::list_roles,
        handlers::roles::get_role,
        handlers::roles::update_role,
        handlers::roles::update_permissions,
        handlers::roles::delete_role,
        handlers::roles::assign_user,
        handlers::roles::unassign_user,

        // --- Manuals ---
        handlers::manuals::create_manual,
        handlers::manuals::list_manuals,
        handlers::manuals::get_manual,
        handlers::manuals::update_manual,
        handlers::manuals::delete_manual,
        handlers::manuals::create_section,
        handlers::manuals::list_sections,
        handlers::manuals::create_policy,
        handlers::manuals::list_policies,
        handlers::manuals::assign_manual,
        handlers::manuals::unassign_manual,
        handlers::manuals::list_assignments,

        // --- Quizzes ---
        handlers::quizzes::create_quiz,
        handlers::quizzes::list_quizzes,
        handlers::quizzes::get_quiz,
        handlers::quizzes::update_quiz,
        handlers::quizzes::delete_quiz,
        handlers::quizzes::create_section,
        handlers::quizzes::list_sections,
        handlers::quizzes::create_question,
        handlers::quizzes::list_questions,
        handlers::quizzes::create_answer,
        handlers::quizzes::list_answers,
        handlers::quizzes::start_attempt,
        handlers::quizzes::record_result,
        handlers::quizzes::list_results,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterBusinessPayload,
            models::auth::RegisterBusinessResponse,
            models::auth::LoginUserPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,
            models::auth::AuthResponse,

            // --- Business ---
            models::business::Business,
            models::business::Membership,
            models::business::Department,
            models::business::Event,
            models::business::Member,
            models::business::CreateDepartmentPayload,
            models::business::UpdateDepartmentPayload,
            models::business::AddMemberPayload,
            handlers::businesses::SetDefaultBusinessPayload,

            // --- Access ---
            models::access::AccessLevel,
            models::access::PermissionKey,
            models::access::Role,
            models::access::Permission,
            models::access::PermissionSet,
            models::access::CreateRolePayload,
            models::access::UpdateRolePayload,
            models::access::UpdatePermissionsPayload,
            models::access::RoleResponse,

            // --- Manuals ---
            models::manual::Manual,
            models::manual::ManualSection,
            models::manual::Policy,
            models::manual::ManualAssignment,
            models::manual::CreateManualPayload,
            models::manual::UpdateManualPayload,
            models::manual::CreateSectionPayload,
            models::manual::CreatePolicyPayload,

            // --- Quizzes ---
            models::quiz::Quiz,
            models::quiz::QuizSection,
            models::quiz::QuizQuestion,
            models::quiz::QuizAnswer,
            models::quiz::QuizAttempt,
            models::quiz::QuizResult,
            models::quiz::CreateQuizPayload,
            models::quiz::UpdateQuizPayload,
            models::quiz::CreateQuizSectionPayload,
            models::quiz::CreateQuestionPayload,
            models::quiz::CreateAnswerPayload,
            models::quiz::RecordResultPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Business", description = "Membros e Auditoria do Negócio"),
        (name = "Departments", description = "Gestão de Departamentos"),
        (name = "Roles", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Manuals", description = "Manuais, Seções e Políticas"),
        (name = "Quizzes", description = "Quizzes, Questões e Tentativas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
