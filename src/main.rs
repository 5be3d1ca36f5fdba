//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::{auth::auth_guard, business::business_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password/{token}", post(handlers::auth::reset_password));

    // Rotas do usuário autenticado (só auth_guard, sem escopo de negócio)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/businesses", get(handlers::businesses::list_my_businesses))
        .route(
            "/me/default-business",
            put(handlers::businesses::set_default_business),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas escopadas por negócio: auth_guard + business_guard (membership).
    // A checagem fina de permissão fica nos extractors RequirePermission<T>.
    let business_routes = Router::new()
        .route(
            "/members",
            post(handlers::businesses::add_member).get(handlers::businesses::list_members),
        )
        .route(
            "/members/{user_id}",
            axum::routing::delete(handlers::businesses::remove_member),
        )
        .route("/events", get(handlers::businesses::list_events))
        .route(
            "/departments",
            post(handlers::departments::create_department)
                .get(handlers::departments::list_departments),
        )
        .route(
            "/departments/{id}",
            get(handlers::departments::get_department)
                .put(handlers::departments::update_department)
                .delete(handlers::departments::delete_department),
        )
        .route(
            "/roles",
            post(handlers::roles::create_role).get(handlers::roles::list_roles),
        )
        .route(
            "/roles/{id}",
            get(handlers::roles::get_role)
                .put(handlers::roles::update_role)
                .delete(handlers::roles::delete_role),
        )
        .route(
            "/roles/{id}/permissions",
            put(handlers::roles::update_permissions),
        )
        .route(
            "/roles/{id}/users/{user_id}",
            post(handlers::roles::assign_user).delete(handlers::roles::unassign_user),
        )
        .route(
            "/manuals",
            post(handlers::manuals::create_manual).get(handlers::manuals::list_manuals),
        )
        .route(
            "/manuals/{id}",
            get(handlers::manuals::get_manual)
                .put(handlers::manuals::update_manual)
                .delete(handlers::manuals::delete_manual),
        )
        .route(
            "/manuals/{id}/sections",
            post(handlers::manuals::create_section).get(handlers::manuals::list_sections),
        )
        .route(
            "/manuals/{id}/assignments",
            get(handlers::manuals::list_assignments),
        )
        .route(
            "/manuals/{id}/roles/{role_id}",
            post(handlers::manuals::assign_manual).delete(handlers::manuals::unassign_manual),
        )
        .route(
            "/manual-sections/{id}/policies",
            post(handlers::manuals::create_policy).get(handlers::manuals::list_policies),
        )
        .route(
            "/manuals/{manual_id}/quizzes",
            post(handlers::quizzes::create_quiz),
        )
        .route("/quizzes", get(handlers::quizzes::list_quizzes))
        .route(
            "/quizzes/{id}",
            get(handlers::quizzes::get_quiz)
                .put(handlers::quizzes::update_quiz)
                .delete(handlers::quizzes::delete_quiz),
        )
        .route(
            "/quizzes/{id}/sections",
            post(handlers::quizzes::create_section).get(handlers::quizzes::list_sections),
        )
        .route(
            "/quizzes/{id}/attempts",
            post(handlers::quizzes::start_attempt),
        )
        .route(
            "/quiz-sections/{id}/questions",
            post(handlers::quizzes::create_question).get(handlers::quizzes::list_questions),
        )
        .route(
            "/quiz-questions/{id}/answers",
            post(handlers::quizzes::create_answer).get(handlers::quizzes::list_answers),
        )
        .route(
            "/attempts/{id}/results",
            post(handlers::quizzes::record_result).get(handlers::quizzes::list_results),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            business_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/business", business_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
