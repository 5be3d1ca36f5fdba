// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        AccessRepository, BusinessRepository, DepartmentRepository, ManualRepository,
        QuizRepository, UserRepository,
    },
    services::{
        access_service::AccessService, auth::AuthService, business_service::BusinessService,
        manual_service::ManualService, quiz_service::QuizService, role_service::RoleService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    // Repositório exposto diretamente para o business_guard (checagem de membership)
    pub business_repo: BusinessRepository,
    // Serviços no estado, como discutido
    pub auth_service: AuthService,
    pub access_service: AccessService,
    pub business_service: BusinessService,
    pub role_service: RoleService,
    pub manual_service: ManualService,
    pub quiz_service: QuizService,
}

impl AppState {
    // A assinatura retorna um Result!
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let business_repo = BusinessRepository::new(db_pool.clone());
        let department_repo = DepartmentRepository::new(db_pool.clone());
        let access_repo = AccessRepository::new(db_pool.clone());
        let manual_repo = ManualRepository::new(db_pool.clone());
        let quiz_repo = QuizRepository::new(db_pool.clone());

        let access_service = AccessService::new(access_repo.clone());
        let auth_service = AuthService::new(
            user_repo.clone(),
            business_repo.clone(),
            department_repo.clone(),
            access_repo.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );
        let business_service = BusinessService::new(
            business_repo.clone(),
            department_repo.clone(),
            user_repo.clone(),
            db_pool.clone(),
        );
        let role_service = RoleService::new(
            access_repo.clone(),
            department_repo.clone(),
            business_repo.clone(),
            db_pool.clone(),
        );
        let manual_service = ManualService::new(
            manual_repo.clone(),
            access_repo.clone(),
            business_repo.clone(),
            access_service.clone(),
            db_pool.clone(),
        );
        let quiz_service = QuizService::new(
            quiz_repo,
            manual_repo,
            business_repo.clone(),
            access_service.clone(),
            db_pool.clone(),
        );

        // Retorna Ok com o estado montado
        Ok(Self {
            db_pool,
            jwt_secret,
            business_repo,
            auth_service,
            access_service,
            business_service,
            role_service,
            manual_service,
            quiz_service,
        })
    }
}
