// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccessRepository, BusinessRepository, DepartmentRepository, UserRepository},
    models::{
        access::{AccessLevel, PermissionSet},
        auth::{Claims, User},
        business::Business,
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    business_repo: BusinessRepository,
    department_repo: DepartmentRepository,
    access_repo: AccessRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        business_repo: BusinessRepository,
        department_repo: DepartmentRepository,
        access_repo: AccessRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            business_repo,
            department_repo,
            access_repo,
            jwt_secret,
            pool,
        }
    }

    /// Registro de negócio: cria, em UMA transação, o negócio, o usuário dono,
    /// o departamento "Admin", o cargo "General" (ADMIN, todas as permissões),
    /// a membership padrão e o vínculo usuário-cargo. As entidades de
    /// bootstrap nascem travadas (prevent_edit = prevent_delete = true) e
    /// nunca são destravadas por rotas normais.
    pub async fn register_business(
        &self,
        business_name: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(Business, String), AppError> {
        // O hashing fica fora da transação: não toca no banco e é pesado.
        let password_clone = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        // 1. Cria o negócio (tenant)
        let business = self
            .business_repo
            .create_business(&mut *tx, business_name)
            .await?;

        // 2. Cria o usuário dono
        let owner = self
            .user_repo
            .create_user(&mut *tx, first_name, last_name, email, &password_hash)
            .await?;

        // 3. Departamento de bootstrap, travado
        let department = self
            .department_repo
            .create(&mut *tx, business.id, "Admin", true, true)
            .await?;

        // 4. Cargo de bootstrap (ADMIN), travado
        let role = self
            .access_repo
            .create_role(
                &mut *tx,
                business.id,
                Some(department.id),
                "General",
                AccessLevel::Admin,
                true,
                true,
            )
            .await?;

        // 5. Linha de permissões com TODAS as chaves concedidas
        self.access_repo
            .create_permission_row(&mut *tx, role.id, &PermissionSet::all_granted())
            .await?;

        // 6. Membership padrão + vínculo usuário-cargo
        self.business_repo
            .add_membership(&mut *tx, business.id, owner.id, true)
            .await?;
        self.access_repo
            .assign_user_to_role(&mut *tx, owner.id, role.id)
            .await?;

        tx.commit().await?;

        // Auditoria: nunca bloqueia o caminho principal.
        self.record_event(business.id, Some(owner.id), "business_registered");

        let token = self.create_token(owner.id)?;
        Ok((business, token))
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em uma thread separada
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Gera e grava o token de redefinição de senha (validade de 1 hora).
    /// O envio do e-mail é responsabilidade da camada externa; aqui o token é
    /// devolvido para essa camada.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, AppError> {
        // E-mail desconhecido não é erro: não revelamos quais e-mails existem.
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            return Ok(None);
        };

        let token = Uuid::new_v4().to_string();
        let expiry = Utc::now() + Duration::hours(1);
        self.user_repo
            .set_reset_token(user.id, &token, expiry)
            .await?;

        Ok(Some(token))
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_reset_token(token)
            .await?
            .ok_or(AppError::InvalidToken)?;

        // Token expirado vale tanto quanto token inexistente.
        if !user.reset_token_valid(Utc::now()) {
            return Err(AppError::InvalidToken);
        }

        let password_clone = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo.reset_password(user.id, &password_hash).await
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    // Dispara o registro de auditoria sem bloquear a resposta.
    fn record_event(&self, business_id: Uuid, user_id: Option<Uuid>, name: &'static str) {
        let repo = self.business_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.record_event(business_id, user_id, name).await {
                tracing::warn!("Falha ao registrar evento '{}': {}", name, e);
            }
        });
    }
}
