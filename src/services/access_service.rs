// src/services/access_service.rs
//
// Classificador de Acesso + Resolvedor de Permissões. As duas perguntas que
// toda rota protegida faz: "qual o nível deste usuário neste negócio?" e
// "alguma das chaves exigidas foi concedida a ele?".

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccessRepository,
    models::access::{AccessLevel, PermissionKey, PermissionSet},
};

#[derive(Clone)]
pub struct AccessService {
    access_repo: AccessRepository,
}

impl AccessService {
    pub fn new(access_repo: AccessRepository) -> Self {
        Self { access_repo }
    }

    /// Classifica o usuário dentro do negócio: o MAIOR nível entre os cargos
    /// que ele ocupa. Sem cargo nenhum = USER (fail-closed).
    ///
    /// Erro de banco aqui é falha dura (500), nunca rebaixamento silencioso
    /// para USER: negar acesso por causa de um banco fora do ar esconderia o
    /// incidente.
    pub async fn classify(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<AccessLevel, AppError> {
        let roles = self.access_repo.roles_for_user(business_id, user_id).await?;
        Ok(AccessLevel::highest(roles.iter().map(|r| r.access)))
    }

    /// União aditiva das linhas de permissão de todos os cargos do usuário.
    ///
    /// Ao contrário do classify, aqui erro de banco vira conjunto VAZIO
    /// (fail-closed) e é logado: uma permissão jamais pode ser concedida por
    /// engano, mas a negação não derruba a requisição inteira.
    pub async fn resolve_permissions(&self, business_id: Uuid, user_id: Uuid) -> PermissionSet {
        match self
            .access_repo
            .permissions_for_user(business_id, user_id)
            .await
        {
            Ok(rows) => PermissionSet::union_all(rows.iter()),
            Err(e) => {
                tracing::error!(
                    "Falha ao resolver permissões (business {}, user {}): {}. Negando tudo.",
                    business_id,
                    user_id,
                    e
                );
                PermissionSet::empty()
            }
        }
    }

    /// True se QUALQUER chave exigida foi concedida por QUALQUER cargo.
    /// Lista vazia de exigências passa sempre.
    pub async fn has_any_permission(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        required: &[PermissionKey],
    ) -> bool {
        self.resolve_permissions(business_id, user_id)
            .await
            .grants_any(required)
    }
}
