// src/services/business_service.rs
//
// Negócios, membros e departamentos. A autorização por permissão já foi
// resolvida na camada de rota; aqui fica a Guarda de Mutação, que roda
// DEPOIS da checagem de permissão e DENTRO da mesma transação da escrita.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        guard::{check_mutation_allowed, MutationKind},
    },
    db::{BusinessRepository, DepartmentRepository, UserRepository},
    models::business::{Business, Department, Event, Member},
};

/// Um negócio nunca fica sem membros: remover o último deixaria o tenant
/// órfão, sem ninguém capaz de entrar ou administrá-lo.
fn member_removal_gate(remaining: i64) -> Result<(), AppError> {
    if remaining == 0 {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[derive(Clone)]
pub struct BusinessService {
    business_repo: BusinessRepository,
    department_repo: DepartmentRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl BusinessService {
    pub fn new(
        business_repo: BusinessRepository,
        department_repo: DepartmentRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            business_repo,
            department_repo,
            user_repo,
            pool,
        }
    }

    pub async fn list_businesses_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Business>, AppError> {
        self.business_repo.list_for_user(user_id).await
    }

    /// Troca o negócio padrão do usuário. O índice parcial do banco garante
    /// no máximo UM default; zerar e religar na mesma transação evita a
    /// janela em que o usuário ficaria com dois (ou nenhum).
    pub async fn set_default_business(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        if !self
            .business_repo
            .membership_exists(business_id, user_id)
            .await?
        {
            return Err(AppError::NotFound);
        }

        let mut tx = self.pool.begin().await?;
        self.business_repo
            .clear_default_membership(&mut *tx, user_id)
            .await?;
        self.business_repo
            .set_default_membership(&mut *tx, business_id, user_id)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn list_members(&self, business_id: Uuid) -> Result<Vec<Member>, AppError> {
        self.business_repo.list_members(business_id).await
    }

    /// Adiciona um usuário EXISTENTE (por e-mail) como membro do negócio.
    pub async fn add_member(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        email: &str,
    ) -> Result<Member, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::NotFound)?;

        if self
            .business_repo
            .membership_exists(business_id, user.id)
            .await?
        {
            return Err(AppError::DuplicateName(email.to_string()));
        }

        let membership = self
            .business_repo
            .add_membership(&self.pool, business_id, user.id, false)
            .await?;

        self.record_event(business_id, Some(actor_id), "member_added");

        Ok(Member {
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_default: membership.is_default,
        })
    }

    pub async fn remove_member(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        // Remoção e recontagem na mesma transação: se este era o último
        // membro, o rollback desfaz a remoção.
        let mut tx = self.pool.begin().await?;

        let removed = self
            .business_repo
            .remove_membership(&mut *tx, business_id, user_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }

        let remaining = self
            .business_repo
            .count_members(&mut *tx, business_id)
            .await?;
        member_removal_gate(remaining)?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "member_removed");
        Ok(())
    }

    pub async fn create_department(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        name: &str,
    ) -> Result<Department, AppError> {
        // Departamentos criados por rota nunca nascem travados; só o
        // departamento de bootstrap tem as flags ligadas.
        let dept = self
            .department_repo
            .create(&self.pool, business_id, name, false, false)
            .await?;

        self.record_event(business_id, Some(actor_id), "department_created");
        Ok(dept)
    }

    pub async fn list_departments(&self, business_id: Uuid) -> Result<Vec<Department>, AppError> {
        self.department_repo.list_by_business(business_id).await
    }

    pub async fn get_department(
        &self,
        business_id: Uuid,
        department_id: Uuid,
    ) -> Result<Department, AppError> {
        self.department_repo
            .find_by_id(business_id, department_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_department(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        department_id: Uuid,
        name: &str,
    ) -> Result<Department, AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE: a leitura das flags e o UPDATE ficam na mesma transação.
        let dept = self
            .department_repo
            .find_for_update(&mut *tx, business_id, department_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&dept, MutationKind::Edit)?;

        let updated = self
            .department_repo
            .update(&mut *tx, business_id, department_id, name)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "department_updated");
        Ok(updated)
    }

    pub async fn delete_department(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        department_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let dept = self
            .department_repo
            .find_for_update(&mut *tx, business_id, department_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&dept, MutationKind::Delete)?;

        self.department_repo
            .delete(&mut *tx, business_id, department_id)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "department_deleted");
        Ok(())
    }

    pub async fn list_events(&self, business_id: Uuid) -> Result<Vec<Event>, AppError> {
        self.business_repo.list_events(business_id).await
    }

    // Auditoria fire-and-forget: falha vira warn no log, nunca erro na rota.
    fn record_event(&self, business_id: Uuid, user_id: Option<Uuid>, name: &'static str) {
        let repo = self.business_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.record_event(business_id, user_id, name).await {
                tracing::warn!("Falha ao registrar evento '{}': {}", name, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_the_last_member_is_forbidden() {
        assert!(matches!(member_removal_gate(0), Err(AppError::Forbidden)));
        assert!(member_removal_gate(1).is_ok());
        assert!(member_removal_gate(7).is_ok());
    }
}
