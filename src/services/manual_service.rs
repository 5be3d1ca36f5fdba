// src/services/manual_service.rs
//
// Manuais, seções e políticas. A visibilidade de leitura é resolvida AQUI,
// em duas vias fixas: ADMIN/MANAGER enxergam tudo do negócio (inclusive
// rascunhos); USER só enxerga o que está atribuído a um cargo dele E
// publicado. Lista vazia para USER é resposta normal, não erro.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        guard::{check_mutation_allowed, MutationKind},
    },
    db::{AccessRepository, BusinessRepository, ManualRepository},
    models::manual::{Manual, ManualAssignment, ManualSection, Policy},
    services::access_service::AccessService,
};

#[derive(Clone)]
pub struct ManualService {
    manual_repo: ManualRepository,
    access_repo: AccessRepository,
    business_repo: BusinessRepository,
    access_service: AccessService,
    pool: PgPool,
}

impl ManualService {
    pub fn new(
        manual_repo: ManualRepository,
        access_repo: AccessRepository,
        business_repo: BusinessRepository,
        access_service: AccessService,
        pool: PgPool,
    ) -> Self {
        Self {
            manual_repo,
            access_repo,
            business_repo,
            access_service,
            pool,
        }
    }

    pub async fn create_manual(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        title: &str,
    ) -> Result<Manual, AppError> {
        let manual = self.manual_repo.create(&self.pool, business_id, title).await?;
        self.record_event(business_id, Some(actor_id), "manual_created");
        Ok(manual)
    }

    /// Manuais visíveis ao usuário, segundo a classificação dele no negócio.
    pub async fn list_manuals(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Manual>, AppError> {
        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            self.manual_repo.list_all(business_id).await
        } else {
            self.manual_repo
                .list_assigned_published(business_id, user_id)
                .await
        }
    }

    pub async fn get_manual(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        manual_id: Uuid,
    ) -> Result<Manual, AppError> {
        let manual = self
            .manual_repo
            .find_by_id(business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            return Ok(manual);
        }

        // Usuário comum: o manual precisa estar na lista visível dele.
        // Manual existente mas não atribuído/não publicado = NotFound, para
        // não vazar a existência de conteúdo que ele não deveria ver.
        let visible = self
            .manual_repo
            .list_assigned_published(business_id, user_id)
            .await?;
        if visible.iter().any(|m| m.id == manual_id) {
            Ok(manual)
        } else {
            Err(AppError::NotFound)
        }
    }

    pub async fn update_manual(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        manual_id: Uuid,
        title: &str,
        published: bool,
    ) -> Result<Manual, AppError> {
        let mut tx = self.pool.begin().await?;

        let manual = self
            .manual_repo
            .find_for_update(&mut *tx, business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&manual, MutationKind::Edit)?;

        let updated = self
            .manual_repo
            .update(&mut *tx, business_id, manual_id, title, published)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "manual_updated");
        Ok(updated)
    }

    pub async fn delete_manual(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        manual_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let manual = self
            .manual_repo
            .find_for_update(&mut *tx, business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&manual, MutationKind::Delete)?;

        self.manual_repo
            .delete(&mut *tx, business_id, manual_id)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "manual_deleted");
        Ok(())
    }

    pub async fn create_section(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        manual_id: Uuid,
        title: &str,
    ) -> Result<ManualSection, AppError> {
        self.manual_repo
            .find_by_id(business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let section = self
            .manual_repo
            .create_section(&self.pool, manual_id, title)
            .await?;

        self.record_event(business_id, Some(actor_id), "manual_section_created");
        Ok(section)
    }

    /// Seções visíveis. Para manuais, lista vazia é lista vazia: o contrato
    /// de "atribuição ausente = 403" vale apenas para quizzes.
    pub async fn list_sections(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        manual_id: Uuid,
    ) -> Result<Vec<ManualSection>, AppError> {
        self.manual_repo
            .find_by_id(business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            self.manual_repo.sections_all(business_id, manual_id).await
        } else {
            self.manual_repo
                .sections_assigned_published(business_id, manual_id, user_id)
                .await
        }
    }

    pub async fn create_policy(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        section_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Policy, AppError> {
        self.manual_repo
            .find_section(business_id, section_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let policy = self
            .manual_repo
            .create_policy(&self.pool, section_id, title, content)
            .await?;

        self.record_event(business_id, Some(actor_id), "policy_created");
        Ok(policy)
    }

    pub async fn list_policies(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        section_id: Uuid,
    ) -> Result<Vec<Policy>, AppError> {
        self.manual_repo
            .find_section(business_id, section_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            self.manual_repo.policies_all(business_id, section_id).await
        } else {
            self.manual_repo
                .policies_assigned_published(business_id, section_id, user_id)
                .await
        }
    }

    /// Atribui o manual a um cargo, tornando-o visível (quando publicado)
    /// para quem ocupa esse cargo.
    pub async fn assign_to_role(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        manual_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), AppError> {
        self.manual_repo
            .find_by_id(business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.access_repo
            .find_role(business_id, role_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.manual_repo
            .add_assignment(&self.pool, manual_id, role_id)
            .await?;

        self.record_event(business_id, Some(actor_id), "manual_assigned");
        Ok(())
    }

    pub async fn unassign_from_role(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        manual_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), AppError> {
        self.manual_repo
            .find_by_id(business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let removed = self
            .manual_repo
            .remove_assignment(&self.pool, manual_id, role_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }

        self.record_event(business_id, Some(actor_id), "manual_unassigned");
        Ok(())
    }

    pub async fn list_assignments(
        &self,
        business_id: Uuid,
        manual_id: Uuid,
    ) -> Result<Vec<ManualAssignment>, AppError> {
        self.manual_repo
            .find_by_id(business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.manual_repo.assignments_for_manual(manual_id).await
    }

    fn record_event(&self, business_id: Uuid, user_id: Option<Uuid>, name: &'static str) {
        let repo = self.business_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.record_event(business_id, user_id, name).await {
                tracing::warn!("Falha ao registrar evento '{}': {}", name, e);
            }
        });
    }
}
