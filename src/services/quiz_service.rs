// src/services/quiz_service.rs
//
// Quizzes, seções, questões, respostas e tentativas. Para usuários comuns o
// acesso ao conteúdo de um quiz distingue três situações que NUNCA se
// misturam: quiz inexistente (404), manual do quiz sem atribuição a nenhum
// cargo do usuário (403) e quiz acessível mas sem conteúdo (lista vazia).

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        guard::{check_mutation_allowed, MutationKind},
    },
    db::{BusinessRepository, ManualRepository, QuizRepository},
    models::quiz::{
        Quiz, QuizAnswer, QuizAttempt, QuizQuestion, QuizResult, QuizSection,
    },
    services::access_service::AccessService,
};

/// Porteiro do acesso básico (nível USER) ao conteúdo de um quiz que existe.
///
/// A atribuição é avaliada ANTES da publicação: sem atribuição é 403
/// (o conteúdo não é para este usuário), atribuído mas despublicado é 404
/// (o conteúdo não está disponível). As duas respostas nunca se trocam.
fn basic_quiz_gate(
    assigned: bool,
    manual_published: bool,
    quiz_published: bool,
) -> Result<(), AppError> {
    if !assigned {
        return Err(AppError::Forbidden);
    }
    if !manual_published || !quiz_published {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Porteiro das listagens de conteúdo para nível USER: sem atribuição é 403.
/// O filtro de publicação fica na própria consulta (vazio é resposta válida).
fn basic_listing_gate(assigned: bool) -> Result<(), AppError> {
    if assigned {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Escritas na árvore do quiz só enxergam alvos do encadeamento esperado
/// (negócio → manual → quiz → seção → questão → alternativa); fora dele o
/// alvo "não existe" (404), nunca um registro cruzando negócios ou quizzes.
fn quiz_tree_link_gate(linked: bool) -> Result<(), AppError> {
    if linked {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

// O limite é inclusivo: com `used == max_attempts` não abre mais nenhuma.
fn attempts_exhausted(used: i64, max_attempts: i32) -> bool {
    used >= i64::from(max_attempts)
}

#[derive(Clone)]
pub struct QuizService {
    quiz_repo: QuizRepository,
    manual_repo: ManualRepository,
    business_repo: BusinessRepository,
    access_service: AccessService,
    pool: PgPool,
}

impl QuizService {
    pub fn new(
        quiz_repo: QuizRepository,
        manual_repo: ManualRepository,
        business_repo: BusinessRepository,
        access_service: AccessService,
        pool: PgPool,
    ) -> Self {
        Self {
            quiz_repo,
            manual_repo,
            business_repo,
            access_service,
            pool,
        }
    }

    pub async fn create_quiz(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        manual_id: Uuid,
        title: &str,
        max_attempts: i32,
    ) -> Result<Quiz, AppError> {
        // O manual dono precisa existir NESTE negócio.
        self.manual_repo
            .find_by_id(business_id, manual_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let quiz = self
            .quiz_repo
            .create(&self.pool, manual_id, title, max_attempts)
            .await?;

        self.record_event(business_id, Some(actor_id), "quiz_created");
        Ok(quiz)
    }

    pub async fn list_quizzes(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Quiz>, AppError> {
        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            self.quiz_repo.list_all(business_id).await
        } else {
            self.quiz_repo
                .list_assigned_published(business_id, user_id)
                .await
        }
    }

    pub async fn get_quiz(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Quiz, AppError> {
        let quiz = self
            .quiz_repo
            .find_by_id(business_id, quiz_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            return Ok(quiz);
        }

        let assigned = self
            .quiz_repo
            .assignment_exists_for_quiz(quiz_id, user_id)
            .await?;
        let manual = self
            .manual_repo
            .find_by_id(business_id, quiz.manual_id)
            .await?
            .ok_or(AppError::NotFound)?;

        basic_quiz_gate(assigned, manual.published, quiz.published)?;
        Ok(quiz)
    }

    pub async fn update_quiz(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        quiz_id: Uuid,
        title: &str,
        published: bool,
        max_attempts: i32,
    ) -> Result<Quiz, AppError> {
        let mut tx = self.pool.begin().await?;

        let quiz = self
            .quiz_repo
            .find_for_update(&mut *tx, business_id, quiz_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&quiz, MutationKind::Edit)?;

        let updated = self
            .quiz_repo
            .update(&mut *tx, quiz_id, title, published, max_attempts)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "quiz_updated");
        Ok(updated)
    }

    pub async fn delete_quiz(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let quiz = self
            .quiz_repo
            .find_for_update(&mut *tx, business_id, quiz_id)
            .await?
            .ok_or(AppError::NotFound)?;
        check_mutation_allowed(&quiz, MutationKind::Delete)?;

        self.quiz_repo.delete(&mut *tx, quiz_id).await?;
        tx.commit().await?;

        self.record_event(business_id, Some(actor_id), "quiz_deleted");
        Ok(())
    }

    pub async fn create_section(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        quiz_id: Uuid,
        title: &str,
    ) -> Result<QuizSection, AppError> {
        self.quiz_repo
            .find_by_id(business_id, quiz_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let section = self
            .quiz_repo
            .create_section(&self.pool, quiz_id, title)
            .await?;

        self.record_event(business_id, Some(actor_id), "quiz_section_created");
        Ok(section)
    }

    /// Seções visíveis de um quiz.
    ///
    /// ADMIN/MANAGER: todas. Usuário comum: exige atribuição (403 quando
    /// ausente) e publicação em cadeia (manual E quiz); satisfeitas as duas,
    /// lista vazia é resposta válida.
    pub async fn list_sections(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Vec<QuizSection>, AppError> {
        self.quiz_repo
            .find_by_id(business_id, quiz_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            return self.quiz_repo.sections_all(business_id, quiz_id).await;
        }

        let assigned = self
            .quiz_repo
            .assignment_exists_for_quiz(quiz_id, user_id)
            .await?;
        basic_listing_gate(assigned)?;

        self.quiz_repo
            .sections_assigned_published(business_id, quiz_id, user_id)
            .await
    }

    pub async fn create_question(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        section_id: Uuid,
        question: &str,
        question_type: &str,
    ) -> Result<QuizQuestion, AppError> {
        self.quiz_repo
            .find_section(business_id, section_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let created = self
            .quiz_repo
            .create_question(&self.pool, section_id, question, question_type)
            .await?;

        self.record_event(business_id, Some(actor_id), "quiz_question_created");
        Ok(created)
    }

    /// Questões de uma seção, com a mesma regra de acesso das seções.
    pub async fn list_questions(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        section_id: Uuid,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        self.quiz_repo
            .find_section(business_id, section_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            return self.quiz_repo.questions_all(business_id, section_id).await;
        }

        let assigned = self
            .quiz_repo
            .assignment_exists_for_section(section_id, user_id)
            .await?;
        basic_listing_gate(assigned)?;

        self.quiz_repo
            .questions_assigned_published(business_id, section_id, user_id)
            .await
    }

    pub async fn create_answer(
        &self,
        business_id: Uuid,
        actor_id: Uuid,
        question_id: Uuid,
        answer: &str,
        correct: bool,
    ) -> Result<QuizAnswer, AppError> {
        // A questão alvo precisa existir NESTE negócio.
        let question = self
            .quiz_repo
            .find_question(business_id, question_id)
            .await?;
        quiz_tree_link_gate(question.is_some())?;

        let created = self
            .quiz_repo
            .create_answer(&self.pool, question_id, answer, correct)
            .await?;

        self.record_event(business_id, Some(actor_id), "quiz_answer_created");
        Ok(created)
    }

    /// Alternativas de uma questão, com a mesma regra de acesso das questões:
    /// ADMIN/MANAGER veem tudo; usuário comum exige atribuição (403 quando
    /// ausente) e publicação em cadeia (manual E quiz).
    pub async fn list_answers(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        question_id: Uuid,
    ) -> Result<Vec<QuizAnswer>, AppError> {
        self.quiz_repo
            .find_question(business_id, question_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let level = self.access_service.classify(business_id, user_id).await?;
        if level.is_elevated() {
            return self.quiz_repo.answers_all(business_id, question_id).await;
        }

        let assigned = self
            .quiz_repo
            .assignment_exists_for_question(question_id, user_id)
            .await?;
        basic_listing_gate(assigned)?;

        self.quiz_repo
            .answers_assigned_published(business_id, question_id, user_id)
            .await
    }

    /// Abre uma tentativa para o usuário, respeitando o limite do quiz.
    /// O acesso segue a mesma regra de leitura: quiz visível para o usuário.
    pub async fn start_attempt(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<QuizAttempt, AppError> {
        // get_quiz já aplica 404/403/publicação.
        self.get_quiz(business_id, user_id, quiz_id).await?;

        // Contagem e inserção na mesma transação, com a linha do quiz
        // travada: duas aberturas concorrentes não furam o limite.
        let mut tx = self.pool.begin().await?;
        let quiz = self
            .quiz_repo
            .find_for_update(&mut *tx, business_id, quiz_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let used = self
            .quiz_repo
            .count_attempts(&mut *tx, user_id, quiz_id)
            .await?;
        if attempts_exhausted(used, quiz.max_attempts) {
            return Err(AppError::Forbidden);
        }

        let attempt = self
            .quiz_repo
            .create_attempt(&mut *tx, user_id, quiz_id)
            .await?;
        tx.commit().await?;

        self.record_event(business_id, Some(user_id), "quiz_attempt_started");
        Ok(attempt)
    }

    /// Registra (ou regrava) a resposta escolhida para uma questão da
    /// tentativa. Só o dono da tentativa pode gravar nela.
    pub async fn record_result(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        attempt_id: Uuid,
        question_id: Uuid,
        answer_id: Uuid,
    ) -> Result<QuizResult, AppError> {
        let attempt = self
            .quiz_repo
            .find_attempt(attempt_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if attempt.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        // O quiz precisa continuar visível para o usuário no momento da
        // gravação (despublicar encerra a tentativa na prática).
        self.get_quiz(business_id, user_id, attempt.quiz_id).await?;

        // A questão tem que ser DESTE quiz e a alternativa DESTA questão.
        let linked = self
            .quiz_repo
            .result_chain_valid(attempt.quiz_id, question_id, answer_id)
            .await?;
        quiz_tree_link_gate(linked)?;

        self.quiz_repo
            .record_result(&self.pool, attempt_id, question_id, answer_id)
            .await
    }

    pub async fn list_results(
        &self,
        user_id: Uuid,
        attempt_id: Uuid,
    ) -> Result<Vec<QuizResult>, AppError> {
        let attempt = self
            .quiz_repo
            .find_attempt(attempt_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if attempt.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        self.quiz_repo.results_for_attempt(attempt_id).await
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assignment_is_forbidden_not_not_found() {
        // Mesmo com tudo despublicado, a falta de atribuição responde primeiro.
        assert!(matches!(
            basic_quiz_gate(false, false, false),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            basic_quiz_gate(false, true, true),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn assigned_but_unpublished_is_invisible() {
        // Qualquer elo despublicado da cadeia (manual OU quiz) esconde o conteúdo.
        assert!(matches!(
            basic_quiz_gate(true, false, true),
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            basic_quiz_gate(true, true, false),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn assigned_and_fully_published_passes() {
        assert!(basic_quiz_gate(true, true, true).is_ok());
    }

    #[test]
    fn unassigned_listing_is_forbidden() {
        // Vale para seções, questões E alternativas: a mesma porta.
        assert!(matches!(basic_listing_gate(false), Err(AppError::Forbidden)));
        assert!(basic_listing_gate(true).is_ok());
    }

    #[test]
    fn out_of_tree_target_is_not_found() {
        // Questão de outro negócio ou alternativa de outra questão: o alvo
        // simplesmente não existe para quem escreve.
        assert!(matches!(quiz_tree_link_gate(false), Err(AppError::NotFound)));
        assert!(quiz_tree_link_gate(true).is_ok());
    }

    #[test]
    fn attempt_cap_is_inclusive() {
        assert!(!attempts_exhausted(0, 1));
        assert!(attempts_exhausted(1, 1));
        assert!(attempts_exhausted(5, 3));
    }
}
