// src/common/guard.rs
//
// Guarda de Mutação: trava por entidade, avaliada SEMPRE depois das checagens
// de cargo/permissão. As entidades de bootstrap (departamento e cargo criados
// no registro do negócio) nascem com as duas flags em true e nunca são
// destravadas por rotas normais.

use crate::common::error::AppError;

/// Operações de escrita cobertas pela guarda.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Edit,
    Delete,
}

/// O que uma entidade precisa expor para ser guardada.
pub trait Lockable {
    fn prevent_edit(&self) -> bool;
    fn prevent_delete(&self) -> bool;
}

/// Rejeita a mutação se a flag correspondente estiver ligada.
///
/// A trava vale para qualquer chamador, inclusive ADMIN. Quem chama deve
/// executar esta checagem e a escrita dentro da MESMA transação, com a linha
/// travada (`SELECT ... FOR UPDATE`), para não abrir janela entre checar e
/// escrever.
pub fn check_mutation_allowed(entity: &impl Lockable, op: MutationKind) -> Result<(), AppError> {
    let locked = match op {
        MutationKind::Edit => entity.prevent_edit(),
        MutationKind::Delete => entity.prevent_delete(),
    };

    if locked {
        return Err(AppError::MutationLocked);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flags {
        edit: bool,
        delete: bool,
    }

    impl Lockable for Flags {
        fn prevent_edit(&self) -> bool {
            self.edit
        }
        fn prevent_delete(&self) -> bool {
            self.delete
        }
    }

    #[test]
    fn unlocked_entity_allows_both_operations() {
        let e = Flags { edit: false, delete: false };
        assert!(check_mutation_allowed(&e, MutationKind::Edit).is_ok());
        assert!(check_mutation_allowed(&e, MutationKind::Delete).is_ok());
    }

    #[test]
    fn prevent_edit_blocks_only_edit() {
        let e = Flags { edit: true, delete: false };
        assert!(matches!(
            check_mutation_allowed(&e, MutationKind::Edit),
            Err(AppError::MutationLocked)
        ));
        assert!(check_mutation_allowed(&e, MutationKind::Delete).is_ok());
    }

    #[test]
    fn prevent_delete_blocks_only_delete() {
        let e = Flags { edit: false, delete: true };
        assert!(check_mutation_allowed(&e, MutationKind::Edit).is_ok());
        assert!(matches!(
            check_mutation_allowed(&e, MutationKind::Delete),
            Err(AppError::MutationLocked)
        ));
    }

    #[test]
    fn bootstrap_entity_stays_locked_for_any_caller() {
        // A guarda não recebe o cargo de quem chama: a trava é da entidade.
        let bootstrap = Flags { edit: true, delete: true };
        assert!(matches!(
            check_mutation_allowed(&bootstrap, MutationKind::Delete),
            Err(AppError::MutationLocked)
        ));
        assert!(matches!(
            check_mutation_allowed(&bootstrap, MutationKind::Edit),
            Err(AppError::MutationLocked)
        ));
    }
}
