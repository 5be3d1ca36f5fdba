// src/models/access.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::guard::Lockable;

// Mapeia o CREATE TYPE access_level do banco.
// ADMIN > MANAGER > USER; quem não tem cargo no negócio é tratado como USER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "access_level", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    Admin,
    Manager,
    User,
}

impl AccessLevel {
    fn rank(self) -> u8 {
        match self {
            AccessLevel::Admin => 2,
            AccessLevel::Manager => 1,
            AccessLevel::User => 0,
        }
    }

    /// É ADMIN ou MANAGER? (autores de conteúdo: enxergam tudo, inclusive
    /// material não publicado)
    pub fn is_elevated(self) -> bool {
        matches!(self, AccessLevel::Admin | AccessLevel::Manager)
    }

    /// Classificação: o maior nível entre os cargos encontrados.
    /// Conjunto vazio = USER (fail-closed).
    pub fn highest(levels: impl IntoIterator<Item = AccessLevel>) -> AccessLevel {
        levels
            .into_iter()
            .fold(AccessLevel::User, |acc, lvl| {
                if lvl.rank() > acc.rank() { lvl } else { acc }
            })
    }
}

// O que sai do banco (Tabela roles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub business_id: Uuid,
    // NULL = cargo de escopo do negócio inteiro
    pub department_id: Option<Uuid>,
    #[schema(example = "Atendente")]
    pub name: String,
    pub access: AccessLevel,
    pub prevent_edit: bool,
    pub prevent_delete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lockable for Role {
    fn prevent_edit(&self) -> bool {
        self.prevent_edit
    }
    fn prevent_delete(&self) -> bool {
        self.prevent_delete
    }
}

// As 12 chaves de permissão do sistema. Conjunto fixo e enumerado: a
// avaliação é sempre uma união explícita sobre essas chaves, nunca um
// "qualquer coluna verdadeira" implícito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKey {
    GlobalCrudUsers,
    GlobalCrudDepartment,
    GlobalCrudRole,
    GlobalCrudResources,
    GlobalAssignUsersToRole,
    GlobalAssignResourcesToRole,
    GlobalViewReports,
    DeptCrudRole,
    DeptCrudResources,
    DeptAssignUsersToRole,
    DeptAssignResourcesToRole,
    DeptViewReports,
}

// O que sai do banco (Tabela permissions) — uma linha por cargo.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,
    pub role_id: Uuid,
    pub global_crud_users: bool,
    pub global_crud_department: bool,
    pub global_crud_role: bool,
    pub global_crud_resources: bool,
    pub global_assign_users_to_role: bool,
    pub global_assign_resources_to_role: bool,
    pub global_view_reports: bool,
    pub dept_crud_role: bool,
    pub dept_crud_resources: bool,
    pub dept_assign_users_to_role: bool,
    pub dept_assign_resources_to_role: bool,
    pub dept_view_reports: bool,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    pub fn grants(&self, key: PermissionKey) -> bool {
        match key {
            PermissionKey::GlobalCrudUsers => self.global_crud_users,
            PermissionKey::GlobalCrudDepartment => self.global_crud_department,
            PermissionKey::GlobalCrudRole => self.global_crud_role,
            PermissionKey::GlobalCrudResources => self.global_crud_resources,
            PermissionKey::GlobalAssignUsersToRole => self.global_assign_users_to_role,
            PermissionKey::GlobalAssignResourcesToRole => self.global_assign_resources_to_role,
            PermissionKey::GlobalViewReports => self.global_view_reports,
            PermissionKey::DeptCrudRole => self.dept_crud_role,
            PermissionKey::DeptCrudResources => self.dept_crud_resources,
            PermissionKey::DeptAssignUsersToRole => self.dept_assign_users_to_role,
            PermissionKey::DeptAssignResourcesToRole => self.dept_assign_resources_to_role,
            PermissionKey::DeptViewReports => self.dept_view_reports,
        }
    }
}

pub const ALL_PERMISSION_KEYS: [PermissionKey; 12] = [
    PermissionKey::GlobalCrudUsers,
    PermissionKey::GlobalCrudDepartment,
    PermissionKey::GlobalCrudRole,
    PermissionKey::GlobalCrudResources,
    PermissionKey::GlobalAssignUsersToRole,
    PermissionKey::GlobalAssignResourcesToRole,
    PermissionKey::GlobalViewReports,
    PermissionKey::DeptCrudRole,
    PermissionKey::DeptCrudResources,
    PermissionKey::DeptAssignUsersToRole,
    PermissionKey::DeptAssignResourcesToRole,
    PermissionKey::DeptViewReports,
];

/// União das linhas de permissão de todos os cargos de um usuário em um
/// negócio. Permissões são sempre aditivas: dois cargos nunca se subtraem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub global_crud_users: bool,
    pub global_crud_department: bool,
    pub global_crud_role: bool,
    pub global_crud_resources: bool,
    pub global_assign_users_to_role: bool,
    pub global_assign_resources_to_role: bool,
    pub global_view_reports: bool,
    pub dept_crud_role: bool,
    pub dept_crud_resources: bool,
    pub dept_assign_users_to_role: bool,
    pub dept_assign_resources_to_role: bool,
    pub dept_view_reports: bool,
}

impl PermissionSet {
    /// Conjunto vazio: nenhum cargo, nenhuma permissão (fail-closed).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Todas as 12 chaves concedidas (cargo "General" do bootstrap).
    pub fn all_granted() -> Self {
        Self::from_keys(&ALL_PERMISSION_KEYS)
    }

    /// Constrói o conjunto a partir das chaves enviadas no payload.
    /// Chaves repetidas não têm efeito além da primeira.
    pub fn from_keys(keys: &[PermissionKey]) -> Self {
        let mut set = Self::empty();
        for key in keys {
            set.grant(*key);
        }
        set
    }

    fn grant(&mut self, key: PermissionKey) {
        match key {
            PermissionKey::GlobalCrudUsers => self.global_crud_users = true,
            PermissionKey::GlobalCrudDepartment => self.global_crud_department = true,
            PermissionKey::GlobalCrudRole => self.global_crud_role = true,
            PermissionKey::GlobalCrudResources => self.global_crud_resources = true,
            PermissionKey::GlobalAssignUsersToRole => self.global_assign_users_to_role = true,
            PermissionKey::GlobalAssignResourcesToRole => {
                self.global_assign_resources_to_role = true
            }
            PermissionKey::GlobalViewReports => self.global_view_reports = true,
            PermissionKey::DeptCrudRole => self.dept_crud_role = true,
            PermissionKey::DeptCrudResources => self.dept_crud_resources = true,
            PermissionKey::DeptAssignUsersToRole => self.dept_assign_users_to_role = true,
            PermissionKey::DeptAssignResourcesToRole => {
                self.dept_assign_resources_to_role = true
            }
            PermissionKey::DeptViewReports => self.dept_view_reports = true,
        }
    }

    /// OR lógico, chave a chave, de todas as linhas retornadas.
    pub fn union_all<'a>(rows: impl IntoIterator<Item = &'a Permission>) -> Self {
        let mut set = Self::empty();
        for row in rows {
            set.global_crud_users |= row.global_crud_users;
            set.global_crud_department |= row.global_crud_department;
            set.global_crud_role |= row.global_crud_role;
            set.global_crud_resources |= row.global_crud_resources;
            set.global_assign_users_to_role |= row.global_assign_users_to_role;
            set.global_assign_resources_to_role |= row.global_assign_resources_to_role;
            set.global_view_reports |= row.global_view_reports;
            set.dept_crud_role |= row.dept_crud_role;
            set.dept_crud_resources |= row.dept_crud_resources;
            set.dept_assign_users_to_role |= row.dept_assign_users_to_role;
            set.dept_assign_resources_to_role |= row.dept_assign_resources_to_role;
            set.dept_view_reports |= row.dept_view_reports;
        }
        set
    }

    pub fn grants(&self, key: PermissionKey) -> bool {
        match key {
            PermissionKey::GlobalCrudUsers => self.global_crud_users,
            PermissionKey::GlobalCrudDepartment => self.global_crud_department,
            PermissionKey::GlobalCrudRole => self.global_crud_role,
            PermissionKey::GlobalCrudResources => self.global_crud_resources,
            PermissionKey::GlobalAssignUsersToRole => self.global_assign_users_to_role,
            PermissionKey::GlobalAssignResourcesToRole => self.global_assign_resources_to_role,
            PermissionKey::GlobalViewReports => self.global_view_reports,
            PermissionKey::DeptCrudRole => self.dept_crud_role,
            PermissionKey::DeptCrudResources => self.dept_crud_resources,
            PermissionKey::DeptAssignUsersToRole => self.dept_assign_users_to_role,
            PermissionKey::DeptAssignResourcesToRole => self.dept_assign_resources_to_role,
            PermissionKey::DeptViewReports => self.dept_view_reports,
        }
    }

    /// True se QUALQUER uma das chaves pedidas foi concedida.
    /// Lista vazia = rota sem exigência de permissão = true.
    pub fn grants_any(&self, keys: &[PermissionKey]) -> bool {
        if keys.is_empty() {
            return true;
        }
        keys.iter().any(|k| self.grants(*k))
    }
}

// O payload para criar um cargo
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Atendente")]
    pub name: String,

    // Ausente = cargo de escopo do negócio inteiro
    pub department_id: Option<Uuid>,

    pub access: AccessLevel,

    // Chaves que a linha de permissões do novo cargo deve conceder
    #[schema(example = json!(["dept_crud_resources", "dept_view_reports"]))]
    #[serde(default)]
    pub permissions: Vec<PermissionKey>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub name: String,
    pub department_id: Option<Uuid>,
    pub access: AccessLevel,
}

// Substitui a linha de permissões inteira pelo conjunto de chaves enviado.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionsPayload {
    pub permissions: Vec<PermissionKey>,
}

// Resposta completa (Cargo + linha de permissões)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: PermissionSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn permission_row(role_id: Uuid, keys: &[PermissionKey]) -> Permission {
        let mut row = Permission {
            id: Uuid::new_v4(),
            role_id,
            global_crud_users: false,
            global_crud_department: false,
            global_crud_role: false,
            global_crud_resources: false,
            global_assign_users_to_role: false,
            global_assign_resources_to_role: false,
            global_view_reports: false,
            dept_crud_role: false,
            dept_crud_resources: false,
            dept_assign_users_to_role: false,
            dept_assign_resources_to_role: false,
            dept_view_reports: false,
            updated_at: Utc::now(),
        };
        for key in keys {
            match key {
                PermissionKey::GlobalCrudUsers => row.global_crud_users = true,
                PermissionKey::GlobalCrudDepartment => row.global_crud_department = true,
                PermissionKey::GlobalCrudRole => row.global_crud_role = true,
                PermissionKey::GlobalCrudResources => row.global_crud_resources = true,
                PermissionKey::GlobalAssignUsersToRole => row.global_assign_users_to_role = true,
                PermissionKey::GlobalAssignResourcesToRole => {
                    row.global_assign_resources_to_role = true
                }
                PermissionKey::GlobalViewReports => row.global_view_reports = true,
                PermissionKey::DeptCrudRole => row.dept_crud_role = true,
                PermissionKey::DeptCrudResources => row.dept_crud_resources = true,
                PermissionKey::DeptAssignUsersToRole => row.dept_assign_users_to_role = true,
                PermissionKey::DeptAssignResourcesToRole => {
                    row.dept_assign_resources_to_role = true
                }
                PermissionKey::DeptViewReports => row.dept_view_reports = true,
            }
        }
        row
    }

    #[test]
    fn highest_of_empty_set_is_user() {
        assert_eq!(AccessLevel::highest([]), AccessLevel::User);
    }

    #[test]
    fn highest_picks_most_privileged_role() {
        let levels = [AccessLevel::User, AccessLevel::Admin, AccessLevel::Manager];
        assert_eq!(AccessLevel::highest(levels), AccessLevel::Admin);

        let levels = [AccessLevel::User, AccessLevel::Manager];
        assert_eq!(AccessLevel::highest(levels), AccessLevel::Manager);
    }

    #[test]
    fn union_is_monotonic_across_roles() {
        // Um usuário com dois cargos ganha a permissão se QUALQUER um conceder.
        let r1 = permission_row(Uuid::new_v4(), &[PermissionKey::DeptViewReports]);
        let r2 = permission_row(Uuid::new_v4(), &[PermissionKey::GlobalCrudRole]);

        let set = PermissionSet::union_all([&r1, &r2]);

        assert!(set.grants(PermissionKey::DeptViewReports));
        assert!(set.grants(PermissionKey::GlobalCrudRole));
        assert!(!set.grants(PermissionKey::GlobalCrudUsers));
        assert!(set.grants_any(&[
            PermissionKey::GlobalCrudUsers,
            PermissionKey::GlobalCrudRole,
        ]));
    }

    #[test]
    fn union_of_no_rows_grants_nothing() {
        let set = PermissionSet::union_all([]);
        for key in ALL_PERMISSION_KEYS {
            assert!(!set.grants(key));
        }
    }

    #[test]
    fn empty_required_set_always_passes() {
        // Rotas sem exigência de permissão passam até para quem não tem nada.
        assert!(PermissionSet::empty().grants_any(&[]));
    }

    #[test]
    fn union_is_idempotent() {
        let r1 = permission_row(Uuid::new_v4(), &[PermissionKey::GlobalViewReports]);
        let once = PermissionSet::union_all([&r1]);
        let twice = PermissionSet::union_all([&r1, &r1]);
        assert_eq!(once, twice);
    }
}
