// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. O Trait que define quais papéis podem passar pela rota
pub trait RoleGate: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub AuthenticatedUser, pub PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }
}

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleGate,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Extrai Usuário (inserido pelo auth_guard)
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Confere o papel
        if !T::allowed().contains(&user.0.role) {
            tracing::warn!(
                user_id = %user.0.id,
                role = user.0.role.as_str(),
                "⛔ Papel sem acesso à rota"
            );
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS GRUPOS DE PAPÉIS (TIPOS)
// ---

pub struct ExecutiveOnly;
impl RoleGate for ExecutiveOnly {
    fn allowed() -> &'static [UserRole] { &[UserRole::Executive] }
}

// Visitas planejadas: gerente ou admin
pub struct VisitPlanners;
impl RoleGate for VisitPlanners {
    fn allowed() -> &'static [UserRole] { &[UserRole::Manager, UserRole::Admin] }
}

pub struct ExpenseApprovers;
impl RoleGate for ExpenseApprovers {
    fn allowed() -> &'static [UserRole] { &[UserRole::Manager, UserRole::Finance, UserRole::Hr] }
}

pub struct LeaveApprovers;
impl RoleGate for LeaveApprovers {
    fn allowed() -> &'static [UserRole] { &[UserRole::Manager, UserRole::Hr] }
}

pub struct MasterEditors;
impl RoleGate for MasterEditors {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin, UserRole::Finance] }
}

pub struct PeopleAdmins;
impl RoleGate for PeopleAdmins {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin, UserRole::Hr] }
}

pub struct AdminOnly;
impl RoleGate for AdminOnly {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_may_plan_visits_but_executive_may_not() {
        let planners = VisitPlanners::allowed();
        assert!(planners.contains(&UserRole::Manager));
        assert!(planners.contains(&UserRole::Admin));
        assert!(!planners.contains(&UserRole::Executive));
        assert!(!planners.contains(&UserRole::Finance));
    }

    #[test]
    fn leave_approvers_exclude_finance() {
        assert!(!LeaveApprovers::allowed().contains(&UserRole::Finance));
        assert!(ExpenseApprovers::allowed().contains(&UserRole::Finance));
    }
}
