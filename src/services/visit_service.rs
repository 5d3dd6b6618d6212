// src/services/visit_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{UserRepository, VisitRepository, VisitScope},
    models::{
        activity::{EntityType, NewActivity},
        auth::{Actor, UserRole},
        visit::{
            CreatePlannedVisitPayload, CreateUnplannedVisitPayload, GeoPoint, NewVisit, Visit,
            VisitListQuery, VisitStatus, VisitType,
        },
    },
    services::activity_service::ActivityLogService,
};

const DEFAULT_CANCEL_REASON: &str = "No reason provided";

#[derive(Clone)]
pub struct VisitService {
    repo: VisitRepository,
    user_repo: UserRepository,
    activity: ActivityLogService,
}

/// Quais visitas cada papel enxerga na listagem.
pub fn scope_for(actor: Actor) -> VisitScope {
    match actor.role {
        UserRole::Executive => VisitScope::Executive(actor.id),
        UserRole::Manager => VisitScope::Manager(actor.id),
        _ => VisitScope::Everyone,
    }
}

pub fn can_view(actor: Actor, visit: &Visit) -> bool {
    match actor.role {
        UserRole::Executive => visit.executive_id == actor.id,
        UserRole::Manager => visit.manager_id == Some(actor.id),
        _ => true,
    }
}

// Executivo cancela as próprias visitas; gerente, as que gerencia. Os demais papéis cancelam qualquer uma.
pub fn can_cancel(actor: Actor, visit: &Visit) -> bool {
    match actor.role {
        UserRole::Executive => visit.executive_id == actor.id,
        UserRole::Manager => visit.manager_id == Some(actor.id),
        UserRole::Admin | UserRole::Hr | UserRole::Finance => true,
    }
}

// Tipo registrado na trilha de auditoria ao criar a visita
pub fn creation_activity(visit_type: VisitType) -> &'static str {
    match visit_type {
        VisitType::Planned => "PLANNED_VISIT_CREATED",
        VisitType::Unplanned => "UNPLANNED_VISIT_CREATED",
    }
}

impl VisitService {
    pub fn new(repo: VisitRepository, user_repo: UserRepository, activity: ActivityLogService) -> Self {
        Self { repo, user_repo, activity }
    }

    // Visita planejada (gerente ou admin) já nasce aprovada; quem planeja fica como gerente da visita
    pub async fn create_planned(&self, actor: Actor, payload: CreatePlannedVisitPayload) -> Result<Visit, AppError> {
        let executive = self
            .user_repo
            .find_by_id(payload.executive_id)
            .await?
            .filter(|u| u.is_active && u.role == UserRole::Executive)
            .ok_or(AppError::BusinessRule("invalid_executive"))?;

        let now = Utc::now();
        let visit = self
            .repo
            .create(&NewVisit {
                visit_type: VisitType::Planned,
                executive_id: executive.id,
                manager_id: Some(actor.id),
                planned_date: Some(payload.planned_date),
                approved_by: Some(actor.id),
                approved_at: Some(now),
                from_address: payload.from_address,
                to_address: payload.to_address,
                from_location: payload.from_location,
                to_location: payload.to_location,
                purpose: payload.purpose,
                status: VisitStatus::Approved,
                notes: payload.notes,
            })
            .await?;

        self.activity.record(
            NewActivity::new(
                actor.id,
                creation_activity(visit.visit_type),
                EntityType::Visit,
                visit.id,
                format!("Planned visit to {} for {}", visit.to_address, executive.name),
            ),
        );
        Ok(visit)
    }

    pub async fn create_unplanned(&self, actor: Actor, payload: CreateUnplannedVisitPayload) -> Result<Visit, AppError> {
        let visit = self
            .repo
            .create(&NewVisit {
                visit_type: VisitType::Unplanned,
                executive_id: actor.id,
                manager_id: None,
                planned_date: Some(payload.planned_date.unwrap_or_else(|| Utc::now().date_naive())),
                approved_by: None,
                approved_at: None,
                from_address: payload.from_address,
                to_address: payload.to_address,
                from_location: payload.from_location,
                to_location: payload.to_location,
                purpose: payload.purpose,
                status: VisitStatus::Approved,
                notes: payload.notes,
            })
            .await?;

        self.activity.record(NewActivity::new(
            actor.id,
            creation_activity(visit.visit_type),
            EntityType::Visit,
            visit.id,
            format!("Unplanned visit to {}", visit.to_address),
        ));
        Ok(visit)
    }

    pub async fn list(&self, actor: Actor, query: VisitListQuery) -> Result<Vec<Visit>, AppError> {
        self.repo.list(scope_for(actor), query.from_date, query.to_date).await
    }

    pub async fn get(&self, actor: Actor, id: Uuid) -> Result<Visit, AppError> {
        let visit = self.load(id).await?;
        if !can_view(actor, &visit) {
            return Err(AppError::Forbidden);
        }
        Ok(visit)
    }

    pub async fn check_in(&self, actor: Actor, id: Uuid, location: Option<GeoPoint>) -> Result<Visit, AppError> {
        let visit = self.load_owned(actor, id).await?;
        visit.can_check_in().map_err(AppError::InvalidState)?;

        let visit = self
            .repo
            .check_in(id, Utc::now(), location)
            .await?
            .ok_or(AppError::InvalidState("concurrent_update"))?;

        self.activity.record(NewActivity::new(
            actor.id,
            "VISIT_CHECKIN",
            EntityType::Visit,
            visit.id,
            format!("Checked in at {}", visit.to_address),
        ));
        Ok(visit)
    }

    pub async fn check_out(&self, actor: Actor, id: Uuid, location: Option<GeoPoint>) -> Result<Visit, AppError> {
        let visit = self.load_owned(actor, id).await?;
        visit.can_check_out().map_err(AppError::InvalidState)?;

        let visit = self
            .repo
            .check_out(id, Utc::now(), location)
            .await?
            .ok_or(AppError::InvalidState("concurrent_update"))?;

        self.activity.record(NewActivity::new(
            actor.id,
            "VISIT_CHECKOUT",
            EntityType::Visit,
            visit.id,
            format!("Checked out from {}", visit.to_address),
        ));
        Ok(visit)
    }

    pub async fn cancel(&self, actor: Actor, id: Uuid, reason: Option<String>) -> Result<Visit, AppError> {
        let visit = self.load(id).await?;
        if !can_cancel(actor, &visit) {
            return Err(AppError::Forbidden);
        }
        visit.can_cancel().map_err(AppError::InvalidState)?;

        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_owned());

        let visit = self
            .repo
            .cancel(id, actor.id, &reason, Utc::now())
            .await?
            .ok_or(AppError::InvalidState("concurrent_update"))?;

        self.activity.record(
            NewActivity::new(
                actor.id,
                "VISIT_CANCELLED",
                EntityType::Visit,
                visit.id,
                format!("Visit to {} cancelled", visit.to_address),
            )
            .with_metadata(serde_json::json!({ "reason": reason })),
        );
        Ok(visit)
    }

    async fn load(&self, id: Uuid) -> Result<Visit, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("visit"))
    }

    // Check-in/out só pelo executivo dono da visita
    async fn load_owned(&self, actor: Actor, id: Uuid) -> Result<Visit, AppError> {
        let visit = self.load(id).await?;
        if visit.executive_id != actor.id {
            return Err(AppError::Forbidden);
        }
        Ok(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(executive_id: Uuid, manager_id: Option<Uuid>) -> Visit {
        let now = Utc::now();
        Visit {
            id: Uuid::new_v4(),
            visit_type: VisitType::Planned,
            executive_id,
            manager_id,
            planned_date: None,
            approved_by: manager_id,
            approved_at: None,
            from_address: "Escritório".into(),
            to_address: "Cliente".into(),
            from_location: None,
            to_location: None,
            purpose: "Visita".into(),
            status: VisitStatus::Approved,
            check_in_time: None,
            check_in_location: None,
            check_out_time: None,
            check_out_location: None,
            cancel_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn actor(role: UserRole) -> Actor {
        Actor { id: Uuid::new_v4(), role }
    }

    #[test]
    fn listing_scope_follows_role() {
        let exec = actor(UserRole::Executive);
        let manager = actor(UserRole::Manager);
        assert_eq!(scope_for(exec), VisitScope::Executive(exec.id));
        assert_eq!(scope_for(manager), VisitScope::Manager(manager.id));
        assert_eq!(scope_for(actor(UserRole::Hr)), VisitScope::Everyone);
    }

    #[test]
    fn cancellation_rights() {
        let exec = actor(UserRole::Executive);
        let manager = actor(UserRole::Manager);
        let v = visit(exec.id, Some(manager.id));

        assert!(can_cancel(exec, &v));
        assert!(can_cancel(manager, &v));
        assert!(!can_cancel(actor(UserRole::Executive), &v));
        assert!(!can_cancel(actor(UserRole::Manager), &v));
        for role in [UserRole::Admin, UserRole::Hr, UserRole::Finance] {
            assert!(can_cancel(actor(role), &v));
        }
    }

    #[test]
    fn creation_activity_names_the_visit_type() {
        assert_eq!(creation_activity(VisitType::Planned), "PLANNED_VISIT_CREATED");
        assert_eq!(creation_activity(VisitType::Unplanned), "UNPLANNED_VISIT_CREATED");
    }

    #[test]
    fn visibility() {
        let exec = actor(UserRole::Executive);
        let v = visit(exec.id, None);
        assert!(can_view(exec, &v));
        assert!(!can_view(actor(UserRole::Executive), &v));
        assert!(!can_view(actor(UserRole::Manager), &v));
        assert!(can_view(actor(UserRole::Finance), &v));
    }
}
