// src/services/leave_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeaveRepository, UserRepository},
    models::{
        activity::{EntityType, NewActivity},
        auth::Actor,
        leave::{ApplyLeavePayload, Leave, LeaveListQuery, NewLeave},
    },
    services::{activity_service::ActivityLogService, approval::LEAVE_PIPELINE, expense_service::owner_scope_for},
};

#[derive(Clone)]
pub struct LeaveService {
    repo: LeaveRepository,
    user_repo: UserRepository,
    activity: ActivityLogService,
}

impl LeaveService {
    pub fn new(repo: LeaveRepository, user_repo: UserRepository, activity: ActivityLogService) -> Self {
        Self { repo, user_repo, activity }
    }

    pub async fn apply(&self, actor: Actor, payload: ApplyLeavePayload) -> Result<Leave, AppError> {
        let leave = self
            .repo
            .create(&NewLeave {
                executive_id: actor.id,
                leave_type: payload.leave_type,
                from_date: payload.from_date,
                to_date: payload.to_date,
                number_of_days: payload.number_of_days,
                reason: payload.reason,
                approvals: LEAVE_PIPELINE.initial_approvals(),
            })
            .await?;

        tracing::info!(leave_id = %leave.id, "✅ Licença solicitada");
        self.activity.record(NewActivity::new(
            actor.id,
            "LEAVE_APPLIED",
            EntityType::Leave,
            leave.id,
            format!("{} leave applied for {} day(s)", leave.leave_type, leave.number_of_days),
        ));
        Ok(leave)
    }

    pub async fn list(&self, actor: Actor, query: LeaveListQuery) -> Result<Vec<Leave>, AppError> {
        let scope = owner_scope_for(&self.user_repo, actor).await?;
        self.repo
            .list(&scope, query.status, query.start_date, query.end_date)
            .await
    }

    pub async fn get(&self, actor: Actor, id: Uuid) -> Result<Leave, AppError> {
        let leave = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("leave"))?;
        let scope = owner_scope_for(&self.user_repo, actor).await?;
        if !scope.includes(leave.executive_id) {
            return Err(AppError::Forbidden);
        }
        Ok(leave)
    }
}
