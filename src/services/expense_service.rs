// src/services/expense_service.rs

use std::path::Path;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ExpenseRepository, MasterRepository, OwnerScope, UserRepository, VisitRepository},
    models::{
        activity::{EntityType, NewActivity},
        auth::{Actor, UserRole},
        expense::{calculate_amount, CreateExpensePayload, Expense, ExpenseListQuery, ExpenseListResponse, NewExpense},
    },
    services::{activity_service::ActivityLogService, approval::EXPENSE_PIPELINE},
};

/// Registros visíveis para o papel: executivo vê os seus, gerente os da equipe, demais tudo.
pub async fn owner_scope_for(user_repo: &UserRepository, actor: Actor) -> Result<OwnerScope, AppError> {
    Ok(match actor.role {
        UserRole::Executive => OwnerScope::single(actor.id),
        UserRole::Manager => OwnerScope::Owners(user_repo.subordinate_ids(actor.id).await?),
        _ => OwnerScope::Everyone,
    })
}

pub fn summarize(data: Vec<Expense>) -> ExpenseListResponse {
    let total_amount = data.iter().map(|e| e.actual_amount).sum::<Decimal>();
    ExpenseListResponse {
        count: data.len(),
        total_amount,
        data,
    }
}

// Mantém só o nome do arquivo, descartando qualquer diretório enviado pelo cliente
fn receipt_path(base: &str, file_name: &str) -> Option<String> {
    let name = Path::new(file_name).file_name()?.to_str()?;
    Some(format!("{}/{}", base.trim_end_matches('/'), name))
}

#[derive(Clone)]
pub struct ExpenseService {
    repo: ExpenseRepository,
    visit_repo: VisitRepository,
    master_repo: MasterRepository,
    user_repo: UserRepository,
    activity: ActivityLogService,
    upload_base_path: String,
}

impl ExpenseService {
    pub fn new(
        repo: ExpenseRepository,
        visit_repo: VisitRepository,
        master_repo: MasterRepository,
        user_repo: UserRepository,
        activity: ActivityLogService,
        upload_base_path: String,
    ) -> Self {
        Self { repo, visit_repo, master_repo, user_repo, activity, upload_base_path }
    }

    pub async fn create(&self, actor: Actor, payload: CreateExpensePayload) -> Result<Expense, AppError> {
        if payload.quantity < Decimal::ZERO {
            return Err(AppError::BusinessRule("invalid_quantity"));
        }

        let visit = self
            .visit_repo
            .find_by_id(payload.visit_id)
            .await?
            .ok_or(AppError::NotFound("visit"))?;
        if visit.executive_id != actor.id {
            return Err(AppError::Forbidden);
        }

        let sub_master = self
            .master_repo
            .find_sub_master(payload.sub_master_id)
            .await?
            .filter(|s| s.is_active && s.master_id == payload.master_id)
            .ok_or(AppError::BusinessRule("invalid_sub_master"))?;

        // O valor calculado ignora o valor informado pelo executivo
        let calculated_amount = calculate_amount(payload.quantity, sub_master.rate);

        let expense = self
            .repo
            .create(&NewExpense {
                visit_id: visit.id,
                executive_id: actor.id,
                master_id: payload.master_id,
                sub_master_id: sub_master.id,
                quantity: payload.quantity,
                calculated_amount,
                actual_amount: payload.actual_amount,
                description: payload.description,
                expense_date: payload.expense_date,
                approvals: EXPENSE_PIPELINE.initial_approvals(),
            })
            .await?;

        self.activity.record(
            NewActivity::new(
                actor.id,
                "EXPENSE_CREATED",
                EntityType::Expense,
                expense.id,
                format!("Expense of {} claimed for {}", expense.actual_amount, sub_master.name),
            )
            .with_metadata(serde_json::json!({
                "calculatedAmount": expense.calculated_amount,
                "actualAmount": expense.actual_amount,
            })),
        );
        Ok(expense)
    }

    pub async fn attach_receipt(&self, actor: Actor, id: Uuid, file_name: &str) -> Result<Expense, AppError> {
        let expense = self.load(id).await?;
        if expense.executive_id != actor.id {
            return Err(AppError::Forbidden);
        }

        let path = receipt_path(&self.upload_base_path, file_name)
            .ok_or(AppError::BusinessRule("invalid_file_name"))?;

        let expense = self
            .repo
            .set_receipt(id, &path)
            .await?
            .ok_or(AppError::NotFound("expense"))?;

        self.activity.record(NewActivity::new(
            actor.id,
            "EXPENSE_RECEIPT_UPLOADED",
            EntityType::Expense,
            expense.id,
            "Receipt attached",
        ));
        Ok(expense)
    }

    pub async fn list(&self, actor: Actor, query: ExpenseListQuery) -> Result<ExpenseListResponse, AppError> {
        let scope = owner_scope_for(&self.user_repo, actor).await?;
        let data = self
            .repo
            .list(&scope, query.visit_id, query.status, query.start_date, query.end_date)
            .await?;
        Ok(summarize(data))
    }

    pub async fn get(&self, actor: Actor, id: Uuid) -> Result<Expense, AppError> {
        let expense = self.load(id).await?;
        let scope = owner_scope_for(&self.user_repo, actor).await?;
        if !scope.includes(expense.executive_id) {
            return Err(AppError::Forbidden);
        }
        Ok(expense)
    }

    async fn load(&self, id: Uuid) -> Result<Expense, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("expense"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_path_keeps_only_the_file_name() {
        assert_eq!(receipt_path("/uploads", "recibo.jpg").as_deref(), Some("/uploads/recibo.jpg"));
        assert_eq!(receipt_path("/uploads/", "../../etc/passwd").as_deref(), Some("/uploads/passwd"));
        assert_eq!(receipt_path("/uploads", ".."), None);
    }

    #[test]
    fn empty_list_sums_to_zero() {
        let summary = summarize(Vec::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_amount, Decimal::ZERO);
    }
}
