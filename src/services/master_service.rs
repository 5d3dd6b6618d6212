// src/services/master_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MasterRepository,
    models::{
        activity::{EntityType, NewActivity},
        auth::Actor,
        master::{
            CreateMasterPayload, CreateSubMasterPayload, ExpenseMaster, ExpenseSubMaster, MasterWithSubs,
            UpdateMasterPayload, UpdateSubMasterPayload,
        },
    },
    services::activity_service::ActivityLogService,
};

/// Código de categoria é guardado sempre em maiúsculas.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// Agrupa cada item ativo sob sua categoria
pub fn group_sub_masters(masters: Vec<ExpenseMaster>, subs: Vec<ExpenseSubMaster>) -> Vec<MasterWithSubs> {
    masters
        .into_iter()
        .map(|master| {
            let sub_masters = subs.iter().filter(|s| s.master_id == master.id).cloned().collect();
            MasterWithSubs { master, sub_masters }
        })
        .collect()
}

#[derive(Clone)]
pub struct MasterService {
    repo: MasterRepository,
    activity: ActivityLogService,
}

impl MasterService {
    pub fn new(repo: MasterRepository, activity: ActivityLogService) -> Self {
        Self { repo, activity }
    }

    pub async fn list_active(&self) -> Result<Vec<MasterWithSubs>, AppError> {
        let masters = self.repo.list_masters(true).await?;
        let subs = self.repo.list_sub_masters(None, true).await?;
        Ok(group_sub_masters(masters, subs))
    }

    pub async fn create_master(&self, actor: Actor, payload: CreateMasterPayload) -> Result<ExpenseMaster, AppError> {
        let master = self
            .repo
            .create_master(payload.name.trim(), &normalize_code(&payload.code), actor.id)
            .await?;

        self.log(actor, "MASTER_CREATED", master.id, format!("Expense master {} created", master.name));
        Ok(master)
    }

    pub async fn update_master(&self, actor: Actor, id: Uuid, payload: UpdateMasterPayload) -> Result<ExpenseMaster, AppError> {
        let code = payload.code.as_deref().map(normalize_code);
        let master = self
            .repo
            .update_master(id, &payload, code)
            .await?
            .ok_or(AppError::NotFound("master"))?;

        self.log(actor, "MASTER_UPDATED", master.id, format!("Expense master {} updated", master.name));
        Ok(master)
    }

    pub async fn deactivate_master(&self, actor: Actor, id: Uuid) -> Result<(), AppError> {
        if !self.repo.deactivate_master(id).await? {
            return Err(AppError::NotFound("master"));
        }
        self.log(actor, "MASTER_DEACTIVATED", id, "Expense master deactivated".to_owned());
        Ok(())
    }

    pub async fn create_sub_master(&self, actor: Actor, payload: CreateSubMasterPayload) -> Result<ExpenseSubMaster, AppError> {
        if payload.rate < Decimal::ZERO {
            return Err(AppError::BusinessRule("invalid_rate"));
        }
        self.repo
            .find_master(payload.master_id)
            .await?
            .ok_or(AppError::NotFound("master"))?;

        let sub = self
            .repo
            .create_sub_master(payload.master_id, payload.name.trim(), payload.rate, payload.unit, actor.id)
            .await?;

        self.log(actor, "SUB_MASTER_CREATED", sub.id, format!("Expense sub-master {} created", sub.name));
        Ok(sub)
    }

    pub async fn update_sub_master(
        &self,
        actor: Actor,
        id: Uuid,
        payload: UpdateSubMasterPayload,
    ) -> Result<ExpenseSubMaster, AppError> {
        if payload.rate.is_some_and(|r| r < Decimal::ZERO) {
            return Err(AppError::BusinessRule("invalid_rate"));
        }
        let sub = self
            .repo
            .update_sub_master(id, &payload)
            .await?
            .ok_or(AppError::NotFound("subMaster"))?;

        self.log(actor, "SUB_MASTER_UPDATED", sub.id, format!("Expense sub-master {} updated", sub.name));
        Ok(sub)
    }

    pub async fn deactivate_sub_master(&self, actor: Actor, id: Uuid) -> Result<(), AppError> {
        if !self.repo.deactivate_sub_master(id).await? {
            return Err(AppError::NotFound("subMaster"));
        }
        self.log(actor, "SUB_MASTER_DEACTIVATED", id, "Expense sub-master deactivated".to_owned());
        Ok(())
    }

    fn log(&self, actor: Actor, activity_type: &str, entity_id: Uuid, description: String) {
        self.activity.record(NewActivity::new(actor.id, activity_type, EntityType::Master, entity_id, description));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::master::RateUnit;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn master(name: &str) -> ExpenseMaster {
        let now = Utc::now();
        ExpenseMaster {
            id: Uuid::new_v4(),
            name: name.into(),
            code: normalize_code(name),
            is_active: true,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sub(master_id: Uuid, name: &str) -> ExpenseSubMaster {
        let now = Utc::now();
        ExpenseSubMaster {
            id: Uuid::new_v4(),
            master_id,
            name: name.into(),
            rate: dec!(150),
            unit: RateUnit::PerKm,
            is_active: true,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn code_is_upper_cased() {
        assert_eq!(normalize_code(" trv "), "TRV");
    }

    #[test]
    fn sub_masters_are_grouped_under_their_master() {
        let travel = master("Travel");
        let food = master("Food");
        let subs = vec![sub(travel.id, "Bike"), sub(travel.id, "Car"), sub(food.id, "Lunch")];

        let grouped = group_sub_masters(vec![travel.clone(), food], subs);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].master.id, travel.id);
        assert_eq!(grouped[0].sub_masters.len(), 2);
        assert_eq!(grouped[1].sub_masters[0].name, "Lunch");
    }
}
