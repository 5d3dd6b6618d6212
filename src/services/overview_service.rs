// src/services/overview_service.rs

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        time::{day_window, local_date, month_window},
    },
    db::DashboardStore,
    models::dashboard::QuickOverview,
};

/// Dias distintos (no fuso do negócio) em que houve check-in.
pub fn distinct_days(check_ins: &[DateTime<Utc>], offset: FixedOffset) -> i64 {
    check_ins
        .iter()
        .map(|t| local_date(*t, offset))
        .collect::<HashSet<_>>()
        .len() as i64
}

// Resumo pessoal do executivo para o mês corrente
#[derive(Clone)]
pub struct OverviewService {
    store: Arc<dyn DashboardStore>,
    offset: FixedOffset,
}

impl OverviewService {
    pub fn new(store: Arc<dyn DashboardStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub async fn compute(&self, executive_id: Uuid, as_of: DateTime<Utc>) -> Result<QuickOverview, AppError> {
        let month = month_window(as_of, self.offset);
        let today = day_window(as_of, self.offset);

        // As quatro consultas são independentes: todas rodam até o fim antes de avaliar erros
        let (monthly_expense, last_visit, check_ins, today_check_in_time) = tokio::join!(
            self.store.expense_totals(executive_id, &month),
            self.store.last_active_visit(executive_id),
            self.store.check_in_times(executive_id, &month.span),
            self.store.first_check_in(executive_id, &today),
        );

        Ok(QuickOverview {
            monthly_expense: monthly_expense?,
            last_visit: last_visit?,
            present_days_this_month: distinct_days(&check_ins?, self.offset),
            today_check_in_time: today_check_in_time?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::store::memory::{MemExpense, MemVisit, MemoryDashboardStore},
        models::{approval::WorkflowStatus, dashboard::MonthlyExpense, visit::VisitStatus},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn visit(executive_id: Uuid, status: VisitStatus, created: &str, check_in: Option<&str>) -> MemVisit {
        MemVisit {
            executive_id,
            manager_id: None,
            status,
            created_at: utc(created),
            check_in_time: check_in.map(utc),
            to_address: format!("Cliente {}", created),
        }
    }

    #[tokio::test]
    async fn empty_month_yields_zeros_and_nulls() {
        let svc = OverviewService::new(Arc::new(MemoryDashboardStore::default()), utc_offset());
        let overview = svc.compute(Uuid::new_v4(), utc("2025-06-15T10:00:00Z")).await.unwrap();

        assert_eq!(overview.monthly_expense, MonthlyExpense { amount: Decimal::ZERO, count: 0 });
        assert!(overview.last_visit.is_none());
        assert_eq!(overview.present_days_this_month, 0);
        assert!(overview.today_check_in_time.is_none());
    }

    #[tokio::test]
    async fn same_day_check_ins_count_once() {
        let exec = Uuid::new_v4();
        let store = MemoryDashboardStore {
            visits: vec![
                visit(exec, VisitStatus::Completed, "2025-06-03T08:00:00Z", Some("2025-06-03T09:00:00Z")),
                visit(exec, VisitStatus::Completed, "2025-06-03T08:30:00Z", Some("2025-06-03T14:00:00Z")),
                visit(exec, VisitStatus::InProgress, "2025-06-05T08:00:00Z", Some("2025-06-05T09:30:00Z")),
                // mês anterior não conta
                visit(exec, VisitStatus::Completed, "2025-05-30T08:00:00Z", Some("2025-05-30T09:00:00Z")),
            ],
            ..Default::default()
        };
        let svc = OverviewService::new(Arc::new(store), utc_offset());

        let overview = svc.compute(exec, utc("2025-06-15T10:00:00Z")).await.unwrap();
        assert_eq!(overview.present_days_this_month, 2);
    }

    #[tokio::test]
    async fn overview_collects_every_part() {
        let exec = Uuid::new_v4();
        let other = Uuid::new_v4();
        let expense = |owner, date: &str, amount| MemExpense {
            executive_id: owner,
            expense_date: date.parse().unwrap(),
            status: WorkflowStatus::Pending,
            actual_amount: amount,
            approvals: Vec::new(),
        };
        let store = MemoryDashboardStore {
            expenses: vec![
                expense(exec, "2025-06-01", dec!(100.50)),
                expense(exec, "2025-06-30", dec!(200)),
                expense(exec, "2025-07-01", dec!(999)),
                expense(other, "2025-06-10", dec!(50)),
            ],
            visits: vec![
                visit(exec, VisitStatus::Completed, "2025-06-10T08:00:00Z", Some("2025-06-10T09:00:00Z")),
                visit(exec, VisitStatus::InProgress, "2025-06-15T07:00:00Z", Some("2025-06-15T08:15:00Z")),
                // mais recente, mas ainda não iniciada
                visit(exec, VisitStatus::Approved, "2025-06-15T09:00:00Z", None),
            ],
            ..Default::default()
        };
        let svc = OverviewService::new(Arc::new(store), utc_offset());

        let overview = svc.compute(exec, utc("2025-06-15T10:00:00Z")).await.unwrap();
        assert_eq!(overview.monthly_expense, MonthlyExpense { amount: dec!(300.50), count: 2 });

        let last = overview.last_visit.unwrap();
        assert_eq!(last.status, VisitStatus::InProgress);
        assert_eq!(last.check_in_time, Some(utc("2025-06-15T08:15:00Z")));

        assert_eq!(overview.today_check_in_time, Some(utc("2025-06-15T08:15:00Z")));
        assert_eq!(overview.present_days_this_month, 2);
    }

    #[test]
    fn distinct_days_follow_the_business_offset() {
        // 23:00 UTC de um dia e 01:00 UTC do seguinte caem no mesmo dia em UTC-3
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let times = [utc("2025-06-03T23:00:00Z"), utc("2025-06-04T01:00:00Z")];
        assert_eq!(distinct_days(&times, brt), 1);
        assert_eq!(distinct_days(&times, utc_offset()), 2);
    }
}
