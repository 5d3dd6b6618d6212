// src/services/activity_service.rs

use std::sync::Arc;

use crate::{db::ActivitySink, models::activity::NewActivity};

/// Grava a trilha de auditoria sem bloquear nem derrubar a operação principal.
#[derive(Clone)]
pub struct ActivityLogService {
    sink: Arc<dyn ActivitySink>,
}

impl ActivityLogService {
    pub fn new(sink: Arc<dyn ActivitySink>) -> Self {
        Self { sink }
    }

    // Dispara e esquece: falhas viram apenas um aviso no log
    pub fn record(&self, entry: NewActivity) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let activity_type = entry.activity_type.clone();
            if let Err(e) = sink.append(entry).await {
                tracing::warn!(activity_type = %activity_type, "⚠️ Falha ao registrar atividade: {}", e);
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::{common::error::AppError, db::ActivitySink, models::activity::NewActivity};

    // Encaminha cada atividade para um canal, para o teste aguardar a gravação
    pub struct ChannelSink(pub mpsc::UnboundedSender<NewActivity>);

    #[async_trait]
    impl ActivitySink for ChannelSink {
        async fn append(&self, entry: NewActivity) -> Result<(), AppError> {
            let _ = self.0.send(entry);
            Ok(())
        }
    }

    pub struct FailingSink;

    #[async_trait]
    impl ActivitySink for FailingSink {
        async fn append(&self, _entry: NewActivity) -> Result<(), AppError> {
            Err(AppError::StoreUnavailable(sqlx::Error::PoolTimedOut))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ChannelSink, FailingSink};
    use super::*;
    use crate::models::activity::EntityType;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn recorded_activity_reaches_the_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = ActivityLogService::new(Arc::new(ChannelSink(tx)));
        let entity_id = Uuid::new_v4();

        service.record(NewActivity::new(Uuid::new_v4(), "VISIT_CREATED", EntityType::Visit, entity_id, "Visita criada"));

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.activity_type, "VISIT_CREATED");
        assert_eq!(entry.entity_id, entity_id);
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let service = ActivityLogService::new(Arc::new(FailingSink));
        service.record(NewActivity::new(Uuid::new_v4(), "LEAVE_APPLIED", EntityType::Leave, Uuid::new_v4(), "x"));
        tokio::task::yield_now().await;
    }
}
