use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::models::{Event, EventType, Operation, UserId};

/// Write-only audit feed
///
/// Recording is fire-and-forget: implementations log their own failures and
/// never surface them to the operation that produced the event.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EventFeed: Send + Sync {
    async fn record(
        &self,
        user_id: UserId,
        entity_id: i64,
        event_type: EventType,
        operation: Operation,
    );
}

/// Event feed appending to the `events` table
#[derive(Clone)]
pub struct PgEventFeed {
    pool: PgPool,
}

impl PgEventFeed {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventFeed for PgEventFeed {
    async fn record(
        &self,
        user_id: UserId,
        entity_id: i64,
        event_type: EventType,
        operation: Operation,
    ) {
        let result = sqlx::query(
            r#"
            INSERT INTO events (user_id, entity_id, event_type, operation, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(entity_id)
        .bind(event_type.to_string())
        .bind(operation.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(
                error = %e,
                user_id,
                entity_id,
                event_type = %event_type,
                operation = %operation,
                "Failed to record feed event"
            );
        }
    }
}

/// In-process event feed
#[derive(Default)]
pub struct MemoryEventFeed {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first
    pub async fn events(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl EventFeed for MemoryEventFeed {
    async fn record(
        &self,
        user_id: UserId,
        entity_id: i64,
        event_type: EventType,
        operation: Operation,
    ) {
        self.events.lock().await.push(Event {
            user_id,
            entity_id,
            event_type,
            operation,
            timestamp: Utc::now(),
        });
    }
}
