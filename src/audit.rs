//! Append-only trail of state changes.

use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::audit_logs::ActiveModel as AuditActive;

async fn insert<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) -> Result<(), DbErr> {
    AuditActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        action: Set(action.to_string()),
        resource: Set(Some(resource.to_string())),
        metadata: Set(Some(metadata)),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Record `action` on `resource`. A failed write is logged and never fails
/// the request that triggered it.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = insert(conn, user_id, action, resource, metadata).await {
        tracing::warn!(error = %err, action, resource, "audit log failed");
    }
}
