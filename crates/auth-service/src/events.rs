//! Domain events and the sink they are published to.
//!
//! Publishing is fire-and-forget: a failed publish is logged and counted but
//! never fails the login, registration or logout that produced it.

use crate::errors::AuthError;
use crate::observability::metrics::record_event_published;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

pub const TOPIC_USER_REGISTERED: &str = "auth.user.registered";
pub const TOPIC_USER_LOGIN: &str = "auth.user.login";
pub const TOPIC_USER_LOGOUT: &str = "auth.user.logout";

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), AuthError>;
}

/// Default sink: one structured log line per event.
///
/// Stands in for a message-bus producer; the payload is not logged since it
/// carries usernames and emails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, topic: &str, _payload: serde_json::Value) -> Result<(), AuthError> {
        info!(target: "auth.events", topic, "Domain event published");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegisteredEvent {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub document_type: String,
    pub document_number: String,
    pub phone_number: Option<String>,
    pub user_type: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginEvent {
    pub user_id: String,
    pub username: String,
    pub login_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLogoutEvent {
    pub user_id: String,
    pub jti: String,
    pub logout_at: DateTime<Utc>,
}

/// Serialize and publish an event, swallowing any failure.
pub(crate) async fn publish_best_effort<E: Serialize>(sink: &dyn EventSink, topic: &str, event: &E) {
    let payload = match serde_json::to_value(event) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(target: "auth.events", topic, error = %e, "Failed to serialize domain event");
            record_event_published(topic, "error");
            return;
        }
    };

    match sink.publish(topic, payload).await {
        Ok(()) => record_event_published(topic, "success"),
        Err(e) => {
            warn!(target: "auth.events", topic, error = %e, "Failed to publish domain event");
            record_event_published(topic, "error");
        }
    }
}
