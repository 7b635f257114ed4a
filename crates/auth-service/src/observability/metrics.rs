//! Metrics definitions for the auth engine
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! No exporter is installed here; the embedding process chooses one.
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: 2 values (success, error)
//! - `error_category`: 3 values (authentication, token, infrastructure)
//! - `token_type`: 2 values (access, refresh)
//! - `operation`: bounded by code (get, set, increment, delete, exists, ...)
//! - `topic`: bounded by the event topic constants

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Login Metrics
// ============================================================================

/// Record a login attempt outcome and its duration
///
/// Metric: `auth_login_total`, `auth_login_duration_seconds`
/// Labels: `status`, `error_category`
pub fn record_login(status: &str, error_category: Option<&str>, duration: Duration) {
    let category = error_category.unwrap_or("none");
    histogram!("auth_login_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_login_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a rate limit decision
///
/// Metric: `auth_rate_limit_decisions_total`
/// Labels: `action` (allowed, rejected)
pub fn record_rate_limit_decision(action: &str) {
    counter!("auth_rate_limit_decisions_total", "action" => action.to_string()).increment(1);
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record a token issuance
///
/// Metric: `auth_token_issuance_total`
/// Labels: `token_type`, `status`
pub fn record_token_issuance(token_type: &str, status: &str) {
    counter!("auth_token_issuance_total", "token_type" => token_type.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record a token validation result
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a blacklist write
///
/// Metric: `auth_token_revocations_total`
/// Labels: `token_type`, `status`
pub fn record_revocation(token_type: &str, status: &str) {
    counter!("auth_token_revocations_total", "token_type" => token_type.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Side Effect Metrics
// ============================================================================

/// Record a best-effort side effect that failed and was swallowed
///
/// Metric: `auth_side_effect_failures_total`
/// Labels: `operation` (register_active, pair, record_login, unregister_active,
/// lookup_refresh, blacklist_refresh, unpair)
///
/// A sustained non-zero rate means revocation bookkeeping is degraded.
pub fn record_side_effect_failure(operation: &str) {
    counter!("auth_side_effect_failures_total", "operation" => operation.to_string()).increment(1);
}

/// Record a domain event publish
///
/// Metric: `auth_events_published_total`
/// Labels: `topic`, `status`
pub fn record_event_published(topic: &str, status: &str) {
    counter!("auth_events_published_total", "topic" => topic.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Store Metrics
// ============================================================================

/// Record a key-value store round-trip
///
/// Metric: `auth_store_operations_total`, `auth_store_operation_duration_seconds`
/// Labels: `operation`, `status`
pub fn record_store_operation(operation: &str, status: &str, duration: Duration) {
    histogram!("auth_store_operation_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_store_operations_total", "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}
