use chrono::{DateTime, Utc};

use crate::store::StoreError;
use super::value_objects::OrderId;

// ============================================================================
// Order Errors
// ============================================================================
//
// Closed set of failures returned by the lifecycle manager and the search
// engine. WindowExpired and Conflict are user-actionable and stay distinct
// from each other and from NotFound.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order not found with id: {0}")]
    NotFound(OrderId),

    #[error("Order update lifetime expired at {deadline}. Orders can only be changed within the update window after creation")]
    WindowExpired {
        order_id: OrderId,
        deadline: DateTime<Utc>,
    },

    #[error("Order {order_id} was modified by another request (expected version {expected_version}). Please refresh and try again")]
    Conflict {
        order_id: OrderId,
        expected_version: i64,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] StoreError),
}

impl OrderError {
    /// Short stable label, used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "invalid",
            OrderError::NotFound(_) => "not_found",
            OrderError::WindowExpired { .. } => "window_expired",
            OrderError::Conflict { .. } => "conflict",
            OrderError::Internal(_) => "internal",
        }
    }
}
