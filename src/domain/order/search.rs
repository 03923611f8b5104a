use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;
use crate::store::{OrderPredicate, OrderQuery, OrderStore};

use super::aggregate::Order;
use super::errors::OrderError;
use super::value_objects::{format_cents, OrderId};

// ============================================================================
// Order Search Engine
// ============================================================================
//
// Sparse filter → list of predicates (ANDed) → bounded store scan → summaries.
// Results are ordered by order id, i.e. by creation time.
//
// ============================================================================

/// Optional search fields. Missing or blank fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl OrderFilter {
    pub fn predicates(&self) -> Vec<OrderPredicate> {
        let mut predicates = Vec::new();

        if let Some(phone) = supplied(&self.phone) {
            predicates.push(OrderPredicate::PhoneEquals(phone.to_string()));
        }
        if let Some(first_name) = supplied(&self.first_name) {
            predicates.push(OrderPredicate::FirstNameContains(first_name.to_string()));
        }
        if let Some(last_name) = supplied(&self.last_name) {
            predicates.push(OrderPredicate::LastNameContains(last_name.to_string()));
        }

        predicates
    }
}

fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-indexed page number
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.page < 1 {
            return Err(OrderError::Validation("page: must be at least 1".to_string()));
        }
        if self.limit < 1 {
            return Err(OrderError::Validation("limit: must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Zero-indexed offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Customer-visible view of an order returned by searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub pilotes: i32,
    pub total_price: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            customer_first_name: order.customer_first_name.clone(),
            customer_last_name: order.customer_last_name.clone(),
            customer_phone: order.customer_phone.clone(),
            delivery_address: order.delivery_address.clone(),
            pilotes: order.pilotes,
            total_price: format_cents(order.total_price),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

pub struct OrderSearchEngine {
    store: Arc<dyn OrderStore>,
    metrics: Option<Arc<Metrics>>,
}

impl OrderSearchEngine {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn search(
        &self,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<Page<OrderSummary>, OrderError> {
        let started = Instant::now();
        pagination.validate()?;

        let query = OrderQuery {
            predicates: filter.predicates(),
            offset: pagination.offset(),
            limit: u64::from(pagination.limit),
        };

        tracing::debug!(
            predicates = query.predicates.len(),
            page = pagination.page,
            limit = pagination.limit,
            "Searching orders"
        );

        let result = self.store.scan(&query).await.map_err(|e| {
            tracing::error!(error = %e, "Order search failed");
            OrderError::from(e)
        })?;

        let items: Vec<OrderSummary> = result.orders.iter().map(OrderSummary::from).collect();

        if let Some(metrics) = &self.metrics {
            metrics.record_search(items.len(), started.elapsed().as_secs_f64());
        }

        Ok(Page {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total_count: result.total_count,
            total_pages: result.total_count.div_ceil(u64::from(pagination.limit)),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
