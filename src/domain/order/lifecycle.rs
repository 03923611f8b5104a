use std::sync::Arc;
use std::time::Instant;

use crate::config::OrderConfig;
use crate::metrics::Metrics;
use crate::store::{OrderStore, SwapOutcome};
use crate::utils::{Clock, SystemClock};

use super::aggregate::{NewOrder, Order};
use super::commands::{PlaceOrder, UpdateOrder};
use super::errors::OrderError;
use super::pricing::PricingPolicy;
use super::value_objects::OrderId;

// ============================================================================
// Order Lifecycle Manager
// ============================================================================
//
// Orchestrates: Command → validation → Order → OrderStore
//
// Updates are optimistic: the version read by the fetch is the expected value
// of the store's compare-and-swap. A lost race is reported as Conflict and is
// never retried here.
//
// ============================================================================

pub struct OrderLifecycleManager {
    store: Arc<dyn OrderStore>,
    pricing: PricingPolicy,
    update_window: chrono::Duration,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<Metrics>>,
}

impl OrderLifecycleManager {
    pub fn new(store: Arc<dyn OrderStore>, config: OrderConfig) -> Self {
        Self {
            store,
            pricing: PricingPolicy::new(config.unit_price_in_cents()),
            update_window: config.update_window(),
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    pub async fn place_order(&self, command: PlaceOrder) -> Result<OrderId, OrderError> {
        let started = Instant::now();

        let result = self.apply_place(command).await;

        match &result {
            Ok(order) => tracing::info!(
                order_id = %order.id,
                pilotes = order.pilotes,
                total_price = order.total_price,
                "✅ Order placed"
            ),
            Err(OrderError::Internal(e)) => tracing::error!(error = %e, "Failed to insert order"),
            Err(e) => tracing::warn!(outcome = e.kind(), error = %e, "Order rejected"),
        }

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "placed",
                Err(e) => e.kind(),
            };
            metrics.record_placement(outcome, started.elapsed().as_secs_f64());
        }

        result.map(|order| order.id)
    }

    async fn apply_place(&self, command: PlaceOrder) -> Result<Order, OrderError> {
        let pilotes = command.details.validate()?;

        let new_order = NewOrder::place(command.details, pilotes, &self.pricing, self.clock.now());
        Ok(self.store.insert(new_order).await?)
    }

    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.store
            .fetch(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Replace the customer fields and quantity of an order while its update
    /// window is open. Returns the persisted record.
    pub async fn update_order(&self, command: UpdateOrder) -> Result<Order, OrderError> {
        let started = Instant::now();
        let order_id = command.order_id;

        let result = self.apply_update(command).await;

        match &result {
            Ok(order) => tracing::info!(
                order_id = %order_id,
                version = order.version,
                "✅ Order updated"
            ),
            Err(OrderError::Internal(e)) => tracing::error!(
                order_id = %order_id,
                error = %e,
                "Order update failed"
            ),
            Err(e) => tracing::warn!(
                order_id = %order_id,
                outcome = e.kind(),
                error = %e,
                "Order update rejected"
            ),
        }

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "applied",
                Err(e) => e.kind(),
            };
            metrics.record_update(outcome, started.elapsed().as_secs_f64());
        }

        result
    }

    async fn apply_update(&self, command: UpdateOrder) -> Result<Order, OrderError> {
        let pilotes = command.details.validate()?;

        let current = self.get_order(command.order_id).await?;

        let now = self.clock.now();
        if let Some(deadline) = current.update_deadline(self.update_window) {
            if now >= deadline {
                return Err(OrderError::WindowExpired {
                    order_id: current.id,
                    deadline,
                });
            }
        }

        let revised = current.revise(command.details, pilotes, &self.pricing, now);

        match self.store.compare_and_swap(&revised).await? {
            SwapOutcome::Swapped(persisted) => Ok(persisted),
            SwapOutcome::VersionMismatch => Err(OrderError::Conflict {
                order_id: current.id,
                expected_version: current.version,
            }),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
