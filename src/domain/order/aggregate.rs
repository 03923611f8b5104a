use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::commands::OrderDetails;
use super::pricing::PricingPolicy;
use super::value_objects::{OrderId, Pilotes};

// ============================================================================
// Order - Central entity
// ============================================================================
//
// Invariants:
// 1. total_price == pilotes * unit price at the time of the last write
// 2. version starts at 1 and grows by exactly 1 per accepted write
// 3. id and created_at never change after insert
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: OrderId,
    pub version: i64,

    // Customer-visible state
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub pilotes: i32,
    pub total_price: i64,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order that has not been inserted yet; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub pilotes: i32,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn place(
        details: OrderDetails,
        pilotes: Pilotes,
        pricing: &PricingPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_first_name: details.first_name,
            customer_last_name: details.last_name,
            customer_phone: details.phone,
            delivery_address: details.delivery_address,
            pilotes: pilotes.count(),
            total_price: pricing.total_for(pilotes.count()),
            created_at: now,
        }
    }

    /// Materialize with the store-assigned id at version 1.
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            version: 1,
            customer_first_name: self.customer_first_name,
            customer_last_name: self.customer_last_name,
            customer_phone: self.customer_phone,
            delivery_address: self.delivery_address,
            pilotes: self.pilotes,
            total_price: self.total_price,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl Order {
    /// First instant at which the order is frozen, or `None` when that
    /// instant is past the last representable date and the order never freezes.
    pub fn update_deadline(&self, window: chrono::Duration) -> Option<DateTime<Utc>> {
        self.created_at.checked_add_signed(window)
    }

    pub fn is_editable_at(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        self.update_deadline(window)
            .map_or(true, |deadline| now < deadline)
    }

    /// Build the replacement record for an update.
    ///
    /// The version is left as read so the store can use it as the expected
    /// value of its compare-and-swap.
    pub fn revise(
        &self,
        details: OrderDetails,
        pilotes: Pilotes,
        pricing: &PricingPolicy,
        now: DateTime<Utc>,
    ) -> Order {
        Order {
            id: self.id,
            version: self.version,
            customer_first_name: details.first_name,
            customer_last_name: details.last_name,
            customer_phone: details.phone,
            delivery_address: details.delivery_address,
            pilotes: pilotes.count(),
            total_price: pricing.total_for(pilotes.count()),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn details(first_name: &str, pilotes: i32) -> OrderDetails {
        OrderDetails {
            first_name: first_name.to_string(),
            last_name: "Wazowski".to_string(),
            phone: "5551234567".to_string(),
            delivery_address: "1 Monster Alley".to_string(),
            pilotes,
        }
    }

    fn placed_at(now: DateTime<Utc>) -> Order {
        let d = details("Mike", 5);
        let pilotes = d.validate().unwrap();
        NewOrder::place(d, pilotes, &PricingPolicy::new(250), now).into_order(Uuid::now_v7())
    }

    #[test]
    fn test_placed_order_starts_at_version_one() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let order = placed_at(now);

        assert_eq!(order.version, 1);
        assert_eq!(order.total_price, 1250);
        assert_eq!(order.created_at, now);
        assert_eq!(order.updated_at, now);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let order = placed_at(t0);
        let window = Duration::seconds(2);

        assert!(order.is_editable_at(t0, window));
        assert!(order.is_editable_at(t0 + Duration::milliseconds(1999), window));
        assert!(!order.is_editable_at(t0 + window, window));
        assert!(!order.is_editable_at(t0 + Duration::seconds(3), window));
    }

    #[test]
    fn test_unrepresentable_deadline_never_freezes() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let order = placed_at(t0);
        let window = Duration::seconds(9_000_000_000_000);

        assert_eq!(order.update_deadline(window), None);
        assert!(order.is_editable_at(t0 + Duration::days(365 * 1000), window));
    }

    #[test]
    fn test_revise_keeps_identity_and_reprices() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let order = placed_at(t0);
        let later = t0 + Duration::seconds(1);

        let d = details("Sulley", 15);
        let pilotes = d.validate().unwrap();
        let revised = order.revise(d, pilotes, &PricingPolicy::new(250), later);

        assert_eq!(revised.id, order.id);
        assert_eq!(revised.version, order.version);
        assert_eq!(revised.created_at, t0);
        assert_eq!(revised.updated_at, later);
        assert_eq!(revised.customer_first_name, "Sulley");
        assert_eq!(revised.pilotes, 15);
        assert_eq!(revised.total_price, 3750);
    }
}
