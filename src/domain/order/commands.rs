use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::{OrderId, Pilotes};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Customer-supplied fields shared by placing and updating an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub delivery_address: String,
    pub pilotes: i32,
}

impl OrderDetails {
    /// Check field shapes and return the validated pilotes count.
    pub fn validate(&self) -> Result<Pilotes, OrderError> {
        let mut problems = Vec::new();

        if self.phone.len() != 10 || !self.phone.bytes().all(|b| b.is_ascii_digit()) {
            problems.push("phone: must be exactly 10 digits".to_string());
        }
        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("deliveryAddress", &self.delivery_address),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{}: must not be blank", field));
            }
        }

        let pilotes = match Pilotes::new(self.pilotes) {
            Ok(pilotes) => Some(pilotes),
            Err(OrderError::Validation(message)) => {
                problems.push(message);
                None
            }
            Err(other) => return Err(other),
        };

        match pilotes {
            Some(pilotes) if problems.is_empty() => Ok(pilotes),
            _ => Err(OrderError::Validation(problems.join(", "))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub details: OrderDetails,
}

#[derive(Debug, Clone)]
pub struct UpdateOrder {
    pub order_id: OrderId,
    pub details: OrderDetails,
}
