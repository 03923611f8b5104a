use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Store-assigned order identifier.
pub type OrderId = Uuid;

/// Number of pilotes in an order. Only 5, 10 or 15 are sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pilotes(i32);

impl Pilotes {
    pub const ALLOWED: [i32; 3] = [5, 10, 15];
    pub const LARGEST: i32 = 15;

    pub fn new(count: i32) -> Result<Self, OrderError> {
        if Self::ALLOWED.contains(&count) {
            Ok(Self(count))
        } else {
            Err(OrderError::Validation(format!(
                "pilotes: must be either 5, 10, or 15, got {}",
                count
            )))
        }
    }

    pub fn count(self) -> i32 {
        self.0
    }
}

/// Render an amount in cents as a two-decimal string, e.g. 1250 -> "12.50".
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// ============================================================================
// Unit Tests
// ============================================================================
