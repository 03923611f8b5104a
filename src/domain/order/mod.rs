// ============================================================================
// Order Domain
// ============================================================================
//
// Everything specific to pilotes orders:
// - Value objects (OrderId, Pilotes, price formatting)
// - Commands (PlaceOrder, UpdateOrder) and their validation
// - Errors (OrderError)
// - The Order entity and its pure transitions
// - PricingPolicy
// - OrderLifecycleManager (place / update)
// - OrderSearchEngine (filtered, paginated retrieval)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod pricing;
pub mod lifecycle;
pub mod search;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use pricing::*;
pub use lifecycle::*;
pub use search::*;
