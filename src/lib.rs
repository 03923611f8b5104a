// ============================================================================
// Pilotes Orders - Order lifecycle and query engine
// ============================================================================
//
// Layout:
// - config    - Startup configuration (environment) and core order settings
// - domain/   - Order entity, pricing, lifecycle manager and search engine
// - store/    - OrderStore abstraction with in-memory and Postgres backends
// - metrics/  - Prometheus metrics and the /metrics HTTP endpoint
// - utils/    - Clock and retry helpers
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod metrics;
pub mod store;
pub mod utils;
