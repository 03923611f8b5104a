// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Pure order logic plus the two orchestrators (lifecycle, search). Storage is
// reached only through the OrderStore trait in crate::store.
//
// ============================================================================

pub mod order;
