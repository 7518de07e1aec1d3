//! End-to-end stack lifecycle tests through the `swstack` facade.

#[path = "../common/mod.rs"]
mod common;

mod history_invariants;
mod schema1_lifecycle;
mod schema2_lifecycle;
