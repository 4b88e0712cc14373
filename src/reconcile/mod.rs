//! Resolve-then-create reconciliation and best-effort teardown

pub mod context;
pub mod reconciler;
pub mod resolver;
pub mod teardown;

#[cfg(test)]
pub use context::HandleStatus;
pub use reconciler::Reconciler;
pub use teardown::TeardownCoordinator;
