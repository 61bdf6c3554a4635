// SPDX-License-Identifier: MIT

pub mod balances;
pub mod classify;
pub mod consolidate;
pub mod context;
pub mod guard;
pub mod orchestrator;
pub mod plan;

pub use context::RunContext;
pub use guard::PriceValidationGuard;
pub use orchestrator::{VacuumOrchestrator, VacuumRunSettings};
pub use plan::{BatchPlan, BatchTransactionBuilder};
