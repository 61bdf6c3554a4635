// SPDX-License-Identifier: MIT
#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use infrastructure::aggregator;
pub use infrastructure::ledger;
pub use services::pool;
pub use services::vacuum;
