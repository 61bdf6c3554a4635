// SPDX-License-Identifier: MIT

pub mod aggregator;
pub mod ledger;
pub mod pricing;
