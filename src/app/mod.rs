// SPDX-License-Identifier: MIT

pub mod config;
pub mod logging;

pub use config::GlobalSettings;
