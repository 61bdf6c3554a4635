// SPDX-License-Identifier: MIT

pub mod constants;
pub mod parsing;
pub mod retry;
