// SPDX-License-Identifier: MIT

pub mod pool;
pub mod vacuum;
