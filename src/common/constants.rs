// SPDX-License-Identifier: MIT

/// Canonical type tag of the reference asset all dust is swept into.
pub const REFERENCE_ASSET_TAG: &str = "0x2::sui::SUI";
pub const REFERENCE_ASSET_DECIMALS: u8 = 9;

/// Shared on-ledger clock object, passed to time-aware vault calls.
pub const CLOCK_OBJECT_ID: &str = "0x6";

/// Transfers to this address are unrecoverable; the ledger's burn idiom.
pub const BURN_SINK_ADDRESS: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Valuation window for pooled deposits, in USD. Anything above the
/// aggregate cap is not dust; anything below the floor is noise.
pub const MAX_DUST_VALUE_USD: f64 = 100.0;
pub const MIN_DUST_VALUE_USD: f64 = 0.001;

/// Shares are USD valuations scaled to integers.
pub const USD_SHARE_SCALE: u64 = 1_000_000;

/// Vault fee retained from each finalized round, in basis points.
pub const DEFAULT_FEE_BPS: u64 = 200;

pub const DEFAULT_DUST_THRESHOLD_USD: f64 = 1.0;
pub const DEFAULT_SLIPPAGE_BPS: u64 = 50;

/// Hard cap on assets folded into one atomic batch.
pub const MAX_ASSETS_PER_BATCH: usize = 20;

pub const DEFAULT_GAS_BUDGET: u64 = 100_000_000;

/// Route-resolution fan-out limits; the aggregator meters requests.
pub const DEFAULT_ROUTE_CONCURRENCY: usize = 4;
pub const DEFAULT_ROUTE_CALL_DELAY_MS: u64 = 100;
