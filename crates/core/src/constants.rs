use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Base currency used when neither the ledger nor the caller names one
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Decimal precision for reported metrics
pub const DECIMAL_PRECISION: u32 = 6;

/// Days per year used to annualize returns
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Day-count basis for XIRR year fractions
pub const XIRR_DAYS_PER_YEAR: f64 = 365.0;

/// Newton-Raphson starting guess for XIRR
pub const XIRR_INITIAL_GUESS: f64 = 0.10;

/// Newton-Raphson stopping tolerance on the step size
pub const XIRR_TOLERANCE: f64 = 1e-6;

/// Newton-Raphson iteration cap
pub const XIRR_MAX_ITERATIONS: u32 = 100;

/// Quantity below which a position counts as closed
pub const QUANTITY_THRESHOLD: Decimal = dec!(0.00000001);
