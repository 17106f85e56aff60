//! Global numerical constants.
//!
//! Kept in one module so tuning a constant does not require hunting
//! through the assembly code.

/// Local weights at or above this value disable the nonlocal pass for a
/// material group. A weight of exactly 1 is the pure local theory; values
/// in `[MAX_NONLOCAL_WEIGHT, 1]` are treated the same way because the
/// nonlocal contribution would be scaled by less than `1e-3` while still
/// paying the full quadruple-loop assembly cost.
pub const MAX_NONLOCAL_WEIGHT: f64 = 0.999;

/// Shape parameter of the cubic serendipity basis.
///
/// Higher-order serendipity bases go negative at corner nodes; the
/// parameter shifts mass between corner and edge functions. The default
/// recovers the classical 12-node cubic serendipity element.
pub const CUBIC_SERENDIPITY_P: f64 = -0.5;
