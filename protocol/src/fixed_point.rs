//! # 18-Decimal Fixed-Point Arithmetic
//!
//! Every share ratio in the vault is an unsigned integer scaled by `10^18`.
//! The two operations the engine needs are
//!
//! ```text
//! mul(a, b) = a * b / 10^18
//! div(a, b) = a * 10^18 / b
//! ```
//!
//! each with an explicit [`Rounding`] direction. Products are formed in a
//! 256-bit intermediate so `a * b` never wraps; only a quotient that does
//! not fit back into `u128` is an error.
//!
//! Rounding always favors the vault: shares handed out are rounded down,
//! assets demanded and shares burned are rounded up. A deposit followed by
//! an immediate withdrawal at the same ratio therefore can never return
//! more than was put in.

use thiserror::Error;
use uint::construct_uint;

use crate::config::FIXED_POINT_ONE;

construct_uint! {
    /// 256-bit unsigned integer used for intermediate products.
    pub struct U256(4);
}

/// Errors from fixed-point operations. Never clamped, never wrapped.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MathError {
    /// Division with a zero denominator.
    #[error("division by zero")]
    DivisionByZero,

    /// The result does not fit in a `u128`.
    #[error("fixed-point overflow")]
    Overflow,
}

/// Direction to round a quotient that is not exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero.
    Down,
    /// Away from zero.
    Up,
}

/// Computes `a * b / denominator` with the requested rounding.
///
/// # Errors
///
/// [`MathError::DivisionByZero`] if `denominator == 0`,
/// [`MathError::Overflow`] if the quotient exceeds `u128::MAX`.
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }

    let product = U256::from(a) * U256::from(b);
    let denominator = U256::from(denominator);
    let mut quotient = product / denominator;

    if rounding == Rounding::Up && !(product % denominator).is_zero() {
        quotient = quotient + U256::one();
    }

    if quotient > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(quotient.low_u128())
}

/// `a * b / 10^18`.
pub fn mul(a: u128, b: u128, rounding: Rounding) -> Result<u128, MathError> {
    mul_div(a, b, FIXED_POINT_ONE, rounding)
}

/// `a * 10^18 / b`.
///
/// # Errors
///
/// [`MathError::DivisionByZero`] when `b == 0`.
pub fn div(a: u128, b: u128, rounding: Rounding) -> Result<u128, MathError> {
    mul_div(a, FIXED_POINT_ONE, b, rounding)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u128 = FIXED_POINT_ONE;

    #[test]
    fn mul_by_one_is_identity() {
        assert_eq!(mul(1000, ONE, Rounding::Down).unwrap(), 1000);
        assert_eq!(mul(1000, ONE, Rounding::Up).unwrap(), 1000);
    }

    #[test]
    fn div_by_one_is_identity() {
        assert_eq!(div(1000, ONE, Rounding::Down).unwrap(), 1000);
    }

    #[test]
    fn mul_rounds_per_mode() {
        // 10 * 0.15 = 1.5
        let ratio = 150_000_000_000_000_000;
        assert_eq!(mul(10, ratio, Rounding::Down).unwrap(), 1);
        assert_eq!(mul(10, ratio, Rounding::Up).unwrap(), 2);
    }

    #[test]
    fn div_rounds_per_mode() {
        // 10 / 3 = 3.33..
        let three = 3 * ONE;
        assert_eq!(div(10, three, Rounding::Down).unwrap(), 3);
        assert_eq!(div(10, three, Rounding::Up).unwrap(), 4);
    }

    #[test]
    fn exact_results_do_not_round_up() {
        assert_eq!(mul(4, 2 * ONE, Rounding::Up).unwrap(), 8);
        assert_eq!(div(8, 2 * ONE, Rounding::Up).unwrap(), 4);
    }

    #[test]
    fn div_by_zero_fails() {
        assert_eq!(div(1, 0, Rounding::Down), Err(MathError::DivisionByZero));
        assert_eq!(mul_div(1, 1, 0, Rounding::Up), Err(MathError::DivisionByZero));
    }

    #[test]
    fn large_products_use_wide_intermediate() {
        // u128::MAX * 1e18 overflows u128 but the quotient fits.
        assert_eq!(mul(u128::MAX, ONE, Rounding::Down).unwrap(), u128::MAX);
    }

    #[test]
    fn quotient_overflow_fails() {
        assert_eq!(mul(u128::MAX, 2 * ONE, Rounding::Down), Err(MathError::Overflow));
        assert_eq!(div(u128::MAX, ONE / 2, Rounding::Down), Err(MathError::Overflow));
    }

    #[test]
    fn zero_numerator_is_zero_in_both_modes() {
        assert_eq!(mul(0, 5 * ONE, Rounding::Up).unwrap(), 0);
        assert_eq!(div(0, 5 * ONE, Rounding::Up).unwrap(), 0);
    }
}
