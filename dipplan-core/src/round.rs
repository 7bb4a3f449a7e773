//! Cent rounding for emitted currency values.

/// Round a currency value to two decimal places (cent precision).
///
/// Applied at emission boundaries only. Intermediate arithmetic stays
/// unrounded, so rounding error is bounded per element rather than
/// compounding across a computation.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
