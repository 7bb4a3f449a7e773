//! Ladder construction — descending price levels from a start to a floor.

use crate::domain::{Ladder, LadderWarning, StepRule};
use crate::round::round_cents;

/// Build the descending price ladder from `start_price` down to
/// `floor_price`.
///
/// Precondition violations degrade instead of failing:
/// - `start_price <= floor_price` → single-level ladder `[start]` with an
///   [`LadderWarning::InvertedRange`] warning.
/// - non-positive step magnitude → two-level ladder `[start, floor]` with a
///   [`LadderWarning::NonPositiveStep`] warning.
///
/// On the normal path the floor price is always the exact last level: the
/// first computed value at or below the floor is replaced by the floor,
/// never emitted. Levels are cent-rounded at emission only; intermediate
/// arithmetic stays unrounded, so rounding error does not compound across
/// steps. Termination is guaranteed by strict monotonic decrease toward
/// the floor.
pub fn build_ladder(start_price: f64, floor_price: f64, step: StepRule) -> Ladder {
    if start_price <= floor_price {
        return Ladder::new(
            vec![round_cents(start_price)],
            vec![LadderWarning::InvertedRange],
        );
    }
    if !step.is_positive() {
        return Ladder::new(
            emit(vec![start_price, floor_price]),
            vec![LadderWarning::NonPositiveStep],
        );
    }

    let mut raw = vec![start_price];
    let mut current = start_price;
    loop {
        let next = step.next_below(current);
        if next <= floor_price {
            break;
        }
        raw.push(next);
        current = next;
    }
    raw.push(floor_price);

    Ladder::new(emit(raw), Vec::new())
}

/// Round the raw sequence to cents and collapse consecutive duplicates, so
/// the emitted ladder stays strictly decreasing. Duplicates can only arise
/// from sub-cent steps or a raw value within half a cent of the floor.
fn emit(raw: Vec<f64>) -> Vec<f64> {
    let mut prices: Vec<f64> = raw.into_iter().map(round_cents).collect();
    prices.dedup();
    prices
}
