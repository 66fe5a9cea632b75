use crate::math;
use crate::types::{OptionLeg, OptionType, CONTRACT_MULTIPLIER};
use smallvec::SmallVec;

/// Expiration payoff machinery for multi-leg positions.
///
/// `total_pl` is the function the break-even finder roots thousands of
/// times per request; it stays O(legs) with no allocation.

/// Payoff if exercised at `spot`.
#[inline]
pub fn intrinsic_value(option_type: OptionType, spot: f64, strike: f64) -> f64 {
    option_type.intrinsic(spot, strike)
}

/// Expiration value of one leg at a hypothetical stock price: intrinsic
/// scaled by contract multiplier and quantity, signed by position. The
/// premium is not included here; `initial_cost` carries it once.
#[inline]
pub fn leg_pl_at_expiry(leg: &OptionLeg, spot: f64) -> f64 {
    leg.position.sign()
        * leg.option_type.intrinsic(spot, leg.strike)
        * CONTRACT_MULTIPLIER
        * leg.quantity as f64
}

/// Analytical break-even for a single option: strike plus premium for a
/// call, strike minus premium for a put.
#[inline]
pub fn single_leg_break_even(option_type: OptionType, strike: f64, premium: f64) -> f64 {
    match option_type {
        OptionType::Call => strike + premium,
        OptionType::Put => strike - premium,
    }
}

/// Net cash flow at entry: negative = debit, positive = credit.
pub fn initial_cost(legs: &[OptionLeg]) -> f64 {
    legs.iter()
        .map(|leg| -leg.position.sign() * leg.premium * CONTRACT_MULTIPLIER * leg.quantity as f64)
        .sum()
}

/// Aggregate expiration P/L at a hypothetical stock price.
#[inline]
pub fn total_pl(legs: &[OptionLeg], price: f64) -> f64 {
    let mut pl = initial_cost(legs);
    for leg in legs {
        pl += leg_pl_at_expiry(leg, price);
    }
    pl
}

/// Prices where the piecewise-linear expiration P/L can kink: every
/// distinct strike plus the given center, sorted ascending.
pub fn strategic_price_points(center: f64, legs: &[OptionLeg]) -> SmallVec<[f64; 16]> {
    let mut points: SmallVec<[f64; 16]> = SmallVec::new();
    points.push(center);
    for leg in legs {
        if !points.iter().any(|&p| (p - leg.strike).abs() < 1e-9) {
            points.push(leg.strike);
        }
    }
    points.sort_by(|a, b| a.total_cmp(b));
    points
}

/// Slope of the expiration P/L above the highest strike, in dollars of
/// P/L per dollar of stock price. Only calls contribute up there.
fn upper_slope(legs: &[OptionLeg]) -> f64 {
    legs.iter()
        .filter(|l| l.option_type == OptionType::Call)
        .map(|l| l.position.sign() * CONTRACT_MULTIPLIER * l.quantity as f64)
        .sum()
}

/// Supremum of expiration P/L over all non-negative prices, or None when
/// the upper tail rises without bound.
///
/// The curve is piecewise linear with kinks only at strikes, so the
/// extremes over the bounded region live at price zero or at a strategic
/// point; the tail toward infinity is decided by the net call slope.
pub fn max_profit(legs: &[OptionLeg], center: f64) -> Option<f64> {
    if upper_slope(legs) > 0.0 {
        return None;
    }
    let mut best = total_pl(legs, 0.0);
    for p in strategic_price_points(center, legs) {
        best = best.max(total_pl(legs, p));
    }
    Some(math::round_cents(best))
}

/// Infimum of expiration P/L, or None when the loss deepens without bound
/// as the price rises.
pub fn max_loss(legs: &[OptionLeg], center: f64) -> Option<f64> {
    if upper_slope(legs) < 0.0 {
        return None;
    }
    let mut worst = total_pl(legs, 0.0);
    for p in strategic_price_points(center, legs) {
        worst = worst.min(total_pl(legs, p));
    }
    Some(math::round_cents(worst))
}

/// Evenly spaced expiration P/L samples across `center*(1-range)` to
/// `center*(1+range)`, for charting.
pub fn payoff_curve(
    legs: &[OptionLeg],
    center: f64,
    range: f64,
    points: usize,
) -> (Vec<f64>, Vec<f64>) {
    let n = points.max(2);
    let lo = (center * (1.0 - range)).max(0.0);
    let hi = center * (1.0 + range);
    let step = (hi - lo) / (n - 1) as f64;

    let mut prices = Vec::with_capacity(n);
    let mut pl = Vec::with_capacity(n);
    for i in 0..n {
        let p = lo + i as f64 * step;
        prices.push(math::round_cents(p));
        pl.push(math::round_cents(total_pl(legs, p)));
    }
    (prices, pl)
}
