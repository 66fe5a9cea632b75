use crate::errors::{CalcError, CalcResult};
use crate::math;
use crate::strategy::payoff::{self, total_pl};
use crate::types::OptionLeg;

/// Half-width of the coarse scan as a fraction of the center price.
const DEFAULT_PRICE_RANGE: f64 = 1.0;

/// Target root precision, in dollars.
const DEFAULT_PRECISION: f64 = 0.01;

/// Coarse scan step, in dollars.
const SCAN_STEP: f64 = 0.10;

/// Half-width of the focused re-scan window around each strategic point.
const KINK_WINDOW: f64 = 5.0;

const MAX_BISECTION_ITERATIONS: u32 = 100;

/// All stock prices where aggregate expiration P/L crosses zero, sorted
/// ascending and rounded to cents.
///
/// Two passes: a fixed-step scan over the whole interval, then tighter
/// windows around every strategic price point. The curve is piecewise
/// linear with kinks exactly at strikes, and a uniform step can straddle
/// a crossing at a kink without seeing a sign change.
pub fn find_break_evens(
    legs: &[OptionLeg],
    center: f64,
    price_range: Option<f64>,
    precision: Option<f64>,
) -> CalcResult<Vec<f64>> {
    if legs.is_empty() {
        return Err(CalcError::InvalidInput("at least one leg is required".into()));
    }
    if !(center > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "center price must be positive, got {center}"
        )));
    }
    let range = price_range.unwrap_or(DEFAULT_PRICE_RANGE);
    let precision = precision.unwrap_or(DEFAULT_PRECISION);
    if !(range > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "price range must be positive, got {range}"
        )));
    }
    if !(precision > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "precision must be positive, got {precision}"
        )));
    }

    // A single option has a closed-form break-even.
    if legs.len() == 1 {
        let leg = &legs[0];
        let be = payoff::single_leg_break_even(leg.option_type, leg.strike, leg.premium);
        return Ok(if be > 0.0 {
            vec![math::round_cents(be)]
        } else {
            Vec::new()
        });
    }

    let lo = (center * (1.0 - range)).max(0.0);
    let hi = center * (1.0 + range);
    let dedup_tol = precision * 10.0;

    let mut found: Vec<f64> = Vec::new();
    scan_interval(legs, lo, hi, SCAN_STEP, precision, dedup_tol, &mut found)?;

    for point in payoff::strategic_price_points(center, legs) {
        let wlo = (point - KINK_WINDOW).max(0.0);
        let whi = point + KINK_WINDOW;
        scan_interval(legs, wlo, whi, precision, precision, dedup_tol, &mut found)?;
    }

    found.sort_by(|a, b| a.total_cmp(b));
    tracing::debug!(count = found.len(), "break-even search complete");
    Ok(found)
}

/// Walk `[lo, hi]` in `step` increments; refine each sign change by
/// bisection and merge near-duplicates into `found`.
fn scan_interval(
    legs: &[OptionLeg],
    lo: f64,
    hi: f64,
    step: f64,
    precision: f64,
    dedup_tol: f64,
    found: &mut Vec<f64>,
) -> CalcResult<()> {
    if hi <= lo {
        return Ok(());
    }

    let mut prev_price = lo;
    let mut prev_pl = total_pl(legs, lo);
    let mut next = lo + step;

    while prev_price < hi {
        let price = next.min(hi);
        let pl = total_pl(legs, price);

        // An exact-zero endpoint counts only where the curve leaves zero,
        // so a flat zero-P/L plateau contributes its edges, not every
        // grid point inside it.
        if prev_pl == 0.0 && pl != 0.0 {
            push_dedup(found, math::round_cents(prev_price), dedup_tol);
        } else if pl == 0.0 && prev_pl != 0.0 {
            push_dedup(found, math::round_cents(price), dedup_tol);
        } else if prev_pl != 0.0 && pl != 0.0 && (prev_pl < 0.0) != (pl < 0.0) {
            let be = bisect(legs, prev_price, price, precision)?;
            push_dedup(found, math::round_cents(be), dedup_tol);
        }

        prev_price = price;
        prev_pl = pl;
        next += step;
    }
    Ok(())
}

/// Halve the bracket until it is narrower than `precision`, keeping the
/// sign change inside.
fn bisect(legs: &[OptionLeg], mut lo: f64, mut hi: f64, precision: f64) -> CalcResult<f64> {
    let mut lo_pl = total_pl(legs, lo);

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if hi - lo < precision {
            return Ok(mid);
        }

        let mid_pl = total_pl(legs, mid);
        if mid_pl == 0.0 {
            return Ok(mid);
        }

        if (mid_pl < 0.0) == (lo_pl < 0.0) {
            lo = mid;
            lo_pl = mid_pl;
        } else {
            hi = mid;
        }
    }

    Err(CalcError::NumericalInstability(format!(
        "bisection exceeded {MAX_BISECTION_ITERATIONS} iterations in [{lo}, {hi}]"
    )))
}

fn push_dedup(found: &mut Vec<f64>, be: f64, tol: f64) {
    if !found.iter().any(|&x| (x - be).abs() < tol) {
        found.push(be);
    }
}
