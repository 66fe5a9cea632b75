use crate::errors::{CalcError, CalcResult};
use crate::math;
use crate::pricing::black_scholes::black_scholes;
use crate::strategy::payoff;
use crate::types::{BlackScholesParams, HeatmapData, OptionLeg, CONTRACT_MULTIPLIER};
use chrono::{Duration, NaiveDate};

/// Grid sizing and market context for the P/L surface.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapRequest {
    pub spot: f64,
    pub rate: f64,
    /// Strategy-level volatility; per-leg overrides win.
    pub volatility: f64,
    pub dividend_yield: f64,
    pub valuation_date: NaiveDate,
    /// Symmetric band half-width as a fraction of spot. Ignored when an
    /// absolute [min_price, max_price] pair is supplied.
    pub price_range: f64,
    pub price_steps: usize,
    pub date_steps: usize,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Dense P/L matrix over price levels (descending) and dates from the
/// valuation date to the earliest leg expiry.
pub fn generate_heatmap(legs: &[OptionLeg], req: &HeatmapRequest) -> CalcResult<HeatmapData> {
    let earliest_expiry = match legs.iter().map(|l| l.expiry).min() {
        Some(d) => d,
        None => {
            return Err(CalcError::InvalidInput("at least one leg is required".into()));
        }
    };
    if !(req.spot > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "spot must be positive, got {}",
            req.spot
        )));
    }
    if req.price_steps < 2 || req.date_steps < 2 {
        return Err(CalcError::InvalidInput(format!(
            "grid needs at least 2 steps per axis, got {}x{}",
            req.price_steps, req.date_steps
        )));
    }
    if earliest_expiry <= req.valuation_date {
        return Err(CalcError::ExpiredOption(format!(
            "earliest expiry {earliest_expiry} is not after {}",
            req.valuation_date
        )));
    }

    // Price axis, descending.
    let (min_price, max_price) = match (req.min_price, req.max_price) {
        (Some(lo), Some(hi)) if lo >= 0.0 && hi > lo => (lo, hi),
        (Some(lo), Some(hi)) => {
            return Err(CalcError::InvalidInput(format!(
                "price bounds must satisfy 0 <= min < max, got [{lo}, {hi}]"
            )));
        }
        _ => {
            let band = req.spot * req.price_range;
            ((req.spot - band).max(0.0), req.spot + band)
        }
    };
    let dp = (max_price - min_price) / (req.price_steps - 1) as f64;
    let prices: Vec<f64> = (0..req.price_steps)
        .map(|i| math::round_cents(max_price - i as f64 * dp))
        .collect();

    // Date axis: stepped so at most `date_steps` columns come out, with
    // the exact expiry always the final column.
    let total_days = (earliest_expiry - req.valuation_date).num_days();
    let step_days = ((total_days as f64 / (req.date_steps - 1) as f64).ceil() as i64).max(1);
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(req.date_steps);
    let mut day = req.valuation_date;
    while day < earliest_expiry {
        dates.push(day);
        day = day + Duration::days(step_days);
    }
    dates.push(earliest_expiry);

    let mut values = Vec::with_capacity(prices.len());
    for &price in &prices {
        let mut row = Vec::with_capacity(dates.len());
        for &date in &dates {
            let pl = position_pl(
                legs,
                price,
                date,
                req.rate,
                req.dividend_yield,
                req.volatility,
            )?;
            row.push(math::round_cents(pl));
        }
        values.push(row);
    }

    tracing::debug!(
        prices = prices.len(),
        dates = dates.len(),
        "heatmap grid generated"
    );

    Ok(HeatmapData { prices, dates, values })
}

/// Time-aware P/L of the whole position at one price on one date. Legs
/// already expired by that date are worth intrinsic; live legs are marked
/// to the pricing model. A zero price level is valued as intrinsic too,
/// since a worthless underlying leaves nothing to diffuse.
pub fn position_pl(
    legs: &[OptionLeg],
    price: f64,
    date: NaiveDate,
    rate: f64,
    dividend_yield: f64,
    default_vol: f64,
) -> CalcResult<f64> {
    let mut pl = payoff::initial_cost(legs);
    for leg in legs {
        let t = math::year_fraction(leg.expiry, date);
        let value = if t <= 0.0 || price <= 0.0 {
            leg.option_type.intrinsic(price, leg.strike)
        } else {
            black_scholes(&BlackScholesParams {
                option_type: leg.option_type,
                spot: price,
                strike: leg.strike,
                time_to_expiry: t,
                rate,
                dividend_yield,
                volatility: leg.volatility.unwrap_or(default_vol),
            })?
            .price
        };
        pl += leg.position.sign() * value * CONTRACT_MULTIPLIER * leg.quantity as f64;
    }
    Ok(pl)
}

// ── Presentation helpers ──
// Not part of the numerical contract; they only preserve sign and
// relative magnitude for display layers.

const PROFIT_SHADES: [&str; 3] = ["#c8e6c9", "#81c784", "#2e7d32"];
const LOSS_SHADES: [&str; 3] = ["#ffcdd2", "#e57373", "#c62828"];
const NEUTRAL: &str = "#f5f5f5";

/// Background color bucket for a cell value, scaled by the grid's largest
/// absolute value.
pub fn pl_color(value: f64, max_abs: f64) -> &'static str {
    if max_abs <= 0.0 || value.abs() < 1e-9 {
        return NEUTRAL;
    }
    let intensity = (value.abs() / max_abs).clamp(0.0, 1.0);
    let idx = if intensity < 0.33 {
        0
    } else if intensity < 0.66 {
        1
    } else {
        2
    };
    if value > 0.0 {
        PROFIT_SHADES[idx]
    } else {
        LOSS_SHADES[idx]
    }
}

/// Readable text color for a cell background.
pub fn text_color(background: &str) -> &'static str {
    // Only the deepest shades need light text.
    if background == PROFIT_SHADES[2] || background == LOSS_SHADES[2] {
        "#ffffff"
    } else {
        "#000000"
    }
}
