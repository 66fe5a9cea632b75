use crate::config::EngineConfig;
use crate::errors::CalcResult;
use crate::heatmap::{self, HeatmapRequest};
use crate::math;
use crate::pricing::greeks;
use crate::strategy::{breakeven, classify, payoff};
use crate::types::{
    CalculationInputs, CalculationResults, LegBreakdown, PayoffCurve, CONTRACT_MULTIPLIER,
};
use crate::validate;

/// Run one full analysis pass over an input snapshot.
///
/// Deterministic and stateless: identical inputs produce identical
/// results, and nothing survives the call.
pub fn analyze(inputs: &CalculationInputs, config: &EngineConfig) -> CalcResult<CalculationResults> {
    validate::assert_valid_inputs(inputs)?;
    for w in validate::validate_strategy_consistency(inputs) {
        tracing::warn!(field = %w.field, "{}", w.message);
    }

    let legs = &inputs.legs[..];
    let spot = inputs.stock_price;
    let vol = inputs.volatility.unwrap_or(config.default_volatility);
    let rate = inputs.risk_free_rate.unwrap_or(config.default_rate);
    let div = inputs
        .dividend_yield
        .unwrap_or(config.default_dividend_yield);
    let range = inputs.price_range.unwrap_or(config.default_price_range);
    let points = inputs.chart_points.unwrap_or(config.default_chart_points);

    let strategy = classify::detect_strategy(legs, inputs.stock.is_some());
    let cost = payoff::initial_cost(legs);

    let leg_rows: Vec<LegBreakdown> = legs
        .iter()
        .map(|leg| {
            let premium_flow =
                -leg.position.sign() * leg.premium * CONTRACT_MULTIPLIER * leg.quantity as f64;
            LegBreakdown {
                leg_id: leg.id.clone(),
                intrinsic_value: math::round_cents(leg.option_type.intrinsic(spot, leg.strike)),
                pl_at_expiry: math::round_cents(payoff::leg_pl_at_expiry(leg, spot) + premium_flow),
            }
        })
        .collect();

    let break_even_points = breakeven::find_break_evens(legs, spot, None, Some(config.precision))?;

    let (prices, pl_at_expiry) = payoff::payoff_curve(legs, spot, range, points);
    let pl_current = prices
        .iter()
        .map(|&p| {
            heatmap::position_pl(legs, p, inputs.valuation_date, rate, div, vol)
                .map(math::round_cents)
        })
        .collect::<CalcResult<Vec<f64>>>()?;

    let heatmap_data = heatmap::generate_heatmap(
        legs,
        &HeatmapRequest {
            spot,
            rate,
            volatility: vol,
            dividend_yield: div,
            valuation_date: inputs.valuation_date,
            price_range: range,
            price_steps: config.heatmap_price_steps,
            date_steps: config.heatmap_date_steps,
            min_price: None,
            max_price: None,
        },
    )?;

    let position_greeks =
        greeks::position_greeks(legs, spot, rate, div, vol, inputs.valuation_date)?;

    Ok(CalculationResults {
        strategy,
        initial_cost: math::round_cents(cost),
        max_profit: payoff::max_profit(legs, spot),
        max_loss: payoff::max_loss(legs, spot),
        break_even_points,
        legs: leg_rows,
        position_greeks,
        chart: PayoffCurve {
            prices,
            pl_at_expiry,
            pl_current,
        },
        heatmap: heatmap_data,
    })
}
