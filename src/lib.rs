//! Options-strategy analytics: closed-form pricing, multi-leg P/L
//! aggregation, strategy classification, break-even root finding, and a
//! price-by-date P/L surface.
//!
//! Every entry point is a pure, synchronous computation over one input
//! snapshot; no state survives a call. Callers supply every date and
//! market parameter explicitly, so identical inputs always produce
//! identical results.

pub mod config;
pub mod engine;
pub mod errors;
pub mod heatmap;
pub mod math;
pub mod pricing;
pub mod strategy;
pub mod types;
pub mod validate;

pub use config::EngineConfig;
pub use engine::analyze;
pub use errors::{CalcError, CalcResult};
pub use heatmap::{generate_heatmap, pl_color, position_pl, text_color, HeatmapRequest};
pub use pricing::black_scholes::{black_scholes, time_value, verify_put_call_parity};
pub use pricing::greeks::{greeks, position_greeks};
pub use pricing::implied_vol::implied_volatility;
pub use strategy::breakeven::find_break_evens;
pub use strategy::classify::detect_strategy;
pub use strategy::payoff::{
    initial_cost, intrinsic_value, leg_pl_at_expiry, max_loss, max_profit, payoff_curve,
    single_leg_break_even, strategic_price_points, total_pl,
};
pub use types::{
    BlackScholesParams, BlackScholesResult, CalculationInputs, CalculationRequest,
    CalculationResults, Greeks, HeatmapData, LegBreakdown, OptionLeg, OptionLegInput, OptionType,
    PayoffCurve, Position, StockLeg, StrategyDetection, StrategyType,
};
pub use validate::{
    assert_valid_inputs, validate_inputs, validate_strategy_consistency, ConsistencyWarning,
    FieldError, ValidationReport,
};
