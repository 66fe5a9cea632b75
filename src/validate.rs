use crate::errors::{CalcError, CalcResult};
use crate::types::{CalculationInputs, MAX_LEGS};
use chrono::Duration;

/// Sanity ceiling on the underlying price and on strikes.
const MAX_PRICE: f64 = 1_000_000.0;

const MAX_QUANTITY: u32 = 10_000;
const MAX_VOLATILITY: f64 = 5.0;
const MAX_RATE: f64 = 1.0;
const MAX_EXPIRY_YEARS: f64 = 10.0;
const MIN_CHART_POINTS: usize = 10;
const MAX_CHART_POINTS: usize = 500;

/// Strikes closer than this (relative) are probably a typo.
const NEAR_STRIKE_TOLERANCE: f64 = 0.01;

/// One field-level problem, kept as data so a caller can show all of them
/// at once.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

/// Advisory finding from the consistency pass. Never blocks calculation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConsistencyWarning {
    pub field: String,
    pub message: String,
}

/// Structural and range validation. Collects every problem instead of
/// stopping at the first.
pub fn validate_inputs(inputs: &CalculationInputs) -> ValidationReport {
    let mut errors: Vec<FieldError> = Vec::new();
    let mut err = |field: &str, message: String| {
        errors.push(FieldError {
            field: field.to_string(),
            message,
        });
    };

    if !(inputs.stock_price > 0.0) {
        err(
            "stock_price",
            format!("must be positive, got {}", inputs.stock_price),
        );
    } else if inputs.stock_price > MAX_PRICE {
        err(
            "stock_price",
            format!("exceeds sanity ceiling {MAX_PRICE}, got {}", inputs.stock_price),
        );
    }

    if inputs.legs.is_empty() {
        err("legs", "at least one leg is required".to_string());
    } else if inputs.legs.len() > MAX_LEGS {
        err(
            "legs",
            format!("at most {MAX_LEGS} legs are supported, got {}", inputs.legs.len()),
        );
    }

    let horizon = inputs.valuation_date
        + Duration::days((MAX_EXPIRY_YEARS * crate::math::DAYS_PER_YEAR) as i64);
    for (i, leg) in inputs.legs.iter().enumerate() {
        if leg.id.is_empty() {
            err(&format!("legs[{i}].id"), "must not be empty".to_string());
        }
        if !(leg.strike > 0.0) {
            err(
                &format!("legs[{i}].strike"),
                format!("must be positive, got {}", leg.strike),
            );
        } else if leg.strike > MAX_PRICE {
            err(
                &format!("legs[{i}].strike"),
                format!("exceeds sanity ceiling {MAX_PRICE}, got {}", leg.strike),
            );
        }
        if !(leg.premium >= 0.0) {
            err(
                &format!("legs[{i}].premium"),
                format!("must be non-negative, got {}", leg.premium),
            );
        }
        if leg.quantity == 0 {
            err(&format!("legs[{i}].quantity"), "must be at least 1".to_string());
        } else if leg.quantity > MAX_QUANTITY {
            err(
                &format!("legs[{i}].quantity"),
                format!("exceeds sanity ceiling {MAX_QUANTITY}, got {}", leg.quantity),
            );
        }
        if leg.expiry <= inputs.valuation_date {
            err(
                &format!("legs[{i}].expiry"),
                format!("must be after the valuation date {}", inputs.valuation_date),
            );
        } else if leg.expiry > horizon {
            err(
                &format!("legs[{i}].expiry"),
                format!("more than {MAX_EXPIRY_YEARS} years past the valuation date"),
            );
        }
        if let Some(vol) = leg.volatility {
            if !(vol > 0.0 && vol <= MAX_VOLATILITY) {
                err(
                    &format!("legs[{i}].volatility"),
                    format!("must be in (0, {MAX_VOLATILITY}], got {vol}"),
                );
            }
        }
    }

    if let Some(vol) = inputs.volatility {
        if !(vol > 0.0 && vol <= MAX_VOLATILITY) {
            err("volatility", format!("must be in (0, {MAX_VOLATILITY}], got {vol}"));
        }
    }
    if let Some(rate) = inputs.risk_free_rate {
        if !(rate.abs() <= MAX_RATE) {
            err(
                "risk_free_rate",
                format!("magnitude must not exceed {MAX_RATE}, got {rate}"),
            );
        }
    }
    if let Some(div) = inputs.dividend_yield {
        if !(0.0..=1.0).contains(&div) {
            err("dividend_yield", format!("must be in [0, 1], got {div}"));
        }
    }
    if let Some(range) = inputs.price_range {
        if !(range > 0.0 && range <= 1.0) {
            err("price_range", format!("must be in (0, 1], got {range}"));
        }
    }
    if let Some(points) = inputs.chart_points {
        if !(MIN_CHART_POINTS..=MAX_CHART_POINTS).contains(&points) {
            err(
                "chart_points",
                format!("must be in [{MIN_CHART_POINTS}, {MAX_CHART_POINTS}], got {points}"),
            );
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Fail-fast entry point: one aggregated error summarizing every
/// violation.
pub fn assert_valid_inputs(inputs: &CalculationInputs) -> CalcResult<()> {
    let report = validate_inputs(inputs);
    if report.is_valid {
        return Ok(());
    }
    let summary = report
        .errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(CalcError::InvalidInput(summary))
}

/// Non-blocking consistency pass: flags structures that usually mean the
/// caller mistyped something, without marking the input invalid.
pub fn validate_strategy_consistency(inputs: &CalculationInputs) -> Vec<ConsistencyWarning> {
    let mut warnings: Vec<ConsistencyWarning> = Vec::new();
    let legs = &inputs.legs;

    for i in 0..legs.len() {
        for j in (i + 1)..legs.len() {
            if legs[i].id == legs[j].id {
                warnings.push(ConsistencyWarning {
                    field: format!("legs[{j}].id"),
                    message: format!("duplicate leg id {:?}", legs[j].id),
                });
            }
            let gap = (legs[i].strike - legs[j].strike).abs();
            let scale = legs[i].strike.max(legs[j].strike);
            if gap > 0.0 && gap <= NEAR_STRIKE_TOLERANCE * scale {
                warnings.push(ConsistencyWarning {
                    field: format!("legs[{j}].strike"),
                    message: format!(
                        "strike {} is within 1% of leg {i}'s strike {}",
                        legs[j].strike, legs[i].strike
                    ),
                });
            }
        }
    }

    if legs
        .iter()
        .any(|l| l.expiry != legs[0].expiry)
    {
        warnings.push(ConsistencyWarning {
            field: "legs".to_string(),
            message: "mixed expiries imply a calendar or diagonal structure".to_string(),
        });
    }

    warnings
}
