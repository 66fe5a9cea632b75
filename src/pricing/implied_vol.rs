use crate::errors::{CalcError, CalcResult};
use crate::math;
use crate::pricing::black_scholes::black_scholes;
use crate::types::{BlackScholesParams, OptionType};

/// Newton-Raphson implied volatility with a bisection fallback for the
/// flat-vega and out-of-bounds cases.
const MAX_NEWTON_ITERATIONS: usize = 100;
const MAX_BISECTION_ITERATIONS: usize = 100;
const PRICE_TOLERANCE: f64 = 1e-8;
const VOL_LOW: f64 = 0.001;
const VOL_HIGH: f64 = 5.0;

/// Back out the volatility that reproduces `market_price`.
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    time: f64,
    option_type: OptionType,
) -> CalcResult<f64> {
    if !(market_price > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "option price must be positive, got {market_price}"
        )));
    }
    if !(time > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "time to expiry must be positive, got {time}"
        )));
    }
    if !(spot > 0.0) || !(strike > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "spot and strike must be positive, got spot={spot} strike={strike}"
        )));
    }

    // A price below discounted intrinsic has no volatility that explains it.
    let intrinsic = option_type.intrinsic(spot, strike);
    let df = (-rate * time).exp();
    if market_price < intrinsic * df * 0.99 {
        return Err(CalcError::InvalidInput(format!(
            "price {market_price} is below discounted intrinsic {}",
            intrinsic * df
        )));
    }

    let params = |vol: f64| BlackScholesParams {
        option_type,
        spot,
        strike,
        time_to_expiry: time,
        rate,
        dividend_yield,
        volatility: vol,
    };

    // Brenner-Subrahmanyam starting point.
    let mut vol = (market_price / (0.4 * spot * time.sqrt())).clamp(0.01, 3.0);

    for _ in 0..MAX_NEWTON_ITERATIONS {
        let price = black_scholes(&params(vol))?.price;
        let diff = price - market_price;
        if diff.abs() < PRICE_TOLERANCE {
            return Ok(vol);
        }

        let d1 = math::d1(spot, strike, time, rate, dividend_yield, vol);
        let vega = spot * (-dividend_yield * time).exp() * math::norm_pdf(d1) * time.sqrt();
        if vega.abs() < 1e-12 {
            // Flat vega: the Newton step is unusable.
            break;
        }

        let next = vol - diff / vega;
        if next <= 0.0 || next > VOL_HIGH {
            break;
        }
        vol = next;
    }

    bisection_iv(market_price, &params)
}

fn bisection_iv(
    market_price: f64,
    params: &impl Fn(f64) -> BlackScholesParams,
) -> CalcResult<f64> {
    let mut low = VOL_LOW;
    let mut high = VOL_HIGH;

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = 0.5 * (low + high);
        let diff = black_scholes(&params(mid))?.price - market_price;

        if diff.abs() < PRICE_TOLERANCE || (high - low) < PRICE_TOLERANCE {
            return Ok(mid);
        }

        if diff > 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    Err(CalcError::NumericalInstability(format!(
        "implied volatility did not converge near price {market_price}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_atm() {
        let price = black_scholes(&BlackScholesParams {
            option_type: OptionType::Call,
            spot: 100.0,
            strike: 100.0,
            time_to_expiry: 0.5,
            rate: 0.05,
            dividend_yield: 0.0,
            volatility: 0.25,
        })
        .unwrap()
        .price;
        let iv = implied_volatility(price, 100.0, 100.0, 0.05, 0.0, 0.5, OptionType::Call).unwrap();
        assert!((iv - 0.25).abs() < 1e-4, "iv={iv}");
    }

    #[test]
    fn test_round_trip_otm_put() {
        let price = black_scholes(&BlackScholesParams {
            option_type: OptionType::Put,
            spot: 100.0,
            strike: 90.0,
            time_to_expiry: 0.25,
            rate: 0.05,
            dividend_yield: 0.01,
            volatility: 0.30,
        })
        .unwrap()
        .price;
        let iv = implied_volatility(price, 100.0, 90.0, 0.05, 0.01, 0.25, OptionType::Put).unwrap();
        assert!((iv - 0.30).abs() < 1e-3, "iv={iv}");
    }

    #[test]
    fn test_rejects_impossible_price() {
        // Deep ITM call offered below intrinsic.
        let err =
            implied_volatility(5.0, 150.0, 100.0, 0.05, 0.0, 0.5, OptionType::Call).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)), "got {err}");
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        assert!(implied_volatility(0.0, 100.0, 100.0, 0.05, 0.0, 0.5, OptionType::Call).is_err());
        assert!(implied_volatility(5.0, 100.0, 100.0, 0.05, 0.0, 0.0, OptionType::Call).is_err());
        assert!(implied_volatility(5.0, 0.0, 100.0, 0.05, 0.0, 0.5, OptionType::Call).is_err());
    }
}
