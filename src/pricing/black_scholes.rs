use crate::errors::{CalcError, CalcResult};
use crate::math;
use crate::types::{BlackScholesParams, BlackScholesResult, OptionType};

/// Volatility sanity ceiling (500%). Larger values are treated as
/// malformed input rather than priced.
pub(crate) const MAX_VOLATILITY: f64 = 5.0;

/// Rate magnitude ceiling (100%).
pub(crate) const MAX_RATE: f64 = 1.0;

/// Range checks shared by the pricer, the Greeks, and the implied-vol
/// solver. Negated comparisons also catch NaN.
pub(crate) fn validate(p: &BlackScholesParams) -> CalcResult<()> {
    if !(p.spot > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "spot must be positive, got {}",
            p.spot
        )));
    }
    if !(p.strike > 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "strike must be positive, got {}",
            p.strike
        )));
    }
    if !(p.time_to_expiry >= 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "time to expiry must be non-negative, got {}",
            p.time_to_expiry
        )));
    }
    if !(p.volatility >= 0.0 && p.volatility <= MAX_VOLATILITY) {
        return Err(CalcError::InvalidInput(format!(
            "volatility must be in [0, {MAX_VOLATILITY}], got {}",
            p.volatility
        )));
    }
    if !(p.rate.abs() <= MAX_RATE) {
        return Err(CalcError::InvalidInput(format!(
            "rate magnitude must not exceed {MAX_RATE}, got {}",
            p.rate
        )));
    }
    if !p.dividend_yield.is_finite() {
        return Err(CalcError::InvalidInput(format!(
            "dividend yield must be finite, got {}",
            p.dividend_yield
        )));
    }
    Ok(())
}

/// Theoretical European option price with d1/d2 attached.
///
/// Degenerate branches come before the closed form: an option valued at or
/// past expiry is worth intrinsic, and zero volatility collapses to the
/// discounted deterministic payoff.
pub fn black_scholes(params: &BlackScholesParams) -> CalcResult<BlackScholesResult> {
    validate(params)?;

    let BlackScholesParams {
        option_type,
        spot,
        strike,
        time_to_expiry: t,
        rate,
        dividend_yield: div,
        volatility: vol,
    } = *params;

    if t <= 0.0 {
        return Ok(BlackScholesResult {
            price: option_type.intrinsic(spot, strike),
            d1: 0.0,
            d2: 0.0,
        });
    }

    if vol == 0.0 {
        let discounted_strike = strike * (-rate * t).exp();
        let discounted_spot = spot * (-div * t).exp();
        let price = match option_type {
            OptionType::Call => (discounted_spot - discounted_strike).max(0.0),
            OptionType::Put => (discounted_strike - discounted_spot).max(0.0),
        };
        // A pricing boundary, not a usable sensitivity.
        let dir = if discounted_spot >= discounted_strike {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
        return Ok(BlackScholesResult { price, d1: dir, d2: dir });
    }

    let d1 = math::d1(spot, strike, t, rate, div, vol);
    let d2 = math::d2(d1, vol, t);
    if !d1.is_finite() || !d2.is_finite() {
        return Err(CalcError::CalculationFailed(format!(
            "non-finite d1/d2 for spot={spot} strike={strike} t={t} rate={rate} vol={vol}"
        )));
    }

    let df = (-rate * t).exp();
    let qf = (-div * t).exp();
    let price = match option_type {
        OptionType::Call => spot * qf * math::norm_cdf(d1) - strike * df * math::norm_cdf(d2),
        OptionType::Put => strike * df * math::norm_cdf(-d2) - spot * qf * math::norm_cdf(-d1),
    };
    if !price.is_finite() {
        return Err(CalcError::CalculationFailed(format!(
            "non-finite price for spot={spot} strike={strike} t={t} rate={rate} vol={vol}"
        )));
    }

    // Floating error can dip a deep-OTM price slightly below zero.
    Ok(BlackScholesResult {
        price: price.max(0.0),
        d1,
        d2,
    })
}

/// Extrinsic component of an option price.
#[inline]
pub fn time_value(price: f64, intrinsic: f64) -> f64 {
    (price - intrinsic).max(0.0)
}

/// Self-consistency check: C - P should equal S - K*exp(-rT) within
/// `tolerance`. Diagnostic only, never a gating validation.
pub fn verify_put_call_parity(
    call: f64,
    put: f64,
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    tolerance: f64,
) -> bool {
    let lhs = call - put;
    let rhs = spot - strike * (-rate * time).exp();
    (lhs - rhs).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(option_type: OptionType, spot: f64, strike: f64, t: f64, vol: f64) -> BlackScholesParams {
        BlackScholesParams {
            option_type,
            spot,
            strike,
            time_to_expiry: t,
            rate: 0.05,
            dividend_yield: 0.0,
            volatility: vol,
        }
    }

    #[test]
    fn test_atm_call_reference_price() {
        // S=K=100, T=1, r=5%, sigma=20%: canonical value ~10.45
        let r = black_scholes(&params(OptionType::Call, 100.0, 100.0, 1.0, 0.20)).unwrap();
        assert!(
            (r.price - 10.4506).abs() < 0.01,
            "ATM call price {} should be near 10.45",
            r.price
        );
    }

    #[test]
    fn test_put_call_parity_sweep() {
        for &spot in &[80.0, 95.0, 100.0, 110.0, 140.0] {
            for &t in &[0.1, 0.5, 1.0, 2.0] {
                for &vol in &[0.1, 0.3, 0.8] {
                    let call = black_scholes(&params(OptionType::Call, spot, 100.0, t, vol))
                        .unwrap()
                        .price;
                    let put = black_scholes(&params(OptionType::Put, spot, 100.0, t, vol))
                        .unwrap()
                        .price;
                    assert!(
                        verify_put_call_parity(call, put, spot, 100.0, t, 0.05, 0.01),
                        "parity violated at spot={spot} t={t} vol={vol}: C={call} P={put}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_expired_option_is_intrinsic() {
        let call = black_scholes(&params(OptionType::Call, 105.0, 100.0, 0.0, 0.20)).unwrap();
        assert_eq!(call.price, 5.0);
        assert_eq!(call.d1, 0.0);
        assert_eq!(call.d2, 0.0);

        let put = black_scholes(&params(OptionType::Put, 95.0, 100.0, 0.0, 0.95)).unwrap();
        assert_eq!(put.price, 5.0, "expiry value must not depend on volatility");
    }

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let r = black_scholes(&params(OptionType::Call, 110.0, 100.0, 1.0, 0.0)).unwrap();
        let expected = 110.0 - 100.0 * (-0.05_f64).exp();
        assert!((r.price - expected).abs() < 1e-12, "price={}", r.price);
        assert!(r.d1.is_infinite() && r.d1 > 0.0, "ITM direction, d1={}", r.d1);

        let otm = black_scholes(&params(OptionType::Call, 80.0, 100.0, 1.0, 0.0)).unwrap();
        assert_eq!(otm.price, 0.0);
        assert!(otm.d1.is_infinite() && otm.d1 < 0.0);
    }

    #[test]
    fn test_call_monotonic_in_spot() {
        let mut prev = 0.0;
        for i in 1..50 {
            let spot = 50.0 + 2.0 * i as f64;
            let p = black_scholes(&params(OptionType::Call, spot, 100.0, 0.5, 0.25))
                .unwrap()
                .price;
            assert!(p >= prev, "call price must not decrease in spot: {p} < {prev}");
            prev = p;
        }
    }

    #[test]
    fn test_rejects_out_of_range_inputs() {
        for bad in [
            params(OptionType::Call, 0.0, 100.0, 1.0, 0.2),
            params(OptionType::Call, 100.0, -5.0, 1.0, 0.2),
            params(OptionType::Call, 100.0, 100.0, -0.1, 0.2),
            params(OptionType::Call, 100.0, 100.0, 1.0, -0.2),
            params(OptionType::Call, 100.0, 100.0, 1.0, 5.5),
        ] {
            let err = black_scholes(&bad).unwrap_err();
            assert!(matches!(err, CalcError::InvalidInput(_)), "got {err}");
        }

        let mut bad_rate = params(OptionType::Put, 100.0, 100.0, 1.0, 0.2);
        bad_rate.rate = 1.5;
        assert!(black_scholes(&bad_rate).is_err());
    }

    #[test]
    fn test_price_never_negative() {
        // Deep OTM, short dated: the closed form lands within float noise of 0.
        let r = black_scholes(&params(OptionType::Call, 10.0, 1000.0, 0.01, 0.05)).unwrap();
        assert!(r.price >= 0.0);
    }

    #[test]
    fn test_time_value() {
        assert_eq!(time_value(7.5, 5.0), 2.5);
        assert_eq!(time_value(4.9, 5.0), 0.0);
    }

    #[test]
    fn test_idempotent() {
        let p = params(OptionType::Put, 97.3, 105.0, 0.37, 0.42);
        let a = black_scholes(&p).unwrap();
        let b = black_scholes(&p).unwrap();
        assert_eq!(a.price.to_bits(), b.price.to_bits());
        assert_eq!(a.d1.to_bits(), b.d1.to_bits());
    }
}
