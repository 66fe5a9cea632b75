use crate::errors::{CalcError, CalcResult};
use crate::math;
use crate::pricing::black_scholes::validate;
use crate::types::{
    BlackScholesParams, Greeks, OptionLeg, OptionType, CONTRACT_MULTIPLIER,
};
use chrono::NaiveDate;

/// Closed-form Black-Scholes sensitivities.
///
/// Theta is per calendar day, vega per 1% vol move, rho per 1% rate move.
/// At expiry or at zero volatility the payoff is a step function: delta is
/// 0 or +/-1 and the remaining sensitivities vanish.
pub fn greeks(params: &BlackScholesParams) -> CalcResult<Greeks> {
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

    if t <= 0.0 || vol <= 0.0 {
        let delta = match option_type {
            OptionType::Call => {
                if spot > strike {
                    1.0
                } else {
                    0.0
                }
            }
            OptionType::Put => {
                if spot < strike {
                    -1.0
                } else {
                    0.0
                }
            }
        };
        return Ok(Greeks {
            delta,
            gamma: 0.0,
            theta: 0.0,
            vega: 0.0,
            rho: 0.0,
        });
    }

    let d1 = math::d1(spot, strike, t, rate, div, vol);
    let d2 = math::d2(d1, vol, t);
    let sqrt_t = t.sqrt();
    let df = (-rate * t).exp();
    let qf = (-div * t).exp();
    let pdf_d1 = math::norm_pdf(d1);

    let gamma_denom = spot * vol * sqrt_t;
    if gamma_denom == 0.0 {
        return Err(CalcError::DivisionByZero(
            "gamma denominator spot * sigma * sqrt(t) is zero".into(),
        ));
    }

    let delta = match option_type {
        OptionType::Call => qf * math::norm_cdf(d1),
        OptionType::Put => qf * (math::norm_cdf(d1) - 1.0),
    };

    let gamma = qf * pdf_d1 / gamma_denom;

    let vega = spot * qf * pdf_d1 * sqrt_t / 100.0;

    let decay = -spot * qf * pdf_d1 * vol / (2.0 * sqrt_t);
    let theta = match option_type {
        OptionType::Call => {
            decay - rate * strike * df * math::norm_cdf(d2)
                + div * spot * qf * math::norm_cdf(d1)
        }
        OptionType::Put => {
            decay + rate * strike * df * math::norm_cdf(-d2)
                - div * spot * qf * math::norm_cdf(-d1)
        }
    };

    let rho = match option_type {
        OptionType::Call => strike * t * df * math::norm_cdf(d2) / 100.0,
        OptionType::Put => -strike * t * df * math::norm_cdf(-d2) / 100.0,
    };

    Ok(Greeks {
        delta,
        gamma,
        theta: theta / math::DAYS_PER_YEAR,
        vega,
        rho,
    })
}

/// Net position sensitivities: per-leg Greeks scaled by contract
/// multiplier and quantity, signed by position, then summed.
pub fn position_greeks(
    legs: &[OptionLeg],
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    default_vol: f64,
    as_of: NaiveDate,
) -> CalcResult<Greeks> {
    let mut net = Greeks::default();
    for leg in legs {
        let g = greeks(&BlackScholesParams {
            option_type: leg.option_type,
            spot,
            strike: leg.strike,
            time_to_expiry: math::year_fraction(leg.expiry, as_of),
            rate,
            dividend_yield,
            volatility: leg.volatility.unwrap_or(default_vol),
        })?;
        let scale = leg.position.sign() * CONTRACT_MULTIPLIER * leg.quantity as f64;
        net.delta += scale * g.delta;
        net.gamma += scale * g.gamma;
        net.theta += scale * g.theta;
        net.vega += scale * g.vega;
        net.rho += scale * g.rho;
    }
    Ok(net)
}
