use statrs::distribution::{ContinuousCDF, Normal};

/// Year-fraction convention shared by every date-range computation.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Standard normal CDF. statrs is accurate well below the 1e-7 tolerance
/// financial pricing needs.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal density.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Black-Scholes d1 = [ln(S/K) + (r - q + sigma^2/2) T] / (sigma sqrt(T)).
///
/// Pure helper: callers guard sigma > 0 and T > 0 before reaching it.
#[inline]
pub fn d1(spot: f64, strike: f64, time: f64, rate: f64, dividend_yield: f64, vol: f64) -> f64 {
    ((spot / strike).ln() + (rate - dividend_yield + 0.5 * vol * vol) * time)
        / (vol * time.sqrt())
}

/// Black-Scholes d2 = d1 - sigma sqrt(T).
#[inline]
pub fn d2(d1: f64, vol: f64, time: f64) -> f64 {
    d1 - vol * time.sqrt()
}

/// Non-negative year fraction from `as_of` to `expiry`.
#[inline]
pub fn year_fraction(expiry: chrono::NaiveDate, as_of: chrono::NaiveDate) -> f64 {
    let days = (expiry - as_of).num_days();
    if days <= 0 {
        0.0
    } else {
        days as f64 / DAYS_PER_YEAR
    }
}

/// Round to cents. Applied to every price handed back to callers.
#[inline]
pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
