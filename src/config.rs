use crate::errors::{CalcError, CalcResult};

/// Engine-level defaults and numerical tuning. Callers override the market
/// parameters per request; the rest bound the numerical procedures.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Annualized volatility used when neither the request nor the leg
    /// supplies one.
    pub default_volatility: f64,
    pub default_rate: f64,
    pub default_dividend_yield: f64,
    /// Chart half-width as a fraction of the stock price.
    pub default_price_range: f64,
    pub default_chart_points: usize,
    pub heatmap_price_steps: usize,
    pub heatmap_date_steps: usize,
    /// Target break-even precision, in dollars.
    pub precision: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_volatility: 0.30,
            default_rate: 0.05,
            default_dividend_yield: 0.0,
            default_price_range: 0.30,
            default_chart_points: 100,
            heatmap_price_steps: 12,
            heatmap_date_steps: 10,
            precision: 0.01,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the environment. Every field has a default, so
    /// a bare environment is a valid one.
    pub fn from_env() -> CalcResult<Self> {
        dotenvy::dotenv().ok();

        let d = Self::default();
        Ok(Self {
            default_volatility: env_f64("OPTLAB_DEFAULT_VOLATILITY", d.default_volatility)?,
            default_rate: env_f64("OPTLAB_DEFAULT_RATE", d.default_rate)?,
            default_dividend_yield: env_f64(
                "OPTLAB_DEFAULT_DIVIDEND_YIELD",
                d.default_dividend_yield,
            )?,
            default_price_range: env_f64("OPTLAB_PRICE_RANGE", d.default_price_range)?,
            default_chart_points: env_usize("OPTLAB_CHART_POINTS", d.default_chart_points)?,
            heatmap_price_steps: env_usize("OPTLAB_HEATMAP_PRICE_STEPS", d.heatmap_price_steps)?,
            heatmap_date_steps: env_usize("OPTLAB_HEATMAP_DATE_STEPS", d.heatmap_date_steps)?,
            precision: env_f64("OPTLAB_PRECISION", d.precision)?,
        })
    }
}

fn env_f64(key: &str, default: f64) -> CalcResult<f64> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<f64>()
            .map_err(|e| CalcError::InvalidInput(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &str, default: usize) -> CalcResult<usize> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<usize>()
            .map_err(|e| CalcError::InvalidInput(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert!(cfg.default_volatility > 0.0 && cfg.default_volatility <= 5.0);
        assert!(cfg.precision > 0.0);
        assert!(cfg.heatmap_price_steps >= 2 && cfg.heatmap_date_steps >= 2);
    }
}
