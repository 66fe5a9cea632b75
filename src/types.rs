use crate::errors::{CalcError, CalcResult};
use chrono::NaiveDate;
use smallvec::SmallVec;

/// Shares controlled by one standard option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Upper bound on legs per strategy.
pub const MAX_LEGS: usize = 8;

// ── Option primitives ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff if exercised immediately at `spot`.
    #[inline]
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Long,
    Short,
}

impl Position {
    /// +1 for long, -1 for short.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

// ── Legs ──

/// One option contract within a strategy. Immutable for a calculation pass.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OptionLeg {
    pub id: String,
    pub option_type: OptionType,
    pub position: Position,
    pub strike: f64,
    /// Per-share premium.
    pub premium: f64,
    /// Number of contracts.
    pub quantity: u32,
    pub expiry: NaiveDate,
    /// Per-leg volatility override; falls back to the strategy-level default.
    #[serde(default)]
    pub volatility: Option<f64>,
}

/// Caller-facing leg with the expiry still in string form.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OptionLegInput {
    /// Blank means the engine assigns one.
    #[serde(default)]
    pub id: String,
    pub option_type: OptionType,
    pub position: Position,
    pub strike: f64,
    pub premium: f64,
    pub quantity: u32,
    /// ISO-8601 date, e.g. "2026-12-18".
    pub expiry: String,
    #[serde(default)]
    pub volatility: Option<f64>,
}

impl OptionLeg {
    /// Lift a caller-supplied leg: parse the expiry, require it strictly
    /// after `as_of`, and assign an id when the caller left it blank.
    pub fn from_input(input: &OptionLegInput, as_of: NaiveDate) -> CalcResult<Self> {
        let expiry = NaiveDate::parse_from_str(&input.expiry, "%Y-%m-%d").map_err(|e| {
            CalcError::InvalidDate(format!("leg expiry {:?}: {e}", input.expiry))
        })?;
        if expiry <= as_of {
            return Err(CalcError::ExpiredOption(format!(
                "leg expiry {expiry} is not after {as_of}"
            )));
        }
        let id = if input.id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            input.id.clone()
        };
        Ok(Self {
            id,
            option_type: input.option_type,
            position: input.position,
            strike: input.strike,
            premium: input.premium,
            quantity: input.quantity,
            expiry,
            volatility: input.volatility,
        })
    }
}

/// Optional underlying share position. Its presence changes classification
/// (a short call next to stock is a covered call, not a naked call).
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct StockLeg {
    /// Signed share count; negative means short stock.
    pub shares: f64,
    pub cost_basis: f64,
}

/// Leg set, inline up to the 8-leg bound.
pub type Legs = SmallVec<[OptionLeg; MAX_LEGS]>;

// ── Calculation request ──

/// One full request snapshot. The engine never consults wall-clock time;
/// `valuation_date` anchors every year fraction in the pass.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CalculationInputs {
    pub stock_price: f64,
    pub legs: Legs,
    #[serde(default)]
    pub stock: Option<StockLeg>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub risk_free_rate: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    /// Chart half-width as a fraction of the stock price.
    #[serde(default)]
    pub price_range: Option<f64>,
    #[serde(default)]
    pub chart_points: Option<usize>,
    pub valuation_date: NaiveDate,
}

/// Wire-level request as a calling layer submits it: legs carry string
/// expiries and possibly blank ids.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CalculationRequest {
    pub stock_price: f64,
    pub legs: Vec<OptionLegInput>,
    #[serde(default)]
    pub stock: Option<StockLeg>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub risk_free_rate: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub price_range: Option<f64>,
    #[serde(default)]
    pub chart_points: Option<usize>,
    pub valuation_date: NaiveDate,
}

impl CalculationRequest {
    /// Lift every leg, parsing dates and assigning missing ids.
    pub fn into_inputs(self) -> CalcResult<CalculationInputs> {
        let mut legs: Legs = SmallVec::new();
        for input in &self.legs {
            legs.push(OptionLeg::from_input(input, self.valuation_date)?);
        }
        Ok(CalculationInputs {
            stock_price: self.stock_price,
            legs,
            stock: self.stock,
            volatility: self.volatility,
            risk_free_rate: self.risk_free_rate,
            dividend_yield: self.dividend_yield,
            price_range: self.price_range,
            chart_points: self.chart_points,
            valuation_date: self.valuation_date,
        })
    }
}

// ── Pricing ──

/// Pricer input. Stack-allocated, Copy.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BlackScholesParams {
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    /// Years.
    pub time_to_expiry: f64,
    pub rate: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    pub volatility: f64,
}

/// Theoretical price with d1/d2 attached; Greeks and put-call-parity
/// checks reuse the intermediates.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BlackScholesResult {
    pub price: f64,
    pub d1: f64,
    pub d2: f64,
}

/// Sensitivities: theta per calendar day, vega per vol point, rho per
/// rate point.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

// ── Strategy classification ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    LongCall,
    LongPut,
    CoveredCall,
    CashSecuredPut,
    NakedCall,
    NakedPut,
    LongStraddle,
    ShortStraddle,
    LongStrangle,
    ShortStrangle,
    CoveredStrangle,
    Collar,
    BullCallSpread,
    BearCallSpread,
    BullPutSpread,
    BearPutSpread,
    CalendarSpread,
    DiagonalSpread,
    PoorMansCoveredCall,
    CallRatioBackspread,
    PutRatioBackspread,
    CallButterfly,
    PutButterfly,
    ReverseConversion,
    IronCondor,
    DoubleDiagonal,
    Custom,
}

impl std::fmt::Display for StrategyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LongCall => "Long Call",
            Self::LongPut => "Long Put",
            Self::CoveredCall => "Covered Call",
            Self::CashSecuredPut => "Cash-Secured Put",
            Self::NakedCall => "Naked Call",
            Self::NakedPut => "Naked Put",
            Self::LongStraddle => "Long Straddle",
            Self::ShortStraddle => "Short Straddle",
            Self::LongStrangle => "Long Strangle",
            Self::ShortStrangle => "Short Strangle",
            Self::CoveredStrangle => "Covered Strangle",
            Self::Collar => "Collar",
            Self::BullCallSpread => "Bull Call Spread",
            Self::BearCallSpread => "Bear Call Spread",
            Self::BullPutSpread => "Bull Put Spread",
            Self::BearPutSpread => "Bear Put Spread",
            Self::CalendarSpread => "Calendar Spread",
            Self::DiagonalSpread => "Diagonal Spread",
            Self::PoorMansCoveredCall => "Poor Man's Covered Call",
            Self::CallRatioBackspread => "Call Ratio Backspread",
            Self::PutRatioBackspread => "Put Ratio Backspread",
            Self::CallButterfly => "Call Butterfly",
            Self::PutButterfly => "Put Butterfly",
            Self::ReverseConversion => "Reverse Conversion",
            Self::IronCondor => "Iron Condor",
            Self::DoubleDiagonal => "Double Diagonal",
            Self::Custom => "Custom",
        };
        write!(f, "{name}")
    }
}

/// Classification outcome. Confidence below 0.8 is advisory labeling, not
/// a gate on calculation correctness.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StrategyDetection {
    pub strategy: StrategyType,
    pub confidence: f64,
    pub requires_stock: bool,
    pub requires_time_based_calc: bool,
}

// ── Results ──

/// Per-leg view at the current stock price.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LegBreakdown {
    pub leg_id: String,
    pub intrinsic_value: f64,
    /// Expiration P/L at the current stock price, net of this leg's premium.
    pub pl_at_expiry: f64,
}

/// Expiration and mark-to-model P/L sampled across the chart price band.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PayoffCurve {
    pub prices: Vec<f64>,
    pub pl_at_expiry: Vec<f64>,
    /// Position P/L on the valuation date, legs marked to the pricing model.
    pub pl_current: Vec<f64>,
}

/// Dense price-by-date P/L grid. Rows are prices in descending order;
/// `values[i][j]` is the P/L at `prices[i]` on `dates[j]`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HeatmapData {
    pub prices: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Vec<f64>>,
}

/// Terminal artifact of one engine pass. Never mutated after construction.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CalculationResults {
    pub strategy: StrategyDetection,
    /// Net entry cash flow: negative = debit, positive = credit.
    pub initial_cost: f64,
    /// None means unbounded.
    pub max_profit: Option<f64>,
    pub max_loss: Option<f64>,
    /// Sorted ascending, cent-rounded, deduplicated.
    pub break_even_points: Vec<f64>,
    pub legs: Vec<LegBreakdown>,
    pub position_greeks: Greeks,
    pub chart: PayoffCurve,
    pub heatmap: HeatmapData,
}
