/// Error taxonomy for the analytics engine.
/// Bulk validation collects field errors for display instead of raising;
/// the pricer and the break-even finder fail fast on the first
/// unrecoverable condition, because a partial price or a non-converged
/// root is not a meaningful partial result.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("calculation failed: {0}")]
    CalculationFailed(String),

    #[error("expired option: {0}")]
    ExpiredOption(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("division by zero: {0}")]
    DivisionByZero(String),

    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

pub type CalcResult<T> = Result<T, CalcError>;
