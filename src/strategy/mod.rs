pub mod breakeven;
pub mod classify;
pub mod payoff;
