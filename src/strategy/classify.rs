use crate::types::{OptionLeg, OptionType, Position, StrategyDetection, StrategyType};

/// Structural pattern matching over 1-4 legs. Five legs and beyond are not
/// enumerated and label as Custom.
///
/// Confidence below 0.8 is advisory: the legs alone cannot settle the
/// label (a lone short put may or may not be cash-secured).

/// Relative tolerance for equal butterfly wing spacing.
const WING_TOLERANCE: f64 = 0.01;

/// Minimum strike separation, relative to the short strike, for a
/// long-dated long call to read as the stock-replacement leg of a poor
/// man's covered call.
const PMCC_DEPTH: f64 = 0.10;

pub fn detect_strategy(legs: &[OptionLeg], has_stock: bool) -> StrategyDetection {
    let det = match legs.len() {
        0 => plain(StrategyType::Custom, 0.0),
        1 => classify_single(&legs[0], has_stock),
        2 => classify_two(legs, has_stock),
        3 => classify_three(legs, has_stock),
        4 => classify_four(legs),
        _ => plain(StrategyType::Custom, 1.0),
    };
    tracing::debug!(
        strategy = %det.strategy,
        confidence = det.confidence,
        "strategy classified"
    );
    det
}

fn plain(strategy: StrategyType, confidence: f64) -> StrategyDetection {
    StrategyDetection {
        strategy,
        confidence,
        requires_stock: false,
        requires_time_based_calc: false,
    }
}

fn stock_based(strategy: StrategyType, confidence: f64) -> StrategyDetection {
    StrategyDetection {
        strategy,
        confidence,
        requires_stock: true,
        requires_time_based_calc: false,
    }
}

fn time_based(strategy: StrategyType, confidence: f64) -> StrategyDetection {
    StrategyDetection {
        strategy,
        confidence,
        requires_stock: false,
        requires_time_based_calc: true,
    }
}

#[inline]
fn same_strike(a: &OptionLeg, b: &OptionLeg) -> bool {
    (a.strike - b.strike).abs() < 1e-9
}

fn classify_single(leg: &OptionLeg, has_stock: bool) -> StrategyDetection {
    match (leg.option_type, leg.position) {
        (OptionType::Call, Position::Long) => plain(StrategyType::LongCall, 1.0),
        (OptionType::Put, Position::Long) => plain(StrategyType::LongPut, 1.0),
        (OptionType::Call, Position::Short) => {
            if has_stock {
                stock_based(StrategyType::CoveredCall, 1.0)
            } else {
                plain(StrategyType::NakedCall, 1.0)
            }
        }
        (OptionType::Put, Position::Short) => {
            if has_stock {
                stock_based(StrategyType::CashSecuredPut, 1.0)
            } else {
                // Could be cash-secured; the option legs alone cannot tell.
                plain(StrategyType::NakedPut, 0.9)
            }
        }
    }
}

fn classify_two(legs: &[OptionLeg], has_stock: bool) -> StrategyDetection {
    let (a, b) = (&legs[0], &legs[1]);
    let same_type = a.option_type == b.option_type;
    let same_position = a.position == b.position;

    if !same_type {
        if same_position {
            return match a.position {
                Position::Long => {
                    if same_strike(a, b) {
                        plain(StrategyType::LongStraddle, 1.0)
                    } else {
                        plain(StrategyType::LongStrangle, 1.0)
                    }
                }
                Position::Short => {
                    if has_stock {
                        stock_based(StrategyType::CoveredStrangle, 1.0)
                    } else if same_strike(a, b) {
                        plain(StrategyType::ShortStraddle, 1.0)
                    } else {
                        plain(StrategyType::ShortStrangle, 1.0)
                    }
                }
            };
        }
        let long_put = legs
            .iter()
            .any(|l| l.option_type == OptionType::Put && l.position == Position::Long);
        let short_call = legs
            .iter()
            .any(|l| l.option_type == OptionType::Call && l.position == Position::Short);
        if has_stock && long_put && short_call {
            return stock_based(StrategyType::Collar, 1.0);
        }
        return plain(StrategyType::Custom, 0.7);
    }

    if same_position {
        // Two like legs, e.g. a scaled single position entered twice.
        return plain(StrategyType::Custom, 0.7);
    }

    let (long, short) = if a.position == Position::Long { (a, b) } else { (b, a) };

    if a.expiry == b.expiry {
        if long.quantity == short.quantity {
            if same_strike(long, short) {
                return plain(StrategyType::Custom, 0.7);
            }
            return plain(vertical_spread(a.option_type, long.strike < short.strike), 1.0);
        }
        if long.quantity > short.quantity {
            let s = match a.option_type {
                OptionType::Call => StrategyType::CallRatioBackspread,
                OptionType::Put => StrategyType::PutRatioBackspread,
            };
            return plain(s, 1.0);
        }
        return plain(StrategyType::Custom, 0.7);
    }

    // Calendar family: intrinsic-at-expiry math alone cannot value these.
    if same_strike(long, short) {
        return time_based(StrategyType::CalendarSpread, 1.0);
    }
    if a.option_type == OptionType::Call
        && long.expiry > short.expiry
        && long.strike < short.strike
        && short.strike - long.strike >= PMCC_DEPTH * short.strike
    {
        return time_based(StrategyType::PoorMansCoveredCall, 0.85);
    }
    time_based(StrategyType::DiagonalSpread, 1.0)
}

fn vertical_spread(option_type: OptionType, long_below_short: bool) -> StrategyType {
    match (option_type, long_below_short) {
        (OptionType::Call, true) => StrategyType::BullCallSpread,
        (OptionType::Call, false) => StrategyType::BearCallSpread,
        (OptionType::Put, true) => StrategyType::BullPutSpread,
        (OptionType::Put, false) => StrategyType::BearPutSpread,
    }
}

fn classify_three(legs: &[OptionLeg], has_stock: bool) -> StrategyDetection {
    if let Some(s) = butterfly(legs) {
        return plain(s, 1.0);
    }
    let has_call = legs.iter().any(|l| l.option_type == OptionType::Call);
    let has_put = legs.iter().any(|l| l.option_type == OptionType::Put);
    if has_call && has_put && !has_stock {
        return plain(StrategyType::ReverseConversion, 0.6);
    }
    plain(StrategyType::Custom, 0.7)
}

/// A butterfly is one type, one expiry, two single-quantity longs around a
/// double-quantity short, with the wings equally spaced.
fn butterfly(legs: &[OptionLeg]) -> Option<StrategyType> {
    let ty = legs[0].option_type;
    if legs.iter().any(|l| l.option_type != ty) {
        return None;
    }
    let expiry = legs[0].expiry;
    if legs.iter().any(|l| l.expiry != expiry) {
        return None;
    }

    let mut longs: Vec<&OptionLeg> = legs
        .iter()
        .filter(|l| l.position == Position::Long)
        .collect();
    let shorts: Vec<&OptionLeg> = legs
        .iter()
        .filter(|l| l.position == Position::Short)
        .collect();
    if longs.len() != 2 || shorts.len() != 1 {
        return None;
    }
    if longs.iter().any(|l| l.quantity != 1) || shorts[0].quantity != 2 {
        return None;
    }

    longs.sort_by(|x, y| x.strike.total_cmp(&y.strike));
    let (lo, hi) = (longs[0].strike, longs[1].strike);
    let body = shorts[0].strike;
    if !(lo < body && body < hi) {
        return None;
    }
    if ((body - lo) - (hi - body)).abs() > WING_TOLERANCE * body {
        return None;
    }

    Some(match ty {
        OptionType::Call => StrategyType::CallButterfly,
        OptionType::Put => StrategyType::PutButterfly,
    })
}

fn classify_four(legs: &[OptionLeg]) -> StrategyDetection {
    let calls: Vec<&OptionLeg> = legs
        .iter()
        .filter(|l| l.option_type == OptionType::Call)
        .collect();
    let puts: Vec<&OptionLeg> = legs
        .iter()
        .filter(|l| l.option_type == OptionType::Put)
        .collect();

    let one_long_one_short = |side: &[&OptionLeg]| {
        side.len() == 2
            && side
                .iter()
                .filter(|l| l.position == Position::Long)
                .count()
                == 1
    };

    if one_long_one_short(&calls) && one_long_one_short(&puts) {
        let expiry = legs[0].expiry;
        if legs.iter().all(|l| l.expiry == expiry) {
            return plain(StrategyType::IronCondor, 1.0);
        }
        return time_based(StrategyType::DoubleDiagonal, 0.9);
    }
    plain(StrategyType::Custom, 0.7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn near() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 18).unwrap()
    }

    fn far() -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 1, 15).unwrap()
    }

    fn leg(
        option_type: OptionType,
        position: Position,
        strike: f64,
        quantity: u32,
        expiry: NaiveDate,
    ) -> OptionLeg {
        OptionLeg {
            id: format!("{option_type}-{position}-{strike}-{expiry}"),
            option_type,
            position,
            strike,
            premium: 1.0,
            quantity,
            expiry,
            volatility: None,
        }
    }

    #[test]
    fn test_single_leg_labels() {
        let lc = detect_strategy(&[leg(OptionType::Call, Position::Long, 100.0, 1, near())], false);
        assert_eq!(lc.strategy, StrategyType::LongCall);
        assert_eq!(lc.confidence, 1.0);

        let lp = detect_strategy(&[leg(OptionType::Put, Position::Long, 100.0, 1, near())], false);
        assert_eq!(lp.strategy, StrategyType::LongPut);

        let nc = detect_strategy(&[leg(OptionType::Call, Position::Short, 100.0, 1, near())], false);
        assert_eq!(nc.strategy, StrategyType::NakedCall);
        assert_eq!(nc.confidence, 1.0);

        let cc = detect_strategy(&[leg(OptionType::Call, Position::Short, 100.0, 1, near())], true);
        assert_eq!(cc.strategy, StrategyType::CoveredCall);
        assert!(cc.requires_stock);
    }

    #[test]
    fn test_short_put_is_ambiguous_without_stock() {
        let np = detect_strategy(&[leg(OptionType::Put, Position::Short, 100.0, 1, near())], false);
        assert_eq!(np.strategy, StrategyType::NakedPut);
        assert!((np.confidence - 0.9).abs() < 1e-12, "got {}", np.confidence);

        let csp = detect_strategy(&[leg(OptionType::Put, Position::Short, 100.0, 1, near())], true);
        assert_eq!(csp.strategy, StrategyType::CashSecuredPut);
        assert_eq!(csp.confidence, 1.0);
    }

    #[test]
    fn test_straddles_and_strangles() {
        let ls = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 100.0, 1, near()),
                leg(OptionType::Put, Position::Long, 100.0, 1, near()),
            ],
            false,
        );
        assert_eq!(ls.strategy, StrategyType::LongStraddle);

        let lstr = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 105.0, 1, near()),
                leg(OptionType::Put, Position::Long, 95.0, 1, near()),
            ],
            false,
        );
        assert_eq!(lstr.strategy, StrategyType::LongStrangle);

        let ss = detect_strategy(
            &[
                leg(OptionType::Call, Position::Short, 100.0, 1, near()),
                leg(OptionType::Put, Position::Short, 100.0, 1, near()),
            ],
            false,
        );
        assert_eq!(ss.strategy, StrategyType::ShortStraddle);

        let cs = detect_strategy(
            &[
                leg(OptionType::Call, Position::Short, 105.0, 1, near()),
                leg(OptionType::Put, Position::Short, 95.0, 1, near()),
            ],
            true,
        );
        assert_eq!(cs.strategy, StrategyType::CoveredStrangle);
        assert!(cs.requires_stock);
    }

    #[test]
    fn test_collar_needs_stock() {
        let legs = [
            leg(OptionType::Put, Position::Long, 95.0, 1, near()),
            leg(OptionType::Call, Position::Short, 105.0, 1, near()),
        ];
        let collar = detect_strategy(&legs, true);
        assert_eq!(collar.strategy, StrategyType::Collar);
        assert!(collar.requires_stock);

        let no_stock = detect_strategy(&legs, false);
        assert_eq!(no_stock.strategy, StrategyType::Custom);
    }

    #[test]
    fn test_vertical_spreads() {
        let bull_call = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 100.0, 1, near()),
                leg(OptionType::Call, Position::Short, 110.0, 1, near()),
            ],
            false,
        );
        assert_eq!(bull_call.strategy, StrategyType::BullCallSpread);
        assert_eq!(bull_call.confidence, 1.0);

        let bear_call = detect_strategy(
            &[
                leg(OptionType::Call, Position::Short, 100.0, 1, near()),
                leg(OptionType::Call, Position::Long, 110.0, 1, near()),
            ],
            false,
        );
        assert_eq!(bear_call.strategy, StrategyType::BearCallSpread);

        let bull_put = detect_strategy(
            &[
                leg(OptionType::Put, Position::Long, 95.0, 1, near()),
                leg(OptionType::Put, Position::Short, 105.0, 1, near()),
            ],
            false,
        );
        assert_eq!(bull_put.strategy, StrategyType::BullPutSpread);

        let bear_put = detect_strategy(
            &[
                leg(OptionType::Put, Position::Long, 105.0, 1, near()),
                leg(OptionType::Put, Position::Short, 95.0, 1, near()),
            ],
            false,
        );
        assert_eq!(bear_put.strategy, StrategyType::BearPutSpread);
    }

    #[test]
    fn test_calendar_and_diagonal() {
        let cal = detect_strategy(
            &[
                leg(OptionType::Call, Position::Short, 100.0, 1, near()),
                leg(OptionType::Call, Position::Long, 100.0, 1, far()),
            ],
            false,
        );
        assert_eq!(cal.strategy, StrategyType::CalendarSpread);
        assert!(cal.requires_time_based_calc);

        let diag = detect_strategy(
            &[
                leg(OptionType::Put, Position::Short, 95.0, 1, near()),
                leg(OptionType::Put, Position::Long, 100.0, 1, far()),
            ],
            false,
        );
        assert_eq!(diag.strategy, StrategyType::DiagonalSpread);
        assert!(diag.requires_time_based_calc);
    }

    #[test]
    fn test_pmcc_heuristic() {
        // Deep long-dated long call under a near-dated OTM short call.
        let pmcc = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 80.0, 1, far()),
                leg(OptionType::Call, Position::Short, 110.0, 1, near()),
            ],
            false,
        );
        assert_eq!(pmcc.strategy, StrategyType::PoorMansCoveredCall);
        assert!(pmcc.requires_time_based_calc);

        // Strikes too close together: an ordinary diagonal.
        let diag = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 106.0, 1, far()),
                leg(OptionType::Call, Position::Short, 110.0, 1, near()),
            ],
            false,
        );
        assert_eq!(diag.strategy, StrategyType::DiagonalSpread);
    }

    #[test]
    fn test_ratio_backspreads() {
        let crb = detect_strategy(
            &[
                leg(OptionType::Call, Position::Short, 100.0, 1, near()),
                leg(OptionType::Call, Position::Long, 110.0, 2, near()),
            ],
            false,
        );
        assert_eq!(crb.strategy, StrategyType::CallRatioBackspread);

        let prb = detect_strategy(
            &[
                leg(OptionType::Put, Position::Short, 100.0, 1, near()),
                leg(OptionType::Put, Position::Long, 90.0, 2, near()),
            ],
            false,
        );
        assert_eq!(prb.strategy, StrategyType::PutRatioBackspread);

        // Short side larger is a front spread, which is not enumerated.
        let front = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 100.0, 1, near()),
                leg(OptionType::Call, Position::Short, 110.0, 2, near()),
            ],
            false,
        );
        assert_eq!(front.strategy, StrategyType::Custom);
    }

    #[test]
    fn test_butterflies() {
        let fly = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 90.0, 1, near()),
                leg(OptionType::Call, Position::Short, 100.0, 2, near()),
                leg(OptionType::Call, Position::Long, 110.0, 1, near()),
            ],
            false,
        );
        assert_eq!(fly.strategy, StrategyType::CallButterfly);
        assert_eq!(fly.confidence, 1.0);

        let put_fly = detect_strategy(
            &[
                leg(OptionType::Put, Position::Long, 90.0, 1, near()),
                leg(OptionType::Put, Position::Short, 100.0, 2, near()),
                leg(OptionType::Put, Position::Long, 110.0, 1, near()),
            ],
            false,
        );
        assert_eq!(put_fly.strategy, StrategyType::PutButterfly);

        // Unequal wings miss the tolerance and fall through.
        let lopsided = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 90.0, 1, near()),
                leg(OptionType::Call, Position::Short, 100.0, 2, near()),
                leg(OptionType::Call, Position::Long, 115.0, 1, near()),
            ],
            false,
        );
        assert_eq!(lopsided.strategy, StrategyType::Custom);
    }

    #[test]
    fn test_three_leg_mixed_types() {
        let rc = detect_strategy(
            &[
                leg(OptionType::Call, Position::Long, 100.0, 1, near()),
                leg(OptionType::Put, Position::Short, 100.0, 1, near()),
                leg(OptionType::Put, Position::Long, 90.0, 1, near()),
            ],
            false,
        );
        assert_eq!(rc.strategy, StrategyType::ReverseConversion);
        assert!((rc.confidence - 0.6).abs() < 1e-12);
        assert!(rc.confidence < 0.8, "advisory label must stay below 0.8");
    }

    #[test]
    fn test_iron_condor_and_double_diagonal() {
        let condor_legs = [
            leg(OptionType::Put, Position::Long, 435.0, 1, near()),
            leg(OptionType::Put, Position::Short, 440.0, 1, near()),
            leg(OptionType::Call, Position::Short, 460.0, 1, near()),
            leg(OptionType::Call, Position::Long, 465.0, 1, near()),
        ];
        let ic = detect_strategy(&condor_legs, false);
        assert_eq!(ic.strategy, StrategyType::IronCondor);
        assert_eq!(ic.confidence, 1.0);
        assert!(!ic.requires_time_based_calc);

        let dd = detect_strategy(
            &[
                leg(OptionType::Put, Position::Long, 435.0, 1, near()),
                leg(OptionType::Put, Position::Short, 440.0, 1, near()),
                leg(OptionType::Call, Position::Short, 460.0, 1, near()),
                leg(OptionType::Call, Position::Long, 465.0, 1, far()),
            ],
            false,
        );
        assert_eq!(dd.strategy, StrategyType::DoubleDiagonal);
        assert!((dd.confidence - 0.9).abs() < 1e-12);
        assert!(dd.requires_time_based_calc);
    }

    #[test]
    fn test_many_legs_are_custom() {
        let legs: Vec<OptionLeg> = (0..5)
            .map(|i| leg(OptionType::Call, Position::Long, 100.0 + i as f64, 1, near()))
            .collect();
        let det = detect_strategy(&legs, false);
        assert_eq!(det.strategy, StrategyType::Custom);
        assert_eq!(det.confidence, 1.0);
    }
}
