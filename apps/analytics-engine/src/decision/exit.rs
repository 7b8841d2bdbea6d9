//! Priority-ordered exit rules driven by the price history.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::history::PriceHistory;
use crate::models::OptionType;

/// Exit rule thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitConfig {
    /// Immediate exit when price is within this fraction of a short strike.
    pub strike_proximity_pct: f64,
    /// Immediate exit when price dwells beyond a short strike this long.
    pub dwell_limit_minutes: i64,
    /// A touch is an observation within this fraction of a strike.
    pub touch_tolerance_pct: f64,
    /// A bounce requires the price to move this far back off the strike.
    pub bounce_distance_pct: f64,
    /// Take-profit advisory once this fraction of max profit is captured.
    pub profit_target_pct: f64,
    /// Expiration-proximity advisory inside this many days.
    pub expiration_warning_days: i64,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            strike_proximity_pct: 0.02,
            dwell_limit_minutes: 30,
            touch_tolerance_pct: 0.01,
            bounce_distance_pct: 0.03,
            profit_target_pct: 0.75,
            expiration_warning_days: 5,
        }
    }
}

/// A short strike being defended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortStrike {
    /// Strike price.
    pub strike: Decimal,
    /// Call or put; decides which side counts as "beyond".
    pub option_type: OptionType,
}

/// Inputs to one exit evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitContext {
    /// Latest price.
    pub current_price: Decimal,
    /// Short strikes being defended.
    pub short_strikes: Vec<ShortStrike>,
    /// Fraction of maximum profit currently captured, when known.
    pub unrealized_profit_pct: Option<f64>,
    /// Position expiration.
    pub expiration: NaiveDate,
    /// Evaluation date.
    pub today: NaiveDate,
}

/// What to do with the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitAction {
    /// Close now.
    ExitImmediately,
    /// Tighten monitoring.
    MonitorClosely,
    /// Keep the position.
    Hold,
    /// Advisory: profit target reached.
    TakeProfit,
    /// Advisory: expiration close, plan the exit.
    PrepareToExit,
}

/// Exit evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitDecision {
    /// Recommended action.
    pub action: ExitAction,
    /// Human-readable reason.
    pub reason: String,
    /// Name of the deciding rule.
    pub rule: &'static str,
}

/// One tagged exit rule.
pub struct ExitRule {
    /// Stable rule name.
    pub name: &'static str,
    /// Condition; returns the decision when it matches.
    pub evaluate: fn(&ExitContext, &PriceHistory, &ExitConfig) -> Option<ExitDecision>,
}

impl std::fmt::Debug for ExitRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The default ordered exit rule list.
#[must_use]
pub fn default_exit_rules() -> Vec<ExitRule> {
    vec![
        ExitRule {
            name: "strike_proximity",
            evaluate: |ctx, _, config| {
                ctx.short_strikes
                    .iter()
                    .find(|s| distance_pct(ctx.current_price, s.strike) <= config.strike_proximity_pct)
                    .map(|s| ExitDecision {
                        action: ExitAction::ExitImmediately,
                        reason: format!(
                            "price {} within {:.0}% of short strike {}",
                            ctx.current_price,
                            config.strike_proximity_pct * 100.0,
                            s.strike
                        ),
                        rule: "strike_proximity",
                    })
            },
        },
        ExitRule {
            name: "dwell_beyond_strike",
            evaluate: |ctx, history, config| {
                let limit = Duration::minutes(config.dwell_limit_minutes);
                ctx.short_strikes
                    .iter()
                    .find(|s| {
                        let above = s.option_type == OptionType::Call;
                        history.dwell_beyond(s.strike, above) > limit
                    })
                    .map(|s| ExitDecision {
                        action: ExitAction::ExitImmediately,
                        reason: format!(
                            "price has stayed beyond short strike {} for over {} minutes",
                            s.strike, config.dwell_limit_minutes
                        ),
                        rule: "dwell_beyond_strike",
                    })
            },
        },
        ExitRule {
            name: "first_touch",
            evaluate: |ctx, history, config| {
                ctx.short_strikes
                    .iter()
                    .find(|s| history.is_first_touch(s.strike, config.touch_tolerance_pct))
                    .map(|s| ExitDecision {
                        action: ExitAction::MonitorClosely,
                        reason: format!("first touch of strike {}", s.strike),
                        rule: "first_touch",
                    })
            },
        },
        ExitRule {
            name: "touched_and_bounced",
            evaluate: |ctx, history, config| {
                ctx.short_strikes
                    .iter()
                    .find(|s| {
                        history.has_bounced(
                            s.strike,
                            config.touch_tolerance_pct,
                            config.bounce_distance_pct,
                        )
                    })
                    .map(|s| ExitDecision {
                        action: ExitAction::Hold,
                        reason: format!("price touched {} and bounced away", s.strike),
                        rule: "touched_and_bounced",
                    })
            },
        },
        ExitRule {
            name: "profit_target",
            evaluate: |ctx, _, config| {
                ctx.unrealized_profit_pct
                    .filter(|&p| p >= config.profit_target_pct)
                    .map(|p| ExitDecision {
                        action: ExitAction::TakeProfit,
                        reason: format!(
                            "{:.0}% of max profit captured (target {:.0}%)",
                            p * 100.0,
                            config.profit_target_pct * 100.0
                        ),
                        rule: "profit_target",
                    })
            },
        },
        ExitRule {
            name: "expiration_proximity",
            evaluate: |ctx, _, config| {
                let dte = (ctx.expiration - ctx.today).num_days();
                (dte <= config.expiration_warning_days).then(|| ExitDecision {
                    action: ExitAction::PrepareToExit,
                    reason: format!("{dte} days to expiration"),
                    rule: "expiration_proximity",
                })
            },
        },
    ]
}

/// Evaluate the ordered rule list; the first match wins. Falls through to
/// a hold when nothing matches.
#[must_use]
pub fn evaluate_exit(
    ctx: &ExitContext,
    history: &PriceHistory,
    config: &ExitConfig,
    rules: &[ExitRule],
) -> ExitDecision {
    for rule in rules {
        if let Some(decision) = (rule.evaluate)(ctx, history, config) {
            debug!(rule = rule.name, action = ?decision.action, "exit rule matched");
            return decision;
        }
    }
    ExitDecision {
        action: ExitAction::Hold,
        reason: "no exit conditions met".to_string(),
        rule: "default_hold",
    }
}

fn distance_pct(price: Decimal, level: Decimal) -> f64 {
    if level <= Decimal::ZERO {
        return f64::INFINITY;
    }
    ((price - level).abs() / level).to_f64().unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 14, minute, 0).unwrap()
    }

    fn context(price: Decimal) -> ExitContext {
        ExitContext {
            current_price: price,
            short_strikes: vec![ShortStrike {
                strike: dec!(580),
                option_type: OptionType::Call,
            }],
            unrealized_profit_pct: Some(0.20),
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            today: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        }
    }

    fn evaluate(ctx: &ExitContext, history: &PriceHistory) -> ExitDecision {
        evaluate_exit(ctx, history, &ExitConfig::default(), &default_exit_rules())
    }

    #[test]
    fn quiet_position_holds() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(550), ts(0));
        let decision = evaluate(&context(dec!(550)), &history);
        assert_eq!(decision.action, ExitAction::Hold);
        assert_eq!(decision.rule, "default_hold");
    }

    #[test]
    fn proximity_to_short_strike_exits() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(572), ts(0));
        // 572 is within 2% of 580.
        let decision = evaluate(&context(dec!(572)), &history);
        assert_eq!(decision.action, ExitAction::ExitImmediately);
        assert_eq!(decision.rule, "strike_proximity");
    }

    #[test]
    fn long_dwell_beyond_strike_exits() {
        let mut history = PriceHistory::new(64);
        // Price blows through the short call strike and stays there.
        history.push(dec!(596), ts(0));
        history.push(dec!(598), ts(20));
        history.push(dec!(597), ts(35));
        let decision = evaluate(&context(dec!(597)), &history);
        assert_eq!(decision.action, ExitAction::ExitImmediately);
        assert_eq!(decision.rule, "dwell_beyond_strike");
    }

    #[test]
    fn first_touch_tightens_monitoring() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(560), ts(0));
        history.push(dec!(576), ts(5)); // within 1% of 580: the first touch
        // Price currently 3%+ away would be a bounce; keep it just outside
        // proximity but under bounce distance.
        let mut ctx = context(dec!(566)); // ~2.4% away from 580
        ctx.short_strikes[0].strike = dec!(580);
        history.push(dec!(566), ts(10));
        let decision = evaluate(&ctx, &history);
        assert_eq!(decision.action, ExitAction::MonitorClosely);
        assert_eq!(decision.rule, "first_touch");
    }

    #[test]
    fn touch_then_bounce_holds() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(578), ts(0)); // touch one
        history.push(dec!(577), ts(2)); // touch two (no longer "first")
        history.push(dec!(560), ts(10)); // 3.4% away: bounced
        let decision = evaluate(&context(dec!(560)), &history);
        assert_eq!(decision.action, ExitAction::Hold);
        assert_eq!(decision.rule, "touched_and_bounced");
    }

    #[test]
    fn profit_target_advisory() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(550), ts(0));
        let mut ctx = context(dec!(550));
        ctx.unrealized_profit_pct = Some(0.80);
        let decision = evaluate(&ctx, &history);
        assert_eq!(decision.action, ExitAction::TakeProfit);
    }

    #[test]
    fn expiration_proximity_advisory() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(550), ts(0));
        let mut ctx = context(dec!(550));
        ctx.today = NaiveDate::from_ymd_opt(2025, 6, 17).unwrap(); // 3 DTE
        let decision = evaluate(&ctx, &history);
        assert_eq!(decision.action, ExitAction::PrepareToExit);
        assert!(decision.reason.contains("3 days"));
    }

    #[test]
    fn proximity_beats_profit_target() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(575), ts(0));
        let mut ctx = context(dec!(575));
        ctx.unrealized_profit_pct = Some(0.90);
        let decision = evaluate(&ctx, &history);
        assert_eq!(decision.rule, "strike_proximity");
    }

    #[test]
    fn put_side_dwell_looks_below() {
        let mut history = PriceHistory::new(64);
        history.push(dec!(470), ts(0));
        history.push(dec!(468), ts(40));
        let mut ctx = context(dec!(468));
        ctx.short_strikes = vec![ShortStrike {
            strike: dec!(490),
            option_type: OptionType::Put,
        }];
        let decision = evaluate(&ctx, &history);
        assert_eq!(decision.action, ExitAction::ExitImmediately);
        assert_eq!(decision.rule, "dwell_beyond_strike");
    }
}
