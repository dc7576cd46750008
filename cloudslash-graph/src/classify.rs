//! Waste-marking policy: the `cloudslash:ignore` tag grammar.
//!
//! The tag value (lowercased, trimmed) selects the first matching rule:
//! `true` (hard exempt), `cost<X` (cost gate), `justified:REASON`
//! (marked but exempt from action), `YYYY-MM-DD` (snoozed until the date),
//! `Nd`/`Nh` (grace period against the resource's creation time).
//! Unparseable values degrade to "absent" and the node is marked.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use cloudslash_core::constants::{CREATION_TIME_PROPS, IGNORE_TAG_KEY};

use crate::store::Node;

/// A parsed `cloudslash:ignore` directive.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreDirective {
    /// `true` — never mark.
    Always,
    /// `cost<X` — skip marking while monthly cost is below X.
    CostBelow(f64),
    /// `justified:REASON` — mark, but flag as justified.
    Justified(String),
    /// `YYYY-MM-DD` — skip marking until the date.
    Until(NaiveDate),
    /// `Nd` / `Nh` — skip marking while the resource is younger than this.
    Grace(Duration),
}

/// Parse a raw tag value. Returns `None` for anything outside the grammar;
/// the caller treats that as an absent tag.
pub fn parse_ignore_directive(raw: &str) -> Option<IgnoreDirective> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return None;
    }
    if value == "true" {
        return Some(IgnoreDirective::Always);
    }
    if let Some(rest) = value.strip_prefix("cost<") {
        return rest.trim().parse::<f64>().ok().map(IgnoreDirective::CostBelow);
    }
    if let Some(rest) = value.strip_prefix("justified:") {
        let reason = rest.trim();
        if !reason.is_empty() {
            return Some(IgnoreDirective::Justified(reason.to_string()));
        }
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
        return Some(IgnoreDirective::Until(date));
    }
    if let Some(days) = value.strip_suffix('d') {
        if let Ok(n) = days.parse::<i64>() {
            return Some(IgnoreDirective::Grace(Duration::days(n)));
        }
    }
    if let Some(hours) = value.strip_suffix('h') {
        if let Ok(n) = hours.parse::<i64>() {
            return Some(IgnoreDirective::Grace(Duration::hours(n)));
        }
    }
    None
}

/// Outcome of a `mark_waste` application, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    MarkedJustified,
    Exempt,
    Snoozed,
    TooYoung,
    BelowCostGate,
    UnknownNode,
}

/// Apply the classification policy to a node. `now` is injected so the
/// dated and grace rules are testable.
pub fn apply_mark(node: &mut Node, score: u8, reason: Option<&str>, now: DateTime<Utc>) -> MarkOutcome {
    let directive = node.tag(IGNORE_TAG_KEY).and_then(parse_ignore_directive);

    match directive {
        Some(IgnoreDirective::Always) => return MarkOutcome::Exempt,
        Some(IgnoreDirective::CostBelow(gate)) => {
            if node.monthly_cost < gate {
                return MarkOutcome::BelowCostGate;
            }
        }
        Some(IgnoreDirective::Justified(reason_tag)) => {
            node.is_waste = true;
            node.justified = true;
            node.justification = reason_tag;
            node.risk_score = score.min(100);
            if let Some(r) = reason {
                node.waste_reason = r.to_string();
            }
            return MarkOutcome::MarkedJustified;
        }
        Some(IgnoreDirective::Until(date)) => {
            if now.date_naive() < date {
                return MarkOutcome::Snoozed;
            }
        }
        Some(IgnoreDirective::Grace(grace)) => {
            if let Some(created) = creation_time(node) {
                if now - created < grace {
                    return MarkOutcome::TooYoung;
                }
            }
        }
        None => {}
    }

    node.is_waste = true;
    node.risk_score = score.min(100);
    if let Some(r) = reason {
        node.waste_reason = r.to_string();
    }
    MarkOutcome::Marked
}

/// First creation-style timestamp found on the node, in the documented
/// property order.
fn creation_time(node: &Node) -> Option<DateTime<Utc>> {
    CREATION_TIME_PROPS
        .iter()
        .find_map(|key| node.prop(key).and_then(|v| v.as_time()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_parses_every_form() {
        assert_eq!(parse_ignore_directive(" TRUE "), Some(IgnoreDirective::Always));
        assert_eq!(
            parse_ignore_directive("cost<12.5"),
            Some(IgnoreDirective::CostBelow(12.5))
        );
        assert_eq!(
            parse_ignore_directive("Justified:DisasterRecovery"),
            Some(IgnoreDirective::Justified("disasterrecovery".to_string()))
        );
        assert_eq!(
            parse_ignore_directive("2099-01-01"),
            Some(IgnoreDirective::Until(
                NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
            ))
        );
        assert_eq!(
            parse_ignore_directive("30d"),
            Some(IgnoreDirective::Grace(Duration::days(30)))
        );
        assert_eq!(
            parse_ignore_directive("12h"),
            Some(IgnoreDirective::Grace(Duration::hours(12)))
        );
    }

    #[test]
    fn garbage_degrades_to_absent() {
        assert_eq!(parse_ignore_directive("cost<abc"), None);
        assert_eq!(parse_ignore_directive("2099-13-45"), None);
        assert_eq!(parse_ignore_directive("whenever"), None);
        assert_eq!(parse_ignore_directive(""), None);
    }
}
