use serde::Deserialize;

/// How strictly status writes are checked against the status graph.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only moves allowed by the status graph (plus same-status replays).
    #[default]
    Strict,
    /// Any defined status may replace any other.
    Permissive,
}

/// A status enumeration with a fixed forward graph.
pub trait StatusMachine: Copy + Eq {
    /// Whether `self -> to` is an edge of the graph. Same-status moves are
    /// handled by [`is_valid_transition`] and need not be listed here.
    fn allows(self, to: Self) -> bool;

    fn is_terminal(self) -> bool;
}

/// Single place where status write legality is decided.
pub fn is_valid_transition<S: StatusMachine>(policy: TransitionPolicy, from: S, to: S) -> bool {
    match policy {
        TransitionPolicy::Permissive => true,
        TransitionPolicy::Strict => from == to || from.allows(to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, PaymentStatus};
    use std::str::FromStr;

    #[test]
    fn strict_order_transitions_are_monotonic() {
        use OrderStatus::*;
        let p = TransitionPolicy::Strict;
        assert!(is_valid_transition(p, Received, Preparing));
        assert!(is_valid_transition(p, Received, Finished));
        assert!(is_valid_transition(p, Ready, Finished));
        assert!(is_valid_transition(p, Finished, Finished));
        assert!(!is_valid_transition(p, Finished, Ready));
        assert!(!is_valid_transition(p, Preparing, Received));
    }

    #[test]
    fn strict_payment_transitions_stop_at_terminal() {
        use PaymentStatus::*;
        let p = TransitionPolicy::Strict;
        assert!(is_valid_transition(p, Pending, Approved));
        assert!(is_valid_transition(p, Pending, Rejected));
        assert!(is_valid_transition(p, Approved, Approved));
        assert!(!is_valid_transition(p, Approved, Rejected));
        assert!(!is_valid_transition(p, Rejected, Pending));
    }

    #[test]
    fn permissive_accepts_everything() {
        let p = TransitionPolicy::Permissive;
        assert!(is_valid_transition(
            p,
            OrderStatus::Finished,
            OrderStatus::Received
        ));
        assert!(is_valid_transition(
            p,
            PaymentStatus::Approved,
            PaymentStatus::Rejected
        ));
    }

    #[test]
    fn policy_parses_from_config_tokens() {
        assert_eq!(
            TransitionPolicy::from_str("strict").unwrap(),
            TransitionPolicy::Strict
        );
        assert_eq!(
            TransitionPolicy::from_str("permissive").unwrap(),
            TransitionPolicy::Permissive
        );
        assert!(TransitionPolicy::from_str("lenient").is_err());
    }
}
