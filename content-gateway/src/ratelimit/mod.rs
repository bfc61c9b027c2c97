//! Session gate for the generate action.
//!
//! Counts successful generations per session and arms a fixed cooldown once
//! the threshold is reached. The generation that reaches the threshold still
//! succeeds; only subsequent attempts are denied until the deadline passes.

use crate::models::Session;
use chrono::{DateTime, Duration, Utc};

/// Outcome of checking the gate before a generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { remaining_seconds: u64 },
}

/// Gate configuration applied to every session.
#[derive(Debug, Clone)]
pub struct SessionGate {
    threshold: u32,
    cooldown: Duration,
}

impl SessionGate {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
        }
    }

    pub fn from_secs(threshold: u32, cooldown_secs: u64) -> Self {
        Self::new(threshold, Duration::seconds(cooldown_secs as i64))
    }

    /// Check whether `session` may perform a generation at `now`.
    ///
    /// An expired deadline is cleared here, before anything else is examined,
    /// so a stale count alone never re-blocks a session without a new
    /// qualifying request.
    pub fn check(&self, session: &mut Session, now: DateTime<Utc>) -> Decision {
        if let Some(deadline) = session.blocked_until {
            if now >= deadline {
                session.clear_block(now);
            } else {
                return Decision::Deny {
                    remaining_seconds: remaining_seconds(deadline, now),
                };
            }
        }

        Decision::Allow
    }

    /// Record a successful generation at `now`, arming the cooldown when the
    /// post-increment count reaches the threshold.
    pub fn record_success(&self, session: &mut Session, now: DateTime<Utc>) {
        session.record_generation(now);
        if session.request_count >= self.threshold {
            session.block_until(now + self.cooldown, now);
        }
    }
}

/// Seconds until `deadline`, rounded up.
fn remaining_seconds(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (deadline - now).num_milliseconds().max(0);
    millis.div_ceil(1000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> SessionGate {
        SessionGate::from_secs(5, 900)
    }

    fn session() -> Session {
        Session::new("test-session".to_string())
    }

    #[test]
    fn test_fresh_session_is_allowed() {
        let mut session = session();
        let decision = gate().check(&mut session, Utc::now());
        assert_eq!(decision, Decision::Allow);
        assert_eq!(session.request_count, 0);
    }

    #[test]
    fn test_threshold_arms_cooldown_after_fifth_success() {
        let gate = gate();
        let mut session = session();
        let now = Utc::now();

        for _ in 0..4 {
            assert_eq!(gate.check(&mut session, now), Decision::Allow);
            gate.record_success(&mut session, now);
        }
        assert!(session.blocked_until.is_none());

        // The fifth success is allowed but arms the block.
        assert_eq!(gate.check(&mut session, now), Decision::Allow);
        gate.record_success(&mut session, now);
        assert_eq!(session.request_count, 5);
        assert_eq!(session.blocked_until, Some(now + Duration::seconds(900)));

        match gate.check(&mut session, now) {
            Decision::Deny { remaining_seconds } => assert_eq!(remaining_seconds, 900),
            Decision::Allow => panic!("sixth attempt should be denied"),
        }
    }

    #[test]
    fn test_remaining_seconds_decreases_and_rounds_up() {
        let gate = gate();
        let mut session = session();
        let now = Utc::now();
        session.block_until(now + Duration::seconds(900), now);

        let later = now + Duration::milliseconds(500);
        assert_eq!(
            gate.check(&mut session, later),
            Decision::Deny {
                remaining_seconds: 900
            }
        );

        let later = now + Duration::seconds(1);
        assert_eq!(
            gate.check(&mut session, later),
            Decision::Deny {
                remaining_seconds: 899
            }
        );

        let later = now + Duration::milliseconds(899_001);
        assert_eq!(
            gate.check(&mut session, later),
            Decision::Deny {
                remaining_seconds: 1
            }
        );
    }

    #[test]
    fn test_expired_deadline_clears_exactly_at_boundary() {
        let gate = gate();
        let mut session = session();
        let now = Utc::now();
        session.block_until(now + Duration::seconds(900), now);

        assert_eq!(
            gate.check(&mut session, now + Duration::seconds(900)),
            Decision::Allow
        );
        assert!(session.blocked_until.is_none());
    }

    #[test]
    fn test_stale_count_does_not_reblock_without_new_success() {
        let gate = gate();
        let mut session = session();
        let now = Utc::now();

        for _ in 0..5 {
            gate.record_success(&mut session, now);
        }

        // Past the deadline the count is still at the threshold, but checks
        // keep allowing until a new success re-arms the block.
        let after = now + Duration::seconds(901);
        assert_eq!(gate.check(&mut session, after), Decision::Allow);
        assert_eq!(gate.check(&mut session, after), Decision::Allow);
        assert_eq!(session.request_count, 5);

        gate.record_success(&mut session, after);
        assert_eq!(session.request_count, 6);
        assert_eq!(session.blocked_until, Some(after + Duration::seconds(900)));
    }

    #[test]
    fn test_count_only_moves_through_record_success() {
        let gate = gate();
        let mut session = session();
        let now = Utc::now();

        for _ in 0..10 {
            gate.check(&mut session, now);
        }
        assert_eq!(session.request_count, 0);
    }
}
