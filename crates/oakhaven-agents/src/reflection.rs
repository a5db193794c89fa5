//! Milestone and periodic reflection webhooks, and feedback-token
//! issuance/redemption (§4.9).
//!
//! Third-party identity claim flows (GitHub rewards, referral maturation)
//! are out of scope; `get_referral_link`/`claim_referrals` only need a
//! deterministic referral URL and a no-op claim count here.

use std::collections::HashMap;

use oakhaven_types::{FeedbackToken, Resident, ResidentId};

/// A milestone reflection fires exactly once per resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    /// Survived 30 minutes of wall-clock time.
    ThirtyMinutesSurvival,
    /// Completed their first successful (heard) conversation.
    FirstConversation,
    /// Recovered above health 50 after having dropped below health 20.
    HealthRecovery,
}

/// Tracks which milestones have already fired and issues feedback tokens
/// for reflections.
#[derive(Debug, Clone, Default)]
pub struct ReflectionTracker {
    fired_milestones: HashMap<(ResidentId, Milestone), ()>,
    /// Resident who dropped below health 20 and has not yet recovered, for
    /// the [`Milestone::HealthRecovery`] edge trigger.
    pending_recovery: HashMap<ResidentId, bool>,
    outstanding_tokens: HashMap<FeedbackToken, ResidentId>,
}

impl ReflectionTracker {
    /// A tracker with nothing fired yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `milestone` has already fired for `resident`.
    #[must_use]
    pub fn has_fired(&self, resident: ResidentId, milestone: Milestone) -> bool {
        self.fired_milestones.contains_key(&(resident, milestone))
    }

    /// Track health crossing below 20 or recovering above 50, returning
    /// `true` exactly once: when it recovers above 50 having previously
    /// dropped below 20.
    pub fn track_health_recovery(&mut self, resident: ResidentId, health: u32) -> bool {
        if health < 20 {
            self.pending_recovery.insert(resident, true);
            return false;
        }
        if health > 50 && self.pending_recovery.get(&resident).copied().unwrap_or(false) {
            self.pending_recovery.insert(resident, false);
            return true;
        }
        false
    }

    /// Mint a reflection for `milestone`, provided it has not already
    /// fired for this resident. Returns the single-use feedback token to
    /// attach to the webhook payload.
    pub fn fire_milestone(&mut self, resident: ResidentId, milestone: Milestone) -> Option<FeedbackToken> {
        if self.has_fired(resident, milestone) {
            return None;
        }
        self.fired_milestones.insert((resident, milestone), ());
        Some(self.mint_token(resident))
    }

    /// Mint a reflection token for the periodic (non-milestone) reflection.
    pub fn fire_periodic(&mut self, resident: ResidentId) -> FeedbackToken {
        self.mint_token(resident)
    }

    fn mint_token(&mut self, resident: ResidentId) -> FeedbackToken {
        let token = FeedbackToken::new();
        self.outstanding_tokens.insert(token, resident);
        token
    }

    /// Redeem `token` for `resident`'s free-text feedback response.
    ///
    /// Single-use: the token is consumed on success. Returns `false` if the
    /// token is unknown, already redeemed, or was minted for a different
    /// resident.
    pub fn redeem(&mut self, token: FeedbackToken, resident: ResidentId) -> bool {
        match self.outstanding_tokens.get(&token) {
            Some(owner) if *owner == resident => {
                self.outstanding_tokens.remove(&token);
                true
            }
            _ => false,
        }
    }

    /// Redeem `token` without knowing its owner in advance, for the HTTP
    /// feedback endpoint presented with only the token from a webhook
    /// payload. Returns the owning resident on success.
    pub fn redeem_by_token(&mut self, token: FeedbackToken) -> Option<ResidentId> {
        self.outstanding_tokens.remove(&token)
    }
}

/// A deterministic, non-secret referral URL derived from the resident's
/// passport number. The underlying reward/maturation logic is an external
/// collaborator concern; this server only needs a stable link to hand out.
#[must_use]
pub fn referral_link(resident: &Resident) -> String {
    format!("https://oakhaven.example/join?ref={}", resident.passport_no)
}

/// Claimed-referral count. Maturation tracking lives outside the core, so
/// this always reports zero pending claims.
#[must_use]
pub const fn claim_referrals() -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_fires_once_per_resident() {
        let mut tracker = ReflectionTracker::new();
        let resident = ResidentId::new();
        assert!(tracker.fire_milestone(resident, Milestone::FirstConversation).is_some());
        assert!(tracker.fire_milestone(resident, Milestone::FirstConversation).is_none());
    }

    #[test]
    fn health_recovery_milestone_requires_a_prior_dip_below_twenty() {
        let mut tracker = ReflectionTracker::new();
        let resident = ResidentId::new();
        assert!(!tracker.track_health_recovery(resident, 60));
        tracker.track_health_recovery(resident, 10);
        assert!(tracker.track_health_recovery(resident, 60));
    }

    #[test]
    fn health_recovery_fires_only_once_per_dip() {
        let mut tracker = ReflectionTracker::new();
        let resident = ResidentId::new();
        tracker.track_health_recovery(resident, 10);
        assert!(tracker.track_health_recovery(resident, 60));
        assert!(!tracker.track_health_recovery(resident, 70));
    }

    #[test]
    fn token_redeems_exactly_once_for_its_owner() {
        let mut tracker = ReflectionTracker::new();
        let resident = ResidentId::new();
        let token = tracker.fire_periodic(resident);
        assert!(tracker.redeem(token, resident));
        assert!(!tracker.redeem(token, resident));
    }

    #[test]
    fn token_cannot_be_redeemed_by_a_different_resident() {
        let mut tracker = ReflectionTracker::new();
        let resident = ResidentId::new();
        let imposter = ResidentId::new();
        let token = tracker.fire_periodic(resident);
        assert!(!tracker.redeem(token, imposter));
    }

    #[test]
    fn redeem_by_token_resolves_the_owner_without_knowing_it_upfront() {
        let mut tracker = ReflectionTracker::new();
        let resident = ResidentId::new();
        let token = tracker.fire_periodic(resident);
        assert_eq!(tracker.redeem_by_token(token), Some(resident));
        assert_eq!(tracker.redeem_by_token(token), None);
    }
}
