//! Pain signal emission (§4.9).
//!
//! For each of hunger, thirst, social, and health, three severity tiers are
//! defined by fixed thresholds. Crossing into a tier enqueues a pain message
//! in the resident's `pending_pain_messages` buffer, subject to a per-tier
//! cooldown so a need sitting just inside a tier boundary does not spam the
//! client every tick.

use oakhaven_types::{PainMessage, PainSeverity, PainSource, Resident};

/// Minimum world-seconds between two pain messages for the same
/// `(source, severity)` pair.
const PAIN_COOLDOWN_SECONDS: u64 = 20;

/// `(mild, severe, agony)` thresholds: the need value at or below which the
/// corresponding tier applies. Health uses the same tiers; hunger/thirst/
/// social share this table since all four are `[0, 100]` dimensions.
const TIER_THRESHOLDS: (u32, u32, u32) = (40, 15, 0);

fn tier_for(value: u32) -> Option<PainSeverity> {
    let (mild, severe, agony) = TIER_THRESHOLDS;
    if value <= agony {
        Some(PainSeverity::Agony)
    } else if value <= severe {
        Some(PainSeverity::Severe)
    } else if value <= mild {
        Some(PainSeverity::Mild)
    } else {
        None
    }
}

fn describe(source: PainSource, severity: PainSeverity) -> String {
    let noun = match source {
        PainSource::Hunger => "hunger",
        PainSource::Thirst => "thirst",
        PainSource::Social => "loneliness",
        PainSource::Health => "pain",
    };
    match severity {
        PainSeverity::Mild => format!("a nagging ache of {noun}"),
        PainSeverity::Severe => format!("a sharp pang of {noun}"),
        PainSeverity::Agony => format!("overwhelming {noun}"),
    }
}

/// Evaluate every need channel against its severity tiers and enqueue any
/// newly-eligible pain messages, respecting the per-source-per-tier
/// cooldown.
pub fn evaluate(resident: &mut Resident, world_seconds: u64) {
    let needs = resident.needs;
    let channels = [
        (PainSource::Hunger, needs.hunger),
        (PainSource::Thirst, needs.thirst),
        (PainSource::Social, needs.social),
        (PainSource::Health, needs.health),
    ];

    for (source, value) in channels {
        let Some(severity) = tier_for(value) else {
            continue;
        };
        let key = (source, severity);
        let ready = resident
            .transient
            .pain_cooldowns
            .get(&key)
            .is_none_or(|last| world_seconds.saturating_sub(*last) >= PAIN_COOLDOWN_SECONDS);
        if !ready {
            continue;
        }
        resident.transient.pain_cooldowns.insert(key, world_seconds);
        resident.transient.pending_pain_messages.push(PainMessage {
            message: describe(source, severity),
            source,
            intensity: severity,
            needs_snapshot: needs,
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{Custody, LifecycleStatus, Needs, Position, ResidentId, ResidentKind, ResidentTransient, SpeedMode};

    use super::*;

    fn resident(needs: Needs) -> Resident {
        Resident {
            id: ResidentId::new(),
            passport_no: "OC-0000001".to_owned(),
            display_name: "Test".to_owned(),
            kind: ResidentKind::Agent,
            status: LifecycleStatus::Alive,
            position: Position::new(0.0, 0.0),
            facing_degrees: 0,
            velocity: Position::new(0.0, 0.0),
            speed_mode: SpeedMode::Stopped,
            sleeping: false,
            needs,
            wallet: 0,
            inventory: Vec::new(),
            employment: None,
            current_building: None,
            webhook_url: None,
            bio: None,
            custody: Custody::default(),
            transient: ResidentTransient::default(),
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn healthy_needs_emit_nothing() {
        let mut r = resident(Needs::full());
        evaluate(&mut r, 0);
        assert!(r.transient.pending_pain_messages.is_empty());
    }

    #[test]
    fn low_hunger_emits_a_mild_pain_message() {
        let mut r = resident(Needs { hunger: 30, ..Needs::full() });
        evaluate(&mut r, 0);
        assert_eq!(r.transient.pending_pain_messages.len(), 1);
        assert_eq!(r.transient.pending_pain_messages[0].intensity, PainSeverity::Mild);
    }

    #[test]
    fn zero_health_emits_agony() {
        let mut r = resident(Needs { health: 0, ..Needs::full() });
        evaluate(&mut r, 0);
        assert_eq!(r.transient.pending_pain_messages[0].intensity, PainSeverity::Agony);
    }

    #[test]
    fn cooldown_suppresses_repeat_messages_in_the_same_window() {
        let mut r = resident(Needs { thirst: 10, ..Needs::full() });
        evaluate(&mut r, 0);
        evaluate(&mut r, 1);
        assert_eq!(r.transient.pending_pain_messages.len(), 1);
    }

    #[test]
    fn cooldown_expires_after_the_configured_window() {
        let mut r = resident(Needs { thirst: 10, ..Needs::full() });
        evaluate(&mut r, 0);
        evaluate(&mut r, PAIN_COOLDOWN_SECONDS);
        assert_eq!(r.transient.pending_pain_messages.len(), 2);
    }
}
