//! Speech and conversation turn-taking (§4.8).
//!
//! Speaking is validated and buffered here; which listeners actually heard
//! a speech act is a spatial question (audible range, wall attenuation)
//! that only `oakhaven-core` can answer, since it owns the tile map and
//! full resident table. [`record_heard`] is called once per listener core
//! determines was in range, to apply the conversation-window bookkeeping.

use oakhaven_types::{PendingSpeech, RejectionReason, Resident, ResidentId, Volume};

use crate::config::ConversationConfig;
use crate::error::AgentError;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn seconds(value: f64) -> u64 {
    value as u64
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Queue a speech act on `speaker`, enforcing the per-act cost, cooldown,
/// duplicate suppression, and turn lock.
///
/// `target`, when `Some`, is the directed recipient: a reply to them clears
/// any turn lock they hold against `speaker`, and `speaker` then acquires a
/// turn lock against them until the target replies or the turn times out.
pub fn speak(
    speaker: &mut Resident,
    target: Option<&mut Resident>,
    config: &ConversationConfig,
    volume: Volume,
    text: &str,
    world_seconds: u64,
) -> Result<(), AgentError> {
    if let Some(last) = speaker.transient.last_speak_time {
        if world_seconds.saturating_sub(last) < seconds(config.speak_cooldown_seconds) {
            return Err(AgentError::rejected(RejectionReason::TooSoon, "speak cooldown has not elapsed"));
        }
    }

    let normalized = normalize(text);
    let duplicate_window = seconds(config.duplicate_window_seconds);
    speaker
        .transient
        .recent_speech
        .retain(|(_, spoken_at)| world_seconds.saturating_sub(*spoken_at) < duplicate_window);
    if speaker.transient.recent_speech.iter().any(|(prior, _)| *prior == normalized) {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "duplicate speech suppressed"));
    }

    if let Some(target) = target.as_deref() {
        if let Some(locked_at) = speaker.transient.awaiting_reply_from.get(&target.id) {
            if world_seconds.saturating_sub(*locked_at) < seconds(config.turn_timeout_seconds) {
                return Err(AgentError::rejected(
                    RejectionReason::AwaitingReply,
                    "awaiting a reply from this target",
                ));
            }
        }
    }

    let energy_cost = match volume {
        Volume::Shout => config.speak_energy_cost + config.shout_energy_cost,
        Volume::Whisper | Volume::Normal => config.speak_energy_cost,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let energy_cost = energy_cost.round() as u32;
    if speaker.needs.energy < energy_cost {
        return Err(AgentError::rejected(RejectionReason::InsufficientEnergy, "not enough energy to speak"));
    }

    let target_id = target.as_ref().map(|target| target.id);
    if let Some(target) = target {
        target.transient.awaiting_reply_from.remove(&speaker.id);
    }
    if let Some(target_id) = target_id {
        speaker.transient.awaiting_reply_from.insert(target_id, world_seconds);
    }

    speaker.needs.energy = speaker.needs.energy.saturating_sub(energy_cost);
    speaker.transient.last_speak_time = Some(world_seconds);
    speaker.transient.recent_speech.push((normalized, world_seconds));
    speaker.transient.speech_buffer.push(PendingSpeech {
        text: text.to_owned(),
        volume,
        to: target_id,
        spoken_at_world_seconds: world_seconds,
    });
    Ok(())
}

/// Record that `listener` heard `speaker`'s speech within conversation
/// range: advances both parties' `last_conversation_time` and, the first
/// time this fires for the act, increments the speaker's
/// `conversation_count`.
pub fn record_heard(speaker: &mut Resident, listener: &mut Resident, world_seconds: u64) {
    let first_listener = speaker.transient.last_conversation_time != Some(world_seconds);
    speaker.transient.last_conversation_time = Some(world_seconds);
    listener.transient.last_conversation_time = Some(world_seconds);
    if first_listener {
        speaker.transient.conversation_count = speaker.transient.conversation_count.saturating_add(1);
    }
}

/// Whether `resident` counts as "conversing" for the needs subsystem's
/// decay-multiplier calculation (§4.4 step 2/3).
#[must_use]
pub fn is_conversing(resident: &Resident, config: &ConversationConfig, world_seconds: u64) -> bool {
    resident.transient.last_conversation_time.is_some_and(|last| {
        world_seconds.saturating_sub(last) <= seconds(config.conversation_window_seconds)
    })
}

/// Whether `listener_id` currently holds an unexpired turn lock against
/// `speaker`'s directed speech (used by the arbiter to surface a clearer
/// precondition message before calling [`speak`]).
#[must_use]
pub fn has_turn_lock(speaker: &Resident, listener_id: ResidentId, config: &ConversationConfig, world_seconds: u64) -> bool {
    speaker.transient.awaiting_reply_from.get(&listener_id).is_some_and(|locked_at| {
        world_seconds.saturating_sub(*locked_at) < seconds(config.turn_timeout_seconds)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{Custody, LifecycleStatus, Needs, Position, ResidentKind, ResidentTransient, SpeedMode};

    use super::*;

    fn resident() -> Resident {
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
            needs: Needs::full(),
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
    fn speak_queues_on_the_speech_buffer() {
        let mut speaker = resident();
        let config = ConversationConfig::default();
        speak(&mut speaker, None, &config, Volume::Normal, "hello", 0).unwrap();
        assert_eq!(speaker.transient.speech_buffer.len(), 1);
    }

    #[test]
    fn speak_rejects_within_the_cooldown() {
        let mut speaker = resident();
        let config = ConversationConfig::default();
        speak(&mut speaker, None, &config, Volume::Normal, "hello", 0).unwrap();
        let err = speak(&mut speaker, None, &config, Volume::Normal, "again", 0).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::TooSoon);
    }

    #[test]
    fn speak_rejects_duplicate_text() {
        let mut speaker = resident();
        let config = ConversationConfig::default();
        speak(&mut speaker, None, &config, Volume::Normal, "Hello", 0).unwrap();
        let later = seconds(config.speak_cooldown_seconds) + 1;
        let err = speak(&mut speaker, None, &config, Volume::Normal, "  hello ", later).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::InvalidParams);
    }

    #[test]
    fn directed_speech_locks_the_turn_against_the_target() {
        let mut speaker = resident();
        let mut target = resident();
        let config = ConversationConfig::default();
        speak(&mut speaker, Some(&mut target), &config, Volume::Normal, "hi", 0).unwrap();
        assert!(has_turn_lock(&speaker, target.id, &config, 0));
    }

    #[test]
    fn a_reply_clears_the_original_turn_lock() {
        let mut a = resident();
        let mut b = resident();
        let config = ConversationConfig::default();
        speak(&mut a, Some(&mut b), &config, Volume::Normal, "hi", 0).unwrap();
        let later = seconds(config.speak_cooldown_seconds) + 1;
        speak(&mut b, Some(&mut a), &config, Volume::Normal, "hi back", later).unwrap();
        assert!(b.transient.awaiting_reply_from.get(&a.id).is_none());
    }

    #[test]
    fn shout_costs_more_energy_than_normal_speech() {
        let config = ConversationConfig::default();
        let mut shouter = resident();
        speak(&mut shouter, None, &config, Volume::Shout, "hey!", 0).unwrap();
        let mut speaker = resident();
        speak(&mut speaker, None, &config, Volume::Normal, "hey", 0).unwrap();
        assert!(shouter.needs.energy < speaker.needs.energy);
    }

    #[test]
    fn record_heard_advances_both_conversation_timestamps() {
        let mut speaker = resident();
        let mut listener = resident();
        record_heard(&mut speaker, &mut listener, 50);
        assert_eq!(speaker.transient.last_conversation_time, Some(50));
        assert_eq!(listener.transient.last_conversation_time, Some(50));
        assert_eq!(speaker.transient.conversation_count, 1);
    }
}
