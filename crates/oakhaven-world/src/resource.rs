//! Foraging node depletion and regrowth.
//!
//! Each [`ForagingNode`] has a current `uses_remaining` count. Foraging
//! consumes one use; when it hits zero the node records a depletion
//! timestamp and starts a regrowth timer, checked once per simulation
//! tick (10 Hz) alongside the rest of `oakhaven-core::tick`'s
//! second-rate phase.

use oakhaven_types::ForagingNode;

use crate::error::WorldError;

/// Attempt to harvest one use from a foraging node.
///
/// Returns `true` if the harvest succeeded (a unit was taken and the node
/// transitioned to depleted if it reached zero), `false` if the node was
/// already depleted.
pub fn harvest(node: &mut ForagingNode, now_world_seconds: u64) -> Result<bool, WorldError> {
    if node.is_depleted() {
        return Ok(false);
    }

    node.uses_remaining = node
        .uses_remaining
        .checked_sub(1)
        .ok_or(WorldError::ArithmeticOverflow)?;

    if node.uses_remaining == 0 {
        node.depleted_at_world_seconds = Some(now_world_seconds);
    }

    Ok(true)
}

/// Check whether a depleted node's regrowth interval has elapsed, and if
/// so, restore it to full uses and clear the depletion timestamp.
///
/// Called once per simulation tick for every foraging node on the map.
pub fn tick_regrowth(node: &mut ForagingNode, now_world_seconds: u64) {
    let Some(depleted_at) = node.depleted_at_world_seconds else {
        return;
    };
    let ready_at = depleted_at.saturating_add(node.regrow_interval_seconds);
    if now_world_seconds >= ready_at {
        node.uses_remaining = node.max_uses;
        node.depleted_at_world_seconds = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use oakhaven_types::{ForageNodeId, ForageNodeKind, Position};

    use super::*;

    fn make_node(max_uses: u32, regrow: u64) -> ForagingNode {
        ForagingNode {
            id: ForageNodeId::new(),
            position: Position::new(0.0, 0.0),
            kind: ForageNodeKind::BerryBush,
            uses_remaining: max_uses,
            max_uses,
            depleted_at_world_seconds: None,
            regrow_interval_seconds: regrow,
        }
    }

    #[test]
    fn harvest_decrements_uses() {
        let mut node = make_node(3, 600);
        assert!(harvest(&mut node, 100).expect("harvest ok"));
        assert_eq!(node.uses_remaining, 2);
        assert!(node.depleted_at_world_seconds.is_none());
    }

    #[test]
    fn third_harvest_depletes_node() {
        let mut node = make_node(3, 600);
        harvest(&mut node, 100).expect("harvest ok");
        harvest(&mut node, 110).expect("harvest ok");
        assert!(harvest(&mut node, 120).expect("harvest ok"));
        assert_eq!(node.uses_remaining, 0);
        assert_eq!(node.depleted_at_world_seconds, Some(120));
        assert!(node.is_depleted());
    }

    #[test]
    fn harvest_on_depleted_node_fails() {
        let mut node = make_node(1, 600);
        harvest(&mut node, 100).expect("harvest ok");
        assert!(!harvest(&mut node, 105).expect("harvest ok"));
    }

    #[test]
    fn regrowth_restores_after_interval() {
        let mut node = make_node(3, 600);
        node.uses_remaining = 0;
        node.depleted_at_world_seconds = Some(100);
        tick_regrowth(&mut node, 699);
        assert_eq!(node.uses_remaining, 0, "not yet ready");
        tick_regrowth(&mut node, 700);
        assert_eq!(node.uses_remaining, 3);
        assert!(node.depleted_at_world_seconds.is_none());
    }

    #[test]
    fn regrowth_noop_on_non_depleted_node() {
        let mut node = make_node(3, 600);
        tick_regrowth(&mut node, 10_000);
        assert_eq!(node.uses_remaining, 3);
    }
}
