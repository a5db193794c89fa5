//! Perception assembly for the Perception phase of the tick cycle.
//!
//! Builds the per-resident [`Perception`] packet (§4.5): self-state, visible
//! residents/buildings/forage nodes under field-of-view and line-of-sight
//! rules, audible speech attenuated by walls, and the interaction tags
//! permitted by the resident's current state. Spectators instead receive
//! the unfiltered [`SpectatorView`] via [`assemble_spectator_view`].

use oakhaven_types::{
    AudibleMessage, CustodySummary, EmploymentSummary, ForagingNode, ItemType, LifecycleStatus,
    NeedsTenths, Perception, Resident, SelfState, SpectatorView, StructureKind, TimeOfDay,
    VisibleBuilding, VisibleForageNode, VisibleResident, Volume,
};
use oakhaven_world::TileMap;

use crate::config::PerceptionConfig;

/// Context shared across every resident's perception assembly within one
/// perception tick.
pub struct PerceptionContext<'a> {
    /// World-seconds timestamp this perception batch is computed at.
    pub world_seconds: u64,
    /// Current time-of-day phase.
    pub time_of_day: TimeOfDay,
    /// The immutable map artifact (for LOS and wall counting).
    pub map: &'a TileMap,
    /// Every resident currently in the world (alive and unprocessed bodies).
    pub residents: &'a [Resident],
    /// Every live foraging node.
    pub forage_nodes: &'a [ForagingNode],
    /// Spatial perception tunables.
    pub config: &'a PerceptionConfig,
}

/// Assemble the complete perception packet for one connected resident.
#[must_use]
pub fn assemble_perception(viewer: &Resident, ctx: &PerceptionContext<'_>) -> Perception {
    let night_vision = night_vision_multiplier(ctx.time_of_day, ctx.config.night_vision_floor);

    Perception {
        world_seconds: ctx.world_seconds,
        time_of_day: ctx.time_of_day,
        self_state: build_self_state(viewer),
        visible_residents: visible_residents(viewer, ctx, night_vision),
        visible_buildings: visible_buildings(viewer, ctx),
        visible_forage_nodes: visible_forage_nodes(viewer, ctx),
        audible_messages: audible_messages(viewer, ctx),
        interaction_tags: interaction_tags(viewer, ctx),
        pending_notifications: viewer.transient.pending_notifications.clone(),
    }
}

/// Assemble the unfiltered view delivered to a spectator connection.
#[must_use]
pub fn assemble_spectator_view(ctx: &PerceptionContext<'_>) -> SpectatorView {
    let buildings = ctx
        .map
        .buildings
        .iter()
        .map(|b| VisibleBuilding {
            id: b.id,
            kind: b.kind,
            position: b.position,
        })
        .collect();

    let buffered_speech = ctx
        .residents
        .iter()
        .flat_map(|r| {
            r.transient.speech_buffer.iter().map(move |speech| AudibleMessage {
                from: r.id,
                text: speech.text.clone(),
                directed_at_me: false,
            })
        })
        .collect();

    SpectatorView {
        world_seconds: ctx.world_seconds,
        residents: ctx.residents.to_vec(),
        buildings,
        forage_nodes: ctx.forage_nodes.to_vec(),
        buffered_speech,
    }
}

fn build_self_state(viewer: &Resident) -> SelfState {
    let employment = viewer.employment.map(|e| EmploymentSummary {
        job_id: e.job_id,
        on_shift: e.on_shift,
    });

    let custody = CustodySummary {
        offense_count: u32::try_from(viewer.custody.offenses.len()).unwrap_or(u32::MAX),
        arrested_by: viewer.custody.arrested_by,
        prison_sentence_end_world_seconds: viewer.custody.prison_sentence_end_world_seconds,
        carrying_suspect_id: viewer.custody.carrying_suspect_id,
        carrying_body_id: viewer.custody.carrying_body_id,
    };

    SelfState {
        id: viewer.id,
        position: viewer.position,
        facing_degrees: viewer.facing_degrees,
        needs: NeedsTenths::from(viewer.needs),
        wallet: viewer.wallet,
        inventory: viewer.inventory.clone(),
        status: viewer.status,
        employment,
        custody,
        awaiting_reply_from: viewer.transient.awaiting_reply_from.keys().copied().collect(),
    }
}

/// Night-vision multiplier in `[night_vision_floor, 1]`, scaling ambient and
/// FOV ranges by time of day. Day is full visibility, night is the
/// configured floor, dawn/dusk interpolate at the cycle's midpoint.
fn night_vision_multiplier(time_of_day: TimeOfDay, floor: f64) -> f64 {
    match time_of_day {
        TimeOfDay::Day => 1.0,
        TimeOfDay::Dawn | TimeOfDay::Dusk => floor + (1.0 - floor) / 2.0,
        TimeOfDay::Night => floor,
    }
}

fn visible_residents(
    viewer: &Resident,
    ctx: &PerceptionContext<'_>,
    night_vision: f64,
) -> Vec<VisibleResident> {
    let ambient_radius = ctx.config.ambient_radius_px * night_vision;
    let fov_radius = ctx.config.fov_radius_px * night_vision;
    let half_fov_angle = ctx.config.fov_angle_degrees / 2.0;

    ctx.residents
        .iter()
        .filter(|other| other.id != viewer.id)
        .filter(|other| {
            let distance = viewer.position.distance_to(other.position);
            if distance <= ambient_radius {
                return true;
            }
            if distance > fov_radius {
                return false;
            }
            let angle_to = angle_degrees(viewer.position, other.position);
            let delta = angular_difference(f64::from(viewer.facing_degrees), angle_to);
            delta <= half_fov_angle
                && ctx.map.has_line_of_sight(
                    viewer.position.x,
                    viewer.position.y,
                    other.position.x,
                    other.position.y,
                )
        })
        .map(|other| VisibleResident {
            id: other.id,
            position: other.position,
            facing_degrees: other.facing_degrees,
            status: other.status,
            speed_mode: other.speed_mode,
        })
        .collect()
}

fn visible_buildings(viewer: &Resident, ctx: &PerceptionContext<'_>) -> Vec<VisibleBuilding> {
    ctx.map
        .buildings
        .iter()
        .filter(|b| viewer.position.distance_to(b.position) <= ctx.config.structure_visibility_radius_px)
        .map(|b| VisibleBuilding {
            id: b.id,
            kind: b.kind,
            position: b.position,
        })
        .collect()
}

fn visible_forage_nodes(
    viewer: &Resident,
    ctx: &PerceptionContext<'_>,
) -> Vec<VisibleForageNode> {
    ctx.forage_nodes
        .iter()
        .filter(|node| {
            viewer.position.distance_to(node.position) <= ctx.config.structure_visibility_radius_px
        })
        .map(|node| VisibleForageNode {
            id: node.id,
            position: node.position,
            uses_remaining: node.uses_remaining,
        })
        .collect()
}

fn audible_messages(viewer: &Resident, ctx: &PerceptionContext<'_>) -> Vec<AudibleMessage> {
    ctx.residents
        .iter()
        .filter(|speaker| speaker.id != viewer.id)
        .flat_map(|speaker| {
            speaker.transient.speech_buffer.iter().filter_map(move |speech| {
                let base_range = match speech.volume {
                    Volume::Whisper => ctx.config.whisper_range_px,
                    Volume::Normal => ctx.config.normal_range_px,
                    Volume::Shout => ctx.config.shout_range_px,
                };
                let walls = ctx.map.count_walls_between(
                    speaker.position.x,
                    speaker.position.y,
                    viewer.position.x,
                    viewer.position.y,
                );
                let attenuation = ctx.config.wall_attenuation.powi(i32::try_from(walls).unwrap_or(i32::MAX));
                let effective_range = base_range * attenuation;
                let distance = speaker.position.distance_to(viewer.position);
                (distance <= effective_range).then(|| AudibleMessage {
                    from: speaker.id,
                    text: speech.text.clone(),
                    directed_at_me: speech.to == Some(viewer.id),
                })
            })
        })
        .collect()
}

/// Derive the interaction tags permitted by `viewer`'s current state (§4.5).
fn interaction_tags(viewer: &Resident, ctx: &PerceptionContext<'_>) -> Vec<String> {
    if viewer.is_imprisoned() {
        return vec!["speak".to_owned(), "inspect".to_owned(), "submit_feedback".to_owned()];
    }

    let mut tags = vec!["speak".to_owned(), "inspect".to_owned()];

    if viewer.status != LifecycleStatus::Alive {
        return tags;
    }

    if !viewer.sleeping && viewer.needs.energy > 0 {
        tags.push("move".to_owned());
        tags.push("move_to".to_owned());
    }
    if viewer.sleeping {
        tags.push("wake".to_owned());
    } else if viewer.needs.energy < 90 {
        tags.push("sleep".to_owned());
    }

    for item in &viewer.inventory {
        match item.item_type {
            ItemType::Bread | ItemType::WildBerries => tags.push("eat".to_owned()),
            ItemType::WaterFlask => tags.push("drink".to_owned()),
            ItemType::SleepingBag => {}
        }
    }

    if let Some(building_id) = viewer.current_building {
        if let Some(building) = ctx.map.building(building_id) {
            match building.kind {
                StructureKind::Shop => tags.push("buy".to_owned()),
                StructureKind::Bank => tags.push("collect_ubi".to_owned()),
                StructureKind::CouncilHall => {
                    tags.push("apply_job".to_owned());
                    tags.push("quit_job".to_owned());
                    tags.push("list_jobs".to_owned());
                    tags.push("write_petition".to_owned());
                    tags.push("vote_petition".to_owned());
                    tags.push("list_petitions".to_owned());
                }
                StructureKind::Mortuary => {
                    if viewer.custody.carrying_body_id.is_some() {
                        tags.push("process_body".to_owned());
                    }
                }
                StructureKind::PoliceStation => {
                    if viewer.custody.carrying_suspect_id.is_some() {
                        tags.push("book_suspect".to_owned());
                    }
                }
                StructureKind::Station => {}
            }
        }
        tags.push("exit_building".to_owned());
    } else {
        for building in &ctx.map.buildings {
            if viewer.position.distance_to(building.position) <= ctx.config.door_interaction_radius_px {
                tags.push(format!("enter_building:{}", building.id));
            }
        }
    }

    tags.push("use_toilet".to_owned());
    tags
}

/// Angle, in degrees `[0, 360)`, from `from` to `to`.
fn angle_degrees(from: oakhaven_types::Position, to: oakhaven_types::Position) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let degrees = dy.atan2(dx).to_degrees();
    (degrees + 360.0) % 360.0
}

/// Smallest absolute angular difference between two degree headings.
fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{
        Custody, Needs, Position, ResidentId, ResidentKind, ResidentTransient, SpeedMode,
    };
    use oakhaven_world::TileMap;

    use super::*;

    fn flat_map() -> TileMap {
        TileMap::new(20, 20, 32.0, vec![false; 400], Vec::new(), Vec::new(), Position::new(16.0, 16.0))
            .unwrap()
    }

    fn resident_at(x: f64, y: f64) -> Resident {
        Resident {
            id: ResidentId::new(),
            passport_no: "OC-0000001".to_owned(),
            display_name: "Test".to_owned(),
            kind: ResidentKind::Agent,
            status: LifecycleStatus::Alive,
            position: Position::new(x, y),
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

    fn config() -> PerceptionConfig {
        PerceptionConfig::default()
    }

    #[test]
    fn ambient_radius_is_always_visible_regardless_of_facing() {
        let map = flat_map();
        let cfg = config();
        let mut viewer = resident_at(100.0, 100.0);
        viewer.facing_degrees = 180; // facing away
        let other = resident_at(120.0, 100.0);
        let ctx = PerceptionContext {
            world_seconds: 0,
            time_of_day: TimeOfDay::Day,
            map: &map,
            residents: &[viewer.clone(), other.clone()],
            forage_nodes: &[],
            config: &cfg,
        };
        let visible = visible_residents(&viewer, &ctx, 1.0);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn fov_cone_excludes_residents_behind_the_viewer() {
        let map = flat_map();
        let cfg = config();
        let mut viewer = resident_at(100.0, 100.0);
        viewer.facing_degrees = 0; // facing +x
        let behind = resident_at(100.0 - cfg.fov_radius_px / 2.0, 100.0); // directly behind
        let ctx = PerceptionContext {
            world_seconds: 0,
            time_of_day: TimeOfDay::Day,
            map: &map,
            residents: &[viewer.clone(), behind.clone()],
            forage_nodes: &[],
            config: &cfg,
        };
        let visible = visible_residents(&viewer, &ctx, 1.0);
        assert!(visible.is_empty());
    }

    #[test]
    fn night_vision_shrinks_visibility() {
        assert_eq!(night_vision_multiplier(TimeOfDay::Day, 0.35), 1.0);
        assert_eq!(night_vision_multiplier(TimeOfDay::Night, 0.35), 0.35);
    }

    #[test]
    fn imprisoned_resident_has_restricted_tags() {
        let map = flat_map();
        let cfg = config();
        let mut viewer = resident_at(0.0, 0.0);
        viewer.custody.prison_sentence_end_world_seconds = Some(100);
        let ctx = PerceptionContext {
            world_seconds: 0,
            time_of_day: TimeOfDay::Day,
            map: &map,
            residents: &[viewer.clone()],
            forage_nodes: &[],
            config: &cfg,
        };
        let tags = interaction_tags(&viewer, &ctx);
        assert_eq!(tags, vec!["speak", "inspect", "submit_feedback"]);
    }

    #[test]
    fn sleeping_resident_gets_wake_tag_not_sleep() {
        let map = flat_map();
        let cfg = config();
        let mut viewer = resident_at(0.0, 0.0);
        viewer.sleeping = true;
        let ctx = PerceptionContext {
            world_seconds: 0,
            time_of_day: TimeOfDay::Day,
            map: &map,
            residents: &[viewer.clone()],
            forage_nodes: &[],
            config: &cfg,
        };
        let tags = interaction_tags(&viewer, &ctx);
        assert!(tags.contains(&"wake".to_owned()));
        assert!(!tags.contains(&"sleep".to_owned()));
    }

    #[test]
    fn audible_message_respects_wall_attenuated_range() {
        let blocked: Vec<bool> = (0..400)
            .map(|i| {
                let tx = i % 20;
                let ty = i / 20;
                tx == 3 && (5..15).contains(&ty)
            })
            .collect();
        let map = TileMap::new(20, 20, 32.0, blocked, Vec::new(), Vec::new(), Position::new(16.0, 16.0)).unwrap();
        let cfg = config();
        let mut speaker = resident_at(0.0, 320.0);
        speaker.transient.speech_buffer.push(oakhaven_types::PendingSpeech {
            text: "hello".to_owned(),
            volume: Volume::Whisper,
            to: None,
            spoken_at_world_seconds: 0,
        });
        let listener = resident_at(320.0, 320.0); // far side of the wall
        let ctx = PerceptionContext {
            world_seconds: 0,
            time_of_day: TimeOfDay::Day,
            map: &map,
            residents: &[speaker.clone(), listener.clone()],
            forage_nodes: &[],
            config: &cfg,
        };
        let heard = audible_messages(&listener, &ctx);
        assert!(heard.is_empty());
    }
}
