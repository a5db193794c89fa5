//! Per-action dispatch (§4.10).
//!
//! Each handler assumes the shared precondition pipeline
//! ([`super::validation::check_preconditions`]) has already passed; it
//! only applies the action's own preconditions and effects, then reports a
//! success payload or an [`AgentError`].
//!
//! Movement actions (`Move`, `Stop`, `Face`, `MoveTo`) only set intent on
//! the resident (`speed_mode`, `facing_degrees`, `velocity`,
//! `transient.path_state`); the 30 Hz position tick elsewhere applies
//! `oakhaven_world::collision::resolve_move` against that intent every
//! frame.

use oakhaven_ledger::Ledger;
use oakhaven_types::{
    ActionEnvelope, ActionResult, ActionType, ApplyJobParams, BuyParams, ConsumeParams, EnterBuildingParams,
    FaceParams, ForageParams, ForagingNode, GiveParams, InspectCard, ItemType, MoveParams, MoveToParams,
    Petition, PetitionId, Position, RejectionReason, Resident, SpeakParams, StructureKind,
    SubmitFeedbackParams, TargetResidentParams, TradeParams, VotePetitionParams, WritePetitionParams,
};

use crate::config::{ConversationConfig, EconomyConfig, LawConfig};
use crate::error::AgentError;
use crate::jobs::JobBoard;
use crate::petitions::PetitionBoard;
use crate::reflection::ReflectionTracker;
use crate::shop::ShopRegistry;
use crate::{conversation, death, economy, employment, inventory, law_enforcement, reflection};

use super::costs::energy_cost;
use super::validation::check_preconditions;

/// Radius, in pixels, within which a resident may interact with a building
/// door or a foraging node.
const INTERACTION_RANGE_PX: f64 = 48.0;

/// Walking and running speed, in pixels per second, applied to a `Move`
/// action's velocity.
const WALK_SPEED_PX_PER_SEC: f64 = 60.0;
const RUN_SPEED_PX_PER_SEC: f64 = 120.0;

/// A petition's lifetime on the board before it auto-expires.
const PETITION_LIFETIME_WORLD_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Everything a handler needs beyond the acting resident and, where
/// applicable, a resolved target.
pub struct ActionContext<'a> {
    /// The immutable map artifact, for range/building/path queries.
    pub tile_map: &'a oakhaven_world::TileMap,
    /// Economy tunables (UBI amount, shift length).
    pub economy: &'a EconomyConfig,
    /// Law enforcement tunables.
    pub law: &'a LawConfig,
    /// Conversation tunables.
    pub conversation: &'a ConversationConfig,
    /// The colony's job postings.
    pub jobs: &'a mut JobBoard,
    /// The colony shop's price/stock table.
    pub shop: &'a mut ShopRegistry,
    /// Active council petitions.
    pub petitions: &'a mut PetitionBoard,
    /// The append-only currency ledger.
    pub ledger: &'a mut Ledger,
    /// Milestone/periodic reflection state and outstanding feedback tokens.
    pub reflections: &'a mut ReflectionTracker,
    /// The current world-clock reading, in world-seconds.
    pub world_seconds: u64,
}

fn params<T: serde::de::DeserializeOwned>(envelope: &ActionEnvelope) -> Result<T, AgentError> {
    serde_json::from_value(envelope.params.clone())
        .map_err(|err| AgentError::rejected(RejectionReason::InvalidParams, err.to_string()))
}

fn building_of_kind<'a>(
    ctx: &ActionContext<'a>,
    actor: &Resident,
    kind: StructureKind,
) -> Result<&'a oakhaven_world::tile_map::BuildingPlacement, AgentError> {
    let Some(id) = actor.current_building else {
        return Err(AgentError::rejected(RejectionReason::WrongBuilding, "not inside a building"));
    };
    let Some(building) = ctx.tile_map.building(id) else {
        return Err(AgentError::rejected(RejectionReason::WrongBuilding, "building no longer exists"));
    };
    if building.kind != kind {
        return Err(AgentError::rejected(RejectionReason::WrongBuilding, "wrong kind of building"));
    }
    Ok(building)
}

fn charge_energy(actor: &mut Resident, action: ActionType) -> Result<(), AgentError> {
    let cost = energy_cost(action);
    if actor.needs.energy < cost {
        return Err(AgentError::rejected(RejectionReason::InsufficientEnergy, "not enough energy"));
    }
    actor.needs.energy = actor.needs.energy.saturating_sub(cost);
    Ok(())
}

/// Dispatch one inbound [`ActionEnvelope`] against `actor`, with `target`
/// and `node` resolved by the caller when the action names one.
///
/// Never panics: every failure path is reported as an `action_result` with
/// status `error`, never propagated as a Rust error out of this function.
pub fn dispatch(
    actor: &mut Resident,
    target: Option<&mut Resident>,
    node: Option<&mut ForagingNode>,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> ActionResult {
    match run(actor, target, node, envelope, ctx) {
        Ok(data) => ActionResult::ok(envelope.request_id, data),
        Err(err) => ActionResult::rejected(envelope.request_id, err.into_details()),
    }
}

#[allow(clippy::too_many_lines)]
fn run(
    actor: &mut Resident,
    target: Option<&mut Resident>,
    node: Option<&mut ForagingNode>,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    check_preconditions(
        actor,
        envelope.action,
        envelope.request_id,
        ctx.world_seconds,
        ctx.conversation.request_id_ttl_seconds,
    )?;

    match envelope.action {
        ActionType::Move => handle_move(actor, envelope),
        ActionType::Stop => handle_stop(actor),
        ActionType::Face => handle_face(actor, envelope),
        ActionType::MoveTo => handle_move_to(actor, envelope, ctx),
        ActionType::Speak => handle_speak(actor, target, envelope, ctx),
        ActionType::Sleep => handle_sleep(actor, ctx.world_seconds),
        ActionType::Wake => handle_wake(actor),
        ActionType::EnterBuilding => handle_enter_building(actor, envelope, ctx),
        ActionType::ExitBuilding => handle_exit_building(actor, ctx),
        ActionType::Buy => handle_buy(actor, envelope, ctx),
        ActionType::CollectUbi => handle_collect_ubi(actor, ctx),
        ActionType::UseToilet => handle_use_toilet(actor),
        ActionType::Eat => handle_eat(actor, envelope),
        ActionType::Drink => handle_drink(actor, envelope),
        ActionType::Inspect => handle_inspect(target),
        ActionType::Trade => handle_trade(actor, target, envelope, ctx),
        ActionType::Give => handle_give(actor, target, envelope),
        ActionType::ApplyJob => handle_apply_job(actor, envelope, ctx),
        ActionType::QuitJob => handle_quit_job(actor, ctx),
        ActionType::ListJobs => handle_list_jobs(ctx),
        ActionType::WritePetition => handle_write_petition(actor, envelope, ctx),
        ActionType::VotePetition => handle_vote_petition(actor, envelope, ctx),
        ActionType::ListPetitions => handle_list_petitions(ctx),
        ActionType::Depart => handle_depart(actor),
        ActionType::CollectBody => handle_collect_body(actor, target),
        ActionType::ProcessBody => handle_process_body(actor, ctx),
        ActionType::Arrest => handle_arrest(actor, target, ctx),
        ActionType::BookSuspect => handle_book_suspect(actor, target, ctx),
        ActionType::Forage => handle_forage(actor, envelope, node, ctx),
        ActionType::GetReferralLink => handle_get_referral_link(actor),
        ActionType::ClaimReferrals => handle_claim_referrals(),
        ActionType::SubmitFeedback => handle_submit_feedback(actor, envelope, ctx),
    }
}

fn handle_move(actor: &mut Resident, envelope: &ActionEnvelope) -> Result<Option<serde_json::Value>, AgentError> {
    let p: MoveParams = params(envelope)?;
    charge_energy(actor, ActionType::Move)?;
    let radians = f64::from(p.direction_degrees).to_radians();
    let speed_px = match p.speed {
        oakhaven_types::SpeedMode::Running => RUN_SPEED_PX_PER_SEC,
        oakhaven_types::SpeedMode::Walking => WALK_SPEED_PX_PER_SEC,
        oakhaven_types::SpeedMode::Stopped => 0.0,
    };
    actor.facing_degrees = p.direction_degrees;
    actor.speed_mode = p.speed;
    actor.velocity = Position::new(radians.cos() * speed_px, radians.sin() * speed_px);
    actor.transient.path_state = None;
    Ok(None)
}

fn handle_stop(actor: &mut Resident) -> Result<Option<serde_json::Value>, AgentError> {
    actor.speed_mode = oakhaven_types::SpeedMode::Stopped;
    actor.velocity = Position::new(0.0, 0.0);
    actor.transient.path_state = None;
    Ok(None)
}

fn handle_face(actor: &mut Resident, envelope: &ActionEnvelope) -> Result<Option<serde_json::Value>, AgentError> {
    let p: FaceParams = params(envelope)?;
    actor.facing_degrees = p.direction_degrees;
    Ok(None)
}

fn handle_move_to(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    ctx: &ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: MoveToParams = params(envelope)?;
    charge_energy(actor, ActionType::MoveTo)?;
    let goal = Position::new(p.x, p.y);
    let waypoints = oakhaven_world::find_path(ctx.tile_map, actor.position, goal, true)
        .map_err(|err| AgentError::rejected(RejectionReason::InvalidParams, err.to_string()))?;
    actor.transient.path_state = Some(oakhaven_types::PathState {
        waypoints,
        blocked_ticks: 0,
        auto_enter_building: None,
    });
    actor.speed_mode = oakhaven_types::SpeedMode::Walking;
    Ok(None)
}

fn handle_speak(
    actor: &mut Resident,
    target: Option<&mut Resident>,
    envelope: &ActionEnvelope,
    ctx: &ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: SpeakParams = params(envelope)?;
    conversation::speak(actor, target, ctx.conversation, p.volume, &p.text, ctx.world_seconds)?;
    Ok(None)
}

fn handle_sleep(actor: &mut Resident, world_seconds: u64) -> Result<Option<serde_json::Value>, AgentError> {
    if actor.sleeping {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "already asleep"));
    }
    actor.sleeping = true;
    actor.speed_mode = oakhaven_types::SpeedMode::Stopped;
    actor.velocity = Position::new(0.0, 0.0);
    actor.transient.path_state = None;
    actor.transient.sleep_started_at_world_seconds = Some(world_seconds);
    Ok(None)
}

fn handle_wake(actor: &mut Resident) -> Result<Option<serde_json::Value>, AgentError> {
    if !actor.sleeping {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "not asleep"));
    }
    actor.sleeping = false;
    actor.transient.sleep_started_at_world_seconds = None;
    Ok(None)
}

fn handle_enter_building(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    ctx: &ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: EnterBuildingParams = params(envelope)?;
    if actor.current_building.is_some() {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "already inside a building"));
    }
    let Some(building) = ctx.tile_map.building(p.building_id) else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "no such building"));
    };
    if actor.position.distance_to(building.position) > INTERACTION_RANGE_PX {
        return Err(AgentError::rejected(RejectionReason::OutOfRange, "too far from the door"));
    }
    actor.current_building = Some(p.building_id);
    Ok(None)
}

fn handle_exit_building(
    actor: &mut Resident,
    ctx: &ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let Some(id) = actor.current_building.take() else {
        return Err(AgentError::rejected(RejectionReason::WrongBuilding, "not inside a building"));
    };
    if let Some(building) = ctx.tile_map.building(id) {
        actor.position = building.position;
    }
    Ok(None)
}

fn handle_buy(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: BuyParams = params(envelope)?;
    building_of_kind(ctx, actor, StructureKind::Shop)?;
    economy::buy(actor, ctx.shop, ctx.ledger, ctx.world_seconds, p.item_type)?;
    Ok(None)
}

fn handle_collect_ubi(
    actor: &mut Resident,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    building_of_kind(ctx, actor, StructureKind::Bank)?;
    economy::collect_ubi(actor, ctx.ledger, ctx.world_seconds, ctx.economy.ubi_amount)?;
    Ok(None)
}

fn handle_use_toilet(actor: &mut Resident) -> Result<Option<serde_json::Value>, AgentError> {
    if actor.needs.bladder == 0 {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "nothing to relieve"));
    }
    actor.needs.bladder = 0;
    Ok(None)
}

fn handle_eat(actor: &mut Resident, envelope: &ActionEnvelope) -> Result<Option<serde_json::Value>, AgentError> {
    let p: ConsumeParams = params(envelope)?;
    if !matches!(p.item_type, ItemType::Bread | ItemType::WildBerries) {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "not a food item"));
    }
    economy::consume(actor, p.item_type)?;
    Ok(None)
}

fn handle_drink(actor: &mut Resident, envelope: &ActionEnvelope) -> Result<Option<serde_json::Value>, AgentError> {
    let p: ConsumeParams = params(envelope)?;
    if p.item_type != ItemType::WaterFlask {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "not a drink item"));
    }
    economy::consume(actor, p.item_type)?;
    Ok(None)
}

fn handle_inspect(target: Option<&mut Resident>) -> Result<Option<serde_json::Value>, AgentError> {
    let Some(target) = target else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "target not found"));
    };
    let card = InspectCard {
        id: target.id,
        display_name: target.display_name.clone(),
        passport_no: target.passport_no.clone(),
        status: target.status,
        bio: target.bio.clone(),
        current_building: target.current_building,
    };
    Ok(Some(serde_json::to_value(card).unwrap_or(serde_json::Value::Null)))
}

fn handle_trade(
    actor: &mut Resident,
    target: Option<&mut Resident>,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: TradeParams = params(envelope)?;
    let Some(target) = target else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "target not found"));
    };
    if target.id != p.to {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "resolved target mismatch"));
    }
    if actor.wallet < p.amount {
        return Err(AgentError::rejected(RejectionReason::InsufficientFunds, "insufficient funds"));
    }
    let entry = ctx.ledger.record_trade(ctx.world_seconds, actor.id, target.id, p.amount)?.clone();
    Ledger::apply(&entry, actor.id, &mut actor.wallet)?;
    Ledger::apply(&entry, target.id, &mut target.wallet)?;
    Ok(None)
}

fn handle_give(
    actor: &mut Resident,
    target: Option<&mut Resident>,
    envelope: &ActionEnvelope,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: GiveParams = params(envelope)?;
    let Some(target) = target else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "target not found"));
    };
    if target.id != p.to {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "resolved target mismatch"));
    }
    if actor.position.distance_to(target.position) > INTERACTION_RANGE_PX {
        return Err(AgentError::rejected(RejectionReason::OutOfRange, "target is too far away"));
    }
    inventory::remove_item(&mut actor.inventory, p.item_type, p.quantity)?;
    inventory::add_item(&mut target.inventory, p.item_type, p.quantity);
    Ok(None)
}

fn handle_apply_job(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: ApplyJobParams = params(envelope)?;
    employment::apply_job(actor, ctx.jobs, p.job_id)?;
    Ok(None)
}

fn handle_quit_job(
    actor: &mut Resident,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    employment::quit_job(actor, ctx.jobs)?;
    Ok(None)
}

fn handle_list_jobs(ctx: &ActionContext<'_>) -> Result<Option<serde_json::Value>, AgentError> {
    let listings: Vec<_> = ctx
        .jobs
        .listings()
        .iter()
        .map(|listing| {
            serde_json::json!({
                "job_id": listing.id.into_inner(),
                "title": listing.title,
                "wage": listing.wage,
                "has_vacancy": listing.has_vacancy(),
            })
        })
        .collect();
    Ok(Some(serde_json::Value::Array(listings)))
}

fn handle_write_petition(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: WritePetitionParams = params(envelope)?;
    let id = PetitionId::new();
    ctx.petitions.write(Petition {
        id,
        title: p.title,
        body: p.body,
        author: actor.id,
        votes_for: Vec::new(),
        votes_against: Vec::new(),
        expires_at_world_seconds: ctx.world_seconds.saturating_add(PETITION_LIFETIME_WORLD_SECONDS),
    });
    Ok(Some(serde_json::json!({ "petition_id": id.into_inner() })))
}

fn handle_vote_petition(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: VotePetitionParams = params(envelope)?;
    if !ctx.petitions.vote(p.petition_id, actor.id, p.in_favor) {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "no such petition"));
    }
    Ok(None)
}

fn handle_list_petitions(ctx: &ActionContext<'_>) -> Result<Option<serde_json::Value>, AgentError> {
    let petitions: Vec<_> = ctx
        .petitions
        .petitions()
        .iter()
        .map(|petition| {
            serde_json::json!({
                "petition_id": petition.id.into_inner(),
                "title": petition.title,
                "body": petition.body,
                "votes_for": petition.votes_for.len(),
                "votes_against": petition.votes_against.len(),
            })
        })
        .collect();
    Ok(Some(serde_json::Value::Array(petitions)))
}

fn handle_depart(actor: &mut Resident) -> Result<Option<serde_json::Value>, AgentError> {
    actor.status = oakhaven_types::LifecycleStatus::Departed;
    Ok(None)
}

fn handle_collect_body(
    actor: &mut Resident,
    target: Option<&mut Resident>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let Some(body) = target else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "target not found"));
    };
    if actor.position.distance_to(body.position) > INTERACTION_RANGE_PX {
        return Err(AgentError::rejected(RejectionReason::OutOfRange, "body is too far away"));
    }
    death::collect_body(actor, body)
        .ok_or_else(|| AgentError::rejected(RejectionReason::InvalidParams, "cannot collect this body"))?;
    Ok(None)
}

fn handle_process_body(
    actor: &mut Resident,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    building_of_kind(ctx, actor, StructureKind::Mortuary)?;
    death::process_body(actor)
        .ok_or_else(|| AgentError::rejected(RejectionReason::InvalidParams, "not carrying a body"))?;
    Ok(None)
}

fn handle_arrest(
    actor: &mut Resident,
    target: Option<&mut Resident>,
    ctx: &ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let Some(suspect) = target else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "target not found"));
    };
    law_enforcement::arrest(actor, suspect, ctx.jobs, ctx.law)?;
    Ok(None)
}

fn handle_book_suspect(
    actor: &mut Resident,
    target: Option<&mut Resident>,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    building_of_kind(ctx, actor, StructureKind::PoliceStation)?;
    let Some(suspect) = target else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "target not found"));
    };
    let suspect_uuid = suspect.id.into_inner();
    let bounty = law_enforcement::book_suspect(actor, suspect, ctx.law, ctx.world_seconds)?;
    let entry = ctx
        .ledger
        .record_arrest_bounty(ctx.world_seconds, actor.id, bounty, suspect_uuid)?
        .clone();
    Ledger::apply(&entry, actor.id, &mut actor.wallet)?;
    Ok(None)
}

fn handle_forage(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    node: Option<&mut ForagingNode>,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: ForageParams = params(envelope)?;
    let Some(node) = node else {
        return Err(AgentError::rejected(RejectionReason::TargetNotFound, "no such foraging node"));
    };
    if node.id != p.node_id {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "resolved node mismatch"));
    }
    if actor.position.distance_to(node.position) > INTERACTION_RANGE_PX {
        return Err(AgentError::rejected(RejectionReason::OutOfRange, "node is too far away"));
    }
    charge_energy(actor, ActionType::Forage)?;
    let harvested = oakhaven_world::harvest(node, ctx.world_seconds)
        .map_err(|err| AgentError::rejected(RejectionReason::InvalidParams, err.to_string()))?;
    if !harvested {
        return Err(AgentError::rejected(RejectionReason::NodeDepleted, "node is depleted"));
    }
    let item_type = match node.kind {
        oakhaven_types::ForageNodeKind::BerryBush => ItemType::WildBerries,
        oakhaven_types::ForageNodeKind::Spring => ItemType::WaterFlask,
    };
    inventory::add_item(&mut actor.inventory, item_type, 1);
    Ok(None)
}

fn handle_get_referral_link(actor: &Resident) -> Result<Option<serde_json::Value>, AgentError> {
    Ok(Some(serde_json::json!({ "link": reflection::referral_link(actor) })))
}

const fn handle_claim_referrals() -> Result<Option<serde_json::Value>, AgentError> {
    Ok(Some(serde_json::Value::Null))
}

fn handle_submit_feedback(
    actor: &mut Resident,
    envelope: &ActionEnvelope,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<serde_json::Value>, AgentError> {
    let p: SubmitFeedbackParams = params(envelope)?;
    if !ctx.reflections.redeem(p.token, actor.id) {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "invalid or already-used token"));
    }
    let _ = p.text;
    Ok(None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{
        Custody, LifecycleStatus, Needs, ResidentId, ResidentKind, ResidentTransient, SpeedMode, Volume,
    };
    use uuid::Uuid;

    use super::*;
    use crate::config::{ConversationConfig, EconomyConfig, LawConfig};

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
            wallet: 50,
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

    fn tile_map() -> oakhaven_world::TileMap {
        oakhaven_world::TileMap::new(4, 4, 32.0, vec![false; 16], Vec::new(), Vec::new(), Position::new(16.0, 16.0))
            .expect("valid map")
    }

    fn envelope(action: ActionType, params: serde_json::Value) -> ActionEnvelope {
        ActionEnvelope { action, request_id: Some(Uuid::new_v4()), params }
    }

    fn context<'a>(
        tile_map: &'a oakhaven_world::TileMap,
        economy: &'a EconomyConfig,
        law: &'a LawConfig,
        conversation: &'a ConversationConfig,
        jobs: &'a mut JobBoard,
        shop: &'a mut ShopRegistry,
        petitions: &'a mut PetitionBoard,
        ledger: &'a mut Ledger,
        reflections: &'a mut ReflectionTracker,
    ) -> ActionContext<'a> {
        ActionContext {
            tile_map,
            economy,
            law,
            conversation,
            jobs,
            shop,
            petitions,
            ledger,
            reflections,
            world_seconds: 0,
        }
    }

    #[test]
    fn stop_zeroes_velocity_and_clears_the_path() {
        let mut r = resident();
        r.velocity = Position::new(5.0, 5.0);
        r.transient.path_state = Some(oakhaven_types::PathState {
            waypoints: vec![Position::new(1.0, 1.0)],
            blocked_ticks: 0,
            auto_enter_building: None,
        });
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let result = dispatch(&mut r, None, None, &envelope(ActionType::Stop, serde_json::Value::Null), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Ok);
        assert_eq!(r.velocity, Position::new(0.0, 0.0));
        assert!(r.transient.path_state.is_none());
    }

    #[test]
    fn sleep_then_wake_round_trips() {
        let mut r = resident();
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let result = dispatch(&mut r, None, None, &envelope(ActionType::Sleep, serde_json::Value::Null), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Ok);
        assert!(r.sleeping);
        let result = dispatch(&mut r, None, None, &envelope(ActionType::Wake, serde_json::Value::Null), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Ok);
        assert!(!r.sleeping);
    }

    #[test]
    fn speak_without_params_is_rejected_as_invalid() {
        let mut r = resident();
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let result =
            dispatch(&mut r, None, None, &envelope(ActionType::Speak, serde_json::Value::Null), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Error);
        assert_eq!(result.reason, Some(RejectionReason::InvalidParams));
    }

    #[test]
    fn inspect_returns_a_card_shaped_like_inspect_card() {
        let mut r = resident();
        let mut other = resident();
        other.bio = Some("a friendly local".to_owned());
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let result = dispatch(
            &mut r,
            Some(&mut other),
            None,
            &envelope(ActionType::Inspect, serde_json::Value::Null),
            &mut ctx,
        );
        assert_eq!(result.status, oakhaven_types::ActionStatus::Ok);
        let card: InspectCard = serde_json::from_value(result.data.expect("inspect data")).expect("valid card");
        assert_eq!(card.id, other.id);
        assert_eq!(card.bio.as_deref(), Some("a friendly local"));
    }

    #[test]
    fn inspect_without_a_resolved_target_is_rejected() {
        let mut r = resident();
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let result =
            dispatch(&mut r, None, None, &envelope(ActionType::Inspect, serde_json::Value::Null), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Error);
        assert_eq!(result.reason, Some(RejectionReason::TargetNotFound));
    }

    #[test]
    fn speak_with_params_queues_the_speech_buffer() {
        let mut r = resident();
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let params = serde_json::json!({ "text": "hello", "volume": "normal", "to": null });
        let result = dispatch(&mut r, None, None, &envelope(ActionType::Speak, params), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Ok);
        assert_eq!(r.transient.speech_buffer.len(), 1);
        let _ = Volume::Normal;
    }

    #[test]
    fn write_and_list_petitions_round_trips() {
        let mut r = resident();
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let params = serde_json::json!({ "title": "More benches", "body": "The square needs seating." });
        let result = dispatch(&mut r, None, None, &envelope(ActionType::WritePetition, params), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Ok);
        let result =
            dispatch(&mut r, None, None, &envelope(ActionType::ListPetitions, serde_json::Value::Null), &mut ctx);
        let data = result.data.expect("list payload");
        assert_eq!(data.as_array().expect("array").len(), 1);
    }

    #[test]
    fn buy_without_being_in_a_shop_is_rejected() {
        let mut r = resident();
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let params = serde_json::json!({ "item_type": "bread" });
        let result = dispatch(&mut r, None, None, &envelope(ActionType::Buy, params), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Error);
        assert_eq!(result.reason, Some(RejectionReason::WrongBuilding));
    }

    #[test]
    fn depart_sets_departed_status() {
        let mut r = resident();
        let tile_map = tile_map();
        let economy = EconomyConfig::default();
        let law = LawConfig::default();
        let conversation = ConversationConfig::default();
        let mut jobs = JobBoard::new();
        let mut shop = ShopRegistry::new(Vec::new());
        let mut petitions = PetitionBoard::new();
        let mut ledger = Ledger::new();
        let mut reflections = ReflectionTracker::new();
        let mut ctx = context(
            &tile_map, &economy, &law, &conversation, &mut jobs, &mut shop, &mut petitions, &mut ledger,
            &mut reflections,
        );
        let result = dispatch(&mut r, None, None, &envelope(ActionType::Depart, serde_json::Value::Null), &mut ctx);
        assert_eq!(result.status, oakhaven_types::ActionStatus::Ok);
        assert_eq!(r.status, LifecycleStatus::Departed);
    }
}
