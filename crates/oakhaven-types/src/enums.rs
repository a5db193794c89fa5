//! Enumeration types for the Oakhaven colony simulation.

use serde::{Deserialize, Serialize};

/// Whether a resident is a human-operated character or an autonomous agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResidentKind {
    /// Controlled by an autonomous client over the action protocol.
    Agent,
    /// Controlled by a human operator over the same protocol.
    Human,
}

/// The lifecycle status of a resident.
///
/// Transitions are one-way: `Alive -> Deceased -> Processed`, or
/// `Alive -> Departed`. Every status other than `Alive` removes the
/// resident from interactive world queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleStatus {
    /// Normal, interactive state.
    Alive,
    /// Health reached zero; body remains in the world awaiting processing.
    Deceased,
    /// The body has been processed at the mortuary and removed from the world.
    Processed,
    /// The resident voluntarily left the colony via `depart`.
    Departed,
}

/// A resident's current locomotion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpeedMode {
    /// Not moving.
    Stopped,
    /// Default movement speed.
    Walking,
    /// Elevated movement speed at a higher energy cost.
    Running,
}

/// Speech volume, governing both energy cost and audible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Volume {
    /// Shortest range, cheapest.
    Whisper,
    /// Default range and cost.
    Normal,
    /// Longest range, most expensive.
    Shout,
}

/// A type of foraging node found on the tile map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ForageNodeKind {
    /// Yields `wild_berries` on a successful forage.
    BerryBush,
    /// Yields drinkable water on a successful forage.
    Spring,
}

/// A type of item that can occupy an inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemType {
    /// Shop-bought food; restores hunger.
    Bread,
    /// Foraged food; restores hunger.
    WildBerries,
    /// Foraged or shop-bought drink; restores thirst.
    WaterFlask,
    /// Durable item that raises the energy recovery rate while sleeping.
    SleepingBag,
}

/// A category of building placed on the tile map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Sells items from a price/stock table.
    Shop,
    /// Pays out universal basic income on a cooldown.
    Bank,
    /// Where arrests are booked and prisoners are released.
    PoliceStation,
    /// Where jobs and petitions are listed and voted on.
    CouncilHall,
    /// Where deceased residents' bodies are processed.
    Mortuary,
    /// Train platform; new residents spawn here.
    Station,
}

/// The time-of-day phase driving the night-vision multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    /// Transition from night to day.
    Dawn,
    /// Full visibility.
    Day,
    /// Transition from day to night.
    Dusk,
    /// Minimum visibility, scaled by `m_min`.
    Night,
}

/// The full action taxonomy accepted by the action arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Start moving in a facing direction at a given speed.
    Move,
    /// Zero velocity, preserve facing.
    Stop,
    /// Change facing without moving.
    Face,
    /// Path toward a pixel destination via the pathfinder.
    MoveTo,
    /// Emit speech, optionally directed at a target resident.
    Speak,
    /// Begin sleeping.
    Sleep,
    /// Stop sleeping.
    Wake,
    /// Cross a building's door into its interior.
    EnterBuilding,
    /// Leave the current building's interior.
    ExitBuilding,
    /// Purchase an item from the shop.
    Buy,
    /// Collect universal basic income at the bank.
    CollectUbi,
    /// Relieve the bladder need.
    UseToilet,
    /// Consume a food item from inventory.
    Eat,
    /// Consume a drink item from inventory.
    Drink,
    /// Request a target resident's public card.
    Inspect,
    /// Transfer currency only (no counter-item) to another resident.
    Trade,
    /// Transfer an inventory item to a nearby resident.
    Give,
    /// Take a vacant job at the council hall.
    ApplyJob,
    /// Leave the current job.
    QuitJob,
    /// List current job vacancies.
    ListJobs,
    /// Submit a new petition for council vote.
    WritePetition,
    /// Cast a vote on an open petition.
    VotePetition,
    /// List open petitions.
    ListPetitions,
    /// Leave the colony permanently.
    Depart,
    /// Pick up a deceased resident's body for transport.
    CollectBody,
    /// Process a carried body at the mortuary.
    ProcessBody,
    /// Arrest a suspect with an active offense.
    Arrest,
    /// Book an escorted suspect at the police station.
    BookSuspect,
    /// Harvest a foraging node.
    Forage,
    /// Request a referral link for the code-hosting rewards program.
    GetReferralLink,
    /// Claim matured referral rewards.
    ClaimReferrals,
    /// Submit free-text feedback using a single-use reflection token.
    SubmitFeedback,
}

/// A type of event recorded in the append-only event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A resident spawned at the station after registration.
    Arrival,
    /// A resident's energy reached zero while awake.
    Collapse,
    /// A resident died (health reached zero).
    Death,
    /// A shop purchase completed.
    Buy,
    /// A shift's accumulated wage was paid out.
    ShiftComplete,
    /// A loitering or other offense was recorded against a resident.
    LawViolation,
    /// A resident was arrested.
    Arrest,
    /// An escorted suspect was booked and sentenced.
    BookSuspect,
    /// A resident was released from prison.
    PrisonRelease,
    /// A foraging node was successfully harvested.
    Forage,
    /// A resident left the colony.
    Depart,
    /// A deceased resident's body was processed.
    BodyProcessed,
    /// A bladder accident occurred.
    BladderAccident,
    /// A resident took a job.
    JobApplied,
    /// A resident left a job.
    JobQuit,
    /// A petition was submitted.
    PetitionWritten,
    /// A vote was cast on a petition.
    PetitionVoted,
    /// Universal basic income was collected.
    UbiCollected,
    /// Currency or an item changed hands between residents.
    Transfer,
}

/// The machine-readable reason an action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The action tag is unrecognised.
    InvalidAction,
    /// A required parameter was missing or malformed.
    InvalidParams,
    /// The resident is deceased.
    Deceased,
    /// The resident is imprisoned and the action is not in the allowed set.
    Imprisoned,
    /// The resident is asleep.
    NotAwake,
    /// The resident is not inside the building the action requires.
    WrongBuilding,
    /// The resident does not have enough energy for this action.
    InsufficientEnergy,
    /// The resident's wallet cannot cover the cost.
    InsufficientFunds,
    /// The shop has no remaining stock of the requested item.
    OutOfStock,
    /// The target resident, item, or node does not exist.
    TargetNotFound,
    /// The target resident is not alive.
    TargetNotAlive,
    /// The target is outside the required range.
    OutOfRange,
    /// The action was attempted again before its cooldown elapsed.
    TooSoon,
    /// The speaker is still awaiting a reply from this target.
    AwaitingReply,
    /// No job vacancy is available.
    NoVacancy,
    /// The resident holds no job to quit.
    NotEmployed,
    /// Only a police officer may perform this action.
    Unauthorized,
    /// The suspect has no active offenses to arrest on.
    NoActiveOffenses,
    /// The resident is not currently escorting a suspect.
    NotEscorting,
    /// The foraging node has no uses remaining.
    NodeDepleted,
}

/// A kind of law offense. Currently populated only by the loitering
/// detector, but kept as an enum so the arbiter's arrest precondition
/// ("offenses list is non-empty") generalises to future offense sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OffenseKind {
    /// Remained within the loiter-check radius past the loiter threshold.
    Loitering,
}

/// Which need dimension a pain message was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PainSource {
    /// Hunger crossed a severity tier.
    Hunger,
    /// Thirst crossed a severity tier.
    Thirst,
    /// Social need crossed a severity tier.
    Social,
    /// Health crossed a severity tier.
    Health,
}

/// The severity tier a need crossed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PainSeverity {
    /// First tier.
    Mild,
    /// Second tier.
    Severe,
    /// Third, most urgent tier.
    Agony,
}

/// The category of a wallet transfer, recorded on each ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LedgerEntryType {
    /// Shop purchase (resident -> shop).
    Purchase,
    /// Wage payment on shift completion (employer -> resident).
    Wage,
    /// Universal basic income (bank -> resident).
    Ubi,
    /// Resident-to-resident currency trade.
    Trade,
    /// Fixed bladder-accident cleaning fee (resident -> world).
    CleaningFee,
    /// Arrest bounty paid to the arresting officer (world -> officer).
    ArrestBounty,
}
