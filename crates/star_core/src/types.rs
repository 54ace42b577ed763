//! Type definitions for `star_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::SimError;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(StarId);
string_id!(ColonyId);
string_id!(EmpireId);
string_id!(PresenceId);
string_id!(FleetId);
string_id!(BuildRequestId);
string_id!(BuildingId);
string_id!(DesignId);
string_id!(UpgradeId);

/// Alliances are identified by plain numeric IDs assigned by the alliance service.
pub type AllianceId = u32;

/// Upgrade ID of the cloaking device; a cloaked fleet is invisible to combat
/// unless its stance is aggressive.
pub const CLOAK_UPGRADE: &str = "cloak";

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignKind {
    Building,
    Ship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetState {
    Idle,
    Moving,
    Attacking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetStance {
    Passive,
    Neutral,
    Aggressive,
}

// ---------------------------------------------------------------------------
// Star aggregate
// ---------------------------------------------------------------------------

/// One star system and everything in it. The engine mutates this in place;
/// the caller is responsible for loading it and persisting it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub key: StarId,
    pub name: String,
    pub planets: Vec<Planet>,
    pub colonies: Vec<Colony>,
    pub fleets: Vec<Fleet>,
    pub build_requests: Vec<BuildRequest>,
    pub empires: Vec<EmpirePresence>,
    pub combat_report: Option<CombatReport>,
    /// Instant the star was last simulated up to. `None` for a star that has
    /// never been simulated.
    pub last_simulation: Option<DateTime<Utc>>,
}

/// Static per-slot suitability; read-only during simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    /// Farming suitability, 0–100.
    pub farming_congeniality: u32,
    /// Mining suitability, 0–100.
    pub mining_congeniality: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colony {
    pub key: ColonyId,
    /// `None` for a native (unowned) colony.
    pub empire: Option<EmpireId>,
    /// Index into the star's planet list.
    pub planet_index: usize,
    pub population: f32,
    pub max_population: f32,
    pub focus: FocusAllocation,
    /// Taxes accrued but not yet collected. Collection happens outside the engine.
    pub uncollected_taxes: f32,
    /// While set, the colony is in post-colonization cooldown and its
    /// population will not drop below 100.
    pub cooldown_end: Option<DateTime<Utc>>,
}

impl Colony {
    pub fn in_cooldown(&self) -> bool {
        self.cooldown_end.is_some()
    }
}

/// How a colony's workforce is split. The four fractions sum to at most 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FocusAllocation {
    pub farming: f32,
    pub mining: f32,
    pub construction: f32,
    pub population: f32,
}

/// Per-(star, empire) resource pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpirePresence {
    pub key: PresenceId,
    pub empire: EmpireId,
    pub total_goods: f32,
    pub max_goods: f32,
    pub total_minerals: f32,
    pub max_minerals: f32,
    /// Forecast instant at which the goods pool runs dry, if any.
    pub goods_zero_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub key: BuildRequestId,
    pub colony: ColonyId,
    pub design_kind: DesignKind,
    pub design_id: DesignId,
    pub count: u32,
    /// Completed fraction, 0–1. Never decreases within one simulation run.
    pub progress: f32,
    pub start_time: DateTime<Utc>,
    /// Forecast completion instant, revised every tick. `None` until the
    /// first tick has produced an estimate.
    pub end_time: Option<DateTime<Utc>>,
    /// Set when this request upgrades an existing fleet instead of building
    /// new ships; the cost then comes from the design's upgrade table.
    pub existing_fleet: Option<FleetId>,
    /// Set when this request upgrades an existing building.
    pub existing_building: Option<BuildingId>,
    pub upgrade_id: Option<UpgradeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub key: FleetId,
    /// `None` for a native (unowned) fleet.
    pub empire: Option<EmpireId>,
    pub alliance: Option<AllianceId>,
    pub design_id: DesignId,
    pub num_ships: f32,
    pub state: FleetState,
    pub stance: FleetStance,
    pub state_start_time: DateTime<Utc>,
    /// Set once the fleet's ship count reaches zero. A future value means the
    /// fleet is *predicted* to be destroyed then.
    pub time_destroyed: Option<DateTime<Utc>>,
    /// Upgrades applied to this fleet (e.g. the cloaking device).
    pub upgrades: SmallVec<[UpgradeId; 2]>,
}

impl Fleet {
    pub fn is_destroyed(&self, now: DateTime<Utc>) -> bool {
        self.time_destroyed.is_some_and(|t| t <= now)
    }

    pub fn has_upgrade(&self, upgrade: &str) -> bool {
        self.upgrades.iter().any(|u| u.0 == upgrade)
    }

    /// Drops back to idle, stamping the state-start time.
    pub fn idle(&mut self, now: DateTime<Utc>) {
        self.state = FleetState::Idle;
        self.state_start_time = now;
    }
}

// ---------------------------------------------------------------------------
// Combat report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatReport {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub rounds: Vec<CombatRound>,
}

/// One minute of combat. Indices in the attack/loss records refer to the
/// `groups` list of the same round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatRound {
    pub time: DateTime<Utc>,
    pub groups: Vec<FleetGroupSummary>,
    pub attacks: Vec<AttackRecord>,
    pub losses: Vec<LossRecord>,
}

/// Fleets of the same design, stance, and state that fight as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetGroupSummary {
    pub fleets: Vec<FleetId>,
    pub design_id: DesignId,
    /// Ship count at the start of the round.
    pub num_ships: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackRecord {
    pub attacker: usize,
    pub target: usize,
    pub damage: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossRecord {
    pub target: usize,
    pub ships_lost: f32,
}

// ---------------------------------------------------------------------------
// Design catalog
// ---------------------------------------------------------------------------

/// A buildable design: common build data plus a kind-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    pub id: DesignId,
    pub name: String,
    pub build_cost: BuildCost,
    /// Level-gated prerequisites that must exist before this design can be
    /// queued. Enforced by the build-queue service, not the engine.
    pub dependencies: Vec<DesignDependency>,
    pub payload: DesignPayload,
}

impl Design {
    pub fn kind(&self) -> DesignKind {
        match self.payload {
            DesignPayload::Building(_) => DesignKind::Building,
            DesignPayload::Ship(_) => DesignKind::Ship,
        }
    }

    pub fn ship_stats(&self) -> Option<&ShipStats> {
        match &self.payload {
            DesignPayload::Ship(stats) => Some(stats),
            DesignPayload::Building(_) => None,
        }
    }

    /// Looks up a ship upgrade by id.
    pub fn upgrade(&self, upgrade: &UpgradeId) -> Option<&ShipUpgrade> {
        self.ship_stats()
            .and_then(|s| s.upgrades.iter().find(|u| &u.id == upgrade))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildCost {
    pub minerals: f32,
    /// Time to build one unit with exactly 100 workers assigned.
    pub time_seconds: u32,
    /// Maximum number buildable in one request.
    pub max_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignDependency {
    pub design_id: DesignId,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DesignPayload {
    Building(BuildingStats),
    Ship(ShipStats),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingStats {
    pub max_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipStats {
    pub base_attack: f32,
    pub base_defence: f32,
    /// Lower values are preferred as targets.
    pub combat_priority: i32,
    pub effects: Vec<ShipEffect>,
    pub upgrades: Vec<ShipUpgrade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipUpgrade {
    pub id: UpgradeId,
    pub build_cost: BuildCost,
}

/// Behavioral reactions a ship design registers for combat events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShipEffect {
    /// When hit while idle, the fleet switches to attacking for the next round.
    ReturnFire,
}

/// Read-only lookup of designs by kind and id. Shared freely between
/// concurrent simulation calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignCatalog {
    buildings: BTreeMap<DesignId, Design>,
    ships: BTreeMap<DesignId, Design>,
}

impl DesignCatalog {
    pub fn new(designs: impl IntoIterator<Item = Design>) -> Self {
        let mut catalog = Self::default();
        for design in designs {
            match design.kind() {
                DesignKind::Building => catalog.buildings.insert(design.id.clone(), design),
                DesignKind::Ship => catalog.ships.insert(design.id.clone(), design),
            };
        }
        catalog
    }

    pub fn get(&self, kind: DesignKind, id: &DesignId) -> Result<&Design, SimError> {
        let table = match kind {
            DesignKind::Building => &self.buildings,
            DesignKind::Ship => &self.ships,
        };
        table.get(id).ok_or_else(|| SimError::UnknownDesign {
            kind,
            id: id.clone(),
        })
    }

    /// Resolves a ship design together with its combat stats.
    pub fn ship(&self, id: &DesignId) -> Result<(&Design, &ShipStats), SimError> {
        let design = self.get(DesignKind::Ship, id)?;
        let stats = design.ship_stats().ok_or_else(|| SimError::UnknownDesign {
            kind: DesignKind::Ship,
            id: id.clone(),
        })?;
        Ok((design, stats))
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Design> {
        self.buildings.values()
    }

    pub fn ships(&self) -> impl Iterator<Item = &Design> {
        self.ships.values()
    }
}
