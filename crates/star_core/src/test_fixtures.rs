//! Shared test fixtures for star_core and downstream crates.
//!
//! `base_catalog()` provides a small design catalog (a building and three
//! ship designs with distinct combat priorities). The entity builders start
//! from inert defaults so each test only sets what it cares about.

use chrono::{DateTime, TimeZone, Utc};
use smallvec::SmallVec;

use crate::{
    BuildCost, BuildRequest, BuildRequestId, BuildingStats, Colony, ColonyId, Design, DesignCatalog,
    DesignId, DesignKind, DesignPayload, EmpireId, EmpirePresence, Fleet, FleetId, FleetStance,
    FleetState, FocusAllocation, Planet, PresenceId, ShipEffect, ShipStats, ShipUpgrade, Star,
    StarId, UpgradeId,
};

/// Fixed base instant; all fixture timestamps are offsets from this.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// Catalog with one building and three ship designs:
/// - `factory`: building, 1000 minerals, 4500 seconds.
/// - `fighter`: attack 0.25, defence 5.0, priority 10, returns fire when
///   attacked, has a `cloak` upgrade costing 100 minerals.
/// - `drone`: attack 0.1, defence 1.0, priority 5.
/// - `freighter`: unarmed, defence 2.0, priority 1 (the preferred target).
pub fn base_catalog() -> DesignCatalog {
    DesignCatalog::new([
        Design {
            id: DesignId("factory".to_string()),
            name: "Factory".to_string(),
            build_cost: BuildCost {
                minerals: 1000.0,
                time_seconds: 4500,
                max_count: 10,
            },
            dependencies: vec![],
            payload: DesignPayload::Building(BuildingStats { max_level: 1 }),
        },
        Design {
            id: DesignId("fighter".to_string()),
            name: "Fighter".to_string(),
            build_cost: BuildCost {
                minerals: 50.0,
                time_seconds: 1800,
                max_count: 100,
            },
            dependencies: vec![],
            payload: DesignPayload::Ship(ShipStats {
                base_attack: 0.25,
                base_defence: 5.0,
                combat_priority: 10,
                effects: vec![ShipEffect::ReturnFire],
                upgrades: vec![ShipUpgrade {
                    id: UpgradeId("cloak".to_string()),
                    build_cost: BuildCost {
                        minerals: 100.0,
                        time_seconds: 900,
                        max_count: 1,
                    },
                }],
            }),
        },
        Design {
            id: DesignId("drone".to_string()),
            name: "Drone".to_string(),
            build_cost: BuildCost {
                minerals: 10.0,
                time_seconds: 300,
                max_count: 500,
            },
            dependencies: vec![],
            payload: DesignPayload::Ship(ShipStats {
                base_attack: 0.1,
                base_defence: 1.0,
                combat_priority: 5,
                effects: vec![],
                upgrades: vec![],
            }),
        },
        Design {
            id: DesignId("freighter".to_string()),
            name: "Freighter".to_string(),
            build_cost: BuildCost {
                minerals: 200.0,
                time_seconds: 3600,
                max_count: 10,
            },
            dependencies: vec![],
            payload: DesignPayload::Ship(ShipStats {
                base_attack: 0.0,
                base_defence: 2.0,
                combat_priority: 1,
                effects: vec![],
                upgrades: vec![],
            }),
        },
    ])
}

/// Empty star with a single planet (farming and mining congeniality 50),
/// last simulated at `t0()`.
pub fn base_star() -> Star {
    Star {
        key: StarId("star_0001".to_string()),
        name: "Test Star".to_string(),
        planets: vec![Planet {
            farming_congeniality: 50,
            mining_congeniality: 50,
        }],
        colonies: vec![],
        fleets: vec![],
        build_requests: vec![],
        empires: vec![],
        combat_report: None,
        last_simulation: Some(t0()),
    }
}

/// Colony on planet 0 with all focus fractions zero and no cooldown.
pub fn colony(key: &str, empire: Option<&str>, population: f32) -> Colony {
    Colony {
        key: ColonyId(key.to_string()),
        empire: empire.map(|e| EmpireId(e.to_string())),
        planet_index: 0,
        population,
        max_population: 1000.0,
        focus: FocusAllocation {
            farming: 0.0,
            mining: 0.0,
            construction: 0.0,
            population: 0.0,
        },
        uncollected_taxes: 0.0,
        cooldown_end: None,
    }
}

/// Presence with both pool maxima at 1000.
pub fn presence(empire: &str, goods: f32, minerals: f32) -> EmpirePresence {
    EmpirePresence {
        key: PresenceId(format!("presence_{empire}")),
        empire: EmpireId(empire.to_string()),
        total_goods: goods,
        max_goods: 1000.0,
        total_minerals: minerals,
        max_minerals: 1000.0,
        goods_zero_time: None,
    }
}

/// Aggressive fleet with its state-start time at `t0()` and no upgrades.
pub fn fleet(key: &str, empire: Option<&str>, design: &str, num_ships: f32, state: FleetState) -> Fleet {
    Fleet {
        key: FleetId(key.to_string()),
        empire: empire.map(|e| EmpireId(e.to_string())),
        alliance: None,
        design_id: DesignId(design.to_string()),
        num_ships,
        state,
        stance: FleetStance::Aggressive,
        state_start_time: t0(),
        time_destroyed: None,
        upgrades: SmallVec::new(),
    }
}

/// New-construction build request started at `t0()` with zero progress.
pub fn build(key: &str, colony: &str, kind: DesignKind, design: &str, count: u32) -> BuildRequest {
    BuildRequest {
        key: BuildRequestId(key.to_string()),
        colony: ColonyId(colony.to_string()),
        design_kind: kind,
        design_id: DesignId(design.to_string()),
        count,
        progress: 0.0,
        start_time: t0(),
        end_time: None,
        existing_fleet: None,
        existing_building: None,
        upgrade_id: None,
    }
}
