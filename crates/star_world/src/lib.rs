//! Design-catalog loading and demo content shared by downstream crates.
//!
//! Catalogs live as two JSON files (`building_designs.json` and
//! `ship_designs.json`) in a content directory. Loading validates
//! cross-references and panics on authoring errors; runtime errors (missing
//! files, bad JSON) surface as `anyhow` results.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use smallvec::SmallVec;

use star_core::{
    BuildCost, BuildRequest, BuildRequestId, BuildingStats, Colony, ColonyId, Design,
    DesignCatalog, DesignId, DesignKind, DesignPayload, EmpireId, EmpirePresence, Fleet, FleetId,
    FleetStance, FleetState, FocusAllocation, Planet, PresenceId, ShipEffect, ShipStats,
    ShipUpgrade, Star, StarId, UpgradeId,
};

#[derive(Deserialize)]
struct DesignsFile {
    designs: Vec<Design>,
}

/// Validates cross-references in a loaded catalog, panicking on any
/// authoring error.
///
/// Catches mistakes like: a dependency on a building design that doesn't
/// exist, a ship with non-positive defence (combat divides by it), duplicate
/// upgrade ids on one design, or a zero build time.
pub fn validate_catalog(catalog: &DesignCatalog) {
    let building_ids: HashSet<&DesignId> = catalog.buildings().map(|d| &d.id).collect();

    for design in catalog.buildings().chain(catalog.ships()) {
        assert!(
            design.build_cost.time_seconds > 0,
            "design '{}' has a zero build time",
            design.id,
        );
        assert!(
            design.build_cost.max_count > 0,
            "design '{}' has a zero max build count",
            design.id,
        );

        for dependency in &design.dependencies {
            assert!(
                building_ids.contains(&dependency.design_id),
                "design '{}' depends on unknown building '{}'",
                design.id,
                dependency.design_id,
            );
        }
    }

    for design in catalog.ships() {
        let Some(stats) = design.ship_stats() else {
            continue;
        };
        assert!(
            stats.base_defence > 0.0,
            "ship design '{}' has non-positive defence",
            design.id,
        );

        let mut upgrade_ids: HashSet<&UpgradeId> = HashSet::new();
        for upgrade in &stats.upgrades {
            assert!(
                upgrade_ids.insert(&upgrade.id),
                "ship design '{}' has duplicate upgrade id '{}'",
                design.id,
                upgrade.id,
            );
            assert!(
                upgrade.build_cost.time_seconds > 0,
                "ship design '{}' upgrade '{}' has a zero build time",
                design.id,
                upgrade.id,
            );
        }
    }
}

/// Loads and validates the design catalog from a content directory.
pub fn load_catalog(catalog_dir: &str) -> Result<DesignCatalog> {
    let dir = Path::new(catalog_dir);
    let buildings: DesignsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("building_designs.json"))
            .context("reading building_designs.json")?,
    )
    .context("parsing building_designs.json")?;
    let ships: DesignsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("ship_designs.json"))
            .context("reading ship_designs.json")?,
    )
    .context("parsing ship_designs.json")?;

    let catalog = DesignCatalog::new(buildings.designs.into_iter().chain(ships.designs));
    validate_catalog(&catalog);
    Ok(catalog)
}

/// Small built-in catalog for demos and smoke tests: a shipyard and a silo,
/// plus three ship designs covering the combat rules (return fire, cloak,
/// a low-priority preferred target).
pub fn demo_catalog() -> DesignCatalog {
    let catalog = DesignCatalog::new([
        Design {
            id: DesignId("shipyard".to_string()),
            name: "Shipyard".to_string(),
            build_cost: BuildCost {
                minerals: 150.0,
                time_seconds: 5400,
                max_count: 1,
            },
            dependencies: vec![],
            payload: DesignPayload::Building(BuildingStats { max_level: 3 }),
        },
        Design {
            id: DesignId("silo".to_string()),
            name: "Storage Silo".to_string(),
            build_cost: BuildCost {
                minerals: 60.0,
                time_seconds: 1800,
                max_count: 5,
            },
            dependencies: vec![],
            payload: DesignPayload::Building(BuildingStats { max_level: 5 }),
        },
        Design {
            id: DesignId("fighter".to_string()),
            name: "Fighter".to_string(),
            build_cost: BuildCost {
                minerals: 50.0,
                time_seconds: 900,
                max_count: 50,
            },
            dependencies: vec![],
            payload: DesignPayload::Ship(ShipStats {
                base_attack: 0.8,
                base_defence: 4.0,
                combat_priority: 10,
                effects: vec![ShipEffect::ReturnFire],
                upgrades: vec![],
            }),
        },
        Design {
            id: DesignId("wraith".to_string()),
            name: "Wraith".to_string(),
            build_cost: BuildCost {
                minerals: 120.0,
                time_seconds: 2700,
                max_count: 10,
            },
            dependencies: vec![],
            payload: DesignPayload::Ship(ShipStats {
                base_attack: 1.5,
                base_defence: 3.0,
                combat_priority: 20,
                effects: vec![],
                upgrades: vec![ShipUpgrade {
                    id: UpgradeId("cloak".to_string()),
                    build_cost: BuildCost {
                        minerals: 200.0,
                        time_seconds: 1800,
                        max_count: 1,
                    },
                }],
            }),
        },
        Design {
            id: DesignId("colony_ship".to_string()),
            name: "Colony Ship".to_string(),
            build_cost: BuildCost {
                minerals: 400.0,
                time_seconds: 14400,
                max_count: 1,
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
    ]);
    validate_catalog(&catalog);
    catalog
}

/// Demo star: one settled colony with a build under way, a native colony,
/// and a skirmish between a settler fleet and a native wraith. The star was
/// last simulated two hours before `now`, so there is always something to
/// catch up on.
pub fn demo_star(now: DateTime<Utc>) -> Star {
    let two_hours_ago = now - Duration::hours(2);
    let terran = EmpireId("terran".to_string());
    Star {
        key: StarId("star_demo".to_string()),
        name: "Alpha Praxis".to_string(),
        planets: vec![
            Planet {
                farming_congeniality: 80,
                mining_congeniality: 30,
            },
            Planet {
                farming_congeniality: 40,
                mining_congeniality: 70,
            },
        ],
        colonies: vec![
            Colony {
                key: ColonyId("colony_terran".to_string()),
                empire: Some(terran.clone()),
                planet_index: 0,
                population: 500.0,
                max_population: 1200.0,
                focus: FocusAllocation {
                    farming: 0.3,
                    mining: 0.3,
                    construction: 0.2,
                    population: 0.2,
                },
                uncollected_taxes: 0.0,
                cooldown_end: None,
            },
            Colony {
                key: ColonyId("colony_native".to_string()),
                empire: None,
                planet_index: 1,
                population: 150.0,
                max_population: 400.0,
                focus: FocusAllocation {
                    farming: 0.6,
                    mining: 0.2,
                    construction: 0.0,
                    population: 0.2,
                },
                uncollected_taxes: 0.0,
                cooldown_end: None,
            },
        ],
        fleets: vec![
            Fleet {
                key: FleetId("fleet_terran".to_string()),
                empire: Some(terran.clone()),
                alliance: None,
                design_id: DesignId("fighter".to_string()),
                num_ships: 12.0,
                state: FleetState::Attacking,
                stance: FleetStance::Aggressive,
                state_start_time: two_hours_ago,
                time_destroyed: None,
                upgrades: SmallVec::new(),
            },
            Fleet {
                key: FleetId("fleet_wraith".to_string()),
                empire: None,
                alliance: None,
                design_id: DesignId("wraith".to_string()),
                num_ships: 4.0,
                state: FleetState::Idle,
                stance: FleetStance::Neutral,
                state_start_time: two_hours_ago,
                time_destroyed: None,
                upgrades: SmallVec::new(),
            },
        ],
        build_requests: vec![BuildRequest {
            key: BuildRequestId("build_shipyard".to_string()),
            colony: ColonyId("colony_terran".to_string()),
            design_kind: DesignKind::Building,
            design_id: DesignId("shipyard".to_string()),
            count: 1,
            progress: 0.0,
            start_time: two_hours_ago,
            end_time: None,
            existing_fleet: None,
            existing_building: None,
            upgrade_id: None,
        }],
        empires: vec![EmpirePresence {
            key: PresenceId("presence_terran".to_string()),
            empire: terran,
            total_goods: 120.0,
            max_goods: 500.0,
            total_minerals: 250.0,
            max_minerals: 500.0,
            goods_zero_time: None,
        }],
        combat_report: None,
        last_simulation: Some(two_hours_ago),
    }
}
