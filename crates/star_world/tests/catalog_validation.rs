use star_core::{
    BuildCost, Design, DesignCatalog, DesignDependency, DesignId, DesignKind, DesignPayload,
    NullTrace, ShipStats, ShipUpgrade, UpgradeId,
};
use star_world::{demo_catalog, demo_star, load_catalog, validate_catalog};

fn ship(id: &str, defence: f32) -> Design {
    Design {
        id: DesignId(id.to_string()),
        name: id.to_string(),
        build_cost: BuildCost {
            minerals: 10.0,
            time_seconds: 600,
            max_count: 10,
        },
        dependencies: vec![],
        payload: DesignPayload::Ship(ShipStats {
            base_attack: 1.0,
            base_defence: defence,
            combat_priority: 10,
            effects: vec![],
            upgrades: vec![],
        }),
    }
}

#[test]
fn test_demo_catalog_passes_validation() {
    validate_catalog(&demo_catalog()); // should not panic
}

#[test]
#[should_panic(expected = "depends on unknown building")]
fn test_dangling_dependency_panics() {
    let mut design = ship("raider", 2.0);
    design.dependencies.push(DesignDependency {
        design_id: DesignId("orbital_foundry".to_string()),
        level: 1,
    });
    validate_catalog(&DesignCatalog::new([design]));
}

#[test]
#[should_panic(expected = "non-positive defence")]
fn test_non_positive_defence_panics() {
    validate_catalog(&DesignCatalog::new([ship("paper_tiger", 0.0)]));
}

#[test]
#[should_panic(expected = "duplicate upgrade id")]
fn test_duplicate_upgrade_id_panics() {
    let mut design = ship("raider", 2.0);
    if let DesignPayload::Ship(stats) = &mut design.payload {
        for _ in 0..2 {
            stats.upgrades.push(ShipUpgrade {
                id: UpgradeId("cloak".to_string()),
                build_cost: BuildCost {
                    minerals: 10.0,
                    time_seconds: 600,
                    max_count: 1,
                },
            });
        }
    }
    validate_catalog(&DesignCatalog::new([design]));
}

#[test]
#[should_panic(expected = "zero build time")]
fn test_zero_build_time_panics() {
    let mut design = ship("raider", 2.0);
    design.build_cost.time_seconds = 0;
    validate_catalog(&DesignCatalog::new([design]));
}

#[test]
fn test_load_catalog_from_directory() {
    let dir = tempfile::tempdir().unwrap();

    let buildings: Vec<Design> = demo_catalog().buildings().cloned().collect();
    let ships: Vec<Design> = demo_catalog().ships().cloned().collect();
    std::fs::write(
        dir.path().join("building_designs.json"),
        serde_json::to_string_pretty(&serde_json::json!({ "designs": buildings })).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("ship_designs.json"),
        serde_json::to_string_pretty(&serde_json::json!({ "designs": ships })).unwrap(),
    )
    .unwrap();

    let catalog = load_catalog(dir.path().to_str().unwrap()).unwrap();
    assert!(catalog
        .get(DesignKind::Building, &DesignId("shipyard".to_string()))
        .is_ok());
    assert!(catalog.ship(&DesignId("fighter".to_string())).is_ok());
}

#[test]
fn test_demo_star_simulates_cleanly() {
    let catalog = demo_catalog();
    let now = chrono::DateTime::from_timestamp(1_767_225_600, 0).unwrap();
    let mut star = demo_star(now);

    star_core::simulate(&mut star, &catalog, now, true, &mut NullTrace).unwrap();

    assert_eq!(star.last_simulation, Some(now));
    // Two hours of combat between the fighters and the wraiths is decided
    // one way or the other.
    assert!(star.combat_report.is_some());
}
