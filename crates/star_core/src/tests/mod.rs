use chrono::{DateTime, Duration, Utc};

use crate::test_fixtures::{base_catalog, base_star, build, colony, fleet, presence, t0};
use crate::{
    CombatReport, CombatRound, DesignCatalog, DesignKind, FleetId, FleetStance, FleetState,
    NullTrace, SimError, Star, UpgradeId,
};

mod economy;

// --- Shared test helpers ------------------------------------------------

fn run(star: &mut Star, catalog: &DesignCatalog, target: DateTime<Utc>) {
    crate::simulate(star, catalog, target, false, &mut NullTrace).unwrap();
}

fn run_predict(star: &mut Star, catalog: &DesignCatalog, target: DateTime<Utc>) {
    crate::simulate(star, catalog, target, true, &mut NullTrace).unwrap();
}

fn assert_close(actual: f32, expected: f32, tol: f32) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected} +/- {tol}, got {actual}"
    );
}

/// Timestamps computed through f32 hours can be off by a few milliseconds.
fn assert_close_time(actual: DateTime<Utc>, expected: DateTime<Utc>) {
    let diff = (actual - expected).num_milliseconds().abs();
    assert!(diff < 1000, "expected {expected} +/- 1s, got {actual}");
}
