//! Time-stepping driver: catches a star up to a target instant, then runs a
//! bounded prediction pass on a clone to forecast future events.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::combat::simulate_combat;
use crate::economy::{advance_empire, PoolLedger};
use crate::error::SimError;
use crate::trace::TraceSink;
use crate::types::{DesignCatalog, EmpireId, Star};

/// One fixed simulation tick.
fn tick() -> Duration {
    Duration::minutes(15)
}

/// How far past the target instant the prediction phase looks.
fn prediction_horizon() -> Duration {
    Duration::hours(24)
}

/// Resource ledgers for every empire with a colony on the star, keyed so the
/// step order is stable: natives first, then empires by id.
type EmpireLedgers = BTreeMap<Option<EmpireId>, PoolLedger>;

fn build_ledgers(star: &Star) -> EmpireLedgers {
    let mut ledgers = EmpireLedgers::new();
    for colony in &star.colonies {
        ledgers.entry(colony.empire.clone()).or_insert_with(|| {
            colony
                .empire
                .as_ref()
                .map_or_else(PoolLedger::native, |e| PoolLedger::from_star(star, e))
        });
    }
    ledgers
}

/// The instant to simulate from: the star's last-simulated timestamp, or the
/// earliest fleet state-start time for a star never simulated. Unowned stars
/// are assumed to be in steady state, so their start is clamped to 24 hours
/// before the target.
fn simulate_start_time(star: &Star, target: DateTime<Utc>, trace: &mut dyn TraceSink) -> Option<DateTime<Utc>> {
    let mut start = star.last_simulation;
    if start.is_none() {
        start = star.fleets.iter().map(|f| f.state_start_time).min();
    }

    let one_day_ago = target - prediction_horizon();
    if let Some(s) = start {
        if s < one_day_ago {
            let any_owned = star.colonies.iter().any(|c| c.empire.is_some())
                || star.fleets.iter().any(|f| f.empire.is_some());
            if !any_owned {
                trace.line("only native colonies and fleets, clamping start to 24 hours ago");
                start = Some(one_day_ago);
            }
        }
    }
    start
}

/// One tick for every empire on the star, then combat.
fn step_all_empires(
    star: &mut Star,
    ledgers: &mut EmpireLedgers,
    catalog: &DesignCatalog,
    now: DateTime<Utc>,
    dt: Duration,
    trace: &mut dyn TraceSink,
) -> Result<(), SimError> {
    trace.line(&format!(
        "step [dt={:.2} hrs] [now={now}]",
        dt.num_milliseconds() as f32 / (1000.0 * 3600.0)
    ));
    for (empire, pool) in ledgers.iter_mut() {
        match empire {
            Some(e) => trace.line(&format!("empire {e}")),
            None => trace.line("empire [native]"),
        }
        advance_empire(star, pool, empire.as_ref(), catalog, now, dt, trace)?;
        if let Some(e) = empire {
            pool.flush(star, e);
        }
    }
    simulate_combat(star, catalog, now, dt, trace)
}

/// Simulates `star` up to `target`.
///
/// Elapsed time since the star's last simulation is replayed in fixed
/// 15-minute ticks, a final remainder step closing the gap exactly. With
/// `predict` set, a clone of the caught-up star is ticked a further 24 hours
/// to forecast build end times, fleet destruction times, and goods depletion
/// times; only those forecasts and the combat report are merged back.
///
/// A star already simulated up to `target` is returned unchanged. Results
/// depend only on the arguments, so identical inputs give identical outputs.
pub fn simulate(
    star: &mut Star,
    catalog: &DesignCatalog,
    target: DateTime<Utc>,
    predict: bool,
    trace: &mut dyn TraceSink,
) -> Result<(), SimError> {
    trace.line(&format!("begin simulation for '{}'", star.name));

    let Some(start) = simulate_start_time(star, target, trace) else {
        trace.line("nothing to simulate");
        return Ok(());
    };
    if start >= target {
        trace.line("already simulated up to target");
        return Ok(());
    }

    // A star touched moments ago still takes one micro-step; extending the
    // end avoids zero-length ticks from clock rounding.
    let end = if target - start < Duration::seconds(3) {
        start + Duration::seconds(3)
    } else {
        target
    };

    let mut ledgers = build_ledgers(star);

    let mut cursor = start;
    while cursor + tick() < end {
        step_all_empires(star, &mut ledgers, catalog, cursor, tick(), trace)?;
        cursor = cursor + tick();
    }
    let remainder = end - cursor;
    if remainder > Duration::seconds(1) {
        step_all_empires(star, &mut ledgers, catalog, cursor, remainder, trace)?;
    }

    if predict {
        trace.line("prediction phase beginning");
        let mut predicted = star.clone();
        let mut predicted_ledgers = ledgers.clone();

        let prediction_end = end + prediction_horizon();
        let mut cursor = end;
        while cursor + tick() < prediction_end {
            step_all_empires(
                &mut predicted,
                &mut predicted_ledgers,
                catalog,
                cursor,
                tick(),
                trace,
            )?;
            cursor = cursor + tick();
        }

        merge_prediction(star, &predicted, trace);
    }

    star.last_simulation = Some(end);
    Ok(())
}

/// Copies the forecast-only outputs of the prediction run back onto the real
/// star: build end times, fleet destruction times, goods-depletion times, and
/// the combat report. Everything else about the prediction clone is dropped.
fn merge_prediction(star: &mut Star, predicted: &Star, trace: &mut dyn TraceSink) {
    for request in &mut star.build_requests {
        if let Some(p) = predicted.build_requests.iter().find(|p| p.key == request.key) {
            request.end_time = p.end_time;
        }
    }

    for fleet in &mut star.fleets {
        if let Some(p) = predicted.fleets.iter().find(|p| p.key == fleet.key) {
            if p.time_destroyed != fleet.time_destroyed {
                trace.line(&format!(
                    "fleet {}: predicted destruction at {:?}",
                    fleet.key, p.time_destroyed
                ));
            }
            fleet.time_destroyed = p.time_destroyed;
        }
    }

    for presence in &mut star.empires {
        if let Some(p) = predicted.empires.iter().find(|p| p.key == presence.key) {
            presence.goods_zero_time = p.goods_zero_time;
        }
    }

    star.combat_report = predicted.combat_report.clone();
}
