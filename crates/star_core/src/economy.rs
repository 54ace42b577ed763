//! Per-empire economy step: production, taxation, construction, population.
//!
//! One call advances a single empire's colonies on a star by `dt`. Resource
//! pools are shared across the empire's colonies, so production is tallied
//! for every colony before any construction spends from the pool.

use chrono::{DateTime, Duration, Utc};

use crate::error::SimError;
use crate::trace::TraceSink;
use crate::types::{BuildRequest, DesignCatalog, EmpireId, Star, UpgradeId};

/// Working copy of one empire's resource pools for the duration of a run.
///
/// Owned empires load from and flush back to the star's `EmpirePresence`;
/// native (unowned) colonies get a small scratch pool that is never persisted.
#[derive(Debug, Clone)]
pub(crate) struct PoolLedger {
    pub goods: f32,
    pub max_goods: f32,
    pub minerals: f32,
    pub max_minerals: f32,
    pub goods_zero_time: Option<DateTime<Utc>>,
}

impl PoolLedger {
    /// Scratch pool for native colonies, per the steady-state assumption that
    /// natives always have a little of everything on hand.
    pub fn native() -> Self {
        Self {
            goods: 50.0,
            max_goods: 50.0,
            minerals: 50.0,
            max_minerals: 50.0,
            goods_zero_time: None,
        }
    }

    pub fn from_star(star: &Star, empire: &EmpireId) -> Self {
        star.empires
            .iter()
            .find(|p| &p.empire == empire)
            .map_or_else(Self::native, |p| Self {
                goods: p.total_goods,
                max_goods: p.max_goods,
                minerals: p.total_minerals,
                max_minerals: p.max_minerals,
                goods_zero_time: p.goods_zero_time,
            })
    }

    /// Writes the ledger back to the star's presence record, if one exists.
    pub fn flush(&self, star: &mut Star, empire: &EmpireId) {
        if let Some(presence) = star.empires.iter_mut().find(|p| &p.empire == empire) {
            presence.total_goods = self.goods;
            presence.total_minerals = self.minerals;
            presence.goods_zero_time = self.goods_zero_time;
        }
    }
}

fn hours(dt: Duration) -> f32 {
    dt.num_milliseconds() as f32 / (1000.0 * 3600.0)
}

const HOURS_CAP: f32 = 100_000.0;
const INSTANT_FINISH_HOURS: f32 = 10.0 / 3600.0;

fn end_time_after(now: DateTime<Utc>, hours: f32) -> DateTime<Utc> {
    now + Duration::milliseconds((hours * 3600.0 * 1000.0) as i64)
}

/// Whether a build request will be worked on during the tick `[now, now+dt)`:
/// it has started by tick-end and its last estimated end time has not passed.
fn is_active(request: &BuildRequest, now: DateTime<Utc>, tick_end: DateTime<Utc>) -> bool {
    if request.start_time > tick_end {
        return false;
    }
    !request.end_time.is_some_and(|end| end < now)
}

/// Advances one empire's colonies by `dt`, ending at `now + dt`.
///
/// `empire` is `None` for the native population. Mutates colony population
/// and taxes, build-request progress and end times, and the pool ledger.
pub(crate) fn advance_empire(
    star: &mut Star,
    pool: &mut PoolLedger,
    empire: Option<&EmpireId>,
    catalog: &DesignCatalog,
    now: DateTime<Utc>,
    dt: Duration,
    trace: &mut dyn TraceSink,
) -> Result<(), SimError> {
    let dt_hours = hours(dt);
    let tick_end = now + dt;
    let planet_count = star.planets.len();

    let colony_indices: Vec<usize> = star
        .colonies
        .iter()
        .enumerate()
        .filter(|(_, c)| c.empire.as_ref() == empire)
        .map(|(i, _)| i)
        .collect();

    // Pass 1: production and taxation. Tally the whole empire before any
    // colony spends from the shared pool.
    let mut total_population = 0.0f32;
    for &i in &colony_indices {
        let colony = &mut star.colonies[i];
        let planet = star
            .planets
            .get(colony.planet_index)
            .ok_or_else(|| SimError::PlanetSlotOutOfRange {
                colony: colony.key.clone(),
                index: colony.planet_index,
                count: planet_count,
            })?;

        let goods_rate =
            colony.population * colony.focus.farming * (planet.farming_congeniality as f32 / 100.0);
        pool.goods += goods_rate * dt_hours;

        let minerals_rate =
            colony.population * colony.focus.mining * (planet.mining_congeniality as f32 / 100.0);
        pool.minerals += minerals_rate * dt_hours;

        total_population += colony.population;

        let tax_per_hour = 0.012 * colony.population;
        colony.uncollected_taxes += tax_per_hour * dt_hours;

        trace.line(&format!(
            "colony {}: goods +{:.2}/hr, minerals +{:.2}/hr, taxes {:.2} uncollected",
            colony.key,
            goods_rate,
            minerals_rate,
            colony.uncollected_taxes
        ));
    }

    // Pass 2: construction, per colony, spending from the shared pool.
    for &i in &colony_indices {
        let colony_key = star.colonies[i].key.clone();
        let population = star.colonies[i].population;
        let construction_focus = star.colonies[i].focus.construction;

        let num_active = star
            .build_requests
            .iter()
            .filter(|r| r.colony == colony_key && is_active(r, now, tick_end))
            .count();
        if num_active == 0 {
            continue;
        }

        // Workers and minerals are split evenly across the colony's active
        // requests. A request always gets at least one worker-equivalent.
        let total_workers = population * construction_focus;
        let workers_per_build = (total_workers / num_active as f32).max(1.0);
        let minerals_per_build = pool.minerals / num_active as f32;

        trace.line(&format!(
            "colony {colony_key}: {num_active} active builds, {total_workers:.2} workers, {minerals_per_build:.2} minerals each"
        ));

        for request in &mut star.build_requests {
            if request.colony != colony_key || !is_active(request, now, tick_end) {
                continue;
            }

            let design = catalog.get(request.design_kind, &request.design_id)?;

            // An upgrade of an existing fleet is costed from the upgrade
            // table, not the base design.
            let build_cost = if request.existing_fleet.is_some() {
                let upgrade_id = request
                    .upgrade_id
                    .clone()
                    .unwrap_or_else(|| UpgradeId(String::new()));
                let upgrade =
                    design
                        .upgrade(&upgrade_id)
                        .ok_or_else(|| SimError::UnknownUpgrade {
                            design: design.id.clone(),
                            upgrade: upgrade_id,
                        })?;
                &upgrade.build_cost
            } else {
                &design.build_cost
            };

            // The design's build time assumes exactly 100 workers; double
            // the workers and you halve the time.
            let total_build_hours = request.count as f32 * (build_cost.time_seconds as f32 / 3600.0)
                * (100.0 / workers_per_build);
            let remaining_hours = (1.0 - request.progress) * total_build_hours;

            if remaining_hours < INSTANT_FINISH_HOURS {
                request.progress = 1.0;
                request.end_time = Some(now);
                trace.line(&format!("build {}: finished", request.key));
                continue;
            }

            // Clip the usable portion of dt to after the request's start and
            // to the time actually remaining.
            let mut dt_used = dt_hours;
            if request.start_time > now {
                dt_used -= hours(request.start_time - now);
            }
            dt_used = dt_used.min(remaining_hours);

            let progress_this_tick = dt_used / total_build_hours;
            if progress_this_tick <= 0.0 {
                // No progress this tick; refresh the end-time estimate, but
                // never push a previously recorded estimate later.
                let end = end_time_after(now, remaining_hours.min(HOURS_CAP));
                if request.end_time.map_or(true, |e| e > end) {
                    request.end_time = Some(end);
                }
                continue;
            }

            let minerals_required = request.count as f32 * build_cost.minerals * progress_this_tick;
            if minerals_required > minerals_per_build {
                // Starved: do only the fraction of the work the mineral share
                // covers, but consume the whole share.
                pool.minerals -= minerals_per_build;
                request.progress += progress_this_tick * (minerals_per_build / minerals_required);
            } else {
                pool.minerals -= minerals_required;
                request.progress += progress_this_tick;
            }

            let remaining_hours = ((1.0 - request.progress) * total_build_hours).min(HOURS_CAP);
            request.end_time = Some(end_time_after(now, dt_used + remaining_hours));

            if request.progress >= 1.0 {
                request.progress = 1.0;
            }

            trace.line(&format!(
                "build {}: progress {:.4}, end {:?}",
                request.key, request.progress, request.end_time
            ));
        }
    }

    // Pass 3: goods upkeep and population change, empire-wide efficiency
    // applied per colony.
    let mut goods_per_hour = total_population / 10.0;
    if total_population > 0.0001 && goods_per_hour < 10.0 {
        goods_per_hour = 10.0;
    }
    let goods_required = goods_per_hour * dt_hours;

    let mut efficiency = 1.0f32;
    if goods_required > pool.goods && goods_required > 0.0 {
        efficiency = pool.goods / goods_required;
    }

    trace.line(&format!(
        "upkeep: {goods_required:.2} goods required, {:.2} available, efficiency {efficiency:.2}",
        pool.goods
    ));

    pool.goods -= goods_required;
    if pool.goods <= 0.0 {
        pool.goods = 0.0;
        // Keep the earliest known depletion instant.
        if pool.goods_zero_time.map_or(true, |t| t > tick_end) {
            pool.goods_zero_time = Some(tick_end);
        }
    }

    for &i in &colony_indices {
        let colony = &mut star.colonies[i];
        let rate_per_hour = if efficiency >= 1.0 {
            colony.population.max(10.0) * colony.focus.population * 0.5
        } else {
            colony.population.max(10.0) * (1.0 - colony.focus.population) * 0.25 * (efficiency - 1.0)
        };

        let mut new_population = colony.population + rate_per_hour * dt_hours;
        if new_population < 1.0 {
            new_population = 0.0;
        } else if new_population > colony.max_population {
            new_population = colony.max_population;
        }
        if new_population < 100.0 && colony.in_cooldown() {
            new_population = 100.0;
        }
        trace.line(&format!(
            "colony {}: population {:.2} -> {:.2}",
            colony.key, colony.population, new_population
        ));
        colony.population = new_population;
    }

    pool.goods = pool.goods.clamp(0.0, pool.max_goods);
    pool.minerals = pool.minerals.clamp(0.0, pool.max_minerals);

    Ok(())
}
