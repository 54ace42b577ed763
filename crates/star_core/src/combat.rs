//! Combat sub-engine: one-minute rounds of grouped, simultaneous fire.
//!
//! Runs inside a tick whenever at least one non-destroyed fleet is attacking.
//! Fleets of the same design, stance, and state that are mutually friendly
//! fight as one group; every attacking group picks the lowest-priority
//! visible enemy group and all damage is computed from the round's starting
//! state before any of it is applied.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::SimError;
use crate::friendly::is_friendly;
use crate::trace::TraceSink;
use crate::types::{
    AllianceId, AttackRecord, CombatRound, DesignCatalog, DesignId, EmpireId, Fleet,
    FleetGroupSummary, FleetState, FleetStance, LossRecord, ShipEffect, Star, CLOAK_UPGRADE,
};

/// A moving fleet is invisible to combat, as is a cloaked fleet that is not
/// aggressive.
fn is_visible(fleet: &Fleet) -> bool {
    if fleet.state == FleetState::Moving {
        return false;
    }
    !(fleet.has_upgrade(CLOAK_UPGRADE) && fleet.stance != FleetStance::Aggressive)
}

/// Rounds a timestamp up to the next whole minute.
fn next_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp();
    let aligned = secs - secs.rem_euclid(60) + 60;
    DateTime::from_timestamp(aligned, 0).unwrap_or(t)
}

struct FleetGroup {
    /// Indices into `star.fleets`, in encounter order.
    fleets: Vec<usize>,
    empire: Option<EmpireId>,
    alliance: Option<AllianceId>,
    design_id: DesignId,
    stance: FleetStance,
    state: FleetState,
    num_ships: f32,
}

impl FleetGroup {
    fn accepts(&self, fleet: &Fleet) -> bool {
        is_friendly(
            self.empire.as_ref(),
            self.alliance,
            fleet.empire.as_ref(),
            fleet.alliance,
        ) && self.design_id == fleet.design_id
            && self.stance == fleet.stance
            && self.state == fleet.state
    }
}

fn build_groups(star: &Star, now: DateTime<Utc>) -> Vec<FleetGroup> {
    let mut groups: Vec<FleetGroup> = Vec::new();
    for (i, fleet) in star.fleets.iter().enumerate() {
        if fleet.is_destroyed(now) || !is_visible(fleet) {
            continue;
        }
        if let Some(group) = groups.iter_mut().find(|g| g.accepts(fleet)) {
            group.fleets.push(i);
            group.num_ships += fleet.num_ships;
        } else {
            groups.push(FleetGroup {
                fleets: vec![i],
                empire: fleet.empire.clone(),
                alliance: fleet.alliance,
                design_id: fleet.design_id.clone(),
                stance: fleet.stance,
                state: fleet.state,
                num_ships: fleet.num_ships,
            });
        }
    }
    groups
}

/// Picks the not-friendly, non-moving group with the lowest combat priority.
/// Ties go to the first group encountered, so results are reproducible.
fn find_target(
    groups: &[FleetGroup],
    attacker: &FleetGroup,
    catalog: &DesignCatalog,
) -> Result<Option<usize>, SimError> {
    let mut found: Option<(usize, i32)> = None;
    for (j, candidate) in groups.iter().enumerate() {
        if is_friendly(
            attacker.empire.as_ref(),
            attacker.alliance,
            candidate.empire.as_ref(),
            candidate.alliance,
        ) || candidate.state == FleetState::Moving
        {
            continue;
        }
        let (_, stats) = catalog.ship(&candidate.design_id)?;
        if found.map_or(true, |(_, best)| stats.combat_priority < best) {
            found = Some((j, stats.combat_priority));
        }
    }
    Ok(found.map(|(j, _)| j))
}

/// Whether any two visible, non-destroyed, mutually-unfriendly fleets remain.
fn enemies_remain(star: &Star, now: DateTime<Utc>) -> bool {
    for (i, a) in star.fleets.iter().enumerate() {
        if a.is_destroyed(now) || !is_visible(a) {
            continue;
        }
        for b in &star.fleets[i + 1..] {
            if b.is_destroyed(now) || !is_visible(b) {
                continue;
            }
            if !crate::friendly::fleets_friendly(a, b) {
                return true;
            }
        }
    }
    false
}

/// Resolves one round at `now`. Returns `false` once combat is over: no
/// visible enemies remain and every attacking fleet has gone back to idle.
fn run_round(
    star: &mut Star,
    catalog: &DesignCatalog,
    now: DateTime<Utc>,
    round: &mut CombatRound,
    trace: &mut dyn TraceSink,
) -> Result<bool, SimError> {
    let mut groups = build_groups(star, now);

    round.groups = groups
        .iter()
        .map(|g| FleetGroupSummary {
            fleets: g.fleets.iter().map(|&i| star.fleets[i].key.clone()).collect(),
            design_id: g.design_id.clone(),
            num_ships: g.num_ships,
        })
        .collect();

    // All attacks are decided from the round's starting state; damage totals
    // per target accumulate before any of it lands.
    let mut hits: BTreeMap<usize, f32> = BTreeMap::new();
    let mut no_target: Vec<usize> = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if group.state != FleetState::Attacking {
            continue;
        }
        let Some(target) = find_target(&groups, group, catalog)? else {
            trace.line(&format!("group {i}: no suitable target"));
            no_target.push(i);
            continue;
        };

        let (_, stats) = catalog.ship(&group.design_id)?;
        let damage = group.num_ships * stats.base_attack;
        trace.line(&format!("group {i}: attacking group {target} for {damage:.2} damage"));
        *hits.entry(target).or_insert(0.0) += damage;
        round.attacks.push(AttackRecord {
            attacker: i,
            target,
            damage,
        });
    }
    for i in no_target {
        groups[i].state = FleetState::Idle;
    }

    // Idle fleets that took fire get their design's on-attacked reactions
    // before the damage lands.
    for (&target, _) in &hits {
        let group = &groups[target];
        let (_, stats) = catalog.ship(&group.design_id)?;
        for &fleet_index in &group.fleets {
            let fleet = &mut star.fleets[fleet_index];
            if fleet.state != FleetState::Idle {
                continue;
            }
            for effect in &stats.effects {
                match effect {
                    ShipEffect::ReturnFire => {
                        fleet.state = FleetState::Attacking;
                        fleet.state_start_time = now;
                    }
                }
            }
        }
    }

    // Apply the damage: losses consume each of the group's fleets in order.
    for (&target, &damage) in &hits {
        let group = &groups[target];
        let (_, stats) = catalog.ship(&group.design_id)?;
        let ships_lost = damage / stats.base_defence;
        trace.line(&format!("group {target}: {ships_lost:.2} ships lost"));
        round.losses.push(LossRecord { target, ships_lost });

        let mut remaining = ships_lost;
        for &fleet_index in &group.fleets {
            let fleet = &mut star.fleets[fleet_index];
            let taken = remaining.min(fleet.num_ships);
            fleet.num_ships -= taken;
            remaining -= taken;
            if fleet.num_ships <= 0.0 {
                fleet.num_ships = 0.0;
                fleet.time_destroyed = Some(now);
            }
            if remaining <= 0.0 {
                break;
            }
        }
    }

    if !enemies_remain(star, now) {
        for fleet in &mut star.fleets {
            if fleet.state == FleetState::Attacking {
                fleet.idle(now);
            }
        }
        return Ok(false);
    }
    Ok(true)
}

/// Runs combat for the tick `[now, now+dt)` in one-minute rounds, appending
/// to (or creating) the star's combat report.
pub(crate) fn simulate_combat(
    star: &mut Star,
    catalog: &DesignCatalog,
    now: DateTime<Utc>,
    dt: Duration,
    trace: &mut dyn TraceSink,
) -> Result<(), SimError> {
    let num_attacking = star
        .fleets
        .iter()
        .filter(|f| f.state == FleetState::Attacking && !f.is_destroyed(now))
        .count();
    if num_attacking == 0 {
        return Ok(());
    }

    let mut report = star.combat_report.take().unwrap_or_default();
    // Rounds beyond "now" came from an earlier prediction phase; this run
    // recomputes them.
    report.rounds.retain(|round| round.time <= now);
    report.start_time = report.rounds.first().map(|r| r.time);
    report.end_time = report.rounds.last().map(|r| r.time);
    trace.line(&format!(
        "combat: {} rounds kept, {num_attacking} fleets attacking",
        report.rounds.len()
    ));

    // Combat begins on the minute boundary after the earliest attack order.
    let mut attack_start = star
        .fleets
        .iter()
        .filter(|f| f.state == FleetState::Attacking && !f.is_destroyed(now))
        .map(|f| f.state_start_time)
        .min()
        .unwrap_or(now);
    if attack_start < now {
        attack_start = now;
    }
    let attack_start = next_minute(attack_start);

    let tick_end = now + dt;
    if attack_start > tick_end {
        star.combat_report = Some(report);
        return Ok(());
    }

    let mut cursor = now;
    while cursor < tick_end {
        if cursor < attack_start {
            cursor = next_minute(cursor).min(attack_start);
            continue;
        }

        let mut round = CombatRound {
            time: cursor,
            groups: Vec::new(),
            attacks: Vec::new(),
            losses: Vec::new(),
        };
        trace.line(&format!("combat round {} at {cursor}", report.rounds.len() + 1));
        let still_fighting = run_round(star, catalog, cursor, &mut round, trace)?;
        if report.start_time.is_none() {
            report.start_time = Some(cursor);
        }
        report.end_time = Some(cursor);
        report.rounds.push(round);

        if !still_fighting {
            trace.line("combat finished");
            break;
        }
        cursor += Duration::minutes(1);
    }

    star.combat_report = Some(report);
    Ok(())
}
