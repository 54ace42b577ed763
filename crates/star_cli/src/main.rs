use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use star_core::{simulate, FleetState, NullTrace, Star, TraceSink};
use star_world::{demo_catalog, demo_star, load_catalog};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "star_cli", about = "Star system simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Catch a star up to a target instant and print a summary.
    Simulate {
        /// Load the star from a JSON file. Mutually exclusive with --demo.
        #[arg(long = "star", conflicts_with = "demo")]
        star_file: Option<String>,
        /// Use the built-in demo star and catalog.
        #[arg(long)]
        demo: bool,
        /// Directory holding building_designs.json and ship_designs.json.
        /// Ignored with --demo.
        #[arg(long, default_value = "./catalog")]
        catalog_dir: String,
        /// Target instant, RFC 3339. Defaults to now.
        #[arg(long = "at")]
        at: Option<String>,
        /// Skip the 24-hour prediction phase.
        #[arg(long)]
        no_predict: bool,
        /// Print engine trace lines while simulating.
        #[arg(long)]
        trace: bool,
        /// Write the updated star back out as JSON.
        #[arg(long)]
        out: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Simulate command
// ---------------------------------------------------------------------------

fn run_simulate(
    star_file: Option<String>,
    demo: bool,
    catalog_dir: &str,
    at: Option<String>,
    no_predict: bool,
    trace: bool,
    out: Option<String>,
) -> Result<()> {
    let target: DateTime<Utc> = match at {
        Some(text) => DateTime::parse_from_rfc3339(&text)
            .with_context(|| format!("parsing --at instant: {text}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let (mut star, catalog) = if demo {
        (demo_star(target), demo_catalog())
    } else {
        let Some(path) = star_file else {
            bail!("either --star <file> or --demo is required");
        };
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading star file: {path}"))?;
        let star: Star =
            serde_json::from_str(&json).with_context(|| format!("parsing star file: {path}"))?;
        (star, load_catalog(catalog_dir)?)
    };

    println!(
        "Simulating {} ({}) to {target}  predict={}",
        star.name,
        star.key,
        !no_predict,
    );
    println!("{}", "-".repeat(80));

    let mut stdout_trace = |line: &str| println!("  {line}");
    let mut null_trace = NullTrace;
    let sink: &mut dyn TraceSink = if trace {
        &mut stdout_trace
    } else {
        &mut null_trace
    };
    simulate(&mut star, &catalog, target, !no_predict, sink)
        .with_context(|| format!("simulating star {}", star.key))?;

    print_status(&star, target);

    if let Some(path) = out {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating output file: {path}"))?;
        serde_json::to_writer_pretty(file, &star)
            .with_context(|| format!("writing output file: {path}"))?;
        println!("Updated star written to {path}");
    }

    Ok(())
}

fn print_status(star: &Star, now: DateTime<Utc>) {
    println!("Colonies:");
    for colony in &star.colonies {
        let owner = colony
            .empire
            .as_ref()
            .map_or("native", |empire| empire.0.as_str());
        println!(
            "  {key}  owner={owner}  planet={planet}  pop={pop:.1}/{max:.0}  taxes={taxes:.1}",
            key = colony.key,
            planet = colony.planet_index,
            pop = colony.population,
            max = colony.max_population,
            taxes = colony.uncollected_taxes,
        );
    }

    println!("Empires:");
    for presence in &star.empires {
        let depletion = presence
            .goods_zero_time
            .map_or("-".to_string(), |t| t.to_rfc3339());
        println!(
            "  {empire}  goods={goods:.1}/{max_goods:.0}  minerals={minerals:.1}/{max_minerals:.0}  goods_zero={depletion}",
            empire = presence.empire,
            goods = presence.total_goods,
            max_goods = presence.max_goods,
            minerals = presence.total_minerals,
            max_minerals = presence.max_minerals,
        );
    }

    println!("Build requests:");
    for request in &star.build_requests {
        let eta = request
            .end_time
            .map_or("-".to_string(), |t| t.to_rfc3339());
        println!(
            "  {key}  {kind:?} {design} x{count}  progress={progress:.1}%  eta={eta}",
            key = request.key,
            kind = request.design_kind,
            design = request.design_id,
            count = request.count,
            progress = request.progress * 100.0,
        );
    }

    println!("Fleets:");
    for fleet in &star.fleets {
        let owner = fleet
            .empire
            .as_ref()
            .map_or("native", |empire| empire.0.as_str());
        let fate = if fleet.is_destroyed(now) {
            "DESTROYED"
        } else {
            match fleet.state {
                FleetState::Idle => "idle",
                FleetState::Moving => "moving",
                FleetState::Attacking => "attacking",
            }
        };
        println!(
            "  {key}  owner={owner}  {design} x{ships:.1}  {fate}",
            key = fleet.key,
            design = fleet.design_id,
            ships = fleet.num_ships,
        );
    }

    match &star.combat_report {
        Some(report) => {
            println!("Combat report: {} round(s)", report.rounds.len());
            if let (Some(first), Some(last)) = (report.rounds.first(), report.rounds.last()) {
                println!("  from {} to {}", first.time.to_rfc3339(), last.time.to_rfc3339());
            }
        }
        None => println!("Combat report: none"),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate {
            star_file,
            demo,
            catalog_dir,
            at,
            no_predict,
            trace,
            out,
        } => {
            run_simulate(star_file, demo, &catalog_dir, at, no_predict, trace, out)?;
        }
    }
    Ok(())
}
