use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use wildgrid::{
    logging,
    resources::ResourceKind,
    scenario::{Scenario, ScenarioLoader},
    world::World,
    TickSummary,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Wildgrid ecosystem simulation runner")]
struct Cli {
    /// Path to a scenario YAML file (built-in meadow when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override tick count
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the master seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override map width
    #[arg(long)]
    width: Option<u32>,

    /// Override map height
    #[arg(long)]
    height: Option<u32>,

    /// Override the clock time scale (clamped to 0..=10)
    #[arg(long)]
    time_scale: Option<f64>,

    /// Pace ticks against the wall clock instead of running headless
    #[arg(long)]
    realtime: bool,

    /// Write the final frame as JSON to this path
    #[arg(long)]
    export: Option<PathBuf>,
}

impl Cli {
    fn scenario(&self) -> Result<Scenario> {
        let mut scenario = match &self.scenario {
            Some(path) => ScenarioLoader::new(".").load(path)?,
            None => Scenario::meadow(),
        };
        if let Some(ticks) = self.ticks {
            scenario.ticks = ticks;
        }
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }
        if let Some(width) = self.width {
            scenario.world.width = width;
        }
        if let Some(height) = self.height {
            scenario.world.height = height;
        }
        if let Some(scale) = self.time_scale {
            scenario.time_scale = scale;
        }
        Ok(scenario)
    }
}

fn log_kpis(summary: &TickSummary, world: &World, every: u64) {
    if every == 0 || summary.tick % every != 0 {
        return;
    }
    let time = world.clock.state();
    tracing::info!(
        tick = summary.tick,
        year = time.year,
        month = time.month,
        day = time.day,
        hour = format_args!("{:.1}", time.hour_of_day),
        entities = summary.entities,
        failed = summary.failed_entities.len(),
        food = format_args!("{:.1}", world.ledger.total_amount(ResourceKind::Food)),
        water = format_args!("{:.1}", world.ledger.total_amount(ResourceKind::Water)),
        "kpi"
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let scenario = cli.scenario()?;
    logging::init(&scenario.logging);

    let mut engine = scenario.build_engine()?;
    let kpi_every = scenario.logging.kpi_interval_ticks;

    let ticks = if cli.realtime {
        let stop = engine.stop_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                stop.stop();
            }
        });
        engine
            .run_realtime(Some(scenario.ticks), |summary, world| {
                log_kpis(summary, world, kpi_every)
            })
            .await?
    } else {
        engine.run_fixed(scenario.ticks, scenario.tick_ms, |summary, world| {
            log_kpis(summary, world, kpi_every)
        })?
    };

    if let Some(path) = &cli.export {
        engine
            .frame_snapshot()
            .write_json(path)
            .with_context(|| format!("Failed to export frame to {}", path.display()))?;
        tracing::info!(path = %path.display(), "frame exported");
    }

    println!(
        "Scenario '{}' completed {} ticks. Entities alive: {}",
        scenario.name,
        ticks,
        engine.world().registry.len()
    );
    Ok(())
}
