//! Application entry point for the DLA dendrimer simulator.
//!
//! Runs one aggregation per requested atom count, records each radius of
//! gyration in the result store, and then opens [`Viewer`] on the start and
//! finish states unless `--headless` is given. With `--no-sim` nothing is
//! simulated and only the fit over the stored results is shown.

mod viewer;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dla_core::{
    Config, GyrationSink, JsonStore, Layout, SimulationRun, fractal::{self, FractalFit},
};
use log::{info, warn};
use viewer::{RunView, Viewer};

#[derive(Parser, Debug)]
#[command(about = "Diffusion-limited aggregation of a 3-D dendrimer")]
struct Args {
    /// Initial ion layout (cube, sphere, random).
    #[arg(long, default_value = "sphere")]
    layout: Layout,

    /// Atom counts to simulate, one run each.
    #[arg(long, num_args = 1.., default_values_t = [10usize, 100])]
    atoms: Vec<usize>,

    /// Seed of the first run; later runs use seed + 1, seed + 2, ...
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// TOML file overriding engine parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file collecting gyration results across invocations.
    #[arg(long, default_value = "gyration.json")]
    store: PathBuf,

    /// Delete stored results before running.
    #[arg(long)]
    clear_store: bool,

    /// Print the fractal dimension fit and open the chart window.
    #[arg(long)]
    plot: bool,

    /// Skip simulating and chart the results already in the store.
    #[arg(long)]
    no_sim: bool,

    /// Skip the viewer window.
    #[arg(long)]
    headless: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Runs every requested atom count and stores finished results.
fn run_all(args: &Args, cfg: &Config, store: &mut impl GyrationSink) -> Result<Vec<RunView>> {
    let mut runs = Vec::with_capacity(args.atoms.len());
    for (i, &atoms) in args.atoms.iter().enumerate() {
        let seed = args.seed.wrapping_add(i as u64);
        let mut sim = SimulationRun::new(args.layout, atoms, seed, *cfg)
            .with_context(|| format!("setting up run with {atoms} atoms"))?;
        sim.run();

        match sim.gyration_sample() {
            Some(sample) => {
                info!("N = {}, Rg = {:.4}", sample.atoms, sample.radius);
                store.record(&sample).context("storing gyration result")?;
            }
            None => warn!("run with {atoms} atoms did not finish, result not stored"),
        }
        runs.push(RunView::from_run(&sim));
    }
    Ok(runs)
}

fn fit_for(layout: Layout, store: &JsonStore) -> Option<FractalFit> {
    match fractal::fractal_dimension(&store.table().with_layout(layout)) {
        Ok(fit) => Some(fit),
        Err(e) => {
            info!("no fractal dimension for {layout}: {e}");
            None
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = load_config(args.config.as_ref())?;

    let mut store = JsonStore::open(&args.store)
        .with_context(|| format!("opening result store {}", args.store.display()))?;
    if args.clear_store {
        store.clear().context("clearing result store")?;
    }

    let runs = if args.no_sim {
        info!("simulation skipped, charting {} stored rows", store.table().len());
        Vec::new()
    } else {
        run_all(&args, &cfg, &mut store)?
    };
    let fit = fit_for(args.layout, &store);
    let plot = args.plot || args.no_sim;

    if plot {
        match &fit {
            Some(fit) => println!("Fractal dimension Df = {:.4} ({})", fit.dimension, args.layout),
            None => println!("No data to plot."),
        }
    }

    if args.headless {
        return Ok(());
    }

    let viewer = Viewer::new(runs, args.layout, fit, cfg.atom_radius).with_chart_open(plot);
    eframe::run_native(
        "DLA dendrimer",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
