//! A single aggregation run, from initial layout to frozen cluster.
//!
//! [`SimulationRun`] owns the ions, the cluster and the random source, and is
//! the only type external consumers need: it hands out particle snapshots for
//! display and a [`GyrationSample`] for result storage.

use glam::DVec3;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    cluster::Cluster,
    config::Config,
    engine::{self, RunOutcome},
    error::{ConfigError, GyrationError},
    gyration,
    layout::{self, Layout},
    particle::{Ion, Particle},
    results::GyrationSample,
    types::Generation,
};

/// Which end of a particle's history to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    Start,
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Ion,
    Electrode,
}

/// Display record for one particle at one end of the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleView {
    pub kind: ParticleKind,
    /// `None` while the particle is a free ion.
    pub generation: Option<Generation>,
    pub pos: DVec3,
}

#[derive(Debug)]
pub struct SimulationRun {
    layout: Option<Layout>,
    atom_count: usize,
    seed: u64,
    cfg: Config,
    rng: ChaCha8Rng,
    ions: Vec<Ion>,
    cluster: Cluster,
    sweeps: u64,
    outcome: Option<RunOutcome>,
}

impl SimulationRun {
    /// Prepares a run of `atom_count` ions placed by `layout`, around a seed
    /// electrode at the origin.
    ///
    /// Nothing moves until [`SimulationRun::run`] is called.
    pub fn new(
        layout: Layout,
        atom_count: usize,
        seed: u64,
        cfg: Config,
    ) -> Result<Self, ConfigError> {
        validate(atom_count, &cfg)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let positions = layout::generate(layout, atom_count, &mut rng);
        Ok(Self::assemble(Some(layout), positions, seed, cfg, rng))
    }

    /// Prepares a run from explicit ion positions instead of a layout.
    pub fn with_positions(
        positions: Vec<DVec3>,
        seed: u64,
        cfg: Config,
    ) -> Result<Self, ConfigError> {
        validate(positions.len(), &cfg)?;
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Self::assemble(None, positions, seed, cfg, rng))
    }

    fn assemble(
        layout: Option<Layout>,
        positions: Vec<DVec3>,
        seed: u64,
        cfg: Config,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            layout,
            atom_count: positions.len(),
            seed,
            cfg,
            rng,
            ions: positions.into_iter().map(Ion::new).collect(),
            cluster: Cluster::new(DVec3::ZERO),
            sweeps: 0,
            outcome: None,
        }
    }

    /// Runs the aggregation until every ion has bonded or the sweep budget
    /// is spent.
    ///
    /// Calling it again after an abort continues the same run with a fresh
    /// budget; after completion it just returns the stored outcome.
    pub fn run(&mut self) -> RunOutcome {
        if let Some(outcome @ RunOutcome::Done { .. }) = self.outcome {
            return outcome;
        }

        info!(
            "starting run: {} atoms, layout {}, seed {}, {:?} sweeps",
            self.atom_count,
            self.layout.map_or("custom", Layout::as_str),
            self.seed,
            self.cfg.sweep_mode
        );

        let finished = engine::run(&mut self.ions, &mut self.cluster, &self.cfg, &mut self.rng);
        let outcome = match finished {
            RunOutcome::Done { sweeps } => {
                self.sweeps += sweeps;
                RunOutcome::Done {
                    sweeps: self.sweeps,
                }
            }
            RunOutcome::Aborted { sweeps, free } => {
                self.sweeps += sweeps;
                RunOutcome::Aborted {
                    sweeps: self.sweeps,
                    free,
                }
            }
        };
        self.outcome = Some(outcome);

        if outcome.is_done() {
            info!(
                "run finished after {} sweeps, {} generations",
                self.sweeps,
                self.cluster.max_generation()
            );
        }
        outcome
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some_and(|o| o.is_done())
    }

    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// Number of ions the run started with (the seed is not counted).
    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    pub fn ions(&self) -> &[Ion] {
        &self.ions
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    /// Every particle, electrodes first (seed at the front), then free ions.
    pub fn particles(&self) -> impl Iterator<Item = Particle<'_>> {
        self.cluster
            .electrodes
            .iter()
            .map(Particle::Electrode)
            .chain(self.ions.iter().map(Particle::Ion))
    }

    /// Current positions of every particle, in [`SimulationRun::particles`] order.
    pub fn positions(&self) -> Vec<DVec3> {
        self.particles().map(|p| p.pos()).collect()
    }

    /// Radius of gyration over every particle present, seed included.
    pub fn radius_of_gyration(&self) -> Result<f64, GyrationError> {
        gyration::radius_of_gyration(&self.positions())
    }

    /// Result record for a finished layout-based run.
    ///
    /// `None` while ions are still free or for runs built from explicit
    /// positions.
    pub fn gyration_sample(&self) -> Option<GyrationSample> {
        if !self.is_done() {
            return None;
        }
        let layout = self.layout?;
        let radius = self.radius_of_gyration().ok()?;
        Some(GyrationSample {
            atoms: self.atom_count,
            layout,
            radius,
        })
    }

    /// Particles as they were at the start or as they are now.
    ///
    /// At [`SimState::Start`] only the seed is an electrode; every other
    /// particle is shown as the free ion it started as.
    pub fn snapshot(&self, state: SimState) -> Vec<ParticleView> {
        self.particles()
            .map(|p| {
                let history = p.history();
                match state {
                    SimState::Start => {
                        let was_seed = matches!(p, Particle::Electrode(e) if e.is_seed());
                        ParticleView {
                            kind: if was_seed {
                                ParticleKind::Electrode
                            } else {
                                ParticleKind::Ion
                            },
                            generation: if was_seed { Some(0) } else { None },
                            pos: history.first().copied().unwrap_or(p.pos()),
                        }
                    }
                    SimState::Finish => ParticleView {
                        kind: if p.is_ion() {
                            ParticleKind::Ion
                        } else {
                            ParticleKind::Electrode
                        },
                        generation: p.generation(),
                        pos: p.pos(),
                    },
                }
            })
            .collect()
    }
}

fn validate(atom_count: usize, cfg: &Config) -> Result<(), ConfigError> {
    if atom_count == 0 {
        return Err(ConfigError::InvalidAtomCount);
    }
    cfg.validate()
}
