//! Aggregation engine: moves free ions until every one of them has bonded.
//!
//! One [`sweep`] visits every free ion once:
//! 1. Find the nearest electrode with [`Cluster::find_nearest_within`].
//! 2. If it is within [`Config::bonding_radius`], the ion bonds: it is
//!    promoted to an electrode whose resting place is [`bond_position`].
//! 3. Otherwise the ion takes one step of length [`Config::step`] along
//!    [`biased_direction`].
//!
//! [`run`] repeats sweeps until no free ion is left, or until the optional
//! sweep budget in [`Config::max_sweeps`] runs out.
//!
//! Whether a bond made during a sweep is visible to ions visited later in
//! the same sweep is decided by [`Config::sweep_mode`]; see [`SweepMode`].

use glam::DVec3;
use log::{debug, trace, warn};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::{
    cluster::Cluster,
    config::{Config, SweepMode},
    particle::Ion,
    types::ElectrodeId,
};

/// Result of a single sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Ions that bonded during the sweep.
    pub bonded: usize,
    /// Ions still free after the sweep.
    pub free: usize,
}

/// How a call to [`run`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every ion bonded.
    Done { sweeps: u64 },
    /// The sweep budget was exhausted (or there was nothing to bond to)
    /// while `free` ions were still moving.
    Aborted { sweeps: u64, free: usize },
}

impl RunOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, RunOutcome::Done { .. })
    }

    pub fn sweeps(&self) -> u64 {
        match *self {
            RunOutcome::Done { sweeps } | RunOutcome::Aborted { sweeps, .. } => sweeps,
        }
    }
}

/// What one ion does in a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Move {
    Bond { parent: ElectrodeId, at: DVec3 },
    Step { to: DVec3 },
    /// No electrode to measure against.
    Stay,
}

/// Resting position of an ion bonding to an electrode at `parent_pos`.
///
/// The ion is pulled (or pushed) along the line from the parent to its
/// current position so that it ends up exactly `bond_length` away. If the
/// ion sits exactly on the parent there is no direction to follow and the
/// position is returned unchanged.
pub fn bond_position(ion_pos: DVec3, parent_pos: DVec3, bond_length: f64) -> DVec3 {
    match (ion_pos - parent_pos).try_normalize() {
        Some(dir) => parent_pos + dir * bond_length,
        None => ion_pos,
    }
}

/// Isotropic random unit vector from a standard normal sample per axis.
pub fn random_unit_vector(rng: &mut impl Rng) -> DVec3 {
    loop {
        let v = DVec3::new(
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
        );
        if let Some(dir) = v.try_normalize() {
            return dir;
        }
    }
}

/// Unit step direction for an ion at `ion_pos` whose nearest electrode is at
/// `target`.
///
/// Blends a random unit vector with the unit vector towards `target`:
/// `normalize((1 - p) * random + p * preferred)`. When the blend cancels out
/// the random direction is used on its own.
pub fn biased_direction(ion_pos: DVec3, target: DVec3, p: f64, rng: &mut impl Rng) -> DVec3 {
    let preferred = (target - ion_pos).normalize_or_zero();
    let random = random_unit_vector(rng);
    ((1.0 - p) * random + p * preferred)
        .try_normalize()
        .unwrap_or(random)
}

/// Decides the move of `ion`, looking only at the first `limit` electrodes.
///
/// Updates the ion's cached electrode distance as a side effect.
fn decide(
    ion: &mut Ion,
    cluster: &Cluster,
    limit: usize,
    cfg: &Config,
    rng: &mut impl Rng,
) -> Move {
    let Some((nearest, dist)) = cluster.find_nearest_within(ion.pos, limit) else {
        return Move::Stay;
    };
    ion.electrode_distance = dist;

    let parent_pos = cluster.electrodes[nearest].pos;
    if dist <= cfg.bonding_radius() {
        Move::Bond {
            parent: nearest,
            at: bond_position(ion.pos, parent_pos, cfg.bond_length()),
        }
    } else {
        let dir = biased_direction(ion.pos, parent_pos, cfg.direc_prob, rng);
        Move::Step {
            to: ion.pos + dir * cfg.step,
        }
    }
}

/// Applies a decided move. Returns `true` if the ion bonded.
fn commit(mut ion: Ion, mv: Move, ions: &mut Vec<Ion>, cluster: &mut Cluster) -> bool {
    match mv {
        Move::Bond { parent, at } => {
            let id = cluster.attach(ion, parent, at);
            trace!("ion bonded as electrode {id} to parent {parent}");
            true
        }
        Move::Step { to } => {
            ion.move_to(to);
            ions.push(ion);
            false
        }
        Move::Stay => {
            ions.push(ion);
            false
        }
    }
}

/// Advances every free ion once.
///
/// Bonded ions are moved from `ions` into `cluster`; the remaining ions keep
/// their relative order.
pub fn sweep(
    ions: &mut Vec<Ion>,
    cluster: &mut Cluster,
    cfg: &Config,
    rng: &mut impl Rng,
) -> SweepReport {
    let pending = std::mem::take(ions);
    ions.reserve(pending.len());
    let mut bonded = 0;

    match cfg.sweep_mode {
        SweepMode::Immediate => {
            for mut ion in pending {
                let mv = decide(&mut ion, cluster, cluster.len(), cfg, rng);
                bonded += usize::from(commit(ion, mv, ions, cluster));
            }
        }
        SweepMode::Snapshot => {
            // Decide everything against the cluster as it was at sweep start,
            // then commit in ion order.
            let frozen = cluster.len();
            let decided: Vec<(Ion, Move)> = pending
                .into_iter()
                .map(|mut ion| {
                    let mv = decide(&mut ion, cluster, frozen, cfg, rng);
                    (ion, mv)
                })
                .collect();

            for (ion, mv) in decided {
                bonded += usize::from(commit(ion, mv, ions, cluster));
            }
        }
    }

    SweepReport {
        bonded,
        free: ions.len(),
    }
}

/// Sweeps until every ion has bonded.
///
/// ### Returns
/// - [`RunOutcome::Done`] once `ions` is empty.
/// - [`RunOutcome::Aborted`] if `cfg.max_sweeps` sweeps ran without emptying
///   `ions`, or if `cluster` has no electrode for the ions to approach.
pub fn run(
    ions: &mut Vec<Ion>,
    cluster: &mut Cluster,
    cfg: &Config,
    rng: &mut impl Rng,
) -> RunOutcome {
    if cluster.is_empty() && !ions.is_empty() {
        warn!("no electrode to aggregate on, {} ions left free", ions.len());
        return RunOutcome::Aborted {
            sweeps: 0,
            free: ions.len(),
        };
    }

    let mut sweeps: u64 = 0;
    while !ions.is_empty() {
        if let Some(max) = cfg.max_sweeps
            && sweeps >= max
        {
            warn!(
                "sweep budget of {max} exhausted with {} ions still free",
                ions.len()
            );
            return RunOutcome::Aborted {
                sweeps,
                free: ions.len(),
            };
        }

        let report = sweep(ions, cluster, cfg, rng);
        sweeps += 1;
        if report.bonded > 0 {
            debug!(
                "sweep {sweeps}: {} bonded, {} free, cluster size {}",
                report.bonded,
                report.free,
                cluster.len()
            );
        }
    }

    RunOutcome::Done { sweeps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn bond_position_snaps_to_bond_length() {
        let parent = DVec3::new(1.0, 1.0, 1.0);
        let ion = DVec3::new(1.0, 2.2, 1.0);

        let at = bond_position(ion, parent, 1.4);
        assert!((at.distance(parent) - 1.4).abs() < 1e-12);
        assert!((at - DVec3::new(1.0, 2.4, 1.0)).length() < 1e-12);
    }

    #[test]
    fn bond_position_keeps_degenerate_position() {
        let p = DVec3::new(0.5, -0.5, 2.0);
        let at = bond_position(p, p, 1.4);
        assert_eq!(at, p);
        assert!(at.is_finite());
    }

    #[test]
    fn random_unit_vector_is_unit_length() {
        let mut rng = rng();
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn full_bias_points_straight_at_target() {
        let mut rng = rng();
        let dir = biased_direction(DVec3::new(5.0, 0.0, 0.0), DVec3::ZERO, 1.0, &mut rng);
        assert!((dir - DVec3::NEG_X).length() < 1e-12);
    }

    #[test]
    fn bias_pulls_towards_target_on_average() {
        let mut rng = rng();
        let ion = DVec3::new(0.0, 0.0, 10.0);
        let mean: DVec3 = (0..2000)
            .map(|_| biased_direction(ion, DVec3::ZERO, 0.3, &mut rng))
            .sum::<DVec3>()
            / 2000.0;

        assert!(mean.z < -0.1, "mean step {mean:?} should point down");
    }

    #[test]
    fn sweep_bonds_ion_within_radius() {
        let cfg = Config::default();
        let mut cluster = Cluster::new(DVec3::ZERO);
        let mut ions = vec![Ion::new(DVec3::new(1.5, 0.0, 0.0))];

        let report = sweep(&mut ions, &mut cluster, &cfg, &mut rng());

        assert_eq!(report, SweepReport { bonded: 1, free: 0 });
        assert!(ions.is_empty());
        assert_eq!(cluster.len(), 2);

        let e = &cluster.electrodes[1];
        assert_eq!(e.parent, Some(0));
        assert_eq!(e.generation, 1);
        assert!((e.pos - DVec3::new(1.4, 0.0, 0.0)).length() < 1e-12);
        assert_eq!(e.history, vec![DVec3::new(1.5, 0.0, 0.0), e.pos]);
    }

    #[test]
    fn sweep_steps_ion_outside_radius() {
        let cfg = Config::default();
        let mut cluster = Cluster::new(DVec3::ZERO);
        let start = DVec3::new(10.0, 0.0, 0.0);
        let mut ions = vec![Ion::new(start)];

        let report = sweep(&mut ions, &mut cluster, &cfg, &mut rng());

        assert_eq!(report, SweepReport { bonded: 0, free: 1 });
        let ion = &ions[0];
        assert!((ion.pos.distance(start) - cfg.step).abs() < 1e-12);
        assert_eq!(ion.history.len(), 2);
        assert_eq!(ion.electrode_distance, 10.0);
    }

    // Two ions on a line: the first bonds to the seed, the second is only
    // within bonding range of the first.
    fn chained_ions() -> Vec<Ion> {
        vec![
            Ion::new(DVec3::new(1.4, 0.0, 0.0)),
            Ion::new(DVec3::new(2.9, 0.0, 0.0)),
        ]
    }

    #[test]
    fn immediate_mode_lets_later_ions_bond_to_fresh_electrodes() {
        let cfg = Config {
            sweep_mode: SweepMode::Immediate,
            ..Config::default()
        };
        let mut cluster = Cluster::new(DVec3::ZERO);
        let mut ions = chained_ions();

        let report = sweep(&mut ions, &mut cluster, &cfg, &mut rng());

        assert_eq!(report.bonded, 2);
        assert_eq!(cluster.electrodes[2].parent, Some(1));
        assert_eq!(cluster.electrodes[2].generation, 2);
    }

    #[test]
    fn snapshot_mode_hides_bonds_made_in_the_same_sweep() {
        let cfg = Config {
            sweep_mode: SweepMode::Snapshot,
            ..Config::default()
        };
        let mut cluster = Cluster::new(DVec3::ZERO);
        let mut ions = chained_ions();

        let report = sweep(&mut ions, &mut cluster, &cfg, &mut rng());

        assert_eq!(report, SweepReport { bonded: 1, free: 1 });
        assert_eq!(cluster.len(), 2);
        assert_eq!(ions[0].history[0], DVec3::new(2.9, 0.0, 0.0));
        assert!((ions[0].electrode_distance - 2.9).abs() < 1e-12);
    }

    #[test]
    fn run_finishes_with_every_ion_bonded() {
        let cfg = Config::default();
        let mut cluster = Cluster::new(DVec3::ZERO);
        let mut ions: Vec<Ion> = [
            DVec3::new(4.0, 0.0, 0.0),
            DVec3::new(0.0, -3.0, 0.0),
            DVec3::new(0.0, 0.0, 5.0),
        ]
        .into_iter()
        .map(Ion::new)
        .collect();

        let outcome = run(&mut ions, &mut cluster, &cfg, &mut rng());

        assert!(outcome.is_done());
        assert!(outcome.sweeps() > 0);
        assert!(ions.is_empty());
        assert_eq!(cluster.len(), 4);
    }

    #[test]
    fn run_reports_abort_when_budget_is_exhausted() {
        let cfg = Config {
            max_sweeps: Some(3),
            ..Config::default()
        };
        let mut cluster = Cluster::new(DVec3::ZERO);
        let mut ions = vec![Ion::new(DVec3::new(100.0, 0.0, 0.0))];

        let outcome = run(&mut ions, &mut cluster, &cfg, &mut rng());

        assert_eq!(outcome, RunOutcome::Aborted { sweeps: 3, free: 1 });
        assert_eq!(ions[0].history.len(), 4);
    }

    #[test]
    fn run_without_electrodes_aborts_immediately() {
        let cfg = Config::default();
        let mut cluster = Cluster {
            electrodes: Vec::new(),
        };
        let mut ions = vec![Ion::new(DVec3::X)];

        let outcome = run(&mut ions, &mut cluster, &cfg, &mut rng());
        assert_eq!(outcome, RunOutcome::Aborted { sweeps: 0, free: 1 });
    }
}
