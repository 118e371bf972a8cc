use dla_core::cluster::Cluster;
use dla_core::engine::{self, RunOutcome};
use dla_core::gyration::radius_of_gyration;
use dla_core::layout::{self, Layout};
use dla_core::particle::Ion;
use dla_core::{Config, SimState, SimulationRun, SweepMode};
use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Run a layout to completion and hand back the finished run.
pub fn finished_run(layout: Layout, atoms: usize, seed: u64, cfg: Config) -> SimulationRun {
    let mut sim = SimulationRun::new(layout, atoms, seed, cfg).expect("valid run");
    let outcome = sim.run();
    assert!(outcome.is_done(), "run did not finish: {outcome:?}");
    sim
}

pub fn snapshot_cfg() -> Config {
    Config {
        sweep_mode: SweepMode::Snapshot,
        ..Config::default()
    }
}

// ==================================================================================
// Engine invariants
// ==================================================================================

#[test]
fn free_ions_never_increase_and_particles_are_conserved() {
    for cfg in [Config::default(), snapshot_cfg()] {
        let atoms = 25;
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut ions: Vec<Ion> = layout::generate(Layout::Sphere, atoms, &mut rng)
            .into_iter()
            .map(Ion::new)
            .collect();
        let mut cluster = Cluster::new(DVec3::ZERO);

        let mut bonding_events = 0;
        let mut free = ions.len();
        while !ions.is_empty() {
            let report = engine::sweep(&mut ions, &mut cluster, &cfg, &mut rng);
            bonding_events += report.bonded;

            assert!(report.free <= free, "free ions went up");
            assert_eq!(report.free + report.bonded, free);
            assert_eq!(ions.len() + cluster.len(), atoms + 1);
            free = report.free;
        }

        assert_eq!(bonding_events, atoms);
    }
}

#[test]
fn generation_is_parent_generation_plus_one() {
    let sim = finished_run(Layout::Cube, 40, 3, Config::default());
    let cluster = sim.cluster();

    assert_eq!(cluster.len(), 41);
    let seed = cluster.seed().expect("seed electrode");
    assert!(seed.is_seed());
    assert_eq!(seed.generation, 0);

    for (id, e) in cluster.electrodes.iter().enumerate().skip(1) {
        let parent = e.parent.expect("only the seed has no parent");
        assert!(parent < id, "parent must have bonded earlier");
        assert_eq!(e.generation, cluster.electrodes[parent].generation + 1);
        assert_eq!(e.generation, cluster.depth(id));
        assert!(cluster.electrodes[parent].children.contains(&id));
    }
}

#[test]
fn bonded_electrodes_rest_at_bond_length_from_parent() {
    for cfg in [Config::default(), snapshot_cfg()] {
        let sim = finished_run(Layout::Random, 30, 8, cfg);
        let cluster = sim.cluster();

        for e in cluster.electrodes.iter().skip(1) {
            let parent = &cluster.electrodes[e.parent.unwrap()];
            let pre_bond = e.history[e.history.len() - 2];
            if pre_bond == parent.pos {
                continue;
            }
            let d = e.pos.distance(parent.pos);
            assert!(
                (d - cfg.bond_length()).abs() < 1e-9,
                "bond length {d} != {}",
                cfg.bond_length()
            );
        }
    }
}

#[test]
fn histories_run_from_start_to_current_position() {
    let sim = finished_run(Layout::Sphere, 15, 21, Config::default());
    let start = sim.snapshot(SimState::Start);
    let finish = sim.snapshot(SimState::Finish);

    for ((p, s), f) in sim.particles().zip(&start).zip(&finish) {
        assert_eq!(p.history().first(), Some(&s.pos));
        assert_eq!(p.history().last(), Some(&f.pos));
    }
}

#[test]
fn same_inputs_reproduce_the_same_cluster() {
    for cfg in [Config::default(), snapshot_cfg()] {
        for layout in Layout::ALL {
            let a = finished_run(layout, 20, 1234, cfg);
            let b = finished_run(layout, 20, 1234, cfg);

            assert_eq!(a.positions(), b.positions());
            assert_eq!(a.sweeps(), b.sweeps());
            assert_eq!(a.snapshot(SimState::Finish), b.snapshot(SimState::Finish));
        }
    }
}

#[test]
fn different_seeds_give_different_clusters() {
    let a = finished_run(Layout::Cube, 20, 1, Config::default());
    let b = finished_run(Layout::Cube, 20, 2, Config::default());
    assert_ne!(a.positions(), b.positions());
}

#[test]
fn sweep_budget_reports_abort() {
    let cfg = Config {
        max_sweeps: Some(2),
        ..Config::default()
    };
    let mut sim = SimulationRun::new(Layout::Sphere, 50, 6, cfg).unwrap();

    match sim.run() {
        RunOutcome::Aborted { sweeps, free } => {
            assert_eq!(sweeps, 2);
            assert!(free > 0);
            assert_eq!(free + sim.cluster().len(), 51);
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert!(sim.gyration_sample().is_none());
}

// ==================================================================================
// Gyration
// ==================================================================================

#[test]
fn gyration_is_non_negative_and_scales() {
    let sim = finished_run(Layout::Cube, 20, 77, Config::default());
    let positions = sim.positions();

    let rg = sim.radius_of_gyration().unwrap();
    assert!(rg >= 0.0);
    assert_eq!(rg, radius_of_gyration(&positions).unwrap());

    let k = 0.25;
    let scaled: Vec<DVec3> = positions.iter().map(|p| *p * k).collect();
    assert!((radius_of_gyration(&scaled).unwrap() - k * rg).abs() < 1e-9);
}

// ==================================================================================
// Scenarios
// ==================================================================================

#[test]
fn single_ion_bonds_directly_to_seed() {
    for layout in Layout::ALL {
        let sim = finished_run(layout, 1, 5, Config::default());
        let cluster = sim.cluster();

        assert_eq!(cluster.len(), 2);
        assert_eq!(cluster.electrodes[1].parent, Some(0));
        assert_eq!(cluster.electrodes[1].generation, 1);
        assert!(sim.ions().is_empty());
    }
}

#[test]
fn cube_layout_for_ten_atoms_pins_one_axis() {
    let sim = SimulationRun::new(Layout::Cube, 10, 31, Config::default()).unwrap();
    let h = 10f64.powf(0.56);
    assert!((h - 3.63).abs() < 0.01);

    let start = sim.snapshot(SimState::Start);
    assert_eq!(start.len(), 11);
    for view in start.iter().skip(1) {
        let coords = view.pos.to_array();
        let pinned = coords.iter().filter(|c| (c.abs() - h).abs() < 1e-12).count();
        assert_eq!(pinned, 1);
        assert!(coords.iter().all(|c| c.abs() <= h + 1e-12));
    }
}

#[test]
fn ion_on_the_seed_bonds_in_place() {
    let mut sim = SimulationRun::with_positions(vec![DVec3::ZERO], 0, Config::default()).unwrap();

    assert_eq!(sim.run(), RunOutcome::Done { sweeps: 1 });

    let e = &sim.cluster().electrodes[1];
    assert_eq!(e.pos, DVec3::ZERO);
    assert!(e.pos.is_finite());
    assert_eq!(e.generation, 1);
    assert_eq!(e.history, vec![DVec3::ZERO, DVec3::ZERO]);
}

#[test]
fn two_particles_two_apart_have_unit_gyration() {
    let rg = radius_of_gyration(&[DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)]).unwrap();
    assert_eq!(rg, 1.0);
}
