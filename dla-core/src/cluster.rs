use crate::particle::{Electrode, Ion};
use crate::types::{ElectrodeId, Generation};
use glam::DVec3;

/// The growing aggregate: every bonded particle, stored as a tree rooted at
/// the seed electrode (id `0`).
///
/// Electrodes are only ever appended, so the first `n` entries of
/// `electrodes` are exactly the cluster as it was when it had `n` members.
#[derive(Debug)]
pub struct Cluster {
    pub electrodes: Vec<Electrode>,
}

impl Cluster {
    pub fn new(seed_pos: DVec3) -> Self {
        Self {
            electrodes: vec![Electrode::new_seed(seed_pos)],
        }
    }

    pub fn len(&self) -> usize {
        self.electrodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.electrodes.is_empty()
    }

    /// The seed electrode, `None` only if `electrodes` was emptied by hand.
    pub fn seed(&self) -> Option<&Electrode> {
        self.electrodes.first()
    }

    /// Bonds `ion` to `parent`, placing it at `final_pos`.
    pub fn attach(&mut self, ion: Ion, parent: ElectrodeId, final_pos: DVec3) -> ElectrodeId {
        let id = self.electrodes.len();
        let generation = self.electrodes[parent].generation;
        self.electrodes.push(ion.promote(parent, generation, final_pos));
        self.electrodes[parent].children.push(id);
        id
    }

    /// Nearest electrode to `pos` and the distance to it.
    pub fn find_nearest(&self, pos: DVec3) -> Option<(ElectrodeId, f64)> {
        self.find_nearest_within(pos, self.electrodes.len())
    }

    /// Nearest electrode among the first `limit` electrodes.
    ///
    /// Ties keep the electrode that bonded first.
    pub fn find_nearest_within(&self, pos: DVec3, limit: usize) -> Option<(ElectrodeId, f64)> {
        let mut best = None;
        let mut best_d2 = f64::INFINITY;
        for (id, e) in self.electrodes.iter().take(limit).enumerate() {
            let d2 = (e.pos - pos).length_squared();
            if d2 < best_d2 {
                best_d2 = d2;
                best = Some(id);
            }
        }
        best.map(|id| (id, best_d2.sqrt()))
    }

    /// Number of parent edges between `id` and the seed.
    pub fn depth(&self, id: ElectrodeId) -> Generation {
        let mut depth = 0;
        let mut cur = id;
        while let Some(parent) = self.electrodes[cur].parent {
            depth += 1;
            cur = parent;
        }
        depth
    }

    pub fn max_generation(&self) -> Generation {
        self.electrodes
            .iter()
            .map(|e| e.generation)
            .max()
            .unwrap_or(0)
    }
}
