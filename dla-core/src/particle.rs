//! Particle states.
//!
//! A particle starts as a free [`Ion`] and is promoted exactly once into a
//! bonded [`Electrode`] by [`Ion::promote`]. [`Particle`] is the tagged view
//! over both states used by consumers that do not care which one they hold.

use glam::DVec3;

use crate::types::{ElectrodeId, Generation};

/// A free particle performing a biased random walk.
#[derive(Clone, Debug, PartialEq)]
pub struct Ion {
    pub pos: DVec3,
    /// Every position occupied so far; first entry is the start, last is `pos`.
    pub history: Vec<DVec3>,
    /// Distance to the nearest electrode as of the last sweep.
    pub electrode_distance: f64,
}

/// A particle bonded to the cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct Electrode {
    pub pos: DVec3,
    pub history: Vec<DVec3>,
    pub generation: Generation,
    /// `None` only for the seed electrode.
    pub parent: Option<ElectrodeId>,
    pub children: Vec<ElectrodeId>,
}

impl Ion {
    /// Creates an ion at `pos`.
    ///
    /// The cached electrode distance starts as the distance to the origin,
    /// where the seed electrode sits.
    pub fn new(pos: DVec3) -> Self {
        Self {
            pos,
            history: vec![pos],
            electrode_distance: (-pos).length(),
        }
    }

    /// Moves the ion and records the new position.
    pub fn move_to(&mut self, pos: DVec3) {
        self.pos = pos;
        self.history.push(pos);
    }

    /// Turns this ion into an electrode resting at `final_pos`.
    ///
    /// `final_pos` is appended to the carried-over history.
    pub fn promote(
        self,
        parent: ElectrodeId,
        parent_generation: Generation,
        final_pos: DVec3,
    ) -> Electrode {
        let mut history = self.history;
        history.push(final_pos);
        Electrode {
            pos: final_pos,
            history,
            generation: parent_generation + 1,
            parent: Some(parent),
            children: Vec::new(),
        }
    }
}

impl Electrode {
    pub fn new_seed(pos: DVec3) -> Self {
        Self {
            pos,
            history: vec![pos],
            generation: 0,
            parent: None,
            children: Vec::with_capacity(4),
        }
    }

    pub fn is_seed(&self) -> bool {
        self.parent.is_none()
    }
}

/// Either state of a particle, borrowed from the collection that owns it.
#[derive(Clone, Copy, Debug)]
pub enum Particle<'a> {
    Ion(&'a Ion),
    Electrode(&'a Electrode),
}

impl<'a> Particle<'a> {
    pub fn pos(&self) -> DVec3 {
        match self {
            Particle::Ion(ion) => ion.pos,
            Particle::Electrode(e) => e.pos,
        }
    }

    pub fn history(&self) -> &'a [DVec3] {
        match self {
            Particle::Ion(ion) => &ion.history,
            Particle::Electrode(e) => &e.history,
        }
    }

    /// Generation of a bonded particle, `None` for a free ion.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Particle::Ion(_) => None,
            Particle::Electrode(e) => Some(e.generation),
        }
    }

    pub fn is_ion(&self) -> bool {
        matches!(self, Particle::Ion(_))
    }
}
