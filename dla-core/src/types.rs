/// Identifier for an electrode in a [`crate::cluster::Cluster`].
///
/// This is an index into `Cluster::electrodes`, and is only meaningful within
/// the lifetime of a given `Cluster` instance. Electrodes are never removed,
/// so an id stays valid once issued.
pub type ElectrodeId = usize;

/// Tree depth of an electrode below the seed (the seed itself is `0`).
pub type Generation = u32;
