//! Training capability shared by model trainers.

use crate::error::RestoreResult;

/// Populates a machine `M` from a training set `D`.
///
/// Trainers hold configuration only; everything learned is written into the
/// machine, and training the same machine again overwrites it completely.
pub trait Trainer<M, D: ?Sized> {
    /// Train `machine` on `data`.
    fn train(&self, machine: &mut M, data: &D) -> RestoreResult<()>;
}
