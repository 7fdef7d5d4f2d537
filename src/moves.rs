//! Elementary Monte Carlo moves and their undo records
//!
//! Every proposal mutates the [`System`] immediately and returns a
//! [`MoveRecord`] carrying enough state to reverse it. The caller either drops
//! the record (commit) or passes it to [`MoveRecord::undo`].

use nalgebra::Vector3;
use rand::Rng;
use std::fmt;

use crate::system::System;

/// The three kinds of trial move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Displacement,
    Insertion,
    Deletion,
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveKind::Displacement => "displacement",
            MoveKind::Insertion => "insertion",
            MoveKind::Deletion => "deletion",
        };
        f.pad(name)
    }
}

/// State needed to exactly reverse the last applied move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveRecord {
    Displacement {
        index: usize,
        old_position: Vector3<f64>,
    },
    Insertion {
        index: usize,
        position: Vector3<f64>,
    },
    Deletion {
        index: usize,
        position: Vector3<f64>,
    },
}

impl MoveRecord {
    pub fn kind(&self) -> MoveKind {
        match self {
            MoveRecord::Displacement { .. } => MoveKind::Displacement,
            MoveRecord::Insertion { .. } => MoveKind::Insertion,
            MoveRecord::Deletion { .. } => MoveKind::Deletion,
        }
    }

    /// Reverse the move on `system`
    ///
    /// A displacement restores the recorded old position, an insertion removes
    /// the inserted particle, and a deletion appends a particle at the removed
    /// position (at the end of the list, not at its old index).
    pub fn undo(self, system: &mut System) {
        match self {
            MoveRecord::Displacement {
                index,
                old_position,
            } => {
                system.positions[index] = old_position;
            }
            MoveRecord::Insertion { index, .. } => {
                system.positions.remove(index);
            }
            MoveRecord::Deletion { position, .. } => {
                system.positions.push(position);
            }
        }
    }
}

/// Map a uniform draw in [0, 3) to a move kind
///
/// An empty system always gets an insertion. Otherwise `choice < 1` displaces,
/// `choice > 2` inserts, and everything in between (both boundaries included)
/// deletes.
pub fn choose_move(n_particles: usize, choice: f64) -> MoveKind {
    if n_particles == 0 {
        MoveKind::Insertion
    } else if choice < 1.0 {
        MoveKind::Displacement
    } else if choice > 2.0 {
        MoveKind::Insertion
    } else {
        MoveKind::Deletion
    }
}

/// Shift particle `index` by `offset` and wrap it back into the box
pub fn displace(system: &mut System, index: usize, offset: Vector3<f64>) -> MoveRecord {
    let old_position = system.positions[index];
    system.positions[index] = system.sim_box.wrap(old_position + offset);
    MoveRecord::Displacement {
        index,
        old_position,
    }
}

/// Append a particle at `position`
pub fn insert(system: &mut System, position: Vector3<f64>) -> MoveRecord {
    system.positions.push(position);
    MoveRecord::Insertion {
        index: system.positions.len() - 1,
        position,
    }
}

/// Remove particle `index`; later particles shift down by one
pub fn delete(system: &mut System, index: usize) -> MoveRecord {
    let position = system.positions.remove(index);
    MoveRecord::Deletion { index, position }
}

/// Offsets uniform in [-L/2, L/2) on each axis
fn random_offset<R: Rng + ?Sized>(rng: &mut R, box_length: f64) -> Vector3<f64> {
    Vector3::new(
        (rng.gen::<f64>() - 0.5) * box_length,
        (rng.gen::<f64>() - 0.5) * box_length,
        (rng.gen::<f64>() - 0.5) * box_length,
    )
}

/// Displace a uniformly chosen particle; `None` for an empty system
pub fn random_displacement<R: Rng + ?Sized>(system: &mut System, rng: &mut R) -> Option<MoveRecord> {
    if system.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..system.n_particles());
    let offset = random_offset(rng, system.box_length());
    Some(displace(system, index, offset))
}

/// Insert a particle at a uniform random position in the box
pub fn random_insertion<R: Rng + ?Sized>(system: &mut System, rng: &mut R) -> MoveRecord {
    let position = system.sim_box.random_position(rng);
    insert(system, position)
}

/// Pick and apply one grand canonical move
///
/// The particle index is drawn before the move kind, so the same index serves
/// a displacement or a deletion.
pub fn propose_gcmc<R: Rng + ?Sized>(system: &mut System, rng: &mut R) -> MoveRecord {
    let n = system.n_particles();
    if n == 0 {
        return random_insertion(system, rng);
    }

    let index = rng.gen_range(0..n);
    let choice = rng.gen::<f64>() * 3.0;
    match choose_move(n, choice) {
        MoveKind::Displacement => {
            let offset = random_offset(rng, system.box_length());
            displace(system, index, offset)
        }
        MoveKind::Insertion => random_insertion(system, rng),
        MoveKind::Deletion => delete(system, index),
    }
}
