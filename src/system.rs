use nalgebra::Vector3;
use rand::Rng;

/// Cubic periodic simulation box
///
/// The cutoff used by both the distance rule and the potential is half the
/// side length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    /// Side length L of the cube
    pub length: f64,
    /// Cutoff radius, L/2
    pub cutoff: f64,
}

impl SimulationBox {
    pub fn new(length: f64) -> Self {
        Self {
            length,
            cutoff: 0.5 * length,
        }
    }

    /// Box volume L³
    pub fn volume(&self) -> f64 {
        self.length * self.length * self.length
    }

    /// Bring every coordinate into [0, L)
    ///
    /// Equivalent to repeatedly adding or subtracting L, so it holds for
    /// displacements of any magnitude.
    pub fn wrap(&self, mut pos: Vector3<f64>) -> Vector3<f64> {
        let l = self.length;
        for k in 0..3 {
            pos[k] -= l * (pos[k] / l).floor();
            // tiny negatives round up to exactly L
            if pos[k] >= l {
                pos[k] -= l;
            }
        }
        pos
    }

    /// Whether a position already satisfies the wrap invariant
    pub fn contains(&self, pos: &Vector3<f64>) -> bool {
        pos.iter().all(|&x| (0.0..self.length).contains(&x))
    }

    /// Half-box periodic distance between two positions
    ///
    /// Per axis, a separation larger than the cutoff is reduced by the cutoff
    /// (half the box length), not by the full box length. This is the
    /// distance rule the potential is defined against; it is not the textbook
    /// minimum image.
    pub fn pairwise_distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        let mut delta2 = 0.0;
        for k in 0..3 {
            let mut delta = (a[k] - b[k]).abs();
            if delta > self.cutoff {
                delta -= self.cutoff;
            }
            delta2 += delta * delta;
        }
        delta2.sqrt()
    }

    /// Uniform random position in [0, L)³
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f64> {
        self.wrap(Vector3::new(
            rng.gen::<f64>() * self.length,
            rng.gen::<f64>() * self.length,
            rng.gen::<f64>() * self.length,
        ))
    }
}

/// Ordered particle set inside a periodic box
///
/// NVT runs keep the length fixed; GCMC runs grow and shrink it through
/// insertion and deletion moves.
#[derive(Debug, Clone)]
pub struct System {
    pub sim_box: SimulationBox,
    pub positions: Vec<Vector3<f64>>,
}

impl System {
    /// Create an empty system
    pub fn empty(box_length: f64) -> Self {
        Self {
            sim_box: SimulationBox::new(box_length),
            positions: Vec::new(),
        }
    }

    /// Create a system from existing positions, wrapping each into the box
    pub fn from_positions(box_length: f64, positions: Vec<Vector3<f64>>) -> Self {
        let sim_box = SimulationBox::new(box_length);
        let positions = positions.into_iter().map(|p| sim_box.wrap(p)).collect();
        Self { sim_box, positions }
    }

    pub fn n_particles(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Box side length L
    pub fn box_length(&self) -> f64 {
        self.sim_box.length
    }

    pub fn volume(&self) -> f64 {
        self.sim_box.volume()
    }

    /// Number density N/V
    pub fn density(&self) -> f64 {
        self.positions.len() as f64 / self.volume()
    }

    /// Check the wrap invariant for every particle
    pub fn all_in_box(&self) -> bool {
        self.positions.iter().all(|p| self.sim_box.contains(p))
    }
}
