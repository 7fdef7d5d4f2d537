//! Per-step output records
//!
//! Append-only streams: an XYZ trajectory and the energy log for every run,
//! the isosteric-heat and chemical-potential logs for GCMC, and the
//! free-energy log for NVT. Each stream is truncated when the sink is opened
//! and written once per step.

use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::ensemble::EnsembleKind;
use crate::error::{McError, Result};

pub const TRAJECTORY_FILE: &str = "positions.xyz";
pub const ENERGY_FILE: &str = "energies.dat";
pub const QST_FILE: &str = "qsts.dat";
pub const FREE_ENERGY_FILE: &str = "free_energies.dat";
pub const CHEMICAL_POTENTIAL_FILE: &str = "chemical_potentials.dat";

/// Destination for everything a run records per step
pub trait OutputSink {
    /// Append one XYZ frame of the current positions
    fn write_frame(&mut self, positions: &[Vector3<f64>]) -> Result<()>;

    /// Append `<step> <energy>`
    fn write_energy(&mut self, step: u64, energy: f64) -> Result<()>;

    /// Append `<step> <qst>`
    fn write_qst(&mut self, step: u64, qst: f64) -> Result<()>;

    /// Append `<step> <helmholtz>`
    fn write_helmholtz(&mut self, step: u64, helmholtz: f64) -> Result<()>;

    /// Append `<step> <mu>`
    fn write_chemical_potential(&mut self, step: u64, mu: f64) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// A named writer, so I/O errors can say which stream failed
#[derive(Debug)]
struct Stream<W: Write> {
    path: PathBuf,
    writer: W,
}

impl<W: Write> Stream<W> {
    fn new(path: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    fn line(&mut self, step: u64, value: f64) -> Result<()> {
        writeln!(self.writer, "{} {:.6}", step, value).map_err(|e| McError::io(&self.path, e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| McError::io(&self.path, e))
    }
}

/// Text output over any writers
///
/// The ensemble-specific streams are optional; a run only opens the ones its
/// ensemble produces, and writes to a missing stream are dropped.
#[derive(Debug)]
pub struct TextOutput<W: Write> {
    trajectory: Stream<W>,
    energies: Stream<W>,
    qsts: Option<Stream<W>>,
    chemical_potentials: Option<Stream<W>>,
    free_energies: Option<Stream<W>>,
}

pub type FileOutput = TextOutput<BufWriter<File>>;
pub type MemoryOutput = TextOutput<Vec<u8>>;

fn create(dir: &Path, name: &str) -> Result<Stream<BufWriter<File>>> {
    let path = dir.join(name);
    let file = File::create(&path).map_err(|e| McError::io(&path, e))?;
    Ok(Stream::new(path, BufWriter::new(file)))
}

impl FileOutput {
    /// Create (truncating) the output files `ensemble` writes in `dir`
    pub fn create(dir: &Path, ensemble: EnsembleKind) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| McError::io(dir, e))?;
        let gcmc = ensemble == EnsembleKind::Gcmc;
        Ok(Self {
            trajectory: create(dir, TRAJECTORY_FILE)?,
            energies: create(dir, ENERGY_FILE)?,
            qsts: gcmc.then(|| create(dir, QST_FILE)).transpose()?,
            chemical_potentials: gcmc
                .then(|| create(dir, CHEMICAL_POTENTIAL_FILE))
                .transpose()?,
            free_energies: (!gcmc).then(|| create(dir, FREE_ENERGY_FILE)).transpose()?,
        })
    }
}

impl MemoryOutput {
    pub fn new(ensemble: EnsembleKind) -> Self {
        let gcmc = ensemble == EnsembleKind::Gcmc;
        Self {
            trajectory: Stream::new(TRAJECTORY_FILE, Vec::new()),
            energies: Stream::new(ENERGY_FILE, Vec::new()),
            qsts: gcmc.then(|| Stream::new(QST_FILE, Vec::new())),
            chemical_potentials: gcmc.then(|| Stream::new(CHEMICAL_POTENTIAL_FILE, Vec::new())),
            free_energies: (!gcmc).then(|| Stream::new(FREE_ENERGY_FILE, Vec::new())),
        }
    }

    pub fn trajectory(&self) -> String {
        String::from_utf8_lossy(&self.trajectory.writer).into_owned()
    }

    pub fn energies(&self) -> String {
        String::from_utf8_lossy(&self.energies.writer).into_owned()
    }

    pub fn qsts(&self) -> Option<String> {
        self.qsts
            .as_ref()
            .map(|s| String::from_utf8_lossy(&s.writer).into_owned())
    }

    pub fn chemical_potentials(&self) -> Option<String> {
        self.chemical_potentials
            .as_ref()
            .map(|s| String::from_utf8_lossy(&s.writer).into_owned())
    }

    pub fn free_energies(&self) -> Option<String> {
        self.free_energies
            .as_ref()
            .map(|s| String::from_utf8_lossy(&s.writer).into_owned())
    }
}

impl<W: Write> OutputSink for TextOutput<W> {
    fn write_frame(&mut self, positions: &[Vector3<f64>]) -> Result<()> {
        let stream = &mut self.trajectory;
        let mut frame = format!("{}\n\n", positions.len());
        for p in positions {
            frame.push_str(&format!("Ar {:.6} {:.6} {:.6}\n", p.x, p.y, p.z));
        }
        stream
            .writer
            .write_all(frame.as_bytes())
            .map_err(|e| McError::io(&stream.path, e))
    }

    fn write_energy(&mut self, step: u64, energy: f64) -> Result<()> {
        self.energies.line(step, energy)
    }

    fn write_qst(&mut self, step: u64, qst: f64) -> Result<()> {
        match self.qsts.as_mut() {
            Some(stream) => stream.line(step, qst),
            None => Ok(()),
        }
    }

    fn write_helmholtz(&mut self, step: u64, helmholtz: f64) -> Result<()> {
        match self.free_energies.as_mut() {
            Some(stream) => stream.line(step, helmholtz),
            None => Ok(()),
        }
    }

    fn write_chemical_potential(&mut self, step: u64, mu: f64) -> Result<()> {
        match self.chemical_potentials.as_mut() {
            Some(stream) => stream.line(step, mu),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.trajectory.flush()?;
        self.energies.flush()?;
        for stream in [&mut self.qsts, &mut self.chemical_potentials, &mut self.free_energies]
            .into_iter()
            .flatten()
        {
            stream.flush()?;
        }
        Ok(())
    }
}
