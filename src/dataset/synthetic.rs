use super::{DatasetFormat, DatasetGenerator};
use crate::Correlation;
use crate::error::{SweepError, SweepResult};
use crate::rand::{seeded_rng, small_thread_rng};
use rand::Rng;
use rand::rngs::SmallRng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct SyntheticGenerator {
    rng: SmallRng,
    format: DatasetFormat,
    seed: Option<u64>,
}

impl SyntheticGenerator {
    /// With a seed the whole sequence of datasets is reproducible; every
    /// call still produces a new dataset.
    pub fn new(seed: Option<u64>, format: DatasetFormat) -> Self {
        let rng = match seed {
            Some(seed) => seeded_rng(seed),
            None => small_thread_rng(),
        };
        Self { rng, format, seed }
    }

    fn fill_point(&mut self, correlation: Correlation, point: &mut [f64]) {
        match correlation {
            Correlation::Independent => {
                for x in point.iter_mut() {
                    *x = self.rng.random::<f64>();
                }
            }
            Correlation::Correlated => loop {
                let v = random_peak(&mut self.rng, 0.0, 1.0, point.len());
                spread_along_diagonal(&mut self.rng, point, v, |rng, l| {
                    random_normal(rng, 0.0, l)
                });
                if inside_unit_cube(point) {
                    break;
                }
            },
            Correlation::Anticorrelated => loop {
                let v = random_normal(&mut self.rng, 0.5, 0.25);
                spread_along_diagonal(&mut self.rng, point, v, |rng, l| {
                    random_equal(rng, -l, l)
                });
                if inside_unit_cube(point) {
                    break;
                }
            },
        }
    }
}

/// Place the point at `v` on the diagonal, then move mass between
/// neighbouring coordinates by offsets drawn from `offset`.
fn spread_along_diagonal(
    rng: &mut SmallRng,
    point: &mut [f64],
    v: f64,
    offset: impl Fn(&mut SmallRng, f64) -> f64,
) {
    let l = if v <= 0.5 { v } else { 1.0 - v };
    point.fill(v);
    let d = point.len();
    for k in 0..d {
        let h = offset(rng, l);
        point[k] += h;
        point[(k + 1) % d] -= h;
    }
}

fn random_equal(rng: &mut SmallRng, min: f64, max: f64) -> f64 {
    rng.random::<f64>() * (max - min) + min
}

/// Mean of `n` uniform draws, scaled to `[min, max]`.
fn random_peak(rng: &mut SmallRng, min: f64, max: f64, n: usize) -> f64 {
    let n = n.max(1);
    let sum: f64 = (0..n).map(|_| rng.random::<f64>()).sum();
    (sum / n as f64) * (max - min) + min
}

/// Approximately normal around `med`, bounded to `med ± var`.
fn random_normal(rng: &mut SmallRng, med: f64, var: f64) -> f64 {
    random_peak(rng, med - var, med + var, 12)
}

fn inside_unit_cube(point: &[f64]) -> bool {
    point.iter().all(|x| (0.0..=1.0).contains(x))
}

impl DatasetGenerator for SyntheticGenerator {
    fn generate(
        &mut self,
        correlation: Correlation,
        cardinality: u64,
        dimensionality: u32,
        path: &Path,
    ) -> SweepResult<()> {
        if cardinality == 0 || dimensionality == 0 {
            return Err(SweepError::generation(format!(
                "cannot generate {} points with {} dimensions",
                cardinality, dimensionality
            )));
        }

        let mut writer = BufWriter::new(File::create(path)?);
        let mut point = vec![0.0f64; dimensionality as usize];
        for _ in 0..cardinality {
            self.fill_point(correlation, &mut point);
            match self.format {
                DatasetFormat::Binary => {
                    for x in &point {
                        writer.write_all(&x.to_le_bytes())?;
                    }
                }
                DatasetFormat::Text => {
                    let line: Vec<String> = point.iter().map(|x| x.to_string()).collect();
                    writeln!(writer, "{}", line.join(" "))?;
                }
            }
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }

    fn description(&self) -> String {
        match self.seed {
            Some(seed) => format!("built-in generator ({:?}, seed {})", self.format, seed),
            None => format!("built-in generator ({:?})", self.format),
        }
    }
}
