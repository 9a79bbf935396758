pub mod command;
pub mod synthetic;

use crate::Correlation;
use crate::error::{SweepError, SweepResult};
use std::fs;
use std::path::Path;

pub use command::CommandGenerator;
pub use synthetic::SyntheticGenerator;

/// Produces a fresh dataset at the exchange location before every trial.
///
/// Implementations must not cache: two calls with identical parameters are
/// expected to produce different random data. The file must be completely
/// written and closed when `generate` returns.
pub trait DatasetGenerator {
    fn generate(
        &mut self,
        correlation: Correlation,
        cardinality: u64,
        dimensionality: u32,
        path: &Path,
    ) -> SweepResult<()>;

    fn description(&self) -> String;
}

/// Encoding of the dataset exchange file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DatasetFormat {
    /// Row-major little-endian `f64`, no header.
    #[default]
    Binary,
    /// One point per line, coordinates separated by whitespace or commas.
    Text,
}

/// Points held in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    dimensionality: usize,
    values: Vec<f64>,
}

impl Dataset {
    pub fn new(dimensionality: usize, values: Vec<f64>) -> SweepResult<Self> {
        if dimensionality == 0 {
            return Err(SweepError::verification("dataset dimensionality must be positive"));
        }
        if values.len() % dimensionality != 0 {
            return Err(SweepError::verification(format!(
                "{} values do not form {}-dimensional points",
                values.len(),
                dimensionality
            )));
        }
        Ok(Self {
            dimensionality,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len() / self.dimensionality
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    pub fn point(&self, index: usize) -> &[f64] {
        let start = index * self.dimensionality;
        &self.values[start..start + self.dimensionality]
    }

    pub fn points(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.dimensionality)
    }

    /// Read an exchange file of `dimensionality`-dimensional points.
    pub fn read(path: &Path, format: DatasetFormat, dimensionality: usize) -> SweepResult<Self> {
        match format {
            DatasetFormat::Binary => {
                let bytes = fs::read(path)?;
                if bytes.len() % 8 != 0 {
                    return Err(SweepError::verification(format!(
                        "{:?}: {} bytes is not a whole number of f64 values",
                        path,
                        bytes.len()
                    )));
                }
                let values = bytes
                    .chunks_exact(8)
                    .map(|chunk| {
                        let mut raw = [0u8; 8];
                        raw.copy_from_slice(chunk);
                        f64::from_le_bytes(raw)
                    })
                    .collect();
                Self::new(dimensionality, values)
            }
            DatasetFormat::Text => {
                let content = fs::read_to_string(path)?;
                let mut values = Vec::new();
                for (line_no, line) in content.lines().enumerate() {
                    let fields: Vec<&str> = split_fields(line).collect();
                    if fields.is_empty() {
                        continue;
                    }
                    if fields.len() != dimensionality {
                        return Err(SweepError::verification(format!(
                            "{:?} line {}: expected {} values, found {}",
                            path,
                            line_no + 1,
                            dimensionality,
                            fields.len()
                        )));
                    }
                    for field in fields {
                        let value = field.parse::<f64>().map_err(|e| {
                            SweepError::verification(format!(
                                "{:?} line {}: bad value '{}': {}",
                                path,
                                line_no + 1,
                                field,
                                e
                            ))
                        })?;
                        values.push(value);
                    }
                }
                Self::new(dimensionality, values)
            }
        }
    }
}

/// Read the 0-based skyline indices an algorithm wrote.
pub fn read_skyline_indices(path: &Path) -> SweepResult<Vec<usize>> {
    let content = fs::read_to_string(path)?;
    split_fields(&content)
        .map(|token| {
            token.parse::<usize>().map_err(|e| {
                SweepError::verification(format!("{:?}: bad skyline index '{}': {}", path, token, e))
            })
        })
        .collect()
}

fn split_fields(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}
