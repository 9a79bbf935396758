use crate::Correlation;
use crate::error::{SweepError, SweepResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Run count used when neither the sweep file nor the operator sets one.
pub const DEFAULT_RUNS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct SweepSpec {
    /// Sweep-wide trial count from the file, if declared.
    pub runs: Option<usize>,
    /// Algorithms in declaration order.
    pub algorithms: Vec<AlgorithmSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSpec {
    pub name: String,
    pub program: PathBuf,
    /// Arguments placed before the dataset path (interpreter scripts etc).
    pub args: Vec<String>,
    /// Pass `<cardinality> <dimensionality>` after the two file paths.
    pub shape_args: bool,
    pub axes: BaseAxes,
    pub variant: VariantAxes,
}

/// Axes every algorithm is swept over.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseAxes {
    pub correlation: Vec<Correlation>,
    pub cardinality: Vec<u64>,
    pub dimensionality: Vec<u32>,
}

/// Axes that only exist for some algorithm families.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantAxes {
    Exact,
    Approximate {
        tolerance: Vec<f64>,
        error_probability: Vec<f64>,
    },
}

impl AlgorithmSpec {
    pub fn is_approximate(&self) -> bool {
        matches!(self.variant, VariantAxes::Approximate { .. })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SweepFile {
    runs: Option<usize>,
    #[serde(default, rename = "algorithm")]
    algorithms: Vec<AlgorithmEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AlgorithmEntry {
    name: String,
    program: PathBuf,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    shape_args: bool,
    correlation: Vec<Correlation>,
    cardinality: Vec<u64>,
    dimensionality: Vec<u32>,
    tolerance: Option<Vec<f64>>,
    error_probability: Option<Vec<f64>>,
}

impl SweepSpec {
    /// Load and validate a sweep file.
    pub fn load(path: &Path) -> SweepResult<Self> {
        let content = fs::read_to_string(path)?;
        let file: SweepFile = toml::from_str(&content).map_err(|source| SweepError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_file(file)
    }

    /// Parse and validate sweep TOML held in memory.
    pub fn from_toml_str(content: &str) -> SweepResult<Self> {
        let file: SweepFile = toml::from_str(content).map_err(|source| SweepError::Toml {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::from_file(file)
    }

    /// Build a spec from already-typed algorithms, checking the same
    /// invariants as the file loader.
    pub fn new(runs: Option<usize>, algorithms: Vec<AlgorithmSpec>) -> SweepResult<Self> {
        let spec = Self { runs, algorithms };
        spec.validate()?;
        Ok(spec)
    }

    fn from_file(file: SweepFile) -> SweepResult<Self> {
        let algorithms = file
            .algorithms
            .into_iter()
            .map(AlgorithmSpec::try_from)
            .collect::<SweepResult<Vec<_>>>()?;
        Self::new(file.runs, algorithms)
    }

    fn validate(&self) -> SweepResult<()> {
        if self.runs == Some(0) {
            return Err(SweepError::spec("runs must be at least 1"));
        }
        if self.algorithms.is_empty() {
            return Err(SweepError::spec("no algorithms declared"));
        }
        let mut seen = HashSet::new();
        for algorithm in &self.algorithms {
            if !seen.insert(algorithm.name.as_str()) {
                return Err(SweepError::spec(format!(
                    "algorithm '{}' declared more than once",
                    algorithm.name
                )));
            }
            algorithm.validate()?;
        }
        Ok(())
    }

    pub fn algorithm(&self, name: &str) -> Option<&AlgorithmSpec> {
        self.algorithms.iter().find(|a| a.name == name)
    }

    /// Keep only the named algorithms, preserving declaration order.
    pub fn select(&self, names: &[String]) -> SweepResult<SweepSpec> {
        for name in names {
            if self.algorithm(name).is_none() {
                return Err(SweepError::spec(format!("unknown algorithm '{}'", name)));
            }
        }
        let algorithms = self
            .algorithms
            .iter()
            .filter(|a| names.iter().any(|n| n == &a.name))
            .cloned()
            .collect();
        Ok(SweepSpec {
            runs: self.runs,
            algorithms,
        })
    }
}

impl AlgorithmSpec {
    fn validate(&self) -> SweepResult<()> {
        let fail = |msg: String| Err(SweepError::spec(format!("algorithm '{}': {}", self.name, msg)));

        if self.name.trim().is_empty() {
            return Err(SweepError::spec("algorithm name must not be empty"));
        }
        if self.program.as_os_str().is_empty() {
            return fail("program must not be empty".to_string());
        }
        if self.axes.correlation.is_empty() {
            return fail("correlation axis is empty".to_string());
        }
        if self.axes.cardinality.is_empty() {
            return fail("cardinality axis is empty".to_string());
        }
        if self.axes.dimensionality.is_empty() {
            return fail("dimensionality axis is empty".to_string());
        }
        if self.axes.cardinality.contains(&0) {
            return fail("cardinality values must be positive".to_string());
        }
        if self.axes.dimensionality.contains(&0) {
            return fail("dimensionality values must be positive".to_string());
        }
        if let Some(c) = first_duplicate(&self.axes.correlation, |c| *c) {
            return fail(format!("correlation axis has duplicate value {}", c));
        }
        if let Some(n) = first_duplicate(&self.axes.cardinality, |n| *n) {
            return fail(format!("cardinality axis has duplicate value {}", n));
        }
        if let Some(d) = first_duplicate(&self.axes.dimensionality, |d| *d) {
            return fail(format!("dimensionality axis has duplicate value {}", d));
        }
        if let VariantAxes::Approximate {
            tolerance,
            error_probability,
        } = &self.variant
        {
            if tolerance.is_empty() {
                return fail("tolerance axis is empty".to_string());
            }
            if error_probability.is_empty() {
                return fail("error_probability axis is empty".to_string());
            }
            if let Some(t) = tolerance.iter().find(|t| !unit_interval(**t)) {
                return fail(format!("tolerance {} is outside (0, 1]", t));
            }
            if let Some(p) = error_probability.iter().find(|p| !unit_interval(**p)) {
                return fail(format!("error_probability {} is outside (0, 1]", p));
            }
            if let Some(t) = first_duplicate(tolerance, |t| t.to_bits()) {
                return fail(format!("tolerance axis has duplicate value {}", t));
            }
            if let Some(p) = first_duplicate(error_probability, |p| p.to_bits()) {
                return fail(format!("error_probability axis has duplicate value {}", p));
            }
        }
        Ok(())
    }
}

/// First value whose key was already seen earlier in the axis.
fn first_duplicate<T, K, F>(values: &[T], key: F) -> Option<&T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    values.iter().find(|v| !seen.insert(key(*v)))
}

fn unit_interval(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

impl TryFrom<AlgorithmEntry> for AlgorithmSpec {
    type Error = SweepError;

    fn try_from(entry: AlgorithmEntry) -> SweepResult<Self> {
        let variant = match (entry.tolerance, entry.error_probability) {
            (None, None) => VariantAxes::Exact,
            (Some(tolerance), Some(error_probability)) => VariantAxes::Approximate {
                tolerance,
                error_probability,
            },
            _ => {
                return Err(SweepError::spec(format!(
                    "algorithm '{}': tolerance and error_probability must be declared together",
                    entry.name
                )));
            }
        };
        Ok(AlgorithmSpec {
            name: entry.name,
            program: entry.program,
            args: entry.args,
            shape_args: entry.shape_args,
            axes: BaseAxes {
                correlation: entry.correlation,
                cardinality: entry.cardinality,
                dimensionality: entry.dimensionality,
            },
            variant,
        })
    }
}
