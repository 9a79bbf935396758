use crate::Correlation;
use crate::sweep_spec::{AlgorithmSpec, SweepSpec, VariantAxes};

/// One concrete point of the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration<'a> {
    pub algorithm: &'a AlgorithmSpec,
    pub correlation: Correlation,
    pub cardinality: u64,
    pub dimensionality: u32,
    pub variant: VariantParams,
}

/// Algorithm-family specific parameters of a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantParams {
    Exact,
    Approximate { tolerance: f64, error_probability: f64 },
}

impl VariantParams {
    /// Positional parameters appended to the algorithm command line.
    pub fn extra_params(&self) -> Vec<String> {
        match *self {
            VariantParams::Exact => Vec::new(),
            VariantParams::Approximate {
                tolerance,
                error_probability,
            } => vec![tolerance.to_string(), error_probability.to_string()],
        }
    }

    /// `(tolerance, error_probability)`, zero-filled for exact algorithms.
    pub fn report_values(&self) -> (f64, f64) {
        match *self {
            VariantParams::Exact => (0.0, 0.0),
            VariantParams::Approximate {
                tolerance,
                error_probability,
            } => (tolerance, error_probability),
        }
    }
}

impl Configuration<'_> {
    /// A single dimension has no correlation structure to speak of.
    pub fn is_valid(&self) -> bool {
        self.dimensionality != 1 || self.correlation == Correlation::Independent
    }

    pub fn algorithm_name(&self) -> &str {
        &self.algorithm.name
    }
}

impl std::fmt::Display for Configuration<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, n={}, d={}",
            self.algorithm.name, self.correlation, self.cardinality, self.dimensionality
        )?;
        if let VariantParams::Approximate {
            tolerance,
            error_probability,
        } = self.variant
        {
            write!(f, ", t={}, p={}", tolerance, error_probability)?;
        }
        write!(f, ")")
    }
}

/// Lazily enumerate every valid configuration of `spec`, in sweep order.
pub fn configurations(spec: &SweepSpec) -> impl Iterator<Item = Configuration<'_>> + '_ {
    spec.algorithms
        .iter()
        .flat_map(algorithm_configurations)
        .filter(Configuration::is_valid)
}

fn algorithm_configurations(
    algorithm: &AlgorithmSpec,
) -> impl Iterator<Item = Configuration<'_>> + '_ {
    let axes = &algorithm.axes;
    axes.correlation.iter().flat_map(move |&correlation| {
        axes.cardinality.iter().flat_map(move |&cardinality| {
            axes.dimensionality.iter().flat_map(move |&dimensionality| {
                variant_params(&algorithm.variant).map(move |variant| Configuration {
                    algorithm,
                    correlation,
                    cardinality,
                    dimensionality,
                    variant,
                })
            })
        })
    })
}

fn variant_params(variant: &VariantAxes) -> Box<dyn Iterator<Item = VariantParams> + '_> {
    match variant {
        VariantAxes::Exact => Box::new(std::iter::once(VariantParams::Exact)),
        VariantAxes::Approximate {
            tolerance,
            error_probability,
        } => Box::new(tolerance.iter().flat_map(move |&tolerance| {
            error_probability
                .iter()
                .map(move |&error_probability| VariantParams::Approximate {
                    tolerance,
                    error_probability,
                })
        })),
    }
}
