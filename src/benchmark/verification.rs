use crate::configuration::{Configuration, VariantParams};
use crate::dataset::{Dataset, DatasetFormat, read_skyline_indices};
use crate::error::{SweepError, SweepResult};
use std::collections::BTreeSet;
use std::path::Path;

pub trait OutputVerifier {
    fn verify(&self, config: &Configuration, dataset: &Path, skyline: &Path) -> SweepResult<()>;
}

/// Checks that an exact algorithm's skyline file lists exactly the
/// non-dominated points of the dataset (larger is better on every axis).
///
/// Approximate algorithms may legitimately miss points, so their output is
/// not checked.
pub struct ExactSkylineVerifier {
    pub format: DatasetFormat,
}

impl ExactSkylineVerifier {
    pub fn new(format: DatasetFormat) -> Self {
        Self { format }
    }
}

impl OutputVerifier for ExactSkylineVerifier {
    fn verify(&self, config: &Configuration, dataset: &Path, skyline: &Path) -> SweepResult<()> {
        if let VariantParams::Approximate { .. } = config.variant {
            tracing::warn!("{}: approximate output is not verified", config);
            return Ok(());
        }

        let data = Dataset::read(dataset, self.format, config.dimensionality as usize)?;
        if data.len() as u64 != config.cardinality {
            return Err(SweepError::verification(format!(
                "dataset holds {} points, expected {}",
                data.len(),
                config.cardinality
            )));
        }

        let reported = read_skyline_indices(skyline)?;
        if let Some(bad) = reported.iter().find(|&&i| i >= data.len()) {
            return Err(SweepError::verification(format!(
                "skyline index {} out of range for {} points",
                bad,
                data.len()
            )));
        }
        let reported: BTreeSet<usize> = reported.into_iter().collect();
        let expected: BTreeSet<usize> = skyline_indices(&data).into_iter().collect();

        if reported != expected {
            let missing: Vec<_> = expected.difference(&reported).take(5).collect();
            let extra: Vec<_> = reported.difference(&expected).take(5).collect();
            return Err(SweepError::verification(format!(
                "{}: skyline has {} points, expected {} (missing {:?}, unexpected {:?})",
                config,
                reported.len(),
                expected.len(),
                missing,
                extra
            )));
        }

        tracing::debug!("{}: verified skyline of {} points", config, expected.len());
        Ok(())
    }
}

/// `q` dominates `p` when it is at least as large everywhere and strictly
/// larger somewhere.
pub fn dominates(q: &[f64], p: &[f64]) -> bool {
    let mut strictly = false;
    for (a, b) in q.iter().zip(p) {
        if a < b {
            return false;
        }
        if a > b {
            strictly = true;
        }
    }
    strictly
}

/// Sort-filter skyline. Points are visited by descending coordinate sum,
/// ties broken by descending lexicographic order, so a dominating point is
/// always visited before the points it dominates and each point only has to
/// be compared against the skyline found so far.
pub fn skyline_indices(dataset: &Dataset) -> Vec<usize> {
    let mut order: Vec<(f64, usize)> = dataset
        .points()
        .enumerate()
        .map(|(i, p)| (p.iter().sum::<f64>(), i))
        .collect();
    order.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| lexicographic(dataset.point(b.1), dataset.point(a.1)))
            .then(a.1.cmp(&b.1))
    });

    let mut skyline: Vec<usize> = Vec::new();
    for (_, i) in order {
        let p = dataset.point(i);
        if !skyline.iter().any(|&s| dominates(dataset.point(s), p)) {
            skyline.push(i);
        }
    }
    skyline.sort_unstable();
    skyline
}

fn lexicographic(x: &[f64], y: &[f64]) -> std::cmp::Ordering {
    x.iter()
        .zip(y)
        .map(|(a, b)| a.total_cmp(b))
        .find(|o| o.is_ne())
        .unwrap_or(std::cmp::Ordering::Equal)
}
