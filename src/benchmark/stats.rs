use crate::RawSample;
use crate::error::{SweepError, SweepResult};

/// Mean and sample standard deviation of both measured quantities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggregatedStats {
    pub time_mean: f64,
    pub time_stdev: f64,
    pub count_mean: f64,
    pub count_stdev: f64,
}

/// Reduce the samples of one configuration.
///
/// Standard deviations are Bessel-corrected and defined as 0 for a single
/// sample. The result does not depend on the order of `samples`.
pub fn aggregate(samples: &[RawSample]) -> SweepResult<AggregatedStats> {
    if samples.is_empty() {
        return Err(SweepError::EmptySample);
    }
    let times: Vec<u64> = samples.iter().map(|s| s.time).collect();
    let counts: Vec<u64> = samples.iter().map(|s| s.comparisons).collect();
    let (time_mean, time_stdev) = mean_stdev(&times);
    let (count_mean, count_stdev) = mean_stdev(&counts);
    Ok(AggregatedStats {
        time_mean,
        time_stdev,
        count_mean,
        count_stdev,
    })
}

/// Uses exact integer sums so that any permutation of `values` yields the
/// same bits; falls back to sorted floating point sums on overflow.
fn mean_stdev(values: &[u64]) -> (f64, f64) {
    let n = values.len() as u128;
    match exact_sums(values) {
        Some((sum, sum_sq)) => {
            let mean = sum as f64 / n as f64;
            if n < 2 {
                return (mean, 0.0);
            }
            // n * sum_sq - sum^2 = n * sum((x - mean)^2) >= 0
            let scaled = n
                .checked_mul(sum_sq)
                .and_then(|a| sum.checked_mul(sum).map(|b| a - b));
            match scaled {
                Some(scaled) => {
                    let variance = scaled as f64 / (n * (n - 1)) as f64;
                    (mean, variance.sqrt())
                }
                None => float_mean_stdev(values),
            }
        }
        None => float_mean_stdev(values),
    }
}

fn exact_sums(values: &[u64]) -> Option<(u128, u128)> {
    let mut sum: u128 = 0;
    let mut sum_sq: u128 = 0;
    for &v in values {
        let v = v as u128;
        sum = sum.checked_add(v)?;
        sum_sq = sum_sq.checked_add(v.checked_mul(v)?)?;
    }
    Some((sum, sum_sq))
}

fn float_mean_stdev(values: &[u64]) -> (f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len() as f64;
    let mean = sorted.iter().map(|&v| v as f64).sum::<f64>() / n;
    if sorted.len() < 2 {
        return (mean, 0.0);
    }
    let squares: f64 = sorted.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
    (mean, (squares / (n - 1.0)).sqrt())
}
