//! Two-sample statistics used to judge per-column drift.
//!
//! All functions expect non-empty inputs with missing values already removed.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Frequencies below this are clamped before taking logarithms in PSI
const PSI_FLOOR: f64 = 0.0001;

/// Lower bound on the reference standard deviation used to norm Wasserstein distance
const WASSERSTEIN_MIN_STD: f64 = 0.001;

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Kolmogorov-Smirnov statistic: largest gap between the two empirical CDFs
pub fn ks_statistic(reference: &[f64], current: &[f64]) -> f64 {
    let a = sorted(reference);
    let b = sorted(current);
    let (na, nb) = (a.len() as f64, b.len() as f64);

    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / na - j as f64 / nb).abs());
    }
    d
}

/// Survival function of the Kolmogorov distribution, Q(lambda)
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda < 0.2 {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    let a2 = -2.0 * lambda * lambda;
    for k in 1..=100 {
        let k = k as f64;
        let term = 2.0 * sign * (a2 * k * k).exp();
        sum += term;
        if term.abs() <= 1e-10 * sum.abs() || term.abs() <= 1e-16 {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
    }
    // No convergence: distributions are indistinguishable at this size
    1.0
}

/// Two-sided two-sample KS p-value (asymptotic, with small-sample correction)
pub fn ks_p_value(reference: &[f64], current: &[f64]) -> f64 {
    let d = ks_statistic(reference, current);
    let (n1, n2) = (reference.len() as f64, current.len() as f64);
    let en = (n1 * n2 / (n1 + n2)).sqrt();
    kolmogorov_survival((en + 0.12 + 0.11 / en) * d)
}

/// First Wasserstein distance between the two empirical distributions
pub fn wasserstein_distance(reference: &[f64], current: &[f64]) -> f64 {
    let u = sorted(reference);
    let v = sorted(current);
    let (nu, nv) = (u.len() as f64, v.len() as f64);

    let mut all: Vec<f64> = u.iter().chain(v.iter()).copied().collect();
    all.sort_by(f64::total_cmp);

    let (mut i, mut j) = (0, 0);
    let mut distance = 0.0;
    for pair in all.windows(2) {
        let x = pair[0];
        while i < u.len() && u[i] <= x {
            i += 1;
        }
        while j < v.len() && v[j] <= x {
            j += 1;
        }
        distance += (i as f64 / nu - j as f64 / nv).abs() * (pair[1] - pair[0]);
    }
    distance
}

/// Wasserstein distance in units of the reference standard deviation
pub fn wasserstein_normed(reference: &[f64], current: &[f64]) -> f64 {
    let std = reference.iter().population_std_dev();
    let norm = if std.is_finite() {
        std.max(WASSERSTEIN_MIN_STD)
    } else {
        WASSERSTEIN_MIN_STD
    };
    wasserstein_distance(reference, current) / norm
}

fn category_counts<'a>(
    reference: &'a [String],
    current: &'a [String],
) -> BTreeMap<&'a str, (usize, usize)> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for value in reference {
        counts.entry(value.as_str()).or_default().0 += 1;
    }
    for value in current {
        counts.entry(value.as_str()).or_default().1 += 1;
    }
    counts
}

/// Pearson chi-square goodness-of-fit p-value of current counts against
/// reference proportions scaled to the current sample size
pub fn chi_square_p_value(reference: &[String], current: &[String]) -> Result<f64, String> {
    let counts = category_counts(reference, current);
    if counts.len() < 2 {
        return Ok(1.0);
    }

    let k_norm = current.len() as f64 / reference.len() as f64;
    let mut statistic = 0.0;
    for &(ref_count, cur_count) in counts.values() {
        let expected = ref_count as f64 * k_norm;
        if expected == 0.0 {
            // Category never seen in the reference slice
            return Ok(0.0);
        }
        let observed = cur_count as f64;
        statistic += (observed - expected).powi(2) / expected;
    }

    let dof = (counts.len() - 1) as f64;
    let distribution = ChiSquared::new(dof).map_err(|e| e.to_string())?;
    Ok(distribution.sf(statistic))
}

/// Two-proportion Z-test p-value for binary categories.
///
/// Compares the share of the lexicographically smallest reference category.
pub fn z_test_p_value(reference: &[String], current: &[String]) -> Result<f64, String> {
    let Some(category) = reference.iter().min() else {
        return Err("reference sample is empty".to_string());
    };

    let c1 = reference.iter().filter(|v| *v == category).count() as f64;
    let c2 = current.iter().filter(|v| *v == category).count() as f64;
    let (n1, n2) = (reference.len() as f64, current.len() as f64);

    let pooled = (c1 + c2) / (n1 + n2);
    if pooled <= 0.0 || pooled >= 1.0 {
        return Ok(1.0);
    }

    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    let z = (c1 / n1 - c2 / n2) / se;

    let normal = Normal::new(0.0, 1.0).map_err(|e| e.to_string())?;
    Ok((2.0 * normal.sf(z.abs())).min(1.0))
}

/// Relative frequencies of each category in the union, sorted by label
pub fn categorical_frequencies(reference: &[String], current: &[String]) -> (Vec<f64>, Vec<f64>) {
    let counts = category_counts(reference, current);
    let (n1, n2) = (reference.len() as f64, current.len() as f64);
    counts
        .values()
        .map(|&(r, c)| (r as f64 / n1, c as f64 / n2))
        .unzip()
}

/// Relative frequencies over equal-width Sturges bins spanning both samples
pub fn numerical_frequencies(reference: &[f64], current: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let (min, max) = reference
        .iter()
        .chain(current.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });

    let n = (reference.len() + current.len()) as f64;
    let bins = if max > min {
        (n.log2() + 1.0).ceil().max(1.0) as usize
    } else {
        1
    };
    let width = (max - min) / bins as f64;

    let histogram = |values: &[f64]| {
        let mut counts = vec![0.0; bins];
        for &x in values {
            let idx = if width > 0.0 {
                (((x - min) / width).floor() as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1.0;
        }
        let total = values.len() as f64;
        counts.iter_mut().for_each(|c| *c /= total);
        counts
    };

    (histogram(reference), histogram(current))
}

/// Jensen-Shannon distance (square root of the divergence, natural log)
pub fn jensen_shannon_distance(p: &[f64], q: &[f64]) -> f64 {
    let kl = |a: f64, m: f64| if a > 0.0 { a * (a / m).ln() } else { 0.0 };

    let divergence: f64 = p
        .iter()
        .zip(q.iter())
        .map(|(&a, &b)| {
            let m = (a + b) / 2.0;
            0.5 * kl(a, m) + 0.5 * kl(b, m)
        })
        .sum();

    divergence.max(0.0).sqrt()
}

/// Population stability index between reference and current frequencies
pub fn population_stability_index(reference: &[f64], current: &[f64]) -> f64 {
    reference
        .iter()
        .zip(current.iter())
        .map(|(&r, &c)| {
            let r = if r == 0.0 { PSI_FLOOR } else { r };
            let c = if c == 0.0 { PSI_FLOOR } else { c };
            (c - r) * (c / r).ln()
        })
        .sum()
}
