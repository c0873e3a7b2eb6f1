//! Distribution sampling.
//!
//! Draws sample vectors from the model's prior distributions. Sampling never
//! fails: invalid parameters are clamped to safe substitutes, bounded
//! rejection samplers fall back to the analytic mean when their iteration
//! budget is exhausted, and non-finite draws are replaced by the mean. The
//! returned vector is always length `n` and fully finite.

use tracing::warn;

use cascade_foundation::RngStream;
use cascade_model::Distribution;

/// Iteration budget for the Beta and Gamma rejection samplers.
const MAX_REJECTION_ITERATIONS: usize = 100;

/// Smallest standard deviation substituted for non-positive ones.
const MIN_STD_DEV: f64 = 0.01;
/// Smallest shape parameter substituted for non-positive ones.
const MIN_SHAPE: f64 = 0.1;
/// Smallest Poisson rate substituted for non-positive ones.
const MIN_LAMBDA: f64 = 0.01;

/// Draw `n` i.i.d. samples from `dist`.
pub fn sample_distribution(dist: &Distribution, n: usize, rng: &mut RngStream) -> Vec<f64> {
    let analytic_mean = dist.mean();
    let fallback = if analytic_mean.is_finite() { analytic_mean } else { 0.0 };

    let mut samples = match dist {
        Distribution::Binary { p } => {
            let p = sanitize_probability(*p);
            (0..n).map(|_| if rng.uniform() < p { 1.0 } else { 0.0 }).collect()
        }
        Distribution::Categorical { probs } => {
            if probs.is_empty() {
                vec![0.0; n]
            } else {
                let weights: Vec<f64> =
                    probs.iter().map(|&p| if p.is_finite() && p > 0.0 { p } else { 0.0 }).collect();
                (0..n).map(|_| rng.weighted_choice(&weights) as f64).collect()
            }
        }
        Distribution::Normal { mean, std_dev } => {
            let sd = sanitize_std_dev(*std_dev, "normal");
            (0..n).map(|_| rng.normal_with(*mean, sd)).collect()
        }
        Distribution::Lognormal { mu, sigma } => {
            let sd = sanitize_std_dev(*sigma, "lognormal");
            (0..n).map(|_| rng.normal_with(*mu, sd).exp()).collect()
        }
        Distribution::Beta { alpha, beta } | Distribution::Rate { alpha, beta } => {
            let (a, b) = sanitize_shape_pair(*alpha, *beta);
            (0..n).map(|_| sample_beta(a, b, rng).unwrap_or(fallback)).collect()
        }
        Distribution::Gamma { shape, rate } => {
            let (shape, rate) = sanitize_shape_pair(*shape, *rate);
            (0..n)
                .map(|_| sample_gamma(shape, rng).map(|g| g / rate).unwrap_or(fallback))
                .collect()
        }
        Distribution::Bounded { min, max, mode } => sample_pert(*min, *max, *mode, n, rng),
        Distribution::Count { lambda } => {
            let lambda = if *lambda >= MIN_LAMBDA {
                *lambda
            } else {
                warn!(lambda, "non-positive poisson rate clamped");
                MIN_LAMBDA
            };
            (0..n).map(|_| sample_poisson(lambda, rng)).collect()
        }
    };

    for v in &mut samples {
        if !v.is_finite() {
            *v = fallback;
        }
    }
    samples
}

fn sanitize_probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        warn!(p, "non-finite probability clamped to 0.5");
        0.5
    }
}

fn sanitize_std_dev(std_dev: f64, variant: &str) -> f64 {
    if std_dev >= MIN_STD_DEV {
        std_dev
    } else {
        warn!(std_dev, variant, "non-positive standard deviation clamped");
        MIN_STD_DEV
    }
}

fn sanitize_shape_pair(a: f64, b: f64) -> (f64, f64) {
    let sa = if a >= MIN_SHAPE { a } else { MIN_SHAPE };
    let sb = if b >= MIN_SHAPE { b } else { MIN_SHAPE };
    if sa != a || sb != b {
        warn!(a, b, "non-positive shape parameters clamped");
    }
    (sa, sb)
}

/// Unnormalized Beta density; the normalizing constant cancels in rejection.
fn beta_density(x: f64, alpha: f64, beta: f64) -> f64 {
    x.powf(alpha - 1.0) * (1.0 - x).powf(beta - 1.0)
}

/// Draw from Beta(alpha, beta).
///
/// Interior-mode shapes use rejection against the density peak; small shapes
/// use Johnk's algorithm. Both give up after a bounded number of iterations.
fn sample_beta(alpha: f64, beta: f64, rng: &mut RngStream) -> Option<f64> {
    if alpha > 1.0 && beta > 1.0 {
        let mode = (alpha - 1.0) / (alpha + beta - 2.0);
        let peak = beta_density(mode, alpha, beta);
        if !(peak > 0.0) || !peak.is_finite() {
            return None;
        }
        for _ in 0..MAX_REJECTION_ITERATIONS {
            let x = rng.uniform();
            if rng.uniform() * peak <= beta_density(x, alpha, beta) {
                return Some(x);
            }
        }
        None
    } else {
        for _ in 0..MAX_REJECTION_ITERATIONS {
            let x = rng.uniform().powf(1.0 / alpha);
            let y = rng.uniform().powf(1.0 / beta);
            let sum = x + y;
            if sum > 0.0 && sum <= 1.0 {
                return Some(x / sum);
            }
        }
        None
    }
}

/// Draw from Gamma(shape, 1).
///
/// Marsaglia-Tsang for shape >= 1; smaller shapes draw at shape + 1 and
/// scale by U^(1/shape).
fn sample_gamma(shape: f64, rng: &mut RngStream) -> Option<f64> {
    if shape >= 1.0 {
        marsaglia_tsang(shape, rng)
    } else {
        let boosted = marsaglia_tsang(shape + 1.0, rng)?;
        let u = rng.uniform();
        let u = if u == 0.0 { f64::MIN_POSITIVE } else { u };
        Some(boosted * u.powf(1.0 / shape))
    }
}

fn marsaglia_tsang(shape: f64, rng: &mut RngStream) -> Option<f64> {
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    for _ in 0..MAX_REJECTION_ITERATIONS {
        let x = rng.normal();
        let v = (1.0 + c * x).powi(3);
        if v <= 0.0 {
            continue;
        }
        let u = rng.uniform();
        if u < 1.0 - 0.0331 * x.powi(4) {
            return Some(d * v);
        }
        if u > 0.0 && u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return Some(d * v);
        }
    }
    None
}

/// Draw `n` samples from a bounded PERT distribution by reparameterizing as
/// a Beta on [0, 1] and scaling back to [min, max].
fn sample_pert(min: f64, max: f64, mode: f64, n: usize, rng: &mut RngStream) -> Vec<f64> {
    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        warn!(min, max, "degenerate bounded interval, emitting constant");
        return vec![min; n];
    }

    let mode = if mode.is_finite() {
        mode.clamp(min, max)
    } else {
        warn!(mode, "non-finite mode replaced by interval midpoint");
        min + range / 2.0
    };

    let mean = (min + 4.0 * mode + max) / 6.0;
    let alpha = (1.0 + 4.0 * (mean - min) / range).max(MIN_SHAPE);
    let beta = (1.0 + 4.0 * (max - mean) / range).max(MIN_SHAPE);
    // Fallback in unit space maps back to the analytic mean
    let unit_fallback = (mean - min) / range;

    (0..n)
        .map(|_| min + sample_beta(alpha, beta, rng).unwrap_or(unit_fallback) * range)
        .collect()
}

/// Draw from Poisson(lambda): Knuth's product-of-uniforms for small rates,
/// rounded normal approximation for large ones.
fn sample_poisson(lambda: f64, rng: &mut RngStream) -> f64 {
    if lambda < 30.0 {
        let limit = (-lambda).exp();
        let mut k = 0u32;
        let mut product = 1.0;
        loop {
            k += 1;
            product *= rng.uniform();
            if product <= limit || k > 1000 {
                break;
            }
        }
        (k - 1) as f64
    } else {
        rng.normal_with(lambda, lambda.sqrt()).round().max(0.0)
    }
}
