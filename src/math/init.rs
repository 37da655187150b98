use rand::Rng;
use rand_distr::StandardNormal;

/// Standard deviation of freshly initialized weights.
pub const WEIGHT_STD_DEV: f64 = 0.5;

/// Draws `n` independent samples from N(0, `WEIGHT_STD_DEV`).
pub fn normal_weights<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| rng.sample::<f64, _>(StandardNormal) * WEIGHT_STD_DEV)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn same_seed_same_weights() {
        let a = normal_weights(16, &mut StdRng::seed_from_u64(7));
        let b = normal_weights(16, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn sample_statistics_match_distribution() {
        let w = normal_weights(20_000, &mut StdRng::seed_from_u64(42));
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let var = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / w.len() as f64;
        assert!(mean.abs() < 0.02, "mean = {mean}");
        assert!((var.sqrt() - WEIGHT_STD_DEV).abs() < 0.02, "std = {}", var.sqrt());
    }
}
