//! Binomial quantiles for win-rate confidence intervals.

/// Slack for floating-point error accumulated while summing the CDF.
const CDF_TOLERANCE: f64 = 1e-10;

/// Smallest `k` with `P(X <= k) >= q` for `X ~ Binomial(n, p)`.
pub fn binomial_quantile(n: usize, p: f64, q: f64) -> usize {
    if n == 0 || p <= 0.0 || q <= 0.0 {
        return 0;
    }
    if p >= 1.0 || q >= 1.0 {
        return n;
    }

    let ln_success = p.ln();
    let ln_failure = (1.0 - p).ln();
    let n_f = n as f64;

    // ln C(n, k), updated incrementally
    let mut ln_choose = 0.0;
    let mut cdf = 0.0;

    for k in 0..=n {
        if k > 0 {
            ln_choose += (n_f - k as f64 + 1.0).ln() - (k as f64).ln();
        }
        let k_f = k as f64;
        cdf += (ln_choose + k_f * ln_success + (n_f - k_f) * ln_failure).exp();
        if cdf + CDF_TOLERANCE >= q {
            return k;
        }
    }

    n
}

/// Equal-tailed interval of success counts holding `confidence` of the mass.
///
/// Returns `(lower, upper)` as counts; divide by `n` for rate bounds.
pub fn binomial_interval(confidence: f64, n: usize, p: f64) -> (usize, usize) {
    let alpha = (1.0 - confidence) / 2.0;
    (
        binomial_quantile(n, p, alpha),
        binomial_quantile(n, p, 1.0 - alpha),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fair_coin_hundred() {
        assert_eq!(binomial_interval(0.95, 100, 0.5), (40, 60));
    }

    #[test]
    fn test_fair_coin_ten() {
        // P(X <= 1) = 11/1024, P(X <= 2) = 56/1024, P(X <= 7) = 968/1024
        assert_eq!(binomial_interval(0.95, 10, 0.5), (2, 8));
    }

    #[test]
    fn test_median() {
        assert_eq!(binomial_quantile(10, 0.5, 0.5), 5);
        assert_eq!(binomial_quantile(4, 0.5, 0.5), 2);
    }

    #[test]
    fn test_degenerate_probabilities() {
        assert_eq!(binomial_interval(0.95, 20, 0.0), (0, 0));
        assert_eq!(binomial_interval(0.95, 20, 1.0), (20, 20));
    }

    #[test]
    fn test_zero_trials() {
        assert_eq!(binomial_interval(0.95, 0, 0.5), (0, 0));
    }

    #[test]
    fn test_large_n_does_not_underflow() {
        let (lower, upper) = binomial_interval(0.95, 50_000, 0.52);
        assert!(lower < 26_000 && 26_000 < upper);
        assert!(upper - lower < 500);
    }

    #[test]
    fn test_interval_widens_with_confidence() {
        let narrow = binomial_interval(0.5, 200, 0.3);
        let wide = binomial_interval(0.99, 200, 0.3);
        assert!(wide.0 <= narrow.0);
        assert!(wide.1 >= narrow.1);
    }
}
