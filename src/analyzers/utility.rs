/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to `decimals` places, halves going to the even neighbour.
/// Never returns negative zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor + 0.0
}

/// Week-over-week change in percent.
///
/// No previous value gives 0, `0 → 0` gives 0, and a move away from zero
/// (an infinite ratio in either direction) is reported as 100.
pub fn pct_change(prev: Option<f64>, curr: f64) -> f64 {
    let Some(prev) = prev else {
        return 0.0;
    };

    let ratio = (curr - prev) / prev;
    if ratio.is_nan() {
        0.0
    } else if ratio.is_infinite() {
        100.0
    } else {
        ratio * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.444, 2), 4.44);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(-12.6, 0), -13.0);
        assert!(round_to(-0.4, 0).is_sign_positive());
    }

    #[test]
    fn test_pct_change_first_row_is_zero() {
        assert_eq!(pct_change(None, 50.0), 0.0);
    }

    #[test]
    fn test_pct_change_regular() {
        assert_eq!(pct_change(Some(50.0), 75.0), 50.0);
        assert_eq!(pct_change(Some(80.0), 60.0), -25.0);
    }

    #[test]
    fn test_pct_change_from_zero() {
        assert_eq!(pct_change(Some(0.0), 12.0), 100.0);
        assert_eq!(pct_change(Some(0.0), -3.0), 100.0);
        assert_eq!(pct_change(Some(0.0), 0.0), 0.0);
    }
}
