//! Crossover detection between two aligned moving-average series.
//!
//! A crossover at `i` means `short[i] > long[i]` while `short[i - 1] <= long[i - 1]`.
//! Indices where either average is undefined never count.

/// True if a crossover happens at index `i` (`i >= 1`)
pub fn is_crossover_at(short: &[Option<f64>], long: &[Option<f64>], i: usize) -> bool {
    if i == 0 || i >= short.len() || i >= long.len() {
        return false;
    }

    match (short[i - 1], long[i - 1], short[i], long[i]) {
        (Some(prev_short), Some(prev_long), Some(cur_short), Some(cur_long)) => {
            cur_short > cur_long && prev_short <= prev_long
        }
        _ => false,
    }
}

/// All indices at which `short` crosses above `long`
pub fn crossovers(short: &[Option<f64>], long: &[Option<f64>]) -> Vec<usize> {
    let len = short.len().min(long.len());
    (1..len)
        .filter(|&i| is_crossover_at(short, long, i))
        .collect()
}

/// True if a crossover occurs within the last `lookback` indices
pub fn has_crossover_within(short: &[Option<f64>], long: &[Option<f64>], lookback: usize) -> bool {
    let len = short.len().min(long.len());
    let start = len.saturating_sub(lookback).max(1);
    (start..len).any(|i| is_crossover_at(short, long, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::sma_series;

    #[test]
    fn test_no_cross_when_short_stays_below() {
        let short = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let long = vec![Some(5.0), Some(6.0), Some(7.0), Some(8.0)];

        assert!(crossovers(&short, &long).is_empty());
        assert!(!has_crossover_within(&short, &long, 4));
    }

    #[test]
    fn test_single_engineered_cross() {
        // Falling then rising closes: SMA(2) overtakes SMA(4) once
        let closes = vec![10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0, 15.0];
        let short = sma_series(&closes, 2);
        let long = sma_series(&closes, 4);

        // i=5: short 6.5 <= long 7.0; i=6: short 8.0 > long 7.25
        assert_eq!(crossovers(&short, &long), vec![6]);
        assert!(has_crossover_within(&short, &long, 3));
        assert!(!has_crossover_within(&short, &long, 2));
    }

    #[test]
    fn test_equal_then_above_counts() {
        let short = vec![Some(5.0), Some(6.0)];
        let long = vec![Some(5.0), Some(5.5)];
        assert_eq!(crossovers(&short, &long), vec![1]);
    }

    #[test]
    fn test_undefined_values_ignored() {
        let short = vec![None, Some(6.0), Some(7.0)];
        let long = vec![None, None, Some(5.0)];
        assert!(crossovers(&short, &long).is_empty());
    }
}
