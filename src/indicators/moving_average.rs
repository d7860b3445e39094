/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Simple Moving Average (SMA) series
///
/// Output has the same length as `values`. Index `i` is `None` for
/// `i < period - 1`, otherwise the mean of `values[i + 1 - period..=i]`.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            Some(window.iter().sum::<f64>() / period as f64)
        })
        .collect()
}

/// Exponential Moving Average (EMA) series
///
/// Seeded with the mean of the first `period` values, then
/// `ema[i] = value * k + ema[i - 1] * (1 - k)` with `k = 2 / (period + 1)`.
///
/// Output has `values.len() - period + 1` elements and is indexed from its
/// own start: `ema[0]` corresponds to `values[period - 1]`. Empty when there
/// are fewer than `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);

    // Start with SMA
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out.push(ema);

    for value in &values[period..] {
        ema = value * k + ema * (1.0 - k);
        out.push(ema);
    }

    out
}
