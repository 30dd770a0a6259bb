//! Population moments shared by the agreement and distribution analyzers.

/// Arithmetic mean, or 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by `n`), or 0 for an empty slice.
pub fn population_variance(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    squared / values.len() as f64
}
