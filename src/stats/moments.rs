//! Skewness and kurtosis on top of polars' [`MomentSeries`], with the
//! conventions of the summary report: too few values gives `None` and a
//! sample without spread gives 0.
//!
//! Polars flags a zero (or float-noise) second moment by returning NaN, so
//! a NaN from a finite sample is read as "no spread".

use anyhow::Result;
use polars::prelude::*;

fn sample(values: &[f64]) -> Option<Series> {
    values
        .iter()
        .all(|v| v.is_finite())
        .then(|| Series::new("sample".into(), values))
}

/// Bias-corrected sample skewness (G1). Needs 3 values.
pub fn skewness(values: &[f64]) -> Result<Option<f64>> {
    let n = values.len();
    let Some(s) = sample(values).filter(|_| n >= 3) else {
        return Ok(None);
    };
    // polars only corrects above three values; correct the biased g1 here
    let g1 = s.skew(true)?;
    Ok(g1.map(|g1| {
        if g1.is_nan() {
            0.0
        } else {
            let n = n as f64;
            (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
        }
    }))
}

/// Bias-corrected excess kurtosis (G2). Needs 4 values.
pub fn kurtosis(values: &[f64]) -> Result<Option<f64>> {
    let Some(s) = sample(values).filter(|_| values.len() >= 4) else {
        return Ok(None);
    };
    let g2 = s.kurtosis(true, false)?;
    Ok(g2.map(|g2| if g2.is_nan() { 0.0 } else { g2 }))
}
