use crate::{HkError, HkResult};

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> HkResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HkError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> HkResult<Real> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(HkError::Domain { what, value: v })
    }
}

/// `n` evenly spaced values from `start` to `end`, both endpoints included.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            let mut out: Vec<Real> = (0..n).map(|i| start + step * i as Real).collect();
            // Pin the last sample so callers can rely on hitting `end` exactly.
            out[n - 1] = end;
            out
        }
    }
}

/// `n` values from `start` to `end` evenly spaced in log10.
///
/// Both bounds must be positive.
pub fn geomspace(start: Real, end: Real, n: usize) -> HkResult<Vec<Real>> {
    ensure_positive(start, "geomspace start")?;
    ensure_positive(end, "geomspace end")?;
    let mut out: Vec<Real> = linspace(start.log10(), end.log10(), n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect();
    if let Some(first) = out.first_mut() {
        *first = start;
    }
    if n > 1 {
        out[n - 1] = end;
    }
    Ok(out)
}
