//! Utility functions for CDA
//!
//! Parsing helpers for the state vectors handed over by the perception side.

use crate::error::{CDAError, Result};

/// Parse a comma-separated list of numbers into a state vector.
///
/// Whitespace around entries is ignored, as is a single pair of surrounding
/// brackets so that JSON-style arrays can be pasted directly.
///
/// # Example
/// ```
/// use cda_core::util::parse_state_vector;
///
/// assert_eq!(parse_state_vector("1, 0, 0").unwrap(), vec![1.0, 0.0, 0.0]);
/// assert_eq!(parse_state_vector("[0.5,-2]").unwrap(), vec![0.5, -2.0]);
/// assert!(parse_state_vector("1,,2").is_err());
/// ```
pub fn parse_state_vector(input: &str) -> Result<Vec<f64>> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    if inner.trim().is_empty() {
        return Err(CDAError::InvalidInput("state vector is empty".to_string()));
    }

    inner
        .split(',')
        .enumerate()
        .map(|(i, part)| {
            let part = part.trim();
            part.parse::<f64>().map_err(|e| {
                CDAError::InvalidInput(format!("state component {i} ({part:?}): {e}"))
            })
        })
        .collect()
}

/// Index of the largest-magnitude component, lowest index on ties.
///
/// Returns 0 for an empty or all-zero vector. NaN components never win.
pub fn dominant_index(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_magnitude = 0.0_f64;
    for (i, value) in values.iter().enumerate() {
        let magnitude = value.abs();
        if magnitude > best_magnitude {
            best = i;
            best_magnitude = magnitude;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_vector_plain() {
        assert_eq!(parse_state_vector("1,2,3").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(parse_state_vector(" 0.25 ").unwrap(), vec![0.25]);
    }

    #[test]
    fn test_parse_state_vector_brackets() {
        assert_eq!(parse_state_vector("[1, 0, 0]").unwrap(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_state_vector_errors() {
        assert!(matches!(
            parse_state_vector(""),
            Err(CDAError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_state_vector("[]"),
            Err(CDAError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_state_vector("1,abc"),
            Err(CDAError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_dominant_index() {
        assert_eq!(dominant_index(&[1.0, 0.0, 0.0]), 0);
        assert_eq!(dominant_index(&[0.0, -3.0, 2.0]), 1);
        // Ties go to the lowest index
        assert_eq!(dominant_index(&[0.5, 0.5]), 0);
        assert_eq!(dominant_index(&[0.0, 0.0, 0.0]), 0);
        assert_eq!(dominant_index(&[]), 0);
        assert_eq!(dominant_index(&[f64::NAN, 2.0]), 1);
    }
}
