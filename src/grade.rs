//! grade.rs — Numeric score → letter grade via the configured band table.
//!
//! Boundary rule: lower bound inclusive, upper bound exclusive, final band
//! inclusive of its upper bound, so 20.0 → B and 100.0 → E with the seed
//! bands. The table itself is configuration (`config::GradeBand`), validated
//! here at load time.

use crate::config::GradeBand;
use crate::error::EcoError;

/// Validate a band table: non-empty, starts at 0, ends at 100, contiguous,
/// and strictly increasing. Called from `ScoringConfig::validate`.
pub fn validate_bands(bands: &[GradeBand]) -> Result<(), EcoError> {
    if bands.is_empty() {
        return Err(EcoError::configuration("grade band table must not be empty"));
    }
    if bands[0].min != 0.0 {
        return Err(EcoError::configuration("first grade band must start at 0"));
    }
    if bands[bands.len() - 1].max != 100.0 {
        return Err(EcoError::configuration("last grade band must end at 100"));
    }
    for w in bands.windows(2) {
        if w[0].max != w[1].min {
            return Err(EcoError::configuration(format!(
                "grade bands must be contiguous: {} ends at {} but {} starts at {}",
                w[0].grade.as_str(),
                w[0].max,
                w[1].grade.as_str(),
                w[1].min
            )));
        }
    }
    for b in bands {
        if b.min >= b.max {
            return Err(EcoError::configuration(format!(
                "grade band {} has min {} >= max {}",
                b.grade.as_str(),
                b.min,
                b.max
            )));
        }
    }
    Ok(())
}

/// Classify a numeric score. The caller guarantees a validated table and a
/// score already clamped to [0, 100].
pub fn classify(bands: &[GradeBand], numeric: f64) -> &GradeBand {
    for (i, b) in bands.iter().enumerate() {
        let last = i == bands.len() - 1;
        if numeric >= b.min && (numeric < b.max || (last && numeric <= b.max)) {
            return b;
        }
    }
    // Scores below 0 cannot reach here (clamped); treat as best band.
    &bands[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::model::Grade;

    fn bands() -> Vec<GradeBand> {
        ScoringConfig::default_seed().grades
    }

    #[test]
    fn boundaries_map_to_the_documented_side() {
        let b = bands();
        assert_eq!(classify(&b, 0.0).grade, Grade::A);
        assert_eq!(classify(&b, 19.999).grade, Grade::A);
        assert_eq!(classify(&b, 20.0).grade, Grade::B);
        assert_eq!(classify(&b, 40.0).grade, Grade::C);
        assert_eq!(classify(&b, 60.0).grade, Grade::D);
        assert_eq!(classify(&b, 80.0).grade, Grade::E);
        // Final band includes its upper bound.
        assert_eq!(classify(&b, 100.0).grade, Grade::E);
    }

    #[test]
    fn colors_come_from_the_band_table() {
        let b = bands();
        assert_eq!(classify(&b, 10.0).color, "#1E8449");
        assert_eq!(classify(&b, 95.0).color, "#E74C3C");
    }

    #[test]
    fn non_contiguous_table_rejected() {
        let mut b = bands();
        b[1].min = 25.0;
        assert!(validate_bands(&b).is_err());
    }

    #[test]
    fn table_not_covering_zero_rejected() {
        let mut b = bands();
        b[0].min = 5.0;
        assert!(validate_bands(&b).is_err());
    }

    #[test]
    fn inverted_band_rejected() {
        let mut b = bands();
        b[2].max = b[2].min;
        assert!(validate_bands(&b).is_err());
    }
}
