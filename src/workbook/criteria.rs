use glob::Pattern;

/// Criteria for choosing which sheets of a workbook to carve.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns; a sheet is processed when it matches any of
    /// them. No patterns means every sheet is processed.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of sheets to process per workbook.
    pub sheet_limit: Option<usize>,
}

impl Criteria {
    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if the name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_patterns_accepts_everything() {
        let criteria = Criteria::default();
        assert!(criteria.accept("A01"));
        assert!(criteria.accept("MACROS"));
    }

    #[test]
    fn prefix_pattern_filters_sheets() {
        let criteria = Criteria {
            sheet_name_patterns: Some(vec![Pattern::new("A*").unwrap()]),
            sheet_limit: None,
        };
        assert!(criteria.accept("A01"));
        assert!(criteria.accept("A19"));
        assert!(!criteria.accept("NOMBRE"));
        assert!(!criteria.accept("control"));
    }
}
