use glob::Pattern;

/// Criteria for selecting which sheets of a workbook are read.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns; `None` accepts every sheet.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of sheets to read.
    pub sheet_limit: Option<usize>,
}

impl Criteria {
    /// Selects the single sheet whose name is exactly `name`.
    pub fn named(name: &str) -> Self {
        Criteria {
            sheet_name_patterns: Pattern::new(&Pattern::escape(name)).ok().map(|pattern| vec![pattern]),
            sheet_limit: Some(1),
        }
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        match &self.sheet_name_patterns {
            Some(patterns) => patterns.iter().any(|pattern| pattern.matches(sheet_name)),
            None => true,
        }
    }
}
