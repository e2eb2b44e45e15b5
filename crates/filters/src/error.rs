use thiserror::Error;

/// Error produced when a rule cannot be compiled into a matcher.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The pattern expanded to an invalid glob expression.
    #[error("failed to compile filter pattern '{pattern}': {source}")]
    Glob {
        /// Pattern text as supplied by the user.
        pattern: String,
        /// Underlying glob compilation failure.
        #[source]
        source: globset::Error,
    },
    /// The pattern contained nothing to match once slashes were removed.
    #[error("filter pattern '{pattern}' does not name anything to match")]
    Empty {
        /// Pattern text as supplied by the user.
        pattern: String,
    },
}

impl FilterError {
    /// Returns the offending pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Glob { pattern, .. } | Self::Empty { pattern } => pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FilterError;
    use globset::GlobBuilder;
    use std::error::Error as _;

    #[test]
    fn filter_error_preserves_pattern_and_source() {
        let glob_err = GlobBuilder::new("[").build().unwrap_err();
        let error = FilterError::Glob {
            pattern: "[".into(),
            source: glob_err.clone(),
        };

        assert_eq!(error.pattern(), "[");
        assert!(error.to_string().contains("failed to compile"));
        assert_eq!(error.source().unwrap().to_string(), glob_err.to_string());
    }

    #[test]
    fn empty_pattern_has_no_source() {
        let error = FilterError::Empty { pattern: "/".into() };
        assert_eq!(error.pattern(), "/");
        assert!(error.source().is_none());
    }
}
