//! Step keyword type and parsing utilities.
//!
//! The canonical [`StepKeyword`] enum used by the registry and the execution
//! engine, ensuring consistent keyword handling between registration and
//! runtime matching.

use gherkin::StepType;
use std::fmt;
use std::str::FromStr;

/// Keyword used to categorise a step definition.
///
/// Conjunctions (`And`/`But`) never appear here: the Gherkin parser resolves
/// them against the preceding primary keyword before the engine sees them, so
/// registered definitions only ever use `Given`, `When`, or `Then`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Setup preconditions for a scenario.
    Given,
    /// Perform an action when testing behaviour.
    When,
    /// Assert the expected outcome of a scenario.
    Then,
}

impl StepKeyword {
    /// Return the keyword as a string slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use bdd_harness::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::Given.as_str(), "Given");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StepType> for StepKeyword {
    fn from(ty: StepType) -> Self {
        match ty {
            StepType::Given => Self::Given,
            StepType::When => Self::When,
            StepType::Then => Self::Then,
        }
    }
}

/// Error returned when parsing a [`StepKeyword`] from a string fails.
///
/// Contains the unrecognised keyword text for diagnostic purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepKeywordParseError(pub String);

impl fmt::Display for StepKeywordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step keyword: {}", self.0)
    }
}

impl std::error::Error for StepKeywordParseError {}

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("given") {
            Ok(Self::Given)
        } else if trimmed.eq_ignore_ascii_case("when") {
            Ok(Self::When)
        } else if trimmed.eq_ignore_ascii_case("then") {
            Ok(Self::Then)
        } else {
            Err(StepKeywordParseError(value.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StepType::Given, StepKeyword::Given)]
    #[case(StepType::When, StepKeyword::When)]
    #[case(StepType::Then, StepKeyword::Then)]
    fn converts_from_step_type(#[case] ty: StepType, #[case] expected: StepKeyword) {
        assert_eq!(StepKeyword::from(ty), expected);
    }

    #[rstest]
    #[case("given", StepKeyword::Given)]
    #[case(" WHEN ", StepKeyword::When)]
    #[case("Then", StepKeyword::Then)]
    fn parses_case_insensitively(#[case] input: &str, #[case] expected: StepKeyword) {
        assert_eq!(input.parse::<StepKeyword>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_keyword() {
        let err = "Whenever".parse::<StepKeyword>();
        assert_eq!(err, Err(StepKeywordParseError("Whenever".into())));
    }
}
