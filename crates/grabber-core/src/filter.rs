//! Version range filtering.
//!
//! Constraints are `||` separated alternatives of comma separated clauses. A clause is a
//! comparator understood by [`VersionReq`], an exclusion `!=X`, or a hyphen range `A - B`.

use miette::Diagnostic;
use semver::{Version, VersionReq};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Invalid version constraint `{constraint}`: {source}")]
    #[diagnostic(
        code(grabber_core::invalid_constraint),
        help("Use comparators such as `>=1.0.0`, `<2.0.0`, `^1.2`, `~1.2.3`, `!=1.1.0` or `1.0 - 2.0`, separated by commas or `||`")
    )]
    Constraint {
        constraint: String,
        #[source]
        source: semver::Error,
    },

    #[error("Invalid version constraint `{constraint}`: empty clause")]
    #[diagnostic(
        code(grabber_core::empty_clause),
        help("Remove the stray `,` or `||`")
    )]
    EmptyClause { constraint: String },

    #[error("Invalid version `{version}`: {source}")]
    #[diagnostic(
        code(grabber_core::invalid_version),
        help("The registry listed a version that is not a semantic version")
    )]
    Version {
        version: String,
        #[source]
        source: semver::Error,
    },
}

/// One `||` branch of a constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternative {
    req: VersionReq,
    excluded: Vec<Version>,
}

impl Alternative {
    fn parse(constraint: &str, alternative: &str) -> Result<Self, ParseError> {
        let invalid = |source| {
            ParseError::Constraint {
                constraint: constraint.to_string(),
                source,
            }
        };

        let mut clauses = Vec::new();
        let mut excluded = Vec::new();
        for clause in alternative.split(',').map(str::trim) {
            if clause.is_empty() {
                return Err(ParseError::EmptyClause {
                    constraint: constraint.to_string(),
                });
            }

            if let Some(version) = clause.strip_prefix("!=") {
                excluded.push(Version::parse(&pad_version(version)).map_err(invalid)?);
            } else if let Some((low, high)) = clause.split_once(" - ") {
                clauses.push(format!(">={}", low.trim()));
                clauses.push(format!("<={}", high.trim()));
            } else if clause.starts_with(|c: char| c.is_ascii_digit()) {
                // the parser reads operator-less versions as caret requirements
                clauses.push(format!("={clause}"));
            } else {
                clauses.push(clause.to_string());
            }
        }

        let req = if clauses.is_empty() {
            VersionReq::STAR
        } else {
            VersionReq::parse(&clauses.join(", ")).map_err(invalid)?
        };

        Ok(Self {
            req,
            excluded,
        })
    }

    fn matches(&self, version: &Version) -> bool {
        self.req.matches(version)
            && !self
                .excluded
                .iter()
                .any(|ex| ex.cmp_precedence(version).is_eq())
    }
}

/// Predicate over version strings built from an optional constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VersionFilter {
    /// No constraint: every version is accepted.
    #[default]
    Any,
    /// Accepts a version matching any alternative.
    Range(Vec<Alternative>),
}

impl VersionFilter {
    /// Builds a filter from an optional constraint expression.
    ///
    /// Comparator clauses without an operator are exact matches, so `1.2.3` only accepts
    /// `1.2.3` and `1.2` accepts any `1.2.x`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Constraint`] or [`ParseError::EmptyClause`] if the expression is
    /// not a valid version range.
    pub fn build(constraint: Option<&str>) -> Result<Self, ParseError> {
        let Some(constraint) = constraint.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(Self::Any);
        };

        constraint
            .split("||")
            .map(|alternative| Alternative::parse(constraint, alternative))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Range)
    }

    /// Whether `version` satisfies the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Version`] if a range is set and `version` is not a semantic
    /// version. A leading `v` is tolerated and missing minor or patch parts count as zero.
    pub fn accepts(&self, version: &str) -> Result<bool, ParseError> {
        match self {
            Self::Any => Ok(true),
            Self::Range(alternatives) => {
                let version = parse_version(version)?;
                Ok(alternatives.iter().any(|alt| alt.matches(&version)))
            }
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Parses a registry version string.
pub fn parse_version(version: &str) -> Result<Version, ParseError> {
    Version::parse(&pad_version(version)).map_err(|source| {
        ParseError::Version {
            version: version.to_string(),
            source,
        }
    })
}

/// Strips a leading `v` and fills in missing minor and patch numbers: `1.0` becomes `1.0.0`.
fn pad_version(version: &str) -> String {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);

    let end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, rest) = version.split_at(end);
    match core.split('.').count() {
        1 => format!("{core}.0.0{rest}"),
        2 => format!("{core}.0{rest}"),
        _ => version.to_string(),
    }
}
