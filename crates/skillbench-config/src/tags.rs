//! Domain compatibility tags
//!
//! Conductors are typed by their role in the circuit. The set is closed: a new
//! category is a code change, not a config change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Conductor category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Ungrounded, current-carrying conductor
    Hot,
    /// Grounded, current-carrying conductor
    Neutral,
    /// Equipment grounding conductor
    Ground,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hot => "hot",
            Category::Neutral => "neutral",
            Category::Ground => "ground",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Category::Hot),
            "neutral" => Ok(Category::Neutral),
            "ground" => Ok(Category::Ground),
            other => Err(ConfigError::UnknownCategory(other.to_string())),
        }
    }
}

/// What an anchor accepts. Written as `"any"`/`"*"` or a category name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AcceptFilter {
    #[default]
    Any,
    Only(Category),
}

impl AcceptFilter {
    pub fn accepts(&self, category: Category) -> bool {
        match self {
            AcceptFilter::Any => true,
            AcceptFilter::Only(expected) => *expected == category,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            AcceptFilter::Any => None,
            AcceptFilter::Only(category) => Some(*category),
        }
    }
}

impl fmt::Display for AcceptFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptFilter::Any => f.write_str("any"),
            AcceptFilter::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for AcceptFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" || s.eq_ignore_ascii_case("any") {
            Ok(AcceptFilter::Any)
        } else {
            s.parse().map(AcceptFilter::Only)
        }
    }
}

impl TryFrom<String> for AcceptFilter {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AcceptFilter> for String {
    fn from(filter: AcceptFilter) -> Self {
        filter.to_string()
    }
}

impl From<Category> for AcceptFilter {
    fn from(category: Category) -> Self {
        AcceptFilter::Only(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        assert_eq!("*".parse::<AcceptFilter>().unwrap(), AcceptFilter::Any);
        assert_eq!(
            "Ground".parse::<AcceptFilter>().unwrap(),
            AcceptFilter::Only(Category::Ground)
        );
        assert!(matches!(
            "phase".parse::<AcceptFilter>(),
            Err(ConfigError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_filter_accepts() {
        assert!(AcceptFilter::Any.accepts(Category::Hot));
        assert!(AcceptFilter::Only(Category::Ground).accepts(Category::Ground));
        assert!(!AcceptFilter::Only(Category::Ground).accepts(Category::Hot));
    }
}
