use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison applied by a [`FilterCondition`].
///
/// Operator names that are not recognised deserialize to `Unknown` instead of
/// failing; an unknown operator matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    In,
    NotIn,
    Range,
    Exists,
    Regex,
    AnyOf,
    AllOf,
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Range => "range",
            Self::Exists => "exists",
            Self::Regex => "regex",
            Self::AnyOf => "any_of",
            Self::AllOf => "all_of",
            Self::Unknown(name) => name,
        }
    }

    /// Whether a missing field satisfies this operator. Unknown operators
    /// match everything, present or not.
    pub fn matches_missing(&self) -> bool {
        matches!(
            self,
            Self::NotEquals | Self::NotContains | Self::NotIn | Self::Unknown(_)
        )
    }
}

impl From<String> for FilterOperator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "not_contains" => Self::NotContains,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "range" => Self::Range,
            "exists" => Self::Exists,
            "regex" => Self::Regex,
            "any_of" => Self::AnyOf,
            "all_of" => Self::AllOf,
            _ => Self::Unknown(s),
        }
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

/// A single predicate over a dotted metadata path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub ignore_case: bool,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            ignore_case: false,
        }
    }

    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLogic {
    #[default]
    And,
    Or,
}

/// A set of conditions combined with one logic operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub logic: FilterLogic,
}

impl FilterSpec {
    pub fn all(conditions: Vec<FilterCondition>) -> Self {
        Self {
            conditions,
            logic: FilterLogic::And,
        }
    }

    pub fn any(conditions: Vec<FilterCondition>) -> Self {
        Self {
            conditions,
            logic: FilterLogic::Or,
        }
    }
}
