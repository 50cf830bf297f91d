//! Filter expressions for collection queries.
//!
//! A [`Constraint`] is either a leaf comparison on one field or an AND/OR
//! group of child constraints. A [`Filter`] is the top-level list sent to the
//! backend under the `constraints` query parameter; its entries are combined
//! with an implicit AND.
//!
//! The wire form is:
//!
//! ```text
//! [
//!   {"key": "status", "constraint_type": "equals", "value": "open"},
//!   {"or": [
//!     {"key": "priority", "constraint_type": "greater than", "value": 2},
//!     {"key": "due_date", "constraint_type": "is_empty"}
//!   ]}
//! ]
//! ```
//!
//! Serialization is deterministic: the same tree always produces the same
//! string, so filters can be compared and cached by value.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::timestamp;

// ============================================================================
// Constraint Type
// ============================================================================

/// Comparison operators understood by the backend's filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Field equals the value.
    #[serde(rename = "equals")]
    Equals,
    /// Field does not equal the value.
    #[serde(rename = "not equal")]
    NotEqual,
    /// Text field contains the value, or list field contains the item.
    #[serde(rename = "contains")]
    Contains,
    /// Field is strictly greater than the value.
    #[serde(rename = "greater than")]
    GreaterThan,
    /// Field is strictly less than the value.
    #[serde(rename = "less than")]
    LessThan,
    /// Field lies between the two values of a `[low, high]` array.
    #[serde(rename = "is between")]
    IsBetween,
    /// Field equals one of the values of an array.
    #[serde(rename = "in")]
    In,
    /// Field is empty; carries no value.
    #[serde(rename = "is_empty")]
    IsEmpty,
}

impl ConstraintType {
    /// Returns the operator as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEqual => "not equal",
            Self::Contains => "contains",
            Self::GreaterThan => "greater than",
            Self::LessThan => "less than",
            Self::IsBetween => "is between",
            Self::In => "in",
            Self::IsEmpty => "is_empty",
        }
    }

    /// Returns true if this operator carries a value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::IsEmpty)
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Leaf
// ============================================================================

/// A single comparison on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Leaf {
    /// Field key, in the backend's naming.
    pub key: String,
    /// Comparison operator.
    pub constraint_type: ConstraintType,
    /// Comparison operand. `Null` means "no value" and is omitted on the wire.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

impl Leaf {
    /// Creates a leaf.
    pub fn new(key: impl Into<String>, constraint_type: ConstraintType, value: Value) -> Self {
        let value = if constraint_type.takes_value() {
            value
        } else {
            Value::Null
        };
        Self {
            key: key.into(),
            constraint_type,
            value,
        }
    }
}

// ============================================================================
// Combinator
// ============================================================================

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
}

impl Combinator {
    /// Returns the wire key for this combinator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

// ============================================================================
// Constraint
// ============================================================================

/// A filter expression: a leaf comparison or a non-empty AND/OR group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ConstraintRepr")]
pub enum Constraint {
    /// A single comparison.
    Leaf(Leaf),
    /// A group of children combined with AND or OR.
    Group {
        /// How the children combine.
        combinator: Combinator,
        /// The children. Never empty when built through [`Constraint::and`],
        /// [`Constraint::or`], or deserialization.
        children: Vec<Constraint>,
    },
}

impl Constraint {
    /// `key` equals `value`.
    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(key, ConstraintType::Equals, value.into())
    }

    /// `key` does not equal `value`.
    pub fn not_equal(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(key, ConstraintType::NotEqual, value.into())
    }

    /// `key` contains `value` (substring or list membership).
    pub fn contains(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(key, ConstraintType::Contains, value.into())
    }

    /// `key` is greater than `value`.
    pub fn greater_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(key, ConstraintType::GreaterThan, value.into())
    }

    /// `key` is less than `value`.
    pub fn less_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(key, ConstraintType::LessThan, value.into())
    }

    /// `key` lies between `low` and `high`.
    pub fn between(
        key: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::leaf(
            key,
            ConstraintType::IsBetween,
            Value::Array(vec![low.into(), high.into()]),
        )
    }

    /// `key` equals one of `values`.
    pub fn is_in<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::leaf(key, ConstraintType::In, Value::Array(values))
    }

    /// `key` is empty.
    pub fn is_empty(key: impl Into<String>) -> Self {
        Self::leaf(key, ConstraintType::IsEmpty, Value::Null)
    }

    /// Date field `key` is after `instant`.
    pub fn after(key: impl Into<String>, instant: &DateTime<Utc>) -> Self {
        Self::greater_than(key, timestamp::format(instant))
    }

    /// Date field `key` is before `instant`.
    pub fn before(key: impl Into<String>, instant: &DateTime<Utc>) -> Self {
        Self::less_than(key, timestamp::format(instant))
    }

    /// Date field `key` lies within `[start, end]`.
    pub fn date_range(
        key: impl Into<String>,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Self {
        Self::between(key, timestamp::format(start), timestamp::format(end))
    }

    /// All of `children` must match.
    pub fn and(children: Vec<Constraint>) -> Result<Self, CoreError> {
        Self::group(Combinator::And, children)
    }

    /// At least one of `children` must match.
    pub fn or(children: Vec<Constraint>) -> Result<Self, CoreError> {
        Self::group(Combinator::Or, children)
    }

    /// Builds a group, rejecting an empty child list.
    pub fn group(combinator: Combinator, children: Vec<Constraint>) -> Result<Self, CoreError> {
        if children.is_empty() {
            return Err(CoreError::EmptyCombinator(combinator.as_str()));
        }
        Ok(Self::Group {
            combinator,
            children,
        })
    }

    fn leaf(key: impl Into<String>, constraint_type: ConstraintType, value: Value) -> Self {
        Self::Leaf(Leaf::new(key, constraint_type, value))
    }

    /// Returns the number of leaves in this tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(leaf) => leaf.serialize(serializer),
            Self::Group {
                combinator,
                children,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(combinator.as_str(), children)?;
                map.end()
            }
        }
    }
}

/// Wire shapes accepted when parsing a constraint.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConstraintRepr {
    Leaf(Leaf),
    And(AndRepr),
    Or(OrRepr),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AndRepr {
    and: Vec<Constraint>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OrRepr {
    or: Vec<Constraint>,
}

impl TryFrom<ConstraintRepr> for Constraint {
    type Error = CoreError;

    fn try_from(repr: ConstraintRepr) -> Result<Self, Self::Error> {
        match repr {
            ConstraintRepr::Leaf(leaf) => Ok(Self::Leaf(leaf)),
            ConstraintRepr::And(AndRepr { and }) => Self::and(and),
            ConstraintRepr::Or(OrRepr { or }) => Self::or(or),
        }
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Top-level constraint list for a collection query.
///
/// Entries are ANDed by the backend. An empty filter sends no
/// `constraints` parameter at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Vec<Constraint>);

impl Filter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint, builder style.
    #[must_use]
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.0.push(constraint);
        self
    }

    /// Adds a constraint.
    pub fn push(&mut self, constraint: Constraint) {
        self.0.push(constraint);
    }

    /// Returns the top-level constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.0
    }

    /// Returns true if the filter has no constraints.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of top-level constraints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Serializes to the JSON string carried by the `constraints` parameter.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses the JSON form produced by [`Filter::to_json`].
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl From<Constraint> for Filter {
    fn from(constraint: Constraint) -> Self {
        Self(vec![constraint])
    }
}

impl From<Vec<Constraint>> for Filter {
    fn from(constraints: Vec<Constraint>) -> Self {
        Self(constraints)
    }
}

impl FromIterator<Constraint> for Filter {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
