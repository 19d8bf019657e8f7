//! Restriction operators.
//!
//! Demands name their operator with a tag (`EQ`, `GT`, `GTE`, `LT`, `LTE`,
//! `-`). [`OperatorTag`] is the parsed tag; [`Op`] is the binary comparison
//! a leaf predicate carries.

use std::cmp::Ordering;

/// Binary comparison operator of a leaf predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal.
    Eq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl Op {
    /// Evaluates this comparison given an ordering of `field` against `value`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
        }
    }

    /// Returns the demand tag for this operator.
    pub fn tag(self) -> &'static str {
        match self {
            Op::Eq => "EQ",
            Op::Gt => "GT",
            Op::Gte => "GTE",
            Op::Lt => "LT",
            Op::Lte => "LTE",
        }
    }

    /// Returns the SQL symbol for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tag used for the range operator.
pub const RANGE_TAG: &str = "-";

/// Operator tag as written in a demand.
///
/// Tags are matched exactly. Anything unrecognized is kept verbatim as
/// [`OperatorTag::Unknown`] so the compiler can decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorTag {
    /// One of the binary comparisons.
    Compare(Op),
    /// Inclusive range over a `[low, high]` pair.
    Range,
    /// Unrecognized tag.
    Unknown(String),
}

impl OperatorTag {
    /// Parses a demand operator tag.
    pub fn parse(tag: &str) -> OperatorTag {
        match tag {
            "EQ" => OperatorTag::Compare(Op::Eq),
            "GT" => OperatorTag::Compare(Op::Gt),
            "GTE" => OperatorTag::Compare(Op::Gte),
            "LT" => OperatorTag::Compare(Op::Lt),
            "LTE" => OperatorTag::Compare(Op::Lte),
            RANGE_TAG => OperatorTag::Range,
            other => OperatorTag::Unknown(other.to_string()),
        }
    }

    /// Returns the tag as written in a demand.
    pub fn as_str(&self) -> &str {
        match self {
            OperatorTag::Compare(op) => op.tag(),
            OperatorTag::Range => RANGE_TAG,
            OperatorTag::Unknown(tag) => tag,
        }
    }

    /// Returns `true` for [`OperatorTag::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, OperatorTag::Unknown(_))
    }
}

impl From<Op> for OperatorTag {
    fn from(op: Op) -> Self {
        OperatorTag::Compare(op)
    }
}

impl std::fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
