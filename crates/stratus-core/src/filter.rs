//! Predicate expression trees over one query row.
//!
//! A [`Filter`] is a closed union of the boolean shapes the remote grammar
//! can express: comparisons, boolean combinators, membership tests, and
//! boolean literals. Leaves are [`Operand`]s — a column of the query row, a
//! literal value, or a closed-over computation reduced by the constant
//! evaluator at translation time.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::EvalError;
use crate::eval::ValueExpr;

/// Relational operator tokens of the remote grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub(crate) fn token(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
        }
    }

    /// The operator comparing the same operands in flipped polarity of
    /// equality (used when a negation is absorbed into a membership test).
    pub(crate) fn negated_equality(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Ne,
            other => other,
        }
    }
}

/// A literal value as the remote grammar understands it.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    DateTime(OffsetDateTime),
}

impl FilterValue {
    /// Render as a filter-string literal: strings single-quoted with `''`
    /// escaping, datetimes wrapped in `datetime'…'`.
    pub(crate) fn render(&self) -> Result<String, EvalError> {
        match self {
            FilterValue::Str(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
            FilterValue::Int(n) => Ok(n.to_string()),
            FilterValue::Double(d) => Ok(d.to_string()),
            FilterValue::Bool(b) => Ok(b.to_string()),
            FilterValue::DateTime(dt) => {
                let stamp = dt
                    .format(&Rfc3339)
                    .map_err(|e| EvalError::Timestamp(e.to_string()))?;
                Ok(format!("datetime'{stamp}'"))
            }
        }
    }

    /// Render as an unquoted display string (used by stringification and
    /// format templates).
    pub(crate) fn display_string(&self) -> Result<String, EvalError> {
        match self {
            FilterValue::Str(s) => Ok(s.clone()),
            FilterValue::Int(n) => Ok(n.to_string()),
            FilterValue::Double(d) => Ok(d.to_string()),
            FilterValue::Bool(b) => Ok(b.to_string()),
            FilterValue::DateTime(dt) => dt
                .format(&Rfc3339)
                .map_err(|e| EvalError::Timestamp(e.to_string())),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Str(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Str(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(i64::from(v))
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        FilterValue::Int(i64::from(v))
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Double(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<OffsetDateTime> for FilterValue {
    fn from(v: OffsetDateTime) -> Self {
        FilterValue::DateTime(v)
    }
}

/// One side of a comparison.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A property of the query row, rendered as its wire column name.
    Column(String),
    /// An already-literal value.
    Value(FilterValue),
    /// A closed-over computation, reduced to a literal by the constant
    /// evaluator during translation.
    Computed(ValueExpr),
}

impl Operand {
    pub fn eq(self, other: impl Into<Operand>) -> Filter {
        Filter::compare(CompareOp::Eq, self, other)
    }

    pub fn ne(self, other: impl Into<Operand>) -> Filter {
        Filter::compare(CompareOp::Ne, self, other)
    }

    pub fn gt(self, other: impl Into<Operand>) -> Filter {
        Filter::compare(CompareOp::Gt, self, other)
    }

    pub fn ge(self, other: impl Into<Operand>) -> Filter {
        Filter::compare(CompareOp::Ge, self, other)
    }

    pub fn lt(self, other: impl Into<Operand>) -> Filter {
        Filter::compare(CompareOp::Lt, self, other)
    }

    pub fn le(self, other: impl Into<Operand>) -> Filter {
        Filter::compare(CompareOp::Le, self, other)
    }

    /// Membership test against a literal collection, expanded at
    /// translation time into a disjunction of equality comparisons.
    pub fn is_in<V: Into<FilterValue>>(self, values: impl IntoIterator<Item = V>) -> Filter {
        Filter::In {
            operand: self,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Value(v.into())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Value(v.into())
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Value(v.into())
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Value(v.into())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Value(v.into())
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Value(v.into())
    }
}

impl From<OffsetDateTime> for Operand {
    fn from(v: OffsetDateTime) -> Self {
        Operand::Value(v.into())
    }
}

impl From<FilterValue> for Operand {
    fn from(v: FilterValue) -> Self {
        Operand::Value(v)
    }
}

impl From<ValueExpr> for Operand {
    fn from(v: ValueExpr) -> Self {
        Operand::Computed(v)
    }
}

/// A column reference.
pub fn col(name: impl Into<String>) -> Operand {
    Operand::Column(name.into())
}

/// A literal value.
pub fn val(v: impl Into<FilterValue>) -> Operand {
    Operand::Value(v.into())
}

/// A boolean predicate over one query row.
#[derive(Debug, Clone)]
pub enum Filter {
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    In {
        operand: Operand,
        values: Vec<FilterValue>,
    },
    Literal(bool),
}

impl Filter {
    pub fn compare(op: CompareOp, left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Filter::Compare {
            op,
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }
}

/// Relational comparison of two arbitrary operands. Covers ordinal
/// comparison helpers (`compare(a, b) <op> 0` collapses to `a <op> b`).
pub fn compare_ordinal(
    left: impl Into<Operand>,
    op: CompareOp,
    right: impl Into<Operand>,
) -> Filter {
    Filter::compare(op, left, right)
}
