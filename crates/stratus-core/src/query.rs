//! The composable query surface: a chain of operators over one table.

use crate::filter::Filter;

/// One operator in a query chain. The supported set is closed; each
/// variant has a statically registered translator.
#[derive(Debug, Clone)]
pub enum QueryOp {
    Where(Filter),
    Select(Projection),
    Take(u64),
    First(Option<Filter>),
    FirstOrDefault(Option<Filter>),
    Single(Option<Filter>),
    SingleOrDefault(Option<Filter>),
}

impl QueryOp {
    /// The operator name used for registry dispatch and error reporting.
    pub fn name(&self) -> &'static str {
        match self {
            QueryOp::Where(_) => "where",
            QueryOp::Select(_) => "select",
            QueryOp::Take(_) => "take",
            QueryOp::First(_) => "first",
            QueryOp::FirstOrDefault(_) => "first_or_default",
            QueryOp::Single(_) => "single",
            QueryOp::SingleOrDefault(_) => "single_or_default",
        }
    }
}

/// The two projection shapes the translator accepts: named bindings
/// (result field, source property) or positional property reads.
#[derive(Debug, Clone)]
pub enum Projection {
    Bindings(Vec<(String, String)>),
    Columns(Vec<String>),
}

/// A query chain in application order: the first operator pushed is the
/// innermost (first applied).
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    ops: Vec<QueryOp>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.ops.push(QueryOp::Where(filter));
        self
    }

    /// Project to a set of properties, keeping their names.
    pub fn select_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.ops.push(QueryOp::Select(Projection::Columns(
            columns.into_iter().map(Into::into).collect(),
        )));
        self
    }

    /// Project to a result shape of (binding name, source property) pairs.
    pub fn select_bindings<N, S>(mut self, bindings: impl IntoIterator<Item = (N, S)>) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        self.ops.push(QueryOp::Select(Projection::Bindings(
            bindings
                .into_iter()
                .map(|(name, source)| (name.into(), source.into()))
                .collect(),
        )));
        self
    }

    /// Cap the number of rows fetched.
    pub fn take(mut self, cap: u64) -> Self {
        self.ops.push(QueryOp::Take(cap));
        self
    }

    pub fn first(mut self) -> Self {
        self.ops.push(QueryOp::First(None));
        self
    }

    pub fn first_with(mut self, filter: Filter) -> Self {
        self.ops.push(QueryOp::First(Some(filter)));
        self
    }

    pub fn first_or_default(mut self) -> Self {
        self.ops.push(QueryOp::FirstOrDefault(None));
        self
    }

    pub fn first_or_default_with(mut self, filter: Filter) -> Self {
        self.ops.push(QueryOp::FirstOrDefault(Some(filter)));
        self
    }

    pub fn single(mut self) -> Self {
        self.ops.push(QueryOp::Single(None));
        self
    }

    pub fn single_with(mut self, filter: Filter) -> Self {
        self.ops.push(QueryOp::Single(Some(filter)));
        self
    }

    pub fn single_or_default(mut self) -> Self {
        self.ops.push(QueryOp::SingleOrDefault(None));
        self
    }

    pub fn single_or_default_with(mut self, filter: Filter) -> Self {
        self.ops.push(QueryOp::SingleOrDefault(Some(filter)));
        self
    }

    /// The operator chain in application order.
    pub fn ops(&self) -> &[QueryOp] {
        &self.ops
    }
}
