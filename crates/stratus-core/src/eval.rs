//! Constant evaluation: reducing closed-over sub-expressions to literals.
//!
//! Anything in a predicate that does not reference the query row must
//! become a literal before it can be rendered into the filter string. A
//! [`ValueExpr`] captures the shapes that occur in practice — captured
//! closures, format templates, stringification — and the
//! [`ConstantEvaluator`] folds them down, surfacing failures as
//! [`EvalError`] before any network call is made.

use std::fmt;
use std::sync::Arc;

use crate::error::EvalError;
use crate::filter::FilterValue;

/// A captured computation producing a literal on demand.
pub type DeferredFn = Arc<dyn Fn() -> Result<FilterValue, EvalError> + Send + Sync>;

/// A sub-expression that does not reference the query row.
#[derive(Clone)]
pub enum ValueExpr {
    /// An immediate literal.
    Literal(FilterValue),
    /// A captured closure or field read, invoked at translation time.
    Deferred(DeferredFn),
    /// A format template with `{}` placeholders filled from `args` in order.
    Format {
        template: String,
        args: Vec<ValueExpr>,
    },
    /// Eager stringification of the inner expression.
    Display(Box<ValueExpr>),
}

impl ValueExpr {
    pub fn literal(v: impl Into<FilterValue>) -> Self {
        ValueExpr::Literal(v.into())
    }

    pub fn deferred(f: impl Fn() -> Result<FilterValue, EvalError> + Send + Sync + 'static) -> Self {
        ValueExpr::Deferred(Arc::new(f))
    }

    pub fn format(template: impl Into<String>, args: Vec<ValueExpr>) -> Self {
        ValueExpr::Format {
            template: template.into(),
            args,
        }
    }

    pub fn display(inner: ValueExpr) -> Self {
        ValueExpr::Display(Box::new(inner))
    }
}

impl fmt::Debug for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpr::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            ValueExpr::Deferred(_) => f.write_str("Deferred(..)"),
            ValueExpr::Format { template, args } => f
                .debug_struct("Format")
                .field("template", template)
                .field("args", args)
                .finish(),
            ValueExpr::Display(inner) => f.debug_tuple("Display").field(inner).finish(),
        }
    }
}

/// Reduces a [`ValueExpr`] to a single [`FilterValue`].
#[derive(Debug, Default)]
pub struct ConstantEvaluator;

impl ConstantEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, expr: &ValueExpr) -> Result<FilterValue, EvalError> {
        match expr {
            ValueExpr::Literal(v) => Ok(v.clone()),
            ValueExpr::Deferred(f) => f(),
            ValueExpr::Format { template, args } => {
                let placeholders = template.matches("{}").count();
                if placeholders != args.len() {
                    return Err(EvalError::FormatArity {
                        placeholders,
                        arguments: args.len(),
                    });
                }
                let mut rendered = String::with_capacity(template.len());
                let mut rest = template.as_str();
                for arg in args {
                    let (head, tail) = match rest.split_once("{}") {
                        Some(parts) => parts,
                        None => break,
                    };
                    rendered.push_str(head);
                    rendered.push_str(&self.evaluate(arg)?.display_string()?);
                    rest = tail;
                }
                rendered.push_str(rest);
                Ok(FilterValue::Str(rendered))
            }
            ValueExpr::Display(inner) => {
                let value = self.evaluate(inner)?;
                Ok(FilterValue::Str(value.display_string()?))
            }
        }
    }
}
