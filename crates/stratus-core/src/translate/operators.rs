//! One translator per supported query operator.
//!
//! Each translator validates its own call shape and records its effects
//! into the shared [`TranslationResult`]; predicate rendering is delegated
//! to the expression translator.

use crate::error::TranslateError;
use crate::filter::Filter;
use crate::query::{Projection, QueryOp};
use crate::schema::EntitySchema;

use super::expression::ExpressionTranslator;
use super::result::{PostOp, ProjectedColumn, TranslationResult};

pub(crate) type OperatorFn =
    fn(&QueryOp, &EntitySchema, &mut TranslationResult) -> Result<(), TranslateError>;

/// The closed operator set, dispatched by name.
pub(crate) const OPERATOR_REGISTRY: &[(&str, OperatorFn)] = &[
    ("where", translate_where),
    ("select", translate_select),
    ("take", translate_take),
    ("first", translate_first),
    ("first_or_default", translate_first),
    ("single", translate_single),
    ("single_or_default", translate_single),
];

fn unsupported(op: &QueryOp) -> TranslateError {
    TranslateError::UnsupportedOperator(op.name().to_string())
}

/// Compile a predicate into the result. A constant predicate body pushes
/// no filter down.
fn compile_predicate(
    filter: &Filter,
    schema: &EntitySchema,
    result: &mut TranslationResult,
) -> Result<(), TranslateError> {
    if matches!(filter, Filter::Literal(_)) {
        return Ok(());
    }
    let clause = ExpressionTranslator::new(schema).translate(filter)?;
    result.add_filter(clause);
    Ok(())
}

fn translate_where(
    op: &QueryOp,
    schema: &EntitySchema,
    result: &mut TranslationResult,
) -> Result<(), TranslateError> {
    let QueryOp::Where(filter) = op else {
        return Err(unsupported(op));
    };
    compile_predicate(filter, schema, result)
}

fn translate_select(
    op: &QueryOp,
    schema: &EntitySchema,
    result: &mut TranslationResult,
) -> Result<(), TranslateError> {
    let QueryOp::Select(projection) = op else {
        return Err(unsupported(op));
    };

    let pairs: Vec<(String, String)> = match projection {
        Projection::Bindings(bindings) => bindings.clone(),
        Projection::Columns(columns) => columns
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect(),
    };

    if pairs.is_empty() {
        return Err(TranslateError::InvalidArgument {
            method: "select".to_string(),
            reason: "projection lists no columns".to_string(),
        });
    }

    let mut replay = Vec::with_capacity(pairs.len());
    for (name, source) in pairs {
        let wire = schema.wire_name(&source).to_string();
        result.add_column(wire.clone());
        replay.push(ProjectedColumn { name, source: wire });
    }

    // The service can select raw columns but cannot construct result
    // shapes, so the projection is replayed client-side.
    result.add_post(PostOp::Project(replay));
    Ok(())
}

fn translate_take(
    op: &QueryOp,
    _schema: &EntitySchema,
    result: &mut TranslationResult,
) -> Result<(), TranslateError> {
    let QueryOp::Take(cap) = op else {
        return Err(unsupported(op));
    };
    if *cap == 0 {
        return Err(TranslateError::InvalidArgument {
            method: "take".to_string(),
            reason: "row cap must be at least 1".to_string(),
        });
    }
    result.add_top(*cap);
    Ok(())
}

fn translate_first(
    op: &QueryOp,
    schema: &EntitySchema,
    result: &mut TranslationResult,
) -> Result<(), TranslateError> {
    let (QueryOp::First(predicate) | QueryOp::FirstOrDefault(predicate)) = op else {
        return Err(unsupported(op));
    };
    if let Some(filter) = predicate {
        compile_predicate(filter, schema, result)?;
    }
    result.add_top(1);
    Ok(())
}

/// A cap of 2 lets the execution engine distinguish "exactly one" from
/// "more than one" without fetching the whole result set.
fn translate_single(
    op: &QueryOp,
    schema: &EntitySchema,
    result: &mut TranslationResult,
) -> Result<(), TranslateError> {
    let (QueryOp::Single(predicate) | QueryOp::SingleOrDefault(predicate)) = op else {
        return Err(unsupported(op));
    };
    if let Some(filter) = predicate {
        compile_predicate(filter, schema, result)?;
    }
    result.add_top(2);
    Ok(())
}
