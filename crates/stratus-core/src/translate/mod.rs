//! Query translation: operator chain -> [`TranslationResult`].

pub mod expression;
mod operators;
pub mod result;

use crate::error::TranslateError;
use crate::query::TableQuery;
use crate::schema::EntitySchema;

use operators::OPERATOR_REGISTRY;
use result::TranslationResult;

/// Walks a query's operator chain and dispatches each operator to its
/// registered translator, accumulating one shared [`TranslationResult`].
///
/// Operators are visited outermost-first, mirroring how a chain of nested
/// calls is unwound.
pub struct QueryTranslator<'a> {
    schema: &'a EntitySchema,
}

impl<'a> QueryTranslator<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self { schema }
    }

    pub fn translate(&self, query: &TableQuery) -> Result<TranslationResult, TranslateError> {
        let mut result = TranslationResult::default();
        for op in query.ops().iter().rev() {
            let name = op.name();
            let translator = OPERATOR_REGISTRY
                .iter()
                .find(|(registered, _)| *registered == name)
                .map(|(_, f)| f)
                .ok_or_else(|| TranslateError::UnsupportedOperator(name.to_string()))?;
            translator(op, self.schema, &mut result)?;
        }
        Ok(result)
    }
}
