//! Predicate-to-filter-string translation.
//!
//! Renders a [`Filter`] tree into the remote grammar (`and, or, not, eq,
//! ne, gt, ge, lt, le`). Parenthesization is decided per binary node, then
//! a final cleanup pass strips pairs made redundant by adjacent nodes.

use crate::error::TranslateError;
use crate::eval::ConstantEvaluator;
use crate::filter::{CompareOp, Filter, FilterValue, Operand};
use crate::schema::EntitySchema;

/// Translates one predicate tree into a filter string, resolving column
/// names through the schema's name map and folding closed-over
/// computations through the constant evaluator.
pub struct ExpressionTranslator<'a> {
    schema: &'a EntitySchema,
    evaluator: ConstantEvaluator,
}

impl<'a> ExpressionTranslator<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self {
            schema,
            evaluator: ConstantEvaluator::new(),
        }
    }

    pub fn translate(&self, filter: &Filter) -> Result<String, TranslateError> {
        let mut buf = String::new();
        self.visit(filter, &mut buf)?;
        Ok(strip_redundant_parens(&buf))
    }

    fn visit(&self, node: &Filter, buf: &mut String) -> Result<(), TranslateError> {
        match node {
            Filter::Literal(b) => {
                buf.push_str(if *b { "true" } else { "false" });
            }
            Filter::Compare { op, left, right } => {
                self.append_operand(left, buf)?;
                buf.push(' ');
                buf.push_str(op.token());
                buf.push(' ');
                self.append_operand(right, buf)?;
            }
            Filter::And(left, right) => self.visit_binary("and", left, right, buf)?,
            Filter::Or(left, right) => self.visit_binary("or", left, right, buf)?,
            Filter::Not(inner) => match inner.as_ref() {
                // The negation is absorbed into the membership expansion,
                // flipping equality to inequality.
                Filter::In { operand, values } => {
                    self.append_membership(operand, values, true, buf)?;
                }
                other => {
                    buf.push_str("not ");
                    self.visit(other, buf)?;
                }
            },
            Filter::In { operand, values } => {
                self.append_membership(operand, values, false, buf)?;
            }
        }
        Ok(())
    }

    fn visit_binary(
        &self,
        token: &str,
        left: &Filter,
        right: &Filter,
        buf: &mut String,
    ) -> Result<(), TranslateError> {
        // Parentheses only when at least one side is itself an operator
        // expression; membership tests and literals group themselves.
        let grouped = is_operator(left) || is_operator(right);
        if grouped {
            buf.push('(');
        }
        self.visit(left, buf)?;
        buf.push(' ');
        buf.push_str(token);
        buf.push(' ');
        self.visit(right, buf)?;
        if grouped {
            buf.push(')');
        }
        Ok(())
    }

    fn append_membership(
        &self,
        operand: &Operand,
        values: &[FilterValue],
        negated: bool,
        buf: &mut String,
    ) -> Result<(), TranslateError> {
        if values.is_empty() {
            return Err(TranslateError::InvalidArgument {
                method: "in".to_string(),
                reason: "membership test requires a non-empty collection".to_string(),
            });
        }

        let op = if negated {
            CompareOp::Eq.negated_equality()
        } else {
            CompareOp::Eq
        };
        let joiner = if negated { " and " } else { " or " };

        buf.push('(');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                buf.push_str(joiner);
            }
            self.append_operand(operand, buf)?;
            buf.push(' ');
            buf.push_str(op.token());
            buf.push(' ');
            buf.push_str(&value.render()?);
        }
        buf.push(')');
        Ok(())
    }

    fn append_operand(&self, operand: &Operand, buf: &mut String) -> Result<(), TranslateError> {
        match operand {
            Operand::Column(name) => {
                if name.is_empty() {
                    return Err(TranslateError::UnsupportedMember(name.clone()));
                }
                buf.push_str(self.schema.wire_name(name));
            }
            Operand::Value(value) => buf.push_str(&value.render()?),
            Operand::Computed(expr) => {
                let value = self.evaluator.evaluate(expr)?;
                buf.push_str(&value.render()?);
            }
        }
        Ok(())
    }
}

fn is_operator(filter: &Filter) -> bool {
    matches!(
        filter,
        Filter::Compare { .. } | Filter::And(..) | Filter::Or(..) | Filter::Not(..)
    )
}

/// Remove parenthesis pairs that wrap the entire string or an
/// already-parenthesized sub-expression, then trim.
///
/// Positions are matched with a stack and marked for removal before the
/// cleaned string is materialized, so later pairs are judged against the
/// original text.
fn strip_redundant_parens(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut remove = vec![false; chars.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '(' {
            stack.push(i);
        } else if c == ')' {
            let Some(start) = stack.pop() else { continue };
            let wraps_all = start == 0 && i == chars.len() - 1;
            let doubled = start != 0
                && chars[start - 1] == '('
                && i + 1 < chars.len()
                && chars[i + 1] == ')';
            if wraps_all || doubled {
                remove[start] = true;
                remove[i] = true;
            }
        }
    }

    chars
        .iter()
        .zip(&remove)
        .filter(|&(_, &r)| !r)
        .map(|(&c, _)| c)
        .collect::<String>()
        .trim()
        .to_string()
}
