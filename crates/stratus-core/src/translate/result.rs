//! The accumulator a query chain compiles into.

use serde_json::Map;

use crate::entity::Entity;

/// Everything the execution engine needs for one compiled query: the
/// filter string, the projected wire columns (empty = all), the row cap
/// (smallest requested wins), and the client-side post-processing steps to
/// run after rows are fetched.
///
/// Built up by the operator translators during one translation pass and
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TranslationResult {
    filter: Option<String>,
    select: Vec<String>,
    top: Option<u64>,
    post: Vec<PostOp>,
}

impl TranslationResult {
    /// Record a filter clause. Successive clauses combine with `and`.
    pub(crate) fn add_filter(&mut self, clause: String) {
        self.filter = Some(match self.filter.take() {
            None => clause,
            Some(prev) => format!("({prev}) and ({clause})"),
        });
    }

    /// Record a projected wire column, preserving first-seen order.
    pub(crate) fn add_column(&mut self, name: String) {
        if !self.select.contains(&name) {
            self.select.push(name);
        }
    }

    /// Record a row cap; the smallest requested cap wins.
    pub(crate) fn add_top(&mut self, cap: u64) {
        self.top = Some(match self.top {
            None => cap,
            Some(existing) => existing.min(cap),
        });
    }

    /// Record a client-side post-processing step.
    pub(crate) fn add_post(&mut self, op: PostOp) {
        self.post.push(op);
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn select(&self) -> &[String] {
        &self.select
    }

    pub fn top(&self) -> Option<u64> {
        self.top
    }

    pub fn post_ops(&self) -> &[PostOp] {
        &self.post
    }

    /// Apply the recorded post-processing steps, in order, to fetched
    /// entities.
    pub fn apply_post(&self, entities: &mut Vec<Entity>) {
        for op in &self.post {
            match op {
                PostOp::Project(columns) => {
                    for entity in entities.iter_mut() {
                        let mut projected = Map::new();
                        for column in columns {
                            if let Some(value) = entity.properties.get(&column.source) {
                                projected.insert(column.name.clone(), value.clone());
                            }
                        }
                        entity.properties = projected;
                    }
                }
            }
        }
    }
}

/// A transform the remote service cannot perform itself, replayed
/// client-side after rows are fetched.
#[derive(Debug, Clone)]
pub enum PostOp {
    /// Re-shape each row: the service selects raw columns but cannot
    /// construct arbitrary result shapes.
    Project(Vec<ProjectedColumn>),
}

/// One column of a client-side projection replay.
#[derive(Debug, Clone)]
pub struct ProjectedColumn {
    /// Name in the projected result shape.
    pub name: String,
    /// Wire column the value is read from.
    pub source: String,
}
