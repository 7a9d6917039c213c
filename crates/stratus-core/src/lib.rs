//! # Stratus Core
//!
//! Query translation and change tracking for partitioned table storage.
//!
//! Application code composes a [`TableQuery`] over a declarative predicate
//! tree; the [`QueryTranslator`] compiles it into a [`TranslationResult`]
//! holding the service's native filter string, a column projection, a row
//! cap, and any client-side post-processing. Pending mutations accumulate
//! in a [`ChangeLedger`] keyed by entity identity until a client flushes
//! them in partition-scoped batches.
//!
//! This crate is pure and synchronous; the asynchronous execution engine
//! and transport boundary live in `stratus-client`.
//!
//! ## Quick Start
//!
//! ```
//! use stratus_core::{col, EntitySchema, QueryTranslator, TableQuery};
//!
//! let schema = EntitySchema::for_type("Order").map_property("total", "OrderTotal");
//! let query = TableQuery::new()
//!     .filter(col("total").gt(100).and(col("status").eq("open")))
//!     .take(10);
//!
//! let compiled = QueryTranslator::new(&schema).translate(&query).unwrap();
//! assert_eq!(compiled.filter(), Some("OrderTotal gt 100 and status eq 'open'"));
//! assert_eq!(compiled.top(), Some(10));
//! ```

pub mod entity;
pub mod error;
pub mod eval;
pub mod filter;
pub mod ledger;
pub mod query;
pub mod schema;
pub mod translate;

pub use entity::{Entity, EntityKey};
pub use error::{EvalError, TranslateError};
pub use eval::{ConstantEvaluator, ValueExpr};
pub use filter::{CompareOp, Filter, FilterValue, Operand, col, compare_ordinal, val};
pub use ledger::{ChangeAction, ChangeLedger, LedgerEntry};
pub use query::{Projection, QueryOp, TableQuery};
pub use schema::EntitySchema;
pub use translate::QueryTranslator;
pub use translate::result::{PostOp, ProjectedColumn, TranslationResult};
