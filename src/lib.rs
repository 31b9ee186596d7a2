//! # gridcrate
//!
//! Server-side data grid queries for Axum + Sea-ORM.
//!
//! `gridcrate` compiles a DataTables-style grid request (per-column search
//! terms, a global search term, multi-key ordering, paging and an opaque
//! `draw` echo token) into one Sea-ORM condition, then reuses that condition
//! across the three query shapes a grid endpoint needs: the paged data
//! query, the filtered record count and the total record count.
//!
//! ```rust,ignore
//! use gridcrate::{GridQueryBuilder, IndexColumn};
//!
//! let response = GridQueryBuilder::new(products::Entity::find())
//!     .with_index_column(IndexColumn::field("id"))
//!     .respond(&db, &request)
//!     .await?;
//!
//! Ok(axum::Json(response))
//! ```
//!
//! Search text may carry a bracket operator prefix (`[=]`, `[!=]`, `[%]`,
//! `[<]`, `[>]`); column types declared in the request's `dataColumns`
//! payload (or a programmatic [`ColumnCatalog`]) decide how the remaining
//! text is coerced. Every comparison is emitted as a bound parameter, never
//! as interpolated query text.

pub mod builder;
pub mod catalog;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod query;

pub use builder::{GridQueryBuilder, KeyValueLookup};
pub use catalog::{ColumnCatalog, ColumnDescriptor, ColumnType, IndexColumn};
pub use errors::GridError;
pub use filtering::{SearchMode, SearchOperator, compile_condition, parse_operator, resolve_ordering};
pub use models::{ColumnClause, GridRequest, GridResponse, OrderDirection, OrderDirective, SearchInput};
pub use query::ZeroLengthPolicy;
pub use serde_with;
