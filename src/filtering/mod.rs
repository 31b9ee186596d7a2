//! # Search Compilation
//!
//! This module turns the search side of a grid request into one Sea-ORM
//! condition:
//!
//! - **[`parse_operator`]** extracts an optional bracket operator prefix
//!   (`[=]`, `[!=]`, `[%]`, `[<]`, `[>]`) from raw search text.
//! - **[`compile_condition`]** walks the declared columns, substitutes the
//!   global term into searchable columns without one of their own, coerces
//!   the text by the column's declared type and collects at most one bound
//!   predicate per column into a top-level AND group.
//! - **[`resolve_ordering`]** maps order directives onto query sort keys,
//!   rejecting directives that point outside the declared column list.
//!
//! ## Search text examples
//!
//! ```text
//! widget        text column   LOWER(field) compared to 'widget'
//! [%]widget     text column   LOWER(field) LIKE '%widget%'
//! [!=]draft     text column   LOWER(field) <> 'draft'
//! [!=]5         integer       CAST(field AS integer) = 5  (numeric columns
//!                             always compare for equality)
//! 2023-05-01    date column   day-exact equality
//! 2023          date column   LOWER(field) LIKE '%2023%'
//! active        boolean       COALESCE(field, FALSE) = TRUE
//! ```
//!
//! Every emitted comparison binds its value as a query parameter; search
//! text never reaches the backend as query text.

pub mod conditions;
pub mod operator;
pub mod sort;

pub use conditions::{SearchMode, compile_condition};
pub use operator::{SearchOperator, parse_operator};
pub use sort::resolve_ordering;
