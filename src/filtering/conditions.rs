use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    Condition, DatabaseBackend, Value,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use std::str::FromStr;

use super::operator::{SearchOperator, parse_operator};
use crate::catalog::{ColumnCatalog, ColumnDescriptor, ColumnType, column_expr, resolved_target};
use crate::models::{ColumnClause, GridRequest};

/// How the global search term combines with per-column terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// The global term substitutes for the per-column term of every
    /// searchable column that has none of its own; all resulting predicates
    /// are AND-combined. This is the canonical mode.
    #[default]
    Substitute,
    /// Legacy composition: per-column terms are AND-combined as usual, and
    /// the global term forms one OR group across all searchable columns.
    /// Only ever active through explicit configuration.
    AnyColumn,
}

/// Compile the search side of a grid request into one top-level AND group.
///
/// Each declared column contributes at most one predicate, compiled from
/// its effective search text through the bracket-operator parser and the
/// type coercion its descriptor declares. Columns that are not searchable,
/// have no effective text, or carry text the declared type cannot coerce
/// contribute nothing. The returned condition may be empty, in which case
/// callers skip attaching it altogether.
#[must_use]
pub fn compile_condition(
    request: &GridRequest,
    catalog: &ColumnCatalog,
    mode: SearchMode,
    backend: DatabaseBackend,
    active_sentinel: &str,
) -> Condition {
    let mut group = Condition::all();
    let global = request.search.value.trim();

    match mode {
        SearchMode::Substitute => {
            for (index, clause) in request.columns.iter().enumerate() {
                let descriptor = catalog.get(index);
                if !is_searchable(clause, descriptor) {
                    continue;
                }
                let own = clause.search.value.trim();
                let text = if own.is_empty() { global } else { own };
                if text.is_empty() {
                    continue;
                }
                if let Some(predicate) =
                    column_predicate(descriptor, clause, text, backend, active_sentinel)
                {
                    group = group.add(predicate);
                }
            }
        }
        SearchMode::AnyColumn => {
            for (index, clause) in request.columns.iter().enumerate() {
                let descriptor = catalog.get(index);
                if !is_searchable(clause, descriptor) {
                    continue;
                }
                let own = clause.search.value.trim();
                if own.is_empty() {
                    continue;
                }
                if let Some(predicate) =
                    column_predicate(descriptor, clause, own, backend, active_sentinel)
                {
                    group = group.add(predicate);
                }
            }

            if !global.is_empty() {
                let mut any = Condition::any();
                for (index, clause) in request.columns.iter().enumerate() {
                    let descriptor = catalog.get(index);
                    if !is_searchable(clause, descriptor) {
                        continue;
                    }
                    if let Some(predicate) =
                        column_predicate(descriptor, clause, global, backend, active_sentinel)
                    {
                        any = any.add(predicate);
                    }
                }
                if !any.is_empty() {
                    group = group.add(any);
                }
            }
        }
    }

    group
}

fn is_searchable(clause: &ColumnClause, descriptor: Option<&ColumnDescriptor>) -> bool {
    clause.searchable && descriptor.is_none_or(|descriptor| descriptor.searchable)
}

/// Compile one column's search text into a bound predicate, or nothing when
/// the declared type cannot coerce the text.
fn column_predicate(
    descriptor: Option<&ColumnDescriptor>,
    clause: &ColumnClause,
    text: &str,
    backend: DatabaseBackend,
    active_sentinel: &str,
) -> Option<SimpleExpr> {
    let target = resolved_target(descriptor, clause);
    let column_type = descriptor.map_or(ColumnType::Text, |descriptor| descriptor.column_type);
    let default = descriptor.map_or(SearchOperator::Eq, ColumnDescriptor::default_operator);
    let (operator, value) = parse_operator(text, default);

    match column_type {
        // Numeric columns always compare for equality, whatever bracket the
        // text carried; unparsable text contributes nothing.
        ColumnType::Integer => {
            let parsed: i64 = value.trim().parse().ok()?;
            Some(column_expr(&target).cast_as(Alias::new("integer")).eq(parsed))
        }
        ColumnType::Float | ColumnType::Double => {
            let parsed: f64 = value.trim().parse().ok().filter(|float: &f64| float.is_finite())?;
            Some(column_expr(&target).cast_as(Alias::new("decimal")).eq(parsed))
        }
        ColumnType::Decimal => {
            let parsed = Decimal::from_str(value.trim()).ok()?;
            Some(column_expr(&target).cast_as(Alias::new("decimal")).eq(parsed))
        }
        ColumnType::Boolean => {
            let coalesced = Func::coalesce([column_expr(&target).into(), Expr::val(false).into()]);
            Some(Expr::expr(SimpleExpr::FunctionCall(coalesced)).eq(value == active_sentinel))
        }
        ColumnType::Date | ColumnType::DateTime => Some(date_predicate(&target, value, backend)),
        ColumnType::Text => Some(text_predicate(&target, operator, value)),
    }
}

/// Day-exact equality for `YYYY-MM-DD` input, case-insensitive substring
/// match for anything else. Day bucketing differs per backend: Postgres
/// casts to `date`, MySQL and SQLite apply their `DATE()` function.
fn date_predicate(field: &str, value: &str, backend: DatabaseBackend) -> SimpleExpr {
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return match backend {
            DatabaseBackend::Postgres => column_expr(field).cast_as(Alias::new("date")).eq(day),
            _ => {
                let bucketed = Func::cust(Alias::new("DATE")).arg(column_expr(field));
                Expr::expr(SimpleExpr::FunctionCall(bucketed)).eq(value)
            }
        };
    }

    let lowered = SimpleExpr::FunctionCall(Func::lower(column_expr(field)));
    Expr::expr(lowered).like(format!("%{}%", value.to_lowercase()))
}

/// Text comparison: numeric input compares against the raw column, anything
/// else against the lower-cased column cast to text. Substring matching is
/// string territory either way.
fn text_predicate(field: &str, operator: SearchOperator, value: &str) -> SimpleExpr {
    if operator != SearchOperator::Like
        && let Some(numeric) = parse_numeric(value)
    {
        let target = column_expr(field);
        return match operator {
            SearchOperator::Neq => target.ne(numeric),
            SearchOperator::Lt => target.lt(numeric),
            SearchOperator::Gt => target.gt(numeric),
            _ => target.eq(numeric),
        };
    }

    let folded = {
        let lowered = SimpleExpr::FunctionCall(Func::lower(column_expr(field)));
        Expr::expr(lowered).cast_as(Alias::new("text"))
    };
    let value = value.to_lowercase();
    match operator {
        SearchOperator::Like => Expr::expr(folded).like(format!("%{value}%")),
        SearchOperator::Neq => Expr::expr(folded).ne(value),
        SearchOperator::Lt => Expr::expr(folded).lt(value),
        SearchOperator::Gt => Expr::expr(folded).gt(value),
        SearchOperator::Eq => Expr::expr(folded).eq(value),
    }
}

fn parse_numeric(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(int.into());
    }
    match text.parse::<f64>() {
        Ok(float) if float.is_finite() => Some(float.into()),
        _ => None,
    }
}
