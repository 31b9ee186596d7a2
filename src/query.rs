//! Query assembly: ordering, paging and the two count-query shapes.
//!
//! All three query shapes derive from the same base select and the same
//! compiled condition. Counts never reuse the mutated data query; they are
//! rebuilt from the pristine base so projection and paging state cannot
//! leak between shapes.

use sea_orm::{
    Condition, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Select, sea_query::SimpleExpr,
};

use crate::catalog::IndexColumn;
use crate::errors::GridError;

/// Page size applied when the request supplies no positive `length`.
pub const DEFAULT_LIMIT: u64 = 20;

/// What a `length` of zero (or below) means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroLengthPolicy {
    /// Fall back to the configured default page size. Canonical behavior.
    #[default]
    DefaultLimit,
    /// Return the whole filtered set. Opt-in only; a grid client that
    /// really wants everything should say so explicitly.
    Unlimited,
}

/// Append sort keys in directive order; the first key stays primary.
pub fn apply_ordering<E: EntityTrait>(
    mut select: Select<E>,
    keys: Vec<(SimpleExpr, Order)>,
) -> Select<E> {
    for (expr, order) in keys {
        select = select.order_by(expr, order);
    }
    select
}

/// Apply offset and limit. The offset is only attached when strictly
/// positive; an explicit positive `length` wins over the default.
pub fn apply_paging<E: EntityTrait>(
    mut select: Select<E>,
    start: i64,
    length: i64,
    policy: ZeroLengthPolicy,
    default_limit: u64,
) -> Select<E> {
    if start > 0 {
        select = select.offset(u64::try_from(start).unwrap_or(0));
    }
    if length > 0 {
        select = select.limit(u64::try_from(length).unwrap_or(default_limit));
    } else if policy == ZeroLengthPolicy::DefaultLimit {
        select = select.limit(default_limit);
    }
    select
}

/// Attach a compiled condition, skipping empty groups entirely.
pub fn filtered_select<E: EntityTrait>(base: Select<E>, condition: &Condition) -> Select<E> {
    if condition.is_empty() {
        base
    } else {
        base.filter(condition.clone())
    }
}

/// Build a count-query shape: the base select with its projection replaced
/// by the index column's aggregate, optionally narrowed by the compiled
/// condition.
pub fn count_select<E: EntityTrait>(
    base: Select<E>,
    condition: Option<&Condition>,
    index_column: &IndexColumn,
) -> Select<E> {
    let select = match condition {
        Some(condition) => filtered_select(base, condition),
        None => base,
    };
    select
        .select_only()
        .expr_as(index_column.count_expr(), "records_count")
}

/// Execute a count-query shape and read its single aggregate row.
///
/// # Errors
///
/// Backend failures surface as [`GridError::Backend`]. More than one
/// aggregate row is [`GridError::AmbiguousAggregate`]; the first row is
/// never silently picked. An empty result set (a grouped base over zero
/// rows) counts as zero.
pub async fn fetch_count<E: EntityTrait>(
    select: Select<E>,
    db: &DatabaseConnection,
) -> Result<u64, GridError> {
    let rows: Vec<i64> = select
        .into_tuple()
        .all(db)
        .await
        .map_err(GridError::backend)?;

    match rows.as_slice() {
        [] => Ok(0),
        [count] => Ok(u64::try_from(*count).unwrap_or(0)),
        ambiguous => Err(GridError::ambiguous_aggregate(ambiguous.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, QueryTrait};

    mod products {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "products")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub name: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn sql(select: Select<products::Entity>) -> String {
        select.build(DatabaseBackend::Sqlite).to_string()
    }

    #[test]
    fn test_explicit_length_wins() {
        let select = apply_paging(
            products::Entity::find(),
            40,
            25,
            ZeroLengthPolicy::DefaultLimit,
            DEFAULT_LIMIT,
        );
        let sql = sql(select);
        assert!(sql.contains("LIMIT 25"), "got: {sql}");
        assert!(sql.contains("OFFSET 40"), "got: {sql}");
    }

    #[test]
    fn test_zero_length_uses_default_limit() {
        let select = apply_paging(
            products::Entity::find(),
            0,
            0,
            ZeroLengthPolicy::DefaultLimit,
            DEFAULT_LIMIT,
        );
        let sql = sql(select);
        assert!(sql.contains("LIMIT 20"), "got: {sql}");
        assert!(!sql.contains("OFFSET"), "got: {sql}");
    }

    #[test]
    fn test_zero_length_unlimited_policy() {
        let select = apply_paging(
            products::Entity::find(),
            0,
            0,
            ZeroLengthPolicy::Unlimited,
            DEFAULT_LIMIT,
        );
        let sql = sql(select);
        assert!(!sql.contains("LIMIT"), "got: {sql}");
    }

    #[test]
    fn test_negative_start_is_ignored() {
        let select = apply_paging(
            products::Entity::find(),
            -5,
            10,
            ZeroLengthPolicy::DefaultLimit,
            DEFAULT_LIMIT,
        );
        let sql = sql(select);
        assert!(!sql.contains("OFFSET"), "got: {sql}");
    }

    #[test]
    fn test_count_select_replaces_projection() {
        let select = count_select(products::Entity::find(), None, &IndexColumn::All);
        let sql = sql(select);
        assert!(sql.contains(r#"SELECT COUNT(*) AS "records_count""#), "got: {sql}");
        assert!(!sql.contains(r#""products"."name""#), "got: {sql}");
    }

    #[test]
    fn test_count_select_distinct_index_column() {
        let select = count_select(
            products::Entity::find(),
            None,
            &IndexColumn::field("id"),
        );
        let sql = sql(select);
        assert!(sql.contains(r#"COUNT(DISTINCT "id")"#), "got: {sql}");
    }

    #[test]
    fn test_empty_condition_is_not_attached() {
        let select = filtered_select(products::Entity::find(), &Condition::all());
        let sql = sql(select);
        assert!(!sql.contains("WHERE"), "got: {sql}");
    }
}
