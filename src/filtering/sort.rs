use sea_orm::{Order, sea_query::SimpleExpr};

use crate::catalog::{ColumnCatalog, column_expr, resolved_target};
use crate::errors::GridError;
use crate::models::GridRequest;

/// Resolve a request's order directives into query sort keys.
///
/// Directives keep their request order: the first is the primary sort key,
/// later ones break ties. Targets resolve through the catalog the same way
/// search predicates do, so aliases and underscore paths behave
/// identically in both places.
///
/// # Errors
///
/// Returns [`GridError::InvalidRequest`] when a directive indexes outside
/// the declared column list.
pub fn resolve_ordering(
    request: &GridRequest,
    catalog: &ColumnCatalog,
) -> Result<Vec<(SimpleExpr, Order)>, GridError> {
    let mut keys = Vec::with_capacity(request.order.len());

    for directive in &request.order {
        let index = usize::try_from(directive.column)
            .ok()
            .filter(|index| *index < request.columns.len())
            .ok_or_else(|| {
                GridError::invalid_request(format!(
                    "order directive targets column {} outside the declared column list",
                    directive.column
                ))
            })?;

        let target = resolved_target(catalog.get(index), &request.columns[index]);
        keys.push((column_expr(&target).into(), directive.dir.order()));
    }

    Ok(keys)
}
