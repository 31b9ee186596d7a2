//! Column descriptors and the count index column.
//!
//! A [`ColumnCatalog`] maps request column positions to their query-side
//! metadata: the underlying field path, an optional alias target, the value
//! type driving search coercion, and the column's default comparison
//! operator. Catalogs usually arrive JSON-encoded in the request's
//! `dataColumns` member but can also be built programmatically.

use crate::errors::GridError;
use crate::filtering::SearchOperator;
use crate::models::ColumnClause;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Func, SimpleExpr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Value type of a grid column, deciding how search text is coerced.
///
/// Wire aliases from the legacy vocabulary are accepted: `int` for
/// `integer`, `bool` for `boolean` and `price` for `decimal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "int")]
    Integer,
    Float,
    Double,
    #[serde(alias = "price")]
    Decimal,
    #[serde(alias = "bool")]
    Boolean,
    Date,
    DateTime,
    #[default]
    Text,
}

impl ColumnType {
    /// Whether search text must parse as a number for this column to
    /// contribute a predicate.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Double | Self::Decimal
        )
    }
}

/// Metadata mapping one displayed column to an underlying query field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Underlying field path. Underscores are treated as dot separators, so
    /// `p_name` targets `p.name`.
    pub field: String,
    /// Optional alias field queried in place of `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub column_type: ColumnType,
    /// Whether the column may contribute search predicates at all.
    #[serde(default = "searchable_default")]
    pub searchable: bool,
    /// Default comparison operator token applied when the search text
    /// carries no bracket prefix. Wire name kept from the legacy payload.
    #[serde(rename = "columnRegex", default, skip_serializing_if = "Option::is_none")]
    pub default_operator: Option<String>,
}

const fn searchable_default() -> bool {
    true
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(field: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            field: field.into(),
            alias: None,
            column_type,
            searchable: true,
            default_operator: None,
        }
    }

    /// Query this field instead of the declared one.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Use `operator` when the search text carries no bracket prefix.
    #[must_use]
    pub fn with_default_operator(mut self, operator: SearchOperator) -> Self {
        self.default_operator = Some(operator.token().to_string());
        self
    }

    /// Exclude the column from searching regardless of the request flag.
    #[must_use]
    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    /// The field actually queried: the alias when present, else `field`.
    #[must_use]
    pub fn target_field(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }

    /// The effective default operator, `=` when unset or unrecognized.
    #[must_use]
    pub fn default_operator(&self) -> SearchOperator {
        self.default_operator
            .as_deref()
            .and_then(SearchOperator::from_token)
            .unwrap_or_default()
    }
}

/// Ordered collection of column descriptors, addressed by request column
/// position.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnCatalog {
    #[must_use]
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Decode a catalog from the request's JSON-encoded `dataColumns`
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Configuration`] when the payload does not decode
    /// as a descriptor list.
    pub fn from_data_columns(payload: &str) -> Result<Self, GridError> {
        let columns: Vec<ColumnDescriptor> = serde_json::from_str(payload).map_err(|err| {
            GridError::configuration(format!("dataColumns payload failed to decode: {err}"))
        })?;
        Ok(Self { columns })
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<Vec<ColumnDescriptor>> for ColumnCatalog {
    fn from(columns: Vec<ColumnDescriptor>) -> Self {
        Self::new(columns)
    }
}

/// Rewrite underscores as dot separators, `p_name` to `p.name`.
///
/// Applied once when a column's target field is resolved; reapplying is a
/// no-op since the output contains no underscores.
#[must_use]
pub fn normalize_field(field: &str) -> String {
    field.replace('_', ".")
}

/// Resolve the normalized query field for a request column: the catalog
/// descriptor's target when one is declared, else the clause's own `data`
/// path. Both predicate compilation and ordering go through here so the
/// normalization happens in exactly one place.
#[must_use]
pub fn resolved_target(descriptor: Option<&ColumnDescriptor>, clause: &ColumnClause) -> String {
    let raw = descriptor.map_or(clause.data.as_str(), ColumnDescriptor::target_field);
    normalize_field(raw)
}

/// Build a column reference expression from a normalized field path.
/// A dotted path becomes a qualified `table.column` reference.
pub(crate) fn column_expr(field: &str) -> Expr {
    match field.split_once('.') {
        Some((table, column)) => Expr::col((Alias::new(table), Alias::new(column))),
        None => Expr::col(Alias::new(field)),
    }
}

/// The column the two count-query shapes aggregate over.
///
/// The default counts every row; a configured field counts distinct values,
/// which keeps filtered counts stable when the base query joins one-to-many
/// relations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IndexColumn {
    #[default]
    All,
    Field(String),
}

impl IndexColumn {
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Derive an index field from a namespaced entity type name by keeping
    /// the last path segment, lowercased. `shop::products::Product` becomes
    /// `product`.
    #[must_use]
    pub fn from_entity_name(name: &str) -> Self {
        let tail = name.rsplit("::").next().unwrap_or(name).trim().to_lowercase();
        if tail.is_empty() {
            Self::All
        } else {
            Self::Field(tail)
        }
    }

    /// The aggregate projection for a count query.
    #[must_use]
    pub fn count_expr(&self) -> SimpleExpr {
        match self {
            Self::All => SimpleExpr::FunctionCall(Func::count(Expr::col(Asterisk))),
            Self::Field(field) => {
                SimpleExpr::FunctionCall(Func::count_distinct(column_expr(field)))
            }
        }
    }
}
