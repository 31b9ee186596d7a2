use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

/// A server-side data grid request.
///
/// This is the wire shape a DataTables-style client posts for each page
/// draw:
/// - **Per-column search:** every entry in `columns` names the field it
///   displays, whether it is searchable, and an optional search term.
/// - **Global search:** `search.value` applies to every searchable column
///   that has no term of its own.
/// - **Ordering:** `order` is a list of `{column, dir}` directives indexing
///   into `columns`; the first directive is the primary sort key.
/// - **Paging:** `start` is the row offset, `length` the page size. A
///   `length` of zero or below falls back to the configured default.
/// - **Echo token:** `draw` is opaque and echoed back verbatim so clients
///   can discard stale, out-of-order responses. It is never interpreted.
/// - **Column typing:** `dataColumns` optionally carries a JSON-encoded
///   [`ColumnDescriptor`](crate::ColumnDescriptor) list declaring each
///   column's type and default operator.
///
/// Search terms may lead with a bracket operator, for example `[!=]5` or
/// `[%]widget`; see [`parse_operator`](crate::parse_operator).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GridRequest {
    /// Declared columns, in display order.
    #[serde(default)]
    pub columns: Vec<ColumnClause>,
    /// Global search input, substituted into searchable columns without a
    /// term of their own.
    #[serde(default)]
    pub search: SearchInput,
    /// Ordering directives in priority order.
    #[serde(default)]
    pub order: Vec<OrderDirective>,
    /// Row offset of the requested page. Applied only when positive.
    #[serde(default)]
    pub start: i64,
    /// Page size. Zero or negative means "use the configured default".
    #[serde(default)]
    pub length: i64,
    /// Opaque draw token, echoed back verbatim.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub draw: serde_json::Value,
    /// JSON-encoded column descriptor list.
    #[serde(rename = "dataColumns", default)]
    pub data_columns: Option<String>,
}

/// One declared column of a [`GridRequest`].
#[serde_as]
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ColumnClause {
    /// Field path the column displays, e.g. `p_name` for `p.name`.
    pub data: String,
    /// Whether the column participates in searching. The wire format sends
    /// the strings `"true"` / `"false"`; native booleans are accepted too.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "searchable_default")]
    pub searchable: bool,
    /// Column-specific search input.
    #[serde(default)]
    pub search: SearchInput,
}

impl ColumnClause {
    /// A searchable column clause without a search term of its own.
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            searchable: true,
            search: SearchInput::default(),
        }
    }
}

const fn searchable_default() -> bool {
    true
}

/// Search input wrapper, `{ "value": "..." }` on the wire.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SearchInput {
    /// Raw search text; surrounding whitespace is ignored.
    #[serde(default)]
    pub value: String,
}

impl SearchInput {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// One ordering directive, `{ "column": 0, "dir": "asc" }` on the wire.
///
/// `column` indexes into the request's `columns` list; a directive pointing
/// outside it is rejected as an invalid request.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct OrderDirective {
    /// Index into the declared column list.
    pub column: i64,
    /// Sort direction.
    #[serde(default)]
    pub dir: OrderDirection,
}

/// Sort direction of an [`OrderDirective`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub fn order(self) -> sea_orm::Order {
        match self {
            Self::Asc => sea_orm::Order::Asc,
            Self::Desc => sea_orm::Order::Desc,
        }
    }
}

/// The composed grid response.
///
/// `data` holds the page rows, `recordsFiltered` the number of rows the
/// compiled predicate matches, `recordsTotal` the unfiltered count, and
/// `draw` echoes the request token verbatim. The optional `additional` and
/// `redis` members are merged only when they carry content.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse<M> {
    pub data: Vec<M>,
    pub draw: serde_json::Value,
    pub records_filtered: u64,
    pub records_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<BTreeMap<String, HashMap<String, String>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_decodes_wire_shape() {
        let request: GridRequest = serde_json::from_value(json!({
            "columns": [
                {"data": "name", "searchable": "true", "search": {"value": "[%]widget"}},
                {"data": "stock", "searchable": "false", "search": {"value": ""}}
            ],
            "search": {"value": "global"},
            "order": [{"column": 0, "dir": "desc"}],
            "start": 40,
            "length": 20,
            "draw": 3
        }))
        .unwrap();

        assert_eq!(request.columns.len(), 2);
        assert!(request.columns[0].searchable);
        assert!(!request.columns[1].searchable);
        assert_eq!(request.columns[0].search.value, "[%]widget");
        assert_eq!(request.search.value, "global");
        assert_eq!(request.order[0].column, 0);
        assert_eq!(request.order[0].dir, OrderDirection::Desc);
        assert_eq!(request.start, 40);
        assert_eq!(request.length, 20);
        assert_eq!(request.draw, json!(3));
    }

    #[test]
    fn test_searchable_accepts_native_bool() {
        let clause: ColumnClause =
            serde_json::from_value(json!({"data": "name", "searchable": true})).unwrap();
        assert!(clause.searchable);
    }

    #[test]
    fn test_draw_token_is_opaque() {
        // Clients send numbers or strings; both round-trip untouched.
        let request: GridRequest = serde_json::from_value(json!({"draw": "7-abc"})).unwrap();
        assert_eq!(request.draw, json!("7-abc"));

        let request: GridRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.draw.is_null());
    }

    #[test]
    fn test_order_direction_aliases() {
        let directive: OrderDirective =
            serde_json::from_value(json!({"column": 1, "dir": "DESC"})).unwrap();
        assert_eq!(directive.dir, OrderDirection::Desc);

        let directive: OrderDirective = serde_json::from_value(json!({"column": 1})).unwrap();
        assert_eq!(directive.dir, OrderDirection::Asc);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = GridResponse::<i32> {
            data: vec![1, 2],
            draw: json!(9),
            records_filtered: 2,
            records_total: 5,
            additional: None,
            redis: None,
        };
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["recordsFiltered"], json!(2));
        assert_eq!(value["recordsTotal"], json!(5));
        assert_eq!(value["draw"], json!(9));
        assert!(value.get("additional").is_none());
        assert!(value.get("redis").is_none());
    }

    #[test]
    fn test_response_merges_additional_payload() {
        let response = GridResponse::<i32> {
            data: vec![],
            draw: serde_json::Value::Null,
            records_filtered: 0,
            records_total: 0,
            additional: Some(json!({"summary": {"open": 4}})),
            redis: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["additional"]["summary"]["open"], json!(4));
    }
}
