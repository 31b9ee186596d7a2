//! The grid query builder: one compiled predicate, three query shapes,
//! one composed response.

use async_trait::async_trait;
use axum::Json;
use sea_orm::{
    Condition, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, Select,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::catalog::{ColumnCatalog, IndexColumn};
use crate::errors::GridError;
use crate::filtering::{SearchMode, compile_condition, resolve_ordering};
use crate::models::{GridRequest, GridResponse};
use crate::query::{
    DEFAULT_LIMIT, ZeroLengthPolicy, apply_ordering, apply_paging, count_select, fetch_count,
    filtered_select,
};

/// Key-value side-channel capability used to enrich responses.
///
/// The core never embeds storage logic; callers inject whatever lookup
/// their deployment uses. Keys are only fetched after a positive
/// existence check.
#[async_trait]
pub trait KeyValueLookup: Send + Sync {
    /// Whether `key` exists in the store.
    async fn exists(&self, key: &str) -> Result<bool, GridError>;

    /// Fetch the full mapping stored under `key`.
    async fn fetch_all(&self, key: &str) -> Result<HashMap<String, String>, GridError>;
}

/// Builds and executes the three query shapes of a grid request against a
/// base select, then composes the response.
///
/// The base select carries whatever joins and static conditions the caller
/// wants every shape to share; the builder clones it per shape and never
/// mutates it.
///
/// ```rust,ignore
/// let response = GridQueryBuilder::new(products::Entity::find())
///     .with_index_column(IndexColumn::field("id"))
///     .with_additional(serde_json::json!({"currency": "EUR"}))
///     .respond(&db, &request)
///     .await?;
/// ```
pub struct GridQueryBuilder<E: EntityTrait> {
    base: Select<E>,
    catalog: Option<ColumnCatalog>,
    index_column: IndexColumn,
    search_mode: SearchMode,
    zero_length_policy: ZeroLengthPolicy,
    default_limit: u64,
    active_sentinel: String,
    additional: Option<serde_json::Value>,
    side_channel_keys: Vec<String>,
}

impl<E: EntityTrait> GridQueryBuilder<E> {
    #[must_use]
    pub fn new(base: Select<E>) -> Self {
        Self {
            base,
            catalog: None,
            index_column: IndexColumn::All,
            search_mode: SearchMode::Substitute,
            zero_length_policy: ZeroLengthPolicy::DefaultLimit,
            default_limit: DEFAULT_LIMIT,
            active_sentinel: "active".to_string(),
            additional: None,
            side_channel_keys: Vec::new(),
        }
    }

    /// Use this catalog instead of the request's `dataColumns` payload.
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<ColumnCatalog>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Aggregate counts over this column instead of `COUNT(*)`.
    #[must_use]
    pub fn with_index_column(mut self, index_column: IndexColumn) -> Self {
        self.index_column = index_column;
        self
    }

    /// Select how the global search term combines with per-column terms.
    #[must_use]
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Select what a `length` of zero means.
    #[must_use]
    pub fn with_zero_length_policy(mut self, policy: ZeroLengthPolicy) -> Self {
        self.zero_length_policy = policy;
        self
    }

    /// Page size used when the request has no positive `length`.
    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Search text treated as "true" on boolean columns.
    #[must_use]
    pub fn with_active_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.active_sentinel = sentinel.into();
        self
    }

    /// Extra payload merged into the response as `additional` when it
    /// carries content.
    #[must_use]
    pub fn with_additional(mut self, payload: serde_json::Value) -> Self {
        self.additional = Some(payload);
        self
    }

    /// Side-channel keys fetched through the injected lookup and merged
    /// into the response as `redis`.
    #[must_use]
    pub fn with_side_channel<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.side_channel_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    fn catalog_for(&self, request: &GridRequest) -> Result<ColumnCatalog, GridError> {
        if let Some(catalog) = &self.catalog {
            return Ok(catalog.clone());
        }
        match &request.data_columns {
            Some(payload) => ColumnCatalog::from_data_columns(payload),
            None => Ok(ColumnCatalog::default()),
        }
    }

    /// Compile the request's search side into one condition group.
    ///
    /// # Errors
    ///
    /// Fails when the request carries an undecodable `dataColumns` payload.
    pub fn condition(
        &self,
        request: &GridRequest,
        backend: DatabaseBackend,
    ) -> Result<Condition, GridError> {
        let catalog = self.catalog_for(request)?;
        Ok(compile_condition(
            request,
            &catalog,
            self.search_mode,
            backend,
            &self.active_sentinel,
        ))
    }

    /// The base select narrowed by the compiled condition, without
    /// ordering or paging.
    ///
    /// # Errors
    ///
    /// Fails when the request carries an undecodable `dataColumns` payload.
    pub fn filtered_query(
        &self,
        request: &GridRequest,
        backend: DatabaseBackend,
    ) -> Result<Select<E>, GridError> {
        let condition = self.condition(request, backend)?;
        Ok(filtered_select(self.base.clone(), &condition))
    }

    /// The paged-data query shape: condition, ordering and paging applied.
    ///
    /// # Errors
    ///
    /// Fails on an undecodable `dataColumns` payload or an order directive
    /// outside the declared column list.
    pub fn page_query(
        &self,
        request: &GridRequest,
        backend: DatabaseBackend,
    ) -> Result<Select<E>, GridError> {
        let catalog = self.catalog_for(request)?;
        let select = self.filtered_query(request, backend)?;
        let select = apply_ordering(select, resolve_ordering(request, &catalog)?);
        Ok(apply_paging(
            select,
            request.start,
            request.length,
            self.zero_length_policy,
            self.default_limit,
        ))
    }

    /// The filtered-count query shape.
    ///
    /// # Errors
    ///
    /// Fails when the request carries an undecodable `dataColumns` payload.
    pub fn filtered_count_query(
        &self,
        request: &GridRequest,
        backend: DatabaseBackend,
    ) -> Result<Select<E>, GridError> {
        let condition = self.condition(request, backend)?;
        Ok(count_select(
            self.base.clone(),
            Some(&condition),
            &self.index_column,
        ))
    }

    /// The total-count query shape, untouched by any search input.
    #[must_use]
    pub fn total_count_query(&self) -> Select<E> {
        count_select(self.base.clone(), None, &self.index_column)
    }

    /// Execute the paged-data query.
    ///
    /// # Errors
    ///
    /// Request compilation failures and backend failures, as
    /// [`GridError`].
    pub async fn fetch_page(
        &self,
        db: &DatabaseConnection,
        request: &GridRequest,
    ) -> Result<Vec<E::Model>, GridError> {
        self.page_query(request, db.get_database_backend())?
            .all(db)
            .await
            .map_err(GridError::backend)
    }

    /// Execute the filtered-count query.
    ///
    /// # Errors
    ///
    /// Request compilation failures, backend failures and ambiguous
    /// aggregates, as [`GridError`].
    pub async fn records_filtered(
        &self,
        db: &DatabaseConnection,
        request: &GridRequest,
    ) -> Result<u64, GridError> {
        let select = self.filtered_count_query(request, db.get_database_backend())?;
        fetch_count(select, db).await
    }

    /// Execute the total-count query.
    ///
    /// # Errors
    ///
    /// Backend failures and ambiguous aggregates, as [`GridError`].
    pub async fn records_total(&self, db: &DatabaseConnection) -> Result<u64, GridError> {
        fetch_count(self.total_count_query(), db).await
    }

    /// Execute all three query shapes and compose the response.
    ///
    /// The shapes run concurrently and all must succeed; a failure on any
    /// aborts the whole response. Nothing is retried here.
    ///
    /// # Errors
    ///
    /// Request compilation failures, backend failures and ambiguous
    /// aggregates, as [`GridError`].
    pub async fn respond(
        &self,
        db: &DatabaseConnection,
        request: &GridRequest,
    ) -> Result<GridResponse<E::Model>, GridError> {
        let (data, records_filtered, records_total) = futures::try_join!(
            self.fetch_page(db, request),
            self.records_filtered(db, request),
            self.records_total(db),
        )?;

        Ok(GridResponse {
            data,
            draw: request.draw.clone(),
            records_filtered,
            records_total,
            additional: self.additional.clone().filter(has_content),
            redis: None,
        })
    }

    /// [`respond`](Self::respond), then enrich the response with the
    /// configured side-channel keys through `lookup`. Missing keys are
    /// skipped; the `redis` member only appears when at least one key
    /// resolved.
    ///
    /// # Errors
    ///
    /// Everything [`respond`](Self::respond) raises, plus side-channel
    /// failures as [`GridError::SideChannel`].
    pub async fn respond_with_side_channel<K>(
        &self,
        db: &DatabaseConnection,
        request: &GridRequest,
        lookup: &K,
    ) -> Result<GridResponse<E::Model>, GridError>
    where
        K: KeyValueLookup + ?Sized,
    {
        let mut response = self.respond(db, request).await?;

        let mut resolved = BTreeMap::new();
        for key in &self.side_channel_keys {
            if lookup.exists(key).await? {
                resolved.insert(key.clone(), lookup.fetch_all(key).await?);
            }
        }
        if !resolved.is_empty() {
            response.redis = Some(resolved);
        }

        Ok(response)
    }

    /// Execute and wrap the composed response for an Axum handler.
    ///
    /// # Errors
    ///
    /// Everything [`respond`](Self::respond) raises.
    pub async fn json_response(
        &self,
        db: &DatabaseConnection,
        request: &GridRequest,
    ) -> Result<Json<GridResponse<E::Model>>, GridError>
    where
        E::Model: Serialize,
    {
        Ok(Json(self.respond(db, request).await?))
    }
}

fn has_content(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
