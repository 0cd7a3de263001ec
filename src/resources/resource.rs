//! Generic CRUD and search endpoints shared by every resource

use crate::api::{build_search_query, LogoError, QueryOptions, SearchCriteria, Transport};
use crate::resources::models::ListResponse;
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Page size used by [`ResourceClient::get_all_pages`] when none is given
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Convert a transport response into a typed record
pub(crate) fn parse_response<T: DeserializeOwned>(value: Value) -> Result<T, LogoError> {
    serde_json::from_value(value)
        .map_err(|e| LogoError::Parse(format!("Failed to parse response: {}", e)))
}

/// A client bound to one REST resource
///
/// Implementors provide the transport and the resource path; the CRUD and
/// search endpoints come for free.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    type Record: Serialize + DeserializeOwned + Send + Sync;

    fn transport(&self) -> &dyn Transport;

    /// Resource path relative to the API root, e.g. `bankCredits`
    fn resource_path(&self) -> &str;

    /// Field matched by [`ResourceClient::search_by_code`]
    fn code_field(&self) -> &str {
        "CODE"
    }

    /// `GET /{resource}`
    async fn get_all(
        &self,
        options: &QueryOptions,
    ) -> Result<ListResponse<Self::Record>, LogoError> {
        let path = format!("{}{}", self.resource_path(), options.to_query_string());
        let value = self.transport().request(Method::GET, &path, None).await?;
        parse_response(value)
    }

    /// `GET /{resource}/{id}`
    async fn get_by_id(&self, id: i64, options: &QueryOptions) -> Result<Self::Record, LogoError> {
        let path = format!(
            "{}/{}{}",
            self.resource_path(),
            id,
            options.to_query_string()
        );
        let value = self.transport().request(Method::GET, &path, None).await?;
        parse_response(value)
    }

    /// `POST /{resource}`
    async fn create(&self, record: &Self::Record) -> Result<Self::Record, LogoError> {
        let body = serde_json::to_value(record)?;
        let value = self
            .transport()
            .request(Method::POST, self.resource_path(), Some(&body))
            .await?;
        parse_response(value)
    }

    /// `PUT /{resource}/{id}`
    async fn update(&self, id: i64, record: &Self::Record) -> Result<Self::Record, LogoError> {
        let body = serde_json::to_value(record)?;
        let path = format!("{}/{}", self.resource_path(), id);
        let value = self
            .transport()
            .request(Method::PUT, &path, Some(&body))
            .await?;
        parse_response(value)
    }

    /// `PATCH /{resource}/{id}` with a partial body
    async fn patch(&self, id: i64, changes: &Value) -> Result<Value, LogoError> {
        let path = format!("{}/{}", self.resource_path(), id);
        self.transport()
            .request(Method::PATCH, &path, Some(changes))
            .await
    }

    /// `DELETE /{resource}/{id}`
    async fn delete(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/{}", self.resource_path(), id);
        self.transport().request(Method::DELETE, &path, None).await
    }

    /// `GET /{resource}` filtered by `criteria`
    async fn search(
        &self,
        criteria: &SearchCriteria,
        options: &QueryOptions,
    ) -> Result<ListResponse<Self::Record>, LogoError> {
        self.get_all(&build_search_query(criteria, options)).await
    }

    /// First record whose code equals `code`
    async fn search_by_code(&self, code: &str) -> Result<Option<Self::Record>, LogoError> {
        let criteria = SearchCriteria::new().eq(self.code_field(), code);
        let options = QueryOptions {
            limit: Some(1),
            ..Default::default()
        };
        let list = self.search(&criteria, &options).await?;
        Ok(list.items.into_iter().next())
    }

    /// Records with `field` inside the inclusive `from..=to` range
    async fn search_by_date_range(
        &self,
        field: &str,
        from: &str,
        to: &str,
        options: &QueryOptions,
    ) -> Result<ListResponse<Self::Record>, LogoError> {
        let criteria = SearchCriteria::new().between(field, from, to);
        self.search(&criteria, options).await
    }

    /// Fetch several records concurrently; fails if any read fails
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Self::Record>, LogoError> {
        let options = QueryOptions::default();
        try_join_all(ids.iter().map(|id| self.get_by_id(*id, &options))).await
    }

    /// Walk `limit`/`offset` pages until a short page comes back
    async fn get_all_pages(&self, options: &QueryOptions) -> Result<Vec<Self::Record>, LogoError> {
        let limit = options.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        let mut page_options = options.clone();
        page_options.limit = Some(limit);
        page_options.offset = Some(options.offset.unwrap_or(0));

        let mut records = Vec::new();
        let mut page = 0;

        loop {
            page += 1;
            let list = self.get_all(&page_options).await?;
            let fetched = list.items.len();

            tracing::debug!("{} page {}: fetched {} records", self.resource_path(), page, fetched);
            records.extend(list.items);

            if fetched < limit as usize {
                break;
            }
            match page_options.offset.and_then(|o| o.checked_add(limit)) {
                Some(next) => page_options.offset = Some(next),
                None => {
                    tracing::warn!("{}: offset overflow, stopping", self.resource_path());
                    break;
                }
            }
        }

        tracing::info!("{}: fetched {} records in total", self.resource_path(), records.len());
        Ok(records)
    }
}

/// Untyped client for any resource path
#[derive(Clone)]
pub struct EntityClient {
    transport: Arc<dyn Transport>,
    path: String,
}

impl EntityClient {
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into().trim_matches('/').to_string(),
        }
    }

    /// Call an RPC-style endpoint below this resource, e.g. `ReCalculate/5`
    pub async fn call(
        &self,
        method: Method,
        action: &str,
        body: Option<&Value>,
    ) -> Result<Value, LogoError> {
        let path = format!("{}/{}", self.path, action.trim_start_matches('/'));
        self.transport.request(method, &path, body).await
    }
}

#[async_trait]
impl ResourceClient for EntityClient {
    type Record = Value;

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn resource_path(&self) -> &str {
        &self.path
    }
}
