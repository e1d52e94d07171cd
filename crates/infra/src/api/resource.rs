//! Table-driven resource client

use std::marker::PhantomData;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{self, ResourceDef, Route};
use super::client::ApiClient;
use super::errors::ApiError;
use super::uri::{FindOptions, GetOptions, Params};

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPage<T> {
    #[serde(default = "Vec::new")]
    pub item: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub records_per_page: u32,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub embed: Option<Value>,
}

impl<T> CollectionPage<T> {
    /// Number of pages at the current page size
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.records_per_page == 0 {
            return 0;
        }
        self.total_records.div_ceil(u64::from(self.records_per_page))
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

/// CRUD client for one catalog entry
///
/// Route variables that belong to the collection itself (`schemaName`,
/// `parentId`, ...) are bound with [`with_param`](Self::with_param) and
/// applied to every request.
pub struct ResourceClient<T> {
    api: ApiClient,
    route: Route,
    params: Params,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            route: self.route.clone(),
            params: self.params.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for ResourceClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("route", &self.route.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> ResourceClient<T> {
    #[must_use]
    pub fn new(api: ApiClient, def: &ResourceDef) -> Self {
        Self::from_route(api, def.route())
    }

    /// Client for a catalog entry by name
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` for unknown names.
    pub fn named(api: ApiClient, name: &str) -> Result<Self, ApiError> {
        Ok(Self::new(api, catalog::lookup(name)?))
    }

    fn from_route(api: ApiClient, route: Route) -> Self {
        Self { api, route, params: Params::new(), _marker: PhantomData }
    }

    /// Bind a route variable for all requests made by this client
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name, value);
        self
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// List items
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the request.
    pub async fn find(&self, options: &FindOptions) -> Result<CollectionPage<T>, ApiError> {
        let route = self.route.find_template().expand(&self.params.clone().merged(&options.to_params()));
        self.api.get(&route).await
    }

    /// Fetch one item
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` for unknown ids, otherwise as [`find`](Self::find).
    pub async fn get(&self, id: &str, options: &GetOptions) -> Result<T, ApiError> {
        let params = self.params.clone().with("id", id).merged(&options.to_params());
        self.api.get(&self.route.get_template().expand(&params)).await
    }

    /// Create an item
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the request.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T, ApiError> {
        self.api.post(&self.route.create_template().expand(&self.params), body).await
    }

    /// Replace an item
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the request.
    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<T, ApiError> {
        let params = self.params.clone().with("id", id);
        self.api.put(&self.route.item_template().expand(&params), body).await
    }

    /// Delete an item; any response body is ignored
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the request.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let params = self.params.clone().with("id", id);
        let _: Option<IgnoredAny> = self.api.delete(&self.route.item_template().expand(&params)).await?;
        Ok(())
    }

    /// Client for a nested collection of item `parent_id`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` when this resource has no such subresource
    /// or is itself nested.
    pub fn subresource<U: DeserializeOwned>(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<ResourceClient<U>, ApiError> {
        let def = catalog::lookup(&self.route.name)?;
        let route = def.subresource(name)?;
        let mut client = ResourceClient::from_route(self.api.clone(), route);
        client.params = self.params.clone().with("parentId", parent_id);
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_envelope() {
        let page: CollectionPage<Value> = serde_json::from_str(
            r#"{"item":[{"id":"a"},{"id":"b"}],"page":1,"recordsPerPage":2,"totalRecords":5,"embed":"tags"}"#,
        )
        .unwrap();

        assert_eq!(page.item.len(), 2);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert_eq!(page.embed, Some(Value::String("tags".into())));
    }

    #[test]
    fn test_empty_envelope() {
        let page: CollectionPage<Value> = serde_json::from_str("{}").unwrap();
        assert!(page.item.is_empty());
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }
}
