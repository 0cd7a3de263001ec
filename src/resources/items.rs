//! Material cards (`items`)

use crate::api::{LogoError, Transport};
use crate::resources::models::Item;
use crate::resources::resource::ResourceClient;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const RESOURCE: &str = "items";

#[derive(Clone)]
pub struct ItemsClient {
    transport: Arc<dyn Transport>,
}

impl ItemsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// On-hand quantity of an item in one warehouse
    pub async fn stock(&self, id: i64, warehouse: i32) -> Result<Value, LogoError> {
        let path = format!("{}/GetStock/{}/{}", RESOURCE, id, warehouse);
        self.transport.request(Method::GET, &path, None).await
    }

    pub async fn price(&self, id: i64, price_type: i32) -> Result<Value, LogoError> {
        let path = format!("{}/GetPrice/{}/{}", RESOURCE, id, price_type);
        self.transport.request(Method::GET, &path, None).await
    }
}

#[async_trait]
impl ResourceClient for ItemsClient {
    type Record = Item;

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn resource_path(&self) -> &str {
        RESOURCE
    }
}
