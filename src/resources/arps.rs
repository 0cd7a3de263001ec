//! Customer and vendor accounts (`Arps`)

use crate::api::{LogoError, Transport};
use crate::resources::models::Arp;
use crate::resources::resource::ResourceClient;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const RESOURCE: &str = "Arps";

#[derive(Clone)]
pub struct ArpsClient {
    transport: Arc<dyn Transport>,
}

impl ArpsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn balance(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/GetBalance/{}", RESOURCE, id);
        self.transport.request(Method::GET, &path, None).await
    }

    pub async fn risk_info(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/GetRiskInfo/{}", RESOURCE, id);
        self.transport.request(Method::GET, &path, None).await
    }
}

#[async_trait]
impl ResourceClient for ArpsClient {
    type Record = Arp;

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn resource_path(&self) -> &str {
        RESOURCE
    }
}
