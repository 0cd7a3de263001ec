//! Bank credits (`bankCredits`)

use crate::api::{LogoError, Transport};
use crate::resources::models::BankCredit;
use crate::resources::resource::ResourceClient;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const RESOURCE: &str = "bankCredits";

/// Client for bank credit cards and their payment plans
#[derive(Clone)]
pub struct BankCreditsClient {
    transport: Arc<dyn Transport>,
}

impl BankCreditsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Rebuild the payment plan from the credit's current terms
    pub async fn re_calculate(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/ReCalculate/{}", RESOURCE, id);
        self.transport.request(Method::POST, &path, None).await
    }

    pub async fn payment_plan(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/PaymentPlan/{}", RESOURCE, id);
        self.transport.request(Method::GET, &path, None).await
    }

    pub async fn export_to_xml(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/ExportToXML/{}", RESOURCE, id);
        self.transport.request(Method::GET, &path, None).await
    }

    /// Import one or more credits from a Logo XML document
    pub async fn import_from_xml(&self, xml: &str) -> Result<Value, LogoError> {
        let path = format!("{}/ImportFromXML", RESOURCE);
        let body = Value::String(xml.to_string());
        self.transport.request(Method::POST, &path, Some(&body)).await
    }

    /// Close the credit as of `date` (`YYYY-MM-DD`)
    pub async fn close(&self, id: i64, date: &str) -> Result<Value, LogoError> {
        let path = format!("{}/Close/{}/{}", RESOURCE, id, date);
        self.transport.request(Method::POST, &path, None).await
    }
}

#[async_trait]
impl ResourceClient for BankCreditsClient {
    type Record = BankCredit;

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn resource_path(&self) -> &str {
        RESOURCE
    }
}
