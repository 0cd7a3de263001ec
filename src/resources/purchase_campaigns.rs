//! Purchase campaigns (`purchaseCampaigns`)

use crate::api::{LogoError, QueryOptions, SearchCriteria, Transport};
use crate::resources::models::{ListResponse, PurchaseCampaign};
use crate::resources::resource::ResourceClient;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const RESOURCE: &str = "purchaseCampaigns";

#[derive(Clone)]
pub struct PurchaseCampaignsClient {
    transport: Arc<dyn Transport>,
}

impl PurchaseCampaignsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Apply a campaign to an existing purchase order
    pub async fn apply_campaign(
        &self,
        campaign_ref: i64,
        order_ref: i64,
    ) -> Result<Value, LogoError> {
        let path = format!("{}/ApplyCampaign/{}/{}", RESOURCE, campaign_ref, order_ref);
        self.transport.request(Method::POST, &path, None).await
    }

    pub async fn activate(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/Activate/{}", RESOURCE, id);
        self.transport.request(Method::POST, &path, None).await
    }

    pub async fn deactivate(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/Deactivate/{}", RESOURCE, id);
        self.transport.request(Method::POST, &path, None).await
    }

    /// Duplicate a campaign under a new code
    pub async fn copy(&self, id: i64, new_code: &str) -> Result<Value, LogoError> {
        let path = format!("{}/Copy/{}/{}", RESOURCE, id, new_code);
        self.transport.request(Method::POST, &path, None).await
    }

    pub async fn export_to_xml(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/ExportToXML/{}", RESOURCE, id);
        self.transport.request(Method::GET, &path, None).await
    }

    /// Campaigns whose validity window contains `date`
    pub async fn active_on(
        &self,
        date: &str,
        options: &QueryOptions,
    ) -> Result<ListResponse<PurchaseCampaign>, LogoError> {
        let criteria = SearchCriteria::new()
            .lte("BEG_DATE", date)
            .gte("END_DATE", date);
        self.search(&criteria, options).await
    }
}

#[async_trait]
impl ResourceClient for PurchaseCampaignsClient {
    type Record = PurchaseCampaign;

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn resource_path(&self) -> &str {
        RESOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::mock::RecordingTransport;
    use serde_json::json;

    fn client(transport: &Arc<RecordingTransport>) -> PurchaseCampaignsClient {
        PurchaseCampaignsClient::new(transport.clone())
    }

    #[tokio::test]
    async fn test_apply_campaign_path() {
        let transport = Arc::new(RecordingTransport::new().respond_with(json!({"applied": true})));

        let result = client(&transport).apply_campaign(12, 340).await.unwrap();

        let call = transport.last_call();
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.path, "purchaseCampaigns/ApplyCampaign/12/340");
        assert_eq!(call.body, None);
        assert_eq!(result, json!({"applied": true}));
    }

    #[tokio::test]
    async fn test_state_and_copy_endpoints() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client(&transport);

        client.activate(5).await.unwrap();
        client.deactivate(5).await.unwrap();
        client.copy(5, "KIS25").await.unwrap();
        client.export_to_xml(5).await.unwrap();

        let paths: Vec<String> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            vec![
                "purchaseCampaigns/Activate/5",
                "purchaseCampaigns/Deactivate/5",
                "purchaseCampaigns/Copy/5/KIS25",
                "purchaseCampaigns/ExportToXML/5",
            ]
        );
        assert_eq!(transport.calls()[3].method, Method::GET);
    }

    #[tokio::test]
    async fn test_active_on() {
        let transport = Arc::new(RecordingTransport::new().respond_with(json!({
            "items": [{"CODE": "YAZ24", "ACTIVE": 0}]
        })));

        let list = client(&transport)
            .active_on("2024-07-01", &QueryOptions::default())
            .await
            .unwrap();

        assert_eq!(
            transport.last_call().path,
            "purchaseCampaigns?q=BEG_DATE+lte+%272024-07-01%27+and+END_DATE+gte+%272024-07-01%27"
        );
        assert_eq!(list.items[0].code.as_deref(), Some("YAZ24"));
    }

    #[tokio::test]
    async fn test_update_uses_put() {
        let transport = Arc::new(RecordingTransport::new().respond_with(json!({"CODE": "YAZ24"})));
        let campaign = PurchaseCampaign {
            code: Some("YAZ24".to_string()),
            ..Default::default()
        };

        client(&transport).update(7, &campaign).await.unwrap();

        let call = transport.last_call();
        assert_eq!(call.method, Method::PUT);
        assert_eq!(call.path, "purchaseCampaigns/7");
        assert_eq!(call.body, Some(json!({"CODE": "YAZ24"})));
    }
}
