//! Sales offers (`salesOffers`)
//!
//! Offers are identified by document number rather than a card code, so
//! `search_by_code` matches on `NUMBER`.

use crate::api::{LogoError, QueryOptions, SearchCriteria, Transport};
use crate::resources::models::{ListResponse, SalesOffer};
use crate::resources::resource::ResourceClient;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const RESOURCE: &str = "salesOffers";

#[derive(Clone)]
pub struct SalesOffersClient {
    transport: Arc<dyn Transport>,
}

impl SalesOffersClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Apply matching sales campaigns to the offer lines
    pub async fn apply_campaign(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/ApplyCampaign/{}", RESOURCE, id);
        self.transport.request(Method::POST, &path, None).await
    }

    /// Recompute discounts, taxes and totals
    pub async fn re_calculate(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/ReCalculate/{}", RESOURCE, id);
        self.transport.request(Method::POST, &path, None).await
    }

    pub async fn convert_to_order(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/ConvertToOrder/{}", RESOURCE, id);
        self.transport.request(Method::POST, &path, None).await
    }

    pub async fn change_status(&self, id: i64, status: i32) -> Result<Value, LogoError> {
        let path = format!("{}/ChangeStatus/{}/{}", RESOURCE, id, status);
        self.transport.request(Method::POST, &path, None).await
    }

    /// Open a new revision of the offer
    pub async fn revise(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/Revise/{}", RESOURCE, id);
        self.transport.request(Method::POST, &path, None).await
    }

    pub async fn export_to_xml(&self, id: i64) -> Result<Value, LogoError> {
        let path = format!("{}/ExportToXML/{}", RESOURCE, id);
        self.transport.request(Method::GET, &path, None).await
    }

    pub async fn search_by_customer(
        &self,
        arp_code: &str,
        options: &QueryOptions,
    ) -> Result<ListResponse<SalesOffer>, LogoError> {
        let criteria = SearchCriteria::new().eq("ARP_CODE", arp_code);
        self.search(&criteria, options).await
    }
}

#[async_trait]
impl ResourceClient for SalesOffersClient {
    type Record = SalesOffer;

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn resource_path(&self) -> &str {
        RESOURCE
    }

    fn code_field(&self) -> &str {
        "NUMBER"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::mock::RecordingTransport;
    use serde_json::json;

    fn client(transport: &Arc<RecordingTransport>) -> SalesOffersClient {
        SalesOffersClient::new(transport.clone())
    }

    #[tokio::test]
    async fn test_rpc_endpoints() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client(&transport);

        client.apply_campaign(21).await.unwrap();
        client.re_calculate(21).await.unwrap();
        client.convert_to_order(21).await.unwrap();
        client.change_status(21, 4).await.unwrap();
        client.revise(21).await.unwrap();
        client.export_to_xml(21).await.unwrap();

        let calls: Vec<(Method, String)> = transport
            .calls()
            .into_iter()
            .map(|c| (c.method, c.path))
            .collect();
        assert_eq!(
            calls,
            vec![
                (Method::POST, "salesOffers/ApplyCampaign/21".to_string()),
                (Method::POST, "salesOffers/ReCalculate/21".to_string()),
                (Method::POST, "salesOffers/ConvertToOrder/21".to_string()),
                (Method::POST, "salesOffers/ChangeStatus/21/4".to_string()),
                (Method::POST, "salesOffers/Revise/21".to_string()),
                (Method::GET, "salesOffers/ExportToXML/21".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_convert_to_order_returns_transport_value() {
        let reply = json!({"ORDER_REFERENCE": 991, "NUMBER": "SIP-0001"});
        let transport = Arc::new(RecordingTransport::new().respond_with(reply.clone()));

        let result = client(&transport).convert_to_order(3).await.unwrap();
        assert_eq!(result, reply);
    }

    #[tokio::test]
    async fn test_search_by_code_uses_number() {
        let transport = Arc::new(RecordingTransport::new().respond_with(json!({
            "items": [{"NUMBER": "TKL-7", "TOTAL_NET": 1180.0}]
        })));

        let offer = client(&transport).search_by_code("TKL-7").await.unwrap().unwrap();

        assert_eq!(transport.last_call().path, "salesOffers?limit=1&q=NUMBER+eq+%27TKL-7%27");
        assert_eq!(offer.total_net, Some(1180.0));
    }

    #[tokio::test]
    async fn test_search_by_customer() {
        let transport = Arc::new(RecordingTransport::new().respond_with(json!({"items": []})));

        let options = QueryOptions {
            sort: Some("-DATE".to_string()),
            ..Default::default()
        };
        client(&transport)
            .search_by_customer("120.01.001", &options)
            .await
            .unwrap();

        assert_eq!(
            transport.last_call().path,
            "salesOffers?sort=-DATE&q=ARP_CODE+eq+%27120.01.001%27"
        );
    }

    #[tokio::test]
    async fn test_get_all_with_fields_and_count() {
        let transport = Arc::new(RecordingTransport::new().respond_with(json!({
            "items": [{"NUMBER": "TKL-1"}, {"NUMBER": "TKL-2"}],
            "totalCount": 2
        })));

        let options = QueryOptions {
            fields: Some(vec!["NUMBER".to_string(), "DATE".to_string()]),
            count: true,
            ..Default::default()
        };
        let list = client(&transport).get_all(&options).await.unwrap();

        assert_eq!(
            transport.last_call().path,
            "salesOffers?fields=NUMBER%2CDATE&count=true"
        );
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.total_count, Some(2));
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let transport = Arc::new(
            RecordingTransport::new().fail_with(LogoError::NotFound("offer 5".to_string())),
        );
        let err = client(&transport).re_calculate(5).await.unwrap_err();
        assert!(matches!(err, LogoError::NotFound(ref msg) if msg == "offer 5"));
    }
}
