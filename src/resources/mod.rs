//! Resource clients
//!
//! One client per REST resource, all sharing a single transport.

mod arps;
mod bank_credits;
mod items;
pub mod models;
mod purchase_campaigns;
mod resource;
mod sales_offers;

pub use arps::ArpsClient;
pub use bank_credits::BankCreditsClient;
pub use items::ItemsClient;
pub use models::{
    Arp, BankCredit, BankCreditPayment, CampaignLine, ChildList, Item, Link, ListResponse,
    PurchaseCampaign, SalesOffer, SalesOfferLine,
};
pub use purchase_campaigns::PurchaseCampaignsClient;
pub use resource::{EntityClient, ResourceClient, DEFAULT_PAGE_SIZE};
pub use sales_offers::SalesOffersClient;

use crate::api::Transport;
use std::sync::Arc;

/// Entry point handing out resource clients over one transport
#[derive(Clone)]
pub struct LogoObjects {
    transport: Arc<dyn Transport>,
}

impl LogoObjects {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn bank_credits(&self) -> BankCreditsClient {
        BankCreditsClient::new(self.transport())
    }

    pub fn purchase_campaigns(&self) -> PurchaseCampaignsClient {
        PurchaseCampaignsClient::new(self.transport())
    }

    pub fn sales_offers(&self) -> SalesOffersClient {
        SalesOffersClient::new(self.transport())
    }

    pub fn items(&self) -> ItemsClient {
        ItemsClient::new(self.transport())
    }

    pub fn arps(&self) -> ArpsClient {
        ArpsClient::new(self.transport())
    }

    /// Untyped client for a resource without a dedicated wrapper
    pub fn entity(&self, path: &str) -> EntityClient {
        EntityClient::new(self.transport(), path)
    }
}
