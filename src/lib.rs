//! Logo Objects REST client
//!
//! Typed bindings for the Logo Objects ERP REST API: one client per
//! resource with CRUD, OData-style search and the resource's RPC endpoints,
//! all delegating to a single authenticated transport.

pub mod api;
pub mod auth;
pub mod config;
pub mod resources;

pub use api::{
    build_search_query, FilterOperator, FilterValue, LogoClient, LogoError, QueryOptions,
    SearchCriteria, Transport,
};
pub use auth::{AuthError, Credentials, LogoAuth};
pub use config::{Config, ConfigError, RuntimeConfig};
pub use resources::{
    ArpsClient, BankCreditsClient, EntityClient, ItemsClient, ListResponse, LogoObjects,
    PurchaseCampaignsClient, ResourceClient, SalesOffersClient,
};
