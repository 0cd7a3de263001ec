//! API module
//!
//! Base client, the transport seam and the shared query builders.

pub mod client;
pub mod query;
pub mod transport;

pub use client::{LogoClient, LogoError};
pub use query::{
    build_search_query, Condition, FilterOperator, FilterValue, QueryOptions, SearchCriteria,
};
pub use transport::Transport;
