//! Record types
//!
//! Records mirror the upstream tables: upper-case field names, every
//! scalar optional, child tables nested as `{ "items": [...] }`. Fields the
//! types do not name are kept in `extra` so nothing is lost on a round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `{ "href": ... }` link object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: Option<String>,
}

/// Collection envelope returned by `GET /{resource}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(rename = "Meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Link>,

    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    #[serde(rename = "totalCount", default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
}

/// Nested child table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ChildList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> From<Vec<T>> for ChildList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// `BANKCREDITS` header record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BankCredit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bankacc_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curr_type: Option<i32>,
    #[serde(rename = "BANK_CRE_PAYMENT_LIST", skip_serializing_if = "Option::is_none")]
    pub payment_list: Option<ChildList<BankCreditPayment>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of `BANK_CRE_PAYMENT_LIST`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BankCreditPayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bsmv_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `PURCHCAMPAIGN` header record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PurchaseCampaign {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beg_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_lines: Option<ChildList<CampaignLine>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of `CAMPAIGN_LINES`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CampaignLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `STFICHE`-style sales offer header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SalesOffer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arp_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_no: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_discounted: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_vat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_net: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curr_trans: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<ChildList<SalesOfferLine>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of a sales offer's `TRANSACTIONS`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SalesOfferLine {
    #[serde(rename = "TYPE", skip_serializing_if = "Option::is_none")]
    pub line_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `ITEMS` card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unitset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxil_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `ARPS` (customer/vendor) card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Arp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_office: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_mail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
