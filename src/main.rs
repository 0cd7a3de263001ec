//! Logo Objects command line client
//!
//! Thin CLI over the resource clients. Results are printed as JSON on
//! stdout; logs go to stderr.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use logo_objects_client::api::{FilterValue, QueryOptions, SearchCriteria};
use logo_objects_client::{Config, LogoClient, LogoObjects, ResourceClient, Transport};
use reqwest::Method;
use serde_json::Value;
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "logo-objects", version, about = "Logo Objects REST API client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List records of a resource
    List {
        resource: String,
        #[command(flatten)]
        query: QueryArgs,
        /// Follow pages until the collection is exhausted
        #[arg(long)]
        all: bool,
    },
    /// Get one record by internal reference
    Get {
        resource: String,
        id: i64,
        #[arg(long)]
        expand_level: Option<String>,
    },
    /// Search a resource with filter conditions
    ///
    /// `FIELD=VALUE` compares against a quoted text literal; `FIELD:=VALUE`
    /// sends VALUE unquoted as a number.
    Search {
        resource: String,
        #[arg(long = "eq")]
        eq: Vec<String>,
        #[arg(long = "like")]
        like: Vec<String>,
        #[arg(long = "gte")]
        gte: Vec<String>,
        #[arg(long = "lte")]
        lte: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Delete one record by internal reference
    Delete { resource: String, id: i64 },
    /// Call any endpoint, e.g. `call POST salesOffers/ReCalculate/5`
    Call {
        method: String,
        path: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    offset: Option<u32>,
    /// Comma-separated field list
    #[arg(long)]
    fields: Option<String>,
    #[arg(long)]
    sort: Option<String>,
    /// Raw filter expression
    #[arg(long)]
    q: Option<String>,
    #[arg(long)]
    count: bool,
    #[arg(long)]
    expand_level: Option<String>,
}

impl QueryArgs {
    fn to_options(&self) -> QueryOptions {
        QueryOptions {
            limit: self.limit,
            offset: self.offset,
            fields: self
                .fields
                .as_ref()
                .map(|s| s.split(',').map(|f| f.trim().to_string()).collect()),
            sort: self.sort.clone(),
            q: self.q.clone(),
            count: self.count,
            expand_level: self.expand_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load_default()?;
    let runtime_config = config.to_runtime()?;

    tracing::info!(
        "Connecting to {} (firm {})",
        runtime_config.base_url,
        runtime_config.credentials.firm_no
    );

    let client = Arc::new(LogoClient::from_config(&runtime_config)?);
    let api = LogoObjects::new(client.clone());

    let result = run(&api, cli.command, runtime_config.page_size).await;

    if let Err(e) = client.revoke().await {
        tracing::warn!("Failed to revoke session: {}", e);
    }

    let value = result?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run(api: &LogoObjects, command: Command, page_size: u32) -> Result<Value> {
    match command {
        Command::List { resource, query, all } => {
            let client = api.entity(&resource);
            let mut options = query.to_options();
            if all {
                options.limit = options.limit.or(Some(page_size));
                let records = client.get_all_pages(&options).await?;
                Ok(Value::Array(records))
            } else {
                let list = client.get_all(&options).await?;
                Ok(serde_json::to_value(list)?)
            }
        }
        Command::Get {
            resource,
            id,
            expand_level,
        } => {
            let options = QueryOptions {
                expand_level,
                ..Default::default()
            };
            Ok(api.entity(&resource).get_by_id(id, &options).await?)
        }
        Command::Search {
            resource,
            eq,
            like,
            gte,
            lte,
            limit,
        } => {
            let criteria = build_criteria(&eq, &like, &gte, &lte)?;
            if criteria.is_empty() {
                return Err(anyhow!("search needs at least one --eq/--like/--gte/--lte"));
            }
            let options = QueryOptions {
                limit,
                ..Default::default()
            };
            let list = api.entity(&resource).search(&criteria, &options).await?;
            Ok(serde_json::to_value(list)?)
        }
        Command::Delete { resource, id } => Ok(api.entity(&resource).delete(id).await?),
        Command::Call { method, path, body } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method '{}'", method))?;
            let body = body
                .as_deref()
                .map(|raw| serde_json::from_str::<Value>(raw))
                .transpose()
                .context("--body is not valid JSON")?;
            let path = path.trim_start_matches('/');
            Ok(api.transport().request(method, path, body.as_ref()).await?)
        }
    }
}

fn build_criteria(
    eq: &[String],
    like: &[String],
    gte: &[String],
    lte: &[String],
) -> Result<SearchCriteria> {
    let mut criteria = SearchCriteria::new();
    for arg in eq {
        let (field, value) = parse_condition(arg)?;
        criteria = criteria.eq(field, value);
    }
    for arg in like {
        let (field, pattern) = split_condition(arg)?;
        criteria = criteria.like(field, pattern);
    }
    for arg in gte {
        let (field, value) = parse_condition(arg)?;
        criteria = criteria.gte(field, value);
    }
    for arg in lte {
        let (field, value) = parse_condition(arg)?;
        criteria = criteria.lte(field, value);
    }
    Ok(criteria)
}

fn split_condition(arg: &str) -> Result<(&str, &str)> {
    let (field, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{}'", arg))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(anyhow!("missing field name in '{}'", arg));
    }
    Ok((field, value))
}

/// Parse `FIELD=VALUE` as a text literal, or `FIELD:=VALUE` as a number
fn parse_condition(arg: &str) -> Result<(String, FilterValue)> {
    let (field, value) = split_condition(arg)?;
    match field.strip_suffix(':') {
        Some(field) => {
            let field = field.trim();
            if field.is_empty() {
                return Err(anyhow!("missing field name in '{}'", arg));
            }
            Ok((field.to_string(), parse_number(value)?))
        }
        None => Ok((field.to_string(), FilterValue::Text(value.to_string()))),
    }
}

fn parse_number(value: &str) -> Result<FilterValue> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Ok(FilterValue::Integer(n));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(FilterValue::Decimal)
        .ok_or_else(|| anyhow!("'{}' is not a number", value))
}
