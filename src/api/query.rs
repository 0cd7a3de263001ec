//! Query string and search query builders
//!
//! Collection endpoints accept `limit`, `offset`, `fields`, `sort`, `q`,
//! `count` and `expandLevel`. The `q` parameter carries an OData-like
//! filter built from a fixed operator vocabulary.

use std::fmt;

use url::form_urlencoded;

/// Query options for collection and single-record reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub fields: Option<Vec<String>>,
    pub sort: Option<String>,
    pub q: Option<String>,
    pub count: bool,
    pub expand_level: Option<String>,
}

impl QueryOptions {
    /// Options that only set a page window
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..Default::default()
        }
    }

    /// Build the `?`-prefixed query string, or an empty string if nothing is set
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut any = false;

        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
            any = true;
        }

        if let Some(offset) = self.offset {
            serializer.append_pair("offset", &offset.to_string());
            any = true;
        }

        if let Some(ref fields) = self.fields {
            serializer.append_pair("fields", &fields.join(","));
            any = true;
        }

        if let Some(ref sort) = self.sort {
            serializer.append_pair("sort", sort);
            any = true;
        }

        if let Some(ref q) = self.q {
            serializer.append_pair("q", q);
            any = true;
        }

        if self.count {
            serializer.append_pair("count", "true");
            any = true;
        }

        if let Some(ref level) = self.expand_level {
            serializer.append_pair("expandLevel", level);
            any = true;
        }

        if any {
            format!("?{}", serializer.finish())
        } else {
            String::new()
        }
    }
}

/// Filter operators understood by the `q` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Like,
    Gte,
    Lte,
    In,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Like => "like",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal on the right-hand side of a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Quotes inside text literals are doubled
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Decimal(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::List(values) => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "({})", rendered.join(","))
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One `FIELD op value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Ordered set of conditions, joined with `and` when rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    conditions: Vec<Condition>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, FilterOperator::Eq, value)
    }

    pub fn like(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.with(field, FilterOperator::Like, FilterValue::Text(pattern.into()))
    }

    /// `like` with the value wrapped in `%` wildcards
    pub fn contains(self, field: impl Into<String>, text: &str) -> Self {
        self.like(field, format!("%{}%", text))
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, FilterOperator::Gte, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, FilterOperator::Lte, value)
    }

    pub fn is_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let list = FilterValue::List(values.into_iter().map(Into::into).collect());
        self.with(field, FilterOperator::In, list)
    }

    /// Inclusive range: `gte` on `from` and `lte` on `to`
    pub fn between(
        self,
        field: impl Into<String>,
        from: impl Into<FilterValue>,
        to: impl Into<FilterValue>,
    ) -> Self {
        let field = field.into();
        self.gte(field.clone(), from).lte(field, to)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render the filter expression, `None` when there are no conditions
    pub fn to_filter(&self) -> Option<String> {
        if self.conditions.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        Some(parts.join(" and "))
    }
}

/// Merge a criteria filter into `options.q`
///
/// An existing `q` is kept in front of the criteria filter.
pub fn build_search_query(criteria: &SearchCriteria, options: &QueryOptions) -> QueryOptions {
    let mut merged = options.clone();
    if let Some(filter) = criteria.to_filter() {
        merged.q = Some(match options.q.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{} and {}", existing, filter),
            _ => filter,
        });
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_options_empty() {
        let options = QueryOptions::default();
        assert_eq!(options.to_query_string(), "");
    }

    #[test]
    fn test_query_options_full() {
        let options = QueryOptions {
            limit: Some(10),
            offset: Some(20),
            fields: Some(vec!["CODE".to_string(), "NAME".to_string()]),
            sort: Some("CODE".to_string()),
            q: Some("CODE eq 'A'".to_string()),
            count: true,
            expand_level: Some("full".to_string()),
        };

        assert_eq!(
            options.to_query_string(),
            "?limit=10&offset=20&fields=CODE%2CNAME&sort=CODE&q=CODE+eq+%27A%27&count=true&expandLevel=full"
        );
    }

    #[test]
    fn test_count_false_is_omitted() {
        let options = QueryOptions {
            limit: Some(5),
            count: false,
            ..Default::default()
        };
        assert_eq!(options.to_query_string(), "?limit=5");
    }

    #[test]
    fn test_page() {
        assert_eq!(QueryOptions::page(50, 100).to_query_string(), "?limit=50&offset=100");
    }

    #[test]
    fn test_filter_values() {
        assert_eq!(FilterValue::from("ABC").to_string(), "'ABC'");
        assert_eq!(FilterValue::from("O'Neil").to_string(), "'O''Neil'");
        assert_eq!(FilterValue::from(42).to_string(), "42");
        assert_eq!(FilterValue::from(1.5).to_string(), "1.5");
        assert_eq!(FilterValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_criteria_rendering() {
        let criteria = SearchCriteria::new()
            .eq("CODE", "B-01")
            .like("NAME", "Ak%")
            .gte("DATE", "2024-01-01")
            .lte("TOTAL", 1000)
            .is_in("STATUS", [1, 4]);

        assert_eq!(
            criteria.to_filter().as_deref(),
            Some("CODE eq 'B-01' and NAME like 'Ak%' and DATE gte '2024-01-01' and TOTAL lte 1000 and STATUS in (1,4)")
        );
    }

    #[test]
    fn test_contains_and_between() {
        let criteria = SearchCriteria::new()
            .contains("TITLE", "ltd")
            .between("DATE", "2024-01-01", "2024-12-31");

        assert_eq!(
            criteria.to_filter().as_deref(),
            Some("TITLE like '%ltd%' and DATE gte '2024-01-01' and DATE lte '2024-12-31'")
        );
    }

    #[test]
    fn test_empty_criteria() {
        let criteria = SearchCriteria::new();
        assert!(criteria.is_empty());
        assert_eq!(criteria.to_filter(), None);

        let options = QueryOptions {
            limit: Some(3),
            ..Default::default()
        };
        assert_eq!(build_search_query(&criteria, &options), options);
    }

    #[test]
    fn test_build_search_query_merges_existing_q() {
        let criteria = SearchCriteria::new().eq("CODE", "X");
        let options = QueryOptions {
            q: Some("ACTIVE eq 0".to_string()),
            limit: Some(1),
            ..Default::default()
        };

        let merged = build_search_query(&criteria, &options);
        assert_eq!(merged.q.as_deref(), Some("ACTIVE eq 0 and CODE eq 'X'"));
        assert_eq!(merged.limit, Some(1));
    }
}
