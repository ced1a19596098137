//! List-query engine: field filters, pagination and sorting.
//!
//! List endpoints accept an open-ended set of `<field>.<op>=<value>` query
//! parameters (for example `/api/cards?id.greaterThan=5&title.contains=bug`)
//! next to the reserved `page`, `size` and `sort` keys. Filters are parsed
//! into typed criteria per entity and compiled to SQL conditions with bound
//! values; the same conditions back both the page query and the total count.

mod criteria;

pub use criteria::*;

use std::fmt::Display;
use std::str::FromStr;

use crate::errors::AppError;

/// Default page size when the request does not carry `size`.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound for the `size` parameter.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Query parameters reserved for pagination and sorting.
const RESERVED_PARAMS: [&str; 3] = ["page", "size", "sort"];

/// A value bound into a SQL condition.
#[derive(Debug, Clone)]
pub(crate) enum SqlValue {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

/// One SQL condition plus its bound values, combined with AND by the caller.
#[derive(Debug, Clone)]
pub(crate) struct Condition {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

impl Condition {
    fn new(sql: impl Into<String>) -> Self {
        Condition {
            sql: sql.into(),
            binds: Vec::new(),
        }
    }

    fn bind(sql: impl Into<String>, value: SqlValue) -> Self {
        Condition {
            sql: sql.into(),
            binds: vec![value],
        }
    }
}

/// Base filter supporting equality, membership and null checks.
#[derive(Debug, Clone, Default)]
pub struct Filter<T> {
    pub equals: Option<T>,
    pub not_equals: Option<T>,
    pub is_in: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    pub specified: Option<bool>,
}

impl<T> Filter<T>
where
    T: FromStr,
    T::Err: Display,
{
    /// Apply one `<op>=<value>` pair. `Err` carries a message without field
    /// context; callers add the field name.
    fn set(&mut self, op: &str, raw: &str) -> Result<(), String> {
        match op {
            "equals" => self.equals = Some(parse_value(raw)?),
            "notEquals" => self.not_equals = Some(parse_value(raw)?),
            "in" => self.is_in.get_or_insert_with(Vec::new).extend(parse_list(raw)?),
            "notIn" => self.not_in.get_or_insert_with(Vec::new).extend(parse_list(raw)?),
            "specified" => {
                self.specified = Some(
                    raw.parse::<bool>()
                        .map_err(|_| format!("expected true or false, got '{}'", raw))?,
                )
            }
            _ => return Err(format!("unsupported operation '{}'", op)),
        }
        Ok(())
    }
}

impl<T: Clone + Into<SqlValue>> Filter<T> {
    fn is_empty(&self) -> bool {
        self.equals.is_none()
            && self.not_equals.is_none()
            && self.is_in.is_none()
            && self.not_in.is_none()
            && self.specified.is_none()
    }

    fn conditions(&self, column: &str, out: &mut Vec<Condition>) {
        if let Some(v) = &self.equals {
            out.push(Condition::bind(format!("{} = ?", column), v.clone().into()));
        }
        if let Some(v) = &self.not_equals {
            out.push(Condition::bind(format!("{} <> ?", column), v.clone().into()));
        }
        if let Some(vs) = &self.is_in {
            out.push(in_condition(column, "IN", vs));
        }
        if let Some(vs) = &self.not_in {
            out.push(in_condition(column, "NOT IN", vs));
        }
        if let Some(specified) = self.specified {
            if specified {
                out.push(Condition::new(format!("{} IS NOT NULL", column)));
            } else {
                out.push(Condition::new(format!("{} IS NULL", column)));
            }
        }
    }
}

fn in_condition<T: Clone + Into<SqlValue>>(column: &str, op: &str, values: &[T]) -> Condition {
    let placeholders = vec!["?"; values.len().max(1)].join(", ");
    Condition {
        sql: format!("{} {} ({})", column, op, placeholders),
        binds: if values.is_empty() {
            // IN () is invalid SQL; an empty list matches nothing.
            vec![SqlValue::Int(i64::MIN)]
        } else {
            values.iter().cloned().map(Into::into).collect()
        },
    }
}

/// Filter for ordered values, adding range comparisons to [`Filter`].
#[derive(Debug, Clone, Default)]
pub struct RangeFilter<T> {
    pub filter: Filter<T>,
    pub greater_than: Option<T>,
    pub less_than: Option<T>,
    pub greater_than_or_equal: Option<T>,
    pub less_than_or_equal: Option<T>,
}

impl<T> RangeFilter<T>
where
    T: FromStr,
    T::Err: Display,
{
    pub(crate) fn set(&mut self, op: &str, raw: &str) -> Result<(), String> {
        match op {
            "greaterThan" => self.greater_than = Some(parse_value(raw)?),
            "lessThan" => self.less_than = Some(parse_value(raw)?),
            "greaterThanOrEqual" => self.greater_than_or_equal = Some(parse_value(raw)?),
            "lessThanOrEqual" => self.less_than_or_equal = Some(parse_value(raw)?),
            _ => return self.filter.set(op, raw),
        }
        Ok(())
    }
}

impl<T: Clone + Into<SqlValue>> RangeFilter<T> {
    pub(crate) fn is_empty(&self) -> bool {
        self.filter.is_empty()
            && self.greater_than.is_none()
            && self.less_than.is_none()
            && self.greater_than_or_equal.is_none()
            && self.less_than_or_equal.is_none()
    }

    pub(crate) fn conditions(&self, column: &str, out: &mut Vec<Condition>) {
        self.filter.conditions(column, out);
        if let Some(v) = &self.greater_than {
            out.push(Condition::bind(format!("{} > ?", column), v.clone().into()));
        }
        if let Some(v) = &self.less_than {
            out.push(Condition::bind(format!("{} < ?", column), v.clone().into()));
        }
        if let Some(v) = &self.greater_than_or_equal {
            out.push(Condition::bind(format!("{} >= ?", column), v.clone().into()));
        }
        if let Some(v) = &self.less_than_or_equal {
            out.push(Condition::bind(format!("{} <= ?", column), v.clone().into()));
        }
    }
}

/// Filter for text values, adding substring matching to [`Filter`].
#[derive(Debug, Clone, Default)]
pub struct StringFilter {
    pub filter: Filter<String>,
    pub contains: Option<String>,
    pub does_not_contain: Option<String>,
}

impl StringFilter {
    pub(crate) fn set(&mut self, op: &str, raw: &str) -> Result<(), String> {
        match op {
            "contains" => self.contains = Some(raw.to_string()),
            "doesNotContain" => self.does_not_contain = Some(raw.to_string()),
            _ => return self.filter.set(op, raw),
        }
        Ok(())
    }

    pub(crate) fn conditions(&self, column: &str, out: &mut Vec<Condition>) {
        self.filter.conditions(column, out);
        if let Some(v) = &self.contains {
            out.push(Condition::bind(
                format!("{} LIKE ? ESCAPE '\\'", column),
                SqlValue::Text(format!("%{}%", like_escape(v))),
            ));
        }
        if let Some(v) = &self.does_not_contain {
            out.push(Condition::bind(
                format!("({} IS NULL OR {} NOT LIKE ? ESCAPE '\\')", column, column),
                SqlValue::Text(format!("%{}%", like_escape(v))),
            ));
        }
    }
}

fn like_escape(raw: &str) -> String {
    // The escape character itself must be escaped first.
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn parse_value<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| format!("invalid value '{}': {}", raw, e))
}

fn parse_list<T>(raw: &str) -> Result<Vec<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(parse_value)
        .collect()
}

/// One sort order, already mapped to a database column.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOrder {
    pub column: String,
    pub ascending: bool,
}

/// Pagination and sorting extracted from the reserved query parameters.
///
/// `page` is 0-based on the wire. Sort fields are validated against the
/// per-entity whitelist of sortable fields, so the resulting columns are safe
/// to splice into an ORDER BY clause.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn from_params(
        params: &[(String, String)],
        sortable: &[(&str, &str)],
    ) -> Result<Self, AppError> {
        let mut page = 0i64;
        let mut size = DEFAULT_PAGE_SIZE;
        let mut sort = Vec::new();

        for (key, value) in params {
            match key.as_str() {
                "page" => {
                    page = value.parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid page parameter '{}'", value))
                    })?;
                    if page < 0 {
                        return Err(AppError::BadRequest(
                            "Page index must not be negative".to_string(),
                        ));
                    }
                }
                "size" => {
                    size = value.parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid size parameter '{}'", value))
                    })?;
                    if !(1..=MAX_PAGE_SIZE).contains(&size) {
                        return Err(AppError::BadRequest(format!(
                            "Page size must be between 1 and {}",
                            MAX_PAGE_SIZE
                        )));
                    }
                }
                "sort" => sort.push(parse_sort(value, sortable)?),
                _ => {}
            }
        }

        Ok(PageRequest { page, size, sort })
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }

    /// ORDER BY clause, or the empty string when no sort was requested.
    pub fn order_by(&self) -> String {
        if self.sort.is_empty() {
            return String::new();
        }
        let orders: Vec<String> = self
            .sort
            .iter()
            .map(|s| {
                format!(
                    "{} {}",
                    s.column,
                    if s.ascending { "ASC" } else { "DESC" }
                )
            })
            .collect();
        format!(" ORDER BY {}", orders.join(", "))
    }
}

/// Parse one `"<field>,<ASC|DESC>"` sort value against a whitelist mapping
/// wire field names to columns. The direction defaults to ascending.
fn parse_sort(value: &str, sortable: &[(&str, &str)]) -> Result<SortOrder, AppError> {
    let (field, direction) = match value.split_once(',') {
        Some((f, d)) => (f, d),
        None => (value, "asc"),
    };

    let column = sortable
        .iter()
        .find(|(wire, _)| *wire == field)
        .map(|(_, column)| column.to_string())
        .ok_or_else(|| AppError::BadRequest(format!("Cannot sort by '{}'", field)))?;

    let ascending = match direction.to_ascii_lowercase().as_str() {
        "asc" => true,
        "desc" => false,
        other => {
            return Err(AppError::BadRequest(format!(
                "Invalid sort direction '{}'",
                other
            )))
        }
    };

    Ok(SortOrder { column, ascending })
}

/// Split the non-reserved query parameters into `(field, op, value)` triples.
fn filter_params(
    params: &[(String, String)],
) -> Result<Vec<(&str, &str, &str)>, AppError> {
    let mut triples = Vec::new();
    for (key, value) in params {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        match key.split_once('.') {
            Some((field, op)) => triples.push((field, op, value.as_str())),
            None => {
                return Err(AppError::BadRequest(format!(
                    "Unknown query parameter '{}'",
                    key
                )))
            }
        }
    }
    Ok(triples)
}
