use serde::Serialize;

use super::error::QueryError;
use super::types::{OrderByItem, SortDirection};

/// Parsed sort directive, e.g. `name,-createdAt` or `name asc, id desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderByQuery {
    pub items: Vec<OrderByItem>,
}

impl OrderByQuery {
    pub fn from_raw(raw: &str) -> Result<Self, QueryError> {
        let mut items = Vec::new();
        for part in raw.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            items.push(Self::parse_item(trimmed)?);
        }
        Ok(Self { items })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn parse_item(s: &str) -> Result<OrderByItem, QueryError> {
        let mut it = s.split_whitespace();
        let col = it.next().unwrap_or_default();
        let (field, mut direction) = match col.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (col, SortDirection::Asc),
        };
        Self::validate_field(field)?;

        if let Some(dir) = it.next() {
            direction = SortDirection::parse(dir)
                .ok_or_else(|| QueryError::InvalidSort(format!("unknown direction '{}' for {}", dir, field)))?;
        }
        if let Some(extra) = it.next() {
            return Err(QueryError::InvalidSort(format!("unexpected token '{}' in '{}'", extra, s)));
        }

        Ok(OrderByItem { field: field.to_string(), direction })
    }

    fn validate_field(field: &str) -> Result<(), QueryError> {
        if field.is_empty() {
            return Err(QueryError::InvalidSort("sort field cannot be empty".to_string()));
        }
        if !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(QueryError::InvalidSort(format!("invalid sort field: {}", field)));
        }
        Ok(())
    }
}
