use calendar_types::Category;

use crate::error::StoreError;

/// Row filter for reads against the events table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub category: Option<Category>,
    pub limit: Option<u32>,
}

impl EventQuery {
    pub fn all() -> Self {
        Self::default()
    }

    /// Bounded read used to probe whether the table exists.
    pub fn probe() -> Self {
        Self {
            category: None,
            limit: Some(1),
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs in PostgREST syntax. Rows come back ordered by
    /// date, then creation time, so "first event" is stable.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "date.asc,created_at.asc".to_string()),
        ];
        if let Some(category) = self.category {
            params.push(("category", format!("eq.{}", category)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// Query-string pairs for an exact count, optionally filtered.
pub fn count_params(category: Option<Category>) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "id".to_string())];
    if let Some(category) = category {
        params.push(("category", format!("eq.{}", category)));
    }
    params
}

/// Total from a `Content-Range` header such as `0-5/6` or `*/0`.
pub fn parse_content_range(header: &str) -> Result<u64, StoreError> {
    let (_, total) = header
        .rsplit_once('/')
        .ok_or_else(|| StoreError::Decode(format!("malformed Content-Range: {:?}", header)))?;

    total
        .trim()
        .parse::<u64>()
        .map_err(|_| StoreError::Decode(format!("Content-Range has no exact total: {:?}", header)))
}
