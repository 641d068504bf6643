use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{AppError, AppResult, StoreError};

/// A bound query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Int(i64),
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

/// A parameterized statement plus the operation name used in logs
#[derive(Debug, Clone)]
pub struct Query {
    pub operation: &'static str,
    pub sql: &'static str,
    pub params: Vec<Param>,
}

impl Query {
    pub fn new(operation: &'static str, sql: &'static str) -> Self {
        Self {
            operation,
            sql,
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// A single result row: column name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(HashMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: String, value: Value) {
        self.0.insert(column, value);
    }

    /// Text column; a missing or non-text value is a schema mismatch
    pub fn text(&self, column: &str) -> AppResult<String> {
        match self.0.get(column) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(AppError::Internal(format!(
                "column {} expected text, found {:?}",
                column, other
            ))),
        }
    }

    /// Nullable numeric column
    pub fn number(&self, column: &str) -> AppResult<Option<f64>> {
        match self.0.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) => s.parse::<f64>().map(Some).map_err(|_| {
                AppError::Internal(format!("column {} is not numeric: {}", column, s))
            }),
            Some(other) => Err(AppError::Internal(format!(
                "column {} expected number, found {}",
                column, other
            ))),
        }
    }
}

/// An open store connection; released when dropped
#[async_trait::async_trait]
pub trait StoreConnection: Send {
    /// Run the statement to completion and return every row
    async fn fetch_all(&mut self, query: &Query) -> Result<Vec<Row>, StoreError>;
}

/// Hands out fresh connections, one per query attempt
#[async_trait::async_trait]
pub trait ConnectionSource: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
