use serde_json::Value;
use sqlx::{
    pool::PoolConnection,
    postgres::{PgArguments, PgPoolOptions, PgRow},
    types::BigDecimal,
    Column, PgPool, Postgres, Row as _, TypeInfo,
};
use std::time::Duration;

use crate::{
    db::store::{ConnectionSource, Param, Query, Row, StoreConnection},
    error::StoreError,
};

/// Creates a PostgreSQL connection pool
///
/// Connections are established lazily so the process can start while the
/// database is still coming up; the executor's retry budget covers the gap.
pub fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url)?;

    Ok(pool)
}

/// Store backed by a Postgres pool; each acquire checks out its own connection
#[derive(Clone)]
pub struct PgConnectionSource {
    pool: PgPool,
}

impl PgConnectionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConnectionSource for PgConnectionSource {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let conn = self.pool.acquire().await.map_err(classify)?;
        Ok(Box::new(PgStoreConnection { conn }))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// A checked-out pool connection, returned to the pool on drop
pub struct PgStoreConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait::async_trait]
impl StoreConnection for PgStoreConnection {
    async fn fetch_all(&mut self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut statement = sqlx::query::<Postgres>(query.sql);
        for param in &query.params {
            statement = bind_param(statement, param);
        }

        let rows = statement.fetch_all(&mut *self.conn).await.map_err(classify)?;

        rows.iter().map(decode_row).collect()
    }
}

fn bind_param<'q>(
    statement: sqlx::query::Query<'q, Postgres, PgArguments>,
    param: &Param,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match param {
        Param::Text(value) => statement.bind(value.clone()),
        Param::Int(value) => statement.bind(*value),
    }
}

fn decode_row(row: &PgRow) -> Result<Row, StoreError> {
    let mut decoded = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        let value = match column.type_info().name() {
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row
                .try_get::<Option<String>, _>(index)
                .map(|v| v.map(Value::String)),
            "INT2" => row
                .try_get::<Option<i16>, _>(index)
                .map(|v| v.map(Value::from)),
            "INT4" => row
                .try_get::<Option<i32>, _>(index)
                .map(|v| v.map(Value::from)),
            "INT8" => row
                .try_get::<Option<i64>, _>(index)
                .map(|v| v.map(Value::from)),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(index)
                .map(|v| v.map(|f| Value::from(f as f64))),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(index)
                .map(|v| v.map(Value::from)),
            "NUMERIC" => row
                .try_get::<Option<BigDecimal>, _>(index)
                .map(|v| v.map(|d| Value::String(d.to_string()))),
            "BOOL" => row
                .try_get::<Option<bool>, _>(index)
                .map(|v| v.map(Value::Bool)),
            other => {
                return Err(StoreError::Permanent(format!(
                    "unsupported column type {} for {}",
                    other,
                    column.name()
                )))
            }
        }
        .map_err(classify)?;

        decoded.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }

    Ok(decoded)
}

/// Sorts sqlx failures into retryable and fatal
pub fn classify(error: sqlx::Error) -> StoreError {
    let transient = match &error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| is_transient_sqlstate(&code))
            .unwrap_or(false),
        _ => false,
    };

    if transient {
        StoreError::Transient(error.to_string())
    } else {
        StoreError::Permanent(error.to_string())
    }
}

// Connection exceptions, serialization/deadlock aborts, operator shutdowns
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code == "40001" || code == "40P01" || code.starts_with("57P0")
}
