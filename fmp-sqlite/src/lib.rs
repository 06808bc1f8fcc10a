//! fmp-sqlite
//!
//! [`Persistence`] backed by a SQLite database through `sqlx`.
//!
//! Each table is written in a single transaction. Column types are inferred
//! from the non-null values of each column: all integers (or booleans) give
//! `INTEGER`, any other numeric mix gives `REAL`, everything else `TEXT`.
//! Nested arrays and objects are stored as JSON text.
#![warn(missing_docs)]

use std::path::Path;

use async_trait::async_trait;
use fmp_core::{FmpError, Persistence, Record, Table, value_to_text};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};

/// How a write treats an existing table of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Drop and recreate the table.
    #[default]
    Replace,
    /// Keep existing rows, adding any new columns.
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }

    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Integer),
            Value::Number(n) if n.is_i64() => Some(Self::Integer),
            Value::Number(_) => Some(Self::Real),
            _ => Some(Self::Text),
        }
    }

    const fn widen(self, other: Self) -> Self {
        match (self, other) {
            (Self::Text, _) | (_, Self::Text) => Self::Text,
            (Self::Real, _) | (_, Self::Real) => Self::Real,
            _ => Self::Integer,
        }
    }
}

fn infer_type(table: &Table, column: &str) -> ColumnType {
    table
        .column(column)
        .flatten()
        .filter_map(ColumnType::of)
        .reduce(ColumnType::widen)
        .unwrap_or(ColumnType::Text)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn db_err(e: sqlx::Error) -> FmpError {
    FmpError::Persistence(e.to_string())
}

/// SQLite store. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    mode: WriteMode,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path`.
    ///
    /// # Errors
    /// Returns `Persistence` if the database cannot be opened.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, FmpError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(db_err)?;
        Ok(Self::from_pool(pool))
    }

    /// Private in-memory database on a single connection.
    ///
    /// # Errors
    /// Returns `Persistence` if the connection cannot be opened.
    pub async fn memory() -> Result<Self, FmpError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_err)?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool using [`WriteMode::Replace`].
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            mode: WriteMode::default(),
        }
    }

    /// Switch write mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Active write mode.
    #[must_use]
    pub const fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Names of user tables, sorted.
    ///
    /// # Errors
    /// Returns `Persistence` on query failure.
    pub async fn table_names(&self) -> Result<Vec<String>, FmpError> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter()
            .map(|r| r.try_get::<String, _>("name").map_err(db_err))
            .collect()
    }

    /// Read a stored table back, rows in insertion order.
    ///
    /// # Errors
    /// Returns `Persistence` if the table does not exist or cannot be read.
    pub async fn read_table(&self, table_name: &str) -> Result<Table, FmpError> {
        let sql = format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table_name));
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()
            .map(Table::from_records)
    }

    async fn existing_columns(
        conn: &mut sqlx::SqliteConnection,
        table_name: &str,
    ) -> Result<Vec<String>, FmpError> {
        let rows = sqlx::query("SELECT name FROM pragma_table_info(?)")
            .bind(table_name)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err)?;
        rows.iter()
            .map(|r| r.try_get::<String, _>("name").map_err(db_err))
            .collect()
    }
}

fn row_to_record(row: &SqliteRow) -> Result<Record, FmpError> {
    let mut rec = Map::new();
    for col in row.columns() {
        let i = col.ordinal();
        let raw = row.try_get_raw(i).map_err(db_err)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(i).map_err(db_err)?),
                "REAL" => Value::from(row.try_get::<f64, _>(i).map_err(db_err)?),
                _ => Value::from(row.try_get::<String, _>(i).map_err(db_err)?),
            }
        };
        rec.insert(col.name().to_string(), value);
    }
    Ok(rec)
}

#[async_trait]
impl Persistence for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "fmp_sqlite::write_table",
            skip(self, table),
            fields(rows = table.len(), mode = ?self.mode),
            err,
        )
    )]
    async fn write_table(&self, table_name: &str, table: &Table) -> Result<(), FmpError> {
        if table.is_empty() {
            return Ok(());
        }
        if table_name.is_empty() {
            return Err(FmpError::InvalidArg("table name must not be empty".into()));
        }
        let ident = quote_ident(table_name);
        let typed: Vec<(&String, ColumnType)> = table
            .columns()
            .iter()
            .map(|c| (c, infer_type(table, c)))
            .collect();
        let defs = typed
            .iter()
            .map(|(c, t)| format!("{} {}", quote_ident(c), t.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        match self.mode {
            WriteMode::Replace => {
                sqlx::query(&format!("DROP TABLE IF EXISTS {ident}"))
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                sqlx::query(&format!("CREATE TABLE {ident} ({defs})"))
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
            }
            WriteMode::Append => {
                sqlx::query(&format!("CREATE TABLE IF NOT EXISTS {ident} ({defs})"))
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                let existing = Self::existing_columns(&mut *tx, table_name).await?;
                for (c, t) in typed.iter().filter(|(c, _)| !existing.contains(c)) {
                    sqlx::query(&format!(
                        "ALTER TABLE {ident} ADD COLUMN {} {}",
                        quote_ident(c),
                        t.as_sql()
                    ))
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                }
            }
        }

        let cols = table
            .columns()
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let marks = vec!["?"; table.columns().len()].join(", ");
        let insert = format!("INSERT INTO {ident} ({cols}) VALUES ({marks})");

        for row in table.rows() {
            let mut q = sqlx::query(&insert);
            for c in table.columns() {
                q = match row.get(c) {
                    None | Some(Value::Null) => q.bind(None::<String>),
                    Some(Value::Bool(b)) => q.bind(i64::from(*b)),
                    Some(Value::Number(n)) => match n.as_i64() {
                        Some(i) => q.bind(i),
                        None => q.bind(n.as_f64()),
                    },
                    Some(Value::String(s)) => q.bind(s.clone()),
                    Some(other) => q.bind(value_to_text(other)),
                };
            }
            q.execute(&mut *tx).await.map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(table = table_name, rows = table.len(), "table written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(v: Value) -> Table {
        Table::from_payload(v).unwrap()
    }

    #[test]
    fn type_inference_widens() {
        let t = table(json!([
            {"i": 1, "r": 1, "s": "x", "n": null, "b": true},
            {"i": 2, "r": 1.5, "s": 3, "n": null, "b": false}
        ]));
        assert_eq!(infer_type(&t, "i"), ColumnType::Integer);
        assert_eq!(infer_type(&t, "r"), ColumnType::Real);
        assert_eq!(infer_type(&t, "s"), ColumnType::Text);
        assert_eq!(infer_type(&t, "n"), ColumnType::Text);
        assert_eq!(infer_type(&t, "b"), ColumnType::Integer);
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
