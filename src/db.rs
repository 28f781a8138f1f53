//! SQLite database with Diesel ORM
//!
//! The persistence sink for normalized tables. Each write replaces the whole
//! table: drop, recreate with the declared columns, insert every row, all in
//! one transaction. Also reads tables and views back for the CLI and the
//! dashboard API, and runs the SQL scripts that define dashboard views.

use crate::schema::fitbit_sleep;
use crate::table::{ColumnSchema, NormalizedTable, Row, Value};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use diesel::sqlite::{Sqlite, SqliteConnection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const DEFAULT_DB_PATH: &str = "data/daylio.db";

// ============================================================================
// Diesel Models
// ============================================================================

/// Queryable summary of one stored sleep session
#[derive(Queryable, Selectable, Debug, Clone, Serialize)]
#[diesel(table_name = fitbit_sleep)]
pub struct SleepNight {
    pub date: String,
    pub sleep_type: String,
    pub start_time_ymdhm: String,
    pub end_time_ymdhm: String,
    pub duration_hhmmss: String,
    pub minutes_asleep: i64,
    pub efficiency: i64,
    pub main_sleep: bool,
}

/// A user table or view in the store
#[derive(QueryableByName, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub kind: String,
}

/// Rows of a table or view, in column order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewData {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

#[derive(QueryableByName)]
struct ColumnName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    row_json: String,
}

// ============================================================================
// Database Connection
// ============================================================================

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;
type BoxedInsert<'a> = BoxedSqlQuery<'a, Sqlite, SqlQuery>;

/// Database connection wrapper with connection pool
pub struct Database {
    pool: DbPool,
    path: PathBuf,
}

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] diesel::r2d2::Error),

    #[error("No table or view named '{0}'")]
    NotFound(String),

    #[error("Invalid table definition: {0}")]
    Schema(String),

    #[error("Script error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Double-quote an SQL identifier
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_value<'a>(query: BoxedInsert<'a>, value: &Value) -> BoxedInsert<'a> {
    match value {
        Value::Null => query.bind::<Nullable<Text>, _>(None::<String>),
        Value::Integer(i) => query.bind::<BigInt, _>(*i),
        Value::Boolean(b) => query.bind::<BigInt, _>(i64::from(*b)),
        Value::Real(f) => query.bind::<Double, _>(*f),
        Value::Text(_) | Value::Timestamp(_) | Value::Date(_) | Value::List(_) => {
            query.bind::<Text, _>(value.to_string())
        }
    }
}

impl Database {
    /// Open database at specified path, creating parent directories
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        debug!(path = %path.display(), "opened database");
        Ok(Self { pool, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(|e| DbError::Connection(e.to_string()))
    }

    // ========================================================================
    // Table Writes
    // ========================================================================

    /// Replace `table_name` with `rows`, persisting only `columns`, in order
    pub fn write(&self, table_name: &str, rows: &[Row], columns: &[ColumnSchema]) -> Result<usize> {
        if columns.is_empty() {
            return Err(DbError::Schema(format!("table '{}' declares no columns", table_name)));
        }

        let ident = quote_ident(table_name);
        let definitions: Vec<String> = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_type()))
            .collect();
        let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");

        let create = format!("CREATE TABLE {} ({})", ident, definitions.join(", "));
        let insert = format!("INSERT INTO {} ({}) VALUES ({})", ident, names.join(", "), placeholders);

        info!(table = table_name, rows = rows.len(), "writing table");

        let mut conn = self.get_conn()?;
        conn.transaction::<_, DbError, _>(|conn| {
            diesel::sql_query(format!("DROP TABLE IF EXISTS {}", ident)).execute(conn)?;
            diesel::sql_query(create.as_str()).execute(conn)?;

            for row in rows {
                let mut query = diesel::sql_query(insert.as_str()).into_boxed::<Sqlite>();
                for col in columns {
                    query = bind_value(query, row.get(&col.name).unwrap_or(&Value::Null));
                }
                query.execute(conn)?;
            }
            Ok(())
        })?;

        Ok(rows.len())
    }

    /// Replace the table named after `table` with its declared columns
    pub fn write_table(&self, table: &NormalizedTable) -> Result<usize> {
        self.write(&table.name, &table.rows, &table.columns)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// User tables and views, by name
    pub fn list_tables(&self) -> Result<Vec<StoredObject>> {
        let mut conn = self.get_conn()?;
        let objects = diesel::sql_query(
            "SELECT name, type AS kind FROM sqlite_master \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .load::<StoredObject>(&mut conn)?;
        Ok(objects)
    }

    /// Read a table or view; `limit` of `None` reads every row
    pub fn read_view(&self, name: &str, limit: Option<i64>) -> Result<ViewData> {
        if !self.list_tables()?.iter().any(|o| o.name == name) {
            return Err(DbError::NotFound(name.to_string()));
        }

        let mut conn = self.get_conn()?;
        let columns: Vec<String> = diesel::sql_query("SELECT name FROM pragma_table_info(?)")
            .bind::<Text, _>(name)
            .load::<ColumnName>(&mut conn)?
            .into_iter()
            .map(|c| c.name)
            .collect();

        let mut data = ViewData {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        };
        if data.columns.is_empty() {
            return Ok(data);
        }

        let selected: Vec<String> = data.columns.iter().map(|c| quote_ident(c)).collect();
        let sql = format!(
            "SELECT json_array({}) AS row_json FROM {} LIMIT ?",
            selected.join(", "),
            quote_ident(name)
        );
        let rows = diesel::sql_query(sql)
            .bind::<BigInt, _>(limit.unwrap_or(-1))
            .load::<JsonRow>(&mut conn)?;

        data.rows = rows
            .iter()
            .map(|r| serde_json::from_str(&r.row_json))
            .collect::<std::result::Result<_, _>>()?;
        Ok(data)
    }

    /// Most recent sleep sessions, newest first
    pub fn recent_sleep(&self, limit: i64) -> Result<Vec<SleepNight>> {
        let mut conn = self.get_conn()?;
        let nights = fitbit_sleep::table
            .select(SleepNight::as_select())
            .order(fitbit_sleep::start_time.desc())
            .limit(limit)
            .load(&mut conn)?;
        Ok(nights)
    }

    // ========================================================================
    // Scripts
    // ========================================================================

    /// Run one SQL script
    pub fn execute_script<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(script = %path.display(), "executing script");
        let sql = std::fs::read_to_string(path)?;
        let mut conn = self.get_conn()?;
        conn.batch_execute(&sql)?;
        Ok(())
    }

    /// Run every `.sql` file under `dir`, in path order; returns the count
    pub fn run_scripts<P: AsRef<Path>>(&self, dir: P) -> Result<usize> {
        let mut scripts: Vec<PathBuf> = WalkDir::new(dir.as_ref())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("sql"))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        scripts.sort();

        for script in &scripts {
            self.execute_script(script)?;
        }
        Ok(scripts.len())
    }
}
