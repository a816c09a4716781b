// crates/data-lichen-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Metadata Store
// Description: Durable MetadataStore backed by SQLite.
// Purpose: Persist one row per unique identifier with full-row replace writes.
// Dependencies: data-lichen-core, rusqlite, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! This module implements a durable [`MetadataStore`] using `SQLite`. Records
//! live in the `metadata` table keyed by `uniqueIdentifier`; writes use
//! `REPLACE INTO` so a re-registration overwrites every column. Each write
//! also stamps a monotonically increasing revision in `metadata_revisions`,
//! and `publish_watermark` remembers the highest revision delivered by an
//! outbox publish. Columns are read with whatever storage class `SQLite` kept,
//! so scores written as reals, integers, or text all come back as stored
//! (column affinity may still turn `1` into `1.0` in a `REAL` column). A row
//! whose identifier is missing or unusable is skipped with a warning rather
//! than failing the whole read.
//!
//! A database created by an earlier deployment that only has the `metadata`
//! table is adopted in place; its rows are assigned revisions from `rowid`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use data_lichen_core::ChangeSet;
use data_lichen_core::FieldValue;
use data_lichen_core::MetadataRecord;
use data_lichen_core::MetadataStore;
use data_lichen_core::Revision;
use data_lichen_core::StoreError;
use data_lichen_core::UniqueIdentifier;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::types::Value;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
pub const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Column list shared by every `metadata` read.
const METADATA_COLUMNS: &str = "m.uniqueIdentifier, m.serviceName, m.serviceAddress, \
                                m.completeness, m.validity, m.accuracy, m.processingTime, \
                                m.actualTime, m.processingDuration";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` metadata store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `read_pool_size` must be greater than zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of read connections used for read path isolation.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
}

impl SqliteStoreConfig {
    /// Returns a configuration with defaults for the given database path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: default_read_pool_size(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    4
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding record payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row fails decoding.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store configuration or input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps a rusqlite error into a store database error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly with map_err.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed metadata store.
///
/// # Invariants
/// - Writes are serialized through one mutex-guarded connection.
/// - Each write commits the record row and its revision atomically.
/// - Reads rotate across a pool of connections.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared writer connection guarded by a mutex.
    write_connection: Arc<Mutex<Connection>>,
    /// Read connection pool.
    read_connections: Arc<Vec<Mutex<Connection>>>,
    /// Round-robin cursor for read connection selection.
    read_cursor: Arc<AtomicUsize>,
}

/// Raw `metadata` row prior to decoding; every column keeps its storage class.
struct MetadataRow {
    /// Stored identifier.
    unique_identifier: Value,
    /// Stored service name.
    service_name: Value,
    /// Stored service address.
    service_address: Value,
    /// Stored completeness.
    completeness: Value,
    /// Stored validity.
    validity: Value,
    /// Stored accuracy.
    accuracy: Value,
    /// Stored processing time.
    processing_time: Value,
    /// Stored actual time.
    actual_time: Value,
    /// Stored processing duration.
    processing_duration: Value,
}

impl SqliteMetadataStore {
    /// Opens an `SQLite`-backed metadata store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path or configuration is invalid,
    /// or the database cannot be opened or initialized.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        if config.read_pool_size == 0 {
            return Err(SqliteStoreError::Invalid(
                "read_pool_size must be greater than zero".to_string(),
            ));
        }
        ensure_parent_dir(&config.path)?;
        let mut write_connection = open_connection(&config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_connection(&config)?));
        }
        info!(
            path = %config.path.display(),
            journal_mode = config.journal_mode.pragma_value(),
            read_pool_size = config.read_pool_size,
            "opened sqlite metadata store"
        );
        Ok(Self {
            config,
            write_connection: Arc::new(Mutex::new(write_connection)),
            read_connections: Arc::new(read_connections),
            read_cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Inserts or fully replaces a record and returns its new revision.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the transaction fails; nothing is
    /// committed in that case.
    pub fn upsert_record(&self, record: &MetadataRecord) -> Result<Revision, SqliteStoreError> {
        let mut guard = self.lock_writer()?;
        let tx = guard.transaction().map_err(db_error)?;
        tx.execute(
            "REPLACE INTO metadata (uniqueIdentifier, serviceName, serviceAddress, completeness, \
             validity, accuracy, processingTime, actualTime, processingDuration) VALUES (?1, ?2, \
             ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.unique_identifier.as_str(),
                record.service_name.as_deref(),
                record.service_address.as_deref(),
                field_to_sql(record.completeness.as_ref()),
                field_to_sql(record.validity.as_ref()),
                field_to_sql(record.accuracy.as_ref()),
                record.processing_time.as_deref(),
                record.actual_time.as_deref(),
                record.processing_duration.as_deref(),
            ],
        )
        .map_err(db_error)?;
        let next: i64 = tx
            .query_row("SELECT COALESCE(MAX(revision), 0) + 1 FROM metadata_revisions", [], |row| {
                row.get(0)
            })
            .map_err(db_error)?;
        tx.execute(
            "INSERT INTO metadata_revisions (uniqueIdentifier, revision) VALUES (?1, ?2) ON \
             CONFLICT(uniqueIdentifier) DO UPDATE SET revision = excluded.revision",
            params![record.unique_identifier.as_str(), next],
        )
        .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        revision_from_sql(next)
    }

    /// Lists every stored record ordered by identifier.
    ///
    /// Rows without a usable identifier are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn list_records(&self) -> Result<Vec<MetadataRecord>, SqliteStoreError> {
        let guard = self.lock_reader()?;
        let mut stmt = guard
            .prepare(&format!("SELECT {METADATA_COLUMNS} FROM metadata m ORDER BY m.uniqueIdentifier"))
            .map_err(db_error)?;
        let rows = stmt
            .query_map([], map_metadata_row)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(stmt);
        drop(guard);
        Ok(rows.into_iter().filter_map(MetadataRow::into_record).collect())
    }

    /// Lists records whose last write is newer than `since`, oldest first.
    ///
    /// Skipped rows still advance the returned high watermark.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or a stored revision
    /// is negative.
    pub fn list_changes(&self, since: Revision) -> Result<ChangeSet, SqliteStoreError> {
        let since_sql = revision_to_sql(since)?;
        let guard = self.lock_reader()?;
        let mut stmt = guard
            .prepare(&format!(
                "SELECT {METADATA_COLUMNS}, r.revision FROM metadata m JOIN metadata_revisions r \
                 ON r.uniqueIdentifier = m.uniqueIdentifier WHERE r.revision > ?1 ORDER BY \
                 r.revision"
            ))
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![since_sql], |row| {
                let revision: i64 = row.get(9)?;
                Ok((revision, map_metadata_row(row)?))
            })
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(stmt);
        drop(guard);
        let mut high_watermark = since;
        let mut records = Vec::with_capacity(rows.len());
        for (revision, row) in rows {
            high_watermark = revision_from_sql(revision)?;
            records.extend(row.into_record());
        }
        Ok(ChangeSet {
            records,
            high_watermark,
        })
    }

    /// Returns the highest revision delivered by an outbox publish.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn load_watermark(&self) -> Result<Revision, SqliteStoreError> {
        let guard = self.lock_reader()?;
        let value: Option<i64> = guard
            .query_row("SELECT revision FROM publish_watermark WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(db_error)?;
        drop(guard);
        value.map_or(Ok(Revision::ZERO), revision_from_sql)
    }

    /// Raises the delivered watermark; lower values leave it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the update fails.
    pub fn store_watermark(&self, revision: Revision) -> Result<(), SqliteStoreError> {
        let value = revision_to_sql(revision)?;
        let guard = self.lock_writer()?;
        guard
            .execute(
                "INSERT INTO publish_watermark (id, revision) VALUES (1, ?1) ON CONFLICT(id) DO \
                 UPDATE SET revision = MAX(revision, excluded.revision)",
                params![value],
            )
            .map_err(db_error)?;
        drop(guard);
        debug!(revision = revision.get(), "publish watermark stored");
        Ok(())
    }

    /// Verifies both the reader and writer can execute a simple statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if a mutex is poisoned or a query fails.
    pub fn check_connection(&self) -> Result<(), SqliteStoreError> {
        {
            let guard = self.lock_reader()?;
            guard.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).map_err(db_error)?;
        }
        let guard = self.lock_writer()?;
        guard.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    /// Locks the writer connection.
    fn lock_writer(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))
    }

    /// Locks the next read connection using round-robin selection.
    fn lock_reader(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        let len = self.read_connections.len();
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % len;
        let Some(connection) = self.read_connections.get(index) else {
            return Err(SqliteStoreError::Io("sqlite read pool is empty".to_string()));
        };
        connection.lock().map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))
    }

    /// Runs a blocking store operation on the blocking thread pool.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Self) -> Result<T, SqliteStoreError> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|err| StoreError::Io(format!("sqlite worker failed: {err}")))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn upsert(&self, record: MetadataRecord) -> Result<(), StoreError> {
        let revision = self.run_blocking(move |store| store.upsert_record(&record)).await?;
        debug!(revision = revision.get(), "metadata row replaced");
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<MetadataRecord>, StoreError> {
        self.run_blocking(Self::list_records).await
    }

    async fn changes_since(&self, since: Revision) -> Result<ChangeSet, StoreError> {
        self.run_blocking(move |store| store.list_changes(since)).await
    }

    async fn published_watermark(&self) -> Result<Revision, StoreError> {
        self.run_blocking(Self::load_watermark).await
    }

    async fn advance_watermark(&self, revision: Revision) -> Result<(), StoreError> {
        self.run_blocking(move |store| store.store_watermark(revision)).await
    }

    async fn readiness(&self) -> Result<(), StoreError> {
        self.run_blocking(Self::check_connection).await
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Reads the first nine columns of a row in [`METADATA_COLUMNS`] order.
fn map_metadata_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MetadataRow> {
    Ok(MetadataRow {
        unique_identifier: row.get(0)?,
        service_name: row.get(1)?,
        service_address: row.get(2)?,
        completeness: row.get(3)?,
        validity: row.get(4)?,
        accuracy: row.get(5)?,
        processing_time: row.get(6)?,
        actual_time: row.get(7)?,
        processing_duration: row.get(8)?,
    })
}

impl MetadataRow {
    /// Decodes the raw row; `None` when the identifier is missing or invalid.
    fn into_record(self) -> Option<MetadataRecord> {
        let Some(raw_identifier) = text_from_sql(self.unique_identifier) else {
            warn!("skipping metadata row without uniqueIdentifier");
            return None;
        };
        let unique_identifier = match UniqueIdentifier::parse(raw_identifier) {
            Ok(identifier) => identifier,
            Err(err) => {
                warn!(error = %err, "skipping metadata row with invalid uniqueIdentifier");
                return None;
            }
        };
        Some(MetadataRecord {
            unique_identifier,
            service_name: text_from_sql(self.service_name),
            service_address: text_from_sql(self.service_address),
            completeness: field_from_sql(self.completeness),
            validity: field_from_sql(self.validity),
            accuracy: field_from_sql(self.accuracy),
            processing_time: text_from_sql(self.processing_time),
            actual_time: text_from_sql(self.actual_time),
            processing_duration: text_from_sql(self.processing_duration),
        })
    }
}

/// Decodes a text column of any storage class.
fn text_from_sql(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Text(text) => Some(text),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Decodes a score column of any storage class.
///
/// Non-finite reals have no JSON form and decode as absent.
fn field_from_sql(value: Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::Integer(number) => Some(FieldValue::from(number)),
        Value::Real(number) => FieldValue::real(number),
        Value::Text(text) => Some(FieldValue::Text(text)),
        Value::Blob(bytes) => Some(FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned())),
    }
}

/// Encodes a score field with the storage class matching its JSON form.
fn field_to_sql(value: Option<&FieldValue>) -> Value {
    match value {
        None => Value::Null,
        Some(FieldValue::Text(text)) => Value::Text(text.clone()),
        Some(FieldValue::Number(number)) => number
            .as_i64()
            .map(Value::Integer)
            .or_else(|| number.as_f64().map(Value::Real))
            .unwrap_or(Value::Null),
    }
}

/// Converts a stored revision into a [`Revision`].
fn revision_from_sql(value: i64) -> Result<Revision, SqliteStoreError> {
    u64::try_from(value)
        .map(Revision::new)
        .map_err(|_| SqliteStoreError::Corrupt(format!("negative revision: {value}")))
}

/// Converts a [`Revision`] into its stored form.
fn revision_to_sql(revision: Revision) -> Result<i64, SqliteStoreError> {
    i64::try_from(revision.get())
        .map_err(|_| SqliteStoreError::Invalid(format!("revision out of range: {revision}")))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS metadata (
                    uniqueIdentifier TEXT PRIMARY KEY,
                    serviceName TEXT,
                    serviceAddress TEXT,
                    completeness REAL,
                    validity INTEGER,
                    accuracy REAL,
                    processingTime TEXT,
                    actualTime TEXT,
                    processingDuration TEXT
                );
                CREATE TABLE IF NOT EXISTS metadata_revisions (
                    uniqueIdentifier TEXT PRIMARY KEY,
                    revision INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_metadata_revisions_revision
                    ON metadata_revisions (revision);
                CREATE TABLE IF NOT EXISTS publish_watermark (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    revision INTEGER NOT NULL
                );
                INSERT OR IGNORE INTO publish_watermark (id, revision) VALUES (1, 0);
                INSERT INTO metadata_revisions (uniqueIdentifier, revision)
                    SELECT uniqueIdentifier, rowid FROM metadata
                    WHERE uniqueIdentifier NOT IN (SELECT uniqueIdentifier FROM metadata_revisions);",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
