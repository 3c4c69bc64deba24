use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use wayfarer_core::LocationRecord;

/// Keyed lookup of destination records. Names match case-insensitively.
pub trait LocationStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<LocationRecord>>;
    async fn list_names(&self) -> Result<Vec<String>>;
    async fn upsert(&self, record: LocationRecord) -> Result<()>;
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    locations: Arc<RwLock<HashMap<String, LocationRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = LocationRecord>) -> Self {
        let locations = records
            .into_iter()
            .map(|record| (name_key(&record.name), record))
            .collect();

        Self {
            locations: Arc::new(RwLock::new(locations)),
        }
    }

    /// Loads a location table keyed by display name, as shipped in `data/locations.json`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading location table {}", path.display()))?;
        let store = Self::from_json_str(&raw)
            .with_context(|| format!("failed parsing location table {}", path.display()))?;

        info!(path = %path.display(), locations = store.len(), "location table loaded");
        Ok(store)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let table: BTreeMap<String, LocationRecord> = serde_json::from_str(raw)?;
        let records = table.into_iter().map(|(key, mut record)| {
            if record.name.trim().is_empty() {
                record.name = key;
            }
            record
        });

        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.locations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.read().is_empty()
    }
}

impl LocationStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<LocationRecord>> {
        Ok(self.locations.read().get(&name_key(name)).cloned())
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        let mut names = self
            .locations
            .read()
            .values()
            .map(|record| record.name.clone())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }

    async fn upsert(&self, record: LocationRecord) -> Result<()> {
        self.locations.write().insert(name_key(&record.name), record);
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
              name_key TEXT PRIMARY KEY,
              name TEXT NOT NULL,
              doc_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl LocationStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<Option<LocationRecord>> {
        let row = sqlx::query(
            r#"
            SELECT doc_json
            FROM locations
            WHERE name_key = ?1
            "#,
        )
        .bind(name_key(name))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(location = %name, "location not found");
            return Ok(None);
        };

        let doc_json: String = row.get("doc_json");
        let record = serde_json::from_str(&doc_json)
            .with_context(|| format!("corrupt location document for {}", name))?;
        Ok(Some(record))
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM locations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }

    async fn upsert(&self, record: LocationRecord) -> Result<()> {
        let doc_json = serde_json::to_string(&record)?;

        sqlx::query(
            r#"
            INSERT INTO locations (name_key, name, doc_json)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name_key) DO UPDATE SET
              name=excluded.name,
              doc_json=excluded.doc_json
            "#,
        )
        .bind(name_key(&record.name))
        .bind(&record.name)
        .bind(doc_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::Memory(MemoryStore::from_json_file(path)?))
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    /// Copies every record of `source` into this store.
    pub async fn import_from(&self, source: &MemoryStore) -> Result<usize> {
        let records = source.locations.read().values().cloned().collect::<Vec<_>>();
        let imported = records.len();
        for record in records {
            self.upsert(record).await?;
        }
        Ok(imported)
    }
}

impl LocationStore for Store {
    async fn get(&self, name: &str) -> Result<Option<LocationRecord>> {
        match self {
            Store::Memory(store) => store.get(name).await,
            Store::Sqlite(store) => store.get(name).await,
        }
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        match self {
            Store::Memory(store) => store.list_names().await,
            Store::Sqlite(store) => store.list_names().await,
        }
    }

    async fn upsert(&self, record: LocationRecord) -> Result<()> {
        match self {
            Store::Memory(store) => store.upsert(record).await,
            Store::Sqlite(store) => store.upsert(record).await,
        }
    }
}
