//! In-memory schema registry
//!
//! Holds every record in insertion order behind a single lock. Mutations post
//! a toast notification; rejected saves post an error toast and persist
//! nothing.

use async_trait::async_trait;
use chrono::Utc;
use schemaforge_core::notify::{Notification, NotificationSink};
use schemaforge_core::{CreateSchemaRequest, ProductSchema};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{RegistryError, SchemaRegistryPort};

#[derive(Clone)]
pub struct InMemorySchemaRegistry {
    schemas: Arc<RwLock<Vec<ProductSchema>>>,
    notifier: Arc<dyn NotificationSink>,
}

impl InMemorySchemaRegistry {
    pub fn new(notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            schemas: Arc::new(RwLock::new(Vec::new())),
            notifier,
        }
    }

    /// Import every `.json`, `.yaml` and `.yml` create payload in `dir`.
    ///
    /// Files are read in name order. Seeded records do not post
    /// notifications. Returns the number of records added.
    pub async fn load_seed_dir(&self, dir: &Path) -> Result<usize, RegistryError> {
        let seed_error = |path: &Path, reason: String| RegistryError::Seed {
            path: path.to_path_buf(),
            reason,
        };

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| seed_error(dir, e.to_string()))?;
        let mut paths: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| seed_error(dir, e.to_string()))?
        {
            let path = entry.path();
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json" | "yaml" | "yml")
            ) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| seed_error(&path, e.to_string()))?;
            let payload: CreateSchemaRequest = match path.extension().and_then(|e| e.to_str()) {
                Some("json") => serde_json::from_str(&content).map_err(|e| seed_error(&path, e.to_string()))?,
                _ => serde_yaml::from_str(&content).map_err(|e| seed_error(&path, e.to_string()))?,
            };
            payload
                .validate()
                .map_err(|e| seed_error(&path, e.to_string()))?;

            let record = new_record(payload);
            debug!(id = %record.id, path = %path.display(), "seeded schema");
            self.schemas.write().await.push(record);
            loaded += 1;
        }

        info!("Loaded {} seed schema(s) from {}", loaded, dir.display());
        Ok(loaded)
    }

    fn reject(&self, err: RegistryError) -> RegistryError {
        warn!("Schema save rejected: {}", err);
        self.notifier
            .notify(Notification::error("Failed to save schema", err.to_string()));
        err
    }
}

fn new_record(payload: CreateSchemaRequest) -> ProductSchema {
    let now = Utc::now();
    ProductSchema {
        id: Uuid::new_v4().to_string(),
        category: payload.category,
        event_type: payload.event_type,
        schema: payload.schema,
        created_at: now,
        updated_at: now,
    }
}

fn matches_query(record: &ProductSchema, needle: &str) -> bool {
    [record.category.as_str(), record.event_type.as_str(), record.title()]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl SchemaRegistryPort for InMemorySchemaRegistry {
    async fn create(&self, payload: CreateSchemaRequest) -> Result<ProductSchema, RegistryError> {
        payload.validate().map_err(|e| self.reject(e.into()))?;

        let record = new_record(payload);
        self.schemas.write().await.push(record.clone());

        info!(id = %record.id, title = %record.title(), "schema created");
        self.notifier.notify(Notification::success(
            "Schema created",
            format!("{} saved successfully", record.title()),
        ));
        Ok(record)
    }

    async fn update(&self, id: &str, payload: CreateSchemaRequest) -> Result<ProductSchema, RegistryError> {
        payload.validate().map_err(|e| self.reject(e.into()))?;

        let mut schemas = self.schemas.write().await;
        let record = schemas
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RegistryError::not_found(id))?;

        record.category = payload.category;
        record.event_type = payload.event_type;
        record.schema = payload.schema;
        record.updated_at = Utc::now();
        let record = record.clone();
        drop(schemas);

        info!(id = %record.id, title = %record.title(), "schema updated");
        self.notifier.notify(Notification::success(
            "Schema updated",
            format!("{} saved successfully", record.title()),
        ));
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), RegistryError> {
        let mut schemas = self.schemas.write().await;
        let idx = schemas
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| RegistryError::not_found(id))?;
        let removed = schemas.remove(idx);
        drop(schemas);

        info!(id = %removed.id, "schema deleted");
        self.notifier.notify(Notification::success(
            "Schema deleted",
            format!("{} was removed", removed.title()),
        ));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProductSchema>, RegistryError> {
        Ok(self.schemas.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<ProductSchema, RegistryError> {
        self.schemas
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(id))
    }

    async fn search(&self, query: &str) -> Result<Vec<ProductSchema>, RegistryError> {
        let needle = query.trim().to_lowercase();
        let schemas = self.schemas.read().await;
        if needle.is_empty() {
            return Ok(schemas.clone());
        }
        Ok(schemas
            .iter()
            .filter(|s| matches_query(s, &needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaforge_core::notify::{NotificationLevel, RecordingSink};
    use schemaforge_core::JsonSchema;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> (InMemorySchemaRegistry, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (InMemorySchemaRegistry::new(sink.clone()), sink)
    }

    fn payload(category: &str, event_type: &str, title: &str) -> CreateSchemaRequest {
        CreateSchemaRequest::new(category, event_type, JsonSchema::new(title))
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let (registry, sink) = registry();
        let record = registry.create(payload("retail", "purchase", "Order")).await.unwrap();

        assert!(Uuid::parse_str(&record.id).is_ok());
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(registry.list().await.unwrap().len(), 1);
        assert_eq!(sink.posted()[0].level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn test_invalid_payload_persists_nothing() {
        let (registry, sink) = registry();
        let err = registry.create(payload("retail", "", "Order")).await.unwrap_err();

        assert!(matches!(err, RegistryError::Invalid(_)));
        assert!(registry.list().await.unwrap().is_empty());
        assert_eq!(sink.posted()[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_creation_time() {
        let (registry, _) = registry();
        let created = registry.create(payload("retail", "purchase", "Order")).await.unwrap();
        let updated = registry
            .update(&created.id, payload("retail", "refund", "Refund"))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(registry.get(&created.id).await.unwrap().event_type, "refund");
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (registry, _) = registry();
        assert!(matches!(registry.get("nope").await, Err(RegistryError::NotFound { .. })));
        assert!(matches!(registry.delete("nope").await, Err(RegistryError::NotFound { .. })));
        assert!(matches!(
            registry.update("nope", payload("a", "b", "c")).await,
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (registry, _) = registry();
        let record = registry.create(payload("retail", "purchase", "Order")).await.unwrap();
        registry.delete(&record.id).await.unwrap();
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (registry, _) = registry();
        registry.create(payload("Retail", "purchase", "Order")).await.unwrap();
        registry.create(payload("logistics", "shipment", "Parcel")).await.unwrap();

        assert_eq!(registry.search("RETAIL").await.unwrap().len(), 1);
        assert_eq!(registry.search("parc").await.unwrap()[0].category, "logistics");
        assert_eq!(registry.search("  ").await.unwrap().len(), 2);
        assert!(registry.search("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_dir_reads_json_and_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"category": "retail", "eventType": "purchase", "schema": {"title": "Order", "type": "object"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.yaml"),
            "category: logistics\neventType: shipment\nschema:\n  title: Parcel\n  type: object\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (registry, sink) = registry();
        assert_eq!(registry.load_seed_dir(dir.path()).await.unwrap(), 2);
        let titles: Vec<String> = registry
            .list()
            .await
            .unwrap()
            .iter()
            .map(|s| s.title().to_string())
            .collect();
        assert_eq!(titles, vec!["Order", "Parcel"]);
        assert!(sink.posted().is_empty());
    }

    #[tokio::test]
    async fn test_seed_dir_rejects_bad_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let (registry, _) = registry();
        let err = registry.load_seed_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Seed { .. }));
    }

    #[tokio::test]
    async fn test_seed_dir_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");

        let (registry, _) = registry();
        let err = registry.load_seed_dir(&missing).await.unwrap_err();
        let RegistryError::Seed { path, .. } = &err else {
            panic!("expected a seed error, got {err:?}");
        };
        assert_eq!(path, &missing);
        assert!(registry.list().await.unwrap().is_empty());
    }
}
