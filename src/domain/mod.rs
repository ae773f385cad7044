use async_trait::async_trait;
use schemaforge_core::{CreateSchemaRequest, ProductSchema};

pub mod error;

pub use error::RegistryError;

/// Storage collaborator for schema records, keyed by id
#[async_trait]
pub trait SchemaRegistryPort: Send + Sync {
    async fn create(&self, payload: CreateSchemaRequest) -> Result<ProductSchema, RegistryError>;
    async fn update(&self, id: &str, payload: CreateSchemaRequest) -> Result<ProductSchema, RegistryError>;
    async fn delete(&self, id: &str) -> Result<(), RegistryError>;
    async fn list(&self) -> Result<Vec<ProductSchema>, RegistryError>;
    async fn get(&self, id: &str) -> Result<ProductSchema, RegistryError>;
    /// Case-insensitive substring match over category, event type and title
    async fn search(&self, query: &str) -> Result<Vec<ProductSchema>, RegistryError>;
}
