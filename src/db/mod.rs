//! Persistence layer for the Advocate server.
//!
//! [`Store`] is the single storage seam. [`DbOperations`] backs it with Postgres
//! (schema in `migrations/`), [`MemoryStore`] keeps everything in-process.

pub mod memory;
pub mod models;
pub mod operations;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

pub use memory::MemoryStore;
pub use models::{
    ActiveSubscription, CircleRate, NewCircleRate, NewDocumentGeneration, NewTemplate, Role,
    SubscriptionUpdate, Template, TemplateChanges, TemplateFilter, TemplateUsage, User,
};
pub use operations::DbOperations;
pub use store::Store;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::Result;

/// Build the store selected by `database.backend`.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>> {
    match config.backend {
        StoreBackend::Postgres => {
            let db = DbOperations::new_with_options(
                &config.url,
                config.max_connections,
                Duration::from_secs(config.acquire_timeout_secs),
            )
            .await?;
            if config.run_migrations {
                db.run_migrations().await?;
            }
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
