pub mod config;
pub mod errors;
pub mod experiments;
pub mod fingerprint;
pub mod metrics_defs;
pub mod resolver;
pub mod selector;
pub mod service;

pub use errors::{Result, RouterError};

use config::{Config, StoreConfig};
use service::ExperimentService;
use shared::admin::AdminService;
use std::sync::Arc;
use store::{FilesystemStore, GcsStore, ObjectStore};

/// Build the configured store provider.
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>> {
    match config {
        StoreConfig::Gcs {
            bucket,
            endpoint,
            bearer_token,
        } => {
            let mut store = GcsStore::new(bucket, endpoint.as_deref())?;
            if let Some(token) = bearer_token {
                store = store.with_bearer_token(token);
            }
            Ok(Arc::new(store))
        }
        StoreConfig::Filesystem { root } => Ok(Arc::new(FilesystemStore::new(root))),
    }
}

/// Validate the configuration, then run the visitor listener and the admin
/// listener until one of them fails.
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let store = build_store(&config.store)?;
    let service = ExperimentService::new(store, config.fingerprint.clone());

    // The pipeline is stateless, so the service is ready as soon as it binds.
    let admin = AdminService::<_, RouterError>::new(|| true);

    let service_task = shared::http::serve(&config.listener.host, config.listener.port, service);
    let admin_task = shared::http::serve(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin,
    );
    let ((), ()) = tokio::try_join!(service_task, admin_task)?;
    Ok(())
}
