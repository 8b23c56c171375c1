//! Application state.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use gigboard_events::{BroadcastPublisher, ChangeNotifier, FanoutPublisher, Publisher, RedisPublisher};
use gigboard_store::{DocumentStore, FirestoreStore, GigRepository, MemoryStore, UserRepository};

use crate::auth::Authenticator;
use crate::config::{ApiConfig, StoreBackend};
use crate::services::GigService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn DocumentStore>,
    pub gigs: GigService,
    pub auth: Arc<Authenticator>,
    /// In-process hub feeding WebSocket subscribers
    pub hub: BroadcastPublisher,
}

impl AppState {
    /// Create application state from configuration.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Firestore => Arc::new(
                FirestoreStore::from_env().context("Failed to create Firestore store")?,
            ),
        };
        info!(backend = store.name(), "Document store ready");

        let redis: Option<Arc<dyn Publisher>> = match &config.redis_url {
            Some(url) => {
                let publisher = RedisPublisher::new(url, config.redis_channel_prefix.clone())
                    .context("Invalid REDIS_URL")?;
                info!("Redis Pub/Sub fan-out enabled");
                Some(Arc::new(publisher))
            }
            None => None,
        };

        Ok(Self::from_parts(config, store, redis))
    }

    /// Assemble state around an existing store and an optional extra transport.
    pub fn from_parts(
        config: ApiConfig,
        store: Arc<dyn DocumentStore>,
        extra_publisher: Option<Arc<dyn Publisher>>,
    ) -> Self {
        let hub = BroadcastPublisher::default();

        let mut fanout = FanoutPublisher::new().with(Arc::new(hub.clone()));
        if let Some(publisher) = extra_publisher {
            fanout = fanout.with(publisher);
        }
        let notifier = ChangeNotifier::new(Arc::new(fanout));

        let gigs = GigService::new(GigRepository::new(Arc::clone(&store)), notifier);
        let auth = Authenticator::new(&config.jwt_secret, UserRepository::new(Arc::clone(&store)));

        Self {
            config,
            store,
            gigs,
            auth: Arc::new(auth),
            hub,
        }
    }
}
