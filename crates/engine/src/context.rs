//! Composition root: wires single shared instances of the store, client,
//! monitor, and services. No ambient globals - everything is injected, so
//! tests can substitute fakes at any seam.

use std::sync::Arc;

use doorstep_api_client::{CanvassApiClient, RemoteApi};
use doorstep_core::assignments::AssignmentRepositoryTrait;
use doorstep_core::contact_logs::ContactLogRepositoryTrait;
use doorstep_core::secrets::{AccessTokenProvider, SecretStore, TokenProvider};
use doorstep_core::sync::SyncStateRepositoryTrait;
use doorstep_core::voters::VoterRepositoryTrait;
use doorstep_core::Result;
use doorstep_storage_sqlite::{
    create_pool, AssignmentRepository, ContactLogRepository, SyncStateRepository, VoterRepository,
    WriteHandle,
};

use crate::catalog::{CatalogService, CatalogServiceTrait};
use crate::network::NetworkMonitor;
use crate::sync_service::SyncService;

/// Static configuration for a context.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Base URL of the campaign API.
    pub api_base_url: String,
}

pub struct ServiceContext {
    pub assignment_repository: Arc<dyn AssignmentRepositoryTrait>,
    pub voter_repository: Arc<dyn VoterRepositoryTrait>,
    pub contact_log_repository: Arc<dyn ContactLogRepositoryTrait>,
    pub sync_state_repository: Arc<dyn SyncStateRepositoryTrait>,
    pub token_provider: Arc<AccessTokenProvider>,
    pub api_client: Arc<dyn RemoteApi>,
    pub network_monitor: Arc<NetworkMonitor>,
    pub sync_service: Arc<SyncService>,
    pub catalog_service: Arc<dyn CatalogServiceTrait>,
}

impl ServiceContext {
    /// Build the full service graph over one database and one API endpoint.
    pub fn initialize(
        config: &RuntimeConfig,
        secret_store: Arc<dyn SecretStore>,
    ) -> Result<Arc<Self>> {
        let pool = create_pool(&config.database_path)?;
        let writer = WriteHandle::new(Arc::clone(&pool));

        let assignment_repository: Arc<dyn AssignmentRepositoryTrait> = Arc::new(
            AssignmentRepository::new(Arc::clone(&pool), writer.clone()),
        );
        let voter_repository: Arc<dyn VoterRepositoryTrait> =
            Arc::new(VoterRepository::new(Arc::clone(&pool), writer.clone()));
        let contact_log_repository: Arc<dyn ContactLogRepositoryTrait> =
            Arc::new(ContactLogRepository::new(Arc::clone(&pool), writer.clone()));
        let sync_state_repository: Arc<dyn SyncStateRepositoryTrait> =
            Arc::new(SyncStateRepository::new(Arc::clone(&pool), writer));

        let token_provider = Arc::new(AccessTokenProvider::new(secret_store));
        let api_client: Arc<dyn RemoteApi> = Arc::new(CanvassApiClient::new(
            &config.api_base_url,
            Arc::clone(&token_provider) as Arc<dyn TokenProvider>,
        ));

        let network_monitor = Arc::new(NetworkMonitor::new(true));

        let sync_service = SyncService::new(
            Arc::clone(&api_client),
            Arc::clone(&assignment_repository),
            Arc::clone(&contact_log_repository),
            Arc::clone(&sync_state_repository),
            Arc::clone(&network_monitor),
        );

        let catalog_service: Arc<dyn CatalogServiceTrait> = Arc::new(CatalogService::new(
            Arc::clone(&api_client),
            Arc::clone(&assignment_repository),
            Arc::clone(&voter_repository),
            Arc::clone(&contact_log_repository),
            Arc::clone(&network_monitor),
            Arc::clone(&sync_service),
        ));

        Ok(Arc::new(Self {
            assignment_repository,
            voter_repository,
            contact_log_repository,
            sync_state_repository,
            token_provider,
            api_client,
            network_monitor,
            sync_service,
            catalog_service,
        }))
    }

    pub fn catalog_service(&self) -> Arc<dyn CatalogServiceTrait> {
        Arc::clone(&self.catalog_service)
    }

    pub fn sync_service(&self) -> Arc<SyncService> {
        Arc::clone(&self.sync_service)
    }

    pub fn network_monitor(&self) -> Arc<NetworkMonitor> {
        Arc::clone(&self.network_monitor)
    }

    pub fn token_provider(&self) -> Arc<AccessTokenProvider> {
        Arc::clone(&self.token_provider)
    }

    /// Sign out: stop background sync, drop the token, and wipe all cached
    /// and queued state.
    pub async fn sign_out(&self) -> Result<()> {
        self.sync_service.ensure_background_stopped().await;
        self.token_provider.clear_token()?;
        self.sync_state_repository.clear_all().await?;
        self.sync_service.refresh_pending_count();
        Ok(())
    }
}
