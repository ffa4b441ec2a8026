//! Application state wiring all services together.
//!
//! `AssistantService` is generic over its repositories; AppState pins it to
//! the SQLite implementations and the configured model backends.

use std::sync::Arc;

use attune_core::llm::retry::RetryPolicy;
use attune_core::llm::rotation::{BoxCounterStore, CredentialRotator};
use attune_core::memory::service::MemoryService;
use attune_core::service::assistant::AssistantService;
use attune_infra::config::{data_dir, load_global_config};
use attune_infra::credential::env::{EnvCredentialSource, load_dotenv};
use attune_infra::llm::create_provider;
use attune_infra::sqlite::assessment::SqliteAssessmentRepository;
use attune_infra::sqlite::counter::SqliteCounterStore;
use attune_infra::sqlite::memory::SqliteMemoryRepository;
use attune_infra::sqlite::pool::DatabasePool;
use attune_infra::sqlite::profile::SqliteProfileRepository;
use attune_infra::sqlite::thread::SqliteThreadRepository;

pub type ConcreteAssistantService = AssistantService<
    SqliteMemoryRepository,
    SqliteThreadRepository,
    SqliteAssessmentRepository,
    SqliteProfileRepository,
>;

/// Shared application state for the CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<ConcreteAssistantService>,
    /// Write side for `profile set`; the assistant only reads profiles.
    pub profiles: Arc<SqliteProfileRepository>,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        load_dotenv(&data_dir);
        let config = load_global_config(&data_dir).await;

        let db_pool = DatabasePool::open(&data_dir).await?;

        // One rotator for both backends; counters are keyed by provider name.
        let rotator = CredentialRotator::new(
            BoxCounterStore::new(SqliteCounterStore::new(db_pool.clone())),
            Arc::new(EnvCredentialSource::new()),
            config.rotation.pool_size,
        );
        let retry = Arc::new(RetryPolicy::from_config(Arc::new(rotator), &config.rotation));

        let chat_provider = Arc::new(create_provider(
            config.models.chat_provider,
            &config.providers,
            Arc::clone(&retry),
        )?);
        let memory_provider = if config.models.memory_provider == config.models.chat_provider {
            Arc::clone(&chat_provider)
        } else {
            Arc::new(create_provider(
                config.models.memory_provider,
                &config.providers,
                retry,
            )?)
        };

        let memory = Arc::new(MemoryService::new(
            SqliteMemoryRepository::new(db_pool.clone()),
            memory_provider,
            &config.models,
            &config.memory,
        ));

        let assistant = AssistantService::new(
            chat_provider,
            memory,
            SqliteThreadRepository::new(db_pool.clone()),
            SqliteAssessmentRepository::new(db_pool.clone()),
            SqliteProfileRepository::new(db_pool.clone()),
            &config,
        );

        tracing::debug!(
            data_dir = %data_dir.display(),
            chat_provider = %config.models.chat_provider,
            memory_provider = %config.models.memory_provider,
            "application state ready"
        );

        Ok(Self {
            assistant: Arc::new(assistant),
            profiles: Arc::new(SqliteProfileRepository::new(db_pool)),
        })
    }
}
