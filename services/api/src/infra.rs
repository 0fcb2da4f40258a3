use job_portal::board::{InMemoryBoardRepository, SqliteBoardRepository};
use job_portal::config::StorageConfig;
use job_portal::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Repository selected by `DATABASE_URL`.
pub(crate) enum BoardStore {
    Memory(Arc<InMemoryBoardRepository>),
    Sqlite(Arc<SqliteBoardRepository>),
}

impl BoardStore {
    /// Opens the configured backend. SQLite schemas are created on first open.
    pub(crate) fn open(storage: &StorageConfig) -> Result<Self, AppError> {
        let store = match storage {
            StorageConfig::Memory => Self::Memory(Arc::new(InMemoryBoardRepository::default())),
            StorageConfig::SqliteMemory => {
                Self::Sqlite(Arc::new(SqliteBoardRepository::in_memory()?))
            }
            StorageConfig::SqliteFile(path) => {
                Self::Sqlite(Arc::new(SqliteBoardRepository::open(path)?))
            }
        };
        Ok(store)
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            BoardStore::Memory(_) => "memory",
            BoardStore::Sqlite(_) => "sqlite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn storage_config_selects_the_backend() {
        let memory = BoardStore::open(&StorageConfig::Memory).expect("memory store");
        assert_eq!(memory.label(), "memory");

        let sqlite = BoardStore::open(&StorageConfig::SqliteMemory).expect("sqlite store");
        assert_eq!(sqlite.label(), "sqlite");
    }

    #[test]
    fn unopenable_sqlite_path_is_a_storage_error() {
        let missing = PathBuf::from("/nonexistent-dir/job-portal/jobportal.db");
        assert!(matches!(
            BoardStore::open(&StorageConfig::SqliteFile(missing)),
            Err(AppError::Storage(_))
        ));
    }
}
