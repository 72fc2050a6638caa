use std::fs::File;
use std::path::Path;

use optistock_import::{import_csv, CsvError, CsvImportProfile, RecordSource};
use optistock_storage::{create_db, create_memory_db, DbError, DbPool};

use crate::orchestrator::Orchestrator;

/// Open the cache database. A file that cannot be created degrades to an
/// in-memory database so the viewer still runs, just without persistence.
pub async fn open_database(path: Option<&Path>) -> Result<DbPool, DbError> {
    if let Some(path) = path {
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("cannot create {}: {e}", dir.display());
            }
        }
        match create_db(path).await {
            Ok(pool) => {
                tracing::info!("cache database: {}", path.display());
                return Ok(pool);
            }
            Err(e) => tracing::warn!("cannot open {}: {e}; cache will not persist", path.display()),
        }
    }
    create_memory_db().await
}

/// Load a CSV export of the sheet and make it the current record set.
pub async fn import_csv_file<S: RecordSource + 'static>(
    orch: &Orchestrator<S>,
    path: &Path,
    profile: &CsvImportProfile,
) -> Result<usize, CsvError> {
    let normalized = import_csv(File::open(path)?, profile)?;
    tracing::info!(
        file = %path.display(),
        seen = normalized.stats.rows_seen,
        kept = normalized.stats.rows_kept,
        "csv import"
    );
    let count = normalized.records.len();
    orch.ingest(normalized.records).await;
    Ok(count)
}
