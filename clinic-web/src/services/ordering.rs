//! Ordering reconciler: maps a caller-supplied total order over entity ids to
//! persisted integer ranks (position + 1).
//!
//! Updates are issued concurrently with no transactional wrapping; two
//! concurrent reorders of the same collection interleave arbitrarily and the
//! final assignment is last-write-per-id.

use crate::error::AppError;
use crate::models::Collection;
use crate::services::database::CatalogStore;
use futures::future;

/// How a batch reacts to individual update failures. The reorder endpoints
/// deliberately differ: see the handler for which endpoint uses which.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// First failing update fails the whole request.
    Strict,
    /// Failing updates are logged and swallowed; the rest still apply.
    BestEffort,
}

pub async fn assign_ranks(
    store: &dyn CatalogStore,
    collection: Collection,
    ordered_ids: &[String],
    mode: FailureMode,
) -> Result<(), AppError> {
    let updates = ordered_ids
        .iter()
        .enumerate()
        .map(|(position, id)| store.set_rank(collection, id, position as i32 + 1));

    match mode {
        FailureMode::Strict => {
            future::try_join_all(updates).await?;
        }
        FailureMode::BestEffort => {
            let results = future::join_all(updates).await;
            for (id, result) in ordered_ids.iter().zip(results) {
                if let Err(error) = result {
                    tracing::warn!(
                        table = collection.table_name(),
                        id = %id,
                        %error,
                        "Rank update failed; remaining updates were still applied"
                    );
                }
            }
        }
    }

    Ok(())
}
