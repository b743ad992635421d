// ============================================
// Hydration Stage
// ============================================
//
// I/O-bound second stage: resolves ranked keys into full documents.
// Runs only after scoring is complete and keeps rank order.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::db::ContentResolver;
use crate::error::{AppError, Result};
use crate::models::{HydratedCandidate, ScoredCandidate};

pub const DEFAULT_HYDRATION_CONCURRENCY: usize = 8;

/// Resolve `ranked` with at most `concurrency` lookups in flight.
///
/// Candidates whose content no longer exists are dropped; a resolver
/// failure fails the whole batch.
pub async fn hydrate(
    resolver: &dyn ContentResolver,
    ranked: Vec<ScoredCandidate>,
    concurrency: usize,
) -> Result<Vec<HydratedCandidate>> {
    let resolved: Vec<Option<HydratedCandidate>> = stream::iter(ranked)
        .map(|candidate| async move {
            let key = candidate.metadata.key();
            let document = resolver.resolve(key.content_id, key.content_type).await?;

            if document.is_none() {
                debug!(
                    content_id = %key.content_id,
                    content_type = %key.content_type,
                    "Ranked content has no document, dropping"
                );
            }

            Ok::<_, AppError>(document.map(|content| HydratedCandidate {
                key,
                score: candidate.score,
                content,
            }))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(resolved.into_iter().flatten().collect())
}
