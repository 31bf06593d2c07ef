//! Batch runs over many targets.

use futures::future::join_all;
use indicatif::ProgressBar;

use crate::download::fetch::{DownloadResult, DownloadTarget, Fetcher};
use crate::download::permits::PermitPool;

/// Fetch every target cooperatively on the current task.
///
/// All fetches are started together and gated by `pool`. Results come back in
/// submission order.
pub async fn run_batch(
    fetcher: &Fetcher,
    targets: &[DownloadTarget],
    pool: &PermitPool,
    progress: &ProgressBar,
) -> Vec<DownloadResult> {
    tracing::info!(
        "Fetching {} target(s) with {} concurrent session(s)",
        targets.len(),
        pool.capacity()
    );

    let fetches = targets.iter().map(|target| async move {
        let result = fetcher.fetch(target, pool).await;
        progress.inc(1);
        result
    });

    let results = join_all(fetches).await;
    progress.finish_and_clear();
    results
}
