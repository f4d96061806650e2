/*
 * Responsibility
 * - 永続化層の公開インターフェース
 * - すべての store 呼び出しに上限時間を掛ける (リトライはしない)
 */
use std::future::Future;
use std::time::Duration;

pub mod document_repo;
pub mod error;
pub mod user_repo;

use error::{RepoError, RepoResult};

/// Upper bound for a single credential/document store call.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one store call under `limit`. An elapsed call is abandoned and reported as `Timeout`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> RepoResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(RepoError::from_sqlx),
        Err(_) => Err(RepoError::Timeout),
    }
}
