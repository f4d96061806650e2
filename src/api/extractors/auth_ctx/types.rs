/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」(Request Identity Context) の型
 * - Gate が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の検証ロジックは middleware/services 側の責務
 * - リクエスト単位で生成され、他のリクエストからは見えない
 */

use uuid::Uuid;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は token の `userId` claim を UUID として解釈したもの
/// - 権限の区別はない (全 principal が同じ権限)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

impl AuthCtx {
    pub fn new(user_id: Uuid, email: String, name: String) -> Self {
        Self {
            user_id,
            email,
            name,
        }
    }
}
