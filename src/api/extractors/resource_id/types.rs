/*
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *  - document 系リソースの label は api::resources 側の marker 型が持つ
 */
use super::core::{IdLabel, ResourceId};
use crate::api::resources::Representative;

// users
pub enum UserTag {}
impl IdLabel for UserTag {
    const INVALID_ID: &'static str = "Invalid user ID";
}
pub type UserId = ResourceId<UserTag>;

pub type RepresentativeId = ResourceId<Representative>;
