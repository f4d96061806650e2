/*
 * Responsibility
 *  - core と types を束ねる
 */
mod core;
mod types;

pub use self::core::{IdLabel, ResourceId};
pub use types::*;
