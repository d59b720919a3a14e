//! Repository layer: entity-scoped database operations.
//!
//! The pipeline touches the store through exactly the primitives the
//! deduplication engine and the ledger writer need; everything else
//! (user/account/category CRUD) exists to support them.

mod user;
mod account;
mod category;
mod ledger;

pub use user::*;
pub use account::*;
pub use category::*;
pub use ledger::*;
