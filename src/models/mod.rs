pub mod enums;
pub mod category;
pub mod ledger;

pub use enums::*;
pub use category::*;
pub use ledger::*;
