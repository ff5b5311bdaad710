mod account;
mod enums;
mod filter;
mod journal_entry;
mod money;
mod validation;

pub use account::*;
pub use enums::*;
pub use filter::*;
pub use journal_entry::*;
pub use money::*;
pub use validation::*;
