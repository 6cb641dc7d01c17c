//! Account configuration and persistence.

mod model;
mod store;

pub use model::{Account, Provider};
pub use store::AccountStore;
