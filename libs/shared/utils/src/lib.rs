pub mod locks;
pub mod test_utils;

pub use locks::{KeyedGuard, KeyedLocks};
