pub mod memory;
pub mod seed;
pub mod store;
pub mod supabase;
pub mod supabase_store;

pub use memory::InMemoryStore;
pub use store::{ClinicStore, SharedStore, StoreError, StoreResult};
pub use supabase::{SupabaseClient, SupabaseError};
pub use supabase_store::SupabaseStore;
