// Service exports
pub mod appwrite;
pub mod identity;
pub mod memory;
pub mod postgres;
pub mod store;

pub use appwrite::AppwriteIdentityProvider;
pub use identity::{IdentityError, IdentityProvider, JwtIdentityProvider, TokenClaims};
pub use memory::MemoryProfileStore;
pub use postgres::PostgresProfileStore;
pub use store::{ProfileStore, StoreError};
