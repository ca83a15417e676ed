//! Where tool sources look up credentials they were not handed explicitly
//!
//! - `SecretStore` trait for implementing custom stores
//! - Built-in implementations: `EnvSecretStore`, `MemorySecretStore`, `ChainSecretStore`

mod traits;
mod env_store;
mod memory_store;
mod chain_store;

pub use traits::SecretStore;
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
