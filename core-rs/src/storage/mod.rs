// storage/mod.rs - Role storage backends

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::RoleStore;
