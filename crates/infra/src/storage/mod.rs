//! Session storage adapters
//!
//! | adapter             | persistence          | change feed |
//! |---------------------|----------------------|-------------|
//! | [`MemoryStorage`]   | process memory       | yes         |
//! | [`FileStorage`]     | one JSON file / slot | no          |
//! | [`KeychainStorage`] | platform keychain    | no          |

pub mod file;
pub mod keychain;
pub mod memory;

pub use file::FileStorage;
pub use keychain::KeychainStorage;
pub use memory::MemoryStorage;
