mod address;
mod ed25519;
mod hash;

pub mod error;
pub mod mnemonic;

pub use address::*;
pub use ed25519::*;
pub use error::CryptoError;
pub use hash::*;
