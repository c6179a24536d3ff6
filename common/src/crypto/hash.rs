use sha2::{Digest, Sha512_256};
use std::fmt::{Debug, Display, Error, Formatter};

use crate::config::{TX_GROUP_PREFIX, TX_ID_PREFIX};

pub const HASH_SIZE: usize = 32; // 32 bytes / 256 bits

#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    pub const fn zero() -> Self {
        Hash::new([0; HASH_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; HASH_SIZE] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    // Base32 without padding, used for transaction ids
    pub fn to_base32(&self) -> String {
        data_encoding::BASE32_NOPAD.encode(&self.0)
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.to_base32())
    }
}

impl Debug for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "Hash({})", self.to_hex())
    }
}

// Hash a byte array using SHA-512/256
#[inline(always)]
pub fn hash(value: &[u8]) -> Hash {
    hash_parts(&[value])
}

// Hash several byte slices as if they were concatenated
pub fn hash_parts(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha512_256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

// Hash of an encoded transaction, prefixed for domain separation
pub fn transaction_hash(encoded: &[u8]) -> Hash {
    hash_parts(&[TX_ID_PREFIX, encoded])
}

// Hash of an encoded transaction group
pub fn group_hash(encoded: &[u8]) -> Hash {
    hash_parts(&[TX_GROUP_PREFIX, encoded])
}
