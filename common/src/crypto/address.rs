use data_encoding::BASE32_NOPAD;
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use serde_bytes::ByteBuf;
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use super::{hash, hash_parts, CryptoError, HASH_SIZE};
use crate::config::APP_ID_PREFIX;

pub const ADDRESS_SIZE: usize = 32;
pub const CHECKSUM_SIZE: usize = 4;
// base32 of 36 bytes without padding
pub const ADDRESS_STR_LEN: usize = 58;

/// Account address: the raw 32-byte ed25519 public key.
///
/// Its text form is base32 of the key followed by a 4-byte checksum
/// taken from the tail of the SHA-512/256 digest of the key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    pub const fn zero() -> Self {
        Self([0; ADDRESS_SIZE])
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; ADDRESS_SIZE] =
            slice
                .try_into()
                .map_err(|_| CryptoError::InvalidHashLength {
                    len: slice.len(),
                    expected: ADDRESS_SIZE,
                })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDRESS_SIZE]
    }

    fn checksum(&self) -> [u8; CHECKSUM_SIZE] {
        let digest = hash(&self.0);
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&digest.as_bytes()[HASH_SIZE - CHECKSUM_SIZE..]);
        checksum
    }

    pub fn to_encoded(&self) -> String {
        let mut buffer = Vec::with_capacity(ADDRESS_SIZE + CHECKSUM_SIZE);
        buffer.extend_from_slice(&self.0);
        buffer.extend_from_slice(&self.checksum());
        BASE32_NOPAD.encode(&buffer)
    }
}

/// Deposit address of an application, derived from its identifier only.
pub fn application_address(app_id: u64) -> Address {
    let digest = hash_parts(&[APP_ID_PREFIX, &app_id.to_be_bytes()]);
    Address(digest.to_bytes())
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_STR_LEN {
            return Err(CryptoError::InvalidAddress(format!(
                "expected {} characters, got {}",
                ADDRESS_STR_LEN,
                s.len()
            )));
        }

        let decoded = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|e| CryptoError::InvalidAddress(e.to_string()))?;
        if decoded.len() != ADDRESS_SIZE + CHECKSUM_SIZE {
            return Err(CryptoError::InvalidAddress(format!(
                "expected {} decoded bytes, got {}",
                ADDRESS_SIZE + CHECKSUM_SIZE,
                decoded.len()
            )));
        }

        let address = Self::from_slice(&decoded[..ADDRESS_SIZE])?;
        if address.checksum() != decoded[ADDRESS_SIZE..] {
            return Err(CryptoError::InvalidChecksum);
        }
        Ok(address)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_encoded())
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_encoded())
    }
}

// Transactions carry addresses as raw binary fields
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = ByteBuf::deserialize(deserializer)?;
        Self::from_slice(&bytes).map_err(SerdeError::custom)
    }
}
