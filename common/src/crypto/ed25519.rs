//! Ed25519 key pair used to sign ledger transactions.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{Address, CryptoError};

/// Size of Ed25519 secret key in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Ed25519 key pair.
///
/// The secret key is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    #[zeroize(skip)]
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using a cryptographically secure RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from the 32-byte secret seed.
    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_SIZE]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        Self { signing_key }
    }

    /// Create a key pair from a slice holding the secret seed.
    pub fn from_secret_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; SECRET_KEY_SIZE] = slice
            .try_into()
            .map_err(|_| CryptoError::InvalidSecretKeyLength(slice.len()))?;
        Ok(Self::from_secret_bytes(&bytes))
    }

    /// Secret seed bytes.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.signing_key.to_bytes()
    }

    /// Address of the account controlled by this key pair.
    pub fn address(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message and return the raw signature.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        self.signing_key.sign(message).to_bytes()
    }
}

/// Verify a raw signature against the public key held in `address`.
pub fn verify_signature(
    address: &Address,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(address.as_bytes()).map_err(|_| CryptoError::VerificationFailed)?;
    let signature =
        DalekSignature::from_slice(signature).map_err(|_| CryptoError::VerificationFailed)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| CryptoError::VerificationFailed)
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
