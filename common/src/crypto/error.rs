use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid hexadecimal string format
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// Hash has invalid length
    #[error("Invalid hash length: {len} bytes, expected: {expected} bytes")]
    InvalidHashLength { len: usize, expected: usize },

    /// Invalid checksum in address
    #[error("Invalid checksum")]
    InvalidChecksum,

    /// Address string is malformed or invalid
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Invalid secret key length
    #[error("Invalid secret key length: expected 32, got {0}")]
    InvalidSecretKeyLength(usize),

    /// Signature verification failed
    #[error("Signature verification failed")]
    VerificationFailed,
}
