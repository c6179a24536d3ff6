//! 25-word mnemonic encoding of a 32-byte ed25519 seed.
//!
//! The seed is split little-endian into 11-bit indexes over the BIP-39
//! English word list, which yields 24 words. The 25th word encodes the
//! first 11 bits of the SHA-512/256 digest of the seed.

use bip39::Language;
use thiserror::Error;

use super::{hash, KeyPair, SECRET_KEY_SIZE};

pub const MNEMONIC_WORDS: usize = 25;
const KEY_WORDS: usize = MNEMONIC_WORDS - 1;
const BITS_PER_WORD: u32 = 11;
const WORD_MASK: u32 = (1 << BITS_PER_WORD) - 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("invalid word count: expected {}, got {}", MNEMONIC_WORDS, _0)]
    InvalidWordCount(usize),
    #[error("unknown word in mnemonic: {0}")]
    UnknownWord(String),
    #[error("mnemonic does not decode to a 32-byte key")]
    InvalidKeyEncoding,
    #[error("mnemonic checksum mismatch")]
    InvalidChecksum,
}

// Pack bytes into 11-bit values, least significant bits first
fn to_u11(bytes: &[u8]) -> Vec<u32> {
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut output = Vec::with_capacity(bytes.len() * 8 / BITS_PER_WORD as usize + 1);
    for byte in bytes {
        buffer |= (*byte as u32) << bits;
        bits += 8;
        if bits >= BITS_PER_WORD {
            output.push(buffer & WORD_MASK);
            buffer >>= BITS_PER_WORD;
            bits -= BITS_PER_WORD;
        }
    }
    if bits > 0 {
        output.push(buffer & WORD_MASK);
    }
    output
}

// Inverse of `to_u11`
fn from_u11(values: &[u32]) -> Vec<u8> {
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut output = Vec::with_capacity(values.len() * BITS_PER_WORD as usize / 8 + 1);
    for value in values {
        buffer |= value << bits;
        bits += BITS_PER_WORD;
        while bits >= 8 {
            output.push((buffer & 0xff) as u8);
            buffer >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        output.push((buffer & 0xff) as u8);
    }
    output
}

fn checksum_word(key: &[u8; SECRET_KEY_SIZE]) -> &'static str {
    let digest = hash(key);
    let index = to_u11(&digest.as_bytes()[..2])[0];
    Language::English.word_list()[index as usize]
}

/// Encode a 32-byte seed as a 25-word mnemonic.
pub fn from_key(key: &[u8; SECRET_KEY_SIZE]) -> String {
    let words = Language::English.word_list();
    let mut phrase: Vec<&str> = to_u11(key)
        .into_iter()
        .map(|index| words[index as usize])
        .collect();
    phrase.push(checksum_word(key));
    phrase.join(" ")
}

/// Decode a 25-word mnemonic back into its 32-byte seed.
pub fn to_key(mnemonic: &str) -> Result<[u8; SECRET_KEY_SIZE], MnemonicError> {
    let words: Vec<&str> = mnemonic.split_whitespace().collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(MnemonicError::InvalidWordCount(words.len()));
    }

    let mut indexes = Vec::with_capacity(KEY_WORDS);
    for word in &words[..KEY_WORDS] {
        let index = Language::English
            .find_word(word)
            .ok_or_else(|| MnemonicError::UnknownWord(word.to_string()))?;
        indexes.push(index as u32);
    }

    // 24 words carry 264 bits, the last byte is padding and must be zero
    let mut bytes = from_u11(&indexes);
    if bytes.len() != SECRET_KEY_SIZE + 1 || bytes[SECRET_KEY_SIZE] != 0 {
        return Err(MnemonicError::InvalidKeyEncoding);
    }
    bytes.truncate(SECRET_KEY_SIZE);

    let mut key = [0u8; SECRET_KEY_SIZE];
    key.copy_from_slice(&bytes);

    if checksum_word(&key) != words[KEY_WORDS] {
        return Err(MnemonicError::InvalidChecksum);
    }
    Ok(key)
}

/// Restore a key pair from its mnemonic.
pub fn keypair_from_mnemonic(mnemonic: &str) -> Result<KeyPair, MnemonicError> {
    let key = to_key(mnemonic)?;
    Ok(KeyPair::from_secret_bytes(&key))
}

/// Mnemonic of an existing key pair.
pub fn mnemonic_from_keypair(keypair: &KeyPair) -> String {
    from_key(&keypair.secret_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_roundtrip() {
        let keypair = KeyPair::generate();
        let phrase = mnemonic_from_keypair(&keypair);
        assert_eq!(phrase.split_whitespace().count(), MNEMONIC_WORDS);

        let restored = keypair_from_mnemonic(&phrase).unwrap();
        assert_eq!(restored.address(), keypair.address());
    }

    #[test]
    fn test_zero_key() {
        let phrase = from_key(&[0u8; SECRET_KEY_SIZE]);
        let words: Vec<&str> = phrase.split_whitespace().collect();
        assert!(words[..KEY_WORDS].iter().all(|w| *w == "abandon"));
        assert_eq!(to_key(&phrase).unwrap(), [0u8; SECRET_KEY_SIZE]);
    }

    #[test]
    fn test_invalid_word_count() {
        assert_eq!(
            to_key("abandon abandon").unwrap_err(),
            MnemonicError::InvalidWordCount(2)
        );
    }

    #[test]
    fn test_unknown_word() {
        let mut words = vec!["abandon"; MNEMONIC_WORDS];
        words[3] = "notaword";
        assert_eq!(
            to_key(&words.join(" ")).unwrap_err(),
            MnemonicError::UnknownWord("notaword".to_string())
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let phrase = from_key(&[5u8; SECRET_KEY_SIZE]);
        let mut words: Vec<&str> = phrase.split_whitespace().collect();
        let checksum = words[KEY_WORDS];
        words[KEY_WORDS] = if checksum == "zoo" { "zone" } else { "zoo" };
        assert_eq!(
            to_key(&words.join(" ")).unwrap_err(),
            MnemonicError::InvalidChecksum
        );
    }

    #[test]
    fn test_u11_roundtrip() {
        let bytes: Vec<u8> = (0u8..32).collect();
        let words = to_u11(&bytes);
        assert_eq!(words.len(), KEY_WORDS);
        let decoded = from_u11(&words);
        assert_eq!(&decoded[..32], &bytes[..]);
    }
}
