//! Keccak-256 implementation of the `Hasher` trait.
//!
//! This is the original Keccak submission (padding byte `0x01`), not the later
//! NIST SHA3-256 standard. It is the hash used for ABI selectors, event topics,
//! and typed-data digests. The implementation uses the `sha3` crate.
//!
//! # Example
//! ```rust
//! use sigil_cryptography::{Hasher, Keccak256};
//!
//! // Create a new Keccak-256 hasher
//! let mut hasher = Keccak256::new();
//!
//! // Update the hasher with a canonical signature
//! hasher.update(b"transfer(address,uint256)");
//!
//! // Finalize the hasher to get the digest
//! let digest = hasher.finalize();
//!
//! // The first four bytes are the function selector
//! assert_eq!(&digest[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//! ```

use crate::{Error, Hasher};
use sha3::{Digest as _, Keccak256 as IKeccak256};
use sigil_utils::hex;
use std::{
    fmt::{Debug, Display},
    ops::Deref,
};

const DIGEST_LENGTH: usize = 32;

/// Generate a Keccak-256 digest from a message.
pub fn hash(message: &[u8]) -> Digest {
    let array: [u8; DIGEST_LENGTH] = IKeccak256::digest(message).into();
    Digest::from(array)
}

/// Keccak-256 hasher.
#[derive(Debug)]
pub struct Keccak256 {
    hasher: IKeccak256,
}

impl Default for Keccak256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Keccak256 {
    fn clone(&self) -> Self {
        // We manually implement `Clone` to avoid cloning the hasher state.
        Self::default()
    }
}

impl Hasher for Keccak256 {
    type Digest = Digest;

    fn new() -> Self {
        Self {
            hasher: IKeccak256::new(),
        }
    }

    fn update(&mut self, message: &[u8]) {
        self.hasher.update(message);
    }

    fn finalize(&mut self) -> Self::Digest {
        let finalized = self.hasher.finalize_reset();
        let array: [u8; DIGEST_LENGTH] = finalized.into();
        Self::Digest::from(array)
    }

    fn reset(&mut self) {
        self.hasher = IKeccak256::new();
    }
}

/// Digest of a Keccak-256 hashing operation.
#[derive(Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Digest([u8; DIGEST_LENGTH]);

impl Digest {
    /// Returns the first four bytes of the digest (a function or error selector).
    pub fn selector(&self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    /// Returns the digest as a fixed-size array.
    pub fn to_array(&self) -> [u8; DIGEST_LENGTH] {
        self.0
    }
}

impl crate::Digest for Digest {
    const SIZE: usize = DIGEST_LENGTH;
}

impl From<[u8; DIGEST_LENGTH]> for Digest {
    fn from(value: [u8; DIGEST_LENGTH]) -> Self {
        Self(value)
    }
}

impl From<Digest> for [u8; DIGEST_LENGTH] {
    fn from(value: Digest) -> Self {
        value.0
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; DIGEST_LENGTH] =
            value.try_into().map_err(|_| Error::InvalidDigestLength)?;
        Ok(Self(array))
    }
}

impl TryFrom<Vec<u8>> for Digest {
    type Error = Error;
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Digest {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Digest as _;
    use sigil_utils::hex;

    const EMPTY_DIGEST: &str = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";
    const HELLO_DIGEST: &str = "47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fad";

    #[test]
    fn test_keccak256() {
        let msg = b"hello world";

        // Generate initial hash
        let mut hasher = Keccak256::new();
        hasher.update(msg);
        let digest = hasher.finalize();
        assert!(Digest::try_from(digest.as_ref()).is_ok());
        assert_eq!(hex(digest.as_ref()), HELLO_DIGEST);

        // Reuse hasher
        hasher.update(msg);
        let digest = hasher.finalize();
        assert_eq!(hex(digest.as_ref()), HELLO_DIGEST);

        // Test simple hasher
        let hash = hash(msg);
        assert_eq!(hex(hash.as_ref()), HELLO_DIGEST);
    }

    #[test]
    fn test_keccak256_incremental() {
        let mut hasher = Keccak256::new();
        hasher.update(b"hello");
        hasher.update(b" ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize(), hash(b"hello world"));
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(hex(Keccak256::empty().as_ref()), EMPTY_DIGEST);
        assert_eq!(hex(hash(b"").as_ref()), EMPTY_DIGEST);
    }

    #[test]
    fn test_keccak256_reset() {
        let mut hasher = Keccak256::new();
        hasher.update(b"discarded");
        hasher.reset();
        assert_eq!(hex(hasher.finalize().as_ref()), EMPTY_DIGEST);
    }

    #[test]
    fn test_keccak256_len() {
        assert_eq!(Digest::SIZE, DIGEST_LENGTH);
    }

    #[test]
    fn test_selector() {
        let digest = hash(b"transfer(address,uint256)");
        assert_eq!(digest.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(
            Digest::try_from(&[0u8; 31][..]),
            Err(Error::InvalidDigestLength)
        );
        assert_eq!(
            Digest::try_from(vec![0u8; 33]),
            Err(Error::InvalidDigestLength)
        );
        let digest = Digest::try_from(vec![7u8; 32]).unwrap();
        assert_eq!(digest.to_array(), [7u8; 32]);
    }
}
