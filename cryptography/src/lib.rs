//! Hash contract signatures and structured messages.
//!
//! # Status
//!
//! `sigil-cryptography` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use std::fmt::{Debug, Display};
use thiserror::Error;

pub mod keccak256;
pub use keccak256::{hash, Keccak256};

/// Errors that can occur when interacting with cryptographic primitives.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid digest length")]
    InvalidDigestLength,
}

/// A fixed-size output of a [Hasher].
///
/// Digests are cheap to copy and render as lowercase hex.
pub trait Digest:
    AsRef<[u8]> + Copy + Eq + Ord + std::hash::Hash + Debug + Display + Send + Sync + 'static
{
    /// Length of the digest in bytes.
    const SIZE: usize;
}

/// Interface that sigil crates rely on for hashing.
///
/// Selectors, event topics, and typed-data digests are all defined in terms of a
/// single hash function (Keccak-256), but consumers are written against this trait
/// so the function is named in exactly one place.
///
/// This trait is required to implement the `Clone` trait because it is often
/// part of a struct that is cloned. In practice, implementations do not actually
/// clone the hasher state but users should not rely on this behavior and call `reset`
/// after cloning.
pub trait Hasher: Clone + Send + Sync + 'static {
    /// Digest generated by the hasher.
    type Digest: Digest;

    /// Create a new hasher.
    fn new() -> Self;

    /// Append message to previously recorded data.
    fn update(&mut self, message: &[u8]);

    /// Hash all recorded data and reset the hasher
    /// to the initial state.
    fn finalize(&mut self) -> Self::Digest;

    /// Reset the hasher without generating a hash.
    ///
    /// This function does not need to be called after `finalize`.
    fn reset(&mut self);

    /// Return result of hashing nothing.
    fn empty() -> Self::Digest {
        Self::new().finalize()
    }
}
