//! Struct type declarations.
//!
//! A [Types] registry is validated when it is built: every member type must be an elementary ABI
//! type or a declared struct (optionally with array dimensions), and no struct may contain itself
//! except through an array, since such a struct could never hold a finite value.

use crate::{Error, MAX_DEPTH};
use serde::{Deserialize, Serialize};
use sigil_abi::{types::split_dimensions, ParamType};
use sigil_cryptography::keccak256::{self, Digest};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{LazyLock, PoisonError, RwLock},
};
use tracing::debug;

/// Maximum number of type hashes memoized.
const MAX_CACHED: usize = 4096;

/// Type hashes keyed by encoded type.
static TYPE_HASHES: LazyLock<RwLock<HashMap<String, Digest>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// A member of a struct type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// Type string, e.g. `uint256`, `Person`, or `Person[2][]`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Member {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// The base of a member type, with any array dimensions removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Base<'a> {
    Atom(ParamType),
    Struct(&'a str),
}

/// Returns the element type of an array type string by removing its outermost dimension.
pub(crate) fn element_type(ty: &str) -> &str {
    ty.rfind('[').map_or(ty, |i| &ty[..i])
}

/// A validated set of struct types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Types {
    structs: BTreeMap<String, Vec<Member>>,
}

impl Types {
    /// Creates a registry from struct declarations, rejecting undeclared member types and
    /// circular references.
    pub fn new(structs: BTreeMap<String, Vec<Member>>) -> Result<Self, Error> {
        let types = Self { structs };
        types.validate()?;
        Ok(types)
    }

    /// Returns a copy of the registry with `name` declared (or redeclared) as `members`.
    pub fn with(&self, name: &str, members: Vec<Member>) -> Result<Self, Error> {
        let mut structs = self.structs.clone();
        structs.insert(name.to_string(), members);
        Self::new(structs)
    }

    pub fn get(&self, name: &str) -> Option<&[Member]> {
        self.structs.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub(crate) fn members(&self, name: &str) -> Result<&[Member], Error> {
        self.get(name)
            .ok_or_else(|| Error::InvalidStructType(name.to_string()))
    }

    /// Splits a member type into its base and array dimensions (outermost last).
    pub(crate) fn resolve<'a>(
        &'a self,
        ty: &'a str,
    ) -> Result<(Base<'a>, Vec<Option<usize>>), Error> {
        let (base, dimensions) = split_dimensions(ty)?;
        if let Ok(kind) = ParamType::elementary(base, false) {
            return Ok((Base::Atom(kind), dimensions));
        }
        if self.structs.contains_key(base) {
            return Ok((Base::Struct(base), dimensions));
        }
        Err(Error::InvalidStructType(base.to_string()))
    }

    fn validate(&self) -> Result<(), Error> {
        for members in self.structs.values() {
            for member in members {
                self.resolve(&member.kind)?;
            }
        }
        let mut done = BTreeSet::new();
        for name in self.structs.keys() {
            self.visit(name, &mut Vec::new(), &mut done)?;
        }
        Ok(())
    }

    /// Depth-first search over struct members that are not arrays.
    ///
    /// Chains longer than [MAX_DEPTH] are rejected before the search can exhaust the stack.
    fn visit<'a>(
        &'a self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        done: &mut BTreeSet<&'a str>,
    ) -> Result<(), Error> {
        if done.contains(name) {
            return Ok(());
        }
        if path.contains(&name) {
            return Err(Error::CircularReference(name.to_string()));
        }
        if path.len() >= MAX_DEPTH {
            return Err(Error::DepthExceeded(MAX_DEPTH));
        }
        path.push(name);
        for member in self.members(name)? {
            if let (Base::Struct(child), dimensions) = self.resolve(&member.kind)? {
                if dimensions.is_empty() {
                    self.visit(child, path, done)?;
                }
            }
        }
        path.pop();
        done.insert(name);
        Ok(())
    }

    /// Returns the encoded type of `primary`: its own signature followed by the signatures of
    /// every struct it references (transitively), sorted by name.
    pub fn encode_type(&self, primary: &str) -> Result<String, Error> {
        let mut dependencies = self.dependencies(primary)?;
        dependencies.remove(primary);

        let mut out = String::new();
        for name in std::iter::once(primary).chain(dependencies) {
            out.push_str(name);
            out.push('(');
            for (i, member) in self.members(name)?.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&member.kind);
                out.push(' ');
                out.push_str(&member.name);
            }
            out.push(')');
        }
        Ok(out)
    }

    /// Returns `primary` and every struct it references, directly or through arrays.
    fn dependencies<'a>(&'a self, primary: &'a str) -> Result<BTreeSet<&'a str>, Error> {
        let mut found = BTreeSet::new();
        let mut pending = vec![primary];
        while let Some(name) = pending.pop() {
            if !found.insert(name) {
                continue;
            }
            for member in self.members(name)? {
                if let (Base::Struct(child), _) = self.resolve(&member.kind)? {
                    pending.push(child);
                }
            }
        }
        Ok(found)
    }

    /// Returns the Keccak-256 hash of the encoded type of `primary`.
    pub fn type_hash(&self, primary: &str) -> Result<Digest, Error> {
        let encoded = self.encode_type(primary)?;
        if let Some(digest) = TYPE_HASHES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&encoded)
        {
            return Ok(*digest);
        }

        let digest = keccak256::hash(encoded.as_bytes());
        debug!(primary, %digest, "computed type hash");
        let mut cache = TYPE_HASHES.write().unwrap_or_else(PoisonError::into_inner);
        if cache.len() < MAX_CACHED {
            cache.insert(encoded, digest);
        }
        Ok(digest)
    }
}
