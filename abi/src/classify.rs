//! Storage classification of type descriptors.
//!
//! Every type is either _static_ (encoded in place, occupying a fixed number of bytes in the head
//! of its enclosing tuple) or _dynamic_ (encoded in the tail and referenced from the head by a
//! one-word offset). Classification depends only on the shape of the type and is re-queried on
//! every encode and decode, so results for composite types are memoized in a process-wide,
//! append-only map.

use crate::{ParamType, WORD};
use std::{
    collections::HashMap,
    sync::{LazyLock, PoisonError, RwLock},
};
use tracing::trace;

/// Maximum number of composite types memoized. Beyond this, layouts are still computed but no
/// longer stored.
const MAX_CACHED: usize = 4096;

static LAYOUTS: LazyLock<RwLock<HashMap<ParamType, Layout>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Semantic category of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// A one-word value (integers, `bool`, `address`, `bytesN`).
    Scalar,
    /// `bytes` or `string`.
    DynamicBytes,
    /// `T[N]`.
    FixedArray,
    /// `T[]`.
    DynamicArray,
    /// `(T1,...,Tn)`.
    Tuple,
}

/// How a type is laid out on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Whether the type is encoded in the tail.
    pub dynamic: bool,
    /// Bytes occupied in the head of the enclosing tuple. Always [WORD] for dynamic types.
    ///
    /// Saturates for static types too large to address, which no buffer can satisfy.
    pub head_size: usize,
}

impl Layout {
    const SCALAR: Self = Self {
        dynamic: false,
        head_size: WORD,
    };
    const DYNAMIC: Self = Self {
        dynamic: true,
        head_size: WORD,
    };
}

/// Returns the category of `kind`.
pub fn category(kind: &ParamType) -> Category {
    match kind {
        ParamType::Bytes | ParamType::String => Category::DynamicBytes,
        ParamType::FixedArray(..) => Category::FixedArray,
        ParamType::Array(_) => Category::DynamicArray,
        ParamType::Tuple(_) => Category::Tuple,
        _ => Category::Scalar,
    }
}

/// Returns the layout of `kind`, consulting the memoized results for composite types.
pub fn layout(kind: &ParamType) -> Layout {
    match kind {
        ParamType::Uint(_)
        | ParamType::Int(_)
        | ParamType::Bool
        | ParamType::Address
        | ParamType::FixedBytes(_) => Layout::SCALAR,
        ParamType::Bytes | ParamType::String | ParamType::Array(_) => Layout::DYNAMIC,
        ParamType::FixedArray(..) | ParamType::Tuple(_) => {
            if let Some(layout) = LAYOUTS
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(kind)
            {
                return *layout;
            }

            // Racing writers compute the same value, so a duplicate insert is harmless.
            let layout = compute(kind);
            let mut cache = LAYOUTS.write().unwrap_or_else(PoisonError::into_inner);
            if cache.len() < MAX_CACHED {
                trace!(%kind, ?layout, "memoized layout");
                cache.insert(kind.clone(), layout);
            }
            layout
        }
    }
}

fn compute(kind: &ParamType) -> Layout {
    match kind {
        ParamType::FixedArray(elem, len) => {
            let elem = layout(elem);
            if elem.dynamic {
                return Layout::DYNAMIC;
            }
            Layout {
                dynamic: false,
                head_size: elem.head_size.saturating_mul(*len),
            }
        }
        ParamType::Tuple(components) => {
            let mut head_size = 0usize;
            for component in components {
                let component = layout(&component.kind);
                if component.dynamic {
                    return Layout::DYNAMIC;
                }
                head_size = head_size.saturating_add(component.head_size);
            }
            Layout {
                dynamic: false,
                head_size,
            }
        }
        _ => layout(kind),
    }
}

impl ParamType {
    /// Returns true if the type is encoded in the tail of its enclosing tuple.
    pub fn is_dynamic(&self) -> bool {
        layout(self).dynamic
    }

    /// Returns the number of bytes the type occupies in the head of its enclosing tuple.
    pub fn head_size(&self) -> usize {
        layout(self).head_size
    }

    /// Returns the semantic category of the type.
    pub fn category(&self) -> Category {
        category(self)
    }
}
