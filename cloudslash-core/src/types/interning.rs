//! String interning over `lasso::ThreadedRodeo`.
//!
//! IDs are dense `u32`s. The empty string maps to the reserved sentinel 0
//! ("invalid"); all real strings get 1-based IDs that are stable for the
//! process lifetime. Equality of `InternedId` is equality of the source
//! strings.

use std::fmt;
use std::sync::OnceLock;

use lasso::{Key, Spur, ThreadedRodeo};
use serde::de::{Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Dense identifier for an interned string. 0 is the invalid sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InternedId(u32);

impl InternedId {
    /// The sentinel returned for the empty string.
    pub const INVALID: InternedId = InternedId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InternedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(resolve(*self))
    }
}

// Report writers see the resolved string, not the numeric handle.
impl Serialize for InternedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(resolve(*self))
    }
}

impl<'de> Deserialize<'de> for InternedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;
        impl Visitor<'_> for IdVisitor {
            type Value = InternedId;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an interned string")
            }
            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<InternedId, E> {
                Ok(intern(v))
            }
        }
        deserializer.deserialize_str(IdVisitor)
    }
}

/// A string intern pool. IDs it hands out are valid for its lifetime;
/// the process-wide [`pool`] never drops, so its IDs live until exit.
pub struct Interner {
    rodeo: ThreadedRodeo,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Intern `s`, returning its stable ID. `""` maps to the sentinel.
    pub fn intern(&self, s: &str) -> InternedId {
        if s.is_empty() {
            return InternedId::INVALID;
        }
        let spur = self.rodeo.get_or_intern(s);
        // Spur indices are 0-based; shift past the sentinel.
        InternedId(spur.into_usize() as u32 + 1)
    }

    /// Look up `s` without inserting it.
    pub fn get(&self, s: &str) -> Option<InternedId> {
        if s.is_empty() {
            return Some(InternedId::INVALID);
        }
        self.rodeo
            .get(s)
            .map(|spur| InternedId(spur.into_usize() as u32 + 1))
    }

    /// Resolve an ID back to its string. The sentinel and unknown IDs
    /// resolve to `""`.
    pub fn resolve(&self, id: InternedId) -> &str {
        if !id.is_valid() {
            return "";
        }
        match Spur::try_from_usize((id.0 - 1) as usize) {
            Some(spur) => self.rodeo.try_resolve(&spur).unwrap_or(""),
            None => "",
        }
    }

    /// Number of distinct strings interned (excluding the sentinel).
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide pool. IDs persist until process exit; a long-running
/// daemon embedding several graphs should budget for that.
pub fn pool() -> &'static Interner {
    static POOL: OnceLock<Interner> = OnceLock::new();
    POOL.get_or_init(Interner::new)
}

/// Intern into the process-wide pool.
pub fn intern(s: &str) -> InternedId {
    pool().intern(s)
}

/// Resolve against the process-wide pool.
pub fn resolve(id: InternedId) -> &'static str {
    pool().resolve(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_sentinel() {
        let pool = Interner::new();
        assert_eq!(pool.intern(""), InternedId::INVALID);
        assert_eq!(pool.resolve(InternedId::INVALID), "");
    }

    #[test]
    fn ids_are_stable_and_one_based() {
        let pool = Interner::new();
        let a = pool.intern("arn:aws:ec2:us-east-1:123:volume/vol-1");
        let b = pool.intern("arn:aws:ec2:us-east-1:123:volume/vol-1");
        assert_eq!(a, b);
        assert!(a.is_valid());
        assert_eq!(pool.resolve(a), "arn:aws:ec2:us-east-1:123:volume/vol-1");
    }

    #[test]
    fn unknown_id_resolves_empty() {
        let pool = Interner::new();
        assert_eq!(pool.resolve(InternedId(9999)), "");
    }
}
