use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::resolver::ResolveError;

/// Namespace assumed when an id carries none, per host convention.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// The namespace this mod's own tables and assets live under.
pub const MOD_NAMESPACE: &str = "debris";

const WILDCARD_TOKEN: &str = "*";

/// A `namespace:path` pair identifying a table, item or resource.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceLocation {
    pub namespace: String,
    pub path: String,
}

impl ResourceLocation {
    pub fn new(namespace: &str, path: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        }
    }

    pub fn debris(path: &str) -> Self {
        Self::new(MOD_NAMESPACE, path)
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ResourceLocation {
    type Err = ResolveError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split(':').collect::<Vec<_>>()[..] {
            [path] if !path.is_empty() => Ok(Self::new(DEFAULT_NAMESPACE, path)),
            [namespace, path] if !namespace.is_empty() && !path.is_empty() => {
                Ok(Self::new(namespace, path))
            }
            _ => Err(ResolveError::MalformedId(raw.to_string())),
        }
    }
}

impl TryFrom<String> for ResourceLocation {
    type Error = ResolveError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<ResourceLocation> for String {
    fn from(location: ResourceLocation) -> Self {
        location.to_string()
    }
}

/// Which subtype of an item an entry refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubtypeSelector {
    /// The item has no subtype concept.
    None,
    /// Any valid subtype; the concrete one is rolled at resolution time.
    Any,
    Exact(i32),
}

/// A parsed textual item reference: `namespace:path[:subtype]` where
/// `subtype` is an integer or `*`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ItemId {
    pub location: ResourceLocation,
    pub subtype: SubtypeSelector,
}

impl ItemId {
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let malformed = || ResolveError::MalformedId(raw.to_string());

        match raw.split(':').collect::<Vec<_>>()[..] {
            [_] | [_, _] => Ok(Self {
                location: raw.parse()?,
                subtype: SubtypeSelector::None,
            }),
            [namespace, path, subtype] if !namespace.is_empty() && !path.is_empty() => {
                let subtype = if subtype == WILDCARD_TOKEN {
                    SubtypeSelector::Any
                } else {
                    SubtypeSelector::Exact(subtype.parse().map_err(|_| malformed())?)
                };
                Ok(Self {
                    location: ResourceLocation::new(namespace, path),
                    subtype,
                })
            }
            _ => Err(malformed()),
        }
    }

    /// Permissive fallback: treat the whole input as `namespace:path` with
    /// no subtype. Used after [`ItemId::parse`] rejects an id so that odd
    /// but registry-known names still have a chance to resolve.
    pub fn fallback(raw: &str) -> Self {
        let (namespace, path) = match raw.split_once(':') {
            Some((ns, rest)) if !ns.is_empty() => (ns, rest),
            _ => (DEFAULT_NAMESPACE, raw),
        };
        Self {
            location: ResourceLocation::new(namespace, path),
            subtype: SubtypeSelector::None,
        }
    }
}
