use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::entry::ItemDescriptor;
use crate::ident::{ItemId, SubtypeSelector};
use crate::registry::{ItemRegistry, TagRegistry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("malformed item id [{0}]")]
    MalformedId(String),
    #[error("unknown item [{0}]")]
    UnknownItem(String),
}

/// Turns textual item references into [`ItemDescriptor`]s against the
/// injected host registries.
#[derive(Clone)]
pub struct ItemResolver {
    items: Arc<dyn ItemRegistry>,
    tags: Arc<dyn TagRegistry>,
}

impl ItemResolver {
    pub fn new(items: Arc<dyn ItemRegistry>, tags: Arc<dyn TagRegistry>) -> Self {
        Self { items, tags }
    }

    /// Resolves `namespace:path[:subtype]` to a descriptor.
    ///
    /// An id that fails the grammar is retried as a bare `namespace:path`
    /// with a warning before giving up, matching the lenient handling of
    /// hand-typed user configuration.
    pub fn resolve(&self, raw: &str) -> Result<ItemDescriptor, ResolveError> {
        let id = match ItemId::parse(raw) {
            Ok(id) => id,
            Err(_) if !raw.is_empty() => {
                warn!("Unknown item id [{raw}]; treating whole id as the item name");
                ItemId::fallback(raw)
            }
            Err(err) => return Err(err),
        };

        let handle = self
            .items
            .lookup(&id.location.namespace, &id.location.path)
            .ok_or_else(|| ResolveError::UnknownItem(raw.to_string()))?;

        let subtype = if self.items.supports_subtypes(handle) {
            id.subtype
        } else {
            if id.subtype != SubtypeSelector::None {
                debug!("Item [{raw}] has no subtypes; dropping the selector");
            }
            SubtypeSelector::None
        };

        Ok(ItemDescriptor {
            location: id.location,
            item: handle,
            subtype,
            durability: self.items.durability(handle),
        })
    }

    /// Resolves a tag to its first registered member, the deterministic
    /// representative for alias-derived entries. Unknown and empty tags
    /// answer `None`; callers skip those silently.
    pub fn resolve_tag(&self, tag: &str) -> Option<ItemDescriptor> {
        let handle = self.tags.members(tag).into_iter().next()?;
        let location = self.items.location(handle)?;
        Some(ItemDescriptor {
            location,
            subtype: if self.items.supports_subtypes(handle) {
                SubtypeSelector::Exact(0)
            } else {
                SubtypeSelector::None
            },
            durability: self.items.durability(handle),
            item: handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::ResourceLocation;
    use crate::test_support::FakeRegistry;

    fn resolver() -> ItemResolver {
        let registry = Arc::new(FakeRegistry::with_rubble_items());
        ItemResolver::new(registry.clone(), registry)
    }

    #[test]
    fn resolves_plain_item() {
        let descriptor = resolver().resolve("minecraft:bone").unwrap();
        assert_eq!(
            descriptor.location,
            ResourceLocation::new("minecraft", "bone")
        );
        assert_eq!(descriptor.subtype, SubtypeSelector::None);
        assert_eq!(descriptor.durability, None);
    }

    #[test]
    fn resolves_wildcard_subtype() {
        let descriptor = resolver().resolve("minecraft:dye:*").unwrap();
        assert_eq!(descriptor.subtype, SubtypeSelector::Any);
    }

    #[test]
    fn drops_selector_on_non_subtyped_item() {
        let descriptor = resolver().resolve("minecraft:bone:3").unwrap();
        assert_eq!(descriptor.subtype, SubtypeSelector::None);
    }

    #[test]
    fn unknown_item_fails() {
        assert_eq!(
            resolver().resolve("minecraft:unobtainium"),
            Err(ResolveError::UnknownItem("minecraft:unobtainium".into()))
        );
    }

    #[test]
    fn damageable_item_captures_durability() {
        let descriptor = resolver().resolve("minecraft:stone_pickaxe").unwrap();
        assert_eq!(descriptor.durability, Some(131));
    }

    #[test]
    fn tag_picks_first_member() {
        let a = resolver().resolve_tag("ore_copper").unwrap();
        let b = resolver().resolve_tag("ore_copper").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_tag_is_silent_none() {
        assert!(resolver().resolve_tag("nonexistent_tag").is_none());
    }
}
