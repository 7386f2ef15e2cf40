use std::fs;
use std::path::Path;

use crate::ident::ResourceLocation;

/// Opaque host item handle, issued by the [`ItemRegistry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ItemHandle(pub u32);

/// Host item registry. Injected at engine construction; the engine never
/// consults global state for item lookups.
pub trait ItemRegistry: Send + Sync {
    fn lookup(&self, namespace: &str, path: &str) -> Option<ItemHandle>;

    /// The textual id the handle was registered under.
    fn location(&self, item: ItemHandle) -> Option<ResourceLocation>;

    /// Whether the item carries integer subtypes (metadata variants).
    fn supports_subtypes(&self, item: ItemHandle) -> bool;

    /// Maximum damage the item can take, `None` for undamageable items.
    fn durability(&self, item: ItemHandle) -> Option<u32>;
}

/// Host alias/tag registry (ore dictionary analogue).
pub trait TagRegistry: Send + Sync {
    /// All items registered under `tag`, in registration order.
    /// Empty when the tag is unknown.
    fn members(&self, tag: &str) -> Vec<ItemHandle>;
}

/// Byte-stream access for loot sources. `open_resource` serves embedded
/// assets, `open_file` user-supplied files; both answer `None` for a
/// missing source rather than erroring.
pub trait ResourceProvider: Send + Sync {
    fn open_resource(&self, path: &str) -> Option<Vec<u8>>;

    fn open_file(&self, path: &Path) -> Option<Vec<u8>>;
}

/// The assets bundled into this crate, plus plain filesystem access.
pub struct EmbeddedResources;

static EMBEDDED: &[(&str, &str)] = &[
    (
        "assets/debris/loot_tables/pile_of_rubble.json",
        include_str!("../assets/debris/loot_tables/pile_of_rubble.json"),
    ),
    (
        "assets/debris/loot_tables/thermalfoundation.json",
        include_str!("../assets/debris/loot_tables/thermalfoundation.json"),
    ),
    (
        "assets/debris/loot_tables/railcraft.json",
        include_str!("../assets/debris/loot_tables/railcraft.json"),
    ),
];

impl ResourceProvider for EmbeddedResources {
    fn open_resource(&self, path: &str) -> Option<Vec<u8>> {
        EMBEDDED
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, content)| content.as_bytes().to_vec())
    }

    fn open_file(&self, path: &Path) -> Option<Vec<u8>> {
        fs::read(path).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_assets_are_served() {
        let provider = EmbeddedResources;
        assert!(provider
            .open_resource("assets/debris/loot_tables/pile_of_rubble.json")
            .is_some());
        assert!(provider.open_resource("assets/debris/loot_tables/nope.json").is_none());
    }
}
