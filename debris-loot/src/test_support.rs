//! In-memory collaborator fakes shared by the unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use debris_config::LootConfig;

use crate::entry::ItemDescriptor;
use crate::ident::ResourceLocation;
use crate::merge::LootMerger;
use crate::registry::{ItemHandle, ItemRegistry, ResourceProvider, TagRegistry};
use crate::resolver::ItemResolver;

struct FakeItem {
    location: ResourceLocation,
    subtypes: bool,
    durability: Option<u32>,
}

#[derive(Default)]
pub struct FakeRegistry {
    items: Vec<FakeItem>,
    by_name: HashMap<(String, String), ItemHandle>,
    tags: HashMap<String, Vec<ItemHandle>>,
}

impl FakeRegistry {
    pub fn add(&mut self, id: &str, subtypes: bool, durability: Option<u32>) -> ItemHandle {
        let location: ResourceLocation = id.parse().unwrap();
        let handle = ItemHandle(self.items.len() as u32);
        self.by_name.insert(
            (location.namespace.clone(), location.path.clone()),
            handle,
        );
        self.items.push(FakeItem {
            location,
            subtypes,
            durability,
        });
        handle
    }

    pub fn tag(&mut self, tag: &str, member: ItemHandle) {
        self.tags.entry(tag.to_string()).or_default().push(member);
    }

    /// The item set the bundled `pile_of_rubble` assets refer to, plus
    /// tagged ores for the default tag rows.
    pub fn with_rubble_items() -> Self {
        let mut registry = Self::default();
        for plain in [
            "minecraft:cobblestone",
            "minecraft:bone",
            "minecraft:rotten_flesh",
            "minecraft:coal",
            "minecraft:iron_ingot",
            "minecraft:gold_nugget",
        ] {
            registry.add(plain, false, None);
        }
        registry.add("minecraft:stone_pickaxe", false, Some(131));
        registry.add("minecraft:dye", true, None);

        let copper = registry.add("modfoundry:copper_ore", false, None);
        let tin = registry.add("modfoundry:tin_ore", false, None);
        registry.tag("ore_copper", copper);
        registry.tag("ore_tin", tin);
        registry
    }
}

impl ItemRegistry for FakeRegistry {
    fn lookup(&self, namespace: &str, path: &str) -> Option<ItemHandle> {
        self.by_name
            .get(&(namespace.to_string(), path.to_string()))
            .copied()
    }

    fn location(&self, item: ItemHandle) -> Option<ResourceLocation> {
        self.items.get(item.0 as usize).map(|i| i.location.clone())
    }

    fn supports_subtypes(&self, item: ItemHandle) -> bool {
        self.items.get(item.0 as usize).is_some_and(|i| i.subtypes)
    }

    fn durability(&self, item: ItemHandle) -> Option<u32> {
        self.items.get(item.0 as usize).and_then(|i| i.durability)
    }
}

impl TagRegistry for FakeRegistry {
    fn members(&self, tag: &str) -> Vec<ItemHandle> {
        self.tags.get(tag).cloned().unwrap_or_default()
    }
}

/// Resource provider backed by a plain map for embedded paths; files go
/// to the real filesystem so `temp-dir` tests work unchanged.
#[derive(Default)]
pub struct MapResources {
    resources: HashMap<String, String>,
}

impl MapResources {
    pub fn with_resource(path: &str, content: &str) -> Self {
        Self::default().resource(path, content)
    }

    pub fn resource(mut self, path: &str, content: &str) -> Self {
        self.resources.insert(path.to_string(), content.to_string());
        self
    }
}

impl ResourceProvider for MapResources {
    fn open_resource(&self, path: &str) -> Option<Vec<u8>> {
        self.resources.get(path).map(|s| s.as_bytes().to_vec())
    }

    fn open_file(&self, path: &Path) -> Option<Vec<u8>> {
        std::fs::read(path).ok()
    }
}

pub fn rubble_resolver() -> ItemResolver {
    let registry = Arc::new(FakeRegistry::with_rubble_items());
    ItemResolver::new(registry.clone(), registry)
}

pub fn rubble_merger(resources: MapResources, config: LootConfig) -> LootMerger {
    rubble_merger_in(resources, config, Path::new("."))
}

pub fn rubble_merger_in(resources: MapResources, config: LootConfig, data_dir: &Path) -> LootMerger {
    let registry = Arc::new(FakeRegistry::with_rubble_items());
    LootMerger::new(
        registry.clone(),
        registry,
        Arc::new(resources),
        config,
        data_dir,
    )
}

pub fn bone() -> ItemDescriptor {
    rubble_resolver().resolve("minecraft:bone").unwrap()
}

pub fn pickaxe() -> ItemDescriptor {
    rubble_resolver().resolve("minecraft:stone_pickaxe").unwrap()
}

pub fn wildcard_dye() -> ItemDescriptor {
    rubble_resolver().resolve("minecraft:dye:*").unwrap()
}
