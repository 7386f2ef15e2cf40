use std::path::{Path, PathBuf};
use std::sync::Arc;

use debris_config::LootConfig;
use debris_util::random::RandomImpl;
use indexmap::IndexMap;
use log::{debug, info, warn};
use thiserror::Error;

use crate::entry::{LootEntry, LootEntryBuilder};
use crate::ident::ResourceLocation;
use crate::item::ItemStack;
use crate::pool::LootPool;
use crate::registry::{ItemRegistry, ResourceProvider, TagRegistry};
use crate::resolver::ItemResolver;
use crate::source::{LoadError, SourceLoader};
use crate::table::{LootTable, TableError};

#[derive(Error, Debug, PartialEq)]
pub enum MergeError {
    #[error("loot table [{0}] is not registered")]
    UnknownTable(ResourceLocation),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Handle to a registered table identity, issued once at startup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TableHandle(usize);

/// Merges entries into a pool with last-applied-wins semantics: an entry
/// whose name is already present replaces the old one, with a diagnostic
/// naming the provenance.
pub fn merge_pool_into(
    target: &mut LootPool,
    incoming: impl IntoIterator<Item = LootEntry>,
    provenance: &str,
) {
    for entry in incoming {
        if target.entry(entry.name()).is_some() {
            info!(
                "Replacing entry [{}] in pool [{}] from [{}]",
                entry.name(),
                target.name(),
                provenance
            );
        }
        target.put(entry);
    }
}

/// A pending contribution: a parsed table fragment, or raw entries
/// destined for a named pool. The provenance id feeds diagnostics only;
/// precedence is purely application order.
pub enum MergeSource {
    Fragment(LootTable),
    Entries {
        pool: String,
        entries: Vec<LootEntry>,
        provenance: String,
    },
}

impl MergeSource {
    pub fn apply(self, target: &mut LootTable) -> Result<(), TableError> {
        match self {
            Self::Fragment(fragment) => merge_table_into(target, fragment),
            Self::Entries {
                pool,
                entries,
                provenance,
            } => {
                if let Some(target_pool) = target.pool_mut(&pool)? {
                    merge_pool_into(target_pool, entries, &provenance);
                }
                Ok(())
            }
        }
    }
}

/// Merges a whole source table: pools missing from the target are adopted
/// as-is, pools present have their entries merged entry-wise.
pub fn merge_table_into(target: &mut LootTable, source: LootTable) -> Result<(), TableError> {
    let provenance = source.id().to_string();
    for pool in source.into_pools() {
        match target.pool_mut(pool.name())? {
            Some(existing) => merge_pool_into(existing, pool.into_entries(), &provenance),
            None => {
                info!("Adding pool [{}] to table [{}]", pool.name(), target.id());
                target.insert_pool(pool)?;
            }
        }
    }
    Ok(())
}

/// Owns the registered tables and runs the load-time composition sequence.
/// All collaborators are injected; the merger holds no global state.
pub struct LootMerger {
    resolver: ItemResolver,
    resources: Arc<dyn ResourceProvider>,
    config: LootConfig,
    data_dir: PathBuf,
    tables: IndexMap<ResourceLocation, LootTable>,
}

impl LootMerger {
    pub fn new(
        items: Arc<dyn ItemRegistry>,
        tags: Arc<dyn TagRegistry>,
        resources: Arc<dyn ResourceProvider>,
        config: LootConfig,
        data_dir: &Path,
    ) -> Self {
        Self {
            resolver: ItemResolver::new(items, tags),
            resources,
            config,
            data_dir: data_dir.to_path_buf(),
            tables: IndexMap::new(),
        }
    }

    /// Registers a table identity. Idempotent; the handle is stable for
    /// the lifetime of the merger.
    pub fn register_table(&mut self, id: ResourceLocation) -> TableHandle {
        if let Some(index) = self.tables.get_index_of(&id) {
            return TableHandle(index);
        }
        let (index, _) = self.tables.insert_full(id.clone(), LootTable::new(id));
        TableHandle(index)
    }

    pub fn table(&self, id: &ResourceLocation) -> Option<&LootTable> {
        self.tables.get(id)
    }

    pub fn table_by_handle(&self, handle: TableHandle) -> Option<&LootTable> {
        self.tables.get_index(handle.0).map(|(_, table)| table)
    }

    /// The host's "table about to be used" notification. Rebuilds the
    /// table from scratch by applying, in order: the builtin fragment,
    /// configured roll bounds, tag-derived entries, per-integration
    /// contributions, then user override files. No single bad source
    /// aborts the sequence; the table is finalized afterwards.
    pub fn on_table_load_requested(&mut self, id: &ResourceLocation) -> Result<(), MergeError> {
        if !self.tables.contains_key(id) {
            return Err(MergeError::UnknownTable(id.clone()));
        }

        let mut table = LootTable::new(id.clone());
        let loader = SourceLoader::new(&self.resolver, self.resources.as_ref());
        let pool_name = id.path.clone();

        // Builtin fragment bundled with the mod, named after the table.
        match loader.load_table(&pool_name) {
            Ok(fragment) => MergeSource::Fragment(fragment).apply(&mut table)?,
            Err(LoadError::SourceNotFound(_)) => {
                debug!("No builtin loot fragment for [{id}]")
            }
            Err(err) => warn!("{err}"),
        }

        if table.pool(&pool_name).is_none() {
            warn!("Can't find pool [{pool_name}] in loot table [{id}]; starting it empty");
            table.insert_pool(LootPool::new(
                &pool_name,
                self.config.rolls,
                self.config.bonus_rolls,
            ))?;
        }

        if let Some(pool) = table.pool_mut(&pool_name)? {
            pool.set_roll(self.config.rolls);
            pool.set_bonus_roll(self.config.bonus_rolls);
        }

        let tag_entries = self.tag_entries(&pool_name);
        if !tag_entries.is_empty() {
            MergeSource::Entries {
                pool: pool_name.clone(),
                entries: tag_entries,
                provenance: "tags".to_string(),
            }
            .apply(&mut table)?;
        }

        for mod_id in &self.config.integrations {
            match loader.load_table(mod_id) {
                Ok(mut fragment) => {
                    if let Some(source_pool) = fragment.take_pool(&pool_name)? {
                        MergeSource::Entries {
                            pool: pool_name.clone(),
                            entries: source_pool.into_entries().collect(),
                            provenance: mod_id.clone(),
                        }
                        .apply(&mut table)?;
                    }
                }
                Err(LoadError::SourceNotFound(_)) => {
                    debug!("Mod [{mod_id}] ships no loot for [{id}]")
                }
                Err(err) => warn!("{err}"),
            }
        }

        for file in &self.config.external_files {
            let path = self.data_dir.join(file);
            match loader.load_entries_file(&path) {
                Ok(entries) => MergeSource::Entries {
                    pool: pool_name.clone(),
                    entries,
                    provenance: file.clone(),
                }
                .apply(&mut table)?,
                Err(LoadError::SourceNotFound(_)) => warn!(
                    "Unable to locate external configuration file [{}]",
                    path.display()
                ),
                Err(err) => warn!("{err}"),
            }
        }

        table.finalize();
        self.tables.insert(id.clone(), table);
        Ok(())
    }

    /// The harvest path: rolls the named pools of a registered table into
    /// stacks, honoring the `use_luck` toggle. An unknown or not-yet-loaded
    /// table drops nothing.
    pub fn drops(
        &self,
        id: &ResourceLocation,
        pool_names: &[&str],
        random: &mut impl RandomImpl,
        luck: Option<f32>,
    ) -> Vec<ItemStack> {
        let Some(table) = self.tables.get(id) else {
            return Vec::new();
        };
        let luck = if self.config.use_luck { luck } else { None };
        crate::resolve::resolve(table, pool_names, random, luck)
    }

    fn tag_entries(&self, pool_name: &str) -> Vec<LootEntry> {
        let mut entries = Vec::new();
        for row in self
            .config
            .tag_entries
            .iter()
            .filter(|row| row.pool == pool_name)
        {
            let Some(descriptor) = self.resolver.resolve_tag(&row.tag) else {
                debug!("Tag [{}] has no members; skipping", row.tag);
                continue;
            };
            match LootEntryBuilder::new(&row.tag)
                .item(descriptor)
                .weight(row.weight)
                .count(row.count.min, row.count.max)
                .build()
            {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!("Bad tag entry for [{}]: {}", row.tag, err),
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::test_support::{rubble_merger, rubble_merger_in, rubble_resolver, MapResources};
    use debris_util::math::IntRange;

    fn entry(resolver: &ItemResolver, name: &str, weight: u32) -> LootEntry {
        LootEntryBuilder::new(name)
            .item(resolver.resolve("minecraft:bone").unwrap())
            .weight(weight)
            .build()
            .unwrap()
    }

    #[test]
    fn override_wins_on_duplicate_names() {
        let resolver = rubble_resolver();
        let mut pool = crate::pool::LootPoolBuilder::new("main")
            .entry(entry(&resolver, "A", 50))
            .build()
            .unwrap();

        merge_pool_into(&mut pool, [entry(&resolver, "A", 0)], "override.json");

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.entry("A").unwrap().weight(), 0);
    }

    #[test]
    fn repeated_application_is_idempotent() {
        let resolver = rubble_resolver();
        let base = || {
            crate::pool::LootPoolBuilder::new("main")
                .entry(entry(&resolver, "keep", 10))
                .entry(entry(&resolver, "A", 50))
                .build()
                .unwrap()
        };
        let source = [entry(&resolver, "A", 7), entry(&resolver, "B", 3)];

        let mut once = base();
        merge_pool_into(&mut once, source.clone(), "src");

        let mut twice = base();
        merge_pool_into(&mut twice, source.clone(), "src");
        merge_pool_into(&mut twice, source, "src");

        let snapshot = |pool: &LootPool| {
            pool.entries()
                .map(|e| (e.name().to_string(), e.weight()))
                .collect::<Vec<_>>()
        };
        assert_eq!(snapshot(&once), snapshot(&twice));
    }

    #[test]
    fn table_merge_adopts_missing_pools() {
        let resolver = rubble_resolver();
        let mut target = LootTable::new(ResourceLocation::debris("t"));
        let mut source = LootTable::new(ResourceLocation::debris("s"));
        source
            .insert_pool(
                crate::pool::LootPoolBuilder::new("extra")
                    .entry(entry(&resolver, "A", 1))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        merge_table_into(&mut target, source).unwrap();
        assert!(target.pool("extra").is_some());
    }

    #[test]
    fn unregistered_table_is_an_error() {
        let mut merger = rubble_merger(MapResources::default(), LootConfig::default());
        let id = ResourceLocation::debris("pile_of_rubble");
        assert_eq!(
            merger.on_table_load_requested(&id),
            Err(MergeError::UnknownTable(id))
        );
    }

    #[test]
    fn load_sequence_composes_all_sources() {
        let _ = env_logger::try_init();
        let resources = MapResources::default()
            .resource(
                "assets/debris/loot_tables/pile_of_rubble.json",
                r#"{ "pools": [ { "name": "pile_of_rubble",
                                 "rolls": { "min": 5, "max": 9 },
                                 "entries": [
                                   { "name": "minecraft:bone", "item": "minecraft:bone", "weight": 100 },
                                   { "name": "minecraft:coal", "item": "minecraft:coal", "weight": 75 } ] } ] }"#,
            )
            .resource(
                "assets/debris/loot_tables/somemod.json",
                r#"{ "pools": [ { "name": "pile_of_rubble",
                                 "entries": [
                                   { "name": "minecraft:coal", "item": "minecraft:coal", "weight": 10 },
                                   { "name": "somemod", "item": "minecraft:iron_ingot", "weight": 5 } ] } ] }"#,
            );

        let mut config = LootConfig::default();
        config.integrations = vec!["somemod".to_string()];
        config.rolls = IntRange::new(1, 3);

        let mut merger = rubble_merger(resources, config);
        let id = ResourceLocation::debris("pile_of_rubble");
        merger.register_table(id.clone());
        merger.on_table_load_requested(&id).unwrap();

        let table = merger.table(&id).unwrap();
        assert!(table.is_finalized());
        let pool = table.pool("pile_of_rubble").unwrap();

        // Config bounds override the builtin rolls.
        assert_eq!(pool.roll(), IntRange::new(1, 3));
        // Tag rows from the default config resolved against the fake registry.
        assert!(pool.entry("ore_copper").is_some());
        assert!(pool.entry("ore_tin").is_some());
        // Integration merged, overriding the builtin coal entry.
        assert_eq!(pool.entry("minecraft:coal").unwrap().weight(), 10);
        assert!(pool.entry("somemod").is_some());
        assert!(pool.entry("minecraft:bone").is_some());
    }

    #[test]
    fn missing_builtin_fragment_still_yields_a_table() {
        let mut merger = rubble_merger(MapResources::default(), LootConfig::default());
        let id = ResourceLocation::debris("pile_of_rubble");
        merger.register_table(id.clone());
        merger.on_table_load_requested(&id).unwrap();

        let pool = merger.table(&id).unwrap().pool("pile_of_rubble").unwrap();
        // Only the default tag rows contribute.
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn external_file_overrides_weight_to_zero() {
        let dir = temp_dir::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("override.json"),
            r#"[ { "name": "minecraft:bone", "item": "minecraft:bone", "weight": 0 } ]"#,
        )
        .unwrap();

        let resources = MapResources::default().resource(
            "assets/debris/loot_tables/pile_of_rubble.json",
            r#"{ "pools": [ { "name": "pile_of_rubble",
                             "rolls": 1,
                             "entries": [
                               { "name": "minecraft:bone", "item": "minecraft:bone", "weight": 50 } ] } ] }"#,
        );

        let mut config = LootConfig::default();
        config.tag_entries.clear();
        config.external_files = vec!["override.json".to_string()];

        let mut merger = rubble_merger_in(resources, config, dir.path());
        let id = ResourceLocation::debris("pile_of_rubble");
        merger.register_table(id.clone());
        merger.on_table_load_requested(&id).unwrap();

        let pool = merger.table(&id).unwrap().pool("pile_of_rubble").unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.entry("minecraft:bone").unwrap().weight(), 0);
        assert!(matches!(
            pool.entry("minecraft:bone").unwrap().kind(),
            EntryKind::Item(_)
        ));
    }

    #[test]
    fn missing_external_file_degrades_gracefully() {
        let _ = env_logger::try_init();
        let mut config = LootConfig::default();
        config.external_files = vec!["missing.json".to_string()];

        let mut merger = rubble_merger(MapResources::default(), config);
        let id = ResourceLocation::debris("pile_of_rubble");
        merger.register_table(id.clone());
        assert!(merger.on_table_load_requested(&id).is_ok());
    }

    #[test]
    fn drops_honors_the_luck_toggle() {
        use debris_util::random::RandomGenerator;

        let resources = MapResources::with_resource(
            "assets/debris/loot_tables/pile_of_rubble.json",
            r#"{ "pools": [ { "name": "pile_of_rubble",
                             "rolls": 1,
                             "entries": [
                               { "name": "lucky", "item": "minecraft:bone",
                                 "weight": 0, "quality": 5 } ] } ] }"#,
        );
        let mut config = LootConfig::default();
        config.use_luck = false;
        config.tag_entries.clear();
        config.rolls = IntRange::exactly(1);
        config.bonus_rolls = IntRange::exactly(0);

        let mut merger = rubble_merger(resources, config);
        let id = ResourceLocation::debris("pile_of_rubble");
        merger.register_table(id.clone());
        merger.on_table_load_requested(&id).unwrap();

        let mut random = RandomGenerator::from_seed(9);
        // Luck is supplied but ignored, so the quality bias never applies.
        let stacks = merger.drops(&id, &["pile_of_rubble"], &mut random, Some(1.0));
        assert!(stacks.is_empty());
    }

    #[test]
    fn reload_rebuilds_from_scratch() {
        let mut merger = rubble_merger(MapResources::default(), LootConfig::default());
        let id = ResourceLocation::debris("pile_of_rubble");
        merger.register_table(id.clone());
        merger.on_table_load_requested(&id).unwrap();
        let first = merger.table(&id).unwrap().pool("pile_of_rubble").unwrap().len();
        merger.on_table_load_requested(&id).unwrap();
        let second = merger.table(&id).unwrap().pool("pile_of_rubble").unwrap().len();
        assert_eq!(first, second);
    }
}
