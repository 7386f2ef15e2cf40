use std::path::Path;

use debris_util::math::{FloatRange, IntRange};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::{EntryKind, LootEntry, LootEntryBuilder};
use crate::ident::{ResourceLocation, SubtypeSelector};
use crate::pool::LootPoolBuilder;
use crate::registry::ResourceProvider;
use crate::resolver::ItemResolver;
use crate::table::LootTable;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The source simply isn't there. Callers treat this as "no
    /// contribution", not as a failure.
    #[error("loot source [{0}] not found")]
    SourceNotFound(String),
    #[error("failed to parse loot source [{source}]: {cause}")]
    Parse {
        source: String,
        #[source]
        cause: serde_json::Error,
    },
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    Item,
    LootTable,
    Empty,
}

fn is_item(kind: &EntryType) -> bool {
    *kind == EntryType::Item
}

fn default_weight() -> u32 {
    1
}

fn default_count() -> IntRange {
    IntRange::exactly(1)
}

/// The override-file shape of one entry. Contextual fields (`conditions`)
/// are data here, never evaluated; these records are parsed outside any
/// live game context.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct EntryRecord {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "is_item")]
    pub kind: EntryType,
    /// Item id for `item` records, table id for `loot_table` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub quality: i32,
    #[serde(default = "default_count")]
    pub count: IntRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<IntRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wear: Option<FloatRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<serde_json::Value>,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PoolRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolls: Option<IntRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_rolls: Option<IntRange>,
    pub entries: Vec<EntryRecord>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct TableRecord {
    #[serde(default)]
    pub pools: Vec<PoolRecord>,
}

/// Reads entry/pool/table definitions from embedded resources or files
/// and resolves them into engine types. Item references that fail to
/// resolve drop the single record with a warning, not the whole source.
pub struct SourceLoader<'a> {
    resolver: &'a ItemResolver,
    resources: &'a dyn ResourceProvider,
}

impl<'a> SourceLoader<'a> {
    pub fn new(resolver: &'a ItemResolver, resources: &'a dyn ResourceProvider) -> Self {
        Self {
            resolver,
            resources,
        }
    }

    /// Reduces a source id to a filesystem-safe resource token.
    pub fn sanitize(source_id: &str) -> String {
        source_id
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn resource_path(source_id: &str) -> String {
        format!(
            "assets/debris/loot_tables/{}.json",
            Self::sanitize(source_id)
        )
    }

    /// Loads an entry list from the embedded resource derived from
    /// `source_id`.
    pub fn load_entries(&self, source_id: &str) -> Result<Vec<LootEntry>, LoadError> {
        let path = Self::resource_path(source_id);
        let bytes = self
            .resources
            .open_resource(&path)
            .ok_or_else(|| LoadError::SourceNotFound(source_id.to_string()))?;
        self.entries_from_bytes(source_id, &bytes)
    }

    /// Loads an entry list from a user-supplied file.
    pub fn load_entries_file(&self, path: &Path) -> Result<Vec<LootEntry>, LoadError> {
        let source = path.display().to_string();
        let bytes = self
            .resources
            .open_file(path)
            .ok_or_else(|| LoadError::SourceNotFound(source.clone()))?;
        self.entries_from_bytes(&source, &bytes)
    }

    /// Loads a whole table fragment from the embedded resource derived
    /// from `source_id`.
    pub fn load_table(&self, source_id: &str) -> Result<LootTable, LoadError> {
        let path = Self::resource_path(source_id);
        let bytes = self
            .resources
            .open_resource(&path)
            .ok_or_else(|| LoadError::SourceNotFound(source_id.to_string()))?;
        let record: TableRecord =
            serde_json::from_slice(&bytes).map_err(|cause| LoadError::Parse {
                source: source_id.to_string(),
                cause,
            })?;
        Ok(self.table_from_record(
            ResourceLocation::debris(&Self::sanitize(source_id)),
            record,
        ))
    }

    fn entries_from_bytes(&self, source: &str, bytes: &[u8]) -> Result<Vec<LootEntry>, LoadError> {
        let records: Vec<EntryRecord> =
            serde_json::from_slice(bytes).map_err(|cause| LoadError::Parse {
                source: source.to_string(),
                cause,
            })?;
        Ok(records
            .iter()
            .filter_map(|record| self.entry_from_record(record, source))
            .collect())
    }

    fn table_from_record(&self, id: ResourceLocation, record: TableRecord) -> LootTable {
        let mut table = LootTable::new(id);
        for pool_record in record.pools {
            let mut builder = LootPoolBuilder::new(&pool_record.name);
            let rolls = pool_record.rolls.unwrap_or(IntRange::exactly(0));
            let bonus = pool_record.bonus_rolls.unwrap_or(IntRange::exactly(0));
            builder = builder.roll(rolls.min, rolls.max).bonus(bonus.min, bonus.max);
            for entry_record in &pool_record.entries {
                if let Some(entry) = self.entry_from_record(entry_record, &table.id().to_string())
                {
                    builder = builder.entry(entry);
                }
            }
            match builder.build() {
                Ok(pool) => {
                    // A fresh table can't be finalized yet.
                    let _ = table.insert_pool(pool);
                }
                Err(err) => warn!("Skipping pool [{}]: {}", pool_record.name, err),
            }
        }
        table
    }

    fn entry_from_record(&self, record: &EntryRecord, source: &str) -> Option<LootEntry> {
        let mut builder = LootEntryBuilder::new(&record.name)
            .weight(record.weight)
            .quality(record.quality)
            .count(record.count.min, record.count.max)
            .conditions(record.conditions.clone());

        builder = match record.kind {
            EntryType::Item => {
                let Some(raw) = &record.item else {
                    warn!("Entry [{}] in [{source}] names no item", record.name);
                    return None;
                };
                match self.resolver.resolve(raw) {
                    Ok(descriptor) => builder.item(descriptor),
                    Err(err) => {
                        warn!("Skipping entry [{}] in [{source}]: {err}", record.name);
                        return None;
                    }
                }
            }
            EntryType::LootTable => {
                let Some(raw) = &record.item else {
                    warn!("Entry [{}] in [{source}] names no table", record.name);
                    return None;
                };
                match raw.parse::<ResourceLocation>() {
                    Ok(location) => builder.table_reference(location),
                    Err(err) => {
                        warn!("Skipping entry [{}] in [{source}]: {err}", record.name);
                        return None;
                    }
                }
            }
            EntryType::Empty => builder.empty(),
        };

        if let Some(subtype) = record.subtype {
            builder = builder.subtype_range(subtype.min, subtype.max);
        }
        if let Some(wear) = record.wear {
            builder = builder.wear_range(wear.min, wear.max);
        }

        match builder.build() {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping entry [{}] in [{source}]: {err}", record.name);
                None
            }
        }
    }

    /// The serialization direction of the override-file format.
    pub fn record_from_entry(entry: &LootEntry) -> EntryRecord {
        let (kind, item) = match entry.kind() {
            EntryKind::Item(descriptor) => {
                let id = match descriptor.subtype {
                    SubtypeSelector::None => descriptor.location.to_string(),
                    SubtypeSelector::Any => format!("{}:*", descriptor.location),
                    SubtypeSelector::Exact(subtype) => {
                        format!("{}:{}", descriptor.location, subtype)
                    }
                };
                (EntryType::Item, Some(id))
            }
            EntryKind::TableReference(location) => {
                (EntryType::LootTable, Some(location.to_string()))
            }
            EntryKind::Empty => (EntryType::Empty, None),
        };
        EntryRecord {
            name: entry.name().to_string(),
            kind,
            item,
            weight: entry.weight(),
            quality: entry.quality(),
            count: entry.count(),
            subtype: entry.subtype_range(),
            wear: entry.wear_range(),
            conditions: entry.conditions().cloned(),
        }
    }
}
