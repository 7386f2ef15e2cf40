use debris_util::math::{FloatRange, IntRange};
use thiserror::Error;

use crate::ident::{ResourceLocation, SubtypeSelector};
use crate::item::ItemStack;
use crate::registry::ItemHandle;

/// A droppable item as the engine sees it: resolved handle plus everything
/// needed to shape the output without going back to the registry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ItemDescriptor {
    pub location: ResourceLocation,
    pub item: ItemHandle,
    pub subtype: SubtypeSelector,
    pub durability: Option<u32>,
}

/// What an entry produces when drawn.
#[derive(Clone, PartialEq, Debug)]
pub enum EntryKind {
    Item(ItemDescriptor),
    /// Carried through merges as data; this engine resolves tables flat
    /// and never recurses into a referenced table.
    TableReference(ResourceLocation),
    Empty,
}

#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    #[error("invalid loot entry [{name}]: {reason}")]
    InvalidEntry { name: String, reason: String },
    #[error("invalid loot pool [{name}]: {reason}")]
    InvalidPool { name: String, reason: String },
    #[error("duplicate entry [{0}] in pool")]
    DuplicateEntry(String),
}

/// One weighted drop rule. Immutable once built; all invariants are
/// enforced by [`LootEntryBuilder::build`].
#[derive(Clone, PartialEq, Debug)]
pub struct LootEntry {
    pub(crate) name: String,
    pub(crate) kind: EntryKind,
    pub(crate) weight: u32,
    pub(crate) quality: i32,
    pub(crate) count: IntRange,
    pub(crate) subtype: Option<IntRange>,
    pub(crate) wear: Option<FloatRange>,
    /// Contextual conditions from external sources, kept as opaque data.
    /// This engine never evaluates them.
    pub(crate) conditions: Option<serde_json::Value>,
}

impl LootEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn quality(&self) -> i32 {
        self.quality
    }

    pub fn count(&self) -> IntRange {
        self.count
    }

    pub fn subtype_range(&self) -> Option<IntRange> {
        self.subtype
    }

    pub fn wear_range(&self) -> Option<FloatRange> {
        self.wear
    }

    pub fn conditions(&self) -> Option<&serde_json::Value> {
        self.conditions.as_ref()
    }
}

pub struct LootEntryBuilder {
    name: String,
    kind: Option<EntryKind>,
    weight: u32,
    quality: i32,
    count: IntRange,
    subtype: Option<IntRange>,
    wear: Option<FloatRange>,
    conditions: Option<serde_json::Value>,
}

impl LootEntryBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: None,
            weight: 1,
            quality: 0,
            count: IntRange::exactly(1),
            subtype: None,
            wear: None,
            conditions: None,
        }
    }

    pub fn item(mut self, descriptor: ItemDescriptor) -> Self {
        self.kind = Some(EntryKind::Item(descriptor));
        self
    }

    /// Initializes the entry from a concrete sample stack: the sample's
    /// subtype is pinned and its remaining-durability fraction becomes a
    /// fixed wear value.
    pub fn item_sample(mut self, mut descriptor: ItemDescriptor, sample: &ItemStack) -> Self {
        if let Some(subtype) = sample.subtype {
            descriptor.subtype = SubtypeSelector::Exact(subtype);
        }
        if let (Some(durability), Some(damage)) = (descriptor.durability, sample.damage) {
            self.wear = Some(FloatRange::exactly(damage as f32 / durability as f32));
        }
        self.kind = Some(EntryKind::Item(descriptor));
        self
    }

    pub fn table_reference(mut self, table: ResourceLocation) -> Self {
        self.kind = Some(EntryKind::TableReference(table));
        self
    }

    pub fn empty(mut self) -> Self {
        self.kind = Some(EntryKind::Empty);
        self
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn quality(mut self, quality: i32) -> Self {
        self.quality = quality;
        self
    }

    pub fn count(mut self, min: i32, max: i32) -> Self {
        self.count = IntRange::new(min, max);
        self
    }

    pub fn subtype_range(mut self, min: i32, max: i32) -> Self {
        self.subtype = Some(IntRange::new(min, max));
        self
    }

    pub fn wear_range(mut self, min: f32, max: f32) -> Self {
        self.wear = Some(FloatRange::new(min, max));
        self
    }

    pub fn conditions(mut self, conditions: Option<serde_json::Value>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn build(self) -> Result<LootEntry, BuildError> {
        let invalid = |reason: &str| BuildError::InvalidEntry {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(BuildError::InvalidEntry {
                name: String::new(),
                reason: "empty name".to_string(),
            });
        }
        let kind = self.kind.clone().ok_or_else(|| invalid("no drop kind set"))?;

        if !self.count.is_valid() || self.count.min < 0 {
            return Err(invalid("count bounds must satisfy 0 <= min <= max"));
        }

        if self.subtype.is_some() {
            match &kind {
                EntryKind::Item(descriptor) if descriptor.subtype == SubtypeSelector::Any => {}
                _ => return Err(invalid("subtype range requires a wildcard-subtype item")),
            }
        }
        if let Some(subtype) = self.subtype {
            if !subtype.is_valid() {
                return Err(invalid("subtype bounds must satisfy min <= max"));
            }
        }

        if let Some(wear) = self.wear {
            match &kind {
                EntryKind::Item(descriptor) if descriptor.durability.is_some() => {}
                _ => return Err(invalid("wear range requires a damageable item")),
            }
            if !wear.is_valid() || wear.min < 0.0 || wear.max > 1.0 {
                return Err(invalid("wear bounds must satisfy 0 <= min <= max <= 1"));
            }
        }

        Ok(LootEntry {
            name: self.name,
            kind,
            weight: self.weight,
            quality: self.quality,
            count: self.count,
            subtype: self.subtype,
            wear: self.wear,
            conditions: self.conditions,
        })
    }
}
