use debris_util::math::IntRange;
use indexmap::IndexMap;

use crate::entry::{BuildError, LootEntry};

/// A named set of entries plus roll controls. Entries are keyed by name
/// and keep insertion order, which makes the weighted walk deterministic.
#[derive(Clone, Debug)]
pub struct LootPool {
    name: String,
    entries: IndexMap<String, LootEntry>,
    roll: IntRange,
    bonus_roll: IntRange,
}

impl LootPool {
    pub(crate) fn new(name: &str, roll: IntRange, bonus_roll: IntRange) -> Self {
        Self {
            name: name.to_string(),
            entries: IndexMap::new(),
            roll,
            bonus_roll,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roll(&self) -> IntRange {
        self.roll
    }

    pub fn bonus_roll(&self) -> IntRange {
        self.bonus_roll
    }

    pub fn entry(&self, name: &str) -> Option<&LootEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &LootEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn set_roll(&mut self, roll: IntRange) {
        self.roll = roll;
    }

    pub(crate) fn set_bonus_roll(&mut self, bonus_roll: IntRange) {
        self.bonus_roll = bonus_roll;
    }

    /// Inserts at the end of the walk order, replacing any entry of the
    /// same name. Returns the replaced entry.
    pub(crate) fn put(&mut self, entry: LootEntry) -> Option<LootEntry> {
        let previous = self.entries.shift_remove(entry.name());
        self.entries.insert(entry.name().to_string(), entry);
        previous
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = LootEntry> {
        self.entries.into_values()
    }
}

pub struct LootPoolBuilder {
    name: String,
    entries: Vec<LootEntry>,
    roll: IntRange,
    bonus_roll: IntRange,
}

impl LootPoolBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
            roll: IntRange::exactly(0),
            bonus_roll: IntRange::exactly(0),
        }
    }

    pub fn entry(mut self, entry: LootEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn roll(mut self, min: i32, max: i32) -> Self {
        self.roll = IntRange::new(min, max);
        self
    }

    pub fn bonus(mut self, min: i32, max: i32) -> Self {
        self.bonus_roll = IntRange::new(min, max);
        self
    }

    pub fn build(self) -> Result<LootPool, BuildError> {
        for (label, range) in [("roll", self.roll), ("bonus roll", self.bonus_roll)] {
            if !range.is_valid() || range.min < 0 {
                return Err(BuildError::InvalidPool {
                    name: self.name.clone(),
                    reason: format!("{label} bounds must satisfy 0 <= min <= max"),
                });
            }
        }
        let mut pool = LootPool::new(&self.name, self.roll, self.bonus_roll);
        for entry in self.entries {
            if pool.entry(entry.name()).is_some() {
                return Err(BuildError::DuplicateEntry(entry.name().to_string()));
            }
            pool.put(entry);
        }
        Ok(pool)
    }
}
