use indexmap::IndexMap;
use thiserror::Error;

use crate::ident::ResourceLocation;
use crate::pool::LootPool;

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("loot table [{0}] is finalized and can no longer change")]
    Finalized(ResourceLocation),
}

/// A named collection of pools. Mutable while being assembled, frozen
/// once [`LootTable::finalize`] runs; resolution only ever sees the
/// frozen form.
#[derive(Clone, Debug)]
pub struct LootTable {
    id: ResourceLocation,
    pools: IndexMap<String, LootPool>,
    finalized: bool,
}

impl LootTable {
    pub fn new(id: ResourceLocation) -> Self {
        Self {
            id,
            pools: IndexMap::new(),
            finalized: false,
        }
    }

    pub fn id(&self) -> &ResourceLocation {
        &self.id
    }

    pub fn pool(&self, name: &str) -> Option<&LootPool> {
        self.pools.get(name)
    }

    pub fn pools(&self) -> impl Iterator<Item = &LootPool> {
        self.pools.values()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub(crate) fn into_pools(self) -> impl Iterator<Item = LootPool> {
        self.pools.into_values()
    }

    pub(crate) fn finalize(&mut self) {
        self.finalized = true;
    }

    pub(crate) fn pool_mut(&mut self, name: &str) -> Result<Option<&mut LootPool>, TableError> {
        self.guard()?;
        Ok(self.pools.get_mut(name))
    }

    pub(crate) fn insert_pool(&mut self, pool: LootPool) -> Result<(), TableError> {
        self.guard()?;
        self.pools.insert(pool.name().to_string(), pool);
        Ok(())
    }

    pub(crate) fn take_pool(&mut self, name: &str) -> Result<Option<LootPool>, TableError> {
        self.guard()?;
        Ok(self.pools.shift_remove(name))
    }

    fn guard(&self) -> Result<(), TableError> {
        if self.finalized {
            return Err(TableError::Finalized(self.id.clone()));
        }
        Ok(())
    }
}
