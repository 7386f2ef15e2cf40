//! Loot table composition and resolution for the Debris rubble blocks.
//!
//! Tables are assembled once at data-load time by [`merge::LootMerger`]
//! from the builtin fragments, tag aliases, integration contributions and
//! user override files, then frozen. [`resolve::resolve`] rolls a frozen
//! table into concrete [`item::ItemStack`]s.

pub mod entry;
pub mod ident;
pub mod item;
pub mod merge;
pub mod pool;
pub mod registry;
pub mod resolve;
pub mod resolver;
pub mod source;
pub mod table;

#[cfg(test)]
pub(crate) mod test_support;

pub use entry::{BuildError, EntryKind, ItemDescriptor, LootEntry, LootEntryBuilder};
pub use ident::{ItemId, ResourceLocation, SubtypeSelector};
pub use item::ItemStack;
pub use merge::{merge_pool_into, merge_table_into, LootMerger, MergeError, MergeSource, TableHandle};
pub use pool::{LootPool, LootPoolBuilder};
pub use registry::{EmbeddedResources, ItemHandle, ItemRegistry, ResourceProvider, TagRegistry};
pub use resolve::resolve;
pub use resolver::{ItemResolver, ResolveError};
pub use source::{LoadError, SourceLoader};
pub use table::{LootTable, TableError};
