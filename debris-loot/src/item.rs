use crate::registry::ItemHandle;

/// A concrete resolved drop, ready for the host to spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemStack {
    pub item: ItemHandle,
    pub count: u32,
    /// Set only for items with subtypes.
    pub subtype: Option<i32>,
    /// Damage already applied, on the item's own durability scale.
    /// Set only for damageable items with a wear range.
    pub damage: Option<u32>,
}

impl ItemStack {
    pub fn new(item: ItemHandle, count: u32) -> Self {
        Self {
            item,
            count,
            subtype: None,
            damage: None,
        }
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = Some(damage);
        self
    }
}
