use debris_util::math::IntRange;
use log::warn;
use serde::{Deserialize, Serialize};

/// Options controlling how rubble loot tables are assembled and rolled.
///
/// The defaults match the shipped `pile_of_rubble` table.
#[derive(Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LootConfig {
    /// Scale bonus rolls and entry quality by the player's luck.
    pub use_luck: bool,
    /// Loot files supplied by the user, relative to the data directory.
    /// A listed file that does not exist is a warning, not an error.
    pub external_files: Vec<String>,
    /// Mod ids whose bundled loot contributions should be merged in.
    /// Only ids the host reports as loaded belong here.
    pub integrations: Vec<String>,
    /// Rolls made against a pool each time it is resolved.
    pub rolls: IntRange,
    /// Extra rolls granted per point of luck.
    pub bonus_rolls: IntRange,
    /// Tag-derived single-item entries added per pool.
    pub tag_entries: Vec<TagEntryConfig>,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct TagEntryConfig {
    /// Pool the entry is destined for.
    pub pool: String,
    /// Tag name; its first registered member is used as the drop.
    pub tag: String,
    pub weight: u32,
    pub count: IntRange,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            use_luck: true,
            rolls: IntRange::new(1, 2),
            bonus_rolls: IntRange::new(0, 1),
            external_files: Vec::new(),
            integrations: Vec::new(),
            tag_entries: vec![
                TagEntryConfig {
                    pool: "pile_of_rubble".into(),
                    tag: "ore_copper".into(),
                    weight: 50,
                    count: IntRange::new(1, 2),
                },
                TagEntryConfig {
                    pool: "pile_of_rubble".into(),
                    tag: "ore_tin".into(),
                    weight: 50,
                    count: IntRange::new(1, 2),
                },
            ],
        }
    }
}

impl LootConfig {
    pub fn validate(&mut self) {
        for range in [&mut self.rolls, &mut self.bonus_rolls] {
            if !range.is_valid() {
                warn!(
                    "Roll bounds ({}, {}) are inverted; swapping",
                    range.min, range.max
                );
                std::mem::swap(&mut range.min, &mut range.max);
            }
            if range.min < 0 {
                warn!("Roll bounds must not be negative; clamping to 0");
                range.min = range.min.max(0);
                range.max = range.max.max(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_rubble_tags() {
        let config = LootConfig::default();
        assert_eq!(config.rolls, IntRange::new(1, 2));
        assert!(config.tag_entries.iter().any(|t| t.tag == "ore_copper"));
        assert!(config
            .tag_entries
            .iter()
            .all(|t| t.pool == "pile_of_rubble"));
    }

    #[test]
    fn validate_repairs_inverted_bounds() {
        let mut config = LootConfig {
            rolls: IntRange::new(4, 1),
            bonus_rolls: IntRange::new(-2, 1),
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.rolls, IntRange::new(1, 4));
        assert_eq!(config.bonus_rolls, IntRange::new(0, 1));
    }
}
