use debris_util::math::IntRange;
use debris_util::random::RandomImpl;

use crate::entry::{EntryKind, LootEntry};
use crate::ident::SubtypeSelector;
use crate::item::ItemStack;
use crate::pool::LootPool;
use crate::table::LootTable;

/// Rolls the named pools of a finalized table into concrete stacks.
///
/// Pools are processed in the order given and each pool's rounds are
/// concatenated. Read-only; callers may resolve the same table from
/// several places at once as long as each brings its own random source.
pub fn resolve(
    table: &LootTable,
    pool_names: &[&str],
    random: &mut impl RandomImpl,
    luck: Option<f32>,
) -> Vec<ItemStack> {
    let mut stacks = Vec::new();
    for name in pool_names {
        if let Some(pool) = table.pool(name) {
            resolve_pool(pool, random, luck, &mut stacks);
        }
    }
    stacks
}

fn resolve_pool(
    pool: &LootPool,
    random: &mut impl RandomImpl,
    luck: Option<f32>,
    stacks: &mut Vec<ItemStack>,
) {
    let rolls = pool.roll().get(random).max(0);
    let bonus = match luck {
        Some(luck) if !pool.bonus_roll().is_zero() => {
            ((luck * pool.bonus_roll().get(random) as f32).floor() as i32).max(0)
        }
        _ => 0,
    };

    for _ in 0..rolls + bonus {
        if let Some(entry) = weighted_draw(pool, random, luck.unwrap_or(0.0)) {
            expand(entry, random, stacks);
        }
    }
}

fn effective_weight(entry: &LootEntry, luck: f32) -> u64 {
    let biased = i64::from(entry.weight) + (entry.quality as f32 * luck).floor() as i64;
    biased.max(0) as u64
}

/// Cumulative-weight selection over the pool's entries in their stable
/// insertion order. A round whose effective weights sum to zero selects
/// nothing; that is a valid empty outcome, not an error.
fn weighted_draw<'a>(
    pool: &'a LootPool,
    random: &mut impl RandomImpl,
    luck: f32,
) -> Option<&'a LootEntry> {
    let total: u64 = pool
        .entries()
        .map(|entry| effective_weight(entry, luck))
        .sum();
    if total == 0 {
        return None;
    }

    let roll = random.next_f64() * total as f64;
    let mut accumulated = 0u64;
    let mut drawn = None;
    for entry in pool.entries() {
        let weight = effective_weight(entry, luck);
        if weight == 0 {
            continue;
        }
        accumulated += weight;
        drawn = Some(entry);
        if accumulated as f64 > roll {
            break;
        }
    }
    drawn
}

fn expand(entry: &LootEntry, random: &mut impl RandomImpl, stacks: &mut Vec<ItemStack>) {
    let EntryKind::Item(descriptor) = &entry.kind else {
        // Empty entries drop nothing; table references are flat data here.
        return;
    };

    let count = entry.count.get(random).max(0);
    if count == 0 {
        return;
    }

    let mut stack = ItemStack::new(descriptor.item, count as u32);
    stack.subtype = match descriptor.subtype {
        SubtypeSelector::None => None,
        SubtypeSelector::Exact(subtype) => Some(subtype),
        SubtypeSelector::Any => {
            Some(entry.subtype.unwrap_or(IntRange::exactly(0)).get(random))
        }
    };
    if let (Some(wear), Some(durability)) = (entry.wear, descriptor.durability) {
        stack.damage = Some((wear.get(random) * durability as f32).round() as u32);
    }

    stacks.push(stack);
}
