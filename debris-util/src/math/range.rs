use serde::{Deserialize, Serialize};

use crate::random::RandomImpl;

/// Inclusive integer bounds, sampled uniformly.
///
/// Accepts `3`, `[1, 4]` or `{"min": 1, "max": 4}` when deserialized;
/// always serializes as the `{min, max}` form.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(from = "IntRangeRepr")]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntRangeRepr {
    Exact(i32),
    Bounds { min: i32, max: i32 },
    Pair([i32; 2]),
}

impl From<IntRangeRepr> for IntRange {
    fn from(repr: IntRangeRepr) -> Self {
        match repr {
            IntRangeRepr::Exact(v) => Self::exactly(v),
            IntRangeRepr::Bounds { min, max } => Self::new(min, max),
            IntRangeRepr::Pair([min, max]) => Self::new(min, max),
        }
    }
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(value: i32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn is_zero(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    pub fn get(&self, random: &mut impl RandomImpl) -> i32 {
        if self.min >= self.max {
            self.min
        } else {
            random.next_inbetween_i32(self.min, self.max)
        }
    }
}

/// Inclusive float bounds, sampled uniformly. Same serde forms as [`IntRange`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(from = "FloatRangeRepr")]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FloatRangeRepr {
    Exact(f32),
    Bounds { min: f32, max: f32 },
    Pair([f32; 2]),
}

impl From<FloatRangeRepr> for FloatRange {
    fn from(repr: FloatRangeRepr) -> Self {
        match repr {
            FloatRangeRepr::Exact(v) => Self::exactly(v),
            FloatRangeRepr::Bounds { min, max } => Self::new(min, max),
            FloatRangeRepr::Pair([min, max]) => Self::new(min, max),
        }
    }
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn get(&self, random: &mut impl RandomImpl) -> f32 {
        if self.min >= self.max {
            self.min
        } else {
            random.next_f32() * (self.max - self.min) + self.min
        }
    }
}
