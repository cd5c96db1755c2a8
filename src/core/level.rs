//! Level definitions
//!
//! Levels are named single-bit flags. A [`LevelMask`] combines any number of
//! them and serves both as a message's severity and as a logger's filter.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Reserved wildcard name, resolved on every lookup and never stored
pub const ALL: &str = "ALL";

/// Levels registered by [`LevelSet::new`], in bit order
pub const DEFAULT_LEVELS: [&str; 4] = ["INFO", "SUCCESS", "WARNING", "ERROR"];

const MAX_LEVELS: usize = u64::BITS as usize;

/// Bitwise combination of level flags
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LevelMask(u64);

impl LevelMask {
    pub const NONE: LevelMask = LevelMask(0);

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        LevelMask(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when at least one flag is set in both masks
    #[inline]
    pub const fn intersects(self, other: LevelMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for LevelMask {
    type Output = LevelMask;

    fn bitor(self, rhs: LevelMask) -> LevelMask {
        LevelMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for LevelMask {
    fn bitor_assign(&mut self, rhs: LevelMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for LevelMask {
    type Output = LevelMask;

    fn bitand(self, rhs: LevelMask) -> LevelMask {
        LevelMask(self.0 & rhs.0)
    }
}

impl From<u64> for LevelMask {
    fn from(bits: u64) -> Self {
        LevelMask(bits)
    }
}

impl fmt::Display for LevelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

/// Growing set of named levels
///
/// Bits are assigned in declaration order starting at bit 0 and are never
/// reassigned. The set uses interior locking so a shared `Arc<LevelSet>` can
/// gain levels while loggers keep reading it.
///
/// # Example
///
/// ```
/// use pipelog::LevelSet;
///
/// let levels = LevelSet::new();
/// let debug = levels.add("debug").unwrap();
///
/// assert_eq!(debug.bits(), 16);
/// assert_eq!(levels.get(&["ALL"]).bits(), 31);
/// assert_eq!(levels.get(&["info", "error"]).bits(), 1 | 8);
/// ```
#[derive(Debug)]
pub struct LevelSet {
    levels: RwLock<Vec<(String, LevelMask)>>,
}

impl LevelSet {
    /// Create a set with INFO, SUCCESS, WARNING and ERROR registered
    pub fn new() -> Self {
        Self::with_custom(std::iter::empty::<&str>())
    }

    /// Create a set without the default levels
    pub fn empty() -> Self {
        Self {
            levels: RwLock::new(Vec::new()),
        }
    }

    /// Create a set with the default levels followed by `custom`
    pub fn with_custom<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = Self::empty();
        for name in DEFAULT_LEVELS {
            set.add(name);
        }
        for name in custom {
            set.add(name.as_ref());
        }
        set
    }

    /// Register a level and return its bit
    ///
    /// Returns `None` for the reserved name `ALL` and when every bit is taken.
    /// Adding a name twice returns the bit assigned the first time.
    pub fn add(&self, name: &str) -> Option<LevelMask> {
        let name = name.to_uppercase();
        if name == ALL {
            return None;
        }

        let mut levels = self.levels.write();
        if let Some((_, bit)) = levels.iter().find(|(n, _)| *n == name) {
            return Some(*bit);
        }
        if levels.len() >= MAX_LEVELS {
            return None;
        }

        let bit = LevelMask(1u64 << levels.len());
        levels.push((name, bit));
        Some(bit)
    }

    /// OR together the masks of every name
    ///
    /// `ALL` resolves to every currently registered level. Unknown names
    /// contribute nothing.
    pub fn get<S: AsRef<str>>(&self, names: &[S]) -> LevelMask {
        let levels = self.levels.read();
        names
            .iter()
            .fold(LevelMask::NONE, |acc, name| acc | Self::resolve(&levels, name.as_ref()))
    }

    /// Mask of a single name
    pub fn get_one(&self, name: &str) -> LevelMask {
        Self::resolve(&self.levels.read(), name)
    }

    /// Mask covering every registered level
    pub fn all(&self) -> LevelMask {
        Self::all_of(self.levels.read().len())
    }

    /// Registered names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.levels.read().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.levels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_uppercase();
        self.levels.read().iter().any(|(n, _)| *n == name)
    }

    /// First registered name whose bit is set in `mask`
    pub fn name_of(&self, mask: LevelMask) -> Option<String> {
        self.levels
            .read()
            .iter()
            .find(|(_, bit)| bit.intersects(mask))
            .map(|(n, _)| n.clone())
    }

    fn resolve(levels: &[(String, LevelMask)], name: &str) -> LevelMask {
        let name = name.to_uppercase();
        if name == ALL {
            return Self::all_of(levels.len());
        }
        levels
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bit)| *bit)
            .unwrap_or(LevelMask::NONE)
    }

    fn all_of(count: usize) -> LevelMask {
        if count >= MAX_LEVELS {
            LevelMask(u64::MAX)
        } else {
            LevelMask((1u64 << count) - 1)
        }
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LevelSet {
    fn clone(&self) -> Self {
        Self {
            levels: RwLock::new(self.levels.read().clone()),
        }
    }
}
