// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed set of event categories and their display attributes.

use alloc::string::String;
use alloc::vec::Vec;

/// Index of a category within a [`CategoryRegistry`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(u8);

impl CategoryId {
    /// Wraps a raw registry index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Returns the registry index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An opaque RGB color packed as `0xRRGGBB`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackedColor(pub u32);

impl PackedColor {
    /// Packs 8-bit channels.
    #[must_use]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Unpacks into `[r, g, b]`.
    #[must_use]
    pub const fn to_rgb8(self) -> [u8; 3] {
        let [_, r, g, b] = self.0.to_be_bytes();
        [r, g, b]
    }
}

/// Display attributes of one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Name used by the trace parser.
    pub name: String,
    /// Lower values win when colors are resolved for a mixed bucket.
    pub priority: u8,
    /// Base fill color.
    pub color: PackedColor,
}

impl CategoryInfo {
    /// Creates a category description.
    #[must_use]
    pub fn new(name: impl Into<String>, priority: u8, color: PackedColor) -> Self {
        Self {
            name: name.into(),
            priority,
            color,
        }
    }
}

/// Failure to resolve or register a category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    /// The name is not part of the registry.
    #[error("unknown event category `{0}`")]
    Unknown(String),
    /// A category with this name is already registered.
    #[error("event category `{0}` is registered twice")]
    Duplicate(String),
    /// The registry already holds the maximum number of categories.
    #[error("at most {max} event categories are supported", max = CategoryRegistry::MAX_CATEGORIES)]
    TooMany,
}

/// Closed, ordered set of event categories.
///
/// Category ids are indexes into this registry, assigned in registration
/// order. Priorities need not be unique; ties are broken during color
/// resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<CategoryInfo>,
}

impl Default for CategoryRegistry {
    /// The categories of a typical server-side execution trace, most important first.
    fn default() -> Self {
        const DEFAULTS: [(&str, u32); 7] = [
            ("DML", 0x28_56_63),
            ("SOQL", 0x5D_49_63),
            ("Method", 0x2B_8F_81),
            ("Code Unit", 0x88_AE_58),
            ("System Method", 0x5C_34_44),
            ("Flow", 0x33_79_86),
            ("Workflow", 0x51_A1_6E),
        ];
        let categories = DEFAULTS
            .iter()
            .zip(0_u8..)
            .map(|(&(name, rgb), priority)| CategoryInfo::new(name, priority, PackedColor(rgb)))
            .collect();
        Self { categories }
    }
}

impl CategoryRegistry {
    /// Upper bound on the number of categories, set by the width of [`CategoryId`].
    pub const MAX_CATEGORIES: usize = u8::MAX as usize + 1;

    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Builds a registry from a list of categories, in id order.
    pub fn from_categories(
        categories: impl IntoIterator<Item = CategoryInfo>,
    ) -> Result<Self, CategoryError> {
        let mut registry = Self::new();
        for info in categories {
            registry.register(info)?;
        }
        Ok(registry)
    }

    /// Adds a category and returns its id.
    pub fn register(&mut self, info: CategoryInfo) -> Result<CategoryId, CategoryError> {
        if self.lookup(&info.name).is_some() {
            return Err(CategoryError::Duplicate(info.name));
        }
        let id = u8::try_from(self.categories.len()).map_err(|_| CategoryError::TooMany)?;
        self.categories.push(info);
        Ok(CategoryId(id))
    }

    /// Returns the id registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<CategoryId> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| u8::try_from(i).ok())
            .map(CategoryId)
    }

    /// Like [`lookup`](Self::lookup), reporting unknown names as an error.
    pub fn resolve(&self, name: &str) -> Result<CategoryId, CategoryError> {
        self.lookup(name)
            .ok_or_else(|| CategoryError::Unknown(name.into()))
    }

    /// Returns the attributes of `id`, if it belongs to this registry.
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&CategoryInfo> {
        self.categories.get(id.index())
    }

    /// Returns `true` if `id` belongs to this registry.
    #[must_use]
    pub fn contains(&self, id: CategoryId) -> bool {
        id.index() < self.categories.len()
    }

    /// Priority of `id`; unknown ids rank below every registered category.
    #[must_use]
    pub fn priority(&self, id: CategoryId) -> u16 {
        self.get(id).map_or(u16::MAX, |c| u16::from(c.priority))
    }

    /// Number of registered categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns `true` if no category is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Iterates categories in id order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "registration caps the registry at 256 entries"
    )]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (CategoryId, &CategoryInfo)> {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, info)| (CategoryId(i as u8), info))
    }
}
