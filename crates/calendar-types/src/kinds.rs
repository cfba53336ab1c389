use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string is not one of the closed enumeration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Ministry group an event belongs to. Mirrors the `church_category` enum
/// type in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Church,
    Adult,
    Youth,
    Advisory,
    Women,
    Student,
    Children,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Church,
        Category::Adult,
        Category::Youth,
        Category::Advisory,
        Category::Women,
        Category::Student,
        Category::Children,
    ];

    /// Categories broken down in verification output. Advisory has no seed
    /// event and is left out.
    pub const REPORTED: [Category; 6] = [
        Category::Church,
        Category::Adult,
        Category::Youth,
        Category::Women,
        Category::Student,
        Category::Children,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Church => "church",
            Self::Adult => "adult",
            Self::Youth => "youth",
            Self::Advisory => "advisory",
            Self::Women => "women",
            Self::Student => "student",
            Self::Children => "children",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Repeat rule of an event. Mirrors the `recurring_type` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub const ALL: [Recurrence; 4] = [
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "recurrence",
                value: s.to_string(),
            })
    }
}
