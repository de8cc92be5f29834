//! Join cardinality contracts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared multiplicity of a join between a left and a right table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinValidation {
    /// Keys unique on both sides.
    OneToOne,
    /// Right key unique; left may repeat.
    #[default]
    ManyToOne,
    /// Left key unique; right may repeat.
    OneToMany,
    /// No uniqueness requirement.
    ManyToMany,
}

impl JoinValidation {
    /// Whether the contract requires the left key to be unique.
    pub fn requires_unique_left(self) -> bool {
        matches!(self, Self::OneToOne | Self::OneToMany)
    }

    /// Whether the contract requires the right key to be unique.
    pub fn requires_unique_right(self) -> bool {
        matches!(self, Self::OneToOne | Self::ManyToOne)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one_to_one",
            Self::ManyToOne => "many_to_one",
            Self::OneToMany => "one_to_many",
            Self::ManyToMany => "many_to_many",
        }
    }
}

impl fmt::Display for JoinValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Left,
    Right,
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}
