//! Level types and label classification for the administrative hierarchy.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of tiers the filter chain understands.
///
/// The hierarchy flows from broadest (Assembly) to most specific (Booth):
/// Assembly → Block → Mandal → PollingCenter → Booth
///
/// The derived `Ord` follows that canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LevelType {
    Assembly = 0,
    Block = 1,
    Mandal = 2,
    PollingCenter = 3,
    Booth = 4,
}

/// Ordering weight and terminal flag for a selectable tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPriority {
    pub level: LevelType,
    pub order: u8,
    /// Terminal tiers may directly contain booths.
    pub terminal: bool,
}

/// Static priority table for the tiers below Assembly.
pub const PRIORITY_TABLE: [LevelPriority; 4] = [
    LevelPriority {
        level: LevelType::Block,
        order: 1,
        terminal: false,
    },
    LevelPriority {
        level: LevelType::Mandal,
        order: 2,
        terminal: true,
    },
    LevelPriority {
        level: LevelType::PollingCenter,
        order: 3,
        terminal: true,
    },
    LevelPriority {
        level: LevelType::Booth,
        order: 4,
        terminal: true,
    },
];

/// Ordered substring rules applied to lowercased labels. First match wins.
const LABEL_RULES: [(&str, LevelType); 6] = [
    ("assembly", LevelType::Assembly),
    ("block", LevelType::Block),
    ("mandal", LevelType::Mandal),
    ("polling", LevelType::PollingCenter),
    ("center", LevelType::PollingCenter),
    ("booth", LevelType::Booth),
];

impl LevelType {
    /// Returns a static slice of all level types in hierarchical order.
    pub fn all() -> &'static [LevelType] {
        &[
            LevelType::Assembly,
            LevelType::Block,
            LevelType::Mandal,
            LevelType::PollingCenter,
            LevelType::Booth,
        ]
    }

    /// Tiers tracked as dynamic selections below the assembly.
    pub fn dynamic() -> &'static [LevelType] {
        &[
            LevelType::Block,
            LevelType::Mandal,
            LevelType::PollingCenter,
            LevelType::Booth,
        ]
    }

    /// Looks up this tier in the priority table.
    ///
    /// Assembly is not part of the table; it sorts first and is never
    /// terminal.
    pub fn priority(&self) -> LevelPriority {
        PRIORITY_TABLE
            .iter()
            .find(|p| p.level == *self)
            .copied()
            .unwrap_or(LevelPriority {
                level: *self,
                order: 0,
                terminal: false,
            })
    }

    pub fn order(&self) -> u8 {
        self.priority().order
    }

    pub fn is_terminal(&self) -> bool {
        self.priority().terminal
    }

    /// Human-readable tier name for breadcrumbs and headings.
    pub fn display_name(&self) -> &'static str {
        match self {
            LevelType::Assembly => "Assembly",
            LevelType::Block => "Block",
            LevelType::Mandal => "Mandal",
            LevelType::PollingCenter => "Polling Center",
            LevelType::Booth => "Booth",
        }
    }
}

impl std::fmt::Display for LevelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for LevelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Assembly" | "assembly" => Ok(LevelType::Assembly),
            "Block" | "block" => Ok(LevelType::Block),
            "Mandal" | "mandal" => Ok(LevelType::Mandal),
            "PollingCenter" | "Polling Center" | "polling_center" | "pollingCenter" => {
                Ok(LevelType::PollingCenter)
            }
            "Booth" | "booth" => Ok(LevelType::Booth),
            _ => Err(format!(
                "Invalid level type '{}'. Valid values: Assembly, Block, Mandal, PollingCenter, Booth",
                s
            )),
        }
    }
}

/// Result of classifying a server-assigned level label.
///
/// Labels that match no rule are kept as `Unknown` so callers can spot
/// vocabulary drift; their effective level type is still Booth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelClassification {
    Known(LevelType),
    Unknown { label: String },
}

impl LevelClassification {
    /// Classifies a free-text label by ordered, case-insensitive substring match.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        match LABEL_RULES
            .iter()
            .find(|(needle, _)| lower.contains(needle))
        {
            Some((_, level)) => LevelClassification::Known(*level),
            None => {
                tracing::warn!(label = %label, "Unrecognized level label, treating as Booth");
                LevelClassification::Unknown {
                    label: label.to_string(),
                }
            }
        }
    }

    /// Effective level type; unknown labels fall back to Booth.
    pub fn level_type(&self) -> LevelType {
        match self {
            LevelClassification::Known(level) => *level,
            LevelClassification::Unknown { .. } => LevelType::Booth,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, LevelClassification::Known(_))
    }
}

/// Shorthand for `LevelClassification::classify(label).level_type()`.
pub fn classify_level(label: &str) -> LevelType {
    LevelClassification::classify(label).level_type()
}
