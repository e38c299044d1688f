use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which sequence of a feed is rendered
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Compact snapshot of the newest page(s) as of the last reset
    #[default]
    Preview,
    /// Everything loaded so far, with infinite scroll
    Expanded,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Preview => ViewMode::Expanded,
            ViewMode::Expanded => ViewMode::Preview,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == ViewMode::Expanded
    }
}
