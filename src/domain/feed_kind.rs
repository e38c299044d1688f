use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the independent paginated lists on the contact surface
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Comments,
    Feedback,
}
