//! The three record sequences of a feed
//!
//! - `authoritative` is the superset the cursor is derived from
//! - `expanded` grows with every page (infinite scroll)
//! - `preview` is replaced wholesale, and only by a reset
//!
//! Every update goes through [`Projections::update`] so that the rule "preview
//! lags until the next reset" is written down in exactly one place.

use crate::domain::{merge, Record, RecordList};

/// Messages that can be sent to update the projections
pub enum Message {
    /// A first page arrived; all three sequences become that page
    ResetLoaded(Vec<Record>),
    /// A later page arrived; authoritative and expanded grow, preview does not
    ContinuationLoaded(Vec<Record>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projections {
    authoritative: RecordList,
    expanded: RecordList,
    preview: RecordList,
}

impl Projections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authoritative(&self) -> &RecordList {
        &self.authoritative
    }

    pub fn expanded(&self) -> &RecordList {
        &self.expanded
    }

    pub fn preview(&self) -> &RecordList {
        &self.preview
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::ResetLoaded(records) => {
                let fresh = merge(&RecordList::new(), &records);
                self.authoritative = fresh.clone();
                self.expanded = fresh.clone();
                self.preview = fresh;
            }
            Message::ContinuationLoaded(records) => {
                self.authoritative = merge(&self.authoritative, &records);
                self.expanded = merge(&self.expanded, &records);
            }
        }
    }
}
