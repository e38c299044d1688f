//! Groups an ordered record list into calendar days for display

use chrono::{NaiveDate, TimeZone};

use crate::domain::Record;

/// A run of consecutive records that fall on the same local day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket<'a> {
    pub day: NaiveDate,
    pub records: &'a [Record],
}

impl DayBucket<'_> {
    pub fn label(&self, today: NaiveDate) -> String {
        day_label(self.day, today)
    }
}

/// Splits `records` wherever the local day changes
///
/// Input order is preserved, so a newest-first list yields newest-first days.
pub fn group_by_day<'a, Tz: TimeZone>(records: &'a [Record], tz: &Tz) -> Vec<DayBucket<'a>> {
    let mut buckets = Vec::new();
    let mut start = 0;

    while start < records.len() {
        let day = records[start].sort_key().day_in(tz);
        let len = records[start..]
            .iter()
            .take_while(|record| record.sort_key().day_in(tz) == day)
            .count();
        buckets.push(DayBucket {
            day,
            records: &records[start..start + len],
        });
        start += len;
    }

    buckets
}

pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%b %-d, %Y").to_string()
    }
}
