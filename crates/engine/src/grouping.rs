//! Month / day buckets used to display a ledger.
//!
//! Buckets are listed in the order they are first met, and entries keep their
//! ledger order inside each bucket.

use chrono::NaiveDate;

use crate::Entry;

#[derive(Clone, Debug, PartialEq)]
pub struct MonthGroup<'a> {
    /// `YYYY-MM`
    pub month: String,
    pub days: Vec<DayGroup<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub entries: Vec<&'a Entry>,
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn group_by_month(entries: &[Entry]) -> Vec<MonthGroup<'_>> {
    let mut months: Vec<MonthGroup<'_>> = Vec::new();

    for entry in entries {
        let month = month_key(entry.date);
        let month_pos = match months.iter().position(|m| m.month == month) {
            Some(pos) => pos,
            None => {
                months.push(MonthGroup {
                    month,
                    days: Vec::new(),
                });
                months.len() - 1
            }
        };

        let days = &mut months[month_pos].days;
        match days.iter_mut().find(|d| d.date == entry.date) {
            Some(day) => day.entries.push(entry),
            None => days.push(DayGroup {
                date: entry.date,
                entries: vec![entry],
            }),
        }
    }

    months
}
