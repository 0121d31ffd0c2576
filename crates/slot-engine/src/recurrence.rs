//! Date matching for one-off and weekly-recurring events.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;

use crate::event::Event;

/// Whether `event` occurs on `date` (calendar dates and weekdays in `tz`).
///
/// An event occurs on `date` when its start date is `date`, or when it is
/// weekly recurring, falls on the same weekday, and started on or before
/// `date`:
///
/// ```text
/// same_date OR (weekly_recurring AND same_weekday AND start_date <= date)
/// ```
pub fn occurs_on(event: &Event, date: NaiveDate, tz: Tz) -> bool {
    let start_date = event.start_date(tz);
    let same_date = start_date == date;
    let same_weekday = start_date.weekday() == date.weekday();

    same_date || (event.weekly_recurring && same_weekday && start_date <= date)
}
