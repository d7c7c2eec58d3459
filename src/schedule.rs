//! Local mirrors of the backend's schedule semantics so the CLI can validate
//! drafts and explain conflicts before submitting.

use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};

use crate::models::{Recurrence, Schedule, ScheduleDraft};

const MINUTES_PER_DAY: u32 = 24 * 60;
/// Backend floors every schedule run at one minute.
const MIN_SCHEDULE_SECS: f64 = 60.0;

/// Days of the week a recurrence pattern covers. One-time schedules resolve
/// through their date instead and report no recurring days.
pub fn active_days(recurrence: Recurrence) -> Vec<Weekday> {
    match recurrence {
        Recurrence::Daily => vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ],
        Recurrence::Weekdays => vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
        Recurrence::Weekends => vec![Weekday::Sat, Weekday::Sun],
        Recurrence::Day(day) => vec![day],
        Recurrence::Once => Vec::new(),
    }
}

/// Whether a schedule is eligible to run on the given date.
pub fn applies_on(schedule: &Schedule, date: NaiveDate) -> bool {
    use chrono::Datelike;
    if !schedule.enabled {
        return false;
    }
    match schedule.recurrence {
        Recurrence::Once => schedule.schedule_date == Some(date),
        recurrence => active_days(recurrence).contains(&date.weekday()),
    }
}

/// Whether `current` falls inside `[start, end)`, treating `end <= start` as
/// an overnight range (e.g. 23:00–01:00).
pub fn time_in_range(current: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        start <= current && current < end
    } else {
        current >= start || current < end
    }
}

/// Run length in seconds, overnight-aware, floored at one minute.
pub fn schedule_duration_secs(start: NaiveTime, end: NaiveTime) -> f64 {
    let start_min = minutes_since_midnight(start);
    let mut end_min = minutes_since_midnight(end);
    if end_min < start_min {
        end_min += MINUTES_PER_DAY;
    }
    let secs = f64::from(end_min - start_min) * 60.0;
    secs.max(MIN_SCHEDULE_SECS)
}

/// Whether two time ranges share any minute of the day, handling overnight
/// ranges by splitting them at midnight.
pub fn time_ranges_overlap(
    start1: NaiveTime,
    end1: NaiveTime,
    start2: NaiveTime,
    end2: NaiveTime,
) -> bool {
    let segments1 = day_segments(start1, end1);
    let segments2 = day_segments(start2, end2);
    segments1.iter().flatten().any(|a| {
        segments2
            .iter()
            .flatten()
            .any(|b| a.0 < b.1 && b.0 < a.1)
    })
}

/// Whether two schedules would be active at the same time on a shared day.
pub fn schedules_overlap(a: &ScheduleDraft, b: &Schedule) -> bool {
    let days_a = active_days(a.recurrence);
    let days_b = active_days(b.recurrence);
    let share_day = days_a.iter().any(|day| days_b.contains(day));
    if !share_day {
        return false;
    }
    time_ranges_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
}

/// Enabled schedules conflicting with a draft, optionally excluding the one
/// being edited.
pub fn find_overlapping<'a>(
    draft: &ScheduleDraft,
    existing: &'a [Schedule],
    exclude_id: Option<u32>,
) -> Vec<&'a Schedule> {
    existing
        .iter()
        .filter(|schedule| Some(schedule.id) != exclude_id)
        .filter(|schedule| schedule.enabled)
        .filter(|schedule| schedules_overlap(draft, schedule))
        .collect()
}

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Half-open minute intervals a range covers within one day. Overnight
/// ranges split into a late and an early segment.
fn day_segments(start: NaiveTime, end: NaiveTime) -> [Option<(u32, u32)>; 2] {
    let start_min = minutes_since_midnight(start);
    let end_min = minutes_since_midnight(end);
    if start_min < end_min {
        [Some((start_min, end_min)), None]
    } else {
        let early = (end_min > 0).then_some((0, end_min));
        [Some((start_min, MINUTES_PER_DAY)), early]
    }
}
