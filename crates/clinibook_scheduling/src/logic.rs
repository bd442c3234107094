//! Slot arithmetic for the working day.
//!
//! Slots are identified by zero-padded `HH:MM` strings. The grid starts at
//! the working-day start and advances by the slot duration until the next
//! start would reach the working-day end, so a 09:00 to 18:00 day with
//! 50-minute slots yields eleven slots ending at 17:20.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clinibook_common::{validation_error, BookingError};

/// Parse an `HH:MM` string into hour and minute components.
///
/// Accepts unpadded input such as `9:30`; rejects anything that is not a
/// valid time of day.
pub fn parse_slot_time(time: &str) -> Result<(u32, u32), BookingError> {
    let (hour_part, minute_part) = time
        .split_once(':')
        .ok_or_else(|| validation_error(&format!("Invalid time format '{time}', expected HH:MM")))?;

    let hour: u32 = hour_part
        .trim()
        .parse()
        .map_err(|_| validation_error(&format!("Invalid hour in time '{time}'")))?;
    let minute: u32 = minute_part
        .trim()
        .parse()
        .map_err(|_| validation_error(&format!("Invalid minute in time '{time}'")))?;

    if hour > 23 || minute > 59 {
        return Err(validation_error(&format!("Time '{time}' is out of range")));
    }

    Ok((hour, minute))
}

/// Normalize a time string into its canonical zero-padded form.
///
/// Slot comparison and the storage uniqueness guard work on exact strings,
/// so `9:30` and `09:30` must collapse to one spelling before they reach
/// the store.
pub fn normalize_slot_time(time: &str) -> Result<String, BookingError> {
    let (hour, minute) = parse_slot_time(time)?;
    Ok(format!("{hour:02}:{minute:02}"))
}

/// Generate the full slot grid for a working day.
///
/// A slot is emitted whenever its start lies strictly before the working-day
/// end; the last slot may therefore run past the end time.
pub fn generate_slots(
    work_start: &str,
    work_end: &str,
    slot_minutes: u32,
) -> Result<Vec<String>, BookingError> {
    if slot_minutes == 0 {
        return Err(validation_error("Slot duration must be positive"));
    }

    let (start_hour, start_minute) = parse_slot_time(work_start)?;
    let (end_hour, end_minute) = parse_slot_time(work_end)?;

    let mut slots = Vec::new();
    let mut hour = start_hour;
    let mut minute = start_minute;

    while hour < end_hour || (hour == end_hour && minute < end_minute) {
        slots.push(format!("{hour:02}:{minute:02}"));

        minute += slot_minutes;
        if minute >= 60 {
            hour += minute / 60;
            minute %= 60;
        }
    }

    Ok(slots)
}

/// Drop the occupied slots from the grid, preserving order.
pub fn open_slots(grid: Vec<String>, occupied: &[String]) -> Vec<String> {
    grid.into_iter()
        .filter(|slot| !occupied.contains(slot))
        .collect()
}

/// Combine a calendar date and a slot time into a UTC instant, shifted by
/// `add_minutes`. The slot end is the start combined with the slot duration.
pub fn combine_date_time(
    date: NaiveDate,
    time: &str,
    add_minutes: u32,
) -> Result<DateTime<Utc>, BookingError> {
    let (hour, minute) = parse_slot_time(time)?;
    let naive_time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| validation_error(&format!("Time '{time}' is out of range")))?;

    Ok(Utc.from_utc_datetime(&date.and_time(naive_time)) + Duration::minutes(i64::from(add_minutes)))
}
