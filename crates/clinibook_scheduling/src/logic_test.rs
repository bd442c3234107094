#[cfg(test)]
mod tests {
    use crate::logic::{
        combine_date_time, generate_slots, normalize_slot_time, open_slots, parse_slot_time,
    };
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_default_working_day_yields_eleven_slots() {
        let slots = generate_slots("09:00", "18:00", 50).unwrap();

        assert_eq!(
            slots,
            vec![
                "09:00", "09:50", "10:40", "11:30", "12:20", "13:10", "14:00", "14:50", "15:40",
                "16:30", "17:20",
            ]
        );
    }

    #[test]
    fn test_slot_generation_is_deterministic() {
        let first = generate_slots("09:00", "18:00", 50).unwrap();
        let second = generate_slots("09:00", "18:00", 50).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_slot_starting_before_end_is_included() {
        // 17:20 starts before 18:00 and is kept even though it runs to 18:10.
        let slots = generate_slots("09:00", "18:00", 50).unwrap();
        assert_eq!(slots.last().map(String::as_str), Some("17:20"));
    }

    #[test]
    fn test_minute_overflow_carries_into_hours() {
        let slots = generate_slots("09:30", "11:00", 45).unwrap();
        assert_eq!(slots, vec!["09:30", "10:15"]);
    }

    #[test]
    fn test_empty_window_yields_no_slots() {
        let slots = generate_slots("09:00", "09:00", 50).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        assert!(generate_slots("09:00", "18:00", 0).is_err());
    }

    #[test]
    fn test_parse_accepts_unpadded_input() {
        assert_eq!(parse_slot_time("9:5").unwrap(), (9, 5));
        assert_eq!(parse_slot_time("09:05").unwrap(), (9, 5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_slot_time("").is_err());
        assert!(parse_slot_time("nine").is_err());
        assert!(parse_slot_time("9").is_err());
        assert!(parse_slot_time("25:00").is_err());
        assert!(parse_slot_time("09:60").is_err());
        assert!(parse_slot_time("-1:30").is_err());
    }

    #[test]
    fn test_normalize_pads_to_canonical_form() {
        assert_eq!(normalize_slot_time("9:30").unwrap(), "09:30");
        assert_eq!(normalize_slot_time("09:30").unwrap(), "09:30");
        assert_eq!(normalize_slot_time("9:5").unwrap(), "09:05");
    }

    #[test]
    fn test_open_slots_filters_occupied() {
        let grid = generate_slots("09:00", "18:00", 50).unwrap();
        let occupied = vec!["09:50".to_string(), "17:20".to_string()];

        let open = open_slots(grid, &occupied);

        assert_eq!(open.len(), 9);
        assert!(!open.contains(&"09:50".to_string()));
        assert!(!open.contains(&"17:20".to_string()));
        assert_eq!(open.first().map(String::as_str), Some("09:00"));
    }

    #[test]
    fn test_combine_date_time_spans_slot_duration() {
        let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

        let start = combine_date_time(date, "14:00", 0).unwrap();
        let end = combine_date_time(date, "14:00", 50).unwrap();

        assert_eq!(start.to_rfc3339(), "2099-06-15T14:00:00+00:00");
        assert_eq!(end - start, Duration::minutes(50));
    }

    #[test]
    fn test_combine_date_time_carries_past_midnight_boundary() {
        let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

        let end = combine_date_time(date, "23:40", 50).unwrap();
        assert_eq!(end.to_rfc3339(), "2099-06-16T00:30:00+00:00");
    }
}
