use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Europe::Moscow;

/// Current wall-clock time in Moscow, the timezone every schedule is written in
pub fn moscow_now() -> NaiveDateTime {
    Utc::now().with_timezone(&Moscow).naive_local()
}

/// Countdown annotation such as "(осталось: 1д. 2ч.)".
///
/// Returns `None` for anything one hour away or less.
pub fn time_left_string(left: chrono::Duration) -> Option<String> {
    if left <= chrono::Duration::hours(1) {
        return None;
    }

    let hours = left.num_hours();
    let (days, hours) = (hours / 24, hours % 24);

    Some(format!("(осталось: {}д. {}ч.)", days, hours))
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "понедельник",
        Weekday::Tue => "вторник",
        Weekday::Wed => "среда",
        Weekday::Thu => "четверг",
        Weekday::Fri => "пятница",
        Weekday::Sat => "суббота",
        Weekday::Sun => "воскресенье",
    }
}

/// Day heading like "среда, 07.02"
pub fn day_title(date: NaiveDate) -> String {
    format!("{}, {}", weekday_name(date.weekday()), date.format("%d.%m"))
}

/// Parse a weekday given as a Sunday-based number (0..=6) or a name,
/// returning the Sunday-based number
pub fn parse_weekday(day_str: &str) -> Option<u8> {
    let day = day_str.trim().to_lowercase();
    if let Ok(n) = day.parse::<u8>() {
        return (n <= 6).then_some(n);
    }

    let weekday = match day.as_str() {
        "monday" | "mon" | "понедельник" | "пн" => Weekday::Mon,
        "tuesday" | "tue" | "вторник" | "вт" => Weekday::Tue,
        "wednesday" | "wed" | "среда" | "ср" => Weekday::Wed,
        "thursday" | "thu" | "четверг" | "чт" => Weekday::Thu,
        "friday" | "fri" | "пятница" | "пт" => Weekday::Fri,
        "saturday" | "sat" | "суббота" | "сб" => Weekday::Sat,
        "sunday" | "sun" | "воскресенье" | "вс" => Weekday::Sun,
        _ => return None,
    };
    u8::try_from(weekday.num_days_from_sunday()).ok()
}

/// Round to two decimals and drop trailing zeros ("12.50" -> "12.5", "3.00" -> "3")
pub fn format_number(number: f64) -> String {
    if number == 0.0 || !number.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.2}", number);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_thresholds() {
        assert_eq!(time_left_string(chrono::Duration::minutes(59)), None);
        assert_eq!(time_left_string(chrono::Duration::hours(1)), None);
        assert_eq!(
            time_left_string(chrono::Duration::hours(5)).as_deref(),
            Some("(осталось: 0д. 5ч.)")
        );
        assert_eq!(
            time_left_string(chrono::Duration::hours(26)).as_deref(),
            Some("(осталось: 1д. 2ч.)")
        );
    }

    #[test]
    fn numbers_drop_trailing_zeros() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(66.666), "66.67");
    }

    #[test]
    fn weekday_names_and_numbers() {
        assert_eq!(parse_weekday("Mon"), Some(1));
        assert_eq!(parse_weekday("вс"), Some(0));
        assert_eq!(parse_weekday("6"), Some(6));
        assert_eq!(parse_weekday("7"), None);
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Физика", 10), "Физика");
        assert_eq!(truncate("Математический анализ", 10), "Математ...");
    }
}
