//! Locale-specific resolution of review date strings.
//!
//! Marketplaces print dates the way their audience reads them: relative words
//! ("вчера, 14:30"), month names in the local language, or numeric forms.
//! Adapters take a [`DateResolver`] so the locale is a constructor choice, not
//! something baked into the scraping code.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Turns a scraped date string into a timestamp.
///
/// `now` is passed in so resolution is deterministic. Text that cannot be
/// understood resolves to `now`.
pub trait DateResolver: Send + Sync {
    fn resolve(&self, text: &str, now: NaiveDateTime) -> NaiveDateTime;
}

/// Russian-language dates as shown on Wildberries and Ozon.
#[derive(Debug, Default, Clone, Copy)]
pub struct RussianDateResolver;

/// English-language dates.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishDateResolver;

const RU_MONTHS: [(&str, u32); 12] = [
    ("январ", 1),
    ("феврал", 2),
    ("март", 3),
    ("апрел", 4),
    ("ма", 5),
    ("июн", 6),
    ("июл", 7),
    ("август", 8),
    ("сентябр", 9),
    ("октябр", 10),
    ("ноябр", 11),
    ("декабр", 12),
];

const EN_MONTHS: [(&str, u32); 12] = [
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

impl DateResolver for RussianDateResolver {
    fn resolve(&self, text: &str, now: NaiveDateTime) -> NaiveDateTime {
        let lower = text.trim().to_lowercase();
        resolve_relative(&lower, "вчера", "сегодня", now)
            .or_else(|| resolve_numeric(&lower))
            .or_else(|| resolve_day_month_name(&lower, &RU_MONTHS, now))
            .unwrap_or(now)
    }
}

impl DateResolver for EnglishDateResolver {
    fn resolve(&self, text: &str, now: NaiveDateTime) -> NaiveDateTime {
        let lower = text.trim().to_lowercase();
        resolve_relative(&lower, "yesterday", "today", now)
            .or_else(|| resolve_numeric(&lower))
            .or_else(|| resolve_month_name_day(&lower, now))
            .or_else(|| resolve_day_month_name(&lower, &EN_MONTHS, now))
            .unwrap_or(now)
    }
}

/// `"<yesterday>, HH:MM"` / `"<today>, HH:MM"`. Without a time part the
/// current time of day is kept.
fn resolve_relative(
    lower: &str,
    yesterday: &str,
    today: &str,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let (rest, day) = if let Some(rest) = lower.strip_prefix(yesterday) {
        (rest, now.date() - Duration::days(1))
    } else if let Some(rest) = lower.strip_prefix(today) {
        (rest, now.date())
    } else {
        return None;
    };

    let time = find_time(rest).unwrap_or_else(|| now.time());
    Some(day.and_time(time))
}

/// `dd.mm.yyyy[ HH:MM]` and ISO `yyyy-mm-dd[ HH:MM]`.
fn resolve_numeric(lower: &str) -> Option<NaiveDateTime> {
    let date_part = lower.split([',', ' ', 't']).next()?;
    let date = NaiveDate::parse_from_str(date_part, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .ok()?;
    let time = find_time(&lower[date_part.len()..]).unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

/// `"12 марта 2024, 10:20"` / `"12 марта, 10:20"` (current year implied).
fn resolve_day_month_name(
    lower: &str,
    months: &[(&str, u32)],
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let mut words = lower
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty());
    let day: u32 = words.next()?.parse().ok()?;
    let month = month_from_word(words.next()?, months)?;
    let year = words
        .next()
        .and_then(|w| w.parse::<i32>().ok())
        .filter(|y| *y > 1900)
        .unwrap_or_else(|| now.year());
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = find_time(lower).unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

/// `"march 12, 2024"` / `"mar 12"`.
fn resolve_month_name_day(lower: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut words = lower
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty());
    let month = month_from_word(words.next()?, &EN_MONTHS)?;
    let day: u32 = words.next()?.parse().ok()?;
    let year = words
        .next()
        .and_then(|w| w.parse::<i32>().ok())
        .filter(|y| *y > 1900)
        .unwrap_or_else(|| now.year());
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = find_time(lower).unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

fn month_from_word(word: &str, months: &[(&str, u32)]) -> Option<u32> {
    // "ма" (май/мая) is a prefix of "март"/"марта", so longer stems win.
    months
        .iter()
        .filter(|(stem, _)| word.starts_with(stem))
        .max_by_key(|(stem, _)| stem.len())
        .map(|&(_, month)| month)
}

/// First `H:MM` / `HH:MM` token in `text`.
fn find_time(text: &str) -> Option<NaiveTime> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| w.contains(':'))
        .find_map(|w| NaiveTime::parse_from_str(w, "%H:%M").ok())
}
