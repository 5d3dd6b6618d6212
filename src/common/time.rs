// src/common/time.rs

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

/// Intervalo semiaberto `[start, end)` em UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// Usado pelas implementações em memória dos testes
#[cfg(test)]
impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Mês de calendário no fuso do negócio: datas inclusivas para colunas DATE
/// e janela de instantes para colunas TIMESTAMPTZ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub span: TimeWindow,
}

#[cfg(test)]
impl MonthWindow {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    // FixedOffset nunca é ambíguo, `single` sempre resolve
    match offset.from_local_datetime(&naive).single() {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

pub fn month_window(as_of: DateTime<Utc>, offset: FixedOffset) -> MonthWindow {
    let today = local_date(as_of, offset);
    let first_day = today.with_day(1).unwrap_or(today);
    let next_month = first_day
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    let last_day = next_month.pred_opt().unwrap_or(next_month);

    MonthWindow {
        first_day,
        last_day,
        span: TimeWindow {
            start: local_midnight(first_day, offset),
            end: local_midnight(next_month, offset),
        },
    }
}

pub fn day_window(as_of: DateTime<Utc>, offset: FixedOffset) -> TimeWindow {
    let today = local_date(as_of, offset);
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    TimeWindow {
        start: local_midnight(today, offset),
        end: local_midnight(tomorrow, offset),
    }
}

/// Saudação pela hora local: 04–12 manhã, 12–17 tarde, 17–22 noite, resto madrugada.
pub fn greeting_for(as_of: DateTime<Utc>, offset: FixedOffset) -> &'static str {
    match as_of.with_timezone(&offset).hour() {
        4..=11 => "Good Morning",
        12..=16 => "Good Afternoon",
        17..=21 => "Good Evening",
        _ => "Good Night",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn month_window_covers_the_whole_last_day() {
        let w = month_window(utc("2025-02-14T10:00:00Z"), FixedOffset::east_opt(0).unwrap());
        assert_eq!(w.first_day, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(w.last_day, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert!(w.span.contains(utc("2025-02-28T23:59:59Z")));
        assert!(!w.span.contains(utc("2025-03-01T00:00:00Z")));
    }

    #[test]
    fn month_window_respects_business_offset() {
        // 31/jan 20:00 UTC já é 1º/fev em IST (+05:30)
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let w = month_window(utc("2025-01-31T20:00:00Z"), ist);
        assert_eq!(w.first_day, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(w.span.start, utc("2025-01-31T18:30:00Z"));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let w = month_window(utc("2025-12-31T12:00:00Z"), FixedOffset::east_opt(0).unwrap());
        assert_eq!(w.last_day, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(w.span.end, utc("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn day_window_is_one_local_day() {
        let w = day_window(utc("2025-06-10T15:00:00Z"), FixedOffset::east_opt(0).unwrap());
        assert_eq!(w.start, utc("2025-06-10T00:00:00Z"));
        assert_eq!(w.end, utc("2025-06-11T00:00:00Z"));
    }

    #[test]
    fn greeting_boundaries() {
        let z = FixedOffset::east_opt(0).unwrap();
        assert_eq!(greeting_for(utc("2025-06-10T03:59:00Z"), z), "Good Night");
        assert_eq!(greeting_for(utc("2025-06-10T04:00:00Z"), z), "Good Morning");
        assert_eq!(greeting_for(utc("2025-06-10T12:00:00Z"), z), "Good Afternoon");
        assert_eq!(greeting_for(utc("2025-06-10T17:00:00Z"), z), "Good Evening");
        assert_eq!(greeting_for(utc("2025-06-10T22:00:00Z"), z), "Good Night");
    }
}
