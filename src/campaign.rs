use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use std::env;
use tracing::error;

pub const TOTAL_DAYS: u32 = 21;

const DEFAULT_START: &str = "2025-12-01";

/// Shown when a toggle targets a date that has not arrived yet.
pub const FUTURE_LOCK_MESSAGE: &str = "還沒到的日子不能先打卡喔！";

const WEEKDAYS_ZH: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

/// Fixed campaign: a start date (local midnight) and a day count.
#[derive(Debug, Clone, Copy)]
pub struct CampaignWindow {
    start: NaiveDate,
    total_days: u32,
}

/// Everything the campaign derives from a single instant.
///
/// When the instant precedes the start date the campaign runs in demo
/// mode: the effective "today" is pinned to day 1 and the future-date
/// lock is relaxed, while the board unlock boundary stays at day 1.
#[derive(Debug, Clone)]
pub struct DaySnapshot {
    pub day_index: u32,
    pub today: NaiveDate,
    pub today_key: String,
    pub demo_mode: bool,
    pub unlocked_through: u32,
}

impl CampaignWindow {
    pub fn new(start: NaiveDate, total_days: u32) -> Self {
        Self { start, total_days }
    }

    /// Reads `APP_START_DATE` (YYYY-MM-DD); a missing value uses the
    /// built-in start, an unparseable one is logged and ignored.
    pub fn from_env() -> Self {
        let start = match env::var("APP_START_DATE") {
            Ok(raw) => parse_date_key(&raw).unwrap_or_else(|| {
                error!("invalid APP_START_DATE {raw:?}, using {DEFAULT_START}");
                default_start()
            }),
            Err(_) => default_start(),
        };
        Self::new(start, TOTAL_DAYS)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    /// Calendar date of the 1-based day index.
    pub fn date_for_day(&self, day: u32) -> NaiveDate {
        self.start + Duration::days(i64::from(day) - 1)
    }

    pub fn snapshot(&self) -> DaySnapshot {
        self.snapshot_at(Local::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Local>) -> DaySnapshot {
        let demo_mode = now.date_naive() < self.start;
        let today = if demo_mode {
            self.start
        } else {
            now.date_naive()
        };
        let day_index = (today - self.start).num_days() as u32 + 1;
        let unlocked_through = if demo_mode { 1 } else { day_index };
        DaySnapshot {
            day_index,
            today,
            today_key: date_key(today),
            demo_mode,
            unlocked_through,
        }
    }
}

impl DaySnapshot {
    /// Dates on or before today may always be toggled (retroactive
    /// check-in); strictly future dates only under demo mode.
    pub fn allows_toggle(&self, date: NaiveDate) -> bool {
        self.demo_mode || date <= self.today
    }
}

fn default_start() -> NaiveDate {
    // The literal is a valid date; parse cannot fail.
    parse_date_key(DEFAULT_START).unwrap_or_default()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// `M/D`, as shown on the day board.
pub fn display_date(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// `M/D 週X` with the Chinese weekday letter, as shown in the header.
pub fn display_date_with_weekday(date: NaiveDate) -> String {
    let weekday = WEEKDAYS_ZH[date.weekday().num_days_from_monday() as usize];
    format!("{}/{} 週{}", date.month(), date.day(), weekday)
}
