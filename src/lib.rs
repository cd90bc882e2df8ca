//! # ResetLog
//!
//! ResetLog is a minimal file-based logger: it appends timestamped, typed
//! messages to a single log file and discards that file once it has outlived
//! a configurable age threshold. **Every time computation runs in an
//! explicitly configured IANA time zone**, so staleness checks and entry
//! timestamps stay consistent regardless of where the host application runs
//! or what the process-wide default zone happens to be. There is no rotation
//! archive and no background machinery: the whole lifecycle is "append lines,
//! and start from a blank file again once the old one is stale".
//!
//! The reset policy runs once, at construction. If the file's last-modified
//! time plus the configured interval lies at or before the current time in
//! the configured zone, the file is deleted; the next append recreates it.
//! An already-built [`Logger`] never resets the file mid-lifetime.
//!
//! ## Example
//!
//! ```rust
//! use resetlog::{IntervalUnit, LoggerBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path = std::env::temp_dir().join("resetlog_doc.log");
//!     let logger = LoggerBuilder::new(&path, chrono_tz::Europe::Paris)
//!         .interval_unit(IntervalUnit::Hours)
//!         .reset_interval(72) // Discard the file once it is 72 hours old
//!         .build()?;
//!
//!     logger.log("main.rs", "info", "application started")?;
//!     logger.log("main.rs", "error", "something went wrong")?;
//!
//!     Ok(())
//! }
//! ```
use {
    chrono::{DateTime, Days, LocalResult, TimeDelta, TimeZone as _, Utc},
    chrono_tz::Tz,
    std::{
        fs::{self, File, OpenOptions},
        io::{self, Write as _},
        path::{Path, PathBuf},
        str::FromStr,
    },
};

/// Specifies the calendar granularity used to decide when the log file has
/// become stale.
///
/// The staleness threshold is the file's last-modified time plus
/// `reset_interval` of this unit, computed as a calendar-aware offset in the
/// configured time zone rather than a fixed number of seconds. Adding one day
/// across a daylight-saving transition therefore lands on the same wall-clock
/// time the platform's date library would pick, not 24 elapsed hours later.
///
/// # Examples
/// ```
/// use resetlog::IntervalUnit;
///
/// // String-driven configuration goes through FromStr
/// let unit: IntervalUnit = "weeks".parse().unwrap();
/// assert_eq!(unit, IntervalUnit::Weeks);
///
/// // Anything outside hours/days/weeks is rejected
/// assert!("minutes".parse::<IntervalUnit>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    /// Count the interval in hours.
    /// Best for short-lived diagnostic files that should not survive a day.
    Hours,
    /// Count the interval in calendar days. The default.
    Days,
    /// Count the interval in calendar weeks (seven-day steps).
    Weeks,
}

impl IntervalUnit {
    /// Get the lowercase configuration name for this unit.
    fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
            IntervalUnit::Weeks => "weeks",
        }
    }
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalUnit {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hours" => Ok(IntervalUnit::Hours),
            "days" => Ok(IntervalUnit::Days),
            "weeks" => Ok(IntervalUnit::Weeks),
            _ => Err(LoggerError::InvalidIntervalUnit),
        }
    }
}

/// Resolved configuration for the logger.
/// Immutable once built; shared by the builder and the logger itself.
#[derive(Debug, Clone)]
struct LoggerMeta {
    /// The path of the log file. The file itself may not exist yet.
    path: PathBuf,
    /// The IANA time zone used for the staleness check and for every entry
    /// timestamp. Passed explicitly so no computation depends on the
    /// process-wide default zone.
    time_zone: Tz,
    /// The calendar granularity of the reset interval.
    interval_unit: IntervalUnit,
    /// How many `interval_unit`s the file may age before the next
    /// construction discards it. Must be positive.
    reset_interval: u64,
}

impl LoggerMeta {
    /// Get the current time in the configured time zone.
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.time_zone)
    }

    /// Compute the instant at which a file last modified at `modified`
    /// becomes stale.
    ///
    /// Days and weeks advance the calendar rather than adding fixed seconds,
    /// so daylight-saving transitions are resolved by chrono. Fails only on
    /// arithmetic overflow.
    fn reset_threshold(&self, modified: DateTime<Tz>) -> Result<DateTime<Tz>, LoggerError> {
        match self.interval_unit {
            IntervalUnit::Hours => i64::try_from(self.reset_interval)
                .ok()
                .and_then(TimeDelta::try_hours)
                .and_then(|delta| modified.checked_add_signed(delta)),
            IntervalUnit::Days => self.add_calendar_days(modified, self.reset_interval),
            IntervalUnit::Weeks => self
                .reset_interval
                .checked_mul(7)
                .and_then(|days| self.add_calendar_days(modified, days)),
        }
        .ok_or(LoggerError::ResetThreshold)
    }

    /// Advance `modified` by whole calendar days in the configured zone.
    ///
    /// A fall-back transition makes the target wall-clock time ambiguous;
    /// the earlier instant wins. A spring-forward transition can skip the
    /// target wall-clock time entirely; fixed-duration addition then lands
    /// just past the gap. `None` only on arithmetic overflow.
    fn add_calendar_days(&self, modified: DateTime<Tz>, days: u64) -> Option<DateTime<Tz>> {
        let target = modified.naive_local().checked_add_days(Days::new(days))?;
        match self.time_zone.from_local_datetime(&target) {
            LocalResult::Single(threshold) => Some(threshold),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => i64::try_from(days)
                .ok()
                .and_then(TimeDelta::try_days)
                .and_then(|delta| modified.checked_add_signed(delta)),
        }
    }

    /// Whether a file last modified at `modified` is stale as of `now`.
    /// The boundary is inclusive: a file exactly at its threshold is stale.
    fn is_stale(&self, modified: DateTime<Tz>, now: DateTime<Tz>) -> Result<bool, LoggerError> {
        Ok(now >= self.reset_threshold(modified)?)
    }

    /// Apply the reset policy against the configured path.
    ///
    /// No file means nothing to reset. Otherwise the file is deleted exactly
    /// when `now >= modified + interval` (the boundary is inclusive). A
    /// `NotFound` from the deletion is tolerated: another instance racing on
    /// the same stale file may have removed it first, and the goal state
    /// (file absent) already holds.
    fn apply_reset_policy(&self) -> Result<(), LoggerError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(LoggerError::FileIO(err)),
        };

        let modified = DateTime::<Utc>::from(metadata.modified()?).with_timezone(&self.time_zone);
        if self.is_stale(modified, self.now())? {
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(LoggerError::FileIO(err)),
            }
        }
        Ok(())
    }

    /// The directory that must be writable for an append to proceed.
    /// A bare file name logs into the current directory.
    fn log_directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Format one log entry, timestamped now in the configured time zone.
    /// The layout is the persisted contract downstream readers depend on.
    fn entry_line(&self, source: &str, entry_type: &str, message: &str) -> String {
        let timestamp = self.now().format("%Y-%m-%d %H:%M:%S");
        format!("[{timestamp}] | [{source}] [{entry_type}] > {message}\n")
    }

    /// Open the log file for appending, creating it if absent.
    fn open_log_file(&self) -> Result<File, LoggerError> {
        let mut open_options = OpenOptions::new();
        open_options.append(true).create(true);
        Ok(open_options.open(&self.path)?)
    }
}

/// Errors that can occur when configuring or using the logger.
///
/// [`InvalidIntervalUnit`](LoggerError::InvalidIntervalUnit) and
/// [`InvalidResetInterval`](LoggerError::InvalidResetInterval) are
/// configuration errors: the caller must fix the configuration. The
/// remaining variants are I/O-kind failures surfaced from the call that
/// triggered them; nothing is retried or swallowed internally.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Invalid interval unit. Allowed units are: 'hours', 'days', 'weeks'.")]
    InvalidIntervalUnit,
    #[error("Invalid reset interval: must be a positive integer.")]
    InvalidResetInterval,
    #[error("Log directory is not writable.")]
    DirectoryNotWritable,
    #[error("Failed to compute the reset threshold: no representable instant")]
    ResetThreshold,
    #[error("File IO error: {0}")]
    FileIO(#[from] std::io::Error),
}

/// A logger bound to one file path and one reset policy.
///
/// Construction (via [`LoggerBuilder::build`]) has already evaluated the
/// reset policy; from here on the instance only appends. Every [`log`]
/// call opens, writes, and closes its own handle, so external rotation or
/// deletion of the file between calls is tolerated: the next call simply
/// recreates it. The instance holds no interior mutability and can be shared
/// freely across threads.
///
/// [`log`]: Logger::log
#[derive(Debug)]
pub struct Logger {
    meta: LoggerMeta,
}

impl Logger {
    /// Append one entry to the log file, creating the file if absent.
    ///
    /// `source` names the call site (conventionally a file name), and
    /// `entry_type` is a free-text tag such as `"log"`, `"info"` or
    /// `"error"` (no enumeration is enforced). The entry is written as
    ///
    /// ```text
    /// [YYYY-MM-DD HH:MM:SS] | [<source>] [<entry_type>] > <message>
    /// ```
    ///
    /// with the timestamp taken in the configured time zone at call time.
    ///
    /// Fails with [`LoggerError::DirectoryNotWritable`] before touching the
    /// file when the containing directory is missing or not writable, and
    /// also when the open itself is denied despite permissive mode bits; any
    /// other filesystem failure during the append surfaces as
    /// [`LoggerError::FileIO`]. The whole line is written with a single call
    /// on an append-mode handle, so concurrent writers to the same path do
    /// not interleave partial lines.
    pub fn log(&self, source: &str, entry_type: &str, message: &str) -> Result<(), LoggerError> {
        let directory = self.meta.log_directory();
        if !directory_is_writable(directory) {
            return Err(LoggerError::DirectoryNotWritable);
        }

        let entry = self.meta.entry_line(source, entry_type, message);
        let mut log_file = self.meta.open_log_file().map_err(writability_backstop)?;
        log_file.write_all(entry.as_bytes())?;
        Ok(())
    }

    /// The path of the log file this logger appends to.
    pub fn path(&self) -> &Path {
        &self.meta.path
    }

    /// The time zone every timestamp and staleness check is computed in.
    pub fn time_zone(&self) -> Tz {
        self.meta.time_zone
    }

    /// The resolved reset interval as (unit, magnitude).
    pub fn interval(&self) -> (IntervalUnit, u64) {
        (self.meta.interval_unit, self.meta.reset_interval)
    }
}

/// Check whether `directory` exists and permits writes.
fn directory_is_writable(directory: &Path) -> bool {
    fs::metadata(directory)
        .map(|metadata| metadata.is_dir() && !metadata.permissions().readonly())
        .unwrap_or(false)
}

/// Fold a permission failure from the append open into the directory
/// writability contract. The mode-bit precondition can pass while the
/// process still lacks effective access (uid mismatch, ACLs).
fn writability_backstop(err: LoggerError) -> LoggerError {
    match err {
        LoggerError::FileIO(io_err) if io_err.kind() == io::ErrorKind::PermissionDenied => {
            LoggerError::DirectoryNotWritable
        }
        other => other,
    }
}

/// Provides a fluent interface for configuring [`Logger`] instances.
///
/// # Defaults
///
/// If not explicitly configured, the logger discards its file once it is one
/// calendar day old:
/// * Interval unit: [`IntervalUnit::Days`]
/// * Reset interval: 1
///
/// The file path and time zone have no sensible defaults and are required up
/// front. Invalid IANA zone names never reach the builder: parsing a zone
/// string into [`chrono_tz::Tz`] is the caller's step and fails there.
///
/// # Examples
///
/// Daily reset in a fixed zone:
/// ```rust
/// use resetlog::LoggerBuilder;
///
/// let logger = LoggerBuilder::new(
///     std::env::temp_dir().join("resetlog_daily.log"),
///     chrono_tz::Europe::Paris,
/// )
/// .build()
/// .unwrap();
/// ```
///
/// Weekly reset, zone parsed from configuration text:
/// ```rust
/// use resetlog::{IntervalUnit, LoggerBuilder};
///
/// let zone: chrono_tz::Tz = "Asia/Tokyo".parse().unwrap();
/// let logger = LoggerBuilder::new(std::env::temp_dir().join("resetlog_weekly.log"), zone)
///     .interval_unit("weeks".parse::<IntervalUnit>().unwrap())
///     .reset_interval(2)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    meta: LoggerMeta,
}

impl LoggerBuilder {
    /// Create a new logger builder for the given file path and time zone.
    pub fn new<P: AsRef<Path>>(path: P, time_zone: Tz) -> Self {
        LoggerBuilder {
            meta: LoggerMeta {
                path: path.as_ref().to_path_buf(),
                time_zone,
                interval_unit: IntervalUnit::Days,
                reset_interval: 1,
            },
        }
    }

    /// Set the calendar granularity of the reset interval.
    pub fn interval_unit(self, interval_unit: IntervalUnit) -> Self {
        Self {
            meta: LoggerMeta {
                interval_unit,
                ..self.meta
            },
        }
    }

    /// Set how many interval units the file may age before it is discarded.
    /// Must be positive; [`build`](LoggerBuilder::build) rejects zero.
    pub fn reset_interval(self, reset_interval: u64) -> Self {
        Self {
            meta: LoggerMeta {
                reset_interval,
                ..self.meta
            },
        }
    }

    /// Build the logger.
    ///
    /// Validates the configuration and immediately evaluates the reset policy
    /// against the target path: a file at or past its staleness threshold is
    /// deleted here, a younger file is left untouched, and an absent file is
    /// a no-op. Construction never creates the file; only [`Logger::log`]
    /// does that.
    pub fn build(self) -> Result<Logger, LoggerError> {
        if self.meta.reset_interval == 0 {
            return Err(LoggerError::InvalidResetInterval);
        }
        self.meta.apply_reset_policy()?;
        Ok(Logger { meta: self.meta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(unit: IntervalUnit, interval: u64) -> LoggerMeta {
        LoggerMeta {
            path: PathBuf::from("unused.log"),
            time_zone: chrono_tz::Europe::Paris,
            interval_unit: unit,
            reset_interval: interval,
        }
    }

    #[test]
    fn interval_unit_parses_the_three_allowed_names() {
        assert_eq!("hours".parse::<IntervalUnit>().unwrap(), IntervalUnit::Hours);
        assert_eq!("days".parse::<IntervalUnit>().unwrap(), IntervalUnit::Days);
        assert_eq!("weeks".parse::<IntervalUnit>().unwrap(), IntervalUnit::Weeks);
    }

    #[test]
    fn interval_unit_rejects_anything_else_with_the_contract_message() {
        for bad in ["minutes", "Days", "day", "", "months"] {
            let err = bad.parse::<IntervalUnit>().unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid interval unit. Allowed units are: 'hours', 'days', 'weeks'.",
                "unexpected message for {bad:?}"
            );
        }
    }

    #[test]
    fn interval_unit_display_round_trips() {
        for unit in [IntervalUnit::Hours, IntervalUnit::Days, IntervalUnit::Weeks] {
            assert_eq!(unit.to_string().parse::<IntervalUnit>().unwrap(), unit);
        }
    }

    #[test]
    fn threshold_advances_by_the_configured_interval() {
        let modified = chrono_tz::Europe::Paris
            .with_ymd_and_hms(2024, 1, 10, 12, 0, 0)
            .unwrap();

        let by_hours = meta(IntervalUnit::Hours, 6).reset_threshold(modified).unwrap();
        assert_eq!(by_hours, modified + TimeDelta::hours(6));

        let by_days = meta(IntervalUnit::Days, 3).reset_threshold(modified).unwrap();
        assert_eq!(by_days, modified + TimeDelta::days(3));

        let by_weeks = meta(IntervalUnit::Weeks, 2).reset_threshold(modified).unwrap();
        assert_eq!(by_weeks, modified + TimeDelta::days(14));
    }

    #[test]
    fn day_threshold_is_calendar_aware_across_dst() {
        // Paris springs forward on 2024-03-31: the calendar day after
        // 12:00 CET is 12:00 CEST, 23 elapsed hours later, while 24 fixed
        // hours land on 13:00 local time.
        let modified = chrono_tz::Europe::Paris
            .with_ymd_and_hms(2024, 3, 30, 12, 0, 0)
            .unwrap();

        let by_day = meta(IntervalUnit::Days, 1).reset_threshold(modified).unwrap();
        assert_eq!(by_day.to_string(), "2024-03-31 12:00:00 CEST");

        let by_hours = meta(IntervalUnit::Hours, 24).reset_threshold(modified).unwrap();
        assert_eq!(by_hours.to_string(), "2024-03-31 13:00:00 CEST");
    }

    #[test]
    fn day_threshold_skipped_by_spring_forward_lands_past_the_gap() {
        // Paris has no 2024-03-31 02:30 local time; one calendar day after
        // 02:30 CET must still resolve to an instant, not an error.
        let modified = chrono_tz::Europe::Paris
            .with_ymd_and_hms(2024, 3, 30, 2, 30, 0)
            .unwrap();

        let threshold = meta(IntervalUnit::Days, 1).reset_threshold(modified).unwrap();
        assert_eq!(threshold.to_string(), "2024-03-31 03:30:00 CEST");
    }

    #[test]
    fn day_threshold_ambiguous_in_fall_back_picks_the_earlier_instant() {
        // Paris repeats 2024-10-27 02:30 local time; the first occurrence
        // (still CEST) is the threshold.
        let modified = chrono_tz::Europe::Paris
            .with_ymd_and_hms(2024, 10, 26, 2, 30, 0)
            .unwrap();

        let threshold = meta(IntervalUnit::Days, 1).reset_threshold(modified).unwrap();
        assert_eq!(threshold.to_string(), "2024-10-27 02:30:00 CEST");
    }

    #[test]
    fn staleness_boundary_is_inclusive() {
        let m = meta(IntervalUnit::Hours, 1);
        let modified = chrono_tz::Europe::Paris
            .with_ymd_and_hms(2024, 1, 10, 12, 0, 0)
            .unwrap();
        let threshold = m.reset_threshold(modified).unwrap();

        assert!(!m.is_stale(modified, threshold - TimeDelta::seconds(1)).unwrap());
        assert!(m.is_stale(modified, threshold).unwrap(), "exact threshold must be stale");
        assert!(m.is_stale(modified, threshold + TimeDelta::seconds(1)).unwrap());
    }

    #[test]
    fn permission_denied_open_reports_the_writability_contract() {
        let denied = writability_backstop(LoggerError::FileIO(io::Error::from(
            io::ErrorKind::PermissionDenied,
        )));
        assert!(matches!(denied, LoggerError::DirectoryNotWritable));
        assert_eq!(denied.to_string(), "Log directory is not writable.");

        let other = writability_backstop(LoggerError::FileIO(io::Error::from(
            io::ErrorKind::WriteZero,
        )));
        assert!(matches!(other, LoggerError::FileIO(_)));
    }

    #[test]
    fn threshold_overflow_is_an_error() {
        let modified = chrono_tz::Europe::Paris
            .with_ymd_and_hms(2024, 1, 10, 12, 0, 0)
            .unwrap();
        let err = meta(IntervalUnit::Hours, u64::MAX)
            .reset_threshold(modified)
            .unwrap_err();
        assert!(matches!(err, LoggerError::ResetThreshold));
    }

    #[test]
    fn entry_line_matches_the_persisted_layout() {
        let line = meta(IntervalUnit::Days, 1).entry_line("A.ext", "info", "hello");
        assert!(line.ends_with("] | [A.ext] [info] > hello\n"), "layout broken: {line:?}");

        // [YYYY-MM-DD HH:MM:SS] is 21 characters including the brackets.
        let timestamp = &line[..21];
        assert!(timestamp.starts_with('[') && timestamp.ends_with(']'));
        let inner = &timestamp[1..20];
        assert!(inner
            .char_indices()
            .all(|(i, c)| match i {
                4 | 7 => c == '-',
                10 => c == ' ',
                13 | 16 => c == ':',
                _ => c.is_ascii_digit(),
            }));
    }

    #[test]
    fn bare_file_name_logs_into_the_current_directory() {
        assert_eq!(meta(IntervalUnit::Days, 1).log_directory(), Path::new("."));
        let nested = LoggerMeta {
            path: PathBuf::from("/var/log/app.log"),
            ..meta(IntervalUnit::Days, 1)
        };
        assert_eq!(nested.log_directory(), Path::new("/var/log"));
    }
}
