/// Earliest supported year
pub const MIN_YEAR: i32 = 1;
/// Latest supported year; keeps `yyyy` at four digits
pub const MAX_YEAR: i32 = 9999;

/// Month index for January (months are 0-indexed)
pub const JANUARY: u8 = 0;
/// Month index for February
pub const FEBRUARY: u8 = 1;

/// Number of months in a year
pub const MONTHS_PER_YEAR: u8 = 12;
/// Number of days in a week, and columns in a calendar grid
pub const DAYS_PER_WEEK: u8 = 7;

/// First day of month
pub const MIN_DAY: u8 = 1;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Days in each month for a non-leap year (index is the 0-based month)
pub const DAYS_IN_MONTH: [u8; 12] = [
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i32 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i32 = 400;

/// Day of January that always falls in ISO week 1
pub(crate) const ISO_WEEK_ANCHOR_DAY: u8 = 4;

/// ISO 8601 date component separator, used by `FromStr`/`Display`
pub const DATE_SEPARATOR: char = '-';

/// Substituted for a value that could not be determined in a message
pub const UNKNOWN_PLACEHOLDER: &str = "?";

/// Marker kind that exempts a field from whitespace stripping
pub const NO_STRIP_MARKER: &str = "noStrip";

/// Separates a marker kind from its parameter (`maxLength:40`)
pub const MARKER_PARAMETER_SEPARATOR: char = ':';

/// Separates multiple externally supplied messages on one field
pub const DEFAULT_TITLE_SEPARATOR: &str = "|";

/// Joins messages for display when more than one is reported
pub const DEFAULT_ERROR_SEPARATOR: &str = "<br />";
