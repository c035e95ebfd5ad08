//! Human-readable sequential tour identifiers.
//!
//! Tours are addressed by ids of the form `tour01`, `tour02`, ... The numeric
//! suffix is zero-padded to two digits and simply grows past that width
//! (`tour99` is followed by `tour100`).

/// Literal prefix of every allocated tour id.
pub const TOUR_ID_PREFIX: &str = "tour";

/// Minimum width of the zero-padded numeric suffix.
pub const TOUR_ID_WIDTH: usize = 2;

/// PostgreSQL advisory lock ID serializing tour id allocation.
pub const TOUR_ID_LOCK_ID: i64 = 736_451_902;

/// Parse the numeric suffix of a tour id.
///
/// Returns `None` for ids that do not follow the `tour<digits>` shape, so
/// hand-entered or legacy ids never take part in allocation.
pub fn parse_suffix(tour_id: &str) -> Option<i64> {
    let digits = tour_id.strip_prefix(TOUR_ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Format a tour id from its numeric suffix.
///
/// ```
/// use panotour_core::tour_id::format_tour_id;
///
/// assert_eq!(format_tour_id(1), "tour01");
/// assert_eq!(format_tour_id(42), "tour42");
/// assert_eq!(format_tour_id(100), "tour100");
/// ```
pub fn format_tour_id(n: i64) -> String {
    format!("{TOUR_ID_PREFIX}{n:0width$}", width = TOUR_ID_WIDTH)
}

/// Compute the id that follows the current maximum suffix.
///
/// `None` means no tour exists yet and yields `tour01`.
pub fn next_tour_id(max_suffix: Option<i64>) -> String {
    format_tour_id(max_suffix.map_or(1, |n| n.max(0) + 1))
}
