/// Errors raised synchronously by the windowing engine.
///
/// Lookups that can legitimately miss (rows without an element, positions
/// outside every page) return `Option` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A range with `start > end` or a negative bound.
    #[error("invalid range: {start}..={end} (start must be <= end and both non-negative)")]
    InvalidRange { start: i64, end: i64 },
    /// Direct data access outside `[0, count)`.
    #[error("index {index} out of bounds (count {count})")]
    OutOfBounds { index: usize, count: usize },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
