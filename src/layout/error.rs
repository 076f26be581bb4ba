use thiserror::Error;

/// Hard errors raised by the packing core.
///
/// Running out of candidate positions is not an error; it is reported through
/// the session's failure list instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("mask {width}x{height} at ({x}, {y}) is outside the {field_width}x{field_height} field")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
        field_width: usize,
        field_height: usize,
    },
}
