//! Helper macros shared by the codecs.

/// Returns early with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of
/// panicking, e.g. when a parsed section exceeds its configured limit:
///
/// ```ignore
/// ensure!(src.len() <= max_header_bytes, ParseError::too_large_header(src.len(), max_header_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
