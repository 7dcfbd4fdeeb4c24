use std::fmt;

pub type EmptyResult = GenericResult<()>;
pub type GenericResult<T> = Result<T, GenericError>;
pub type GenericError = Box<dyn ::std::error::Error + Send + Sync>;

#[cfg(test)]
macro_rules! s {
    ($e:expr) => ($e.to_owned())
}

macro_rules! Err {
    ($($arg:tt)*) => (::std::result::Result::Err(format!($($arg)*).into()))
}

/// Fatal scan failures which callers may want to tell apart from I/O or package errors. They are
/// returned boxed into `GenericError` and can be recovered with `downcast_ref()`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    InputNotFound {
        what: String,
    },
    MalformedCell {
        row: u32,
        column: u32,
        value: String,
        reason: String,
    },
}

impl ScanError {
    pub fn input_not_found(what: impl Into<String>) -> GenericError {
        ScanError::InputNotFound {what: what.into()}.into()
    }

    pub fn malformed_cell(row: u32, column: u32, value: impl fmt::Debug, reason: impl Into<String>) -> GenericError {
        ScanError::MalformedCell {
            row, column,
            value: format!("{value:?}"),
            reason: reason.into(),
        }.into()
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InputNotFound {what} => write!(f, "{what} is not found"),
            ScanError::MalformedCell {row, column, value, reason} => write!(
                f, "Malformed cell at row #{row}, column #{column} ({value}): {reason}"),
        }
    }
}

impl ::std::error::Error for ScanError {
}
