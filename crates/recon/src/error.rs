use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, inverted salary bounds, etc.).
    ConfigValidation(String),
    /// A schedule line does not have the positional column count.
    Shape { line: u64, expected: usize, actual: usize },
    /// Malformed CSV (unterminated quote, bad UTF-8, ...).
    Csv(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Shape { line, expected, actual } => write!(
                f,
                "schedule line {line}: expected {expected} columns, found {actual}"
            ),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<csv::Error> for ReconError {
    fn from(e: csv::Error) -> Self {
        match e.kind() {
            csv::ErrorKind::Io(_) => Self::Io(e.to_string()),
            _ => Self::Csv(e.to_string()),
        }
    }
}
