use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnshearError {
    // File I/O Errors
    #[error("Failed to open input file '{path}': {source}")]
    InputFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read line {line} in file '{path}': {source}")]
    DataFileError {
        path: String,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    // Parsing Errors
    #[error("Missing argument on line {line}")]
    MissingArgument { line: usize },

    #[error("Error parsing floating number from string {string} on line {line}: {source}")]
    FloatParseError {
        string: String,
        line: usize,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Error parsing integer number from string {string} on line {line}: {source}")]
    IntParseError {
        string: String,
        line: usize,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Malformed dump file on line {line}: {reason}")]
    MalformedDump { line: usize, reason: String },

    // Cell geometry errors
    #[error("Cell entry {entry} = {value} is not zero within tolerance {tolerance}")]
    GeometryPrecondition {
        entry: &'static str,
        value: f64,
        tolerance: f64,
    },

    #[error("Cell matrix is singular and cannot be inverted")]
    SingularCell,

    #[error("Cannot unwrap shear at frame {frame}: {reason}")]
    DegenerateShear { frame: usize, reason: String },

    // Metadata errors
    #[error("Metadata entry '{key}' has an unexpected type, expected {expected}")]
    InvalidMetadata { key: String, expected: &'static str },

    // Array bounds errors
    #[error("Trajectory index {index} out of range (total frames: {len})")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Trajectory source has no frame at index {index}")]
    MissingFrame { index: usize },
}

pub type Result<T> = std::result::Result<T, UnshearError>;
