use thiserror::Error;

macro_rules! layout_error {
    // Single format string version
    ($msg:expr) => {
        crate::Error::InvalidLayout {
            message: format!($msg),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidLayout {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes of SPIR-V binary parsing, module construction,
/// analysis and optimization. Each variant provides specific context about the failure
/// so callers can distinguish corrupt input from misuse of the API.
///
/// # Error Categories
///
/// ## Binary Stream Errors
/// - [`Error::InvalidBinary`] - The word stream is not a SPIR-V module
/// - [`Error::WrongVersion`] - Module version exceeds the configured target environment
/// - [`Error::OutOfBounds`] - Attempted to read beyond the word stream
///
/// ## Module Structure Errors
/// - [`Error::InvalidLayout`] - Instructions violate the logical module layout
/// - [`Error::InvalidId`] - Result id out of range, duplicated, or an operand id never defined
/// - [`Error::InvalidData`] - A well-framed instruction carries operands the core cannot decode
///
/// ## Feature Errors
/// - [`Error::InvalidCapability`] - A capability required by the module is unavailable
/// - [`Error::MissingExtension`] - An extension required by the module is unavailable
///
/// ## Internal Errors
/// - [`Error::Internal`] - An optimizer pass found the module in a state that should be
///   impossible after validation
#[derive(Error, Debug)]
pub enum Error {
    /// The input stream is not a SPIR-V binary.
    ///
    /// Reported when the magic number is wrong (in either endianness), the header is
    /// truncated, or instruction framing runs past the end of the stream.
    #[error("Invalid SPIR-V binary - {0}")]
    InvalidBinary(String),

    /// The module declares a SPIR-V version above the configured target environment.
    ///
    /// The fields are the version words as `(major, minor)`.
    #[error("SPIR-V version {0}.{1} exceeds the target environment")]
    WrongVersion(u8, u8),

    /// The module violates the SPIR-V logical layout.
    ///
    /// This covers misordered sections, a missing or duplicated memory model, blocks
    /// without terminators, merge instructions in illegal positions, and similar
    /// structural violations. The error carries the source location where the
    /// violation was detected for debugging purposes.
    #[error("InvalidLayout - {file}:{line}: {message}")]
    InvalidLayout {
        /// The message to be printed for the layout error
        message: String,
        /// The source file in which this error was detected
        file: &'static str,
        /// The source line in which this error was detected
        line: u32,
    },

    /// An id violates the SPIR-V id rules.
    ///
    /// Defining ids must be non-zero, below the header's id bound, and unique within
    /// the module; every referenced id must be defined somewhere in the module. The
    /// associated value is the offending id.
    #[error("Invalid id %{0}")]
    InvalidId(u32),

    /// A capability required for the requested operation is not declared or not known.
    #[error("Invalid or unsupported capability {0}")]
    InvalidCapability(u32),

    /// A well-framed instruction carries data the core cannot decode.
    ///
    /// Typically an opcode outside the supported set, or operand words that do not
    /// match the opcode's signature.
    #[error("Invalid instruction data - {0}")]
    InvalidData(String),

    /// An extension required by the module is not available.
    #[error("Missing extension '{0}'")]
    MissingExtension(String),

    /// An out of bound access was attempted while parsing the word stream.
    #[error("Out of bound read would have occurred!")]
    OutOfBounds,

    /// An optimizer pass found the module in a state that validation should have
    /// rejected.
    ///
    /// Passes run on validated modules only, so structural surprises surface as
    /// internal errors rather than user-facing diagnostics.
    #[error("Internal error - {0}")]
    Internal(String),
}
