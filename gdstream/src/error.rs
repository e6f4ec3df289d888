//!
//! # Gdstream Errors & Diagnostics
//!

// Std-Lib Imports
use std::error::Error;

// Crates.io
use serde::{Deserialize, Serialize};

// Local Imports
use crate::records::{GdsDataType, GdsRecordType};
use crate::ser;

/// # Gds Context
/// Enumeration of each context in which a record can be parsed, primarily for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GdsContext {
    Library,
    Struct,
    StructRef,
    ArrayRef,
    Boundary,
    Box,
    Path,
    Text,
    Node,
    Circle,
    Strans,
    Property,
}

///
/// # Gds Diagnostic
///
/// Non-fatal conditions noticed while reading.
/// Each is logged as a warning when raised, and collected in stream order.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GdsDiagnostic {
    /// A record's data-type tag differs from its record-type's declared data-type.
    /// Its payload is decoded under the declared layout regardless.
    DatatypeMismatch {
        rtype: GdsRecordType,
        expected: GdsDataType,
        actual: GdsDataType,
        offset: u64,
    },
    /// A recognized record which the data model does not interpret.
    /// The record is retained opaquely for writing.
    UnsupportedRecordSkipped { rtype: GdsRecordType, offset: u64 },
    /// A data-type byte outside the GDSII enumeration
    UnknownDatatypeTag {
        rtype: GdsRecordType,
        tag: u8,
        offset: u64,
    },
}
impl GdsDiagnostic {
    /// Byte offset of the record which raised the diagnostic
    pub fn offset(&self) -> u64 {
        match self {
            Self::DatatypeMismatch { offset, .. }
            | Self::UnsupportedRecordSkipped { offset, .. }
            | Self::UnknownDatatypeTag { offset, .. } => *offset,
        }
    }
}
impl std::fmt::Display for GdsDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::DatatypeMismatch {
                rtype,
                expected,
                actual,
                offset,
            } => write!(
                f,
                "Non-matching data-type for {:?} at byte {}: expected {:?}, found {:?}",
                rtype, offset, expected, actual
            ),
            Self::UnsupportedRecordSkipped { rtype, offset } => {
                write!(f, "Unsupported record {:?} at byte {}", rtype, offset)
            }
            Self::UnknownDatatypeTag { rtype, tag, offset } => write!(
                f,
                "Unknown data-type tag {} for {:?} at byte {}",
                tag, rtype, offset
            ),
        }
    }
}

/// # GdsResult Type-Alias
pub type GdsResult<T> = Result<T, GdsError>;

/// # Gds Error Enumeration
///
/// Every variant is fatal to the load, save, or flatten call which produced it.
/// Non-fatal conditions are instead reported as [GdsDiagnostic]s.
#[derive(Debug)]
pub enum GdsError {
    /// Record-type byte outside the GDSII enumeration
    UnknownRecordType { tag: u8, offset: u64 },
    /// A record other than the single type required at this grammar position
    UnexpectedRecord {
        expected: GdsRecordType,
        actual: GdsRecordType,
        offset: u64,
        ctx: Vec<GdsContext>,
    },
    /// None of the record types legal at this grammar position
    MissingRecord {
        expected: Vec<GdsRecordType>,
        actual: GdsRecordType,
        offset: u64,
        ctx: Vec<GdsContext>,
    },
    /// Payload does not fit its record-type's layout
    RecordDecode {
        rtype: GdsRecordType,
        len: usize,
        offset: u64,
    },
    /// Invalid record length
    RecordLen(usize),
    /// String with characters outside ASCII, which GDSII cannot carry
    NonAsciiString { rtype: GdsRecordType, value: String },
    /// Stream ended before the library did
    UnexpectedEof { offset: u64 },
    /// Unrecognized HEADER version number
    UnsupportedVersion(i16),
    /// A reference to a struct absent from its library
    DanglingReference { name: String, referrer: String },
    /// A struct which (transitively) instantiates itself
    ReferenceCycle { stack: Vec<String> },
    /// Flattened coordinate outside the `i32` range
    CoordinateOverflow { x: i64, y: i64 },
    /// Coordinate count or closure violation
    InvalidGeometry { elem: &'static str, msg: String },
    /// Property-number out of range, or repeated on one element
    InvalidProperty { attr: i16, msg: String },
    /// Two structs of the same name in one library
    DuplicateStruct(String),
    /// Diagnostic escalated by strict reading
    Diagnostic(GdsDiagnostic),
    /// Boxed (External) Errors
    Boxed(Box<dyn Error + Send + Sync>),
    /// Other errors
    Str(String),
}
impl GdsError {
    /// Create an [GdsError::InvalidGeometry]
    pub(crate) fn geometry(elem: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            elem,
            msg: msg.into(),
        }
    }
}
impl std::fmt::Display for GdsError {
    /// Display a [GdsError].
    /// This functionally delegates to the (derived) [std::fmt::Debug] implementation.
    /// Maybe more info that wanted in some cases. But certainly enough.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for GdsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}
impl From<std::io::Error> for GdsError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<String> for GdsError {
    fn from(e: String) -> Self {
        GdsError::Str(e)
    }
}
impl From<&str> for GdsError {
    fn from(e: &str) -> Self {
        GdsError::Str(e.to_string())
    }
}
impl From<ser::Error> for GdsError {
    fn from(e: ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<derive_builder::UninitializedFieldError> for GdsError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        GdsError::Str(format!("Missing required field `{}`", e.field_name()))
    }
}
impl From<GdsDiagnostic> for GdsError {
    fn from(e: GdsDiagnostic) -> Self {
        GdsError::Diagnostic(e)
    }
}
