//!
//! # GDSII Records
//!
//! Record-type and data-type tags, the raw (type, data-type, payload) frame,
//! and the typed [GdsRecord] enumeration with its payload encoding and decoding.
//!

// Std-Lib Imports
use std::io::Write;

// Crates.io
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::error::{GdsError, GdsResult};
use crate::float::GdsFloat64;

///
/// # Gds Record Types
///
/// In the numeric-order specified by GDSII, for automatic [FromPrimitive] conversions.
/// The tag-space is closed: any byte not listed here is an unknown record type.
///
#[derive(
    FromPrimitive, Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash,
)]
pub enum GdsRecordType {
    Header = 0x00,
    BgnLib,
    LibName,
    Units,
    EndLib,
    BgnStruct,
    StructName, // STRNAME
    EndStruct,
    Boundary,
    Path,
    StructRef,
    ArrayRef,
    Text,
    Layer,
    DataType,
    Width,
    Xy,
    EndElement,
    StructRefName, // SNAME
    ColRow,
    TextNode, // "Not currently used"
    Node,
    TextType,
    Presentation,
    Spacing, // "Discontinued"
    String,
    Strans,
    Mag,
    Angle,
    Uinteger, // "No longer used"
    Ustring,  // "No longer used"
    RefLibs,
    Fonts,
    PathType,
    Generations,
    AttrTable,
    StypTable, // "Unreleased Feature"
    StrType,   // "Unreleased Feature"
    ElemFlags,
    ElemKey,  // "Unreleased Feature"
    LinkType, // "Unreleased Feature"
    LinkKeys, // "Unreleased Feature"
    Nodetype,
    PropAttr,
    PropValue,
    Box,
    BoxType,
    Plex,
    BeginExtn, // "Only occurs in CustomPlus"
    EndExtn,   // "Only occurs in CustomPlus"
    TapeNum,
    TapeCode,
    StrClass, // "Only for Calma internal use"
    Reserved, // "Reserved for future use"
    Format,
    Mask,
    EndMasks,
    LibDirSize,
    SrfName,
    LibSecur,
    /// Raith vendor extension: start of a circle element
    RaithCircle = 0x56,
}
impl GdsRecordType {
    /// Look up the record type for wire tag `tag`
    pub fn from_tag(tag: u8) -> Option<Self> {
        FromPrimitive::from_u8(tag)
    }
    /// Wire tag
    pub fn tag(self) -> u8 {
        self as u8
    }
    /// The data-type each record type declares for its payload
    pub fn datatype(self) -> GdsDataType {
        use GdsDataType::{BitArray, NoData, Str, F64, I16, I32};
        match self {
            Self::EndLib
            | Self::EndStruct
            | Self::Boundary
            | Self::Path
            | Self::StructRef
            | Self::ArrayRef
            | Self::Text
            | Self::EndElement
            | Self::TextNode
            | Self::Node
            | Self::Box
            | Self::EndMasks
            | Self::RaithCircle => NoData,

            Self::Presentation | Self::Strans | Self::ElemFlags | Self::StrClass => BitArray,

            Self::Header
            | Self::BgnLib
            | Self::BgnStruct
            | Self::Layer
            | Self::DataType
            | Self::ColRow
            | Self::TextType
            | Self::Spacing
            | Self::PathType
            | Self::Generations
            | Self::StrType
            | Self::LinkType
            | Self::Nodetype
            | Self::PropAttr
            | Self::BoxType
            | Self::TapeNum
            | Self::TapeCode
            | Self::Format
            | Self::LibDirSize
            | Self::LibSecur => I16,

            Self::Width
            | Self::Xy
            | Self::Uinteger
            | Self::ElemKey
            | Self::LinkKeys
            | Self::Plex
            | Self::BeginExtn
            | Self::EndExtn
            | Self::Reserved => I32,

            Self::Units | Self::Mag | Self::Angle => F64,

            Self::LibName
            | Self::StructName
            | Self::StructRefName
            | Self::String
            | Self::Ustring
            | Self::RefLibs
            | Self::Fonts
            | Self::AttrTable
            | Self::StypTable
            | Self::PropValue
            | Self::Mask
            | Self::SrfName => Str,
        }
    }
}

/// # Gds DataType Enumeration
///
/// In order as decoded from the fourth header byte.
/// Bytes outside the GDSII set are preserved as [GdsDataType::Other].
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum GdsDataType {
    NoData,
    BitArray,
    I16,
    I32,
    /// Four-byte real. Reserved; never used by GDSII writers.
    F32,
    F64,
    Str,
    Other(u8),
}
impl GdsDataType {
    /// Wire tag
    pub fn tag(self) -> u8 {
        match self {
            Self::NoData => 0,
            Self::BitArray => 1,
            Self::I16 => 2,
            Self::I32 => 3,
            Self::F32 => 4,
            Self::F64 => 5,
            Self::Str => 6,
            Self::Other(t) => t,
        }
    }
}
impl From<u8> for GdsDataType {
    fn from(tag: u8) -> Self {
        match tag {
            0 => Self::NoData,
            1 => Self::BitArray,
            2 => Self::I16,
            3 => Self::I32,
            4 => Self::F32,
            5 => Self::F64,
            6 => Self::Str,
            t => Self::Other(t),
        }
    }
}

///
/// # Raw Gds Record
///
/// One framed record as it appears on the wire:
/// its type and data-type tags, undecoded payload, and byte-offset in its source stream.
/// Payload accessors decode under the record-type's *declared* layout,
/// regardless of the data-type tag actually present.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdsRawRecord {
    pub rtype: GdsRecordType,
    pub dtype: GdsDataType,
    pub data: Vec<u8>,
    /// Byte offset of the record's first header byte
    pub offset: u64,
}
impl GdsRawRecord {
    /// Total on-wire size, including the four header bytes
    pub fn total_len(&self) -> usize {
        self.data.len() + 4
    }
    /// Require an empty payload
    pub fn empty(&self) -> GdsResult<()> {
        self.check_len(self.data.is_empty())
    }
    /// Decode a two-byte bit-array
    pub fn bits(&self) -> GdsResult<(u8, u8)> {
        self.check_len(self.data.len() == 2)?;
        Ok((self.data[0], self.data[1]))
    }
    /// Decode a single two-byte integer
    pub fn i16(&self) -> GdsResult<i16> {
        self.check_len(self.data.len() == 2)?;
        Ok(BigEndian::read_i16(&self.data))
    }
    /// Decode a vector of two-byte integers
    pub fn i16s(&self) -> GdsResult<Vec<i16>> {
        self.check_len(self.data.len() % 2 == 0)?;
        let mut rv = vec![0; self.data.len() / 2];
        BigEndian::read_i16_into(&self.data, &mut rv);
        Ok(rv)
    }
    /// Decode exactly `N` two-byte integers
    pub(crate) fn i16_array<const N: usize>(&self) -> GdsResult<[i16; N]> {
        self.check_len(self.data.len() == 2 * N)?;
        let mut rv = [0; N];
        BigEndian::read_i16_into(&self.data, &mut rv);
        Ok(rv)
    }
    /// Decode a single four-byte integer
    pub fn i32(&self) -> GdsResult<i32> {
        self.check_len(self.data.len() == 4)?;
        Ok(BigEndian::read_i32(&self.data))
    }
    /// Decode a vector of four-byte integers
    pub fn i32s(&self) -> GdsResult<Vec<i32>> {
        self.check_len(self.data.len() % 4 == 0)?;
        let mut rv = vec![0; self.data.len() / 4];
        BigEndian::read_i32_into(&self.data, &mut rv);
        Ok(rv)
    }
    /// Decode a single eight-byte real
    pub fn f64(&self) -> GdsResult<f64> {
        self.check_len(self.data.len() == 8)?;
        Ok(GdsFloat64::decode(BigEndian::read_u64(&self.data)))
    }
    /// Decode a vector of eight-byte reals
    pub fn f64s(&self) -> GdsResult<Vec<f64>> {
        self.check_len(self.data.len() % 8 == 0)?;
        let rv = self
            .data
            .chunks_exact(8)
            .map(|c| GdsFloat64::decode(BigEndian::read_u64(c)))
            .collect();
        Ok(rv)
    }
    /// Decode an ASCII string, stripping its trailing NUL padding
    pub fn string(&self) -> GdsResult<String> {
        let end = self
            .data
            .iter()
            .rposition(|b| *b != 0x00)
            .map_or(0, |i| i + 1);
        let text = &self.data[..end];
        if !text.is_ascii() {
            return Err(self.decode_err());
        }
        Ok(text.iter().map(|b| *b as char).collect())
    }
    fn check_len(&self, ok: bool) -> GdsResult<()> {
        if ok {
            Ok(())
        } else {
            Err(self.decode_err())
        }
    }
    /// Create a [GdsError::RecordDecode] for our payload
    pub(crate) fn decode_err(&self) -> GdsError {
        GdsError::RecordDecode {
            rtype: self.rtype,
            len: self.data.len(),
            offset: self.offset,
        }
    }
}

///
/// # Gds Record Enumeration
///
/// Keeps each record in relatively "raw" form,
/// other than assuring correct data-types,
/// and converting one-entry arrays into scalars.
/// Records of the deprecated and never-released types are kept as opaque bytes in [GdsRecord::Other].
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum GdsRecord {
    Header { version: i16 },
    BgnLib { dates: [i16; 12] },
    LibName(String),
    Units(f64, f64),
    EndLib,
    BgnStruct { dates: [i16; 12] },
    StructName(String),    // STRNAME Record
    StructRefName(String), // SNAME Record
    EndStruct,
    Boundary,
    Path,
    StructRef,
    ArrayRef,
    Text,
    Layer(i16),
    DataType(i16),
    Width(i32),
    Xy(Vec<i32>),
    EndElement,
    ColRow { cols: i16, rows: i16 },
    Node,
    TextType(i16),
    Presentation(u8, u8),
    String(String),
    Strans(u8, u8),
    Mag(f64),
    Angle(f64),
    RefLibs(String),
    Fonts(String),
    PathType(i16),
    Generations(i16),
    AttrTable(String),
    ElemFlags(u8, u8),
    Nodetype(i16),
    PropAttr(i16),
    PropValue(String),
    Box,
    BoxType(i16),
    Plex(i32),
    BeginExtn(i32),
    EndExtn(i32),
    TapeNum(i16),
    TapeCode([i16; 6]),
    StrClass(u8, u8),
    Format(i16),
    Mask(String),
    EndMasks,
    LibDirSize(i16),
    SrfName(String),
    LibSecur(Vec<i16>),
    RaithCircle,
    Other { rtype: GdsRecordType, data: Vec<u8> },
}
impl GdsRecord {
    /// Decode the payload of `raw`, under the layout declared by its record type
    pub fn decode(raw: &GdsRawRecord) -> GdsResult<GdsRecord> {
        use GdsRecordType as R;
        let record = match raw.rtype {
            // Library-Level Records
            R::Header => GdsRecord::Header { version: raw.i16()? },
            R::BgnLib => GdsRecord::BgnLib {
                dates: raw.i16_array()?,
            },
            R::LibName => GdsRecord::LibName(raw.string()?),
            R::Units => {
                let [d0, d1]: [f64; 2] = raw.f64s()?.try_into().map_err(|_| raw.decode_err())?;
                GdsRecord::Units(d0, d1)
            }
            R::EndLib => raw.empty().map(|_| GdsRecord::EndLib)?,

            // Structure (Cell) Level Records
            R::BgnStruct => GdsRecord::BgnStruct {
                dates: raw.i16_array()?,
            },
            R::StructName => GdsRecord::StructName(raw.string()?),
            R::StructRefName => GdsRecord::StructRefName(raw.string()?),
            R::EndStruct => raw.empty().map(|_| GdsRecord::EndStruct)?,

            // Element-Level Records
            R::Boundary => raw.empty().map(|_| GdsRecord::Boundary)?,
            R::Path => raw.empty().map(|_| GdsRecord::Path)?,
            R::StructRef => raw.empty().map(|_| GdsRecord::StructRef)?,
            R::ArrayRef => raw.empty().map(|_| GdsRecord::ArrayRef)?,
            R::Text => raw.empty().map(|_| GdsRecord::Text)?,
            R::Node => raw.empty().map(|_| GdsRecord::Node)?,
            R::Box => raw.empty().map(|_| GdsRecord::Box)?,
            R::RaithCircle => raw.empty().map(|_| GdsRecord::RaithCircle)?,
            R::Layer => GdsRecord::Layer(raw.i16()?),
            R::DataType => GdsRecord::DataType(raw.i16()?),
            R::Width => GdsRecord::Width(raw.i32()?),
            R::Xy => GdsRecord::Xy(raw.i32s()?),
            R::EndElement => raw.empty().map(|_| GdsRecord::EndElement)?,

            // More (less well-categorized here) record-types
            R::ColRow => {
                let [cols, rows] = raw.i16_array()?;
                GdsRecord::ColRow { cols, rows }
            }
            R::TextType => GdsRecord::TextType(raw.i16()?),
            R::Presentation => {
                let (d0, d1) = raw.bits()?;
                GdsRecord::Presentation(d0, d1)
            }
            R::String => GdsRecord::String(raw.string()?),
            R::Strans => {
                let (d0, d1) = raw.bits()?;
                GdsRecord::Strans(d0, d1)
            }
            R::Mag => GdsRecord::Mag(raw.f64()?),
            R::Angle => GdsRecord::Angle(raw.f64()?),
            R::RefLibs => GdsRecord::RefLibs(raw.string()?),
            R::Fonts => GdsRecord::Fonts(raw.string()?),
            R::PathType => GdsRecord::PathType(raw.i16()?),
            R::Generations => GdsRecord::Generations(raw.i16()?),
            R::AttrTable => GdsRecord::AttrTable(raw.string()?),
            R::ElemFlags => {
                let (d0, d1) = raw.bits()?;
                GdsRecord::ElemFlags(d0, d1)
            }
            R::Nodetype => GdsRecord::Nodetype(raw.i16()?),
            R::PropAttr => GdsRecord::PropAttr(raw.i16()?),
            R::PropValue => GdsRecord::PropValue(raw.string()?),
            R::BoxType => GdsRecord::BoxType(raw.i16()?),
            R::Plex => GdsRecord::Plex(raw.i32()?),
            R::BeginExtn => GdsRecord::BeginExtn(raw.i32()?),
            R::EndExtn => GdsRecord::EndExtn(raw.i32()?),
            R::TapeNum => GdsRecord::TapeNum(raw.i16()?),
            R::TapeCode => GdsRecord::TapeCode(raw.i16_array()?),
            R::StrClass => {
                let (d0, d1) = raw.bits()?;
                GdsRecord::StrClass(d0, d1)
            }
            R::Format => GdsRecord::Format(raw.i16()?),
            R::Mask => GdsRecord::Mask(raw.string()?),
            R::EndMasks => raw.empty().map(|_| GdsRecord::EndMasks)?,
            R::LibDirSize => GdsRecord::LibDirSize(raw.i16()?),
            R::SrfName => GdsRecord::SrfName(raw.string()?),
            R::LibSecur => GdsRecord::LibSecur(raw.i16s()?),

            // Deprecated & unreleased types
            R::TextNode
            | R::Spacing
            | R::Uinteger
            | R::Ustring
            | R::StypTable
            | R::StrType
            | R::ElemKey
            | R::LinkType
            | R::LinkKeys
            | R::Reserved => GdsRecord::Other {
                rtype: raw.rtype,
                data: raw.data.clone(),
            },
        };
        Ok(record)
    }
    /// Get our [GdsRecordType]
    pub fn record_type(&self) -> GdsRecordType {
        use GdsRecordType as R;
        match self {
            Self::Header { .. } => R::Header,
            Self::BgnLib { .. } => R::BgnLib,
            Self::LibName(_) => R::LibName,
            Self::Units(..) => R::Units,
            Self::EndLib => R::EndLib,
            Self::BgnStruct { .. } => R::BgnStruct,
            Self::StructName(_) => R::StructName,
            Self::StructRefName(_) => R::StructRefName,
            Self::EndStruct => R::EndStruct,
            Self::Boundary => R::Boundary,
            Self::Path => R::Path,
            Self::StructRef => R::StructRef,
            Self::ArrayRef => R::ArrayRef,
            Self::Text => R::Text,
            Self::Layer(_) => R::Layer,
            Self::DataType(_) => R::DataType,
            Self::Width(_) => R::Width,
            Self::Xy(_) => R::Xy,
            Self::EndElement => R::EndElement,
            Self::ColRow { .. } => R::ColRow,
            Self::Node => R::Node,
            Self::TextType(_) => R::TextType,
            Self::Presentation(..) => R::Presentation,
            Self::String(_) => R::String,
            Self::Strans(..) => R::Strans,
            Self::Mag(_) => R::Mag,
            Self::Angle(_) => R::Angle,
            Self::RefLibs(_) => R::RefLibs,
            Self::Fonts(_) => R::Fonts,
            Self::PathType(_) => R::PathType,
            Self::Generations(_) => R::Generations,
            Self::AttrTable(_) => R::AttrTable,
            Self::ElemFlags(..) => R::ElemFlags,
            Self::Nodetype(_) => R::Nodetype,
            Self::PropAttr(_) => R::PropAttr,
            Self::PropValue(_) => R::PropValue,
            Self::Box => R::Box,
            Self::BoxType(_) => R::BoxType,
            Self::Plex(_) => R::Plex,
            Self::BeginExtn(_) => R::BeginExtn,
            Self::EndExtn(_) => R::EndExtn,
            Self::TapeNum(_) => R::TapeNum,
            Self::TapeCode(_) => R::TapeCode,
            Self::StrClass(..) => R::StrClass,
            Self::Format(_) => R::Format,
            Self::Mask(_) => R::Mask,
            Self::EndMasks => R::EndMasks,
            Self::LibDirSize(_) => R::LibDirSize,
            Self::SrfName(_) => R::SrfName,
            Self::LibSecur(_) => R::LibSecur,
            Self::RaithCircle => R::RaithCircle,
            Self::Other { rtype, .. } => *rtype,
        }
    }
    /// Require any string payload to be ASCII
    pub fn check_ascii(&self) -> GdsResult<()> {
        match self {
            Self::LibName(s)
            | Self::StructName(s)
            | Self::StructRefName(s)
            | Self::String(s)
            | Self::RefLibs(s)
            | Self::Fonts(s)
            | Self::AttrTable(s)
            | Self::PropValue(s)
            | Self::Mask(s)
            | Self::SrfName(s)
                if !s.is_ascii() =>
            {
                Err(GdsError::NonAsciiString {
                    rtype: self.record_type(),
                    value: s.clone(),
                })
            }
            _ => Ok(()),
        }
    }
    /// Length of our encoded payload, in bytes, excluding the four header bytes
    pub fn payload_len(&self) -> usize {
        match self {
            // NoData
            Self::EndLib
            | Self::EndStruct
            | Self::Boundary
            | Self::Path
            | Self::StructRef
            | Self::ArrayRef
            | Self::Text
            | Self::EndElement
            | Self::Node
            | Self::Box
            | Self::EndMasks
            | Self::RaithCircle => 0,

            // Two-byte scalars & bit-arrays
            Self::Header { .. }
            | Self::Layer(_)
            | Self::DataType(_)
            | Self::TextType(_)
            | Self::PathType(_)
            | Self::Generations(_)
            | Self::Nodetype(_)
            | Self::PropAttr(_)
            | Self::BoxType(_)
            | Self::TapeNum(_)
            | Self::Format(_)
            | Self::LibDirSize(_)
            | Self::Presentation(..)
            | Self::Strans(..)
            | Self::ElemFlags(..)
            | Self::StrClass(..) => 2,

            Self::Width(_) | Self::Plex(_) | Self::BeginExtn(_) | Self::EndExtn(_) => 4,
            Self::ColRow { .. } => 4,
            Self::Mag(_) | Self::Angle(_) => 8,
            Self::TapeCode(_) => 12,
            Self::Units(..) => 16,
            Self::BgnLib { .. } | Self::BgnStruct { .. } => 24,
            Self::LibSecur(d) => 2 * d.len(),
            Self::Xy(d) => 4 * d.len(),
            Self::Other { data, .. } => data.len(),

            // Strings
            Self::LibName(s)
            | Self::StructName(s)
            | Self::StructRefName(s)
            | Self::String(s)
            | Self::RefLibs(s)
            | Self::Fonts(s)
            | Self::AttrTable(s)
            | Self::PropValue(s)
            | Self::Mask(s)
            | Self::SrfName(s) => padded_strlen(s),
        }
    }
    /// Write our payload bytes to `dest`
    pub fn write_payload(&self, dest: &mut impl Write) -> GdsResult<()> {
        match self {
            // NoData
            Self::EndLib
            | Self::EndStruct
            | Self::Boundary
            | Self::Path
            | Self::StructRef
            | Self::ArrayRef
            | Self::Text
            | Self::EndElement
            | Self::Node
            | Self::Box
            | Self::EndMasks
            | Self::RaithCircle => (),

            // BitArrays
            Self::Presentation(d0, d1)
            | Self::Strans(d0, d1)
            | Self::ElemFlags(d0, d1)
            | Self::StrClass(d0, d1) => {
                dest.write_u8(*d0)?;
                dest.write_u8(*d1)?;
            }
            // Single I16s
            Self::Header { version: d }
            | Self::Layer(d)
            | Self::DataType(d)
            | Self::TextType(d)
            | Self::PathType(d)
            | Self::Generations(d)
            | Self::Nodetype(d)
            | Self::PropAttr(d)
            | Self::BoxType(d)
            | Self::TapeNum(d)
            | Self::Format(d)
            | Self::LibDirSize(d) => dest.write_i16::<BigEndian>(*d)?,

            // Single I32s
            Self::Width(d) | Self::Plex(d) | Self::BeginExtn(d) | Self::EndExtn(d) => {
                dest.write_i32::<BigEndian>(*d)?
            }
            // Single F64s
            Self::Mag(d) | Self::Angle(d) => dest.write_u64::<BigEndian>(GdsFloat64::encode(*d))?,
            // "Structs"
            Self::Units(d0, d1) => {
                dest.write_u64::<BigEndian>(GdsFloat64::encode(*d0))?;
                dest.write_u64::<BigEndian>(GdsFloat64::encode(*d1))?;
            }
            Self::ColRow { cols, rows } => {
                dest.write_i16::<BigEndian>(*cols)?;
                dest.write_i16::<BigEndian>(*rows)?;
            }
            // Vectors
            Self::BgnLib { dates: d } | Self::BgnStruct { dates: d } => {
                for val in d.iter() {
                    dest.write_i16::<BigEndian>(*val)?;
                }
            }
            Self::TapeCode(d) => {
                for val in d.iter() {
                    dest.write_i16::<BigEndian>(*val)?;
                }
            }
            Self::LibSecur(d) => {
                for val in d.iter() {
                    dest.write_i16::<BigEndian>(*val)?;
                }
            }
            Self::Xy(d) => {
                for val in d.iter() {
                    dest.write_i32::<BigEndian>(*val)?;
                }
            }
            Self::Other { data, .. } => dest.write_all(data)?,
            // Strings
            Self::LibName(s)
            | Self::StructName(s)
            | Self::StructRefName(s)
            | Self::String(s)
            | Self::RefLibs(s)
            | Self::Fonts(s)
            | Self::AttrTable(s)
            | Self::PropValue(s)
            | Self::Mask(s)
            | Self::SrfName(s) => {
                dest.write_all(s.as_bytes())?;
                for _ in s.len()..padded_strlen(s) {
                    dest.write_u8(0x00)?;
                }
            }
        };
        Ok(())
    }
}

/// Encoded length of string `s`: its bytes, one terminating NUL,
/// and one more NUL if required to keep the length even.
pub(crate) fn padded_strlen(s: &str) -> usize {
    (s.len() + 2) & !1
}
