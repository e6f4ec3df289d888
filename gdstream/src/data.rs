//!
//! # Gdstream Data Model
//!

// Std-Lib Imports
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{BufReader, Read, Write};
use std::path::Path;

// Crates.io
use chrono::{Datelike, NaiveDate, NaiveDateTime, SubsecRound, Timelike, Utc};
use derive_builder::Builder;
use derive_more::{self, Add, AddAssign, Sub, SubAssign};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::error::{GdsDiagnostic, GdsError, GdsResult};
use crate::flatten::GdsFlattener;
use crate::read::{GdsParser, GdsReadOptions};
use crate::records::{GdsRecord, GdsRecordType};
use crate::ser::SerdeFile;
use crate::write::GdsWriter;

/// # Gds Translation Settings
/// Reflection, rotation, and magnification for text-elements and references.
/// As configured by `STRANS` records.
#[derive(Default, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsStrans {
    /// Reflection, about the x-axis.
    /// Applied before rotation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub reflected: bool,
    /// Absolute Magnification Setting
    #[serde(default, skip_serializing_if = "is_false")]
    pub abs_mag: bool,
    /// Absolute Angle Setting
    #[serde(default, skip_serializing_if = "is_false")]
    pub abs_angle: bool,
    /// Magnification Factor. Interpreted as unit-scaling (mag==1.0) if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag: Option<f64>,
    /// Angle, in degrees counter-clockwise. Defaults to zero if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}
impl GdsStrans {
    /// Decode from the two `STRANS` flag bytes. Magnification and angle are left unset.
    pub fn from_bits(d0: u8, d1: u8) -> Self {
        Self {
            reflected: d0 & 0x80 != 0,
            abs_mag: d1 & 0x04 != 0,
            abs_angle: d1 & 0x02 != 0,
            ..Default::default()
        }
    }
    /// Encode the two `STRANS` flag bytes
    pub fn bits(&self) -> (u8, u8) {
        (
            (self.reflected as u8) << 7,
            (self.abs_mag as u8) << 2 | (self.abs_angle as u8) << 1,
        )
    }
    /// Magnification factor, defaulting to 1.0
    pub fn mag(&self) -> f64 {
        self.mag.unwrap_or(1.0)
    }
    /// Rotation in degrees, defaulting to 0.0
    pub fn angle(&self) -> f64 {
        self.angle.unwrap_or(0.0)
    }
}

/// # Text Vertical Alignment
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum GdsVertAlign {
    Top,
    Middle,
    Bottom,
}
/// # Text Horizontal Alignment
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum GdsHorizAlign {
    Left,
    Center,
    Right,
}

/// # Gds Text-Presentation Flags
/// Sets fonts, text justification, and the like.
/// Stored in raw `u8` form, so that undefined bits survive a round-trip.
///
/// Within the second byte:
/// * Bits 4-5 hold the font number
/// * Bits 2-3 hold the vertical alignment (top, middle, bottom)
/// * Bits 0-1 hold the horizontal alignment (left, center, right)
#[derive(Default, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsPresentation(pub u8, pub u8);
impl GdsPresentation {
    /// Create from a font number (0-3) and alignments
    pub fn new(font: u8, vert: GdsVertAlign, horiz: GdsHorizAlign) -> Self {
        let v = match vert {
            GdsVertAlign::Top => 0,
            GdsVertAlign::Middle => 1,
            GdsVertAlign::Bottom => 2,
        };
        let h = match horiz {
            GdsHorizAlign::Left => 0,
            GdsHorizAlign::Center => 1,
            GdsHorizAlign::Right => 2,
        };
        Self(0, (font & 0x03) << 4 | v << 2 | h)
    }
    /// Font number, 0-3
    pub fn font(&self) -> u8 {
        (self.1 >> 4) & 0x03
    }
    /// Vertical alignment. The undefined value `3` reads as [GdsVertAlign::Bottom].
    pub fn vert(&self) -> GdsVertAlign {
        match (self.1 >> 2) & 0x03 {
            0 => GdsVertAlign::Top,
            1 => GdsVertAlign::Middle,
            _ => GdsVertAlign::Bottom,
        }
    }
    /// Horizontal alignment. The undefined value `3` reads as [GdsHorizAlign::Right].
    pub fn horiz(&self) -> GdsHorizAlign {
        match self.1 & 0x03 {
            0 => GdsHorizAlign::Left,
            1 => GdsHorizAlign::Center,
            _ => GdsHorizAlign::Right,
        }
    }
}

/// # Gds Element Flags
/// As configured by `ELFLAGS` records.
/// Two bytes of bit-fields stored in raw `u8` form.
#[derive(Default, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsElemFlags(pub u8, pub u8);

/// # Gds Plex
/// "A unique positive number which is common to all elements of the Plex to which this element belongs."
#[derive(Default, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsPlex(pub i32);

/// # Path End-Cap Style
/// As set by `PATHTYPE` records.
#[derive(Default, Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum GdsPathType {
    /// Square ends, flush with the end-points
    #[default]
    Flush,
    /// Round ends
    Round,
    /// Square ends, extended by half the width
    Extended,
    /// Any other value, e.g. CustomPlus's variable extensions
    Other(i16),
}
impl GdsPathType {
    /// Numeric `PATHTYPE` value
    pub fn code(self) -> i16 {
        match self {
            Self::Flush => 0,
            Self::Round => 1,
            Self::Extended => 2,
            Self::Other(c) => c,
        }
    }
}
impl From<i16> for GdsPathType {
    fn from(code: i16) -> Self {
        match code {
            0 => Self::Flush,
            1 => Self::Round,
            2 => Self::Extended,
            c => Self::Other(c),
        }
    }
}

/// # Gds Stream Version
/// As stored in the `HEADER` record.
#[derive(Default, Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum GdsVersion {
    /// Versions prior to 3, written as zero
    V0,
    V3,
    V4,
    V5,
    #[default]
    V600,
    V7,
}
impl GdsVersion {
    /// Numeric `HEADER` value
    pub fn code(self) -> i16 {
        match self {
            Self::V0 => 0,
            Self::V3 => 3,
            Self::V4 => 4,
            Self::V5 => 5,
            Self::V600 => 600,
            Self::V7 => 7,
        }
    }
}
impl TryFrom<i16> for GdsVersion {
    type Error = GdsError;
    fn try_from(code: i16) -> GdsResult<Self> {
        match code {
            0 => Ok(Self::V0),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            5 => Ok(Self::V5),
            600 => Ok(Self::V600),
            7 => Ok(Self::V7),
            c => Err(GdsError::UnsupportedVersion(c)),
        }
    }
}

/// # Gds Library Units
///
/// Each GDSII Library has two length-units, referred to as "DB Units" and "User Units" respectively.
/// Essentially all spatial data throughout the Library is denoted in "DB Units".
/// "User units" are a sort of recommendation for GUI programs to use when displaying the Library.
///
/// From the `UNITS` record-description:
/// ```text
/// Contains two eight-byte real numbers.
/// The first number is the size of a database-unit, in user-units.
/// The second is the size of a database-unit in meters.
/// To calculate the size of a user-unit in meters, divide the second number by the first.
/// ```
///
/// These two numbers are stored as-is in the [GdsUnits] tuple-struct.
/// Conversion of coordinates into physical units is left to consumers.
///
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsUnits(pub f64, pub f64);
impl GdsUnits {
    /// Create a new [GdsUnits]
    pub fn new(num1: f64, num2: f64) -> Self {
        Self(num1, num2)
    }
    /// Get the database-unit size, in meters. Used for all spatial data.
    pub fn db_unit(&self) -> f64 {
        self.1
    }
    /// Get the user-unit size, in meters. Largely for display/ debug.
    pub fn user_unit(&self) -> f64 {
        self.1 / self.0
    }
}
impl Default for GdsUnits {
    /// Default values for GDS Units:
    /// * DB-Unit = 1nm
    /// * User-Unit = 1µm (1000x the DB-Unit)
    fn default() -> Self {
        Self(1e-3, 1e-9)
    }
}

/// # Gds Spatial Point
/// Coordinate in (x,y) layout-space.
/// Denoted in each [GdsLibrary]'s [GdsUnits].
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct GdsPoint {
    pub x: i32,
    pub y: i32,
}
impl GdsPoint {
    /// Create a new [GdsPoint]
    pub fn new(x: i32, y: i32) -> Self {
        GdsPoint { x, y }
    }
    /// Create a vector of [GdsPoint] from an array of tuples
    pub fn vec(pts: &[(i32, i32)]) -> Vec<Self> {
        pts.iter().map(|pt| Self::new(pt.0, pt.1)).collect()
    }
    /// Create a new point shifted by `by`.
    /// Fails with [GdsError::CoordinateOverflow] if the sum leaves the `i32` range.
    pub fn shift(&self, by: &GdsPoint) -> GdsResult<GdsPoint> {
        Self::from_wide(self.x as i64 + by.x as i64, self.y as i64 + by.y as i64)
    }
    /// Narrow 64-bit coordinates back into a [GdsPoint]
    pub(crate) fn from_wide(x: i64, y: i64) -> GdsResult<GdsPoint> {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(nx), Ok(ny)) => Ok(GdsPoint::new(nx, ny)),
            _ => Err(GdsError::CoordinateOverflow { x, y }),
        }
    }
    /// Convert an n-element vector if `i32` into an n/2-element vector of [GdsPoint]s.
    pub(crate) fn parse_vec(from: &[i32]) -> Option<Vec<GdsPoint>> {
        if from.len() % 2 != 0 {
            return None;
        }
        Some(
            from.chunks_exact(2)
                .map(|c| GdsPoint::new(c[0], c[1]))
                .collect(),
        )
    }
    /// Convert an n-element slice of [GdsPoint]s to a 2n-element i32 vector.
    pub(crate) fn flatten_vec(src: &[GdsPoint]) -> Vec<i32> {
        src.iter().flat_map(|p| [p.x, p.y]).collect()
    }
}

/// # Gds Property
/// ```text
/// PROPATTR PROPVALUE
/// ```
/// Attribute numbers range over 1-127, and may not repeat within an element.
#[derive(Default, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsProperty {
    /// Attribute Number
    pub attr: i16,
    /// Attribute Value
    pub value: String,
}
impl GdsProperty {
    /// Create a new [GdsProperty]
    pub fn new(attr: i16, value: impl Into<String>) -> Self {
        Self {
            attr,
            value: value.into(),
        }
    }
}
/// Check attribute numbers of `props` are in range and distinct
pub(crate) fn check_properties(props: &[GdsProperty]) -> GdsResult<()> {
    let mut seen = HashSet::with_capacity(props.len());
    for prop in props {
        if !(1..=127).contains(&prop.attr) {
            return Err(GdsError::InvalidProperty {
                attr: prop.attr,
                msg: "attribute number outside 1-127".into(),
            });
        }
        if !seen.insert(prop.attr) {
            return Err(GdsError::InvalidProperty {
                attr: prop.attr,
                msg: "repeated attribute number".into(),
            });
        }
    }
    Ok(())
}
/// Check `xy` is a closed polygon of at least `min` points
fn check_closed(elem: &'static str, xy: &[GdsPoint], min: usize) -> GdsResult<()> {
    if xy.len() < min {
        return Err(GdsError::geometry(
            elem,
            format!("{} points, at least {} required", xy.len(), min),
        ));
    }
    if xy.first() != xy.last() {
        return Err(GdsError::geometry(elem, "first and last points differ"));
    }
    Ok(())
}

///
/// # Gds Boundary Element
///
/// The most common type for closed-form shapes in GDSII.
/// Most IC layout is comprised of [GdsBoundary] elements, which represent individual polygons.
/// GDSII dictates that the first and final coordinates in each [GdsBoundary]
/// shall be identical, "closing" the polygon.
/// Hence an N-sided polygon is represented by an (N+1)-point `xy` vector.
///
/// ```text
/// BOUNDARY [ELFLAGS] [PLEX] LAYER DATATYPE XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsBoundary {
    // Required Fields
    /// Layer Number
    pub layer: i16,
    /// DataType ID
    pub datatype: i16,
    /// Vector of x,y coordinates
    pub xy: Vec<GdsPoint>,

    // Optional Fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub elflags: Option<GdsElemFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub plex: Option<GdsPlex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsBoundary {
    /// Create a new [GdsBoundary], failing if `xy` is not a closed polygon of at least four points
    pub fn new(layer: i16, datatype: i16, xy: Vec<GdsPoint>) -> GdsResult<Self> {
        let b = Self {
            layer,
            datatype,
            xy,
            ..Default::default()
        };
        b.validate()?;
        Ok(b)
    }
    /// Check coordinate and property invariants
    pub fn validate(&self) -> GdsResult<()> {
        check_closed("Boundary", &self.xy, 4)?;
        check_properties(&self.properties)
    }
}
impl GdsBoundaryBuilder {
    fn validate(&self) -> GdsResult<()> {
        if let Some(ref xy) = self.xy {
            check_closed("Boundary", xy, 4)?;
        }
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

///
/// # Gds Path Element
///
/// ```text
/// PATH [ELFLAGS] [PLEX] LAYER DATATYPE [PATHTYPE] [WIDTH] [BGNEXTN] [ENDEXTN] XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsPath {
    // Required Fields
    /// Layer Number
    pub layer: i16,
    /// DataType ID
    pub datatype: i16,
    /// Vector of x,y coordinates
    pub xy: Vec<GdsPoint>,

    // Optional Fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub path_type: Option<GdsPathType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub begin_extn: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub end_extn: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub elflags: Option<GdsElemFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub plex: Option<GdsPlex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsPath {
    /// Create a new [GdsPath], failing if `xy` has fewer than two points
    pub fn new(layer: i16, datatype: i16, xy: Vec<GdsPoint>) -> GdsResult<Self> {
        let p = Self {
            layer,
            datatype,
            xy,
            ..Default::default()
        };
        p.validate()?;
        Ok(p)
    }
    /// Path width, defaulting to zero
    pub fn width(&self) -> i32 {
        self.width.unwrap_or(0)
    }
    /// End-cap style, defaulting to [GdsPathType::Flush]
    pub fn end_cap(&self) -> GdsPathType {
        self.path_type.unwrap_or_default()
    }
    /// Check coordinate and property invariants
    pub fn validate(&self) -> GdsResult<()> {
        check_path_xy(&self.xy)?;
        check_properties(&self.properties)
    }
}
fn check_path_xy(xy: &[GdsPoint]) -> GdsResult<()> {
    if xy.len() < 2 {
        return Err(GdsError::geometry(
            "Path",
            format!("{} points, at least 2 required", xy.len()),
        ));
    }
    Ok(())
}
impl GdsPathBuilder {
    fn validate(&self) -> GdsResult<()> {
        if let Some(ref xy) = self.xy {
            check_path_xy(xy)?;
        }
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

///
/// # Gds Struct Reference (Cell Instance)
///
/// Represents an instance of a layout-cell.
/// Coordinate `xy` specifies the instance's insertion point.
/// Options for rotation and reflection are configured in the [GdsStrans] attribute `strans`.
/// The referenced struct is looked up by `name` only when needed, e.g. while flattening.
///
/// ```text
/// SREF [ELFLAGS] [PLEX] SNAME [<strans>] XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsStructRef {
    // Required Fields
    /// Struct (Cell) Name
    pub name: String,
    /// Location x,y coordinates
    pub xy: GdsPoint,

    // Optional Fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    /// Translation & Reflection Options
    pub strans: Option<GdsStrans>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub elflags: Option<GdsElemFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub plex: Option<GdsPlex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsStructRef {
    /// Create a new [GdsStructRef] to the struct named `name`, placed at `xy`
    pub fn new(name: impl Into<String>, xy: GdsPoint) -> Self {
        Self {
            name: name.into(),
            xy,
            ..Default::default()
        }
    }
    /// Check property invariants. The single-point `xy` is guaranteed by its type.
    pub fn validate(&self) -> GdsResult<()> {
        check_properties(&self.properties)
    }
}
impl GdsStructRefBuilder {
    fn validate(&self) -> GdsResult<()> {
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

///
/// # Gds Array Reference
///
/// A two-dimensional array of struct (cell) instances.
/// Its three points are, in order:
/// * The reference point, i.e. the location of the first instance
/// * The reference point displaced by `cols` column-pitches
/// * The reference point displaced by `rows` row-pitches
///
/// ```text
/// AREF [ELFLAGS] [PLEX] SNAME [<strans>] COLROW XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsArrayRef {
    // Required Fields
    /// Struct (Cell) Name
    pub name: String,
    /// Vector of x,y coordinates
    pub xy: [GdsPoint; 3],
    /// Number of columns
    pub cols: i16,
    /// Number of rows
    pub rows: i16,

    // Optional Fields
    /// Translation & Reflection Options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub strans: Option<GdsStrans>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub elflags: Option<GdsElemFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub plex: Option<GdsPlex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsArrayRef {
    /// Create a new [GdsArrayRef], failing unless `cols` and `rows` are positive
    pub fn new(name: impl Into<String>, xy: [GdsPoint; 3], cols: i16, rows: i16) -> GdsResult<Self> {
        let a = Self {
            name: name.into(),
            xy,
            cols,
            rows,
            ..Default::default()
        };
        a.validate()?;
        Ok(a)
    }
    /// Check array-size and property invariants
    pub fn validate(&self) -> GdsResult<()> {
        check_colrow(self.cols, self.rows)?;
        check_properties(&self.properties)
    }
}
fn check_colrow(cols: i16, rows: i16) -> GdsResult<()> {
    if cols < 1 || rows < 1 {
        return Err(GdsError::geometry(
            "ArrayRef",
            format!("{} columns and {} rows, both must be positive", cols, rows),
        ));
    }
    Ok(())
}
impl GdsArrayRefBuilder {
    fn validate(&self) -> GdsResult<()> {
        if let (Some(cols), Some(rows)) = (self.cols, self.rows) {
            check_colrow(cols, rows)?;
        }
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

///
/// # Gds Text Element
///
/// ```text
/// TEXT [ELFLAGS] [PLEX] LAYER
/// TEXTTYPE [PRESENTATION] [PATHTYPE] [WIDTH] [<strans>] XY STRING
/// ```
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsTextElem {
    // Required Fields
    /// Text Value
    pub string: String,
    /// Layer Number
    pub layer: i16,
    /// Text-Type ID
    pub texttype: i16,
    /// Vector of x,y coordinates
    pub xy: GdsPoint,

    // Optional Fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub presentation: Option<GdsPresentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub path_type: Option<GdsPathType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    /// Translation & Reflection Options
    pub strans: Option<GdsStrans>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub elflags: Option<GdsElemFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub plex: Option<GdsPlex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsTextElem {
    /// Create a new [GdsTextElem]
    pub fn new(string: impl Into<String>, layer: i16, texttype: i16, xy: GdsPoint) -> Self {
        Self {
            string: string.into(),
            layer,
            texttype,
            xy,
            ..Default::default()
        }
    }
    /// Vertical alignment, defaulting to [GdsVertAlign::Top]
    pub fn vert(&self) -> GdsVertAlign {
        self.presentation
            .as_ref()
            .map_or(GdsVertAlign::Top, |p| p.vert())
    }
    /// Horizontal alignment, defaulting to [GdsHorizAlign::Left]
    pub fn horiz(&self) -> GdsHorizAlign {
        self.presentation
            .as_ref()
            .map_or(GdsHorizAlign::Left, |p| p.horiz())
    }
    /// Check property invariants
    pub fn validate(&self) -> GdsResult<()> {
        check_properties(&self.properties)
    }
}
impl GdsTextElemBuilder {
    fn validate(&self) -> GdsResult<()> {
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

///
/// # Gds Node Element
///
/// Electrical nets, with between one and fifty points.
///
/// ```text
/// NODE [ELFLAGS] [PLEX] LAYER NODETYPE XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsNode {
    // Required Fields
    /// Layer Number
    pub layer: i16,
    /// Node-Type ID
    pub nodetype: i16,
    /// Vector of x,y coordinates
    pub xy: Vec<GdsPoint>,

    // Optional Fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub elflags: Option<GdsElemFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub plex: Option<GdsPlex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsNode {
    /// Create a new [GdsNode], failing unless `xy` has 1-50 points
    pub fn new(layer: i16, nodetype: i16, xy: Vec<GdsPoint>) -> GdsResult<Self> {
        let n = Self {
            layer,
            nodetype,
            xy,
            ..Default::default()
        };
        n.validate()?;
        Ok(n)
    }
    /// Check coordinate and property invariants
    pub fn validate(&self) -> GdsResult<()> {
        check_node_xy(&self.xy)?;
        check_properties(&self.properties)
    }
}
fn check_node_xy(xy: &[GdsPoint]) -> GdsResult<()> {
    if xy.is_empty() || xy.len() > 50 {
        return Err(GdsError::geometry(
            "Node",
            format!("{} points, 1-50 required", xy.len()),
        ));
    }
    Ok(())
}
impl GdsNodeBuilder {
    fn validate(&self) -> GdsResult<()> {
        if let Some(ref xy) = self.xy {
            check_node_xy(xy)?;
        }
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

///
/// # Gds Box Element
///
/// ```text
/// BOX [ELFLAGS] [PLEX] LAYER BOXTYPE XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsBox {
    // Required Fields
    /// Layer Number
    pub layer: i16,
    /// Box-Type ID
    pub boxtype: i16,
    /// Vector of x,y coordinates
    pub xy: [GdsPoint; 5],

    // Optional Fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub elflags: Option<GdsElemFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub plex: Option<GdsPlex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsBox {
    /// Create a new [GdsBox], failing unless its first and last points coincide
    pub fn new(layer: i16, boxtype: i16, xy: [GdsPoint; 5]) -> GdsResult<Self> {
        let b = Self {
            layer,
            boxtype,
            xy,
            ..Default::default()
        };
        b.validate()?;
        Ok(b)
    }
    /// Check coordinate and property invariants
    pub fn validate(&self) -> GdsResult<()> {
        check_closed("Box", &self.xy, 5)?;
        check_properties(&self.properties)
    }
}
impl GdsBoxBuilder {
    fn validate(&self) -> GdsResult<()> {
        if let Some(ref xy) = self.xy {
            check_closed("Box", xy, 5)?;
        }
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

/// # Circle Flags
///
/// The fourth `XY` pair of a [GdsCircle], stored raw.
/// Bits 0, 1, and 2 of the y-value mark ellipses, filled circles, and arcs respectively.
#[derive(Default, Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsCircleFlags(pub i32, pub i32);
impl GdsCircleFlags {
    const ELLIPSE: i32 = 1 << 0;
    const FILLED: i32 = 1 << 1;
    const ARC: i32 = 1 << 2;

    /// Create from the three boolean flags
    pub fn new(ellipse: bool, filled: bool, arc: bool) -> Self {
        let mut bits = 0;
        if ellipse {
            bits |= Self::ELLIPSE;
        }
        if filled {
            bits |= Self::FILLED;
        }
        if arc {
            bits |= Self::ARC;
        }
        Self(0, bits)
    }
    pub fn is_ellipse(&self) -> bool {
        self.1 & Self::ELLIPSE != 0
    }
    pub fn is_filled(&self) -> bool {
        self.1 & Self::FILLED != 0
    }
    pub fn is_arc(&self) -> bool {
        self.1 & Self::ARC != 0
    }
}

///
/// # Gds Circle Element
///
/// Raith's vendor extension for circles, ellipses, and arcs.
/// Its `XY` record holds exactly four points: center, radii, arc angles, and [GdsCircleFlags].
///
/// ```text
/// RAITHCIRCLE LAYER DATATYPE [WIDTH] XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(validate = "Self::validate", error = "GdsError")
)]
pub struct GdsCircle {
    // Required Fields
    /// Layer Number
    pub layer: i16,
    /// DataType ID
    pub datatype: i16,
    /// Center Point
    pub center: GdsPoint,
    /// Radii, in x and y. Equal for circles.
    pub radii: GdsPoint,

    // Optional Fields
    /// Start and end angles. Only meaningful for arcs.
    #[serde(default)]
    #[builder(default)]
    pub arc: GdsPoint,
    #[serde(default)]
    #[builder(default)]
    pub flags: GdsCircleFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub properties: Vec<GdsProperty>,
}
impl GdsCircle {
    /// Create a new, un-filled circle of radius `r`
    pub fn new(layer: i16, datatype: i16, center: GdsPoint, r: i32) -> GdsResult<Self> {
        let c = Self {
            layer,
            datatype,
            center,
            radii: GdsPoint::new(r, r),
            ..Default::default()
        };
        c.validate()?;
        Ok(c)
    }
    /// Arc start and end angles, if we are an arc
    pub fn arc_angles(&self) -> Option<GdsPoint> {
        if self.flags.is_arc() {
            Some(self.arc)
        } else {
            None
        }
    }
    /// Line width, defaulting to zero
    pub fn width(&self) -> i32 {
        self.width.unwrap_or(0)
    }
    /// The four on-wire points
    pub(crate) fn xy(&self) -> [GdsPoint; 4] {
        [
            self.center,
            self.radii,
            self.arc,
            GdsPoint::new(self.flags.0, self.flags.1),
        ]
    }
    /// Check radii and property invariants
    pub fn validate(&self) -> GdsResult<()> {
        check_radii(&self.radii)?;
        check_properties(&self.properties)
    }
}
fn check_radii(radii: &GdsPoint) -> GdsResult<()> {
    if radii.x < 0 || radii.y < 0 {
        return Err(GdsError::geometry("Circle", "negative radius"));
    }
    Ok(())
}
impl GdsCircleBuilder {
    fn validate(&self) -> GdsResult<()> {
        if let Some(ref radii) = self.radii {
            check_radii(radii)?;
        }
        match self.properties {
            Some(ref p) => check_properties(p),
            None => Ok(()),
        }
    }
}

///
/// # Gds Element Enumeration
///
/// Primary union of geometric elements, instances, and arrays which comprise a GDSII struct (cell).
///
/// ```text
/// {<boundary> | <path> | <SREF> | <AREF> | <text> | <node> | <box> | <circle>} {<property>}* ENDEL
/// ```
///
/// Note the `properties` vectors are pushed down to each enum variant.
///
#[derive(derive_more::From, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub enum GdsElement {
    GdsBoundary(GdsBoundary),
    GdsPath(GdsPath),
    GdsStructRef(GdsStructRef),
    GdsArrayRef(GdsArrayRef),
    GdsTextElem(GdsTextElem),
    GdsNode(GdsNode),
    GdsBox(GdsBox),
    GdsCircle(GdsCircle),
}
impl GdsElement {
    /// Check the invariants of whichever variant we are
    pub fn validate(&self) -> GdsResult<()> {
        use GdsElement::*;
        match self {
            GdsBoundary(e) => e.validate(),
            GdsPath(e) => e.validate(),
            GdsStructRef(e) => e.validate(),
            GdsArrayRef(e) => e.validate(),
            GdsTextElem(e) => e.validate(),
            GdsNode(e) => e.validate(),
            GdsBox(e) => e.validate(),
            GdsCircle(e) => e.validate(),
        }
    }
    /// Get our properties
    pub fn properties(&self) -> &[GdsProperty] {
        use GdsElement::*;
        match self {
            GdsBoundary(e) => &e.properties,
            GdsPath(e) => &e.properties,
            GdsStructRef(e) => &e.properties,
            GdsArrayRef(e) => &e.properties,
            GdsTextElem(e) => &e.properties,
            GdsNode(e) => &e.properties,
            GdsBox(e) => &e.properties,
            GdsCircle(e) => &e.properties,
        }
    }
    /// Name of the referenced struct, for the two reference variants
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            GdsElement::GdsStructRef(e) => Some(&e.name),
            GdsElement::GdsArrayRef(e) => Some(&e.name),
            _ => None,
        }
    }
    /// Layer and data-type, for all non-reference variants
    pub fn layerspec(&self) -> Option<GdsLayerSpec> {
        use GdsElement::*;
        match self {
            GdsBoundary(e) => Some(e.layerspec()),
            GdsPath(e) => Some(e.layerspec()),
            GdsTextElem(e) => Some(e.layerspec()),
            GdsNode(e) => Some(e.layerspec()),
            GdsBox(e) => Some(e.layerspec()),
            GdsCircle(e) => Some(e.layerspec()),
            GdsStructRef(_) | GdsArrayRef(_) => None,
        }
    }
}

/// # Gds Summary Stats
///
/// Summary statistics for a [GdsLibrary] or [GdsStruct].
/// Total numbers of elements of each type.
#[derive(
    Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Add, AddAssign, Sub, SubAssign,
)]
pub struct GdsStats {
    pub libraries: usize,
    pub structs: usize,
    pub boundaries: usize,
    pub paths: usize,
    pub struct_refs: usize,
    pub array_refs: usize,
    pub text_elems: usize,
    pub nodes: usize,
    pub boxes: usize,
    pub circles: usize,
}

/// # Gds Date & Time
///
/// Two bytes each for year, month, day, hour, minute, and second,
/// stored exactly as they appear in `BGNLIB` and `BGNSTR` records.
/// No validation for real dates & times, e.g. month 30 or hour 99, is performed.
///
/// Writers disagree on the year: some store years since **1900**, others the full calendar year.
/// [GdsDateTime]s created from [chrono] values store years since 1900,
/// and [GdsDateTime::to_naive] accepts either.
///
/// The default [GdsDateTime] is the current time, as produced by [`chrono::Utc::now()`].
///
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsDateTime {
    pub year: i16,
    pub month: i16,
    pub day: i16,
    pub hour: i16,
    pub minute: i16,
    pub second: i16,
}
impl From<NaiveDateTime> for GdsDateTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self {
            year: (dt.year() - 1900) as i16,
            month: dt.month() as i16,
            day: dt.day() as i16,
            hour: dt.hour() as i16,
            minute: dt.minute() as i16,
            second: dt.second() as i16,
        }
    }
}
impl From<[i16; 6]> for GdsDateTime {
    /// Convert from a 6-element array, in on-disk order
    fn from(d: [i16; 6]) -> Self {
        Self {
            year: d[0],
            month: d[1],
            day: d[2],
            hour: d[3],
            minute: d[4],
            second: d[5],
        }
    }
}
impl GdsDateTime {
    /// Get the current time, rounded to the second
    pub fn now() -> Self {
        Utc::now().naive_utc().round_subsecs(0).into()
    }
    /// Try converting to a [`chrono::NaiveDateTime`].
    /// Fails if any of the values are invalid, e.g. "month 30" or "hour 99".
    pub fn to_naive(&self) -> GdsResult<NaiveDateTime> {
        let year = if self.year < 1900 {
            self.year as i32 + 1900
        } else {
            self.year as i32
        };
        let ymd = NaiveDate::from_ymd_opt(year, self.month as u32, self.day as u32)
            .ok_or_else(|| GdsError::Str(format!("Invalid Date {:?}", self)))?;
        ymd.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
            .ok_or_else(|| GdsError::Str(format!("Invalid Time {:?}", self)))
    }
    /// Encode in on-disk order
    pub fn encode(&self) -> [i16; 6] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }
}
impl Default for GdsDateTime {
    /// Default dates & times: what better time than now!
    fn default() -> Self {
        Self::now()
    }
}

/// # Gds Modification & Access Dates & Times
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsDateTimes {
    /// Last Modification Date & Time
    pub modified: GdsDateTime,
    /// Last Access Date & Time
    pub accessed: GdsDateTime,
}
impl GdsDateTimes {
    /// Decode from the twelve integers of a `BGNLIB` or `BGNSTR` record
    pub fn decode(d: &[i16; 12]) -> Self {
        let (m, a) = d.split_at(6);
        let mut modified = [0; 6];
        let mut accessed = [0; 6];
        modified.copy_from_slice(m);
        accessed.copy_from_slice(a);
        Self {
            modified: modified.into(),
            accessed: accessed.into(),
        }
    }
    /// Encode to the twelve integers of a `BGNLIB` or `BGNSTR` record
    pub fn encode(&self) -> [i16; 12] {
        let mut rv = [0; 12];
        rv[..6].copy_from_slice(&self.modified.encode());
        rv[6..].copy_from_slice(&self.accessed.encode());
        rv
    }
}
impl Default for GdsDateTimes {
    /// Default dates & times: what better time than now!
    /// Note this makes a *single* call to `Utc::now()`, so the two dates will be the same.
    fn default() -> Self {
        let now = GdsDateTime::now();
        Self {
            modified: now.clone(),
            accessed: now,
        }
    }
}

///
/// # Gds Struct (Cell) Definition
///
/// GDSII's primary hierarchical layout-definition object is its "struct",
/// which most other layout systems would call a "cell" or "module".
///
/// [GdsStruct]s are principally composed of an ordered vector of [GdsElement]s.
/// Order is significant: later elements draw atop earlier ones.
///
/// ```text
/// BGNSTR STRNAME [STRCLASS] {<element>}* ENDSTR
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsStruct {
    /// Struct Name
    pub name: String,
    /// Uninterpreted `STRCLASS` flags, retained for writing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub strclass: Option<(u8, u8)>,
    /// Elements List
    #[builder(default)]
    pub elems: Vec<GdsElement>,
    /// Modification & Access Dates & Times
    pub dates: GdsDateTimes,
}
impl GdsStruct {
    /// Create a new and empty [GdsStruct]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Count and return our element statistics
    fn stats(&self) -> GdsStats {
        let mut stats = GdsStats::default();
        stats.structs += 1;
        for elem in &self.elems {
            use GdsElement::*;
            match elem {
                GdsBoundary(_) => stats.boundaries += 1,
                GdsPath(_) => stats.paths += 1,
                GdsStructRef(_) => stats.struct_refs += 1,
                GdsArrayRef(_) => stats.array_refs += 1,
                GdsTextElem(_) => stats.text_elems += 1,
                GdsNode(_) => stats.nodes += 1,
                GdsBox(_) => stats.boxes += 1,
                GdsCircle(_) => stats.circles += 1,
            };
        }
        stats
    }
}

///
/// # Gds Library
///
/// The Library is GDSII's primary idiom for a suite of layout-cells.
/// A Library generally corresponds one-to-one with a `.gds` file.
/// Libraries consist primarily of cell-definitions ([GdsStruct]s),
/// and secondarily include library-level meta-data, including the distance units, GDS-spec version, and modification dates.
///
/// Struct names are unique, and `structs` keeps the order in which they were read or added.
///
/// Fields are declared with plain values ahead of tables, as TOML requires.
/// TOML has no form for [GdsElement]s or `meta` records, so only element-free libraries convert to it.
///
/// Several more esoteric library-level records (`LIBDIRSIZE`, `SRFNAME`, `LIBSECUR`,
/// `REFLIBS`, `FONTS`, `ATTRTABLE`, `GENERATIONS`, and the `FORMAT` group)
/// are not interpreted, but are kept in `meta` and written back in place.
///
/// ```text
/// HEADER BGNLIB [LIBDIRSIZE] [SRFNAME] [LIBSECUR] LIBNAME [REFLIBS] [FONTS] [ATTRTABLE] [GENERATIONS] [<FormatType>]
/// UNITS {<structure>}* ENDLIB
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsLibrary {
    // Required fields
    /// Library Name
    pub name: String,
    /// Gds Spec Version
    #[builder(default)]
    pub version: GdsVersion,
    /// Spatial Units
    #[builder(default)]
    pub units: GdsUnits,
    /// Struct Definitions
    #[builder(default)]
    pub structs: Vec<GdsStruct>,
    /// Modification & Access Dates & Times
    #[builder(default)]
    pub dates: GdsDateTimes,

    /// Uninterpreted library-level records
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub meta: Vec<GdsRecord>,
}
impl GdsLibrary {
    /// Create a new and empty [GdsLibrary]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Read a [GdsLibrary] from file at path `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<GdsLibrary> {
        let file = std::fs::File::open(fname)?;
        Self::read(BufReader::new(file))
    }
    /// Read a [GdsLibrary] from byte-vector `bytes`
    pub fn from_bytes(bytes: &[u8]) -> GdsResult<GdsLibrary> {
        Self::read(bytes)
    }
    /// Read a [GdsLibrary] from `src`, with default [GdsReadOptions].
    /// Diagnostics are logged, and otherwise discarded.
    pub fn read(src: impl Read) -> GdsResult<GdsLibrary> {
        let (lib, _) = Self::read_with_options(src, &GdsReadOptions::default())?;
        Ok(lib)
    }
    /// Read a [GdsLibrary] from `src`, returning it alongside all collected [GdsDiagnostic]s
    pub fn read_with_options(
        src: impl Read,
        opts: &GdsReadOptions,
    ) -> GdsResult<(GdsLibrary, Vec<GdsDiagnostic>)> {
        let mut parser = GdsParser::new(src, opts.clone());
        let lib = parser.parse_lib()?;
        Ok((lib, parser.into_diagnostics()))
    }
    /// Collect and return the library's aggregate statistics
    /// (numbers of structs, elements by type)
    pub fn stats(&self) -> GdsStats {
        let mut stats = GdsStats::default();
        stats.libraries += 1;
        for strukt in self.structs.iter() {
            stats += strukt.stats();
        }
        stats
    }
    /// Save to file `fname`
    pub fn save(&self, fname: impl AsRef<Path>) -> GdsResult<()> {
        let mut wr = GdsWriter::open(fname)?;
        wr.write_lib(self)?;
        wr.flush()
    }
    /// Write to destination `dest`
    pub fn write(&self, dest: impl Write) -> GdsResult<()> {
        let mut wr = GdsWriter::new(dest);
        wr.write_lib(self)?;
        wr.flush()
    }
    /// Encode to a byte-vector
    pub fn to_bytes(&self) -> GdsResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }
    /// Get a reference to the struct named `name`, if present
    pub fn struct_by_name(&self, name: &str) -> Option<&GdsStruct> {
        self.structs.iter().find(|s| s.name == name)
    }
    /// Get a mutable reference to the struct named `name`, if present
    pub fn struct_by_name_mut(&mut self, name: &str) -> Option<&mut GdsStruct> {
        self.structs.iter_mut().find(|s| s.name == name)
    }
    /// Add struct `strukt`. Fails if a struct of the same name is already present.
    pub fn add_struct(&mut self, strukt: GdsStruct) -> GdsResult<&mut GdsStruct> {
        if self.struct_by_name(&strukt.name).is_some() {
            return Err(GdsError::DuplicateStruct(strukt.name));
        }
        self.structs.push(strukt);
        let idx = self.structs.len() - 1;
        Ok(&mut self.structs[idx])
    }
    /// Index of all structs by name
    pub(crate) fn index(&self) -> HashMap<&str, &GdsStruct> {
        self.structs.iter().map(|s| (s.name.as_str(), s)).collect()
    }
    /// Sorted set of all layer numbers used by any element
    pub fn layers(&self) -> BTreeSet<i16> {
        self.structs
            .iter()
            .flat_map(|s| s.elems.iter())
            .filter_map(|e| e.layerspec())
            .map(|spec| spec.layer)
            .collect()
    }
    /// Structs which no other struct references, in library order
    pub fn top_structs(&self) -> Vec<&GdsStruct> {
        let referenced: HashSet<&str> = self
            .structs
            .iter()
            .flat_map(|s| s.elems.iter())
            .filter_map(|e| e.ref_name())
            .collect();
        self.structs
            .iter()
            .filter(|s| !referenced.contains(s.name.as_str()))
            .collect()
    }
    /// Flatten the struct named `name` into absolutely-positioned primitives
    pub fn flatten(&self, name: &str) -> GdsFlattener<'_> {
        GdsFlattener::new(self, vec![name.to_string()])
    }
    /// Flatten each struct in `names`, in order
    pub fn flatten_all<S: Into<String>>(
        &self,
        names: impl IntoIterator<Item = S>,
    ) -> GdsFlattener<'_> {
        GdsFlattener::new(self, names.into_iter().map(Into::into).collect())
    }
    /// Flatten each of our [GdsLibrary::top_structs]
    pub fn flatten_top(&self) -> GdsFlattener<'_> {
        let names = self.top_structs().iter().map(|s| s.name.clone()).collect();
        GdsFlattener::new(self, names)
    }
    /// Check all struct-names are unique, and all elements valid
    pub fn validate(&self) -> GdsResult<()> {
        let mut names = HashSet::with_capacity(self.structs.len());
        for strukt in self.structs.iter() {
            if !names.insert(strukt.name.as_str()) {
                return Err(GdsError::DuplicateStruct(strukt.name.clone()));
            }
            for elem in strukt.elems.iter() {
                elem.validate()?;
            }
        }
        Ok(())
    }
    /// Set the library and all its structs' modification and access times
    pub fn set_all_dates(&mut self, time: impl Into<GdsDateTime>) {
        let time: GdsDateTime = time.into();
        let forced_gds_date = GdsDateTimes {
            modified: time.clone(),
            accessed: time,
        };
        self.dates = forced_gds_date.clone();
        for gds_struct in &mut self.structs {
            gds_struct.dates = forced_gds_date.clone();
        }
    }
    /// Split our `meta` records into those written before and after `LIBNAME`
    pub(crate) fn meta_split(&self) -> (Vec<&GdsRecord>, Vec<&GdsRecord>) {
        self.meta.iter().partition(|r| {
            matches!(
                r.record_type(),
                GdsRecordType::LibDirSize | GdsRecordType::SrfName | GdsRecordType::LibSecur
            )
        })
    }
}
// Enable [GdsLibrary] and [GdsStruct] serialization to file, in each of the [SerializationFormat]s.
impl SerdeFile for GdsLibrary {}
impl SerdeFile for GdsStruct {}

/// # Gds Layer Spec
///
/// Each GDSII element's layer is specified by a set of two numbers,
/// commonly referred to as `layer` and `datatype`.
/// Several element-types refer to their analog of `datatype` by different names,
/// e.g. `texttype` and `nodetype`.
///
/// `GdsLayerSpecs` generalize across these via the `xtype` field,
/// which holds whichever is appropriate for the given element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GdsLayerSpec {
    /// Layer ID Number
    pub layer: i16,
    /// DataType (or TextType, NodeType, etc.) ID Number
    pub xtype: i16,
}
/// # Has-Layer Trait
/// Sole function `layerspec` returns a [GdsLayerSpec] including the two numbers `layer` and `xtype`.
pub trait HasLayer {
    fn layerspec(&self) -> GdsLayerSpec;
}
impl GdsLayerSpec {
    /// Create a new [GdsLayerSpec]
    pub fn new(layer: i16, xtype: i16) -> GdsLayerSpec {
        GdsLayerSpec { layer, xtype }
    }
}
impl HasLayer for GdsBoundary {
    fn layerspec(&self) -> GdsLayerSpec {
        GdsLayerSpec::new(self.layer, self.datatype)
    }
}
impl HasLayer for GdsTextElem {
    fn layerspec(&self) -> GdsLayerSpec {
        GdsLayerSpec::new(self.layer, self.texttype)
    }
}
impl HasLayer for GdsNode {
    fn layerspec(&self) -> GdsLayerSpec {
        GdsLayerSpec::new(self.layer, self.nodetype)
    }
}
impl HasLayer for GdsBox {
    fn layerspec(&self) -> GdsLayerSpec {
        GdsLayerSpec::new(self.layer, self.boxtype)
    }
}
impl HasLayer for GdsPath {
    fn layerspec(&self) -> GdsLayerSpec {
        GdsLayerSpec::new(self.layer, self.datatype)
    }
}
impl HasLayer for GdsCircle {
    fn layerspec(&self) -> GdsLayerSpec {
        GdsLayerSpec::new(self.layer, self.datatype)
    }
}

/// Our helper for "do not serialize default `false` boolean values".
/// This is a function primarily because those are what `#[serde(skip_serializing_if)]` understands.
fn is_false(b: &bool) -> bool {
    !b
}

#[cfg(any(test, feature = "selftest"))]
/// Check `lib` matches across a write-read round-trip cycle
pub fn roundtrip(lib: &GdsLibrary) -> GdsResult<()> {
    use std::io::{Seek, SeekFrom};
    use tempfile::tempfile;

    // Write to a temporary file
    let mut file = tempfile()?;
    lib.write(&mut file)?;

    // Rewind to the file-start, and read it back
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let lib2 = GdsLibrary::from_bytes(&bytes)?;

    // And check the two line up
    assert_eq!(*lib, lib2);
    Ok(())
}
