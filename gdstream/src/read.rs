//!
//! # Gdstream Reading
//!
//! The [GdsCursor] frames records off a byte-stream, with one record of lookahead.
//! The [GdsParser] walks those records through the GDSII grammar into a [GdsLibrary].
//!

// Std-Lib Imports
use std::collections::HashSet;
use std::io::{self, Read};

// Crates.io
use byteorder::{BigEndian, ByteOrder};
use derive_builder::Builder;
use log::{debug, trace, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::data::*;
use crate::error::{GdsContext, GdsDiagnostic, GdsError, GdsResult};
use crate::records::{GdsDataType, GdsRawRecord, GdsRecord, GdsRecordType};
use crate::ser::SerdeFile;

/// # Gds Read Options
#[derive(Debug, Default, Clone, Builder, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[builder(pattern = "owned", setter(into), default)]
pub struct GdsReadOptions {
    /// Fail on the first [GdsDiagnostic], rather than collecting it
    #[serde(default)]
    pub strict: bool,
    /// Maximum number of [GdsDiagnostic]s to collect. Further ones are logged, but dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option))]
    pub max_diagnostics: Option<usize>,
}
impl SerdeFile for GdsReadOptions {}

///
/// # Gds Record Cursor
///
/// Frames [GdsRawRecord]s off any [Read] source, one per call to [GdsCursor::next].
/// The most recently returned record can be pushed back, once, via [GdsCursor::revert].
/// Reverting replays the cached record rather than seeking, so non-seekable sources work too.
///
/// Data-type checks run once per frame, when it is first read.
///
pub struct GdsCursor<R: Read> {
    /// Byte source
    src: R,
    /// Number of bytes consumed from `src`
    offset: u64,
    /// Most recently read record
    current: Option<GdsRawRecord>,
    /// Whether `current` has been reverted, and is to be returned by the next `next`
    replay: bool,
    /// Options, chiefly for diagnostic handling
    opts: GdsReadOptions,
    /// Collected diagnostics
    diagnostics: Vec<GdsDiagnostic>,
}
impl<R: Read> GdsCursor<R> {
    /// Create a new [GdsCursor] over `src`, with default [GdsReadOptions]
    pub fn new(src: R) -> Self {
        Self::with_options(src, GdsReadOptions::default())
    }
    /// Create a new [GdsCursor] over `src`
    pub fn with_options(src: R, opts: GdsReadOptions) -> Self {
        Self {
            src,
            offset: 0,
            current: None,
            replay: false,
            opts,
            diagnostics: Vec::new(),
        }
    }
    /// Get the next record, or `None` at a clean end-of-stream.
    /// Returns the reverted record, if there is one.
    pub fn next(&mut self) -> GdsResult<Option<&GdsRawRecord>> {
        if self.replay {
            self.replay = false;
            return Ok(self.current.as_ref());
        }
        let rec = self.read_frame()?;
        if let Some(ref rec) = rec {
            if let Some(diag) = check_datatype(rec) {
                self.diagnose(diag)?;
            }
        }
        self.current = rec;
        Ok(self.current.as_ref())
    }
    /// Push back the most recently returned record, so that the next call to [GdsCursor::next] returns it again.
    ///
    /// # Panics
    /// If no record has been read, or if the last one has already been reverted.
    pub fn revert(&mut self) {
        assert!(
            self.current.is_some() && !self.replay,
            "GdsCursor::revert requires a newly read record"
        );
        self.replay = true;
    }
    /// Look at the next record without consuming it
    pub fn peek(&mut self) -> GdsResult<Option<&GdsRawRecord>> {
        if self.next()?.is_some() {
            self.revert();
        }
        Ok(self.current.as_ref())
    }
    /// The most recently read record, if any
    pub fn current(&self) -> Option<&GdsRawRecord> {
        self.current.as_ref()
    }
    /// Byte offset of the next record to be returned
    pub fn offset(&self) -> u64 {
        match (self.replay, &self.current) {
            (true, Some(rec)) => rec.offset,
            _ => self.offset,
        }
    }
    /// Record diagnostic `diag`.
    /// Fails instead in strict mode.
    pub fn diagnose(&mut self, diag: GdsDiagnostic) -> GdsResult<()> {
        warn!("{}", diag);
        if self.opts.strict {
            return Err(diag.into());
        }
        if let Some(max) = self.opts.max_diagnostics {
            if self.diagnostics.len() >= max {
                return Ok(());
            }
        }
        self.diagnostics.push(diag);
        Ok(())
    }
    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &[GdsDiagnostic] {
        &self.diagnostics
    }
    /// Consume ourselves, returning our collected diagnostics
    pub fn into_diagnostics(self) -> Vec<GdsDiagnostic> {
        self.diagnostics
    }
    /// Read one frame from `src`
    fn read_frame(&mut self) -> GdsResult<Option<GdsRawRecord>> {
        let offset = self.offset;
        let mut header = [0u8; 4];
        let n = fill(&mut self.src, &mut header)?;
        if n == 0 {
            return Ok(None);
        }
        if n < header.len() {
            return Err(GdsError::UnexpectedEof {
                offset: offset + n as u64,
            });
        }
        // The 16-bit record-size, in bytes, includes the four header bytes
        let len = BigEndian::read_u16(&header[0..2]) as usize;
        if len < 4 || len % 2 != 0 {
            return Err(GdsError::RecordLen(len));
        }
        let tag = header[2];
        let rtype = GdsRecordType::from_tag(tag)
            .ok_or(GdsError::UnknownRecordType { tag, offset })?;
        let dtype = GdsDataType::from(header[3]);

        let mut data = vec![0u8; len - 4];
        let n = fill(&mut self.src, &mut data)?;
        if n < data.len() {
            return Err(GdsError::UnexpectedEof {
                offset: offset + 4 + n as u64,
            });
        }
        self.offset += len as u64;
        trace!("{:?} ({:?}, {} bytes) at byte {}", rtype, dtype, len, offset);
        Ok(Some(GdsRawRecord {
            rtype,
            dtype,
            data,
            offset,
        }))
    }
}

/// Read into `buf` until it is full or `src` is exhausted.
/// Returns the number of bytes read.
fn fill(src: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match src.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}

/// Compare the data-type tag of `rec` against its record-type's declaration
fn check_datatype(rec: &GdsRawRecord) -> Option<GdsDiagnostic> {
    let expected = rec.rtype.datatype();
    match rec.dtype {
        GdsDataType::Other(tag) => Some(GdsDiagnostic::UnknownDatatypeTag {
            rtype: rec.rtype,
            tag,
            offset: rec.offset,
        }),
        actual if actual != expected => Some(GdsDiagnostic::DatatypeMismatch {
            rtype: rec.rtype,
            expected,
            actual,
            offset: rec.offset,
        }),
        _ => None,
    }
}

/// Record types which open each [GdsElement]
const ELEMENT_STARTS: [GdsRecordType; 8] = [
    GdsRecordType::Boundary,
    GdsRecordType::Path,
    GdsRecordType::StructRef,
    GdsRecordType::ArrayRef,
    GdsRecordType::Text,
    GdsRecordType::Node,
    GdsRecordType::Box,
    GdsRecordType::RaithCircle,
];

///
/// # Gds Parser
///
/// Reads a [GdsLibrary] from a [GdsCursor], one grammar production at a time.
/// Each required record must appear exactly where the grammar places it;
/// optional records are checked for with a single record of lookahead.
///
pub struct GdsParser<R: Read> {
    /// Record source
    cursor: GdsCursor<R>,
    /// Context Stack
    ctx_stack: Vec<GdsContext>,
}
impl<R: Read> GdsParser<R> {
    /// Create a new [GdsParser] reading from `src`
    pub fn new(src: R, opts: GdsReadOptions) -> Self {
        Self {
            cursor: GdsCursor::with_options(src, opts),
            ctx_stack: Vec::new(),
        }
    }
    /// Consume ourselves, returning our collected diagnostics
    pub fn into_diagnostics(self) -> Vec<GdsDiagnostic> {
        self.cursor.into_diagnostics()
    }
    /// Parse a [GdsLibrary]. Generally the start-state when reading a GDS file.
    pub fn parse_lib(&mut self) -> GdsResult<GdsLibrary> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Library);

        let version = GdsVersion::try_from(self.expect(R::Header)?.i16()?)?;
        let dates = self.parse_dates(R::BgnLib)?;
        let mut meta = Vec::new();
        for rtype in [R::LibDirSize, R::SrfName, R::LibSecur] {
            self.skip_meta(rtype, &mut meta)?;
        }
        let name = self.expect(R::LibName)?.string()?;
        debug!("Reading library {} ({:?})", name, version);
        for rtype in [R::RefLibs, R::Fonts, R::AttrTable, R::Generations] {
            self.skip_meta(rtype, &mut meta)?;
        }
        // Format type: either a lone FORMAT, or a filtered FORMAT with its MASKs
        if self.skip_meta(R::Format, &mut meta)? && self.skip_meta(R::Mask, &mut meta)? {
            while self.skip_meta(R::Mask, &mut meta)? {}
            let rec = self.expect(R::EndMasks)?;
            let (record, rtype, offset) = (GdsRecord::decode(rec)?, rec.rtype, rec.offset);
            self.cursor
                .diagnose(GdsDiagnostic::UnsupportedRecordSkipped { rtype, offset })?;
            meta.push(record);
        }
        let units = {
            let rec = self.expect(R::Units)?;
            match rec.f64s()?.as_slice() {
                [d0, d1] => GdsUnits(*d0, *d1),
                _ => return Err(rec.decode_err()),
            }
        };

        let mut structs = Vec::new();
        let mut names = HashSet::new();
        loop {
            let (rtype, offset) = self.next_type()?;
            match rtype {
                R::EndLib => break,
                R::BgnStruct => {
                    self.cursor.revert();
                    let strukt = self.parse_struct()?;
                    if !names.insert(strukt.name.clone()) {
                        return Err(GdsError::DuplicateStruct(strukt.name));
                    }
                    structs.push(strukt);
                }
                _ => return self.missing(&[R::BgnStruct, R::EndLib], rtype, offset),
            }
        }
        self.ctx_stack.pop();
        debug!("Read library {} with {} structs", name, structs.len());
        Ok(GdsLibrary {
            name,
            version,
            dates,
            units,
            structs,
            meta,
        })
    }
    /// Parse a cell ([GdsStruct])
    fn parse_struct(&mut self) -> GdsResult<GdsStruct> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Struct);
        let dates = self.parse_dates(R::BgnStruct)?;
        let name = self.expect(R::StructName)?.string()?;
        debug!("Reading struct {}", name);
        let strclass = match self.optional(R::StrClass)? {
            Some(rec) => {
                let (bits, rtype, offset) = (rec.bits()?, rec.rtype, rec.offset);
                self.cursor
                    .diagnose(GdsDiagnostic::UnsupportedRecordSkipped { rtype, offset })?;
                Some(bits)
            }
            None => None,
        };

        // Parse [GdsElement]s until hitting ENDSTR
        let mut elems = Vec::new();
        loop {
            let (rtype, offset) = self.next_type()?;
            let elem: GdsElement = match rtype {
                R::EndStruct => break,
                R::Boundary => self.parse_boundary()?.into(),
                R::Path => self.parse_path()?.into(),
                R::StructRef => self.parse_struct_ref()?.into(),
                R::ArrayRef => self.parse_array_ref()?.into(),
                R::Text => self.parse_text_elem()?.into(),
                R::Node => self.parse_node()?.into(),
                R::Box => self.parse_box()?.into(),
                R::RaithCircle => self.parse_circle()?.into(),
                _ => {
                    let mut expected = vec![R::EndStruct];
                    expected.extend_from_slice(&ELEMENT_STARTS);
                    return self.missing(&expected, rtype, offset);
                }
            };
            elems.push(elem);
        }
        self.ctx_stack.pop();
        Ok(GdsStruct {
            name,
            dates,
            elems,
            strclass,
        })
    }
    /// Parse a [GdsBoundary]. Its opening record has already been read.
    fn parse_boundary(&mut self) -> GdsResult<GdsBoundary> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Boundary);
        let (elflags, plex) = self.parse_flags_plex()?;
        let layer = self.expect(R::Layer)?.i16()?;
        let datatype = self.expect(R::DataType)?.i16()?;
        let xy = self.parse_xy()?;
        let properties = self.parse_properties()?;
        let b = GdsBoundary {
            layer,
            datatype,
            xy,
            elflags,
            plex,
            properties,
        };
        b.validate()?;
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsPath]
    fn parse_path(&mut self) -> GdsResult<GdsPath> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Path);
        let (elflags, plex) = self.parse_flags_plex()?;
        let layer = self.expect(R::Layer)?.i16()?;
        let datatype = self.expect(R::DataType)?.i16()?;
        let path_type = self.optional_i16(R::PathType)?.map(GdsPathType::from);
        let width = self.optional_i32(R::Width)?;
        let begin_extn = self.optional_i32(R::BeginExtn)?;
        let end_extn = self.optional_i32(R::EndExtn)?;
        let xy = self.parse_xy()?;
        let properties = self.parse_properties()?;
        let p = GdsPath {
            layer,
            datatype,
            xy,
            width,
            path_type,
            begin_extn,
            end_extn,
            elflags,
            plex,
            properties,
        };
        p.validate()?;
        self.ctx_stack.pop();
        Ok(p)
    }
    /// Parse a [GdsStructRef]
    fn parse_struct_ref(&mut self) -> GdsResult<GdsStructRef> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::StructRef);
        let (elflags, plex) = self.parse_flags_plex()?;
        let name = self.expect(R::StructRefName)?.string()?;
        let strans = self.parse_strans()?;
        let [xy] = self.parse_xy_array("StructRef")?;
        let properties = self.parse_properties()?;
        let s = GdsStructRef {
            name,
            xy,
            strans,
            elflags,
            plex,
            properties,
        };
        s.validate()?;
        self.ctx_stack.pop();
        Ok(s)
    }
    /// Parse a [GdsArrayRef]
    fn parse_array_ref(&mut self) -> GdsResult<GdsArrayRef> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::ArrayRef);
        let (elflags, plex) = self.parse_flags_plex()?;
        let name = self.expect(R::StructRefName)?.string()?;
        let strans = self.parse_strans()?;
        let [cols, rows] = self.expect(R::ColRow)?.i16_array()?;
        let xy = self.parse_xy_array("ArrayRef")?;
        let properties = self.parse_properties()?;
        let a = GdsArrayRef {
            name,
            xy,
            cols,
            rows,
            strans,
            elflags,
            plex,
            properties,
        };
        a.validate()?;
        self.ctx_stack.pop();
        Ok(a)
    }
    /// Parse a [GdsTextElem]
    fn parse_text_elem(&mut self) -> GdsResult<GdsTextElem> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Text);
        let (elflags, plex) = self.parse_flags_plex()?;
        let layer = self.expect(R::Layer)?.i16()?;
        let texttype = self.expect(R::TextType)?.i16()?;
        let presentation = self
            .optional(R::Presentation)?
            .map(|rec| rec.bits())
            .transpose()?
            .map(|(d0, d1)| GdsPresentation(d0, d1));
        let path_type = self.optional_i16(R::PathType)?.map(GdsPathType::from);
        let width = self.optional_i32(R::Width)?;
        let strans = self.parse_strans()?;
        let [xy] = self.parse_xy_array("Text")?;
        let string = self.expect(R::String)?.string()?;
        let properties = self.parse_properties()?;
        let t = GdsTextElem {
            string,
            layer,
            texttype,
            xy,
            presentation,
            path_type,
            width,
            strans,
            elflags,
            plex,
            properties,
        };
        t.validate()?;
        self.ctx_stack.pop();
        Ok(t)
    }
    /// Parse a [GdsNode]
    fn parse_node(&mut self) -> GdsResult<GdsNode> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Node);
        let (elflags, plex) = self.parse_flags_plex()?;
        let layer = self.expect(R::Layer)?.i16()?;
        let nodetype = self.expect(R::Nodetype)?.i16()?;
        let xy = self.parse_xy()?;
        let properties = self.parse_properties()?;
        let n = GdsNode {
            layer,
            nodetype,
            xy,
            elflags,
            plex,
            properties,
        };
        n.validate()?;
        self.ctx_stack.pop();
        Ok(n)
    }
    /// Parse a [GdsBox]
    fn parse_box(&mut self) -> GdsResult<GdsBox> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Box);
        let (elflags, plex) = self.parse_flags_plex()?;
        let layer = self.expect(R::Layer)?.i16()?;
        let boxtype = self.expect(R::BoxType)?.i16()?;
        let xy = self.parse_xy_array("Box")?;
        let properties = self.parse_properties()?;
        let b = GdsBox {
            layer,
            boxtype,
            xy,
            elflags,
            plex,
            properties,
        };
        b.validate()?;
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsCircle]. Circles have no leading flags or plex.
    fn parse_circle(&mut self) -> GdsResult<GdsCircle> {
        use GdsRecordType as R;
        self.ctx_stack.push(GdsContext::Circle);
        let layer = self.expect(R::Layer)?.i16()?;
        let datatype = self.expect(R::DataType)?.i16()?;
        let width = self.optional_i32(R::Width)?;
        let [center, radii, arc, flags] = self.parse_xy_array("Circle")?;
        let properties = self.parse_properties()?;
        let c = GdsCircle {
            layer,
            datatype,
            center,
            radii,
            arc,
            flags: GdsCircleFlags(flags.x, flags.y),
            width,
            properties,
        };
        c.validate()?;
        self.ctx_stack.pop();
        Ok(c)
    }
    /// Parse the optional leading `ELFLAGS` and `PLEX` records common to most elements
    fn parse_flags_plex(&mut self) -> GdsResult<(Option<GdsElemFlags>, Option<GdsPlex>)> {
        let elflags = self
            .optional(GdsRecordType::ElemFlags)?
            .map(|rec| rec.bits())
            .transpose()?
            .map(|(d0, d1)| GdsElemFlags(d0, d1));
        let plex = self.optional_i32(GdsRecordType::Plex)?.map(GdsPlex);
        Ok((elflags, plex))
    }
    /// Parse an optional [GdsStrans] group: `STRANS [MAG] [ANGLE]`
    fn parse_strans(&mut self) -> GdsResult<Option<GdsStrans>> {
        let (d0, d1) = match self.optional(GdsRecordType::Strans)? {
            Some(rec) => rec.bits()?,
            None => return Ok(None),
        };
        self.ctx_stack.push(GdsContext::Strans);
        let mut s = GdsStrans::from_bits(d0, d1);
        s.mag = self
            .optional(GdsRecordType::Mag)?
            .map(|rec| rec.f64())
            .transpose()?;
        s.angle = self
            .optional(GdsRecordType::Angle)?
            .map(|rec| rec.f64())
            .transpose()?;
        self.ctx_stack.pop();
        Ok(Some(s))
    }
    /// Parse `{PROPATTR PROPVALUE}* ENDEL`, the tail of every element
    fn parse_properties(&mut self) -> GdsResult<Vec<GdsProperty>> {
        use GdsRecordType as R;
        let mut props = Vec::new();
        while let Some(attr) = self.optional_i16(R::PropAttr)? {
            // `PROPATTR` records must *immediately* be followed by `PROPVALUE`
            self.ctx_stack.push(GdsContext::Property);
            let value = self.expect(R::PropValue)?.string()?;
            self.ctx_stack.pop();
            props.push(GdsProperty { attr, value });
        }
        let (rtype, offset) = self.next_type()?;
        if rtype != R::EndElement {
            return self.missing(&[R::PropAttr, R::EndElement], rtype, offset);
        }
        Ok(props)
    }
    /// Parse an `XY` record into a vector of points
    fn parse_xy(&mut self) -> GdsResult<Vec<GdsPoint>> {
        let rec = self.expect(GdsRecordType::Xy)?;
        GdsPoint::parse_vec(&rec.i32s()?).ok_or_else(|| rec.decode_err())
    }
    /// Parse an `XY` record of exactly `N` points
    fn parse_xy_array<const N: usize>(
        &mut self,
        elem: &'static str,
    ) -> GdsResult<[GdsPoint; N]> {
        let v = self.parse_xy()?;
        let len = v.len();
        v.try_into()
            .map_err(|_| GdsError::geometry(elem, format!("{} points, {} required", len, N)))
    }
    /// Parse the twelve date-integers of a `BGNLIB` or `BGNSTR` record
    fn parse_dates(&mut self, rtype: GdsRecordType) -> GdsResult<GdsDateTimes> {
        let d = self.expect(rtype)?.i16_array::<12>()?;
        Ok(GdsDateTimes::decode(&d))
    }
    /// Retain an optional library-level record of type `rtype` in `meta`, if present.
    /// Returns whether it was.
    fn skip_meta(&mut self, rtype: GdsRecordType, meta: &mut Vec<GdsRecord>) -> GdsResult<bool> {
        let (record, offset) = match self.optional(rtype)? {
            Some(rec) => (GdsRecord::decode(rec)?, rec.offset),
            None => return Ok(false),
        };
        self.cursor
            .diagnose(GdsDiagnostic::UnsupportedRecordSkipped { rtype, offset })?;
        meta.push(record);
        Ok(true)
    }
    /// Get the next record, which must exist
    fn next(&mut self) -> GdsResult<&GdsRawRecord> {
        let offset = self.cursor.offset();
        self.cursor
            .next()?
            .ok_or(GdsError::UnexpectedEof { offset })
    }
    /// Get the type and offset of the next record, which must exist
    fn next_type(&mut self) -> GdsResult<(GdsRecordType, u64)> {
        let rec = self.next()?;
        Ok((rec.rtype, rec.offset))
    }
    /// Expect / require the next record to be of type `rtype`
    fn expect(&mut self, rtype: GdsRecordType) -> GdsResult<&GdsRawRecord> {
        let offset = self.cursor.offset();
        let rec = match self.cursor.next()? {
            Some(rec) => rec,
            None => return Err(GdsError::UnexpectedEof { offset }),
        };
        if rec.rtype != rtype {
            return Err(GdsError::UnexpectedRecord {
                expected: rtype,
                actual: rec.rtype,
                offset: rec.offset,
                ctx: self.ctx_stack.clone(),
            });
        }
        Ok(rec)
    }
    /// Get the next record if it is of type `rtype`.
    /// Otherwise leave it in place, and return `None`.
    fn optional(&mut self, rtype: GdsRecordType) -> GdsResult<Option<&GdsRawRecord>> {
        let offset = self.cursor.offset();
        let hit = match self.cursor.next()? {
            Some(rec) => rec.rtype == rtype,
            None => return Err(GdsError::UnexpectedEof { offset }),
        };
        if !hit {
            self.cursor.revert();
            return Ok(None);
        }
        Ok(self.cursor.current())
    }
    fn optional_i16(&mut self, rtype: GdsRecordType) -> GdsResult<Option<i16>> {
        self.optional(rtype)?.map(|rec| rec.i16()).transpose()
    }
    fn optional_i32(&mut self, rtype: GdsRecordType) -> GdsResult<Option<i32>> {
        self.optional(rtype)?.map(|rec| rec.i32()).transpose()
    }
    /// Error helper for a record matching none of `expected`
    fn missing<T>(
        &self,
        expected: &[GdsRecordType],
        actual: GdsRecordType,
        offset: u64,
    ) -> GdsResult<T> {
        Err(GdsError::MissingRecord {
            expected: expected.to_vec(),
            actual,
            offset,
            ctx: self.ctx_stack.clone(),
        })
    }
}

/// Write every record of GDS stream `src` to `dest`, as a JSON list of (offset, record) pairs
#[cfg(any(test, feature = "selftest"))]
pub fn dump(src: impl Read, dest: &mut impl std::io::Write) -> GdsResult<()> {
    // This streams one record at a time, rather than loading all into memory.
    let mut cursor = GdsCursor::new(src);
    writeln!(dest, "[")?;
    let mut first = true;
    while let Some(raw) = cursor.next()? {
        let entry = (raw.offset, GdsRecord::decode(raw)?);
        let s = serde_json::to_string(&entry).map_err(crate::ser::Error::from)?;
        if !first {
            writeln!(dest, ",")?;
        }
        write!(dest, "\t{}", s)?;
        first = false;
    }
    writeln!(dest, "\n]")?;
    Ok(())
}
