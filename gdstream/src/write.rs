//!
//! # Gdstream Byte-Encoding and Writing
//!

// Std-Lib Imports
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// Crates.io
use byteorder::{BigEndian, WriteBytesExt};
use log::debug;

// Local imports
use crate::data::*;
use crate::error::{GdsError, GdsResult};
use crate::records::{GdsRawRecord, GdsRecord};

/// # Gds Record-Conversion Trait
/// Conversion of a data-model item into its ordered sequence of [GdsRecord]s.
pub trait ToRecords {
    /// Convert to a Vector of [GdsRecord], ordered as dictated by the GDSII grammar
    fn to_records(&self) -> Vec<GdsRecord>;
}

/// Gds Writing Helper
pub struct GdsWriter<'wr> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
}
impl<'wr> GdsWriter<'wr> {
    /// Create new [GdsWriter] with destination file `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        let file = BufWriter::new(File::create(fname)?);
        Ok(Self::new(file))
    }
    /// Create a new [GdsWriter] to destination `dest`
    pub fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
        }
    }
    /// Write a [GdsLibrary] to the destination.
    /// Fails without writing anything if `lib` does not pass [GdsLibrary::validate].
    pub fn write_lib(&mut self, lib: &GdsLibrary) -> GdsResult<()> {
        lib.validate()?;
        debug!("Writing library {}", lib.name);
        let (before_name, after_name) = lib.meta_split();

        // Write our header content
        self.write_record(&GdsRecord::Header {
            version: lib.version.code(),
        })?;
        self.write_record(&GdsRecord::BgnLib {
            dates: lib.dates.encode(),
        })?;
        for record in before_name {
            self.write_record(record)?;
        }
        self.write_record(&GdsRecord::LibName(lib.name.clone()))?;
        for record in after_name {
            self.write_record(record)?;
        }
        self.write_record(&GdsRecord::Units(lib.units.0, lib.units.1))?;
        // Write all of our Structs/Cells
        for strukt in lib.structs.iter() {
            self.write_struct(strukt)?;
        }
        // And finally, the library terminator
        self.write_record(&GdsRecord::EndLib)
    }
    /// Write [GdsStruct] `strukt` to the destination
    pub fn write_struct(&mut self, strukt: &GdsStruct) -> GdsResult<()> {
        self.write_record(&GdsRecord::BgnStruct {
            dates: strukt.dates.encode(),
        })?;
        self.write_record(&GdsRecord::StructName(strukt.name.clone()))?;
        if let Some((d0, d1)) = strukt.strclass {
            self.write_record(&GdsRecord::StrClass(d0, d1))?;
        }
        for elem in strukt.elems.iter() {
            self.write_records(&elem.to_records())?;
        }
        self.write_record(&GdsRecord::EndStruct)
    }
    /// Helper to write a sequence of [GdsRecord]s
    fn write_records(&mut self, records: &[GdsRecord]) -> GdsResult<()> {
        for r in records {
            self.write_record(r)?;
        }
        Ok(())
    }
    /// Encode `record` into bytes and write onto `dest`.
    /// The data-type tag is always the one its record-type declares.
    /// Strings must be ASCII.
    pub fn write_record(&mut self, record: &GdsRecord) -> GdsResult<()> {
        record.check_ascii()?;
        let rtype = record.record_type();
        let len = record.payload_len();
        // Include the four header bytes in total-length
        match u16::try_from(len + 4) {
            Ok(val) => self.dest.write_u16::<BigEndian>(val)?,
            Err(_) => return Err(GdsError::RecordLen(len)),
        };
        self.dest.write_u8(rtype.tag())?;
        self.dest.write_u8(rtype.datatype().tag())?;
        record.write_payload(&mut self.dest)
    }
    /// Write `raw` exactly as framed, including its data-type tag
    pub fn write_raw(&mut self, raw: &GdsRawRecord) -> GdsResult<()> {
        let len = raw.data.len();
        match u16::try_from(len + 4) {
            Ok(val) => self.dest.write_u16::<BigEndian>(val)?,
            Err(_) => return Err(GdsError::RecordLen(len)),
        };
        self.dest.write_u8(raw.rtype.tag())?;
        self.dest.write_u8(raw.dtype.tag())?;
        self.dest.write_all(&raw.data)?;
        Ok(())
    }
    /// Flush the destination
    pub fn flush(&mut self) -> GdsResult<()> {
        self.dest.flush()?;
        Ok(())
    }
}

/// Push the `PROPATTR`/`PROPVALUE` pairs of `props`, and the closing `ENDEL`
fn push_properties(records: &mut Vec<GdsRecord>, props: &[GdsProperty]) {
    for prop in props.iter() {
        records.push(GdsRecord::PropAttr(prop.attr));
        records.push(GdsRecord::PropValue(prop.value.clone()));
    }
    records.push(GdsRecord::EndElement);
}

/// Push the optional leading `ELFLAGS` and `PLEX` records
fn push_flags_plex(
    records: &mut Vec<GdsRecord>,
    elflags: &Option<GdsElemFlags>,
    plex: &Option<GdsPlex>,
) {
    if let Some(ref e) = elflags {
        records.push(GdsRecord::ElemFlags(e.0, e.1));
    }
    if let Some(ref e) = plex {
        records.push(GdsRecord::Plex(e.0));
    }
}

impl ToRecords for GdsStrans {
    fn to_records(&self) -> Vec<GdsRecord> {
        let (d0, d1) = self.bits();
        let mut records = vec![GdsRecord::Strans(d0, d1)];
        if let Some(ref e) = self.mag {
            records.push(GdsRecord::Mag(*e));
        }
        if let Some(ref e) = self.angle {
            records.push(GdsRecord::Angle(*e));
        }
        records
    }
}

impl ToRecords for GdsPath {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::Path];
        push_flags_plex(&mut records, &self.elflags, &self.plex);
        records.push(GdsRecord::Layer(self.layer));
        records.push(GdsRecord::DataType(self.datatype));
        if let Some(ref e) = self.path_type {
            records.push(GdsRecord::PathType(e.code()));
        }
        if let Some(ref e) = self.width {
            records.push(GdsRecord::Width(*e));
        }
        if let Some(ref e) = self.begin_extn {
            records.push(GdsRecord::BeginExtn(*e));
        }
        if let Some(ref e) = self.end_extn {
            records.push(GdsRecord::EndExtn(*e));
        }
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&self.xy)));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsBoundary {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::Boundary];
        push_flags_plex(&mut records, &self.elflags, &self.plex);
        records.push(GdsRecord::Layer(self.layer));
        records.push(GdsRecord::DataType(self.datatype));
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&self.xy)));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsStructRef {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::StructRef];
        push_flags_plex(&mut records, &self.elflags, &self.plex);
        records.push(GdsRecord::StructRefName(self.name.clone()));
        if let Some(ref e) = self.strans {
            records.extend(e.to_records());
        }
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&[self.xy])));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsArrayRef {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::ArrayRef];
        push_flags_plex(&mut records, &self.elflags, &self.plex);
        records.push(GdsRecord::StructRefName(self.name.clone()));
        if let Some(ref e) = self.strans {
            records.extend(e.to_records());
        }
        records.push(GdsRecord::ColRow {
            cols: self.cols,
            rows: self.rows,
        });
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&self.xy)));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsTextElem {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::Text];
        push_flags_plex(&mut records, &self.elflags, &self.plex);
        records.push(GdsRecord::Layer(self.layer));
        records.push(GdsRecord::TextType(self.texttype));
        if let Some(ref e) = self.presentation {
            records.push(GdsRecord::Presentation(e.0, e.1));
        }
        if let Some(ref e) = self.path_type {
            records.push(GdsRecord::PathType(e.code()));
        }
        if let Some(ref e) = self.width {
            records.push(GdsRecord::Width(*e));
        }
        if let Some(ref e) = self.strans {
            records.extend(e.to_records());
        }
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&[self.xy])));
        records.push(GdsRecord::String(self.string.clone()));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsNode {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::Node];
        push_flags_plex(&mut records, &self.elflags, &self.plex);
        records.push(GdsRecord::Layer(self.layer));
        records.push(GdsRecord::Nodetype(self.nodetype));
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&self.xy)));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsBox {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::Box];
        push_flags_plex(&mut records, &self.elflags, &self.plex);
        records.push(GdsRecord::Layer(self.layer));
        records.push(GdsRecord::BoxType(self.boxtype));
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&self.xy)));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsCircle {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![
            GdsRecord::RaithCircle,
            GdsRecord::Layer(self.layer),
            GdsRecord::DataType(self.datatype),
        ];
        if let Some(ref e) = self.width {
            records.push(GdsRecord::Width(*e));
        }
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&self.xy())));
        push_properties(&mut records, &self.properties);
        records
    }
}

impl ToRecords for GdsElement {
    fn to_records(&self) -> Vec<GdsRecord> {
        use GdsElement::*;
        match self {
            GdsBoundary(e) => e.to_records(),
            GdsPath(e) => e.to_records(),
            GdsStructRef(e) => e.to_records(),
            GdsArrayRef(e) => e.to_records(),
            GdsTextElem(e) => e.to_records(),
            GdsNode(e) => e.to_records(),
            GdsBox(e) => e.to_records(),
            GdsCircle(e) => e.to_records(),
        }
    }
}
