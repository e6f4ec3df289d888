// Crates.io
use chrono::NaiveDate;

// Local Imports
use crate::data::*;
use crate::error::*;
use crate::flatten::*;
use crate::float::*;
use crate::read::*;
use crate::records::*;
use crate::ser::SerdeFile;
use crate::ser::SerializationFormat::{Json, Toml, Yaml};
use crate::write::*;

/// Specified creation date for test cases
fn test_dates() -> GdsDateTimes {
    let test_date: GdsDateTime = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 1)
        .unwrap()
        .into();
    GdsDateTimes {
        modified: test_date.clone(),
        accessed: test_date,
    }
}
/// Send log output to the test harness
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
/// Encode `records` into a byte-vector
fn encode(records: &[GdsRecord]) -> GdsResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    for r in records {
        wr.write_record(r)?;
    }
    drop(wr);
    Ok(bytes)
}
/// Hand-assemble a single frame, with arbitrary tags
fn frame(tag: u8, dtype: u8, payload: &[u8]) -> Vec<u8> {
    let mut v = ((payload.len() + 4) as u16).to_be_bytes().to_vec();
    v.push(tag);
    v.push(dtype);
    v.extend_from_slice(payload);
    v
}
/// Library-opening records
fn lib_start() -> Vec<GdsRecord> {
    vec![
        GdsRecord::Header { version: 600 },
        GdsRecord::BgnLib {
            dates: test_dates().encode(),
        },
        GdsRecord::LibName("testlib".into()),
        GdsRecord::Units(1e-3, 1e-9),
    ]
}
/// Struct-opening records
fn struct_start(name: &str) -> Vec<GdsRecord> {
    vec![
        GdsRecord::BgnStruct {
            dates: test_dates().encode(),
        },
        GdsRecord::StructName(name.into()),
    ]
}
/// A ten-unit square, as `XY` payload
fn square_xy() -> Vec<i32> {
    vec![0, 0, 0, 10, 10, 10, 10, 0, 0, 0]
}
/// A closed ten-unit square
fn square() -> Vec<GdsPoint> {
    GdsPoint::vec(&[(0, 0), (0, 10), (10, 10), (10, 0), (0, 0)])
}

/// Records exercising every element type and library-level metadata record
fn rich_records() -> Vec<GdsRecord> {
    use GdsRecord::*;
    let dates = test_dates().encode();
    vec![
        Header { version: 600 },
        BgnLib { dates },
        LibDirSize(8),
        SrfName("srf".into()),
        LibSecur(vec![1, 2]),
        LibName("roundtrip".into()),
        RefLibs("ref".into()),
        Fonts("font".into()),
        AttrTable("attrs".into()),
        Generations(3),
        Format(1),
        Mask("m1".into()),
        Mask("m2".into()),
        EndMasks,
        Units(1e-3, 1e-9),
        // The leaf cell
        BgnStruct { dates },
        StructName("cell".into()),
        StrClass(0, 1),
        Boundary,
        ElemFlags(0, 1),
        Plex(7),
        Layer(5),
        DataType(1),
        Xy(vec![0, 0, 0, 100, 100, 100, 100, 0, 0, 0]),
        PropAttr(1),
        PropValue("a".into()),
        PropAttr(2),
        PropValue("bb".into()),
        EndElement,
        Path,
        Layer(2),
        DataType(0),
        PathType(2),
        Width(10),
        BeginExtn(1),
        EndExtn(2),
        Xy(vec![0, 0, 10, 0, 10, 10]),
        EndElement,
        Text,
        Layer(3),
        TextType(0),
        Presentation(0, 0b0001_0101),
        PathType(0),
        Width(5),
        Strans(0x80, 0x06),
        Mag(2.0),
        Angle(90.0),
        Xy(vec![5, 5]),
        String("label".into()),
        EndElement,
        Node,
        Layer(4),
        Nodetype(1),
        Xy(vec![1, 1, 2, 2]),
        EndElement,
        Box,
        Layer(6),
        BoxType(0),
        Xy(square_xy()),
        EndElement,
        RaithCircle,
        Layer(7),
        DataType(0),
        Width(3),
        Xy(vec![50, 50, 20, 10, 0, 90, 0, 5]),
        EndElement,
        EndStruct,
        // And its parent
        BgnStruct { dates },
        StructName("top".into()),
        StructRef,
        StructRefName("cell".into()),
        Strans(0, 0),
        Xy(vec![10, 20]),
        EndElement,
        ArrayRef,
        StructRefName("cell".into()),
        ColRow { cols: 2, rows: 3 },
        Xy(vec![0, 0, 200, 0, 0, 300]),
        EndElement,
        EndStruct,
        EndLib,
    ]
}
fn rich_lib() -> GdsResult<GdsLibrary> {
    GdsLibrary::from_bytes(&encode(&rich_records())?)
}

#[test]
fn floats() -> GdsResult<()> {
    // Test conversions between normal-human and GDSII floating-point formats
    let f = GdsFloat64::encode(0.0);
    assert_eq!(f, 0);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 0.0);
    let f = GdsFloat64::encode(1.0);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 1.0);
    let f = GdsFloat64::encode(1e-11);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, 1e-11);
    let f = GdsFloat64::encode(-0.69);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, -0.69);
    let f = GdsFloat64::encode(-33.33e-33);
    let d = GdsFloat64::decode(f);
    assert_eq!(d, -33.33e-33);
    Ok(())
}
#[test]
fn milli_real() -> GdsResult<()> {
    let bytes = [0x3E, 0x41, 0x89, 0x37, 0x4B, 0xC6, 0xA7, 0xF0];
    assert_eq!(decode_real(bytes), 0.001);
    assert_eq!(encode_real(0.001), bytes);
    Ok(())
}
#[test]
fn real_edges() -> GdsResult<()> {
    // Powers of sixteen sit on the exponent boundary
    for val in [1.0 / 16.0, 16.0, 256.0, 4096.0] {
        assert_eq!(decode_real(encode_real(val)), val);
    }
    // Negative zero encodes as all-zeros
    assert_eq!(encode_real(-0.0), [0; 8]);
    assert_eq!(encode_real(f64::NAN), [0; 8]);
    // Out of range values saturate, or underflow to zero
    assert_eq!(encode_real(1e300), [0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(encode_real(-1e300), [0xFF; 8]);
    assert_eq!(encode_real(f64::INFINITY), [0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(encode_real(1e-300), [0; 8]);
    // Extremes of the `f64` range, including subnormals
    let max = [0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
    assert_eq!(encode_real(1e308), max);
    assert_eq!(encode_real(f64::MAX), max);
    assert_eq!(encode_real(f64::MIN), [0xFF; 8]);
    assert_eq!(encode_real(f64::MIN_POSITIVE), [0; 8]);
    assert_eq!(encode_real(1e-310), [0; 8]);
    assert_eq!(encode_real(-1e-310), [0; 8]);
    assert_eq!(encode_real(f64::from_bits(1)), [0; 8]);
    Ok(())
}
#[test]
fn real_idempotence() -> GdsResult<()> {
    // Decoded values re-encode exactly, across a pseudo-random sweep of normalized inputs
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    for _ in 0..10_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let sign = state & 0x8000_0000_0000_0000;
        let exp = ((state >> 48) % 120 + 4) << 56;
        let mantissa = (state & 0x00FF_FFFF_FFFF_FFFF) | 0x0010_0000_0000_0000;
        let val = GdsFloat64::decode(sign | exp | mantissa);
        assert_eq!(GdsFloat64::decode(GdsFloat64::encode(val)), val);
    }
    Ok(())
}
#[test]
fn string_padding() -> GdsResult<()> {
    // One NUL terminator, plus one more if needed for even length
    let bytes = encode(&[GdsRecord::String("abc".into())])?;
    assert_eq!(bytes, vec![0, 8, 0x19, 0x06, b'a', b'b', b'c', 0]);
    let bytes = encode(&[GdsRecord::String("abcd".into())])?;
    assert_eq!(bytes, vec![0, 10, 0x19, 0x06, b'a', b'b', b'c', b'd', 0, 0]);
    // And all trailing NULs come off when reading
    let mut cursor = GdsCursor::new(&bytes[..]);
    let raw = cursor.next()?.unwrap();
    assert_eq!(raw.string()?, "abcd");
    assert_eq!(GdsRecord::decode(raw)?, GdsRecord::String("abcd".into()));
    Ok(())
}
#[test]
fn marker_records() -> GdsResult<()> {
    let bytes = encode(&[GdsRecord::EndElement, GdsRecord::EndLib])?;
    assert_eq!(bytes, vec![0, 4, 0x11, 0x00, 0, 4, 0x04, 0x00]);
    Ok(())
}
#[test]
fn cursor_reverts() -> GdsResult<()> {
    let bytes = encode(&[GdsRecord::Header { version: 600 }, GdsRecord::EndLib])?;
    let mut cursor = GdsCursor::new(&bytes[..]);
    assert_eq!(cursor.next()?.map(|r| r.rtype), Some(GdsRecordType::Header));
    assert_eq!(cursor.offset(), 6);
    cursor.revert();
    assert_eq!(cursor.offset(), 0);
    assert_eq!(cursor.next()?.map(|r| r.rtype), Some(GdsRecordType::Header));
    assert_eq!(cursor.peek()?.map(|r| r.offset), Some(6));
    assert_eq!(cursor.next()?.map(|r| r.rtype), Some(GdsRecordType::EndLib));
    assert!(cursor.peek()?.is_none());
    assert!(cursor.next()?.is_none());
    Ok(())
}
#[test]
#[should_panic]
fn double_revert_panics() {
    let bytes = encode(&[GdsRecord::Header { version: 600 }]).unwrap();
    let mut cursor = GdsCursor::new(&bytes[..]);
    cursor.next().unwrap();
    cursor.revert();
    cursor.revert();
}
#[test]
fn it_round_trips_bytes() -> GdsResult<()> {
    init_logging();
    let bytes = encode(&rich_records())?;
    let (lib, diags) = GdsLibrary::read_with_options(&bytes[..], &GdsReadOptions::default())?;
    // Eleven library-level metadata records, plus one STRCLASS
    assert_eq!(diags.len(), 12);
    assert!(diags
        .iter()
        .all(|d| matches!(d, GdsDiagnostic::UnsupportedRecordSkipped { .. })));
    assert_eq!(lib.meta.len(), 11);
    assert_eq!(lib.to_bytes()?, bytes);
    Ok(())
}
#[test]
fn it_round_trips() -> GdsResult<()> {
    let lib = rich_lib()?;
    roundtrip(&lib)?;
    Ok(())
}
#[test]
fn it_reads_elements() -> GdsResult<()> {
    let lib = rich_lib()?;
    assert_eq!(lib.name, "roundtrip");
    assert_eq!(lib.version, GdsVersion::V600);
    assert_eq!(lib.dates, test_dates());
    assert_eq!(lib.units, GdsUnits(1e-3, 1e-9));
    let cell = lib.struct_by_name("cell").unwrap();
    assert_eq!(cell.strclass, Some((0, 1)));

    match &cell.elems[0] {
        GdsElement::GdsBoundary(b) => {
            assert_eq!(b.layerspec(), GdsLayerSpec::new(5, 1));
            assert_eq!(b.elflags, Some(GdsElemFlags(0, 1)));
            assert_eq!(b.plex, Some(GdsPlex(7)));
            assert_eq!(
                b.properties,
                vec![GdsProperty::new(1, "a"), GdsProperty::new(2, "bb")]
            );
        }
        other => panic!("Expected boundary, found {:?}", other),
    }
    match &cell.elems[1] {
        GdsElement::GdsPath(p) => {
            assert_eq!(p.end_cap(), GdsPathType::Extended);
            assert_eq!(p.width(), 10);
            assert_eq!((p.begin_extn, p.end_extn), (Some(1), Some(2)));
        }
        other => panic!("Expected path, found {:?}", other),
    }
    match &cell.elems[2] {
        GdsElement::GdsTextElem(t) => {
            assert_eq!(t.string, "label");
            assert_eq!(t.xy, GdsPoint::new(5, 5));
            assert_eq!(t.vert(), GdsVertAlign::Middle);
            assert_eq!(t.horiz(), GdsHorizAlign::Center);
            let strans = t.strans.as_ref().unwrap();
            assert!(strans.reflected && strans.abs_mag && strans.abs_angle);
            assert_eq!((strans.mag(), strans.angle()), (2.0, 90.0));
        }
        other => panic!("Expected text, found {:?}", other),
    }
    match &cell.elems[5] {
        GdsElement::GdsCircle(c) => {
            assert_eq!(c.center, GdsPoint::new(50, 50));
            assert_eq!(c.radii, GdsPoint::new(20, 10));
            assert!(c.flags.is_ellipse() && !c.flags.is_filled() && c.flags.is_arc());
            assert_eq!(c.arc_angles(), Some(GdsPoint::new(0, 90)));
            assert_eq!(c.width(), 3);
        }
        other => panic!("Expected circle, found {:?}", other),
    }
    let top = lib.struct_by_name("top").unwrap();
    match &top.elems[1] {
        GdsElement::GdsArrayRef(a) => {
            assert_eq!((a.cols, a.rows), (2, 3));
            assert_eq!(a.xy[2], GdsPoint::new(0, 300));
        }
        other => panic!("Expected array, found {:?}", other),
    }
    Ok(())
}
#[test]
fn stats() -> GdsResult<()> {
    let lib = rich_lib()?;
    assert_eq!(
        lib.stats(),
        GdsStats {
            libraries: 1,
            structs: 2,
            boundaries: 1,
            paths: 1,
            struct_refs: 1,
            array_refs: 1,
            text_elems: 1,
            nodes: 1,
            boxes: 1,
            circles: 1,
        }
    );
    assert_eq!(lib.layers().into_iter().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6, 7]);
    let tops: Vec<&str> = lib.top_structs().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(tops, vec!["top"]);
    Ok(())
}
#[test]
fn strict_mode_fails_on_diagnostics() -> GdsResult<()> {
    let bytes = encode(&rich_records())?;
    let opts = GdsReadOptionsBuilder::default().strict(true).build().unwrap();
    match GdsLibrary::read_with_options(&bytes[..], &opts) {
        Err(GdsError::Diagnostic(GdsDiagnostic::UnsupportedRecordSkipped { rtype, offset })) => {
            assert_eq!(rtype, GdsRecordType::LibDirSize);
            assert_eq!(offset, 6 + 28);
        }
        other => panic!("Expected strict-mode failure, got {:?}", other),
    }
    // Capping the number collected
    let opts = GdsReadOptions {
        strict: false,
        max_diagnostics: Some(3),
    };
    let (_lib, diags) = GdsLibrary::read_with_options(&bytes[..], &opts)?;
    assert_eq!(diags.len(), 3);
    Ok(())
}
/// A library with one boundary, whose `LAYER` and `DATATYPE` records carry bad data-type tags.
/// Returns the stream, and the offset of its `LAYER` record.
fn mistyped_stream() -> GdsResult<(Vec<u8>, u64)> {
    let mut records = lib_start();
    records.extend(struct_start("s"));
    records.push(GdsRecord::Boundary);
    let mut bytes = encode(&records)?;
    let offset = bytes.len() as u64;
    bytes.extend(frame(GdsRecordType::Layer.tag(), 3, &5i16.to_be_bytes()));
    bytes.extend(frame(GdsRecordType::DataType.tag(), 9, &0i16.to_be_bytes()));
    bytes.extend(encode(&[
        GdsRecord::Xy(square_xy()),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ])?);
    Ok((bytes, offset))
}
#[test]
fn datatype_diagnostics() -> GdsResult<()> {
    init_logging();
    let (bytes, offset) = mistyped_stream()?;
    let (lib, diags) = GdsLibrary::read_with_options(&bytes[..], &GdsReadOptions::default())?;
    // Each is reported once, despite the lookahead re-reading the `LAYER` record
    assert_eq!(
        diags,
        vec![
            GdsDiagnostic::DatatypeMismatch {
                rtype: GdsRecordType::Layer,
                expected: GdsDataType::I16,
                actual: GdsDataType::I32,
                offset,
            },
            GdsDiagnostic::UnknownDatatypeTag {
                rtype: GdsRecordType::DataType,
                tag: 9,
                offset: offset + 6,
            },
        ]
    );
    // Payloads are decoded under their declared layouts
    match &lib.structs[0].elems[0] {
        GdsElement::GdsBoundary(b) => assert_eq!((b.layer, b.datatype), (5, 0)),
        other => panic!("Expected boundary, found {:?}", other),
    }
    // Model-level writing normalizes the tags
    let mut canonical = lib_start();
    canonical.extend(struct_start("s"));
    canonical.extend(vec![
        GdsRecord::Boundary,
        GdsRecord::Layer(5),
        GdsRecord::DataType(0),
        GdsRecord::Xy(square_xy()),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    assert_eq!(lib.to_bytes()?, encode(&canonical)?);
    Ok(())
}
#[test]
fn raw_records_round_trip() -> GdsResult<()> {
    // Record-level copying preserves even the bad data-type tags
    let (bytes, _) = mistyped_stream()?;
    let mut cursor = GdsCursor::new(&bytes[..]);
    let mut copy = Vec::new();
    let mut wr = GdsWriter::new(&mut copy);
    while let Some(raw) = cursor.next()? {
        wr.write_raw(raw)?;
    }
    drop(wr);
    assert_eq!(copy, bytes);
    assert_eq!(cursor.diagnostics().len(), 2);
    Ok(())
}
#[test]
fn strict_datatypes() -> GdsResult<()> {
    let (bytes, _) = mistyped_stream()?;
    let opts = GdsReadOptions {
        strict: true,
        max_diagnostics: None,
    };
    let res = GdsLibrary::read_with_options(&bytes[..], &opts);
    assert!(matches!(
        res,
        Err(GdsError::Diagnostic(GdsDiagnostic::DatatypeMismatch { .. }))
    ));
    Ok(())
}
#[test]
fn unknown_record_type() -> GdsResult<()> {
    let mut bytes = encode(&lib_start()[0..2])?;
    bytes.extend(frame(0xFF, 0, &[]));
    match GdsLibrary::from_bytes(&bytes) {
        Err(GdsError::UnknownRecordType { tag, offset }) => {
            assert_eq!(tag, 0xFF);
            assert_eq!(offset, 6 + 28);
        }
        other => panic!("Expected UnknownRecordType, got {:?}", other),
    }
    Ok(())
}
#[test]
fn non_ascii_strings() -> GdsResult<()> {
    // Reading: a UTF-8 "µm" library name
    let mut bytes = encode(&lib_start()[0..2])?;
    bytes.extend(frame(0x02, 0x06, &[0xC2, 0xB5, b'm', 0]));
    match GdsLibrary::from_bytes(&bytes) {
        Err(GdsError::RecordDecode { rtype, offset, .. }) => {
            assert_eq!(rtype, GdsRecordType::LibName);
            assert_eq!(offset, 6 + 28);
        }
        other => panic!("Expected RecordDecode, got {:?}", other),
    }
    // And a lone Latin-1 byte
    let raw = GdsRawRecord {
        rtype: GdsRecordType::String,
        dtype: GdsDataType::Str,
        data: vec![b'a', 0xB5],
        offset: 0,
    };
    assert!(matches!(raw.string(), Err(GdsError::RecordDecode { .. })));

    // Writing fails before any bytes are emitted
    let mut bytes = Vec::new();
    let mut wr = GdsWriter::new(&mut bytes);
    match wr.write_record(&GdsRecord::String("µm".into())) {
        Err(GdsError::NonAsciiString { rtype, value }) => {
            assert_eq!(rtype, GdsRecordType::String);
            assert_eq!(value, "µm");
        }
        other => panic!("Expected NonAsciiString, got {:?}", other),
    }
    drop(wr);
    assert!(bytes.is_empty());
    // Including for whole libraries
    let mut lib = GdsLibrary::new("lib");
    lib.add_struct(GdsStruct::new("cellµ"))?;
    assert!(matches!(lib.to_bytes(), Err(GdsError::NonAsciiString { .. })));
    Ok(())
}
#[test]
fn raw_record_lengths() -> GdsResult<()> {
    // Total lengths include the header, and reach past what a payload-only count would show
    let bytes = encode(&[GdsRecord::Xy(vec![7; 16_000]), GdsRecord::EndLib])?;
    assert_eq!(bytes.len(), 64_008);
    let mut cursor = GdsCursor::new(&bytes[..]);
    match cursor.next()? {
        Some(raw) => {
            assert_eq!(raw.rtype, GdsRecordType::Xy);
            assert_eq!(raw.total_len(), 64_004);
            assert_eq!(raw.offset, 0);
        }
        None => panic!("Expected an XY record"),
    }
    match cursor.next()? {
        Some(raw) => {
            assert_eq!(raw.rtype, GdsRecordType::EndLib);
            assert_eq!(raw.total_len(), 4);
            assert_eq!(raw.offset, 64_004);
        }
        None => panic!("Expected an ENDLIB record"),
    }
    assert!(cursor.next()?.is_none());
    Ok(())
}
#[test]
fn bad_record_len() -> GdsResult<()> {
    let bytes = vec![0x00, 0x03, 0x00, 0x02];
    assert!(matches!(
        GdsLibrary::from_bytes(&bytes),
        Err(GdsError::RecordLen(3))
    ));
    let bytes = vec![0x00, 0x07, 0x00, 0x02, 0, 0, 0];
    assert!(matches!(
        GdsLibrary::from_bytes(&bytes),
        Err(GdsError::RecordLen(7))
    ));
    Ok(())
}
#[test]
fn truncated_streams() -> GdsResult<()> {
    let bytes = encode(&rich_records())?;
    // Mid-frame
    let res = GdsLibrary::from_bytes(&bytes[..bytes.len() - 2]);
    assert!(matches!(res, Err(GdsError::UnexpectedEof { .. })));
    // Mid-payload
    let res = GdsLibrary::from_bytes(&bytes[..39]);
    assert!(matches!(res, Err(GdsError::UnexpectedEof { .. })));
    // Missing its ENDLIB entirely
    let res = GdsLibrary::from_bytes(&bytes[..bytes.len() - 4]);
    match res {
        Err(GdsError::UnexpectedEof { offset }) => assert_eq!(offset, bytes.len() as u64 - 4),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
    Ok(())
}
#[test]
fn unexpected_record() -> GdsResult<()> {
    // A boundary missing its DATATYPE
    let mut records = lib_start();
    records.extend(struct_start("s"));
    records.extend(vec![
        GdsRecord::Boundary,
        GdsRecord::Layer(1),
        GdsRecord::Xy(square_xy()),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    match GdsLibrary::from_bytes(&encode(&records)?) {
        Err(GdsError::UnexpectedRecord {
            expected,
            actual,
            ctx,
            ..
        }) => {
            assert_eq!(expected, GdsRecordType::DataType);
            assert_eq!(actual, GdsRecordType::Xy);
            assert_eq!(
                ctx,
                vec![GdsContext::Library, GdsContext::Struct, GdsContext::Boundary]
            );
        }
        other => panic!("Expected UnexpectedRecord, got {:?}", other),
    }
    Ok(())
}
#[test]
fn missing_record() -> GdsResult<()> {
    // A stray LAYER where an element or ENDSTR belongs
    let mut records = lib_start();
    records.extend(struct_start("s"));
    records.extend(vec![
        GdsRecord::Layer(1),
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    match GdsLibrary::from_bytes(&encode(&records)?) {
        Err(GdsError::MissingRecord {
            expected, actual, ..
        }) => {
            assert_eq!(actual, GdsRecordType::Layer);
            assert!(expected.contains(&GdsRecordType::EndStruct));
            assert!(expected.contains(&GdsRecordType::RaithCircle));
        }
        other => panic!("Expected MissingRecord, got {:?}", other),
    }
    // A property attribute without its value
    let mut records = lib_start();
    records.extend(struct_start("s"));
    records.extend(vec![
        GdsRecord::Node,
        GdsRecord::Layer(1),
        GdsRecord::Nodetype(0),
        GdsRecord::Xy(vec![0, 0]),
        GdsRecord::PropAttr(1),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    match GdsLibrary::from_bytes(&encode(&records)?) {
        Err(GdsError::UnexpectedRecord { expected, ctx, .. }) => {
            assert_eq!(expected, GdsRecordType::PropValue);
            assert_eq!(ctx.last(), Some(&GdsContext::Property));
        }
        other => panic!("Expected UnexpectedRecord, got {:?}", other),
    }
    Ok(())
}
#[test]
fn unsupported_version() -> GdsResult<()> {
    let mut records = lib_start();
    records[0] = GdsRecord::Header { version: 2 };
    records.push(GdsRecord::EndLib);
    assert!(matches!(
        GdsLibrary::from_bytes(&encode(&records)?),
        Err(GdsError::UnsupportedVersion(2))
    ));
    assert_eq!(GdsVersion::try_from(7)?, GdsVersion::V7);
    assert_eq!(GdsVersion::V600.code(), 600);
    Ok(())
}
#[test]
fn duplicate_structs() -> GdsResult<()> {
    let mut records = lib_start();
    records.extend(struct_start("a"));
    records.push(GdsRecord::EndStruct);
    records.extend(struct_start("a"));
    records.push(GdsRecord::EndStruct);
    records.push(GdsRecord::EndLib);
    match GdsLibrary::from_bytes(&encode(&records)?) {
        Err(GdsError::DuplicateStruct(name)) => assert_eq!(name, "a"),
        other => panic!("Expected DuplicateStruct, got {:?}", other),
    }
    let mut lib = GdsLibrary::new("dups");
    lib.add_struct(GdsStruct::new("a"))?;
    assert!(matches!(
        lib.add_struct(GdsStruct::new("a")),
        Err(GdsError::DuplicateStruct(_))
    ));
    // Pushing directly skips the check, but writing does not
    lib.structs.push(GdsStruct::new("a"));
    assert!(matches!(lib.to_bytes(), Err(GdsError::DuplicateStruct(_))));
    Ok(())
}
#[test]
fn boundary_geometry() -> GdsResult<()> {
    // Too few points
    let res = GdsBoundary::new(1, 0, GdsPoint::vec(&[(0, 0), (1, 0), (0, 0)]));
    assert!(matches!(res, Err(GdsError::InvalidGeometry { .. })));
    // Not closed
    let res = GdsBoundary::new(1, 0, GdsPoint::vec(&[(0, 0), (1, 0), (1, 1), (0, 1)]));
    assert!(matches!(res, Err(GdsError::InvalidGeometry { .. })));
    // Just right
    let b = GdsBoundary::new(1, 0, square())?;
    assert_eq!(b.xy.len(), 5);
    // Builders check the same
    let res = GdsBoundaryBuilder::default()
        .layer(1i16)
        .datatype(0i16)
        .xy(GdsPoint::vec(&[(0, 0), (1, 1)]))
        .build();
    assert!(matches!(res, Err(GdsError::InvalidGeometry { .. })));
    // As does reading
    let mut records = lib_start();
    records.extend(struct_start("s"));
    records.extend(vec![
        GdsRecord::Boundary,
        GdsRecord::Layer(1),
        GdsRecord::DataType(0),
        GdsRecord::Xy(vec![0, 0, 1, 0, 0, 0]),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    let res = GdsLibrary::from_bytes(&encode(&records)?);
    assert!(matches!(res, Err(GdsError::InvalidGeometry { .. })));
    // And writing
    let mut lib = GdsLibrary::new("bad");
    let mut cell = GdsStruct::new("cell");
    cell.elems.push(
        GdsBoundary {
            xy: GdsPoint::vec(&[(0, 0), (1, 1)]),
            ..Default::default()
        }
        .into(),
    );
    lib.add_struct(cell)?;
    assert!(matches!(lib.to_bytes(), Err(GdsError::InvalidGeometry { .. })));
    Ok(())
}
#[test]
fn other_geometry() -> GdsResult<()> {
    assert!(GdsPath::new(1, 0, GdsPoint::vec(&[(0, 0)])).is_err());
    assert!(GdsPath::new(1, 0, GdsPoint::vec(&[(0, 0), (5, 0)])).is_ok());
    assert!(GdsNode::new(1, 0, Vec::new()).is_err());
    assert!(GdsNode::new(1, 0, vec![GdsPoint::default(); 51]).is_err());
    assert!(GdsNode::new(1, 0, vec![GdsPoint::default(); 50]).is_ok());
    let mut open = [GdsPoint::default(); 5];
    open[4] = GdsPoint::new(1, 1);
    assert!(GdsBox::new(1, 0, open).is_err());
    assert!(GdsArrayRef::new("cell", [GdsPoint::default(); 3], 0, 1).is_err());
    assert!(GdsArrayRef::new("cell", [GdsPoint::default(); 3], 1, 1).is_ok());
    assert!(GdsCircle::new(1, 0, GdsPoint::default(), -1).is_err());
    let res = GdsCircleBuilder::default()
        .layer(1i16)
        .datatype(0i16)
        .center(GdsPoint::new(0, 0))
        .radii(GdsPoint::new(5, -5))
        .build();
    assert!(matches!(res, Err(GdsError::InvalidGeometry { .. })));
    // Box reads require exactly five points
    let mut records = lib_start();
    records.extend(struct_start("s"));
    records.extend(vec![
        GdsRecord::Box,
        GdsRecord::Layer(1),
        GdsRecord::BoxType(0),
        GdsRecord::Xy(vec![0, 0, 1, 0, 1, 1, 0, 0]),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    let res = GdsLibrary::from_bytes(&encode(&records)?);
    assert!(matches!(res, Err(GdsError::InvalidGeometry { .. })));
    Ok(())
}
#[test]
fn duplicate_properties() -> GdsResult<()> {
    // Property number five, twice
    let props = vec![GdsProperty::new(5, "a"), GdsProperty::new(5, "b")];
    let res = GdsBoundaryBuilder::default()
        .layer(1i16)
        .datatype(0i16)
        .xy(square())
        .properties(props.clone())
        .build();
    assert!(matches!(res, Err(GdsError::InvalidProperty { attr: 5, .. })));
    let b = GdsBoundary {
        properties: props,
        ..GdsBoundary::new(1, 0, square())?
    };
    assert!(matches!(b.validate(), Err(GdsError::InvalidProperty { attr: 5, .. })));
    // Out of range
    let t = GdsTextElem {
        properties: vec![GdsProperty::new(128, "x")],
        ..GdsTextElem::new("t", 1, 0, GdsPoint::default())
    };
    assert!(matches!(t.validate(), Err(GdsError::InvalidProperty { attr: 128, .. })));
    // And rejected when read
    let mut records = lib_start();
    records.extend(struct_start("s"));
    records.extend(vec![
        GdsRecord::Boundary,
        GdsRecord::Layer(1),
        GdsRecord::DataType(0),
        GdsRecord::Xy(square_xy()),
        GdsRecord::PropAttr(5),
        GdsRecord::PropValue("a".into()),
        GdsRecord::PropAttr(5),
        GdsRecord::PropValue("b".into()),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    let res = GdsLibrary::from_bytes(&encode(&records)?);
    assert!(matches!(res, Err(GdsError::InvalidProperty { attr: 5, .. })));
    Ok(())
}
#[test]
fn presentation_bits() -> GdsResult<()> {
    let p = GdsPresentation::new(2, GdsVertAlign::Bottom, GdsHorizAlign::Right);
    assert_eq!(p, GdsPresentation(0, 0b0010_1010));
    assert_eq!(p.font(), 2);
    assert_eq!(p.vert(), GdsVertAlign::Bottom);
    assert_eq!(p.horiz(), GdsHorizAlign::Right);
    let p = GdsPresentation(0, 0b0000_0100);
    assert_eq!((p.font(), p.vert(), p.horiz()), (0, GdsVertAlign::Middle, GdsHorizAlign::Left));
    // Defaults, absent a PRESENTATION record
    let t = GdsTextElem::new("t", 1, 0, GdsPoint::default());
    assert_eq!((t.vert(), t.horiz()), (GdsVertAlign::Top, GdsHorizAlign::Left));
    Ok(())
}
#[test]
fn strans_bits() -> GdsResult<()> {
    let s = GdsStrans::from_bits(0x80, 0x04);
    assert!(s.reflected && s.abs_mag && !s.abs_angle);
    assert_eq!(s.bits(), (0x80, 0x04));
    assert_eq!((s.mag(), s.angle()), (1.0, 0.0));
    Ok(())
}
#[test]
fn circle_flags() -> GdsResult<()> {
    let flags = GdsCircleFlags::new(true, false, true);
    assert_eq!(flags, GdsCircleFlags(0, 5));
    assert!(flags.is_ellipse() && !flags.is_filled() && flags.is_arc());
    let filled = GdsCircleFlags::new(false, true, false);
    assert!(!filled.is_ellipse() && filled.is_filled() && !filled.is_arc());
    // Arc angles are only reported for arcs
    let c = GdsCircle::new(1, 0, GdsPoint::new(3, 4), 10)?;
    assert_eq!(c.arc_angles(), None);
    assert_eq!(c.xy()[3], GdsPoint::new(0, 0));
    Ok(())
}

/// Library with struct "cell" holding one boundary on layer 5, and struct "top" holding `elems`
fn hier_lib(elems: Vec<GdsElement>) -> GdsResult<GdsLibrary> {
    let mut lib = GdsLibrary::new("hier");
    let mut cell = GdsStruct::new("cell");
    cell.elems.push(GdsBoundary::new(5, 0, square())?.into());
    lib.add_struct(cell)?;
    let mut top = GdsStruct::new("top");
    top.elems = elems;
    lib.add_struct(top)?;
    Ok(lib)
}
#[test]
fn it_flattens_arrays() -> GdsResult<()> {
    init_logging();
    let aref = GdsArrayRef::new(
        "cell",
        [
            GdsPoint::new(0, 0),
            GdsPoint::new(300, 0),
            GdsPoint::new(0, 200),
        ],
        3,
        2,
    )?;
    let lib = hier_lib(vec![aref.into()])?;
    let prims = lib.flatten("top").collect::<GdsResult<Vec<_>>>()?;
    assert_eq!(prims.len(), 6);
    assert!(prims.iter().all(|p| p.layer == 5));
    assert!(prims
        .iter()
        .all(|p| matches!(p.shape, GdsShape::Polygon { .. })));
    let origins: Vec<GdsPoint> = prims.iter().map(|p| p.points()[0]).collect();
    assert_eq!(
        origins,
        GdsPoint::vec(&[(0, 0), (100, 0), (200, 0), (0, 100), (100, 100), (200, 100)])
    );
    Ok(())
}
#[test]
fn array_pitch_truncates() -> GdsResult<()> {
    // 100 / 3 truncates to 33, so the third column lands at 66 rather than 66.67
    let aref = GdsArrayRef::new(
        "cell",
        [GdsPoint::new(0, 0), GdsPoint::new(100, 0), GdsPoint::new(0, 0)],
        3,
        1,
    )?;
    let lib = hier_lib(vec![aref.into()])?;
    let xs: Vec<i32> = lib
        .flatten("top")
        .map(|p| p.map(|p| p.points()[0].x))
        .collect::<GdsResult<_>>()?;
    assert_eq!(xs, vec![0, 33, 66]);
    Ok(())
}
#[test]
fn it_flattens_refs() -> GdsResult<()> {
    let mut lib = GdsLibrary::new("nested");
    let mut cell = GdsStruct::new("cell");
    cell.elems.push(GdsTextElem::new("hi", 3, 0, GdsPoint::new(5, 5)).into());
    let mut circle = GdsCircle::new(7, 0, GdsPoint::new(1, 1), 4)?;
    circle.flags = GdsCircleFlags::new(false, true, true);
    circle.arc = GdsPoint::new(0, 180);
    cell.elems.push(circle.into());
    lib.add_struct(cell)?;
    let mut mid = GdsStruct::new("mid");
    mid.elems.push(GdsStructRef::new("cell", GdsPoint::new(1, 2)).into());
    lib.add_struct(mid)?;
    let mut top = GdsStruct::new("top");
    // Rotation is carried, but not applied
    let sref = GdsStructRef {
        strans: Some(GdsStrans {
            angle: Some(90.0),
            ..Default::default()
        }),
        ..GdsStructRef::new("mid", GdsPoint::new(10, 20))
    };
    top.elems.push(sref.into());
    lib.add_struct(top)?;

    let prims = lib.flatten_top().collect::<GdsResult<Vec<_>>>()?;
    assert_eq!(
        prims,
        vec![
            GdsPrimitive {
                layer: 3,
                xtype: 0,
                shape: GdsShape::Label {
                    xy: GdsPoint::new(16, 27),
                    string: "hi".into(),
                    horiz: GdsHorizAlign::Left,
                    vert: GdsVertAlign::Top,
                },
            },
            GdsPrimitive {
                layer: 7,
                xtype: 0,
                shape: GdsShape::Circle {
                    center: GdsPoint::new(12, 23),
                    radii: GdsPoint::new(4, 4),
                    arc: Some(GdsPoint::new(0, 180)),
                    ellipse: false,
                    filled: true,
                    width: 0,
                },
            },
        ]
    );
    // Starting from several structs visits each in turn
    let n = lib.flatten_all(["cell", "mid"]).count();
    assert_eq!(n, 4);
    Ok(())
}
#[test]
fn it_flattens_leaf_kinds() -> GdsResult<()> {
    let lib = rich_lib()?;
    let prims = lib.flatten("cell").collect::<GdsResult<Vec<_>>>()?;
    assert_eq!(prims.len(), 6);
    match &prims[1].shape {
        GdsShape::Polyline { width, end_cap, xy } => {
            assert_eq!((*width, *end_cap), (10, GdsPathType::Extended));
            assert_eq!(xy.len(), 3);
        }
        other => panic!("Expected polyline, found {:?}", other),
    }
    assert!(matches!(prims[3].shape, GdsShape::Node { .. }));
    assert!(matches!(prims[4].shape, GdsShape::Polygon { .. }));
    // And the whole hierarchy: six in "cell", once by reference, and six times by array
    assert_eq!(lib.flatten("top").count(), 6 + 6 * 6);
    Ok(())
}
#[test]
fn dangling_reference() -> GdsResult<()> {
    let lib = hier_lib(vec![
        GdsBoundary::new(1, 0, square())?.into(),
        GdsStructRef::new("nope", GdsPoint::default()).into(),
    ])?;
    let mut flat = lib.flatten("top");
    // Primitives before the failure are still produced
    assert!(matches!(flat.next(), Some(Ok(_))));
    match flat.next() {
        Some(Err(GdsError::DanglingReference { name, referrer })) => {
            assert_eq!(name, "nope");
            assert_eq!(referrer, "top");
        }
        other => panic!("Expected DanglingReference, got {:?}", other),
    }
    assert!(flat.next().is_none());
    // Missing starting points fail the same way
    assert!(matches!(
        lib.flatten("missing").next(),
        Some(Err(GdsError::DanglingReference { .. }))
    ));
    Ok(())
}
#[test]
fn reference_cycles() -> GdsResult<()> {
    let mut lib = GdsLibrary::new("cyclic");
    let mut a = GdsStruct::new("a");
    a.elems.push(GdsStructRef::new("b", GdsPoint::default()).into());
    lib.add_struct(a)?;
    let mut b = GdsStruct::new("b");
    b.elems.push(GdsStructRef::new("a", GdsPoint::default()).into());
    lib.add_struct(b)?;
    match lib.flatten("a").next() {
        Some(Err(GdsError::ReferenceCycle { stack })) => assert_eq!(stack, vec!["a", "b", "a"]),
        other => panic!("Expected ReferenceCycle, got {:?}", other),
    }
    // Self-arrays too
    let mut lib = GdsLibrary::new("selfish");
    let mut s = GdsStruct::new("s");
    s.elems
        .push(GdsArrayRef::new("s", [GdsPoint::default(); 3], 2, 2)?.into());
    lib.add_struct(s)?;
    let res: GdsResult<Vec<_>> = lib.flatten("s").collect();
    assert!(matches!(res, Err(GdsError::ReferenceCycle { .. })));
    Ok(())
}
/// Library with a cell drawn near the positive edge of the `i32` range
fn far_lib(elems: Vec<GdsElement>) -> GdsResult<GdsLibrary> {
    let mut lib = GdsLibrary::new("far");
    let mut cell = GdsStruct::new("cell");
    let xy = GdsPoint::vec(&[
        (2_000_000_000, 0),
        (2_000_000_000, 10),
        (2_000_000_010, 10),
        (2_000_000_010, 0),
        (2_000_000_000, 0),
    ]);
    cell.elems.push(GdsBoundary::new(1, 0, xy)?.into());
    lib.add_struct(cell)?;
    let mut top = GdsStruct::new("top");
    top.elems = elems;
    lib.add_struct(top)?;
    Ok(lib)
}
#[test]
fn coordinate_overflow() -> GdsResult<()> {
    // Placing the cell another 2e9 to the right leaves the `i32` range
    let lib = far_lib(vec![GdsStructRef::new("cell", GdsPoint::new(2_000_000_000, 0)).into()])?;
    let mut flat = lib.flatten("top");
    match flat.next() {
        Some(Err(GdsError::CoordinateOverflow { x, y })) => {
            assert_eq!(x, 4_000_000_000);
            assert_eq!(y, 0);
        }
        other => panic!("Expected CoordinateOverflow, got {:?}", other),
    }
    assert!(flat.next().is_none());

    // Array cells overflow part-way through
    let aref = GdsArrayRef::new(
        "cell",
        [
            GdsPoint::new(0, 0),
            GdsPoint::new(2_000_000_000, 0),
            GdsPoint::new(0, 0),
        ],
        2,
        1,
    )?;
    let lib = far_lib(vec![aref.into()])?;
    let mut flat = lib.flatten("top");
    assert!(matches!(flat.next(), Some(Ok(_))));
    assert!(matches!(flat.next(), Some(Err(GdsError::CoordinateOverflow { .. }))));
    assert!(flat.next().is_none());

    // As do array origins, once offset by an enclosing reference
    let mut lib = far_lib(vec![GdsStructRef::new("mid", GdsPoint::new(2_000_000_000, 0)).into()])?;
    let mut mid = GdsStruct::new("mid");
    mid.elems.push(
        GdsArrayRef::new(
            "cell",
            [
                GdsPoint::new(200_000_000, 0),
                GdsPoint::new(400_000_000, 0),
                GdsPoint::new(200_000_000, 100),
            ],
            1,
            1,
        )?
        .into(),
    );
    lib.add_struct(mid)?;
    let res: GdsResult<Vec<_>> = lib.flatten("top").collect();
    assert!(matches!(
        res,
        Err(GdsError::CoordinateOverflow { x: 2_200_000_000, y: 0 })
    ));
    Ok(())
}
#[test]
/// Test too-long record length (>64K) generates an error
fn record_too_long() -> GdsResult<()> {
    let mut lib = GdsLibrary::new("mylib");
    let mut newcell = GdsStruct::new("mycell");
    newcell.elems.push(
        GdsBoundary {
            xy: vec![GdsPoint::default(); 20_000],
            ..GdsBoundary::default()
        }
        .into(),
    );
    lib.structs.push(newcell);
    // This should generate [GdsError::RecordLen]
    match roundtrip(&lib) {
        Err(GdsError::RecordLen(_)) => Ok(()),
        Ok(_) | Err(_) => Err(GdsError::Str(
            "should generate a [GdsError::RecordLen] error".into(),
        )),
    }
}
#[test]
fn empty_lib_roundtrip() -> GdsResult<()> {
    let mut lib = GdsLibrary::new("empty");
    lib.dates = test_dates();
    roundtrip(&lib)?;
    assert_eq!(lib.to_bytes()?.len(), 6 + 28 + 10 + 20 + 4);
    Ok(())
}
#[test]
fn it_saves_and_opens() -> GdsResult<()> {
    let lib = rich_lib()?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rich.gds");
    lib.save(&path)?;
    assert_eq!(GdsLibrary::open(&path)?, lib);
    Ok(())
}
#[test]
fn it_dumps_records() -> GdsResult<()> {
    let bytes = encode(&rich_records())?;
    let mut out = Vec::new();
    dump(&bytes[..], &mut out)?;
    let records: Vec<(u64, GdsRecord)> = serde_json::from_slice(&out).unwrap();
    assert_eq!(records.len(), rich_records().len());
    assert_eq!(records[0], (0, GdsRecord::Header { version: 600 }));
    assert_eq!(records[1].0, 6);
    Ok(())
}
#[test]
fn dates() -> GdsResult<()> {
    let dates = test_dates();
    assert_eq!(dates.modified.year, 70);
    assert_eq!(
        dates.modified.to_naive()?,
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap()
    );
    assert_eq!(GdsDateTimes::decode(&dates.encode()), dates);
    // Invalid dates survive as raw values, and fail only on conversion
    let invalid = GdsDateTime::from([0, 0, 0, 17, 49, 18]);
    assert!(invalid.to_naive().is_err());
    let mut lib = GdsLibrary::new("dated");
    lib.add_struct(GdsStruct::new("cell"))?;
    lib.set_all_dates(invalid.clone());
    assert_eq!(lib.structs[0].dates.accessed, invalid);
    roundtrip(&lib)?;
    Ok(())
}
#[test]
fn lib_to_json_and_yaml() -> GdsResult<()> {
    let lib = rich_lib()?;
    let json = Json.to_string(&lib)?;
    let back: GdsLibrary = Json.from_str(&json)?;
    assert_eq!(back, lib);
    let yaml = Yaml.to_string(&lib)?;
    let back: GdsLibrary = Yaml.from_str(&yaml)?;
    assert_eq!(back, lib);
    Ok(())
}
#[test]
fn empty_lib_to_toml() -> GdsResult<()> {
    let mut lib = GdsLibrary::new("empty");
    let toml = Toml.to_string(&lib)?;
    let back: GdsLibrary = Toml.from_str(&toml)?;
    assert_eq!(back, lib);

    // Element-free structs convert as well
    let mut blank = GdsStruct::new("blank");
    blank.strclass = Some((0, 1));
    lib.add_struct(blank)?;
    lib.add_struct(GdsStruct::new("other"))?;
    let toml = Toml.to_string(&lib)?;
    let back: GdsLibrary = Toml.from_str(&toml)?;
    assert_eq!(back, lib);

    // Elements do not
    assert!(Toml.to_string(&rich_lib()?).is_err());
    Ok(())
}
#[test]
fn read_options_from_files() -> GdsResult<()> {
    let opts: GdsReadOptions = Toml.from_str(
        "
        strict = true
        max_diagnostics = 4
        ",
    )?;
    assert_eq!(
        opts,
        GdsReadOptions {
            strict: true,
            max_diagnostics: Some(4),
        }
    );
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("opts.yaml");
    opts.save_as(Yaml, &path)?;
    assert_eq!(GdsReadOptions::open_inferred(&path)?, opts);
    assert!(GdsReadOptions::open_inferred(dir.path().join("opts.txt")).is_err());
    Ok(())
}
#[test]
fn text_formats() -> GdsResult<()> {
    use crate::ser::{Error, SerializationFormat};
    assert_eq!(SerializationFormat::from_path("lib.JSON"), Some(Json));
    assert_eq!(SerializationFormat::from_path("opts.yml"), Some(Yaml));
    assert_eq!(SerializationFormat::from_path("opts.toml"), Some(Toml));
    assert_eq!(SerializationFormat::from_path("lib.gds"), None);
    assert_eq!(SerializationFormat::from_path("noext"), None);
    match GdsReadOptions::open_inferred("opts.txt") {
        Err(Error::UnknownFormat(p)) => assert_eq!(p, std::path::PathBuf::from("opts.txt")),
        other => panic!("Expected UnknownFormat, got {:?}", other),
    }
    let err = Json.from_str::<GdsReadOptions>("{ strict: ").unwrap_err();
    assert!(matches!(err, Error::Json(_)));
    assert!(err.to_string().starts_with("JSON: "));
    let err = Toml.from_str::<GdsReadOptions>("strict = 3").unwrap_err();
    assert!(matches!(err, Error::TomlRead(_)));
    Ok(())
}
#[test]
fn it_writes_schema() -> GdsResult<()> {
    use schemars::schema_for;
    let schema = schema_for!(GdsLibrary);
    let json = Json.to_string(&schema)?;
    assert!(json.contains("GdsBoundary"));
    assert!(json.contains("GdsCircle"));
    Ok(())
}
