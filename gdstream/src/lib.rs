//!
//! # Gdstream: GDSII Stream-Format Reading, Writing & Flattening
//!
//! GDSII is the IC industry's de facto standard for storing and sharing layout data.
//! Gdstream reads and writes GDSII stream data, and resolves its cell hierarchy
//! into flat, absolutely-positioned geometry for rendering and similar consumers.
//! Layout data is stored on GDSII's terms, using GDSII's idioms and naming conventions.
//!
//! Layout data is represented in three primary forms:
//!
//! * A short tree with three layers:
//!   * The root is a [GdsLibrary], which primarily consists of a set of cells ([GdsStruct]s), and secondarily a set of metadata.
//!     Each [GdsLibrary] is a universe unto itself, in that it has no mechanisms for comprehending layout cells or data defined outside itself.
//!   * Libraries consist of cell definitions AKA [GdsStruct]s.
//!   * Cells consist of [GdsElement]s, an enumeration which includes individual polygons ([GdsBoundary]),
//!     instances of other layout cells ([GdsStructRef], [GdsArrayRef]), text ([GdsTextElem]), and a few other geometric elements.
//! * For storage, the [GdsLibrary] tree is flattened to a series of [GdsRecord]s,
//!   each of which marks the beginning, end, or content of a tree-node.
//! * On the wire, each record is a frame of length, record-type, data-type, and payload bytes.
//!   The [GdsCursor] yields these as [GdsRawRecord]s, and [GdsWriter::write_raw] re-emits them unchanged.
//!
//! References between cells are by name, and are resolved only when needed,
//! e.g. by the [GdsFlattener] produced by [GdsLibrary::flatten].
//!
//! ## Diagnostics
//!
//! Some conditions, such as a record carrying the wrong data-type tag, are not fatal.
//! These are logged via the [log] facade as warnings, and collected as [GdsDiagnostic]s,
//! available from [GdsLibrary::read_with_options].
//! Setting [GdsReadOptions::strict] turns the first of them into an error.
//!
//! ## Usage
//!
//! Loading a [GdsLibrary] from disk:
//!
//! ```skip
//! let lib = GdsLibrary::open("sample.gds")?;
//! ```
//!
//! Creating a new and empty [GdsLibrary], and adding a [GdsStruct] cell-definition:
//!
//! ```
//! use gdstream::{GdsLibrary, GdsStruct};
//! let mut lib = GdsLibrary::new("mylib");
//! lib.add_struct(GdsStruct::new("mycell")).unwrap();
//! ```
//!
//! Saving a [GdsLibrary] to disk:
//!
//! ```skip
//! lib.save("mylib.gds")?;
//! ```
//!
//! Flattening a cell into primitives:
//!
//! ```skip
//! for prim in lib.flatten("top") {
//!     let prim = prim?;
//!     println!("{} {:?}", prim.layer, prim.points());
//! }
//! ```
//!
//! Converting a [GdsLibrary] to JSON, YAML, or TOML.
//! TOML handles element-free libraries only.
//!
//! ```
//! use gdstream::SerializationFormat::{Json, Toml, Yaml};
//! use gdstream::{GdsLibrary, GdsStruct};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut lib = GdsLibrary::new("mylib");
//! lib.add_struct(GdsStruct::new("mycell"))?;
//! let json = Json.to_string(&lib)?;
//! let yaml = Yaml.to_string(&lib)?;
//! let toml = Toml.to_string(&lib)?;
//! let back: GdsLibrary = Toml.from_str(&toml)?;
//! assert_eq!(back, lib);
//! # Ok(())
//! # }
//! ```
//!

// Modules
pub mod data;
pub mod error;
pub mod flatten;
pub mod float;
pub mod read;
pub mod records;
pub mod ser;
pub mod write;

// Re-exports
pub use data::*;
pub use error::*;
pub use flatten::{GdsFlattener, GdsPrimitive, GdsShape};
pub use float::{decode_real, encode_real, GdsFloat64};
pub use read::{GdsCursor, GdsParser, GdsReadOptions, GdsReadOptionsBuilder};
pub use records::{GdsDataType, GdsRawRecord, GdsRecord, GdsRecordType};
pub use ser::{SerdeFile, SerializationFormat};
pub use write::{GdsWriter, ToRecords};

#[cfg(test)]
mod tests;
