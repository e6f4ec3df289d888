//!
//! # Gdstream Hierarchy Flattening
//!
//! Resolution of struct and array references into absolutely-positioned primitives.
//!
//! Only the translation of each reference is applied.
//! Reflection, rotation, and magnification ([GdsStrans]) are carried by the data model,
//! but do not alter flattened coordinates.
//!

// Std-Lib Imports
use std::collections::HashMap;

// Crates.io
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::data::*;
use crate::error::{GdsError, GdsResult};

/// # Flattened Shape
/// Geometry of one [GdsPrimitive], in absolute library coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum GdsShape {
    /// Closed polygon, from a [GdsBoundary] or [GdsBox].
    /// The final point repeats the first.
    Polygon { xy: Vec<GdsPoint> },
    /// Stroked polyline, from a [GdsPath]
    Polyline {
        xy: Vec<GdsPoint>,
        width: i32,
        end_cap: GdsPathType,
    },
    /// Text label, from a [GdsTextElem]
    Label {
        xy: GdsPoint,
        string: String,
        horiz: GdsHorizAlign,
        vert: GdsVertAlign,
    },
    /// Electrical node, from a [GdsNode]
    Node { xy: Vec<GdsPoint> },
    /// Circle, ellipse, or arc, from a [GdsCircle]
    Circle {
        center: GdsPoint,
        radii: GdsPoint,
        /// Start and end angles, for arcs
        arc: Option<GdsPoint>,
        ellipse: bool,
        filled: bool,
        width: i32,
    },
}

/// # Flattened Primitive
/// A leaf element, tagged with its layer and data-type, placed in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GdsPrimitive {
    /// Layer Number
    pub layer: i16,
    /// DataType (or TextType, NodeType, etc.) ID Number
    pub xtype: i16,
    /// Geometry
    pub shape: GdsShape,
}
impl GdsPrimitive {
    /// Create from leaf element `elem`, shifted by `offset`.
    /// Returns `None` for references.
    pub fn from_elem(elem: &GdsElement, offset: &GdsPoint) -> GdsResult<Option<Self>> {
        let shift = |pts: &[GdsPoint]| -> GdsResult<Vec<GdsPoint>> {
            pts.iter().map(|p| p.shift(offset)).collect()
        };
        let spec = match elem.layerspec() {
            Some(spec) => spec,
            None => return Ok(None),
        };
        let shape = match elem {
            GdsElement::GdsBoundary(b) => GdsShape::Polygon { xy: shift(&b.xy)? },
            GdsElement::GdsBox(b) => GdsShape::Polygon { xy: shift(&b.xy)? },
            GdsElement::GdsPath(p) => GdsShape::Polyline {
                xy: shift(&p.xy)?,
                width: p.width(),
                end_cap: p.end_cap(),
            },
            GdsElement::GdsTextElem(t) => GdsShape::Label {
                xy: t.xy.shift(offset)?,
                string: t.string.clone(),
                horiz: t.horiz(),
                vert: t.vert(),
            },
            GdsElement::GdsNode(n) => GdsShape::Node { xy: shift(&n.xy)? },
            GdsElement::GdsCircle(c) => GdsShape::Circle {
                center: c.center.shift(offset)?,
                radii: c.radii,
                arc: c.arc_angles(),
                ellipse: c.flags.is_ellipse(),
                filled: c.flags.is_filled(),
                width: c.width(),
            },
            GdsElement::GdsStructRef(_) | GdsElement::GdsArrayRef(_) => return Ok(None),
        };
        Ok(Some(Self {
            layer: spec.layer,
            xtype: spec.xtype,
            shape,
        }))
    }
    /// Our points, in order
    pub fn points(&self) -> Vec<GdsPoint> {
        match &self.shape {
            GdsShape::Polygon { xy } | GdsShape::Polyline { xy, .. } | GdsShape::Node { xy } => {
                xy.clone()
            }
            GdsShape::Label { xy, .. } => vec![*xy],
            GdsShape::Circle { center, .. } => vec![*center],
        }
    }
}

/// Remaining cells of an array reference, in row-major order.
/// Arithmetic runs in `i64`, and each cell is narrowed back to `i32` as it is produced.
struct ArrayCells<'lib> {
    target: &'lib GdsStruct,
    origin: (i64, i64),
    col: (i64, i64),
    row: (i64, i64),
    cols: i64,
    rows: i64,
    next: i64,
}
impl<'lib> ArrayCells<'lib> {
    /// Array cells of `aref`, placed relative to `offset`.
    /// Pitches are truncated to integer coordinates, so non-exact divisions drift across the array.
    fn new(target: &'lib GdsStruct, offset: &GdsPoint, aref: &GdsArrayRef) -> Self {
        let [origin, colpt, rowpt] = aref.xy;
        let (cols, rows) = (aref.cols as i64, aref.rows as i64);
        let wide = |p: GdsPoint| (p.x as i64, p.y as i64);
        let (ox, oy) = wide(origin);
        // Zero counts make for an empty array
        let pitch = |(x, y): (i64, i64), n: i64| {
            (x.checked_div(n).unwrap_or(0), y.checked_div(n).unwrap_or(0))
        };
        Self {
            target,
            origin: (ox + offset.x as i64, oy + offset.y as i64),
            col: pitch((wide(colpt).0 - ox, wide(colpt).1 - oy), cols),
            row: pitch((wide(rowpt).0 - ox, wide(rowpt).1 - oy), rows),
            cols,
            rows,
            next: 0,
        }
    }
}
impl Iterator for ArrayCells<'_> {
    type Item = GdsResult<GdsPoint>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.cols * self.rows {
            return None;
        }
        let (i, j) = (self.next / self.cols, self.next % self.cols);
        self.next += 1;
        Some(GdsPoint::from_wide(
            self.origin.0 + i * self.row.0 + j * self.col.0,
            self.origin.1 + i * self.row.1 + j * self.col.1,
        ))
    }
}

/// One struct being walked
struct Frame<'lib> {
    strukt: &'lib GdsStruct,
    offset: GdsPoint,
    /// Index of the next element to visit
    elem: usize,
    /// Array reference in progress, if any
    array: Option<ArrayCells<'lib>>,
}

///
/// # Gds Flattener
///
/// Lazy, depth-first iterator over the [GdsPrimitive]s of one or more structs.
/// Created by [GdsLibrary::flatten] and friends.
///
/// References are resolved by name as they are reached.
/// A missing struct yields [GdsError::DanglingReference],
/// and a struct which (transitively) instantiates itself yields [GdsError::ReferenceCycle].
/// Placements which push a coordinate outside the `i32` range yield [GdsError::CoordinateOverflow].
/// Primitives produced before an error remain valid.
/// The iterator ends after the first error.
///
pub struct GdsFlattener<'lib> {
    lib: &'lib GdsLibrary,
    index: HashMap<&'lib str, &'lib GdsStruct>,
    /// Remaining starting-struct names
    roots: std::vec::IntoIter<String>,
    stack: Vec<Frame<'lib>>,
    failed: bool,
}
impl<'lib> GdsFlattener<'lib> {
    /// Create a flattener over structs `roots` of `lib`
    pub fn new(lib: &'lib GdsLibrary, roots: Vec<String>) -> Self {
        Self {
            lib,
            index: lib.index(),
            roots: roots.into_iter(),
            stack: Vec::new(),
            failed: false,
        }
    }
    /// Look up the struct named `name`, referred to from `referrer`
    fn resolve(&self, name: &str, referrer: &str) -> GdsResult<&'lib GdsStruct> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GdsError::DanglingReference {
                name: name.to_string(),
                referrer: referrer.to_string(),
            })
    }
    /// Push a walk of `target` at `offset`, unless it is already being walked
    fn descend(&mut self, target: &'lib GdsStruct, offset: GdsPoint) -> GdsResult<()> {
        if self.stack.iter().any(|f| f.strukt.name == target.name) {
            let mut stack: Vec<String> = self.stack.iter().map(|f| f.strukt.name.clone()).collect();
            stack.push(target.name.clone());
            return Err(GdsError::ReferenceCycle { stack });
        }
        debug!(
            "Flattening {} at ({}, {}), depth {}",
            target.name,
            offset.x,
            offset.y,
            self.stack.len()
        );
        self.stack.push(Frame {
            strukt: target,
            offset,
            elem: 0,
            array: None,
        });
        Ok(())
    }
    /// Record failure `e`, ending iteration
    fn fail(&mut self, e: GdsError) -> Option<GdsResult<GdsPrimitive>> {
        self.failed = true;
        self.stack.clear();
        Some(Err(e))
    }
}
impl<'lib> Iterator for GdsFlattener<'lib> {
    type Item = GdsResult<GdsPrimitive>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let top = match self.stack.last_mut() {
                Some(top) => top,
                None => {
                    // Start the next root, or finish
                    let name = self.roots.next()?;
                    let res = self
                        .resolve(&name, &self.lib.name)
                        .and_then(|target| self.descend(target, GdsPoint::default()));
                    if let Err(e) = res {
                        return self.fail(e);
                    }
                    continue;
                }
            };
            // Continue any array in progress
            if let Some(cells) = top.array.as_mut() {
                match cells.next() {
                    Some(offset) => {
                        let target = cells.target;
                        if let Err(e) = offset.and_then(|offset| self.descend(target, offset)) {
                            return self.fail(e);
                        }
                        continue;
                    }
                    None => top.array = None,
                }
            }
            let strukt = top.strukt;
            let offset = top.offset;
            let elem = strukt.elems.get(top.elem);
            top.elem += 1;
            let elem = match elem {
                Some(elem) => elem,
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            match elem {
                GdsElement::GdsStructRef(sref) => {
                    let res = self
                        .resolve(&sref.name, &strukt.name)
                        .and_then(|target| self.descend(target, sref.xy.shift(&offset)?));
                    if let Err(e) = res {
                        return self.fail(e);
                    }
                }
                GdsElement::GdsArrayRef(aref) => {
                    let target = match self.resolve(&aref.name, &strukt.name) {
                        Ok(target) => target,
                        Err(e) => return self.fail(e),
                    };
                    if let Some(top) = self.stack.last_mut() {
                        top.array = Some(ArrayCells::new(target, &offset, aref));
                    }
                }
                _ => match GdsPrimitive::from_elem(elem, &offset) {
                    Ok(Some(prim)) => return Some(Ok(prim)),
                    Ok(None) => (),
                    Err(e) => return self.fail(e),
                },
            }
        }
    }
}
