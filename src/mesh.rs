//! Face records and the conversion between decoded face lists and the
//! topology representations handed to the user: polygons, triangles and
//! grids.

use std::ops;

use derive_more::{From, Into};

use crate::{
    io::{Error, Primitive, PrimitiveType},
    prop::{Element, FaceField, FieldShape, GridField, Value},
};




// ===========================================================================
// ===== Records
// ===========================================================================

/// One element of the `face` group: a polygon as list of vertex indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    pub vertex_indices: Vec<u32>,
}

/// One element of the `grid` group: one row of the grid. `-1` marks an empty
/// cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    pub vertex_indices: Vec<i32>,
}

/// Converts a list of values to `T`. The values already have to have type
/// `T`.
fn list_from_value<T: Primitive>(name: &str, value: Value) -> Result<Vec<T>, Error> {
    match value {
        Value::List(list) => {
            list.into_iter()
                .map(|v| {
                    T::from_primitive_value(v).ok_or(Error::UnsupportedConversion {
                        from: v.ty(),
                        to: T::TY,
                    })
                })
                .collect()
        }
        Value::Scalar(_) => Err(Error::invalid_descriptor(name, "expected a list value")),
    }
}

fn list_to_value<T: Primitive>(list: &[T]) -> Value {
    Value::List(list.iter().map(|v| v.to_primitive_value()).collect())
}

impl Element for Face {
    type Field = FaceField;

    fn field_shape(_: FaceField) -> Option<FieldShape> {
        Some(FieldShape::List(PrimitiveType::Uint32))
    }

    fn field(&self, _: FaceField) -> Option<Value> {
        Some(list_to_value(&self.vertex_indices))
    }

    fn set_field(&mut self, _: FaceField, value: Value) -> Result<(), Error> {
        self.vertex_indices = list_from_value("vertex_indices", value)?;
        Ok(())
    }
}

impl Element for GridRow {
    type Field = GridField;

    fn field_shape(_: GridField) -> Option<FieldShape> {
        Some(FieldShape::List(PrimitiveType::Int32))
    }

    fn field(&self, _: GridField) -> Option<Value> {
        Some(list_to_value(&self.vertex_indices))
    }

    fn set_field(&mut self, _: GridField, value: Value) -> Result<(), Error> {
        self.vertex_indices = list_from_value("vertex_indices", value)?;
        Ok(())
    }
}

/// The three vertex indices of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct TriangleIndex(pub [u32; 3]);

impl From<TriangleIndex> for Face {
    fn from(src: TriangleIndex) -> Self {
        Face { vertex_indices: src.0.to_vec() }
    }
}

impl From<Vec<u32>> for Face {
    fn from(vertex_indices: Vec<u32>) -> Self {
        Face { vertex_indices }
    }
}


// ===========================================================================
// ===== Assembling
// ===========================================================================

/// Makes sure all indices are `< vertex_count`.
pub(crate) fn check_face_indices(faces: &[Face], vertex_count: usize) -> Result<(), Error> {
    for (i, face) in faces.iter().enumerate() {
        let invalid = face.vertex_indices.iter().find(|&&idx| idx as usize >= vertex_count);
        if let Some(&index) = invalid {
            return Err(Error::IndexOutOfRange {
                face: i,
                index: index.into(),
                vertex_count,
            });
        }
    }

    Ok(())
}

/// Returns the index lists of all faces unchanged. Fails if any index is
/// `>= vertex_count`.
pub fn assemble_polygons(faces: Vec<Face>, vertex_count: usize) -> Result<Vec<Vec<u32>>, Error> {
    check_face_indices(&faces, vertex_count)?;
    Ok(faces.into_iter().map(|f| f.vertex_indices).collect())
}

/// Converts faces with exactly three indices to [`TriangleIndex`]. Any other
/// face is an error: this does *not* triangulate.
pub fn assemble_triangles(faces: &[Face]) -> Result<Vec<TriangleIndex>, Error> {
    faces.iter()
        .enumerate()
        .map(|(i, face)| match face.vertex_indices[..] {
            [a, b, c] => Ok(TriangleIndex([a, b, c])),
            _ => Err(Error::NonTriangularFace { face: i, len: face.vertex_indices.len() }),
        })
        .collect()
}


// ===========================================================================
// ===== Grid
// ===========================================================================

/// A dense, row-major 2D array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a `width × height` grid with all cells set to `value`.
    pub fn new(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Creates a grid from row-major `data`. Panics if
    /// `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "grid data does not match its size");
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            self.data.get_mut(y * self.width + x)
        } else {
            None
        }
    }

    /// Iterates over all rows from top (`y = 0`) to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        let width = self.width;
        (0..self.height).map(move |y| &self.data[y * width..(y + 1) * width])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    /// Indexes with `(x, y)`. Panics if out of bounds.
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        assert!(x < self.width && y < self.height, "grid index ({}, {}) out of bounds", x, y);
        &self.data[y * self.width + x]
    }
}

impl<T> ops::IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        assert!(x < self.width && y < self.height, "grid index ({}, {}) out of bounds", x, y);
        &mut self.data[y * self.width + x]
    }
}

/// Builds a grid of vertex indices from its rows.
///
/// All rows need the same length. Each cell is either `-1` (empty) or a
/// valid vertex index.
pub fn assemble_grid(rows: Vec<GridRow>, vertex_count: usize) -> Result<Grid<i32>, Error> {
    let height = rows.len();
    let width = rows.first().map(|r| r.vertex_indices.len()).unwrap_or(0);

    let mut data = Vec::with_capacity(width * height);
    for (y, row) in rows.into_iter().enumerate() {
        if row.vertex_indices.len() != width {
            return Err(Error::RaggedGrid { row: y, len: row.vertex_indices.len(), width });
        }

        check_grid_row(y, &row.vertex_indices, vertex_count)?;
        data.extend(row.vertex_indices);
    }

    Ok(Grid { width, height, data })
}

/// Makes sure every cell is `-1` or `< vertex_count`.
pub(crate) fn check_grid_indices(grid: &Grid<i32>, vertex_count: usize) -> Result<(), Error> {
    grid.rows()
        .enumerate()
        .try_for_each(|(y, row)| check_grid_row(y, row, vertex_count))
}

fn check_grid_row(y: usize, row: &[i32], vertex_count: usize) -> Result<(), Error> {
    let invalid = row.iter()
        .find(|&&index| index < -1 || (index >= 0 && index as usize >= vertex_count));
    match invalid {
        Some(&index) => Err(Error::IndexOutOfRange { face: y, index: index.into(), vertex_count }),
        None => Ok(()),
    }
}

/// The inverse of [`assemble_grid`].
pub fn grid_rows(grid: &Grid<i32>) -> Vec<GridRow> {
    grid.rows()
        .map(|row| GridRow { vertex_indices: row.to_vec() })
        .collect()
}
