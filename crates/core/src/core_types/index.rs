//! 3D index arithmetic: flattening, expansion and axis neighbours.
//!
//! The vertical axis is `y`: `up` is `y + 1`, `down` is `y - 1`. `east`/`west`
//! step along `x` and `north`/`south` along `z`, so the horizontal plane is
//! spanned by the `x` and `z` axes.
//!
//! Neighbour functions never bounds-check; a neighbour outside the grid is
//! simply an index for which [`flatten`] returns `None`.

use nalgebra::Vector3;

/// Signed 3D cell position; negative components are valid "outside" indices
pub type GridIndex = Vector3<i32>;

/// Grid extents along x, y and z
pub type SpaceSize = Vector3<i32>;

/// Grid axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Total number of cells for a space size
///
/// `None` if any extent is non-positive or the cell count overflows `usize`.
#[inline]
pub fn volume(size: &SpaceSize) -> Option<usize> {
    if size.iter().any(|&extent| extent <= 0) {
        return None;
    }
    (size.x as usize)
        .checked_mul(size.y as usize)?
        .checked_mul(size.z as usize)
}

#[inline]
pub fn is_in_space(index: &GridIndex, size: &SpaceSize) -> bool {
    (0..size.x).contains(&index.x) && (0..size.y).contains(&index.y) && (0..size.z).contains(&index.z)
}

/// Flat storage offset `x + y*sx + z*sx*sy`, or `None` outside the grid or
/// when the offset does not fit in `usize`
#[inline]
pub fn flatten(index: &GridIndex, size: &SpaceSize) -> Option<usize> {
    if !is_in_space(index, size) {
        return None;
    }
    let sx = size.x as usize;
    let sxy = sx.checked_mul(size.y as usize)?;
    // x + y*sx < sxy, so only the z term can overflow
    (index.z as usize)
        .checked_mul(sxy)?
        .checked_add(index.x as usize + index.y as usize * sx)
}

/// Inverse of [`flatten`]
#[inline]
pub fn expand(flat: usize, size: &SpaceSize) -> Option<GridIndex> {
    if flat >= volume(size)? {
        return None;
    }
    let sx = size.x as usize;
    let sxy = sx * size.y as usize;
    let z = flat / sxy;
    let y = (flat % sxy) / sx;
    let x = flat % sx;
    Some(GridIndex::new(x as i32, y as i32, z as i32))
}

#[inline]
pub fn up(index: &GridIndex) -> GridIndex {
    GridIndex::new(index.x, index.y + 1, index.z)
}

#[inline]
pub fn down(index: &GridIndex) -> GridIndex {
    GridIndex::new(index.x, index.y - 1, index.z)
}

#[inline]
pub fn east(index: &GridIndex) -> GridIndex {
    GridIndex::new(index.x + 1, index.y, index.z)
}

#[inline]
pub fn west(index: &GridIndex) -> GridIndex {
    GridIndex::new(index.x - 1, index.y, index.z)
}

#[inline]
pub fn north(index: &GridIndex) -> GridIndex {
    GridIndex::new(index.x, index.y, index.z + 1)
}

#[inline]
pub fn south(index: &GridIndex) -> GridIndex {
    GridIndex::new(index.x, index.y, index.z - 1)
}

/// The two neighbours along an axis, positive direction first
#[inline]
pub fn axis_neighbours(index: &GridIndex, axis: Axis) -> [GridIndex; 2] {
    match axis {
        Axis::X => [east(index), west(index)],
        Axis::Y => [up(index), down(index)],
        Axis::Z => [north(index), south(index)],
    }
}

/// All six face neighbours: up, down, east, west, north, south
#[inline]
pub fn neighbours(index: &GridIndex) -> [GridIndex; 6] {
    [
        up(index),
        down(index),
        east(index),
        west(index),
        north(index),
        south(index),
    ]
}

/// The four neighbours in the horizontal (x/z) plane
#[inline]
pub fn horizontal_neighbours(index: &GridIndex) -> [GridIndex; 4] {
    [east(index), west(index), north(index), south(index)]
}

/// Every index in the box `start..=end_inclusive`, x varying fastest
pub fn range(start: GridIndex, end_inclusive: GridIndex) -> impl Iterator<Item = GridIndex> {
    (start.z..=end_inclusive.z).flat_map(move |z| {
        (start.y..=end_inclusive.y)
            .flat_map(move |y| (start.x..=end_inclusive.x).map(move |x| GridIndex::new(x, y, z)))
    })
}
