//! Dense per-chunk voxel grids
//!
//! Both the solid/air field and the light field are stored as flat arrays in
//! x-fastest order (`index = (y * dz + z) * dx + x`), which keeps a horizontal
//! row contiguous and lets the light propagator split rounds across threads by
//! flat index.

use crate::core::types::IVec3;
use crate::voxel::chunk::ChunkDims;

/// Dense 3D array of `T` covering one chunk (or one chunk plus a halo)
#[derive(Clone, Debug, PartialEq)]
pub struct Grid3<T> {
    dims: ChunkDims,
    data: Vec<T>,
}

/// Solid/air field: `true` = solid
pub type VoxelField = Grid3<bool>;

/// Per-voxel light intensity in `[0, source_intensity]`
pub type LightField = Grid3<f32>;

impl<T: Copy> Grid3<T> {
    /// Create a grid with every cell set to `value`
    pub fn filled(dims: ChunkDims, value: T) -> Self {
        Self { dims, data: vec![value; dims.volume()] }
    }

    /// Set every cell to `value`, keeping the allocation
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Value at a local position; `None` if out of bounds
    #[inline]
    pub fn get(&self, p: IVec3) -> Option<T> {
        if self.dims.contains(p) {
            Some(self.data[self.index(p)])
        } else {
            None
        }
    }

    /// Value at a local position, or `default` if out of bounds
    #[inline]
    pub fn get_or(&self, p: IVec3, default: T) -> T {
        self.get(p).unwrap_or(default)
    }

    /// Set a cell; returns false if `p` is out of bounds
    #[inline]
    pub fn set(&mut self, p: IVec3, value: T) -> bool {
        if self.dims.contains(p) {
            let i = self.index(p);
            self.data[i] = value;
            true
        } else {
            false
        }
    }

    /// Copy the contents of another grid with identical dimensions
    pub fn copy_from(&mut self, other: &Grid3<T>) {
        debug_assert_eq!(self.dims, other.dims);
        self.data.copy_from_slice(&other.data);
    }
}

impl<T> Grid3<T> {
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Flat index of an in-bounds local position
    #[inline]
    pub fn index(&self, p: IVec3) -> usize {
        let d = &self.dims;
        (p.y as usize * d.z as usize + p.z as usize) * d.x as usize + p.x as usize
    }

    /// Local position of a flat index
    #[inline]
    pub fn position(&self, index: usize) -> IVec3 {
        let d = &self.dims;
        let x = index % d.x as usize;
        let rest = index / d.x as usize;
        let z = rest % d.z as usize;
        let y = rest / d.z as usize;
        IVec3::new(x as i32, y as i32, z as i32)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate `(local position, &value)` in flat order
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (self.position(i), v))
    }
}

impl VoxelField {
    /// Fully empty (all air) field
    pub fn empty(dims: ChunkDims) -> Self {
        Self::filled(dims, false)
    }

    #[inline]
    pub fn is_solid(&self, p: IVec3) -> bool {
        self.get_or(p, false)
    }

    pub fn solid_count(&self) -> usize {
        self.data.iter().filter(|&&s| s).count()
    }

    /// Copy out a sub-box starting at `offset` with the given dimensions
    pub fn crop(&self, offset: IVec3, dims: ChunkDims) -> VoxelField {
        let mut out = VoxelField::empty(dims);
        for i in 0..out.len() {
            let p = out.position(i);
            out.data[i] = self.is_solid(p + offset);
        }
        out
    }
}

impl LightField {
    /// Fully dark field
    pub fn dark(dims: ChunkDims) -> Self {
        Self::filled(dims, 0.0)
    }

    /// Raw bytes of the intensity buffer, e.g. for a 3D texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(0.0, f32::max)
    }
}
