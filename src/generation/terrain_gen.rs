//! Terrain classifier: turns a chunk coordinate into a solid/air field.
//!
//! Density is a low-octave fractal noise of world position, scaled by a
//! vertical bias that peaks partway up each chunk layer. Samples are taken on
//! a world-aligned lattice and broadcast to their stride block, then a few
//! 3x3x3 majority passes smooth the result into cave-like blobs.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::core::types::IVec3;
use crate::generation::config::TerrainParams;
use crate::math::floor_div;
use crate::voxel::chunk::{ChunkCoord, ChunkDims};
use crate::voxel::grid::VoxelField;

/// Solid neighbors (out of at most 27, self included) needed to stay solid.
pub const SMOOTHING_THRESHOLD: u32 = 14;

/// Deterministic density classifier for one world.
pub struct TerrainClassifier {
    params: TerrainParams,
    dims: ChunkDims,
    noise: Fbm<Perlin>,
}

impl TerrainClassifier {
    pub fn new(params: TerrainParams, dims: ChunkDims, seed: u64) -> Self {
        let noise = Fbm::<Perlin>::new(fold_seed(seed))
            .set_octaves(params.octaves)
            .set_persistence(0.5)
            .set_lacunarity(2.0);

        Self { params, dims, noise }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Cells of context classified beyond each chunk face.
    pub fn halo(&self) -> i32 {
        if self.params.boundary_halo {
            self.params.smoothing_iterations as i32
        } else {
            0
        }
    }

    /// Vertical density multiplier for a world row, peaking at `bias_peak`.
    pub fn vertical_bias(&self, world_y: i32) -> f32 {
        let height = self.dims.y as i32;
        let local_y = world_y.rem_euclid(height) as f32;
        let frac = local_y / (height - 1).max(1) as f32;
        (1.0 - self.params.bias_strength * (frac - self.params.bias_peak).abs()).clamp(0.0, 1.0)
    }

    /// Biased density in `[0, 1]` at a world voxel position.
    pub fn density_at(&self, world: IVec3) -> f32 {
        let s = self.params.noise_scale;
        let o = self.params.noise_offset;
        let n = self.noise.get([
            world.x as f64 * s + o,
            world.y as f64 * s + o,
            world.z as f64 * s + o,
        ]);
        let n01 = ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
        n01 * self.vertical_bias(world.y)
    }

    /// Classify one chunk.
    pub fn classify(&self, coord: ChunkCoord) -> VoxelField {
        let halo = self.halo();
        let region_dims = ChunkDims::new(
            self.dims.x + 2 * halo as u32,
            self.dims.y + 2 * halo as u32,
            self.dims.z + 2 * halo as u32,
        );
        let region_origin = coord.world_origin(self.dims) - IVec3::splat(halo);

        let mut field = self.sweep(region_origin, region_dims);
        for _ in 0..self.params.smoothing_iterations {
            field = smooth_step(&field);
        }

        if halo == 0 {
            field
        } else {
            field.crop(IVec3::splat(halo), self.dims)
        }
    }

    /// Threshold the lattice samples and broadcast each over its stride block.
    fn sweep(&self, origin: IVec3, dims: ChunkDims) -> VoxelField {
        let stride = IVec3::splat(self.params.sample_stride as i32);
        let mut field = VoxelField::empty(dims);
        let region_max = origin + dims.as_ivec3() - IVec3::ONE;

        let first = floor_div(origin, stride) * stride;
        let mut anchor = first;
        while anchor.y <= region_max.y {
            anchor.z = first.z;
            while anchor.z <= region_max.z {
                anchor.x = first.x;
                while anchor.x <= region_max.x {
                    if self.density_at(anchor) > self.params.fill_threshold {
                        self.fill_block(&mut field, origin, anchor, stride);
                    }
                    anchor.x += stride.x;
                }
                anchor.z += stride.z;
            }
            anchor.y += stride.y;
        }
        field
    }

    fn fill_block(&self, field: &mut VoxelField, origin: IVec3, anchor: IVec3, stride: IVec3) {
        let lo = (anchor - origin).max(IVec3::ZERO);
        let hi = (anchor - origin + stride).min(field.dims().as_ivec3());
        for y in lo.y..hi.y {
            for z in lo.z..hi.z {
                for x in lo.x..hi.x {
                    field.set(IVec3::new(x, y, z), true);
                }
            }
        }
    }
}

/// One cellular-automaton pass: a cell is solid iff at least
/// [`SMOOTHING_THRESHOLD`] of its in-bounds 3x3x3 neighbors are solid.
///
/// Reads `field` and writes a fresh grid, so the result never depends on
/// visiting order.
pub fn smooth_step(field: &VoxelField) -> VoxelField {
    let dims = field.dims();
    let mut out = VoxelField::empty(dims);
    let max = dims.as_ivec3() - IVec3::ONE;

    for i in 0..field.len() {
        let p = field.position(i);
        let lo = (p - IVec3::ONE).max(IVec3::ZERO);
        let hi = (p + IVec3::ONE).min(max);

        let mut solid = 0;
        for y in lo.y..=hi.y {
            for z in lo.z..=hi.z {
                for x in lo.x..=hi.x {
                    if field.is_solid(IVec3::new(x, y, z)) {
                        solid += 1;
                    }
                }
            }
        }
        if solid >= SMOOTHING_THRESHOLD {
            out.as_mut_slice()[i] = true;
        }
    }
    out
}

/// Noise crates take 32-bit seeds.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
