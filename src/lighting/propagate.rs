//! Light propagation: seed, diffuse through air, then light solids from the air beside them.

use rayon::prelude::*;

use crate::core::types::IVec3;
use crate::generation::config::LightParams;
use crate::lighting::seeds;
use crate::voxel::chunk::{ChunkCoord, Face};
use crate::voxel::grid::{Grid3, LightField, VoxelField};

/// Computes a chunk's light field from its carved voxel field.
pub struct LightPropagator {
    params: LightParams,
    seed: u64,
}

impl LightPropagator {
    pub fn new(params: LightParams, seed: u64) -> Self {
        Self { params, seed }
    }

    pub fn params(&self) -> &LightParams {
        &self.params
    }

    /// Full lighting pass. Values stay within `[0, source_intensity]` and
    /// source voxels read exactly `source_intensity`.
    pub fn compute(&self, field: &VoxelField, coord: ChunkCoord) -> LightField {
        let dims = field.dims();
        let source = self.params.source_intensity;
        let mut light = LightField::dark(dims);
        let mut is_source = Grid3::filled(dims, false);

        let sources = seeds::find_sources(field, self.seed, coord, self.params.source_chance);
        for &p in &sources {
            light.set(p, source);
            is_source.set(p, true);
        }
        let boost = (source - self.params.decay * 0.5).max(0.0);
        for &p in &sources {
            for face in Face::ALL {
                let n = p + face.normal();
                if field.get(n) == Some(false) && !is_source.get_or(n, false) {
                    let cur = light.get_or(n, 0.0);
                    light.set(n, cur.max(boost));
                }
            }
        }

        let mut back = light.clone();
        for _ in 0..self.params.propagation_steps {
            self.diffuse(field, &light, &mut back);
            std::mem::swap(&mut light, &mut back);
        }

        let lit = self.illuminate_solids(field, &light, &is_source);
        let out = if self.params.smoothing {
            self.smooth(field, &lit, &is_source)
        } else {
            lit
        };

        log::trace!("Lit chunk {:?}: {} sources, peak {:.3}", coord, sources.len(), out.max_value());
        out
    }

    /// One synchronous round: every air voxel takes the brightest air
    /// neighbor of `prev` minus decay, if that beats its own value.
    fn diffuse(&self, field: &VoxelField, prev: &LightField, next: &mut LightField) {
        let decay = self.params.decay;
        let source = self.params.source_intensity;
        let step = |(i, out): (usize, &mut f32)| {
            let cur = prev.as_slice()[i];
            if field.as_slice()[i] {
                *out = cur;
                return;
            }
            let p = prev.position(i);
            let brightest = max_air_neighbor(field, prev, p);
            *out = cur.max(brightest - decay).clamp(0.0, source);
        };

        if self.params.parallel {
            next.as_mut_slice().par_iter_mut().enumerate().for_each(step);
        } else {
            next.as_mut_slice().iter_mut().enumerate().for_each(step);
        }
    }

    /// Solid voxels take `solid_factor` of their brightest adjacent air.
    fn illuminate_solids(&self, field: &VoxelField, light: &LightField, is_source: &Grid3<bool>) -> LightField {
        let mut out = light.clone();
        let factor = self.params.solid_factor;
        let source = self.params.source_intensity;
        let solid = field.as_slice();
        let sources = is_source.as_slice();

        out.as_mut_slice().par_iter_mut().enumerate().for_each(|(i, v)| {
            if solid[i] && !sources[i] {
                let p = light.position(i);
                *v = (max_air_neighbor(field, light, p) * factor).clamp(0.0, source);
            }
        });
        out
    }

    /// Same-type 3x3x3 box blur, blended with the original value.
    fn smooth(&self, field: &VoxelField, light: &LightField, is_source: &Grid3<bool>) -> LightField {
        let mut out = light.clone();
        let blend = self.params.smoothing_blend;
        let source = self.params.source_intensity;
        let sources = is_source.as_slice();

        out.as_mut_slice().par_iter_mut().enumerate().for_each(|(i, v)| {
            if sources[i] {
                return;
            }
            let p = light.position(i);
            let solid = field.as_slice()[i];
            let mut sum = 0.0;
            let mut count = 0u32;
            for dy in -1..=1 {
                for dz in -1..=1 {
                    for dx in -1..=1 {
                        let q = p + IVec3::new(dx, dy, dz);
                        if field.get(q) == Some(solid) {
                            sum += light.get_or(q, 0.0);
                            count += 1;
                        }
                    }
                }
            }
            // count >= 1: the voxel itself always matches
            let avg = sum / count.max(1) as f32;
            *v = (blend * avg + (1.0 - blend) * *v).clamp(0.0, source);
        });
        out
    }
}

fn max_air_neighbor(field: &VoxelField, light: &LightField, p: IVec3) -> f32 {
    let mut best = 0.0f32;
    for face in Face::ALL {
        let n = p + face.normal();
        if field.get(n) == Some(false) {
            best = best.max(light.get_or(n, 0.0));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::chunk::ChunkDims;

    /// Hollow box: solid shell, air inside.
    fn hollow_box(size: u32) -> VoxelField {
        let dims = ChunkDims::cube(size);
        let mut field = VoxelField::empty(dims);
        let max = size as i32 - 1;
        let positions: Vec<IVec3> = field.iter().map(|(p, _)| p).collect();
        for p in positions {
            let on_shell = p.x == 0 || p.y == 0 || p.z == 0 || p.x == max || p.y == max || p.z == max;
            field.set(p, on_shell);
        }
        field
    }

    fn params() -> LightParams {
        LightParams { source_chance: 0.2, ..Default::default() }
    }

    #[test]
    fn test_light_bounds_and_sources() {
        let field = hollow_box(12);
        let coord = ChunkCoord::new(1, 0, -1);
        let prop = LightPropagator::new(params(), 5);
        let light = prop.compute(&field, coord);

        let sources = seeds::find_sources(&field, 5, coord, 0.2);
        assert!(!sources.is_empty());
        for &p in &sources {
            assert_eq!(light.get(p), Some(1.0));
        }
        for &v in light.as_slice() {
            assert!((0.0..=1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_light_decays_with_distance() {
        let field = hollow_box(16);
        let coord = ChunkCoord::new(0, 0, 0);
        let p = LightParams { smoothing: false, ..params() };
        let light = LightPropagator::new(p.clone(), 3).compute(&field, coord);

        let sources = seeds::find_sources(&field, 3, coord, p.source_chance);
        let air_sources: Vec<_> = sources.iter().filter(|&&s| !field.is_solid(s)).collect();
        assert!(!air_sources.is_empty());

        // Every lit air voxel is no brighter than its nearest source allows
        for (q, &v) in light.iter() {
            if field.is_solid(q) || v == 0.0 {
                continue;
            }
            let nearest = sources
                .iter()
                .map(|s| { let d = (*s - q).abs(); d.x + d.y + d.z })
                .min()
                .unwrap();
            if nearest > 0 {
                assert!(v <= 1.0 - p.decay * 0.5 - p.decay * (nearest - 1) as f32 + 1e-4);
            }
        }
    }

    #[test]
    fn test_solids_take_fraction_of_adjacent_air() {
        let field = hollow_box(10);
        let coord = ChunkCoord::new(0, 2, 0);
        let p = LightParams { smoothing: false, ..params() };
        let light = LightPropagator::new(p, 11).compute(&field, coord);
        let sources = seeds::find_sources(&field, 11, coord, 0.2);

        // Inner face of the shell
        let wall = IVec3::new(0, 5, 5);
        if !sources.contains(&wall) {
            let air = light.get_or(IVec3::new(1, 5, 5), 0.0);
            assert!((light.get_or(wall, 0.0) - 0.7 * air).abs() < 1e-5);
        }
        // Shell corners touch no air
        assert_eq!(light.get(IVec3::ZERO), Some(0.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let field = hollow_box(12);
        let coord = ChunkCoord::new(3, 3, 3);
        let a = LightPropagator::new(LightParams { parallel: true, ..params() }, 1).compute(&field, coord);
        let b = LightPropagator::new(LightParams { parallel: false, ..params() }, 1).compute(&field, coord);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_no_sources_stays_dark() {
        let field = VoxelField::empty(ChunkDims::cube(8));
        let light = LightPropagator::new(params(), 1).compute(&field, ChunkCoord::new(0, 0, 0));
        assert_eq!(light.max_value(), 0.0);
    }
}
