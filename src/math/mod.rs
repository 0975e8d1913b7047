//! Integer lattice math

pub mod aabb;

pub use aabb::GridAabb;

use crate::core::types::IVec3;

/// Component-wise floor division (rounds toward negative infinity)
pub fn floor_div(v: IVec3, d: IVec3) -> IVec3 {
    IVec3::new(v.x.div_euclid(d.x), v.y.div_euclid(d.y), v.z.div_euclid(d.z))
}

/// Component-wise non-negative remainder matching [`floor_div`]
pub fn floor_mod(v: IVec3, d: IVec3) -> IVec3 {
    IVec3::new(v.x.rem_euclid(d.x), v.y.rem_euclid(d.y), v.z.rem_euclid(d.z))
}

/// Mix a seed with a salt into a well-distributed 64-bit value (splitmix64 finalizer)
pub fn mix_seed(seed: u64, salt: u64) -> u64 {
    let mut z = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash a lattice position under a seed
pub fn hash_cell(seed: u64, p: IVec3) -> u64 {
    let h = mix_seed(seed, p.x as u32 as u64);
    let h = mix_seed(h, p.y as u32 as u64);
    mix_seed(h, p.z as u32 as u64)
}
