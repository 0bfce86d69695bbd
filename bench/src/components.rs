//! Common component types used across benchmarks.
//!
//! Sized to be representative of real engine components: small hot structs
//! for movement, a matrix-sized transform, and a rare marker-ish component
//! to produce skewed pool sizes.

use ember_macros::Component;

/// 3D position component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3D velocity component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4x4 transformation matrix (64 bytes).
#[derive(Component, Clone, Copy, Debug)]
pub struct Transform {
    pub matrix: [[f32; 4]; 4],
}

impl Default for Transform {
    fn default() -> Self {
        let mut matrix = [[0.0; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { matrix }
    }
}

/// Skeleton component held by few entities; drives skewed-view scenarios.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Skeleton {
    pub joint_count: u32,
}
