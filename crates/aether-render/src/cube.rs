//! Cube-map face conventions shared by the CPU side and the WGSL programs.
//!
//! Face order is +X, -X, +Y, -Y, +Z, -Z (the wgpu array-layer order for
//! cube views). Texel `(u, v)` has `v` growing downwards.

use glam::Vec3;

pub const CUBE_FACE_COUNT: u32 = 6;

/// Unit direction through texel coordinates `(u, v)` in `[0, 1]` on `face`.
///
/// `environment.wgsl` and `sky.wgsl` implement the same mapping.
pub fn face_uv_to_direction(face: u32, u: f32, v: f32) -> Vec3 {
    let uc = u * 2.0 - 1.0;
    let vc = v * 2.0 - 1.0;
    let dir = match face {
        0 => Vec3::new(1.0, -vc, -uc),
        1 => Vec3::new(-1.0, -vc, uc),
        2 => Vec3::new(uc, 1.0, vc),
        3 => Vec3::new(uc, -1.0, -vc),
        4 => Vec3::new(uc, -vc, 1.0),
        _ => Vec3::new(-uc, -vc, -1.0),
    };
    dir.normalize()
}

/// Number of mip levels a prefiltered cube of `face_size` can hold, capped at `requested`.
pub fn prefilter_mip_count(face_size: u32, requested: u32) -> u32 {
    let full = u32::BITS - face_size.max(1).leading_zeros();
    requested.clamp(1, full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_centers_are_axes() {
        let expected = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ];
        for (face, axis) in expected.iter().enumerate() {
            let dir = face_uv_to_direction(face as u32, 0.5, 0.5);
            assert!((dir - *axis).length() < 1e-6, "face {face}: {dir:?}");
        }
    }

    #[test]
    fn test_directions_are_unit_length() {
        for face in 0..CUBE_FACE_COUNT {
            for (u, v) in [(0.0, 0.0), (1.0, 0.0), (0.25, 0.75), (1.0, 1.0)] {
                let dir = face_uv_to_direction(face, u, v);
                assert!((dir.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_top_row_of_side_faces_looks_up() {
        for face in [0, 1, 4, 5] {
            assert!(face_uv_to_direction(face, 0.5, 0.0).y > 0.0);
            assert!(face_uv_to_direction(face, 0.5, 1.0).y < 0.0);
        }
    }

    #[test]
    fn test_shared_edges_agree() {
        // Right edge of +Z meets left edge of +X.
        let a = face_uv_to_direction(4, 1.0, 0.5);
        let b = face_uv_to_direction(0, 0.0, 0.5);
        assert!((a - b).length() < 1e-6);
    }

    #[test]
    fn test_prefilter_mip_count() {
        assert_eq!(prefilter_mip_count(256, 6), 6);
        assert_eq!(prefilter_mip_count(256, 20), 9);
        assert_eq!(prefilter_mip_count(1, 6), 1);
        assert_eq!(prefilter_mip_count(64, 0), 1);
    }
}
