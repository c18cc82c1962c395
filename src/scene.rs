use glam::Vec3;

use crate::config::{SceneConfig, SceneVariant};

/// Horizontal distance between neighbouring objects
pub const OBJECT_SPACING: f32 = 4.0;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const BACKGROUND: [f32; 3] = [0.02, 0.02, 0.03];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryKind {
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cuboid {
        size: f32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl GeometryKind {
    pub const TORUS_KNOT: Self = GeometryKind::TorusKnot {
        radius: 1.0,
        tube: 0.4,
        tubular_segments: 100,
        radial_segments: 16,
        p: 2,
        q: 3,
    };
    pub const SPHERE: Self = GeometryKind::Sphere {
        radius: 1.2,
        width_segments: 32,
        height_segments: 16,
    };
    pub const CUBOID: Self = GeometryKind::Cuboid { size: 1.8 };
    pub const TORUS: Self = GeometryKind::Torus {
        radius: 1.0,
        tube: 0.4,
        radial_segments: 16,
        tubular_segments: 64,
    };

    /// Geometries handed out in object order
    pub const ROTATION: [Self; 4] = [Self::TORUS_KNOT, Self::SPHERE, Self::CUBOID, Self::TORUS];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    Standard { metalness: f32, roughness: f32 },
    Phong { shininess: f32 },
    Lambert,
    /// Shades by surface normal, ignores lights
    Normal,
}

impl MaterialKind {
    pub fn name(&self) -> &'static str {
        match self {
            MaterialKind::Standard { .. } => "standard",
            MaterialKind::Phong { .. } => "phong",
            MaterialKind::Lambert => "lambert",
            MaterialKind::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: [f32; 3],
}

impl Material {
    /// Materials handed out in object order
    pub const ROTATION: [Self; 4] = [
        Material {
            kind: MaterialKind::Standard {
                metalness: 0.7,
                roughness: 0.3,
            },
            color: hex_color(0x049ef4),
        },
        Material {
            kind: MaterialKind::Phong { shininess: 100.0 },
            color: hex_color(0xff6347),
        },
        Material {
            kind: MaterialKind::Lambert,
            color: hex_color(0x7cfc00),
        },
        Material {
            kind: MaterialKind::Normal,
            color: WHITE,
        },
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vec3,
}

impl Transform {
    pub fn matrix(&self) -> glam::Mat4 {
        let rotation = glam::Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        glam::Mat4::from_rotation_translation(rotation, self.position)
    }
}

/// A mesh in the scene, owned by the runtime's object list
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableObject {
    pub geometry: GeometryKind,
    pub material: Material,
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        /// Direction the light travels from, as a position relative to the origin
        position: Vec3,
    },
    Point {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
    },
}

/// Everything the backend needs to build its scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescriptor {
    pub background: [f32; 3],
    pub lights: Vec<Light>,
    pub objects: Vec<RenderableObject>,
}

impl SceneDescriptor {
    pub fn from_config(config: &SceneConfig) -> Self {
        let count = config.object_count();
        let objects = (0..count)
            .map(|i| RenderableObject {
                geometry: GeometryKind::ROTATION[i % GeometryKind::ROTATION.len()],
                material: Material::ROTATION[i % Material::ROTATION.len()],
                transform: Transform {
                    position: Vec3::new(horizontal_offset(i, count), 0.0, 0.0),
                    rotation: Vec3::ZERO,
                },
            })
            .collect();

        let ambient = Light::Ambient {
            color: WHITE,
            intensity: config.ambient_intensity,
        };
        let key = match config.variant {
            SceneVariant::Showcase => Light::Directional {
                color: WHITE,
                intensity: config.directional_intensity,
                position: Vec3::new(5.0, 10.0, 7.5),
            },
            SceneVariant::Basic => Light::Point {
                color: WHITE,
                intensity: config.directional_intensity,
                position: Vec3::new(5.0, 5.0, 5.0),
            },
        };

        Self {
            background: BACKGROUND,
            lights: vec![ambient, key],
            objects,
        }
    }
}

/// Centers `count` objects around x = 0, `OBJECT_SPACING` apart
pub fn horizontal_offset(index: usize, count: usize) -> f32 {
    (index as f32 - (count as f32 - 1.0) * 0.5) * OBJECT_SPACING
}

pub const fn hex_color(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_centered() {
        assert_eq!(horizontal_offset(0, 1), 0.0);
        assert_eq!(
            [0, 1, 2].map(|i| horizontal_offset(i, 3)),
            [-4.0, 0.0, 4.0]
        );
        assert_eq!(horizontal_offset(0, 2), -2.0);
        assert_eq!(horizontal_offset(1, 2), 2.0);
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_color(0x00ff00), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_showcase_descriptor() {
        let desc = SceneDescriptor::from_config(&SceneConfig::default());
        assert_eq!(desc.objects.len(), 3);
        assert!(matches!(desc.lights[0], Light::Ambient { intensity, .. } if intensity == 0.5));
        assert!(matches!(desc.lights[1], Light::Directional { intensity, .. } if intensity == 1.0));
        assert_eq!(desc.objects[0].geometry, GeometryKind::TORUS_KNOT);
        assert_eq!(desc.objects[1].geometry, GeometryKind::SPHERE);
        assert_eq!(desc.objects[2].geometry, GeometryKind::CUBOID);
    }

    #[test]
    fn test_basic_descriptor_uses_point_light() {
        let config = SceneConfig {
            variant: SceneVariant::Basic,
            ..SceneConfig::default()
        };
        let desc = SceneDescriptor::from_config(&config);
        assert_eq!(desc.objects.len(), 1);
        assert_eq!(desc.objects[0].transform.position, Vec3::ZERO);
        assert!(matches!(
            desc.lights[1],
            Light::Point { position, .. } if position == Vec3::new(5.0, 5.0, 5.0)
        ));
    }

    #[test]
    fn test_materials_cycle_past_rotation() {
        let config = SceneConfig {
            object_count: Some(6),
            ..SceneConfig::default()
        };
        let desc = SceneDescriptor::from_config(&config);
        assert_eq!(desc.objects[4].material, desc.objects[0].material);
        assert_eq!(desc.objects[5].geometry, desc.objects[1].geometry);
    }

    #[test]
    fn test_transform_matrix_translates() {
        let transform = Transform {
            position: Vec3::new(4.0, 0.0, 0.0),
            rotation: Vec3::new(0.3, 0.2, 0.0),
        };
        let origin = transform.matrix().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(4.0, 0.0, 0.0));
    }
}
