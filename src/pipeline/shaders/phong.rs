use crate::core::color::rgb;
use crate::core::math::transform::transform_point;
use crate::core::pipeline::{Shader, Vertex};
use crate::scene::light::LightParams;
use crate::scene::material::MaterialParams;
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Data interpolated across the triangle surface.
/// Passed from Vertex Shader -> Rasterizer -> Fragment Shader.
#[derive(Clone, Copy, Debug)]
pub struct PhongVarying {
    /// Normal in world space (not normalized after interpolation).
    pub normal: Vector3<f32>,
    pub world_pos: Point3<f32>,
    pub uv: Vector2<f32>,
}

// Point3 has no Point3 + Point3, so positions go through their coordinates.
impl Add for PhongVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for PhongVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            world_pos: Point3::from(self.world_pos.coords * scalar),
            uv: self.uv * scalar,
        }
    }
}

/// Multi-light Phong shading evaluated in world space.
///
/// For each light: `Ka*Ia + att * (Kd*Id*max(N.L, 0) + Ks*Is*max(R.V, 0)^shininess)`,
/// summed on top of the material emission.
pub struct PhongShader<'a> {
    pub mvp: Matrix4<f32>,
    pub model: Matrix4<f32>,
    pub normal_matrix: Matrix3<f32>,
    pub eye: Point3<f32>,
    pub material: &'a MaterialParams,
    pub has_texture: bool,
    pub lights: &'a [LightParams],
}

impl<'a> PhongShader<'a> {
    pub fn new(
        mvp: Matrix4<f32>,
        model: Matrix4<f32>,
        normal_matrix: Matrix3<f32>,
        eye: Point3<f32>,
        material: &'a MaterialParams,
        lights: &'a [LightParams],
    ) -> Self {
        Self {
            mvp,
            model,
            normal_matrix,
            eye,
            material,
            has_texture: material.has_texture(),
            lights,
        }
    }

    fn diffuse_color(&self, uv: &Vector2<f32>) -> Vector3<f32> {
        let base = rgb(&self.material.diffuse);
        match (&self.material.texture, self.has_texture) {
            (Some(texture), true) => base.component_mul(&texture.sample(uv.x, uv.y)),
            _ => base,
        }
    }
}

impl Shader for PhongShader<'_> {
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let clip_pos = self.mvp * vertex.position.to_homogeneous();
        let varying = PhongVarying {
            normal: self.normal_matrix * vertex.normal,
            world_pos: transform_point(&self.model, &vertex.position),
            uv: vertex.texcoord,
        };
        (clip_pos, varying)
    }

    fn fragment(&self, varying: Self::Varying) -> Vector3<f32> {
        let material = self.material;
        let ka = rgb(&material.ambient);
        let ks = rgb(&material.specular);
        let kd = self.diffuse_color(&varying.uv);

        let mut color = rgb(&material.emission);
        for light in self.lights {
            color += ka.component_mul(&rgb(&light.ambient));
        }

        // Meshes imported without normals get ambient and emission only.
        let Some(normal) = varying.normal.try_normalize(1e-6) else {
            return color;
        };
        let view_dir = (self.eye - varying.world_pos)
            .try_normalize(1e-6)
            .unwrap_or(normal);

        for light in self.lights {
            let attenuation = light.attenuation_at(&varying.world_pos);
            if attenuation <= 0.0 {
                continue;
            }

            let light_dir = light.direction_to_light(&varying.world_pos);
            let n_dot_l = normal.dot(&light_dir).max(0.0);
            let diffuse = kd.component_mul(&rgb(&light.diffuse)) * n_dot_l;

            let specular = if n_dot_l > 0.0 {
                let reflect_dir = normal * (2.0 * normal.dot(&light_dir)) - light_dir;
                let spec = reflect_dir.dot(&view_dir).max(0.0).powf(material.shininess);
                ks.component_mul(&rgb(&light.specular)) * spec
            } else {
                Vector3::zeros()
            };

            color += (diffuse + specular) * attenuation;
        }

        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::light::LightType;

    const EPSILON: f32 = 1e-5;

    fn varying_at_origin(normal: Vector3<f32>) -> PhongVarying {
        PhongVarying {
            normal,
            world_pos: Point3::origin(),
            uv: Vector2::zeros(),
        }
    }

    fn shader<'a>(material: &'a MaterialParams, lights: &'a [LightParams]) -> PhongShader<'a> {
        PhongShader::new(
            Matrix4::identity(),
            Matrix4::identity(),
            Matrix3::identity(),
            Point3::new(0.0, 0.0, 5.0),
            material,
            lights,
        )
    }

    #[test]
    fn test_unknown_light_gives_ambient_and_emission_only() {
        let material = MaterialParams {
            ambient: Vector4::new(1.0, 1.0, 1.0, 1.0),
            diffuse: Vector4::new(1.0, 1.0, 1.0, 1.0),
            emission: Vector4::new(0.1, 0.0, 0.0, 1.0),
            ..Default::default()
        };
        let light = LightParams {
            light_type: LightType::Unknown,
            position: Point3::new(0.0, 0.0, 1.0),
            ambient: Vector4::new(0.2, 0.2, 0.2, 1.0),
            ..Default::default()
        };
        let lights = [light];
        let color = shader(&material, &lights).fragment(varying_at_origin(Vector3::z()));
        assert!((color - Vector3::new(0.3, 0.2, 0.2)).norm() < EPSILON);
    }

    #[test]
    fn test_directional_diffuse() {
        let material = MaterialParams {
            ambient: Vector4::zeros(),
            diffuse: Vector4::new(0.5, 0.5, 0.5, 1.0),
            specular: Vector4::zeros(),
            ..Default::default()
        };
        let lights = [LightParams::directional("sun", Vector3::new(0.0, 0.0, -1.0))];
        let color = shader(&material, &lights).fragment(varying_at_origin(Vector3::z()));
        assert!((color - Vector3::new(0.5, 0.5, 0.5)).norm() < EPSILON);

        // Facing away.
        let color = shader(&material, &lights).fragment(varying_at_origin(-Vector3::z()));
        assert!(color.norm() < EPSILON);
    }

    #[test]
    fn test_zero_normal_skips_diffuse() {
        let material = MaterialParams::default();
        let lights = [LightParams::directional("sun", Vector3::new(0.0, 0.0, -1.0))];
        let color = shader(&material, &lights).fragment(varying_at_origin(Vector3::zeros()));
        // Default light ambient is black and the default material emits nothing.
        assert!(color.norm() < EPSILON);
    }

    #[test]
    fn test_vertex_uses_mvp_and_normal_matrix() {
        let material = MaterialParams::default();
        let mut s = shader(&material, &[]);
        s.mvp = Matrix4::from_diagonal_element(2.0);
        s.normal_matrix = Matrix3::from_diagonal_element(3.0);

        let vertex = Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::y(), Vector2::zeros());
        let (clip, varying) = s.vertex(&vertex);
        assert!((clip - Vector4::new(2.0, 0.0, 0.0, 2.0)).norm() < EPSILON);
        assert!((varying.normal - Vector3::new(0.0, 3.0, 0.0)).norm() < EPSILON);
    }
}
