use crate::core::math::transform::{transform_direction, transform_point};
use log::warn;
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// Capacity of the light table. Scenes with more lights keep the first `MAX_LIGHTS`.
pub const MAX_LIGHTS: usize = 50;

/// Kind of light source. Unrecognized sources contribute ambient light only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Unknown,
    Point,
    Directional,
    Spot,
}

impl LightType {
    /// Numeric type tag: 1 point, 2 directional, 3 spot, anything else unknown.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => LightType::Point,
            2 => LightType::Directional,
            3 => LightType::Spot,
            0 => LightType::Unknown,
            _ => {
                warn!("Unrecognized light type code {code}, treating it as unknown");
                LightType::Unknown
            }
        }
    }

    pub fn code(self) -> i64 {
        match self {
            LightType::Unknown => 0,
            LightType::Point => 1,
            LightType::Directional => 2,
            LightType::Spot => 3,
        }
    }

    /// Case-insensitive type name; anything unrecognized is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "point" => LightType::Point,
            "directional" => LightType::Directional,
            "spot" => LightType::Spot,
            "unknown" => LightType::Unknown,
            other => {
                warn!("Unrecognized light type '{other}', treating it as unknown");
                LightType::Unknown
            }
        }
    }
}

// `type = "spot"` or `type = 3`. Unrecognized values degrade instead of failing the load.
impl<'de> Deserialize<'de> for LightType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LightTypeVisitor;

        impl Visitor<'_> for LightTypeVisitor {
            type Value = LightType;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a light type name or numeric code")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LightType, E> {
                Ok(LightType::from_name(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<LightType, E> {
                Ok(LightType::from_code(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<LightType, E> {
                Ok(LightType::from_code(i64::try_from(v).unwrap_or(-1)))
            }
        }

        deserializer.deserialize_any(LightTypeVisitor)
    }
}

/// One light slot as consumed by the shader.
#[derive(Debug, Clone, PartialEq)]
pub struct LightParams {
    pub name: String,
    pub light_type: LightType,
    pub position: Point3<f32>,
    /// Direction the light travels (directional and spot lights).
    pub direction: Vector3<f32>,
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    pub constant_attenuation: f32,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
    /// Spot cone half-angles in radians.
    pub inner_cone: f32,
    pub outer_cone: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            light_type: LightType::Point,
            position: Point3::new(1.0, 1.0, 1.0),
            direction: Vector3::zeros(),
            ambient: Vector4::new(0.0, 0.0, 0.0, 1.0),
            diffuse: Vector4::new(1.0, 1.0, 1.0, 1.0),
            specular: Vector4::new(1.0, 1.0, 1.0, 1.0),
            constant_attenuation: 1.0,
            linear_attenuation: 1.0,
            quadratic_attenuation: 0.1,
            inner_cone: 0.3,
            outer_cone: 2.0,
        }
    }
}

impl LightParams {
    pub fn point(name: &str, position: Point3<f32>) -> Self {
        Self {
            name: name.to_string(),
            position,
            ..Default::default()
        }
    }

    pub fn directional(name: &str, direction: Vector3<f32>) -> Self {
        Self {
            name: name.to_string(),
            light_type: LightType::Directional,
            direction,
            ..Default::default()
        }
    }

    /// The two white point lights used when a scene carries none.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::point("default_light_0", Point3::new(1.0, 1.0, 1.0)),
            Self::point("default_light_1", Point3::new(-1.0, 1.0, 1.0)),
        ]
    }

    /// Unit vector from `surface` toward the light.
    pub fn direction_to_light(&self, surface: &Point3<f32>) -> Vector3<f32> {
        let v = match self.light_type {
            LightType::Directional => -self.direction,
            _ => self.position - surface,
        };
        v.try_normalize(1e-8).unwrap_or_else(Vector3::zeros)
    }

    /// Scalar weight applied to the diffuse and specular terms at `surface`.
    pub fn attenuation_at(&self, surface: &Point3<f32>) -> f32 {
        match self.light_type {
            LightType::Unknown => 0.0,
            LightType::Directional => 1.0,
            LightType::Point => self.distance_attenuation(surface),
            LightType::Spot => self.distance_attenuation(surface) * self.cone_factor(surface),
        }
    }

    fn distance_attenuation(&self, surface: &Point3<f32>) -> f32 {
        let d = (self.position - surface).norm();
        let denom = self.constant_attenuation
            + self.linear_attenuation * d
            + self.quadratic_attenuation * d * d;
        if denom > 1e-6 { 1.0 / denom } else { 1.0 }
    }

    /// 1 inside the inner cone, 0 outside the outer cone, linear in cosine between.
    fn cone_factor(&self, surface: &Point3<f32>) -> f32 {
        let Some(axis) = self.direction.try_normalize(1e-8) else {
            return 1.0;
        };
        let cos_theta = (-self.direction_to_light(surface)).dot(&axis);
        let cos_inner = self.inner_cone.cos();
        let cos_outer = self.outer_cone.cos();

        if cos_inner - cos_outer <= 1e-6 {
            return if cos_theta >= cos_outer { 1.0 } else { 0.0 };
        }
        ((cos_theta - cos_outer) / (cos_inner - cos_outer)).clamp(0.0, 1.0)
    }
}

/// Fixed-capacity light parameters, filled once at load.
///
/// The table remembers each slot's load-time pose so that re-posing a light
/// from its node's world transform does not compound across frames.
#[derive(Debug, Clone)]
pub struct LightTable {
    slots: Vec<LightParams>,
    rest_pose: Vec<(Point3<f32>, Vector3<f32>)>,
}

impl LightTable {
    /// Takes at most `MAX_LIGHTS` imported lights, or `fallback` when there are none.
    pub fn from_imported(imported: &[LightParams], fallback: &[LightParams]) -> Self {
        let source = if imported.is_empty() {
            fallback
        } else {
            imported
        };
        if source.len() > MAX_LIGHTS {
            warn!(
                "Scene has {} lights; only the first {} are used",
                source.len(),
                MAX_LIGHTS
            );
        }

        let slots: Vec<LightParams> = source.iter().take(MAX_LIGHTS).cloned().collect();
        let rest_pose = slots.iter().map(|l| (l.position, l.direction)).collect();
        Self { slots, rest_pose }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LightParams> {
        self.slots.get(index)
    }

    pub fn as_slice(&self) -> &[LightParams] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &LightParams> {
        self.slots.iter()
    }

    /// Re-poses slot `index` by transforming its load-time position (as a point)
    /// and direction (as a direction) with `world`. Out-of-range slots are ignored.
    pub fn set_pose(&mut self, index: usize, world: &Matrix4<f32>) {
        let (Some(slot), Some((position, direction))) =
            (self.slots.get_mut(index), self.rest_pose.get(index))
        else {
            return;
        };
        slot.position = transform_point(world, position);
        slot.direction = transform_direction(world, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::TransformFactory;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_unknown_light_has_zero_attenuation() {
        let light = LightParams {
            light_type: LightType::from_code(42),
            ..Default::default()
        };
        assert_eq!(light.light_type, LightType::Unknown);
        assert_eq!(light.attenuation_at(&Point3::origin()), 0.0);
    }

    #[test]
    fn test_point_attenuation() {
        let light = LightParams::point("p", Point3::new(0.0, 0.0, 2.0));
        // 1 / (1 + 1*2 + 0.1*4)
        let expected = 1.0 / 3.4;
        assert!((light.attenuation_at(&Point3::origin()) - expected).abs() < EPSILON);
    }

    #[test]
    fn test_directional_light() {
        let light = LightParams::directional("sun", Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(light.attenuation_at(&Point3::new(100.0, 0.0, 0.0)), 1.0);
        let l = light.direction_to_light(&Point3::origin());
        assert!((l - Vector3::y()).norm() < EPSILON);
    }

    #[test]
    fn test_spot_cone() {
        let spot = LightParams {
            light_type: LightType::Spot,
            position: Point3::new(0.0, 1.0, 0.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            inner_cone: 0.2,
            outer_cone: 0.4,
            ..Default::default()
        };
        assert!((spot.attenuation_at(&Point3::origin()) - 1.0).abs() < EPSILON);
        // 45 degrees off axis, outside the outer cone.
        assert_eq!(spot.attenuation_at(&Point3::new(1.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_type_codes() {
        for t in [
            LightType::Unknown,
            LightType::Point,
            LightType::Directional,
            LightType::Spot,
        ] {
            assert_eq!(LightType::from_code(t.code()), t);
        }
        assert_eq!(LightType::from_name("Spot"), LightType::Spot);
        assert_eq!(LightType::from_name("area"), LightType::Unknown);
    }

    #[test]
    fn test_table_capacity_and_defaults() {
        let many: Vec<_> = (0..MAX_LIGHTS + 10)
            .map(|i| LightParams::point(&format!("l{i}"), Point3::origin()))
            .collect();
        let table = LightTable::from_imported(&many, &LightParams::defaults());
        assert_eq!(table.len(), MAX_LIGHTS);
        assert_eq!(table.get(0).unwrap().name, "l0");

        let table = LightTable::from_imported(&[], &LightParams::defaults());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().position, Point3::new(-1.0, 1.0, 1.0));
    }

    #[test]
    fn test_set_pose_is_idempotent() {
        let mut light = LightParams::point("lamp", Point3::new(1.0, 0.0, 0.0));
        light.direction = Vector3::new(1.0, 0.0, 0.0);
        let mut table = LightTable::from_imported(&[light], &[]);
        let world = TransformFactory::translation(&Vector3::new(0.0, 5.0, 0.0));

        table.set_pose(0, &world);
        table.set_pose(0, &world);
        let slot = table.get(0).unwrap();
        assert!((slot.position - Point3::new(1.0, 5.0, 0.0)).norm() < EPSILON);
        assert!((slot.direction - Vector3::new(1.0, 0.0, 0.0)).norm() < EPSILON);

        table.set_pose(3, &world);
        assert_eq!(table.len(), 1);
    }
}
