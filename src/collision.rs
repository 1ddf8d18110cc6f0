use glam::Vec3;

/// A ray with origin and direction. Direction is expected to be normalized.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Nearest intersection returned by a collision surface.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Read-only geometry falling precipitation is tested against. The
/// simulation core only queries; it never mutates the surface.
pub trait CollisionSurface {
    /// Cast a ray and return the nearest hit within `max_distance`.
    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit>;

    /// Analytic ground height under `(x, z)`, if the surface can answer
    /// without a ray test. `None` means callers fall back to `cast_ray`.
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        None
    }

    /// Horizontal footprint as `(center_x, center_z, radius)`. Particles
    /// outside it skip collision entirely.
    fn footprint(&self) -> (f32, f32, f32);

    /// Highest point of the surface. Collision tests only run inside a
    /// thin band above this.
    fn max_height(&self) -> f32;
}

/// Tiered disc: a flat cap, a rim top and a sloped skirt down to ground
/// level. Matches the pedestal the present zone renders, so rain resolves
/// its impact height analytically instead of raycasting a mesh.
#[derive(Debug, Clone)]
pub struct TieredDiscSurface {
    pub center: Vec3,
    pub cap_radius: f32,
    pub cap_height: f32,
    pub rim_radius: f32,
    pub rim_height: f32,
    pub skirt_radius: f32,
}

impl TieredDiscSurface {
    fn radial_distance(&self, x: f32, z: f32) -> f32 {
        let dx = x - self.center.x;
        let dz = z - self.center.z;
        (dx * dx + dz * dz).sqrt()
    }

    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let r = self.radial_distance(x, z);
        if r <= self.rim_radius || r >= self.skirt_radius {
            return Vec3::Y;
        }
        // Skirt slope: outward and up, normalized.
        let run = self.skirt_radius - self.rim_radius;
        let outward = Vec3::new(x - self.center.x, 0.0, z - self.center.z).normalize_or_zero();
        (Vec3::Y + outward * (self.rim_height / run)).normalize()
    }
}

impl CollisionSurface for TieredDiscSurface {
    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        // Downward rays dominate here; resolve against the analytic height
        // under the origin.
        if ray.direction.y >= 0.0 {
            return None;
        }
        let height = self.height_at(ray.origin.x, ray.origin.z)?;
        let distance = (ray.origin.y - height) / -ray.direction.y;
        if distance < 0.0 || distance > max_distance {
            return None;
        }
        let point = ray.origin + ray.direction * distance;
        Some(RayHit {
            point,
            normal: self.normal_at(point.x, point.z),
            distance,
        })
    }

    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let r = self.radial_distance(x, z);
        if r <= self.cap_radius {
            Some(self.center.y + self.cap_height)
        } else if r <= self.rim_radius {
            Some(self.center.y + self.rim_height)
        } else if r <= self.skirt_radius {
            let t = (r - self.rim_radius) / (self.skirt_radius - self.rim_radius);
            Some(self.center.y + self.rim_height * (1.0 - t))
        } else {
            None
        }
    }

    fn footprint(&self) -> (f32, f32, f32) {
        (self.center.x, self.center.z, self.skirt_radius)
    }

    fn max_height(&self) -> f32 {
        self.center.y + self.cap_height.max(self.rim_height)
    }
}

/// Generic triangle-mesh surface, the fallback for arbitrary ground
/// geometry that has no analytic height description.
pub struct TriangleMeshSurface {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    footprint: (f32, f32, f32),
    max_height: f32,
}

impl TriangleMeshSurface {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        let (mut min, mut max) = (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
        for v in &vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;
        let radius = (half.x * half.x + half.z * half.z).sqrt();
        Self {
            vertices,
            indices,
            footprint: (center.x, center.z, radius),
            max_height: max.y,
        }
    }

    /// Moller-Trumbore intersection against one triangle.
    fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        const EPS: f32 = 1e-7;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < EPS {
            return None;
        }
        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        (t > EPS).then_some(t)
    }
}

impl CollisionSurface for TriangleMeshSurface {
    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;
        for tri in self.indices.chunks_exact(3) {
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];
            if let Some(t) = Self::intersect_triangle(ray, v0, v1, v2) {
                if t <= max_distance && nearest.map_or(true, |hit| t < hit.distance) {
                    nearest = Some(RayHit {
                        point: ray.origin + ray.direction * t,
                        normal: (v1 - v0).cross(v2 - v0).normalize_or_zero(),
                        distance: t,
                    });
                }
            }
        }
        nearest
    }

    fn footprint(&self) -> (f32, f32, f32) {
        self.footprint
    }

    fn max_height(&self) -> f32 {
        self.max_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pedestal() -> TieredDiscSurface {
        TieredDiscSurface {
            center: Vec3::ZERO,
            cap_radius: 1.0,
            cap_height: 1.2,
            rim_radius: 1.6,
            rim_height: 0.9,
            skirt_radius: 2.4,
        }
    }

    #[test]
    fn test_tiered_heights() {
        let s = pedestal();
        assert_eq!(s.height_at(0.0, 0.0), Some(1.2));
        assert_eq!(s.height_at(1.3, 0.0), Some(0.9));
        // Halfway down the skirt.
        let h = s.height_at(2.0, 0.0).unwrap();
        assert!((h - 0.45).abs() < 1e-5);
        assert_eq!(s.height_at(3.0, 0.0), None);
    }

    #[test]
    fn test_tiered_downward_ray() {
        let s = pedestal();
        let ray = Ray::new(Vec3::new(0.5, 5.0, 0.0), -Vec3::Y);
        let hit = s.cast_ray(&ray, 10.0).expect("cap hit");
        assert!((hit.point.y - 1.2).abs() < 1e-5);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_mesh_fallback_raycast() {
        // Unit quad at y = 0.5.
        let mesh = TriangleMeshSurface::new(
            vec![
                Vec3::new(-1.0, 0.5, -1.0),
                Vec3::new(1.0, 0.5, -1.0),
                Vec3::new(1.0, 0.5, 1.0),
                Vec3::new(-1.0, 0.5, 1.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        let ray = Ray::new(Vec3::new(0.2, 3.0, 0.2), -Vec3::Y);
        let hit = mesh.cast_ray(&ray, 10.0).expect("quad hit");
        assert!((hit.point.y - 0.5).abs() < 1e-5);
        assert!(mesh.cast_ray(&Ray::new(Vec3::new(5.0, 3.0, 0.0), -Vec3::Y), 10.0).is_none());
    }
}
