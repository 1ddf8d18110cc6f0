use bytemuck::Zeroable;
use glam::Vec3;
use rand::{thread_rng, Rng};

use crate::constants::clouds;
use crate::lifecycle::{FadeLifecycle, IntensitySmoother};
use crate::weather::astronomy::SkyLighting;
use crate::weather::WeatherSignal;
use crate::zone::Zone;

/// One billboard puff of a cloud cluster, mapped to one GPU instance slot.
#[derive(Debug, Clone, Copy)]
pub struct CloudPuff {
    /// Local offset from the cloud center, in cloud-scale units.
    pub offset: Vec3,
    pub scale: f32,
    pub rotation: f32,
}

/// A composite cloud: a drifting center plus a constant number of puffs.
#[derive(Debug, Clone)]
pub struct Cloud {
    pub position: Vec3,
    pub scale: f32,
    pub puffs: Vec<CloudPuff>,
}

/// Per-puff instance data uploaded to the GPU each frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CloudPuffInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
    pub rotation: f32,
    pub _padding: [f32; 3],
}

/// Instanced billboard clouds with a cheap analytic lighting model: a
/// forward-scatter "silver lining" term, a back-scatter diffuse term and an
/// ambient tint. Not scattering transport, just enough to sell depth.
///
/// The pool is fixed; coverage moves `active_clouds` and surplus clouds are
/// parked far off-scene every frame instead of being freed.
pub struct CloudSystem {
    zone: Zone,
    clouds: Vec<Cloud>,
    lifecycle: FadeLifecycle,
    cover: IntensitySmoother,
    active_clouds: usize,
    instances: Vec<CloudPuffInstance>,
}

impl CloudSystem {
    pub fn new(zone: Zone) -> Self {
        let mut rng = thread_rng();
        let clouds = (0..clouds::MAX_CLOUDS)
            .map(|_| Cloud {
                position: Vec3::new(
                    zone.random_x(&mut rng),
                    rng.gen_range(clouds::ALTITUDE_MIN..clouds::ALTITUDE_MAX),
                    rng.gen_range(clouds::DEPTH_MIN..clouds::DEPTH_MAX),
                ),
                scale: rng.gen_range(clouds::SCALE_MIN..clouds::SCALE_MAX),
                puffs: (0..clouds::PUFFS_PER_CLOUD)
                    .map(|_| CloudPuff {
                        offset: Vec3::new(
                            rng.gen_range(-1.0..1.0),
                            rng.gen_range(-0.3..0.35),
                            rng.gen_range(-0.5..0.5),
                        ),
                        scale: rng.gen_range(0.5..1.0),
                        rotation: rng.gen_range(0.0..std::f32::consts::TAU),
                    })
                    .collect(),
            })
            .collect();
        Self {
            zone,
            clouds,
            lifecycle: FadeLifecycle::new(),
            cover: IntensitySmoother::new(),
            active_clouds: 0,
            instances: vec![CloudPuffInstance::zeroed(); clouds::MAX_CLOUDS * clouds::PUFFS_PER_CLOUD],
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn active_clouds(&self) -> usize {
        self.active_clouds
    }

    pub fn opacity(&self) -> f32 {
        self.lifecycle.opacity() * clouds::MAX_OPACITY
    }

    pub fn lifecycle(&self) -> &FadeLifecycle {
        &self.lifecycle
    }

    /// Full instance slice, one slot per puff in the pool. Parked slots
    /// carry zero alpha and an off-scene position.
    pub fn instances(&self) -> &[CloudPuffInstance] {
        &self.instances
    }

    pub fn update(&mut self, dt: f32, signal: &WeatherSignal, sky: &SkyLighting) {
        if dt <= 0.0 {
            return;
        }

        let cover = self.cover.advance(signal.cloud_cover.clamp(0.0, 1.0), dt);
        self.active_clouds =
            ((cover * clouds::MAX_CLOUDS as f32) as usize).min(clouds::MAX_CLOUDS);
        self.lifecycle
            .update(dt, if self.active_clouds > 0 { 1.0 } else { 0.0 });

        let (wind_x, _) = signal.wind_target(clouds::DRIFT_SCALE);
        let drift = if wind_x.abs() > clouds::DRIFT_FLOOR {
            wind_x
        } else {
            clouds::DRIFT_FLOOR
        };

        let alpha = self.opacity();
        for (ci, cloud) in self.clouds.iter_mut().enumerate() {
            let active = ci < self.active_clouds;
            if active {
                cloud.position.x += drift * dt;
                cloud.position.x += self.zone.wrap_shift(cloud.position.x);
            }

            for (pi, puff) in cloud.puffs.iter().enumerate() {
                let slot = &mut self.instances[ci * clouds::PUFFS_PER_CLOUD + pi];
                if !active {
                    // Parked off-scene rather than freed.
                    *slot = CloudPuffInstance {
                        position: [0.0, clouds::PARK_Y, 0.0],
                        scale: 0.0,
                        color: [0.0; 4],
                        rotation: 0.0,
                        _padding: [0.0; 3],
                    };
                    continue;
                }
                let world = cloud.position + puff.offset * cloud.scale;
                let shade = shade_puff(world, puff.offset, sky);
                *slot = CloudPuffInstance {
                    position: world.to_array(),
                    scale: cloud.scale * puff.scale,
                    color: [shade.x, shade.y, shade.z, alpha],
                    rotation: puff.rotation,
                    _padding: [0.0; 3],
                };
            }
        }
    }
}

/// Analytic puff shading: ambient tint, back-scatter diffuse from the
/// puff's outward normal, and a forward-scatter silver lining when the view
/// direction lines up with the dominant light.
fn shade_puff(world: Vec3, offset: Vec3, sky: &SkyLighting) -> Vec3 {
    let (light_dir, light_color, light_intensity) = sky.dominant_light();
    let normal = offset.try_normalize().unwrap_or(Vec3::Y);
    let view = (world - sky.camera_position)
        .try_normalize()
        .unwrap_or(Vec3::Z);

    let diffuse = normal.dot(light_dir).max(0.0) * clouds::BACK_STRENGTH;
    let silver = view
        .dot(light_dir)
        .max(0.0)
        .powf(clouds::SILVER_EXPONENT)
        * clouds::SILVER_STRENGTH;

    (sky.ambient + light_color * (light_intensity * (diffuse + silver))).min(Vec3::ONE)
}
