//! Static collision world for the kinematic capsule character.
//!
//! The level is a flat list of static shapes (infinite planes and oriented
//! cuboids), each with an optional constant surface velocity so moving
//! platforms can report motion through the support check. Queries are
//! capsule shape-casts via parry (through `rapier3d::parry`):
//!
//! - `support_check`: downward probe averaging contact normals and surface
//!   velocities into a [`SupportInfo`].
//! - `move_capsule`: sweep-and-slide integration of a translation.
//! - [`CapsuleSweep`]: a per-tick (world + pose) view implementing the
//!   [`SweptMove`] solver used by velocity resolution.

use nalgebra as na;
use rapier3d::parry::query::{self, ShapeCastOptions};
use rapier3d::parry::shape::{Capsule as ParryCapsule, Cuboid as ParryCuboid, HalfSpace, Shape};

use crate::constants::{CONTACT_SKIN, DIST_EPS, MAX_SLIDE_ITERATIONS};
use crate::locomotion::SupportInfo;
use crate::velocity::SweptMove;
use crate::{Iso, Quat, Vec3};

/// Capsule for kinematic actors. `half_height` is the half-length of the
/// cylinder section (aligned with +Y), so the total height is
/// `2 * half_height + 2 * radius`.
#[derive(Clone, Copy, Debug)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

/// A single shape-cast contact.
#[derive(Clone, Copy, Debug)]
pub struct MoveHit {
    /// World-space contact normal on the moving capsule, opposing its motion.
    pub normal: Vec3,
    /// Fraction (0..1) of the tested translation where the hit occurred.
    pub fraction: f32,
}

/// Static collision shapes supported by the level.
#[derive(Clone, Copy, Debug)]
pub enum StaticShape {
    /// Infinite plane satisfying `normal . x = dist`, with a world-space
    /// unit normal.
    Plane { normal: Vec3, dist: f32 },
    /// Oriented box with local-space half-extents and a world pose.
    Cuboid {
        half_extents: Vec3,
        translation: Vec3,
        rotation: Quat,
    },
}

/// A static shape plus the constant velocity of its surface. Zero for level
/// geometry; nonzero for moving platforms (the shape pose is updated by the
/// caller, the velocity is what the support check reports).
#[derive(Clone, Copy, Debug)]
pub struct StaticBody {
    pub shape: StaticShape,
    pub velocity: Vec3,
}

impl StaticBody {
    pub fn fixed(shape: StaticShape) -> Self {
        Self {
            shape,
            velocity: Vec3::zeros(),
        }
    }

    pub fn moving(shape: StaticShape, velocity: Vec3) -> Self {
        Self { shape, velocity }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticWorld {
    bodies: Vec<StaticBody>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body and return its index (stable; bodies are never removed).
    pub fn push(&mut self, body: StaticBody) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut StaticBody> {
        self.bodies.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn capsule_pose(center: Vec3) -> Iso {
        Iso::from_parts(
            na::Translation3::new(center.x, center.y, center.z),
            Quat::identity(),
        )
    }

    /// Cast the moving capsule against one static shape.
    fn cast_body(
        body: &StaticBody,
        start: &Iso,
        capsule: &ParryCapsule,
        vel: Vec3,
        max_toi: f32,
    ) -> Option<MoveHit> {
        match body.shape {
            StaticShape::Plane { normal, dist } => {
                let unit_n = na::Unit::new_normalize(normal);
                let plane = HalfSpace::new(unit_n);
                // Place the half-space so that `normal . x = dist` holds.
                let pose = Iso::from_parts(
                    na::Translation3::from(unit_n.into_inner() * dist),
                    Quat::identity(),
                );
                Self::cast_shape(start, capsule, vel, max_toi, &plane, &pose)
            }
            StaticShape::Cuboid {
                half_extents,
                translation,
                rotation,
            } => {
                let cuboid = ParryCuboid::new(half_extents);
                let pose = Iso::from_parts(na::Translation3::from(translation), rotation);
                Self::cast_shape(start, capsule, vel, max_toi, &cuboid, &pose)
            }
        }
    }

    fn cast_shape(
        start: &Iso,
        capsule: &ParryCapsule,
        vel: Vec3,
        max_toi: f32,
        shape: &dyn Shape,
        pose: &Iso,
    ) -> Option<MoveHit> {
        let mut opts = ShapeCastOptions::with_max_time_of_impact(max_toi);
        opts.stop_at_penetration = true;

        let hit = query::cast_shapes(
            start,
            &vel,
            capsule as &dyn Shape,
            pose,
            &na::Vector3::zeros(),
            shape,
            opts,
        )
        .ok()
        .flatten()?;

        // Use the normal on the moving shape; ensure it opposes the motion.
        let mut normal: Vec3 = hit.normal1.into_inner();
        if normal.dot(&vel) > 0.0 {
            normal = -normal;
        }
        Some(MoveHit {
            normal,
            fraction: hit.time_of_impact,
        })
    }

    /// Earliest hit sweeping the capsule from `center` along `translation`.
    pub fn cast_capsule(
        &self,
        center: Vec3,
        capsule: CapsuleSpec,
        translation: Vec3,
        max_toi: f32,
    ) -> Option<MoveHit> {
        let start = Self::capsule_pose(center);
        let shape = ParryCapsule::new_y(capsule.half_height, capsule.radius);

        let mut best: Option<MoveHit> = None;
        for body in &self.bodies {
            if let Some(hit) = Self::cast_body(body, &start, &shape, translation, max_toi)
                && best.as_ref().is_none_or(|b| hit.fraction < b.fraction)
            {
                best = Some(hit);
            }
        }
        best
    }

    /// Probe straight down by `probe_distance` and average the contacts into
    /// a per-tick [`SupportInfo`].
    pub fn support_check(
        &self,
        center: Vec3,
        capsule: CapsuleSpec,
        probe_distance: f32,
    ) -> SupportInfo {
        let start = Self::capsule_pose(center);
        let shape = ParryCapsule::new_y(capsule.half_height, capsule.radius);
        let probe = Vec3::new(0.0, -probe_distance.max(0.0), 0.0);

        let mut normal_sum = Vec3::zeros();
        let mut velocity_sum = Vec3::zeros();
        let mut count: u32 = 0;

        for body in &self.bodies {
            if let Some(hit) = Self::cast_body(body, &start, &shape, probe, 1.0) {
                normal_sum += hit.normal;
                velocity_sum += body.velocity;
                count += 1;
            }
        }

        if count == 0 {
            return SupportInfo::unsupported();
        }

        let average_normal = if normal_sum.norm_squared() > DIST_EPS {
            normal_sum.normalize()
        } else {
            na::Vector3::y()
        };

        SupportInfo {
            supported: true,
            average_normal,
            average_surface_velocity: velocity_sum / count as f32,
        }
    }

    /// Move the capsule by `translation` with sweep-and-slide: advance to the
    /// first contact (keeping a skin gap), remove the blocked component, and
    /// retry with the leftover, up to a bounded number of iterations.
    pub fn move_capsule(
        &self,
        center: Vec3,
        capsule: CapsuleSpec,
        translation: Vec3,
    ) -> (Vec3, Option<MoveHit>) {
        let mut pos = center;
        let mut remaining = translation;
        let mut last_hit = None;

        for _ in 0..MAX_SLIDE_ITERATIONS {
            let len = remaining.norm();
            if len * len <= DIST_EPS * DIST_EPS {
                break;
            }

            match self.cast_capsule(pos, capsule, remaining, 1.0) {
                None => {
                    pos += remaining;
                    break;
                }
                Some(hit) => {
                    let dir = remaining / len;
                    let travel = (hit.fraction * len - CONTACT_SKIN).max(0.0);
                    pos += dir * travel;

                    // Slide the unconsumed part along the contact plane.
                    let leftover = remaining * (1.0 - hit.fraction);
                    remaining = leftover - hit.normal * leftover.dot(&hit.normal);
                    last_hit = Some(hit);
                }
            }
        }

        (pos, last_hit)
    }
}

/// Per-tick view of the world from one capsule's pose, implementing the
/// collision-aware movement solver consumed by velocity resolution.
#[derive(Clone, Copy, Debug)]
pub struct CapsuleSweep<'a> {
    pub world: &'a StaticWorld,
    pub center: Vec3,
    pub capsule: CapsuleSpec,
}

impl SweptMove for CapsuleSweep<'_> {
    fn swept_move(
        &self,
        dt: f32,
        _forward: Vec3,
        _surface_normal: Vec3,
        current: Vec3,
        surface_velocity: Vec3,
        desired: Vec3,
        up: Vec3,
    ) -> Vec3 {
        // Adopt the desired planar velocity, keep the surface-relative
        // vertical speed.
        let relative = current - surface_velocity;
        let mut candidate = desired + up * relative.dot(&up);

        // Remove any component driving into a blocking contact ahead. The
        // cast also covers the support surface itself, so the surface normal
        // needs no special casing here.
        if dt > 0.0
            && let Some(hit) = self
                .world
                .cast_capsule(self.center, self.capsule, candidate * dt, 1.0)
        {
            let into = candidate.dot(&hit.normal);
            if into < 0.0 {
                candidate -= hit.normal * into;
            }
        }

        candidate + surface_velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capsule() -> CapsuleSpec {
        CapsuleSpec {
            radius: 0.4,
            half_height: 0.5,
        }
    }

    fn ground() -> StaticBody {
        StaticBody::fixed(StaticShape::Plane {
            normal: na::Vector3::y(),
            dist: 0.0,
        })
    }

    #[test]
    fn support_detected_on_a_plane() {
        let mut world = StaticWorld::new();
        world.push(ground());

        // Capsule bottom 0.02 m above the plane: the probe must connect.
        let support = world.support_check(Vec3::new(0.0, 0.92, 0.0), capsule(), 0.12);
        assert!(support.supported);
        assert!((support.average_normal - na::Vector3::y()).norm() < 1.0e-4);

        // Well above the plane: no support.
        let support = world.support_check(Vec3::new(0.0, 5.0, 0.0), capsule(), 0.12);
        assert!(!support.supported);
    }

    #[test]
    fn support_reports_platform_velocity() {
        let mut world = StaticWorld::new();
        world.push(StaticBody::moving(
            StaticShape::Cuboid {
                half_extents: Vec3::new(2.0, 0.25, 2.0),
                translation: Vec3::new(0.0, -0.25, 0.0),
                rotation: Quat::identity(),
            },
            Vec3::new(1.5, 0.0, 0.0),
        ));

        let support = world.support_check(Vec3::new(0.0, 0.95, 0.0), capsule(), 0.12);
        assert!(support.supported);
        assert!((support.average_surface_velocity.x - 1.5).abs() < 1.0e-6);
    }

    #[test]
    fn falling_capsule_hits_plane_at_expected_fraction() {
        let mut world = StaticWorld::new();
        world.push(ground());

        // Bottom of the capsule at y = 1.1; a 2 m downward cast should hit
        // at fraction ~0.55.
        let hit = world
            .cast_capsule(
                Vec3::new(0.0, 2.0, 0.0),
                capsule(),
                Vec3::new(0.0, -2.0, 0.0),
                1.0,
            )
            .unwrap();
        assert!((hit.fraction - 0.55).abs() < 0.01);
        assert!(hit.normal.y > 0.99);
    }

    #[test]
    fn move_capsule_stops_at_a_wall_with_skin() {
        let mut world = StaticWorld::new();
        world.push(ground());
        // Wall face at x = 1.5.
        world.push(StaticBody::fixed(StaticShape::Cuboid {
            half_extents: Vec3::new(0.5, 2.0, 5.0),
            translation: Vec3::new(2.0, 2.0, 0.0),
            rotation: Quat::identity(),
        }));

        let start = Vec3::new(0.0, 1.0, 0.0);
        let (pos, hit) = world.move_capsule(start, capsule(), Vec3::new(2.0, 0.0, 0.0));
        // Stops with the capsule surface a skin's width from the wall.
        assert!((pos.x - (1.5 - 0.4 - CONTACT_SKIN)).abs() < 0.05);
        assert!(hit.is_some());
        assert!(hit.unwrap().normal.x < -0.99);
    }

    #[test]
    fn move_capsule_slides_along_a_wall() {
        let mut world = StaticWorld::new();
        world.push(StaticBody::fixed(StaticShape::Cuboid {
            half_extents: Vec3::new(0.5, 2.0, 5.0),
            translation: Vec3::new(2.0, 2.0, 0.0),
            rotation: Quat::identity(),
        }));

        let start = Vec3::new(0.0, 1.0, 0.0);
        let (pos, _) = world.move_capsule(start, capsule(), Vec3::new(2.0, 0.0, 2.0));
        // Blocked in x, but most of the z motion is preserved by sliding.
        assert!(pos.x < 1.5 - 0.4 + 1.0e-3);
        assert!(pos.z > 1.5);
    }

    #[test]
    fn free_move_is_unobstructed() {
        let mut world = StaticWorld::new();
        world.push(ground());

        let start = Vec3::new(0.0, 5.0, 0.0);
        let (pos, hit) = world.move_capsule(start, capsule(), Vec3::new(1.0, 0.0, -2.0));
        assert!((pos - Vec3::new(1.0, 5.0, -2.0)).norm() < 1.0e-5);
        assert!(hit.is_none());
    }

    #[test]
    fn sweep_solver_blocks_motion_into_a_wall() {
        let mut world = StaticWorld::new();
        world.push(ground());
        world.push(StaticBody::fixed(StaticShape::Cuboid {
            half_extents: Vec3::new(0.5, 2.0, 5.0),
            translation: Vec3::new(1.0, 2.0, 0.0),
            rotation: Quat::identity(),
        }));

        let sweep = CapsuleSweep {
            world: &world,
            // Almost touching the wall face at x = 0.5.
            center: Vec3::new(0.05, 1.0, 0.0),
            capsule: capsule(),
        };
        let out = sweep.swept_move(
            1.0 / 60.0,
            -na::Vector3::z(),
            na::Vector3::y(),
            Vec3::zeros(),
            Vec3::zeros(),
            Vec3::new(10.0, 0.0, 0.0),
            na::Vector3::y(),
        );
        // The into-wall component is removed.
        assert!(out.x < 1.0e-3);
    }

    #[test]
    fn sweep_solver_preserves_vertical_and_surface_velocity() {
        let world = StaticWorld::new();
        let sweep = CapsuleSweep {
            world: &world,
            center: Vec3::new(0.0, 10.0, 0.0),
            capsule: capsule(),
        };
        let current = Vec3::new(0.0, -4.0, 0.0);
        let surface_velocity = Vec3::new(2.0, 0.0, 0.0);
        let out = sweep.swept_move(
            1.0 / 60.0,
            -na::Vector3::z(),
            na::Vector3::y(),
            current,
            surface_velocity,
            Vec3::new(0.0, 0.0, -6.0),
            na::Vector3::y(),
        );
        // Desired planar velocity adopted, surface-relative vertical kept,
        // surface velocity re-added at the end.
        assert!((out.x - 2.0).abs() < 1.0e-5);
        assert!((out.y - (-4.0)).abs() < 1.0e-5);
        assert!((out.z - (-6.0)).abs() < 1.0e-5);
    }
}
