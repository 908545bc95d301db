//! Geometric value types threaded through facts and task plans.
//!
//! These are deliberately thin: the crate never plans paths or checks collisions, it only
//! carries poses and paths between the world model, the planner and the executor.

use std::f64::consts::PI;

use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Wraps an angle into the range `[-pi, pi]`.
///
/// Positive multiples of `pi` map to `pi`, negative ones to `-pi`. Non-finite input has no
/// meaningful heading and yields NaN.
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return f64::NAN;
    }
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI && angle > 0.0 {
        PI
    } else {
        wrapped
    }
}

/// A 2.5D pose: position in 3D plus a heading about the vertical axis.
///
/// The position is stored as a [`nalgebra::Vector3<f64>`]; yaw is always kept wrapped, including
/// when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPose")]
pub struct Pose {
    position: Vector3<f64>,
    yaw: f64,
}

/// Wire shape of [`Pose`]; converted through [`Pose::new`] so yaw gets wrapped.
#[derive(Deserialize)]
struct RawPose {
    position: Vector3<f64>,
    yaw: f64,
}

impl From<RawPose> for Pose {
    fn from(raw: RawPose) -> Self {
        Self::new(raw.position.x, raw.position.y, raw.position.z, raw.yaw)
    }
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            yaw: wrap_angle(yaw),
        }
    }

    /// Planar pose at ground height.
    pub fn from_xy_yaw(x: f64, y: f64, yaw: f64) -> Self {
        Self::new(x, y, 0.0, yaw)
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    /// Planar (XY) distance to another pose.
    pub fn planar_distance(&self, other: &Pose) -> f64 {
        (other.position.xy() - self.position.xy()).norm()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pose: [x={:.2}, y={:.2}, z={:.2}, yaw={:.2}]",
            self.x(),
            self.y(),
            self.z(),
            self.yaw
        )
    }
}

/// An ordered sequence of poses produced by an external path planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    poses: Vec<Pose>,
}

impl Path {
    pub fn new(poses: Vec<Pose>) -> Self {
        Self { poses }
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Total planar length of the polyline through all poses.
    pub fn length(&self) -> f64 {
        self.poses
            .windows(2)
            .map(|pair| pair[0].planar_distance(&pair[1]))
            .sum()
    }
}

/// Axis-aligned planar footprint used for resolving poses to locations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    min: Point2<f64>,
    max: Point2<f64>,
}

impl Footprint {
    /// Builds a footprint from two opposite corners in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min: Point2::new(a.0.min(b.0), a.1.min(b.1)),
            max: Point2::new(a.0.max(b.0), a.1.max(b.1)),
        }
    }

    /// Returns true when the pose's XY position lies inside (or on the edge of) the box.
    pub fn contains(&self, pose: &Pose) -> bool {
        (self.min.x..=self.max.x).contains(&pose.x()) && (self.min.y..=self.max.y).contains(&pose.y())
    }

    pub fn area(&self) -> f64 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }
}
