//! Basic geometry primitives: points and the orthonormal frames placements are built from.

use nalgebra::{Matrix3, Matrix4, Vector3};

/// Representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Representation of a 3D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Calculates the Euclidean distance between two 3D points.
pub fn distance3(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// Rotates `(x, y)` counter-clockwise by `angle` radians.
pub fn rotate(x: f64, y: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Right-handed frame attached to a point on a curve.
///
/// `tangent` points along the direction of travel, `lateral` to the left of
/// it and `up` completes the basis (`up = tangent × lateral`). The columns of
/// [`Frame::to_matrix`] are, in order, tangent, lateral, up and origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Vector3<f64>,
    pub tangent: Vector3<f64>,
    pub lateral: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl Frame {
    /// Builds the frame of a travel direction given by a plan heading and a
    /// gradient (rise over horizontal run). The lateral axis stays horizontal.
    pub fn from_heading(origin: Vector3<f64>, heading: f64, gradient: f64) -> Self {
        let (sin, cos) = heading.sin_cos();
        let tangent = Vector3::new(cos, sin, gradient).normalize();
        let lateral = Vector3::new(-sin, cos, 0.0);
        let up = tangent.cross(&lateral);
        Self {
            origin,
            tangent,
            lateral,
            up,
        }
    }

    /// Builds the frame of an arbitrary 3D travel direction. The lateral axis
    /// is the horizontal left-hand normal; for a vertical direction the global
    /// Y axis is used instead.
    pub fn from_direction(origin: Vector3<f64>, direction: Vector3<f64>) -> Self {
        let tangent = direction.normalize();
        let left = Vector3::z().cross(&tangent);
        let lateral = if left.norm() > 1e-12 {
            left.normalize()
        } else {
            Vector3::y()
        };
        let up = tangent.cross(&lateral);
        Self {
            origin,
            tangent,
            lateral,
            up,
        }
    }

    /// Rotates the cross-section axes about the tangent. A positive angle
    /// lifts the lateral (left) axis towards up.
    pub fn rolled(&self, angle: f64) -> Self {
        if angle == 0.0 {
            return *self;
        }
        let (sin, cos) = angle.sin_cos();
        Self {
            origin: self.origin,
            tangent: self.tangent,
            lateral: self.lateral * cos + self.up * sin,
            up: self.up * cos - self.lateral * sin,
        }
    }

    /// Moves the origin, keeping the orientation.
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            origin: self.origin + offset,
            ..*self
        }
    }

    /// Moves the origin by distances measured along this frame's own axes.
    pub fn offset(&self, longitudinal: f64, lateral: f64, vertical: f64) -> Self {
        self.translated(self.tangent * longitudinal + self.lateral * lateral + self.up * vertical)
    }

    pub fn origin_point(&self) -> Point3 {
        Point3::from_vector(&self.origin)
    }

    /// Rotation part as a 3x3 matrix with columns tangent, lateral, up.
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[self.tangent, self.lateral, self.up])
    }

    pub fn determinant(&self) -> f64 {
        self.rotation().determinant()
    }

    /// Largest deviation of the basis from orthonormality (unit axes, zero dot products).
    pub fn orthonormality_error(&self) -> f64 {
        let axes = [self.tangent, self.lateral, self.up];
        let mut worst: f64 = 0.0;
        for (i, a) in axes.iter().enumerate() {
            worst = worst.max((a.norm() - 1.0).abs());
            for b in axes.iter().skip(i + 1) {
                worst = worst.max(a.dot(b).abs());
            }
        }
        worst
    }

    /// Homogeneous transform from the frame's local coordinates to the parent frame.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let (t, l, u, o) = (self.tangent, self.lateral, self.up, self.origin);
        Matrix4::new(
            t.x, l.x, u.x, o.x, //
            t.y, l.y, u.y, o.y, //
            t.z, l.z, u.z, o.z, //
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
