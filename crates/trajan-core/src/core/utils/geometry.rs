use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// A proper rigid-body motion: rotation about the origin followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }

    pub fn apply_all(&self, points: &mut [Point3<f64>]) {
        for point in points.iter_mut() {
            *point = self.apply(point);
        }
    }
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Computes the rigid transform that maps `from_points` onto `to_points` with
/// the least sum of squared distances (Kabsch algorithm).
///
/// The rotation is taken from the SVD of the cross-covariance matrix of the
/// centered point sets, with the sign of the smallest singular direction
/// flipped when needed so that the result is never a reflection.
///
/// Returns `None` for empty or mismatched inputs, or if the decomposition fails.
pub fn calculate_superposition(
    from_points: &[Point3<f64>],
    to_points: &[Point3<f64>],
) -> Option<RigidTransform> {
    if from_points.len() != to_points.len() {
        return None;
    }
    let from_centroid = centroid(from_points)?;
    let to_centroid = centroid(to_points)?;

    let h = from_points
        .iter()
        .zip(to_points.iter())
        .fold(Matrix3::zeros(), |acc, (f, t)| {
            acc + (t - to_centroid) * (f - from_centroid).transpose()
        });

    let svd = h.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;

    let d = (u * v_t).determinant();
    let mut correction = Matrix3::identity();
    if d < 0.0 {
        correction[(2, 2)] = -1.0;
    }

    let rotation = Rotation3::from_matrix_unchecked(u * correction * v_t);
    let translation = to_centroid.coords - rotation * from_centroid.coords;

    Some(RigidTransform {
        rotation,
        translation,
    })
}

/// Superposes `mobile` onto `target` in place and returns the RMSD after fitting.
pub fn superpose(mobile: &mut [Point3<f64>], target: &[Point3<f64>]) -> Option<f64> {
    let transform = calculate_superposition(mobile, target)?;
    transform.apply_all(mobile);
    calculate_rmsd(mobile, target)
}
