//! Orientation and in-circle predicates.
//!
//! Plain double-precision determinants. Callers that need robustness
//! against exact ties (collinear or cocircular inputs) must handle the
//! zero case themselves rather than rely on the sign.

use glam::DVec2;

/// Twice the signed area of triangle `(a, b, c)`.
///
/// Positive when `c` lies to the left of the directed line `a → b`
/// (counter-clockwise turn), negative to the right, zero when collinear.
#[inline]
pub fn orient2d(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// In-circle determinant for the counter-clockwise triangle `(a, b, c)`.
///
/// Positive when `d` lies strictly inside the circumcircle, negative
/// outside, zero when the four points are cocircular.
#[inline]
pub fn in_circle(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> f64 {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;

    let ad2 = ad.length_squared();
    let bd2 = bd.length_squared();
    let cd2 = cd.length_squared();

    ad.x * (bd.y * cd2 - bd2 * cd.y) - ad.y * (bd.x * cd2 - bd2 * cd.x)
        + ad2 * (bd.x * cd.y - bd.y * cd.x)
}

/// Relative error bound of [`orient2d`] (Shewchuk's `ccwerrboundA`).
const ORIENT_ERROR_BOUND: f64 = 3.330_669_073_875_471_6e-16;

/// Relative error bound of [`in_circle`] (Shewchuk's `iccerrboundA`).
const IN_CIRCLE_ERROR_BOUND: f64 = 1.110_223_024_625_156_8e-15;

/// `true` only if `c` is left of `a → b` by more than rounding error.
///
/// Collinear and nearly-collinear configurations count as "not left".
#[inline]
pub fn is_strictly_left(a: DVec2, b: DVec2, c: DVec2) -> bool {
    let ba = b - a;
    let ca = c - a;
    let det = ba.x * ca.y - ba.y * ca.x;
    let permanent = (ba.x * ca.y).abs() + (ba.y * ca.x).abs();
    det > ORIENT_ERROR_BOUND * permanent
}

/// `true` only if `d` is inside the circumcircle of the counter-clockwise
/// triangle `(a, b, c)` by more than rounding error.
///
/// Cocircular configurations count as "outside".
#[inline]
pub fn is_strictly_in_circle(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;

    let permanent = ((bd.x * cd.y).abs() + (bd.y * cd.x).abs()) * ad.length_squared()
        + ((cd.x * ad.y).abs() + (cd.y * ad.x).abs()) * bd.length_squared()
        + ((ad.x * bd.y).abs() + (ad.y * bd.x).abs()) * cd.length_squared();

    in_circle(a, b, c, d) > IN_CIRCLE_ERROR_BOUND * permanent
}
