//! Expanding Polytope Algorithm for penetration depth

use glam::{DQuat, DVec3};

use super::gjk::MinkowskiPair;
use super::simplex::{Simplex, SupportPoint};
use super::PairDistance;

const MAX_ITERATIONS: usize = 64;
/// Face budget; a polytope that grows past it is abandoned.
const MAX_FACES: usize = 512;
const TOLERANCE: f64 = 1e-9;
/// Minimum distance between seed vertices for the initial tetrahedron.
const SEED_EPS: f64 = 1e-10;

#[derive(Clone, Copy)]
struct Face {
    idx: [usize; 3],
    normal: DVec3,
    dist: f64,
}

impl Face {
    /// Slivers and faces turned towards the interior stay in the mesh so it
    /// remains closed, but they are never visible and never the closest.
    fn sliver(idx: [usize; 3]) -> Self {
        Self {
            idx,
            normal: DVec3::ZERO,
            dist: f64::INFINITY,
        }
    }

    fn is_sliver(&self) -> bool {
        self.dist.is_infinite()
    }
}

struct Polytope {
    vertices: Vec<SupportPoint>,
    faces: Vec<Face>,
    interior: DVec3,
}

impl Polytope {
    /// Builds an outward-facing seed face, or `None` for a sliver triangle.
    fn seed_face(&self, i: usize, j: usize, k: usize) -> Option<Face> {
        let [a, b, c] = [self.vertices[i].w, self.vertices[j].w, self.vertices[k].w];
        let mut normal = (b - a).cross(c - a).try_normalize()?;
        let mut idx = [i, j, k];
        if normal.dot(a - self.interior) < 0.0 {
            normal = -normal;
            idx = [i, k, j];
        }
        Some(Face {
            idx,
            normal,
            dist: normal.dot(a),
        })
    }

    /// Builds a fan face over a horizon edge. The edge already carries the
    /// outward winding of the face it came from, so the winding is kept even
    /// when the triangle is too thin to orient.
    fn fan_face(&self, p: usize, q: usize, apex: usize) -> Face {
        let idx = [p, q, apex];
        let [a, b, c] = idx.map(|i| self.vertices[i].w);
        match (b - a).cross(c - a).try_normalize() {
            Some(normal) if normal.dot(a - self.interior) > 0.0 => Face {
                idx,
                normal,
                dist: normal.dot(a),
            },
            _ => Face::sliver(idx),
        }
    }

    fn closest_face(&self) -> Option<Face> {
        self.faces
            .iter()
            .filter(|face| !face.is_sliver())
            .copied()
            .min_by(|x, y| x.dist.total_cmp(&y.dist))
    }

    /// Replaces every face visible from the new vertex by a fan around it.
    /// Returns `false` if nothing was visible.
    fn expand(&mut self, s: SupportPoint) -> bool {
        let new_idx = self.vertices.len();
        self.vertices.push(s);

        let mut horizon: Vec<[usize; 2]> = Vec::new();
        let mut kept = Vec::with_capacity(self.faces.len() + 2);
        for face in &self.faces {
            let a = self.vertices[face.idx[0]].w;
            if !face.is_sliver() && face.normal.dot(s.w - a) > TOLERANCE {
                for (p, q) in [
                    (face.idx[0], face.idx[1]),
                    (face.idx[1], face.idx[2]),
                    (face.idx[2], face.idx[0]),
                ] {
                    if let Some(pos) = horizon.iter().position(|e| *e == [q, p]) {
                        horizon.swap_remove(pos);
                    } else {
                        horizon.push([p, q]);
                    }
                }
            } else {
                kept.push(*face);
            }
        }

        if kept.len() == self.faces.len() {
            self.vertices.pop();
            return false;
        }
        self.faces = kept;
        for [p, q] in horizon {
            let face = self.fan_face(p, q, new_idx);
            self.faces.push(face);
        }
        true
    }
}

/// Penetration between overlapping shapes, starting from GJK's final
/// simplex. Returns `None` if no full-dimensional polytope can be seeded,
/// every face has collapsed, or the polytope outgrows its face budget.
pub(crate) fn penetration(pair: &MinkowskiPair<'_>, simplex: &Simplex) -> Option<PairDistance> {
    let seed = seed_tetrahedron(pair, simplex.points())?;
    let interior = seed.iter().map(|p| p.w).sum::<DVec3>() / 4.0;

    let mut polytope = Polytope {
        vertices: seed.to_vec(),
        faces: Vec::with_capacity(32),
        interior,
    };
    for [i, j, k] in [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]] {
        let face = polytope.seed_face(i, j, k)?;
        polytope.faces.push(face);
    }

    for _ in 0..MAX_ITERATIONS {
        let face = polytope.closest_face()?;
        let s = pair.support(face.normal);
        let gain = s.w.dot(face.normal) - face.dist;
        if gain < TOLERANCE || !polytope.expand(s) {
            return Some(contact_from_face(&polytope, &face));
        }
        if polytope.faces.len() > MAX_FACES {
            tracing::debug!(faces = polytope.faces.len(), "EPA polytope over face budget");
            return None;
        }
    }
    polytope
        .closest_face()
        .map(|face| contact_from_face(&polytope, &face))
}

fn contact_from_face(polytope: &Polytope, face: &Face) -> PairDistance {
    let [a, b, c] = face.idx.map(|i| polytope.vertices[i]);
    let projected = face.normal * face.dist;
    let [u, v, w] = barycentric(projected, a.w, b.w, c.w);
    PairDistance {
        distance: -face.dist,
        point_a: a.a * u + b.a * v + c.a * w,
        point_b: a.b * u + b.b * v + c.b * w,
        normal: face.normal,
    }
}

fn barycentric(p: DVec3, a: DVec3, b: DVec3, c: DVec3) -> [f64; 3] {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-30 {
        return [1.0, 0.0, 0.0];
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    [1.0 - v - w, v, w]
}

/// Grows GJK's terminal simplex into a non-degenerate tetrahedron by adding
/// support points in directions the simplex does not yet span.
fn seed_tetrahedron(pair: &MinkowskiPair<'_>, start: &[SupportPoint]) -> Option<[SupportPoint; 4]> {
    let mut pts: Vec<SupportPoint> = start.to_vec();

    if pts.len() == 1 {
        let axes = [DVec3::X, DVec3::Y, DVec3::Z, -DVec3::X, -DVec3::Y, -DVec3::Z];
        let found = axes
            .iter()
            .map(|d| pair.support(*d))
            .find(|s| (s.w - pts[0].w).length() > SEED_EPS)?;
        pts.push(found);
    }

    if pts.len() == 2 {
        let line = (pts[1].w - pts[0].w).normalize();
        let least = if line.x.abs() < line.y.abs() && line.x.abs() < line.z.abs() {
            DVec3::X
        } else if line.y.abs() < line.z.abs() {
            DVec3::Y
        } else {
            DVec3::Z
        };
        let perp = line.cross(least).normalize();
        let (base, dir_line) = (pts[0].w, line);
        let found = (0..6)
            .map(|k| DQuat::from_axis_angle(line, f64::from(k) * std::f64::consts::FRAC_PI_3) * perp)
            .map(|d| pair.support(d))
            .find(|s| {
                let rel = s.w - base;
                (rel - dir_line * rel.dot(dir_line)).length() > SEED_EPS
            })?;
        pts.push(found);
    }

    if pts.len() == 3 {
        let n = (pts[1].w - pts[0].w).cross(pts[2].w - pts[0].w).try_normalize()?;
        let up = pair.support(n);
        let found = if n.dot(up.w - pts[0].w).abs() > SEED_EPS {
            up
        } else {
            let down = pair.support(-n);
            if n.dot(down.w - pts[0].w).abs() > SEED_EPS {
                down
            } else {
                return None;
            }
        };
        pts.push(found);
    }

    let [a, b, c, d] = [pts[0], pts[1], pts[2], pts[3]];
    let volume = (b.w - a.w).cross(c.w - a.w).dot(d.w - a.w);
    if volume.abs() < SEED_EPS * SEED_EPS {
        return None;
    }
    Some([a, b, c, d])
}
