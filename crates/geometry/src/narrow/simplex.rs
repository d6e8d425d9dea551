//! Fixed-capacity simplex for GJK with closest-point-to-origin reduction

use glam::DVec3;

/// Vertex of the Minkowski difference `A - B`, remembering the support
/// points on each shape so witness points can be recovered.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SupportPoint {
    pub w: DVec3,
    pub a: DVec3,
    pub b: DVec3,
}

#[derive(Debug, Clone)]
pub(crate) struct Simplex {
    points: [SupportPoint; 4],
    weights: [f64; 4],
    len: usize,
}

impl Simplex {
    pub fn new(first: SupportPoint) -> Self {
        Self {
            points: [first; 4],
            weights: [1.0, 0.0, 0.0, 0.0],
            len: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn points(&self) -> &[SupportPoint] {
        &self.points[..self.len]
    }

    pub fn push(&mut self, p: SupportPoint) {
        debug_assert!(self.len < 4);
        self.points[self.len] = p;
        self.len += 1;
    }

    /// Closest point of the simplex to the origin as barycentric combination
    /// of the witness points: `(point on A, point on B)`.
    pub fn witnesses(&self) -> (DVec3, DVec3) {
        let mut a = DVec3::ZERO;
        let mut b = DVec3::ZERO;
        for (p, w) in self.points().iter().zip(&self.weights) {
            a += p.a * *w;
            b += p.b * *w;
        }
        (a, b)
    }

    /// Shrinks the simplex to the smallest sub-simplex containing the point
    /// closest to the origin and returns that point. A full tetrahedron is
    /// kept only when it contains the origin.
    pub fn reduce(&mut self) -> DVec3 {
        match self.len {
            1 => {
                self.weights[0] = 1.0;
                self.points[0].w
            }
            2 => self.reduce_segment(0, 1),
            3 => self.reduce_triangle(0, 1, 2),
            _ => self.reduce_tetrahedron(),
        }
    }

    fn keep(&mut self, picked: &[(usize, f64)]) -> DVec3 {
        let old = self.points;
        let mut closest = DVec3::ZERO;
        for (slot, (idx, weight)) in picked.iter().enumerate() {
            self.points[slot] = old[*idx];
            self.weights[slot] = *weight;
            closest += old[*idx].w * *weight;
        }
        self.len = picked.len();
        closest
    }

    fn reduce_segment(&mut self, i: usize, j: usize) -> DVec3 {
        let (region, _) = segment_weights(self.points[i].w, self.points[j].w);
        match region {
            SegmentRegion::Start => self.keep(&[(i, 1.0)]),
            SegmentRegion::End => self.keep(&[(j, 1.0)]),
            SegmentRegion::Interior(t) => self.keep(&[(i, 1.0 - t), (j, t)]),
        }
    }

    fn reduce_triangle(&mut self, i: usize, j: usize, k: usize) -> DVec3 {
        let picked = triangle_weights(
            [i, j, k],
            self.points[i].w,
            self.points[j].w,
            self.points[k].w,
        );
        self.keep(&picked[..])
    }

    fn reduce_tetrahedron(&mut self) -> DVec3 {
        let [a, b, c, d] = [
            self.points[0].w,
            self.points[1].w,
            self.points[2].w,
            self.points[3].w,
        ];
        let faces = [
            ([0, 1, 2], d),
            ([0, 2, 3], b),
            ([0, 3, 1], c),
            ([1, 3, 2], a),
        ];

        let mut best: Option<(f64, Vec<(usize, f64)>)> = None;
        for (face, opposite) in faces {
            let [p, q, r] = face.map(|i| self.points[i].w);
            if !origin_outside_face(p, q, r, opposite) {
                continue;
            }
            let picked = triangle_weights(face, p, q, r);
            let point: DVec3 = picked
                .iter()
                .map(|(idx, weight)| self.points[*idx].w * *weight)
                .sum();
            let dist = point.length_squared();
            if best.as_ref().map_or(true, |(d, _)| dist < *d) {
                best = Some((dist, picked));
            }
        }

        match best {
            Some((_, picked)) => self.keep(&picked),
            None => {
                // Origin enclosed
                self.weights = [0.25; 4];
                DVec3::ZERO
            }
        }
    }
}

enum SegmentRegion {
    Start,
    End,
    Interior(f64),
}

fn segment_weights(a: DVec3, b: DVec3) -> (SegmentRegion, f64) {
    let ab = b - a;
    let denom = ab.length_squared();
    if denom < 1e-24 {
        return (SegmentRegion::Start, a.length_squared());
    }
    let t = -a.dot(ab) / denom;
    if t <= 0.0 {
        (SegmentRegion::Start, a.length_squared())
    } else if t >= 1.0 {
        (SegmentRegion::End, b.length_squared())
    } else {
        (SegmentRegion::Interior(t), (a + ab * t).length_squared())
    }
}

/// Voronoi-region walk for the point of triangle `abc` closest to the
/// origin. Returns the supporting vertex indices with their weights.
fn triangle_weights(idx: [usize; 3], a: DVec3, b: DVec3, c: DVec3) -> Vec<(usize, f64)> {
    let [ia, ib, ic] = idx;
    let ab = b - a;
    let ac = c - a;

    let d1 = ab.dot(-a);
    let d2 = ac.dot(-a);
    if d1 <= 0.0 && d2 <= 0.0 {
        return vec![(ia, 1.0)];
    }

    let d3 = ab.dot(-b);
    let d4 = ac.dot(-b);
    if d3 >= 0.0 && d4 <= d3 {
        return vec![(ib, 1.0)];
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return vec![(ia, 1.0 - v), (ib, v)];
    }

    let d5 = ab.dot(-c);
    let d6 = ac.dot(-c);
    if d6 >= 0.0 && d5 <= d6 {
        return vec![(ic, 1.0)];
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return vec![(ia, 1.0 - w), (ic, w)];
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return vec![(ib, 1.0 - w), (ic, w)];
    }

    let sum = va + vb + vc;
    if sum.abs() < 1e-30 {
        // Collinear vertices: best of the three edges
        return [(ia, ib, a, b), (ib, ic, b, c), (ia, ic, a, c)]
            .into_iter()
            .map(|(i, j, p, q)| {
                let (region, dist) = segment_weights(p, q);
                let picked = match region {
                    SegmentRegion::Start => vec![(i, 1.0)],
                    SegmentRegion::End => vec![(j, 1.0)],
                    SegmentRegion::Interior(t) => vec![(i, 1.0 - t), (j, t)],
                };
                (dist, picked)
            })
            .min_by(|x, y| x.0.total_cmp(&y.0))
            .map_or_else(|| vec![(ia, 1.0)], |(_, picked)| picked);
    }

    let v = vb / sum;
    let w = vc / sum;
    vec![(ia, 1.0 - v - w), (ib, v), (ic, w)]
}

/// True when the origin and `opposite` lie on different sides of the plane
/// through `a`, `b`, `c`. Flat tetrahedra treat every face as outside.
fn origin_outside_face(a: DVec3, b: DVec3, c: DVec3, opposite: DVec3) -> bool {
    let n = (b - a).cross(c - a);
    let sign_origin = (-a).dot(n);
    let sign_opposite = (opposite - a).dot(n);
    sign_opposite.abs() < 1e-18 || sign_origin * sign_opposite < 0.0
}
