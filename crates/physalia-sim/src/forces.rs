//! The individual forces composed by [`Simulation::tick`](crate::Simulation::tick).
//!
//! Each force only accumulates into node velocities; integration happens once
//! per tick after every active force has run. Pinned nodes are skipped by the
//! anchor and cluster forces (their pin overrides integration anyway, but the
//! drag contract removes them from those pulls explicitly).

use crate::quadtree::{QuadNode, visit_pairs};
use crate::sim::{SimEdge, SimNode, XorShift64Star};
use indexmap::IndexMap;

/// Tiny deterministic perturbation for coincident points, mirroring the
/// simulation's jiggle on zero-length deltas.
fn jiggle(rng: &mut XorShift64Star) -> f64 {
    (rng.next_f64_unit() - 0.5) * 1e-6
}

/// Spring force pulling each link toward its target distance. The
/// displacement is split between the endpoints with a degree bias, so highly
/// connected nodes move less than their leaf neighbors.
pub(crate) fn apply_link(
    nodes: &mut [SimNode],
    edges: &[SimEdge],
    alpha: f64,
    rng: &mut XorShift64Star,
) {
    for e in edges {
        let (s, t) = (e.source, e.target);
        let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
        let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
        if x == 0.0 && y == 0.0 {
            x = jiggle(rng);
            y = jiggle(rng);
        }
        let l = (x * x + y * y).sqrt();
        let k = (l - e.distance) / l * alpha * e.strength;
        x *= k;
        y *= k;
        nodes[t].vx -= x * e.bias;
        nodes[t].vy -= y * e.bias;
        nodes[s].vx += x * (1.0 - e.bias);
        nodes[s].vy += y * (1.0 - e.bias);
    }
}

/// Weak pull toward each node's anchor position. Anchors are seeded from the
/// last stable position on snapshot updates, which keeps an updated layout
/// near its previous arrangement instead of re-randomizing.
pub(crate) fn apply_anchor(nodes: &mut [SimNode], strength: f64, alpha: f64) {
    for n in nodes {
        if n.fx.is_some() || n.fy.is_some() {
            continue;
        }
        n.vx += (n.anchor_x - n.x) * strength * alpha;
        n.vy += (n.anchor_y - n.y) * strength * alpha;
    }
}

/// Mutual inverse-distance repulsion between all node pairs, approximated
/// with a Barnes-Hut pass over the quadtree. Negative `strength` repels.
pub(crate) fn apply_many_body(
    nodes: &mut [SimNode],
    strength: f64,
    theta: f64,
    alpha: f64,
    rng: &mut XorShift64Star,
) {
    let points: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
    let reach = vec![0.0; nodes.len()];
    let Some(root) = QuadNode::build(&points, &reach) else {
        return;
    };
    let theta_sq = theta * theta;
    for i in 0..nodes.len() {
        let (mut fx, mut fy) = (0.0, 0.0);
        accumulate_repulsion(&root, i, &points, strength, theta_sq, alpha, rng, &mut fx, &mut fy);
        nodes[i].vx += fx;
        nodes[i].vy += fy;
    }
}

#[allow(clippy::too_many_arguments)]
fn accumulate_repulsion(
    node: &QuadNode,
    index: usize,
    points: &[(f64, f64)],
    strength: f64,
    theta_sq: f64,
    alpha: f64,
    rng: &mut XorShift64Star,
    fx: &mut f64,
    fy: &mut f64,
) {
    if node.mass <= 0.0 {
        return;
    }
    let (px, py) = points[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let mut dx = points[other].0 - px;
            let mut dy = points[other].1 - py;
            if dx == 0.0 && dy == 0.0 {
                dx = jiggle(rng);
                dy = jiggle(rng);
            }
            let l = (dx * dx + dy * dy).max(1e-6);
            let w = strength * alpha / l;
            *fx += dx * w;
            *fy += dy * w;
        }
        return;
    }

    let dx = node.com_x - px;
    let dy = node.com_y - py;
    let l = (dx * dx + dy * dy).max(1e-6);
    let side = node.bounds.side_length();
    // Far enough away that the cell acts as one aggregate charge.
    if !node.bounds.contains(px, py) && side * side < theta_sq * l {
        let w = strength * node.mass * alpha / l;
        *fx += dx * w;
        *fy += dy * w;
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion(child, index, points, strength, theta_sq, alpha, rng, fx, fy);
    }
}

/// Rectangle-aware separation. Each node is an axis-aligned box (label text
/// extents plus the circle radius); candidate pairs come from the quadtree.
///
/// Overlap is resolved along a single axis per pair: the overlap with the
/// smaller magnitude is zeroed and both members split the remaining axis
/// delta. Resolving one axis at a time avoids diagonal jitter.
pub(crate) fn apply_collide(
    nodes: &mut [SimNode],
    strength: f64,
    iterations: usize,
    rng: &mut XorShift64Star,
) {
    for _ in 0..iterations.max(1) {
        // Predicted positions, so the resolution sees where nodes are headed.
        let points: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x + n.vx, n.y + n.vy)).collect();
        let reach: Vec<f64> = nodes
            .iter()
            .map(|n| n.half_width.max(n.half_height))
            .collect();
        let Some(root) = QuadNode::build(&points, &reach) else {
            return;
        };

        let mut resolved: Vec<(usize, usize, f64, f64)> = Vec::new();
        visit_pairs(&root, &mut |i, j| {
            let mut dx = points[i].0 - points[j].0;
            let dy = points[i].1 - points[j].1;
            if dx == 0.0 && dy == 0.0 {
                dx = jiggle(rng);
            }
            let sx = nodes[i].half_width + nodes[j].half_width;
            let sy = nodes[i].half_height + nodes[j].half_height;
            if dx.abs() >= sx || dy.abs() >= sy {
                return;
            }
            let mut lx = (sx - dx.abs()) * sign(dx);
            let mut ly = (sy - dy.abs()) * sign(dy);
            // Keep only the axis with the larger overlap magnitude.
            if lx.abs() < ly.abs() {
                lx = 0.0;
            } else {
                ly = 0.0;
            }
            resolved.push((i, j, lx, ly));
        });

        for (i, j, lx, ly) in resolved {
            nodes[i].vx += lx * 0.5 * strength;
            nodes[i].vy += ly * 0.5 * strength;
            nodes[j].vx -= lx * 0.5 * strength;
            nodes[j].vy -= ly * 0.5 * strength;
        }
    }
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Pulls each node toward the radius²-weighted centroid of its category,
/// scaled by the current alpha. Ungrouped nodes are left alone.
pub(crate) fn apply_cluster(
    nodes: &mut [SimNode],
    groups: &IndexMap<String, Vec<usize>>,
    strength: f64,
    alpha: f64,
) {
    let l = alpha * strength;
    for members in groups.values() {
        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut z = 0.0;
        for &i in members {
            let k = nodes[i].radius * nodes[i].radius;
            cx += nodes[i].x * k;
            cy += nodes[i].y * k;
            z += k;
        }
        if z == 0.0 {
            continue;
        }
        cx /= z;
        cy /= z;
        for &i in members {
            if nodes[i].fx.is_some() || nodes[i].fy.is_some() {
                continue;
            }
            nodes[i].vx -= (nodes[i].x - cx) * l;
            nodes[i].vy -= (nodes[i].y - cy) * l;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_collide, apply_cluster};
    use crate::sim::{SimNode, XorShift64Star};
    use indexmap::IndexMap;

    fn boxed(id: &str, x: f64, y: f64, hw: f64, hh: f64) -> SimNode {
        let mut n = SimNode::at(id, x, y);
        n.half_width = hw;
        n.half_height = hh;
        n
    }

    #[test]
    fn collision_resolves_only_the_larger_overlap_axis() {
        // Boxes overlap by 4 in x and 1 in y: y has the smaller magnitude and
        // must stay untouched.
        let mut nodes = vec![boxed("a", 0.0, 0.0, 5.0, 2.0), boxed("b", 6.0, 3.0, 5.0, 2.0)];
        let mut rng = XorShift64Star::new(1);
        apply_collide(&mut nodes, 1.0, 1, &mut rng);
        assert_eq!(nodes[0].vy, 0.0);
        assert_eq!(nodes[1].vy, 0.0);
        assert!(nodes[0].vx < 0.0, "a pushed left, got {}", nodes[0].vx);
        assert!(nodes[1].vx > 0.0, "b pushed right, got {}", nodes[1].vx);
        // Equal shares.
        assert!((nodes[0].vx + nodes[1].vx).abs() < 1e-12);
    }

    #[test]
    fn collision_ignores_separated_boxes() {
        let mut nodes = vec![boxed("a", 0.0, 0.0, 2.0, 2.0), boxed("b", 10.0, 0.0, 2.0, 2.0)];
        let mut rng = XorShift64Star::new(1);
        apply_collide(&mut nodes, 1.0, 3, &mut rng);
        assert_eq!(nodes[0].vx, 0.0);
        assert_eq!(nodes[1].vx, 0.0);
    }

    #[test]
    fn coincident_boxes_still_separate() {
        let mut nodes = vec![boxed("a", 1.0, 1.0, 2.0, 2.0), boxed("b", 1.0, 1.0, 2.0, 2.0)];
        let mut rng = XorShift64Star::new(1);
        apply_collide(&mut nodes, 1.0, 1, &mut rng);
        let moved = nodes[0].vx.abs() + nodes[0].vy.abs() > 0.0
            || nodes[1].vx.abs() + nodes[1].vy.abs() > 0.0;
        assert!(moved, "coincident boxes should receive a separating push");
    }

    #[test]
    fn cluster_pulls_members_toward_their_centroid() {
        let mut a = SimNode::at("a", -10.0, 0.0);
        let mut b = SimNode::at("b", 10.0, 0.0);
        a.radius = 2.0;
        b.radius = 2.0;
        a.group = Some("g".to_string());
        b.group = Some("g".to_string());
        let mut nodes = vec![a, b];
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        groups.insert("g".to_string(), vec![0, 1]);
        apply_cluster(&mut nodes, &groups, 0.5, 1.0);
        assert!(nodes[0].vx > 0.0);
        assert!(nodes[1].vx < 0.0);
    }

    #[test]
    fn pinned_nodes_are_excluded_from_cluster_pull() {
        let mut a = SimNode::at("a", -10.0, 0.0);
        let mut b = SimNode::at("b", 10.0, 0.0);
        a.radius = 2.0;
        b.radius = 2.0;
        a.group = Some("g".to_string());
        b.group = Some("g".to_string());
        a.fx = Some(-10.0);
        a.fy = Some(0.0);
        let mut nodes = vec![a, b];
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        groups.insert("g".to_string(), vec![0, 1]);
        apply_cluster(&mut nodes, &groups, 0.5, 1.0);
        assert_eq!(nodes[0].vx, 0.0);
        assert!(nodes[1].vx < 0.0);
    }
}
