// Catmull-Clark subdivision surface, used to round the ant-body blobs.
//
// One application replaces every n-gon with n quads, so the output is
// all-quad regardless of input. Two levels over a cube give the smooth
// 98-vertex blob the ant segments are built from:
//   level 0:  8 verts,  6 faces
//   level 1: 26 verts, 24 faces
//   level 2: 98 verts, 96 faces

use glam::Vec3;
use std::collections::HashMap;

use super::mesh::PolyMesh;

/// Canonical key for an undirected edge: always (min, max), so (a,b) and
/// (b,a) hit the same entry.
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

struct EdgeEntry {
    /// Faces adjacent to this edge: 2 for interior, 1 for boundary.
    adjacent_faces: Vec<usize>,
    /// Index of the edge-point in the output mesh, filled in phase 2.
    new_idx: usize,
}

/// Apply one level of Catmull-Clark. CCW winding is preserved.
pub fn catmull_clark(mesh: &PolyMesh) -> PolyMesh {
    let n_verts = mesh.vertex_count();

    // Phase 0: adjacency. Which faces and edges touch each vertex, and
    // which faces flank each edge.
    let mut vertex_faces: Vec<Vec<usize>> = vec![vec![]; n_verts];
    let mut vertex_edges: Vec<Vec<(usize, usize)>> = vec![vec![]; n_verts];
    let mut edge_map: HashMap<(usize, usize), EdgeEntry> = HashMap::new();

    for (fi, face) in mesh.faces.iter().enumerate() {
        let n = face.len();
        for (i, &vi) in face.iter().enumerate() {
            vertex_faces[vi].push(fi);

            let vj = face[(i + 1) % n];
            let key = edge_key(vi, vj);
            let entry = edge_map.entry(key).or_insert_with(|| EdgeEntry {
                adjacent_faces: Vec::new(),
                new_idx: 0,
            });
            if !entry.adjacent_faces.contains(&fi) {
                entry.adjacent_faces.push(fi);
            }

            if !vertex_edges[vi].contains(&key) {
                vertex_edges[vi].push(key);
            }
            if !vertex_edges[vj].contains(&key) {
                vertex_edges[vj].push(key);
            }
        }
    }

    // Phase 1: face centroids.
    let face_centroids: Vec<Vec3> = mesh
        .faces
        .iter()
        .map(|face| {
            face.iter().map(|&vi| mesh.positions[vi]).sum::<Vec3>() / face.len() as f32
        })
        .collect();

    let mut out = PolyMesh::new();

    // Phase 2: edge points.
    //   interior: (v0 + v1 + centroid_left + centroid_right) / 4
    //   boundary: (v0 + v1) / 2  (blob cubes are closed, so unused here)
    for ((a, b), entry) in edge_map.iter_mut() {
        let pa = mesh.positions[*a];
        let pb = mesh.positions[*b];
        let ep = if entry.adjacent_faces.len() == 2 {
            (pa + pb + face_centroids[entry.adjacent_faces[0]] + face_centroids[entry.adjacent_faces[1]])
                / 4.0
        } else {
            (pa + pb) / 2.0
        };
        entry.new_idx = out.add_vertex(ep);
    }

    // Phase 3: moved original vertices. For an interior vertex of valence
    // n, with F the mean adjacent centroid and R the mean adjacent edge
    // midpoint: v' = (F + 2R + (n-3)·v) / n.
    let mut moved_idx = vec![0usize; n_verts];
    for v in 0..n_verts {
        let n = vertex_faces[v].len() as f32;
        let f: Vec3 = vertex_faces[v]
            .iter()
            .map(|&fi| face_centroids[fi])
            .sum::<Vec3>()
            / n;
        let r: Vec3 = vertex_edges[v]
            .iter()
            .map(|&(a, b)| (mesh.positions[a] + mesh.positions[b]) / 2.0)
            .sum::<Vec3>()
            / n;
        moved_idx[v] = out.add_vertex((f + 2.0 * r + (n - 3.0) * mesh.positions[v]) / n);
    }

    // Face points.
    let face_point_idx: Vec<usize> = face_centroids
        .iter()
        .map(|&c| out.add_vertex(c))
        .collect();

    // Phase 4: rebuild faces. Each old n-gon becomes n quads
    //   [moved(v_i), edgepoint(v_i → v_i+1), facepoint, edgepoint(v_i-1 → v_i)]
    // which walks vertex → next edge → center → previous edge and keeps CCW.
    for (fi, face) in mesh.faces.iter().enumerate() {
        let n = face.len();
        for i in 0..n {
            let curr = face[i];
            let next = face[(i + 1) % n];
            let prev = face[(i + n - 1) % n];
            out.add_face(vec![
                moved_idx[curr],
                edge_map[&edge_key(curr, next)].new_idx,
                face_point_idx[fi],
                edge_map[&edge_key(prev, curr)].new_idx,
            ]);
        }
    }

    out
}

/// Apply Catmull-Clark `levels` times. `levels = 0` clones the input.
pub fn subdivide(mesh: &PolyMesh, levels: u32) -> PolyMesh {
    let mut current = PolyMesh {
        positions: mesh.positions.clone(),
        faces: mesh.faces.clone(),
    };
    for _ in 0..levels {
        current = catmull_clark(&current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn unit_cube() -> PolyMesh {
        let mut poly = PolyMesh::new();
        poly.add_cube(Vec3::ZERO, 0.5);
        poly
    }

    #[test]
    fn cube_vertex_counts_follow_v_plus_e_plus_f() {
        // Closed all-quad mesh: V' = V + E + F.
        let level1 = catmull_clark(&unit_cube());
        assert_eq!(level1.vertex_count(), 8 + 12 + 6);
        assert_eq!(level1.faces.len(), 24);

        let level2 = catmull_clark(&level1);
        assert_eq!(level2.vertex_count(), 26 + 48 + 24);
        assert_eq!(level2.faces.len(), 96);
    }

    #[test]
    fn output_is_all_quads() {
        let out = subdivide(&unit_cube(), 2);
        assert!(out.faces.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn subdivision_shrinks_toward_the_limit_sphere() {
        // CC pulls a cube's corners inward; every vertex of the rounded
        // blob sits strictly inside the original corner radius.
        let corner = Vec3::splat(0.5).length();
        let out = subdivide(&unit_cube(), 2);
        assert!(out.positions.iter().all(|p| p.length() < corner));
    }
}
