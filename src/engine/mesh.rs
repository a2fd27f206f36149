// Procedural meshes for the vignette.
//
// Pipeline: blob cubes → Catmull-Clark subdivision → smooth-shaded
// RenderMesh → GPU. The ant body is three rounded blobs (head, thorax,
// abdomen) strung along local +Z; the sugar cube stays an unsubdivided
// cube so its edges read as crystalline.

use glam::Vec3;

use super::subdivide::subdivide;

// ============================================================================
// GPU VERTEX
// ============================================================================

/// GPU-ready vertex, position + normal:
///   @location(0) position: vec3<f32>
///   @location(1) normal:   vec3<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl GpuVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

// ============================================================================
// POLY MESH
// ============================================================================

/// Intermediate polygon mesh with n-gon faces, CCW winding viewed from
/// outside. Built once at startup; not GPU-ready.
pub struct PolyMesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<Vec<usize>>,
}

impl PolyMesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, pos: Vec3) -> usize {
        self.positions.push(pos);
        self.positions.len() - 1
    }

    pub fn add_face(&mut self, indices: Vec<usize>) {
        debug_assert!(indices.len() >= 3, "face needs at least 3 vertices");
        self.faces.push(indices);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Append an axis-aligned cube of half-extent `r` centered on `p`.
    /// Six CCW quad faces; starting point for every blob in the scene.
    pub fn add_cube(&mut self, p: Vec3, r: f32) {
        let base = self.vertex_count();
        self.add_vertex(Vec3::new(p.x - r, p.y - r, p.z + r)); // 0 front-bottom-left
        self.add_vertex(Vec3::new(p.x + r, p.y - r, p.z + r)); // 1 front-bottom-right
        self.add_vertex(Vec3::new(p.x + r, p.y + r, p.z + r)); // 2 front-top-right
        self.add_vertex(Vec3::new(p.x - r, p.y + r, p.z + r)); // 3 front-top-left
        self.add_vertex(Vec3::new(p.x + r, p.y - r, p.z - r)); // 4 back-bottom-right
        self.add_vertex(Vec3::new(p.x - r, p.y - r, p.z - r)); // 5 back-bottom-left
        self.add_vertex(Vec3::new(p.x - r, p.y + r, p.z - r)); // 6 back-top-left
        self.add_vertex(Vec3::new(p.x + r, p.y + r, p.z - r)); // 7 back-top-right

        let v = |i: usize| base + i;
        self.add_face(vec![v(0), v(1), v(2), v(3)]); // front  (+Z)
        self.add_face(vec![v(4), v(5), v(6), v(7)]); // back   (-Z)
        self.add_face(vec![v(5), v(0), v(3), v(6)]); // left   (-X)
        self.add_face(vec![v(1), v(4), v(7), v(2)]); // right  (+X)
        self.add_face(vec![v(3), v(2), v(7), v(6)]); // top    (+Y)
        self.add_face(vec![v(5), v(4), v(1), v(0)]); // bottom (-Y)
    }
}

// ============================================================================
// RENDER MESH
// ============================================================================

/// GPU-ready triangulated mesh with per-vertex smooth normals.
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Triangulate a PolyMesh with area-weighted smooth normals.
    ///
    /// Vertices stay shared across triangles through the index buffer. The
    /// cross product of each fan triangle is accumulated unnormalized —
    /// its magnitude is 2x the triangle area, which is exactly the
    /// area-weighting we want — and normalized once at the end.
    pub fn from_poly(poly: &PolyMesh) -> Self {
        let mut normal_accum = vec![Vec3::ZERO; poly.vertex_count()];
        let mut indices: Vec<u32> = Vec::new();

        for face in &poly.faces {
            // Fan-triangulate from vertex 0.
            for i in 1..(face.len() - 1) {
                let (a, b, c) = (face[0], face[i], face[i + 1]);
                let weighted = (poly.positions[b] - poly.positions[a])
                    .cross(poly.positions[c] - poly.positions[a]);
                normal_accum[a] += weighted;
                normal_accum[b] += weighted;
                normal_accum[c] += weighted;

                indices.push(a as u32);
                indices.push(b as u32);
                indices.push(c as u32);
            }
        }

        let vertices = poly
            .positions
            .iter()
            .zip(&normal_accum)
            .map(|(pos, n)| GpuVertex {
                position: pos.to_array(),
                normal: n.normalize_or_zero().to_array(),
            })
            .collect();

        Self { vertices, indices }
    }
}

// ============================================================================
// SCENE MESHES
// ============================================================================

/// Ant body: head, thorax, abdomen blobs along local +Z (the facing axis),
/// rounded by two levels of Catmull-Clark. Sized in local units; the
/// instance scale (0.08) brings it down to ant size.
pub fn ant_body() -> RenderMesh {
    let mut poly = PolyMesh::new();
    poly.add_cube(Vec3::new(0.0, 0.02, 0.16), 0.12); // head
    poly.add_cube(Vec3::new(0.0, 0.02, 0.0), 0.14); // thorax
    poly.add_cube(Vec3::new(0.0, 0.02, -0.18), 0.16); // abdomen
    RenderMesh::from_poly(&subdivide(&poly, 2))
}

/// Sugar cube: a crisp cube, no subdivision.
pub fn sugar_cube(size: f32) -> RenderMesh {
    let mut poly = PolyMesh::new();
    poly.add_cube(Vec3::ZERO, size * 0.5);
    RenderMesh::from_poly(&poly)
}

/// Ground slab under the colony; a flattened unit cube is cheaper than a
/// dedicated plane pipeline and shares the instanced shader.
pub fn ground_slab() -> RenderMesh {
    let mut poly = PolyMesh::new();
    poly.add_cube(Vec3::ZERO, 0.5);
    RenderMesh::from_poly(&poly)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_triangulates_to_twelve_triangles() {
        let mesh = sugar_cube(0.18);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.index_count(), 36);
    }

    #[test]
    fn ant_body_is_three_subdivided_blobs() {
        // One cube at CC level 2 has 98 vertices and 96 quads; the three
        // blobs are disjoint so the counts just triple.
        let mesh = ant_body();
        assert_eq!(mesh.vertices.len(), 3 * 98);
        assert_eq!(mesh.index_count(), 3 * 96 * 2 * 3);
    }

    #[test]
    fn normals_are_unit_length_and_outward() {
        let mesh = sugar_cube(1.0);
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            // Cube corner normals point away from the center.
            assert!(n.dot(Vec3::from_array(v.position)) > 0.0);
        }
    }
}
