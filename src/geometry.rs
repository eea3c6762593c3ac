use glam::Vec2;
use slotmap::SlotMap;

use crate::color::PremultipliedColor;

slotmap::new_key_type! {
    /// ID of a compiled geometry.
    pub struct GeometryId;
}

#[derive(Debug, thiserror::Error)]
#[error("missing geometry {0:?}")]
pub struct MissingGeometry(pub GeometryId);

#[derive(Debug, thiserror::Error)]
#[error("index {index} is out of bounds for {vertex_count} vertices")]
pub struct InvalidIndex {
    pub index: i32,
    pub vertex_count: usize,
}

/// A vertex as supplied by the layout engine.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec2,
    pub color: PremultipliedColor,
    /// Normalized texture coordinates in `[0, 1]`.
    pub tex_coord: Vec2,
}

/// A triangle list copied out of the layout engine's buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGeometry {
    vertices: Box<[Vertex]>,
    indices: Box<[u32]>,
}

impl CompiledGeometry {
    /// Copies `vertices` and `indices`. Every index must refer to a vertex.
    ///
    /// Trailing indices that do not form a whole triangle are ignored when drawing.
    pub fn new(vertices: &[Vertex], indices: &[i32]) -> Result<Self, InvalidIndex> {
        let indices = indices
            .iter()
            .map(|&index| {
                usize::try_from(index)
                    .ok()
                    .filter(|&i| i < vertices.len())
                    .map(|i| i as u32)
                    .ok_or(InvalidIndex {
                        index,
                        vertex_count: vertices.len(),
                    })
            })
            .collect::<Result<Box<[u32]>, _>>()?;
        Ok(Self {
            vertices: vertices.into(),
            indices,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct Geometries {
    geometries: SlotMap<GeometryId, CompiledGeometry>,
}

impl Geometries {
    pub fn add(&mut self, geometry: CompiledGeometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    pub fn get(&self, id: GeometryId) -> Result<&CompiledGeometry, MissingGeometry> {
        self.geometries.get(id).ok_or(MissingGeometry(id))
    }

    pub fn remove(&mut self, id: GeometryId) -> Result<CompiledGeometry, MissingGeometry> {
        self.geometries.remove(id).ok_or(MissingGeometry(id))
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;

    fn vertex(x: f32, y: f32) -> Vertex {
        Vertex {
            position: vec2(x, y),
            ..Default::default()
        }
    }

    #[test]
    fn triangles_follow_indices() {
        let vertices = [vertex(0., 0.), vertex(1., 0.), vertex(1., 1.), vertex(0., 1.)];
        let geometry = CompiledGeometry::new(&vertices, &[0, 1, 2, 0, 2, 3, 1]).unwrap();
        let triangles: Vec<_> = geometry.triangles().collect();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1], [vertices[0], vertices[2], vertices[3]]);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let vertices = [vertex(0., 0.)];
        let err = CompiledGeometry::new(&vertices, &[0, 1]).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.vertex_count, 1);
        assert!(CompiledGeometry::new(&vertices, &[-1]).is_err());
    }

    #[test]
    fn released_geometry_goes_missing() {
        let mut geometries = Geometries::default();
        let id = geometries.add(CompiledGeometry::new(&[], &[]).unwrap());
        assert_eq!(geometries.len(), 1);
        assert!(geometries.remove(id).is_ok());
        assert!(geometries.get(id).is_err());
    }
}
