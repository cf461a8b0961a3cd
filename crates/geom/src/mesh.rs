use glam::DVec3;

use crate::{GeometryError, MeshLike, Tracked};

/// Default grey used when a mesh is built without colours.
const DEFAULT_GREY: f32 = 0.5;

/// Generic 3D mesh: flat xyz positions, primitive indices and per-vertex RGB
/// colours.
///
/// Positions and colours are tracked separately so a renderer re-uploads only
/// the buffer that changed.
#[derive(Debug, Clone)]
pub struct Mesh3D {
    vertex_count: usize,
    positions: Tracked<Vec<f64>>,
    colours: Tracked<Vec<f32>>,
    indices: Vec<u32>,
}

impl Mesh3D {
    /// Build a mesh. `colours` defaults to grey for every vertex.
    ///
    /// Fails if positions are not xyz triplets, if colours do not hold exactly
    /// one RGB triplet per vertex, or if an index points past the last vertex.
    pub fn new(
        positions: Vec<f64>,
        indices: Vec<u32>,
        colours: Option<Vec<f32>>,
    ) -> Result<Self, GeometryError> {
        if positions.len() % 3 != 0 {
            return Err(GeometryError::PositionsNotTriplets(positions.len()));
        }
        let vertex_count = positions.len() / 3;

        let colours = match colours {
            Some(c) => {
                check_len("colours", 3 * vertex_count, c.len())?;
                c
            }
            None => vec![DEFAULT_GREY; 3 * vertex_count],
        };

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(Self {
            vertex_count,
            positions: Tracked::new(positions),
            colours: Tracked::new(colours),
            indices,
        })
    }

    /// Two-vertex rod drawn as a line: vertex 0 is the free end, hanging at
    /// `(0, -length, 0)`; vertex 1 is the pivot at the origin.
    pub fn rod(length: f64) -> Self {
        Self {
            vertex_count: 2,
            positions: Tracked::new(vec![0.0, -length, 0.0, 0.0, 0.0, 0.0]),
            colours: Tracked::new(vec![1.0, 1.0, 1.0, DEFAULT_GREY, DEFAULT_GREY, DEFAULT_GREY]),
            indices: vec![0, 1],
        }
    }

    /// Axis-aligned square of side `side` in the z = 0 plane, two triangles.
    ///
    /// Vertex order is `(-h, h)`, `(h, h)`, `(h, -h)`, `(-h, -h)` with
    /// `h = side / 2`.
    pub fn square(side: f64) -> Self {
        let corners = square_corners(side);
        let positions = corners.iter().flat_map(|c| c.to_array()).collect();
        #[rustfmt::skip]
        let colours = vec![
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
            1.0, 1.0, 0.0,
        ];
        Self {
            vertex_count: 4,
            positions: Tracked::new(positions),
            colours: Tracked::new(colours),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn positions(&self) -> &[f64] {
        self.positions.get()
    }

    /// Replace all positions. The length must stay the same.
    pub fn set_positions(&mut self, positions: Vec<f64>) -> Result<(), GeometryError> {
        check_len("positions", 3 * self.vertex_count, positions.len())?;
        self.positions.set(positions);
        Ok(())
    }

    /// Replace all positions from a vertex list.
    pub fn set_vertices(&mut self, vertices: &[DVec3]) -> Result<(), GeometryError> {
        check_len("positions", 3 * self.vertex_count, 3 * vertices.len())?;
        self.positions.update(|p| {
            for (dst, v) in p.chunks_exact_mut(3).zip(vertices) {
                dst.copy_from_slice(&v.to_array());
            }
        });
        Ok(())
    }

    /// Move a single vertex.
    pub fn set_vertex(&mut self, index: usize, v: DVec3) -> Result<(), GeometryError> {
        if index >= self.vertex_count {
            return Err(GeometryError::IndexOutOfRange {
                index: index as u32,
                vertex_count: self.vertex_count,
            });
        }
        self.positions
            .update(|p| p[3 * index..3 * index + 3].copy_from_slice(&v.to_array()));
        Ok(())
    }

    pub fn vertex(&self, index: usize) -> Option<DVec3> {
        self.positions
            .get()
            .get(3 * index..3 * index + 3)
            .map(DVec3::from_slice)
    }

    pub fn colours(&self) -> &[f32] {
        self.colours.get()
    }

    /// Replace all colours. The length must stay the same.
    pub fn set_colours(&mut self, colours: Vec<f32>) -> Result<(), GeometryError> {
        check_len("colours", 3 * self.vertex_count, colours.len())?;
        self.colours.set(colours);
        Ok(())
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// Corners of the square built by [`Mesh3D::square`], in vertex order.
pub(crate) fn square_corners(side: f64) -> [DVec3; 4] {
    let h = side / 2.0;
    [
        DVec3::new(-h, h, 0.0),
        DVec3::new(h, h, 0.0),
        DVec3::new(h, -h, 0.0),
        DVec3::new(-h, -h, 0.0),
    ]
}

fn check_len(buffer: &'static str, expected: usize, actual: usize) -> Result<(), GeometryError> {
    if expected != actual {
        return Err(GeometryError::WrongBufferSize {
            buffer,
            expected,
            actual,
        });
    }
    Ok(())
}

impl MeshLike for Mesh3D {
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn indices(&self) -> &[u32] {
        &self.indices
    }

    fn colours(&self) -> &[f32] {
        self.colours.get()
    }

    fn positions_f32(&mut self) -> Vec<f32> {
        self.positions.get().iter().map(|&p| p as f32).collect()
    }

    fn positions_stale(&self) -> bool {
        self.positions.is_stale()
    }

    fn colours_stale(&self) -> bool {
        self.colours.is_stale()
    }

    fn mark_positions_clean(&mut self) {
        self.positions.mark_clean();
    }

    fn mark_colours_clean(&mut self) {
        self.colours.mark_clean();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh3D {
        Mesh3D::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2],
            None,
        )
        .unwrap()
    }

    fn refresh(mesh: &mut Mesh3D) {
        mesh.mark_positions_clean();
        mesh.mark_colours_clean();
    }

    #[test]
    fn new_mesh_is_fully_stale() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.positions_stale());
        assert!(mesh.colours_stale());
    }

    #[test]
    fn default_colours_are_grey() {
        let mesh = triangle();
        assert_eq!(mesh.colours().len(), 9);
        assert!(mesh.colours().iter().all(|&c| c == 0.5));
    }

    #[test]
    fn wrong_colour_size_is_rejected() {
        let err = Mesh3D::new(vec![0.0; 6], vec![0, 1], Some(vec![1.0; 5])).unwrap_err();
        assert_eq!(
            err,
            GeometryError::WrongBufferSize {
                buffer: "colours",
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn ragged_positions_are_rejected() {
        let err = Mesh3D::new(vec![0.0; 7], vec![], None).unwrap_err();
        assert_eq!(err, GeometryError::PositionsNotTriplets(7));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = Mesh3D::new(vec![0.0; 6], vec![0, 2], None).unwrap_err();
        assert!(matches!(err, GeometryError::IndexOutOfRange { index: 2, .. }));
    }

    #[test]
    fn writing_positions_marks_only_positions() {
        let mut mesh = triangle();
        refresh(&mut mesh);

        mesh.set_positions(vec![1.0; 9]).unwrap();
        assert!(mesh.positions_stale());
        assert!(!mesh.colours_stale());

        mesh.mark_positions_clean();
        assert!(!mesh.positions_stale());
    }

    #[test]
    fn writing_colours_marks_only_colours() {
        let mut mesh = triangle();
        refresh(&mut mesh);

        mesh.set_colours(vec![0.1; 9]).unwrap();
        assert!(mesh.colours_stale());
        assert!(!mesh.positions_stale());

        mesh.mark_colours_clean();
        assert!(!mesh.colours_stale());
    }

    #[test]
    fn resizing_positions_fails_and_keeps_state() {
        let mut mesh = triangle();
        refresh(&mut mesh);
        assert!(mesh.set_positions(vec![0.0; 6]).is_err());
        assert!(!mesh.positions_stale());
        assert_eq!(mesh.positions().len(), 9);
    }

    #[test]
    fn set_vertex_updates_one_triplet() {
        let mut mesh = triangle();
        refresh(&mut mesh);
        mesh.set_vertex(1, DVec3::new(4.0, 5.0, 6.0)).unwrap();
        assert_eq!(mesh.vertex(1), Some(DVec3::new(4.0, 5.0, 6.0)));
        assert_eq!(mesh.vertex(0), Some(DVec3::ZERO));
        assert!(mesh.positions_stale());
        assert!(mesh.set_vertex(3, DVec3::ZERO).is_err());
    }

    #[test]
    fn set_vertices_writes_all() {
        let mut mesh = Mesh3D::square(2.0);
        let moved: Vec<DVec3> = (0..4).map(|i| DVec3::splat(i as f64)).collect();
        mesh.set_vertices(&moved).unwrap();
        assert_eq!(mesh.vertex(3), Some(DVec3::splat(3.0)));
        assert!(mesh.set_vertices(&moved[..2]).is_err());
    }

    #[test]
    fn rod_hangs_below_pivot() {
        let rod = Mesh3D::rod(0.5);
        assert_eq!(rod.vertex(0), Some(DVec3::new(0.0, -0.5, 0.0)));
        assert_eq!(rod.vertex(1), Some(DVec3::ZERO));
        assert_eq!(rod.indices(), &[0, 1]);
    }

    #[test]
    fn square_layout() {
        let sq = Mesh3D::square(10.0);
        assert_eq!(sq.vertex_count(), 4);
        assert_eq!(sq.vertex(0), Some(DVec3::new(-5.0, 5.0, 0.0)));
        assert_eq!(sq.vertex(2), Some(DVec3::new(5.0, -5.0, 0.0)));
        assert_eq!(sq.indices().len(), 6);
    }

    #[test]
    fn positions_f32_narrows() {
        let mut mesh = triangle();
        let flat = mesh.positions_f32();
        assert_eq!(flat, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }
}
