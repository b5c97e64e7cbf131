//! Dense cost matrix and the great-circle builder.

use geo::{Distance, Haversine, Point};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::models::Node;

/// A dense n×n cost matrix stored in row-major order.
///
/// Entries are non-negative and finite and the diagonal is zero. The matrix
/// may be asymmetric (time costs rarely are symmetric) and no operation in
/// this crate assumes the triangle inequality.
///
/// # Examples
///
/// ```
/// use commute_routing::distance::CostMatrix;
///
/// let dm = CostMatrix::from_coordinates(&[(12.9716, 77.5946), (12.9816, 77.5946)]).unwrap();
/// assert_eq!(dm.size(), 2);
/// assert!((dm.get(0, 1) - 1.112).abs() < 0.01);
/// assert_eq!(dm.get(1, 1), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMatrix {
    data: Vec<f64>,
    size: usize,
}

impl CostMatrix {
    /// Computes the haversine distance matrix (kilometres) for `(lat, lon)` pairs.
    ///
    /// Rows are filled in parallel; each cell is independent of every other,
    /// so the result does not depend on scheduling. Building the matrix is
    /// O(N²) in time and memory and is the practical ceiling on instance size.
    pub fn from_coordinates(points: &[(f64, f64)]) -> Result<Self, RoutingError> {
        if points.len() < 2 {
            return Err(RoutingError::invalid(format!(
                "at least 2 locations are required, got {}",
                points.len()
            )));
        }
        for (idx, &(lat, lon)) in points.iter().enumerate() {
            check_coordinate(lat, lon).map_err(|reason| {
                RoutingError::invalid_node(reason, format!("#{idx}"))
            })?;
        }

        let size = points.len();
        let geo_points: Vec<Point> = points
            .iter()
            .map(|&(lat, lon)| Point::new(lon, lat))
            .collect();

        let mut data = vec![0.0; size * size];
        data.par_chunks_mut(size).enumerate().for_each(|(i, row)| {
            let haversine = Haversine;
            for (j, cell) in row.iter_mut().enumerate() {
                if i != j {
                    *cell = haversine.distance(geo_points[i], geo_points[j]) / 1000.0;
                }
            }
        });

        Ok(Self { data, size })
    }

    /// Same as [`CostMatrix::from_coordinates`], reporting node ids in errors.
    pub fn from_nodes(nodes: &[Node]) -> Result<Self, RoutingError> {
        check_nodes(nodes)?;
        let points: Vec<(f64, f64)> = nodes
            .iter()
            .map(|n| (n.latitude(), n.longitude()))
            .collect();
        Self::from_coordinates(&points)
    }

    /// Creates a matrix from an explicit row-major n×n grid.
    ///
    /// Rejects wrong lengths, negative or non-finite entries and a non-zero
    /// diagonal.
    pub fn from_data(size: usize, data: Vec<f64>) -> Result<Self, RoutingError> {
        if data.len() != size * size {
            return Err(RoutingError::invalid(format!(
                "matrix of size {size} needs {} entries, got {}",
                size * size,
                data.len()
            )));
        }
        let matrix = Self { data, size };
        if let Some((i, j, value)) = matrix.first_bad_cell() {
            return Err(RoutingError::invalid(format!(
                "matrix entry ({i}, {j}) = {value} is not a valid cost"
            )));
        }
        Ok(matrix)
    }

    pub(crate) fn unchecked(size: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), size * size);
        Self { data, size }
    }

    /// Creates a matrix from nested rows. All rows must have `rows.len()` entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RoutingError> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(RoutingError::invalid(format!(
                "matrix row {i} has {} entries, expected {size}",
                row.len()
            )));
        }
        Self::from_data(size, rows.into_iter().flatten().collect())
    }

    /// Cost of travelling from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cell values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Builds a new matrix by mapping every off-diagonal cell; the diagonal stays zero.
    pub(crate) fn map_off_diagonal(&self, f: impl Fn(f64) -> f64) -> Vec<f64> {
        let n = self.size;
        self.data
            .iter()
            .enumerate()
            .map(|(k, &v)| if k / n == k % n { 0.0 } else { f(v) })
            .collect()
    }

    /// First cell that is negative, non-finite, or a non-zero diagonal entry.
    pub(crate) fn first_bad_cell(&self) -> Option<(usize, usize, f64)> {
        self.data.iter().enumerate().find_map(|(k, &v)| {
            let (i, j) = (k / self.size, k % self.size);
            let bad = !v.is_finite() || v < 0.0 || (i == j && v != 0.0);
            bad.then_some((i, j, v))
        })
    }
}

/// Rejects the first node with an out-of-range coordinate, naming it.
pub(crate) fn check_nodes(nodes: &[Node]) -> Result<(), RoutingError> {
    for node in nodes {
        check_coordinate(node.latitude(), node.longitude())
            .map_err(|reason| RoutingError::invalid_node(reason, node.id()))?;
    }
    Ok(())
}

fn check_coordinate(lat: f64, lon: f64) -> Result<(), String> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} is outside [-90, 90]"));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {lon} is outside [-180, 180]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bangalore() -> Vec<(f64, f64)> {
        vec![
            (12.9716, 77.5946),
            (13.0500, 77.6200),
            (12.9000, 77.5000),
            (12.9716, 77.7000),
        ]
    }

    #[test]
    fn test_from_coordinates_symmetric_zero_diagonal() {
        let dm = CostMatrix::from_coordinates(&bangalore()).expect("valid");
        assert_eq!(dm.size(), 4);
        assert!(dm.is_symmetric(1e-9));
        for i in 0..4 {
            assert_eq!(dm.get(i, i), 0.0);
        }
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let dm = CostMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0)]).expect("valid");
        // 2πR / 360 with R ≈ 6371 km
        assert!((dm.get(0, 1) - 111.19).abs() < 0.1);
    }

    #[test]
    fn test_idempotent() {
        let a = CostMatrix::from_coordinates(&bangalore()).expect("valid");
        let b = CostMatrix::from_coordinates(&bangalore()).expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_points() {
        assert!(CostMatrix::from_coordinates(&[(0.0, 0.0)]).is_err());
        assert!(CostMatrix::from_coordinates(&[]).is_err());
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let err = CostMatrix::from_coordinates(&[(0.0, 0.0), (91.0, 0.0)]).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::InvalidInput { node: Some(ref n), .. } if n == "#1"
        ));
        assert!(CostMatrix::from_coordinates(&[(0.0, 181.0), (0.0, 0.0)]).is_err());
        assert!(CostMatrix::from_coordinates(&[(f64::NAN, 0.0), (0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_from_nodes_reports_id() {
        let nodes = vec![
            Node::depot("HQ", 12.97, 77.59),
            Node::new("EMP_1", 12.97, 200.0, 1),
        ];
        let err = CostMatrix::from_nodes(&nodes).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::InvalidInput { node: Some(ref n), .. } if n == "EMP_1"
        ));
    }

    #[test]
    fn test_from_data() {
        let dm = CostMatrix::from_data(2, vec![0.0, 5.0, 7.0, 0.0]).expect("valid");
        assert_eq!(dm.get(0, 1), 5.0);
        assert_eq!(dm.get(1, 0), 7.0);
        assert!(!dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data_invalid() {
        assert!(CostMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_err());
        assert!(CostMatrix::from_data(2, vec![0.0, -1.0, 2.0, 0.0]).is_err());
        assert!(CostMatrix::from_data(2, vec![1.0, 1.0, 2.0, 0.0]).is_err());
        assert!(CostMatrix::from_data(2, vec![0.0, f64::NAN, 2.0, 0.0]).is_err());
    }

    #[test]
    fn test_from_rows_ragged() {
        assert!(CostMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
        let dm = CostMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).expect("valid");
        assert_eq!(dm.size(), 2);
    }

    #[test]
    fn test_map_off_diagonal_keeps_zero_diagonal() {
        let dm = CostMatrix::from_data(2, vec![0.0, 2.0, 3.0, 0.0]).expect("valid");
        let mapped = dm.map_off_diagonal(|d| d * 10.0 + 1.0);
        assert_eq!(mapped, vec![0.0, 21.0, 31.0, 0.0]);
    }
}
