//! Degree statistics over any [`GraphView`].
//!
//! All functions are read-only walks over every vertex and run on the
//! process-wide pool; they can overlap with other read-only queries.

use crate::concurrency::Executor;
use crate::error::GraphResult;
use crate::graph::formats::count_by;
use crate::graph::{GraphIndex, GraphView};

/// Mean of `neighbor_list_length(v)` over all vertices; `0.0` when there are none.
#[allow(clippy::cast_precision_loss)]
pub fn average_degree<G>(graph: &G) -> f64
where
    G: GraphView + Sync,
{
    let n = graph.number_of_vertices();
    if n == 0 {
        return 0.0;
    }
    let exec = Executor::default();
    let total = exec.map_reduce(n, 0usize, |v| degree(graph, v), |a, b| a + b);
    total as f64 / n as f64
}

/// Population standard deviation of the neighbor-list lengths:
/// `sqrt(mean((degree - average_degree)^2))`. `0.0` for an empty graph.
#[allow(clippy::cast_precision_loss)]
pub fn degree_standard_deviation<G>(graph: &G) -> f64
where
    G: GraphView + Sync,
{
    let n = graph.number_of_vertices();
    if n == 0 {
        return 0.0;
    }
    let mean = average_degree(graph);
    let exec = Executor::default();
    let squares = exec.map_reduce(
        n,
        0.0f64,
        |v| {
            let d = degree(graph, v) as f64 - mean;
            d * d
        },
        |a, b| a + b,
    );
    (squares / n as f64).sqrt()
}

/// Log-scale degree histogram.
///
/// Bucket 0 counts isolated vertices; bucket `k >= 1` counts vertices with
/// `2^(k-1) <= degree < 2^k`. Trailing empty buckets are dropped.
///
/// # Errors
/// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the
/// counters cannot be reserved.
pub fn degree_histogram<G>(graph: &G) -> GraphResult<Vec<usize>>
where
    G: GraphView + Sync,
{
    let exec = Executor::default();
    let buckets = usize::BITS as usize + 1;
    let mut histogram = count_by(&exec, buckets, graph.number_of_vertices(), |v| {
        bucket(degree(graph, v))
    })?;
    let used = histogram.iter().rposition(|&c| c > 0).map_or(0, |i| i + 1);
    histogram.truncate(used);
    Ok(histogram)
}

#[inline]
fn degree<G: GraphView>(graph: &G, v: usize) -> usize {
    graph
        .neighbor_list_length(<G::Vertex as GraphIndex>::from_index(v))
        .index()
}

#[inline]
fn bucket(degree: usize) -> usize {
    (usize::BITS - degree.leading_zeros()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CsrView;

    fn four_vertex() -> CsrView<u32, u32, f32> {
        CsrView::new(vec![0, 2, 3, 5, 5], vec![1, 2, 0, 1, 3], None)
    }

    #[test]
    fn average_degree_is_edge_ratio() {
        assert!((average_degree(&four_vertex()) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn empty_graph_has_zero_statistics() {
        let empty = CsrView::<u32, u32, f32>::new(vec![0], vec![], None);
        assert_eq!(average_degree(&empty), 0.0);
        assert_eq!(degree_standard_deviation(&empty), 0.0);
        assert!(degree_histogram(&empty).unwrap().is_empty());
    }

    #[test]
    fn standard_deviation_is_population_form() {
        // Degrees 2, 1, 2, 0 around a mean of 1.25.
        let expected = ((0.75f64.powi(2) * 2.0 + 0.25f64.powi(2) + 1.25f64.powi(2)) / 4.0).sqrt();
        assert!((degree_standard_deviation(&four_vertex()) - expected).abs() < 1e-12);
    }

    #[test]
    fn regular_graph_has_no_spread() {
        let ring = CsrView::<u32, u32, f32>::new(vec![0, 1, 2, 3], vec![1, 2, 0], None);
        assert_eq!(degree_standard_deviation(&ring), 0.0);
    }

    #[test]
    fn histogram_buckets_by_power_of_two() {
        // Degrees 2, 1, 2, 0 -> bucket 0: 1, bucket 1: 1, bucket 2: 2.
        assert_eq!(degree_histogram(&four_vertex()).unwrap(), vec![1, 1, 2]);
        assert_eq!(bucket(0), 0);
        assert_eq!(bucket(1), 1);
        assert_eq!(bucket(3), 2);
        assert_eq!(bucket(4), 3);
    }
}
