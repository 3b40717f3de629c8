//! Tests for the CSR view.

use super::*;

type Csr = CsrView<u32, u32, f32>;

fn three_vertex() -> Csr {
    // 0 -> {1, 2}, 1 -> {0}, 2 -> {1, 0}
    CsrView::new(vec![0, 2, 3, 5], vec![1, 2, 0, 1, 0], None)
}

#[test]
fn neighbor_list_length_reads_offsets() {
    let csr = three_vertex();
    assert_eq!(csr.number_of_vertices(), 3);
    assert_eq!(csr.number_of_edges(), 5);
    assert_eq!(csr.neighbor_list_length(0), 2);
    assert_eq!(csr.neighbor_list_length(1), 1);
    assert_eq!(csr.neighbor_list_length(2), 2);
}

#[test]
fn source_vertex_is_monotone() {
    let csr = three_vertex();
    let sources: Vec<u32> = (0..5).map(|e| csr.source_vertex(e)).collect();
    assert_eq!(sources, vec![0, 0, 1, 2, 2]);
    assert!(sources.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn source_vertex_skips_empty_rows() {
    // Vertices 1 and 2 are isolated; offsets repeat 2 three times.
    let csr: Csr = CsrView::new(vec![0, 2, 2, 2, 3], vec![1, 3, 0], None);
    assert_eq!(csr.source_vertex(0), 0);
    assert_eq!(csr.source_vertex(1), 0);
    assert_eq!(csr.source_vertex(2), 3);
}

#[test]
fn source_and_destination_pairs_lookups() {
    let csr = three_vertex();
    assert_eq!(csr.source_and_destination(3), (2, 1));
    assert_eq!(csr.destination_vertex(1), 2);
}

#[test]
fn edge_id_reports_absence() {
    let csr = three_vertex();
    assert_eq!(csr.edge_id(0, 2), Some(1));
    assert_eq!(csr.edge_id(1, 2), None);
}

#[test]
fn edge_id_returns_lowest_parallel_edge() {
    let csr: Csr = CsrView::new(vec![0, 3, 3], vec![1, 1, 1], None);
    assert_eq!(csr.edge_id(0, 1), Some(0));
}

#[test]
fn degree_sum_matches_edge_count() {
    let csr = three_vertex();
    let sum: u32 = (0..3).map(|v| csr.neighbor_list_length(v)).sum();
    assert_eq!(sum as usize, csr.number_of_edges());
}

#[test]
fn from_adjacency_matches_raw_arrays() {
    let adjacency = vec![vec![1u32, 2], vec![0], vec![1, 0]];
    let csr: Csr = CsrView::from_adjacency(&adjacency);
    assert_eq!(csr, three_vertex());
    assert_eq!(csr.neighbors(2), &[1, 0]);
}

#[test]
fn weights_follow_edge_slots() {
    let csr: Csr = CsrView::new(vec![0, 1, 2], vec![1, 0], Some(vec![0.5, 1.5]));
    assert_eq!(csr.edge_weight(1), Some(1.5));
    assert_eq!(csr.neighbor_weights(0), Some(&[0.5][..]));
    assert_eq!(three_vertex().edge_weight(0), None);
}

#[test]
fn transpose_round_trips() {
    let exec = Executor::default();
    let csr = three_vertex();
    let csc = csr.to_csc(&exec).unwrap();
    assert_eq!(csc.column_offsets(), &[0, 2, 4, 5]);
    assert_eq!(csc.in_neighbors(0), &[1, 2]);
    assert_eq!(csc.in_neighbors(1), &[0, 2]);
    assert_eq!(csc.in_neighbors(2), &[0]);

    // Rows come back sorted by column.
    let back = csc.to_csr(&exec).unwrap();
    assert_eq!(back.row_offsets(), csr.row_offsets());
    assert_eq!(back.neighbors(2), &[0, 1]);
}

#[test]
fn to_coo_expands_rows() {
    let exec = Executor::default();
    let coo = three_vertex().to_coo(&exec).unwrap();
    assert_eq!(coo.row_indices(), &[0, 0, 1, 2, 2]);
    assert_eq!(coo.column_indices(), &[1, 2, 0, 1, 0]);
    assert_eq!(coo.to_csr(&exec).unwrap(), three_vertex());
}

#[test]
fn move_to_changes_residency() {
    let mut csr = three_vertex();
    assert_eq!(csr.residency(), Residency::Device);
    csr.move_to(Residency::Host).unwrap();
    assert_eq!(csr.residency(), Residency::Host);
    assert_eq!(csr.neighbors(0), &[1, 2]);
}

#[test]
#[should_panic(expected = "monotone")]
fn rejects_decreasing_offsets() {
    let _: Csr = CsrView::new(vec![0, 2, 1], vec![0, 1], None);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn rejects_out_of_range_column() {
    let _: Csr = CsrView::new(vec![0, 1], vec![4], None);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn source_vertex_asserts_edge_range() {
    three_vertex().source_vertex(5);
}
