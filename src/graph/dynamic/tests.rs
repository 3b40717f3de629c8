//! Tests for the dynamic graph.

use super::*;
use crate::graph::GraphView;

type Csr = CsrView<u32, u32, f32>;

fn four_vertex() -> Csr {
    CsrView::new(vec![0, 2, 3, 5, 5], vec![1, 2, 0, 1, 3], None)
}

fn directed() -> GraphProperties {
    GraphProperties::directed()
}

#[test]
fn new_graph_is_empty() {
    GraphToken::new(|token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 5, directed(), DynamicGraphConfig::default()).unwrap();
        assert_eq!(g.number_of_vertices(), 5);
        assert_eq!(g.number_of_edges(&token), 0);
        assert!(g.neighbors(&token, 4).is_empty());
        let csr: Csr = g.to_csr(&token).unwrap();
        assert_eq!(csr.row_offsets(), &[0, 0, 0, 0, 0, 0]);
    });
}

#[test]
fn from_csr_matches_source_adjacency() {
    GraphToken::new(|token| {
        let g = DynamicGraph::from_csr(&token, &four_vertex(), directed(), DynamicGraphConfig::default()).unwrap();
        assert_eq!(g.number_of_edges(&token), 5);
        assert_eq!(g.neighbor_list_length(&token, 0), 2);
        assert_eq!(g.neighbor_list_length(&token, 2), 2);
        assert_eq!(g.neighbors(&token, 2), vec![1, 3]);
        assert!(g.contains_edge(&token, 1, 0));
        assert!(!g.contains_edge(&token, 0, 3));
    });
}

#[test]
fn from_csr_collapses_duplicates_keeping_first_weight() {
    let csr: Csr = CsrView::new(vec![0, 3, 3], vec![1, 1, 1], Some(vec![1.0, 2.0, 3.0]));
    GraphToken::new(|token| {
        let props = directed().with_weights();
        let g = DynamicGraph::from_csr(&token, &csr, props, DynamicGraphConfig::default()).unwrap();
        assert_eq!(g.number_of_edges(&token), 1);
        assert_eq!(g.edge_weight(&token, 0, 1), Some(1.0));
    });
}

#[test]
fn from_csr_stages_host_arrays() {
    let mut csr = four_vertex();
    csr.move_to(Residency::Host).unwrap();
    GraphToken::new(|token| {
        let g = DynamicGraph::from_csr(&token, &csr, directed(), DynamicGraphConfig::default()).unwrap();
        assert_eq!(g.number_of_edges(&token), 5);
    });
    // The caller's arrays stay where they were.
    assert_eq!(csr.residency(), Residency::Host);
}

#[test]
fn insert_adds_one_edge_and_export_shows_it() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::from_csr(&token, &four_vertex(), directed(), DynamicGraphConfig::default()).unwrap();
        let batch = Buffer::device(vec![Edge::new(2, 0)]);
        let summary = g.insert_edges_batch(&mut token, &batch, 1, true).unwrap();
        assert_eq!(summary, BatchSummary { submitted: 1, applied: 1, unchanged: 0 });

        let csr: Csr = g.to_csr(&token).unwrap();
        assert_eq!(csr.number_of_edges(), 6);
        assert_eq!(csr.neighbor_list_length(2), 3);
        assert_eq!(csr.neighbors(2), &[0, 1, 3]);
    });
}

#[test]
fn inserting_present_edge_is_a_no_op() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::from_csr(&token, &four_vertex(), directed(), DynamicGraphConfig::default()).unwrap();
        let batch = Buffer::device(vec![Edge::new(2, 3), Edge::new(2, 3)]);
        let summary = g.insert_edges_batch(&mut token, &batch, 2, true).unwrap();
        assert_eq!(summary.applied, 0);
        assert_eq!(summary.unchanged, 2);
        assert_eq!(g.number_of_edges(&token), 5);
    });
}

#[test]
fn undirected_batch_inserts_both_directions() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 3, GraphProperties::undirected(), DynamicGraphConfig::default())
            .unwrap();
        let batch = Buffer::host(vec![Edge::new(0, 1), Edge::new(2, 2)]);
        let summary = g.insert_edges_batch(&mut token, &batch, 2, false).unwrap();
        assert_eq!(summary.submitted, 4);
        // The self-loop's mirror is the same edge.
        assert_eq!(summary.applied, 3);
        assert!(g.contains_edge(&token, 1, 0));
        assert!(g.contains_edge(&token, 0, 1));
        assert_eq!(batch.residency(), Residency::Host);
    });
}

#[test]
fn count_limits_the_batch() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 3, directed(), DynamicGraphConfig::default()).unwrap();
        let batch = Buffer::device(vec![Edge::new(0, 1), Edge::new(1, 2)]);
        g.insert_edges_batch(&mut token, &batch, 1, true).unwrap();
        assert!(g.contains_edge(&token, 0, 1));
        assert!(!g.contains_edge(&token, 1, 2));
    });
}

#[test]
fn delete_removes_given_pairs_only() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::from_csr(&token, &four_vertex(), directed(), DynamicGraphConfig::default()).unwrap();
        let batch = Buffer::device(vec![Edge::new(0, 1), Edge::new(3, 0), Edge::new(0, 1)]);
        let summary = g.delete_edges_batch(&mut token, &batch, 3).unwrap();
        assert_eq!(summary, BatchSummary { submitted: 3, applied: 1, unchanged: 2 });
        assert!(!g.contains_edge(&token, 0, 1));
        assert!(g.contains_edge(&token, 1, 0));
        assert_eq!(g.number_of_edges(&token), 4);
        assert_eq!(g.neighbors(&token, 0), vec![2]);
    });
}

#[test]
fn delete_then_reinsert_restores_weight() {
    GraphToken::new(|mut token| {
        let props = directed().with_weights();
        let g = DynamicGraph::<u32, f32>::new(&token, 2, props, DynamicGraphConfig::default()).unwrap();
        let first = Buffer::device(vec![Edge::weighted(0, 1, 1.5)]);
        g.insert_edges_batch(&mut token, &first, 1, true).unwrap();
        g.delete_edges_batch(&mut token, &first, 1).unwrap();
        assert_eq!(g.edge_weight(&token, 0, 1), None);

        let second = Buffer::device(vec![Edge::weighted(0, 1, 4.0)]);
        g.insert_edges_batch(&mut token, &second, 1, true).unwrap();
        assert_eq!(g.edge_weight(&token, 0, 1), Some(4.0));

        let csr: Csr = g.to_csr(&token).unwrap();
        assert_eq!(csr.weights(), Some(&[4.0][..]));
    });
}

#[test]
fn weighted_csr_round_trips_its_weights() {
    let csr: Csr = CsrView::new(vec![0, 2, 2, 3], vec![2, 1, 0], Some(vec![2.5, -1.0, 7.0]));
    GraphToken::new(|token| {
        // The properties passed in do not mention weights; the data does.
        let g = DynamicGraph::from_csr(&token, &csr, directed(), DynamicGraphConfig::default()).unwrap();
        assert!(g.properties().weighted);
        assert_eq!(g.edge_weight(&token, 0, 2), Some(2.5));

        let back: Csr = g.to_csr(&token).unwrap();
        assert_eq!(back.row_offsets(), &[0, 2, 2, 3]);
        assert_eq!(back.neighbors(0), &[1, 2]);
        assert_eq!(back.neighbor_weights(0), Some(&[-1.0, 2.5][..]));
        assert_eq!(back.weights(), Some(&[-1.0, 2.5, 7.0][..]));
    });
}

#[test]
fn unweighted_csr_exports_no_weights_even_if_flagged() {
    GraphToken::new(|token| {
        let props = directed().with_weights();
        let g = DynamicGraph::from_csr(&token, &four_vertex(), props, DynamicGraphConfig::default()).unwrap();
        assert!(!g.properties().weighted);
        let back: Csr = g.to_csr(&token).unwrap();
        assert!(back.weights().is_none());
    });
}

#[test]
#[should_panic(expected = "does not fit in offset type")]
fn export_to_a_narrow_edge_type_is_fatal() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 20, directed(), DynamicGraphConfig::default()).unwrap();
        let edges: Vec<_> = (0..20u32).flat_map(|s| (0..20u32).map(move |d| Edge::new(s, d))).collect();
        let batch = Buffer::device(edges);
        g.insert_edges_batch(&mut token, &batch, 400, true).unwrap();
        let _: CsrView<u32, u8, f32> = g.to_csr(&token).unwrap();
    });
}

#[test]
fn unweighted_export_has_no_weights() {
    GraphToken::new(|token| {
        let g = DynamicGraph::from_csr(&token, &four_vertex(), directed(), DynamicGraphConfig::default()).unwrap();
        let csr: Csr = g.to_csr(&token).unwrap();
        assert!(csr.weights().is_none());
        assert_eq!(csr, four_vertex());
    });
}

#[test]
fn large_batch_grows_slabs() {
    let config = DynamicGraphConfig {
        slab: SlabConfig {
            min_block_capacity: 2,
            ..SlabConfig::default()
        },
        launch: LaunchConfig::probe().with_grain(1),
    };
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 8, directed(), config).unwrap();
        let edges: Vec<_> = (0..8u32).flat_map(|s| (0..8u32).map(move |d| Edge::new(s, d))).collect();
        let batch = Buffer::device(edges);
        let summary = g.insert_edges_batch(&mut token, &batch, 64, true).unwrap();
        assert_eq!(summary.applied, 64);
        for v in 0..8 {
            assert_eq!(g.neighbors(&token, v), (0..8).collect::<Vec<u32>>());
        }
        let stats = g.slab_stats(&token);
        assert_eq!(stats.live, 64);
        assert!(stats.blocks > 8);
    });
}

#[test]
fn delete_batch_rebuilds_tombstone_heavy_slabs() {
    GraphToken::new(|mut token| {
        let mut g = DynamicGraph::<u32, f32>::new(&token, 2, directed(), DynamicGraphConfig::default()).unwrap();
        let all = Buffer::device((0..2u32).map(|d| Edge::new(0, d)).collect::<Vec<_>>());
        g.insert_edges_batch(&mut token, &all, 2, true).unwrap();
        let drop_one = Buffer::device(vec![Edge::new(0, 0)]);
        g.delete_edges_batch(&mut token, &drop_one, 1).unwrap();

        // One tombstone against one live entry is left in place.
        assert_eq!(g.slab_stats(&token).tombstones, 1);
        assert_eq!(g.compact(&mut token).unwrap(), 0);

        let drop_other = Buffer::device(vec![Edge::new(0, 1)]);
        g.delete_edges_batch(&mut token, &drop_other, 1).unwrap();
        let stats = g.slab_stats(&token);
        assert_eq!(stats.tombstones, 0);
        assert_eq!(stats.live, 0);
        assert_eq!(g.compact(&mut token).unwrap(), 0);
        assert_eq!(g.number_of_edges(&token), 0);
        g.release(&mut token);
    });
}

#[test]
fn churn_on_one_edge_keeps_the_slab_small() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 2, directed(), DynamicGraphConfig::default()).unwrap();
        let edge = Buffer::device(vec![Edge::new(0, 1)]);
        for _ in 0..2000 {
            g.insert_edges_batch(&mut token, &edge, 1, true).unwrap();
            g.delete_edges_batch(&mut token, &edge, 1).unwrap();
        }
        g.insert_edges_batch(&mut token, &edge, 1, true).unwrap();
        let stats = g.slab_stats(&token);
        assert_eq!(stats, SlabStats { vertices: 2, live: 1, tombstones: 0, blocks: 1 });
        assert!(g.contains_edge(&token, 0, 1));
    });
}

#[test]
fn churn_leaves_other_neighbors_intact() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, u32>::new(&token, 64, directed().with_weights(), DynamicGraphConfig::default())
            .unwrap();
        let keep = Buffer::device((32..40u32).map(|d| Edge::weighted(0, d, d)).collect::<Vec<_>>());
        g.insert_edges_batch(&mut token, &keep, 8, true).unwrap();
        let churn = Buffer::device((1..32u32).map(|d| Edge::weighted(0, d, 0)).collect::<Vec<_>>());
        for _ in 0..50 {
            g.insert_edges_batch(&mut token, &churn, 31, true).unwrap();
            g.delete_edges_batch(&mut token, &churn, 31).unwrap();
        }
        let stats = g.slab_stats(&token);
        assert_eq!(stats.live, 8);
        assert!(stats.tombstones <= stats.live);
        assert_eq!(g.neighbors(&token, 0), (32..40).collect::<Vec<u32>>());
        assert_eq!(g.edge_weight(&token, 0, 35), Some(35));
    });
}

#[test]
#[should_panic(expected = "out of bounds")]
fn out_of_range_vertex_is_fatal() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 2, directed(), DynamicGraphConfig::default()).unwrap();
        let batch = Buffer::device(vec![Edge::new(0, 9)]);
        let _ = g.insert_edges_batch(&mut token, &batch, 1, true);
    });
}

#[test]
#[should_panic(expected = "exceeds buffer length")]
fn count_past_buffer_is_fatal() {
    GraphToken::new(|mut token| {
        let g = DynamicGraph::<u32, f32>::new(&token, 2, directed(), DynamicGraphConfig::default()).unwrap();
        let batch = Buffer::device(vec![Edge::new(0, 1)]);
        let _ = g.insert_edges_batch(&mut token, &batch, 2, true);
    });
}

#[test]
fn config_round_trips_through_json() {
    let config = DynamicGraphConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: DynamicGraphConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);
}
