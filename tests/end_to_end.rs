use slabgraph::{
    average_degree, Buffer, CompositeGraph, CsrView, DynamicGraph, DynamicGraphConfig, Edge,
    Executor, FormatKind, GraphProperties, GraphToken, GraphView,
};

type Csr = CsrView<u32, u32, f32>;

fn scenario_csr() -> Csr {
    // 0 -> {1, 2}, 1 -> {0}, 2 -> {1, 3}, 3 isolated.
    CsrView::new(vec![0, 2, 3, 5, 5], vec![1, 2, 0, 1, 3], None)
}

#[test]
fn static_queries_and_statistics() {
    let graph: CompositeGraph<u32, u32, f32> = CompositeGraph::from_csr(
        GraphProperties::directed(),
        4,
        4,
        5,
        vec![0, 2, 3, 5, 5],
        vec![1, 2, 0, 1, 3],
        None,
    );
    assert_eq!(graph.neighbor_list_length(0), 2);
    assert_eq!(graph.neighbor_list_length(2), 2);
    assert!((graph.average_degree() - 1.25).abs() < 1e-12);

    let sources: Vec<u32> = (0..5).map(|e| graph.source_vertex(e)).collect();
    assert_eq!(sources, vec![0, 0, 1, 2, 2]);
}

#[test]
fn bulk_load_insert_and_export() {
    let csr = scenario_csr();
    GraphToken::new(|mut token| {
        let graph = DynamicGraph::from_csr(
            &token,
            &csr,
            GraphProperties::directed(),
            DynamicGraphConfig::default(),
        )
        .unwrap();
        let before: Csr = graph.to_csr(&token).unwrap();
        assert_eq!(before.neighbor_list_length(2), 2);

        // (2, 3) is already present, so it must not change anything.
        let present = Buffer::device(vec![Edge::new(2, 3)]);
        let summary = graph.insert_edges_batch(&mut token, &present, 1, true).unwrap();
        assert_eq!(summary.applied, 0);
        assert_eq!(graph.number_of_edges(&token), 5);

        let fresh = Buffer::device(vec![Edge::new(2, 0)]);
        graph.insert_edges_batch(&mut token, &fresh, 1, true).unwrap();
        assert_eq!(graph.number_of_edges(&token), 6);

        let after: Csr = graph.to_csr(&token).unwrap();
        assert_eq!(after.neighbor_list_length(2), 3);
        assert_eq!(after.neighbors(2), &[0, 1, 3]);
        assert_eq!(after.number_of_edges(), before.number_of_edges() + 1);
        assert!((average_degree(&after) - 1.5).abs() < 1e-12);

        graph.release(&mut token);
    });
}

#[test]
fn exported_csr_feeds_a_composite_graph() {
    let exec = Executor::default();
    let csr = scenario_csr();
    let exported: Csr = GraphToken::new(|token| {
        let graph = DynamicGraph::from_csr(
            &token,
            &csr,
            GraphProperties::directed(),
            DynamicGraphConfig::default(),
        )
        .unwrap();
        graph.to_csr(&token).unwrap()
    });

    let (offsets, indices, weights) = exported.into_parts();
    let mut graph = CompositeGraph::from_csr(
        GraphProperties::directed(),
        4,
        4,
        indices.len(),
        offsets,
        indices,
        weights,
    );
    graph.with_format(FormatKind::Csc, &exec).unwrap();
    graph.with_format(FormatKind::Coo, &exec).unwrap();
    assert_eq!(graph.number_of_graph_representations(), 3);

    for repr in graph.representations() {
        assert!(repr.edge_id(2, 3).is_some(), "{:?}", repr.kind());
        assert_eq!(repr.edge_id(3, 2), None);
    }
}
