use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slabgraph::{
    Buffer, CsrView, DynamicGraph, DynamicGraphConfig, Edge, GraphProperties, GraphToken,
};

const VERTICES: u32 = 4_096;

fn batch(len: usize, salt: u32) -> Buffer<Edge<u32, f32>> {
    let edges = (0..len as u32)
        .map(|i| {
            let s = i.wrapping_mul(2_654_435_761).wrapping_add(salt) % VERTICES;
            let d = (i ^ salt).wrapping_mul(40_503) % VERTICES;
            Edge::new(s, d)
        })
        .collect();
    Buffer::device(edges)
}

fn bench_batches(c: &mut Criterion) {
    let edges = batch(100_000, 17);

    c.bench_function("build_and_insert_batch_100k", |b| {
        GraphToken::new(|mut token| {
            b.iter(|| {
                let graph = DynamicGraph::<u32, f32>::new(
                    &token,
                    VERTICES as usize,
                    GraphProperties::directed(),
                    DynamicGraphConfig::default(),
                )
                .unwrap();
                black_box(graph.insert_edges_batch(&mut token, &edges, edges.len(), true).unwrap())
            });
        });
    });

    c.bench_function("insert_then_delete_batch_100k", |b| {
        GraphToken::new(|mut token| {
            let graph = DynamicGraph::<u32, f32>::new(
                &token,
                VERTICES as usize,
                GraphProperties::directed(),
                DynamicGraphConfig::default(),
            )
            .unwrap();
            b.iter(|| {
                graph.insert_edges_batch(&mut token, &edges, edges.len(), true).unwrap();
                black_box(graph.delete_edges_batch(&mut token, &edges, edges.len()).unwrap())
            });
        });
    });
}

fn bench_conversions(c: &mut Criterion) {
    let edges = batch(200_000, 5);
    GraphToken::new(|mut token| {
        let graph = DynamicGraph::<u32, f32>::new(
            &token,
            VERTICES as usize,
            GraphProperties::directed(),
            DynamicGraphConfig::default(),
        )
        .unwrap();
        graph.insert_edges_batch(&mut token, &edges, edges.len(), true).unwrap();

        c.bench_function("to_csr", |b| {
            b.iter(|| black_box(graph.to_csr::<u32>(&token).unwrap()));
        });

        let csr: CsrView<u32, u32, f32> = graph.to_csr(&token).unwrap();
        c.bench_function("from_csr", |b| {
            b.iter(|| {
                black_box(
                    DynamicGraph::from_csr(&token, &csr, GraphProperties::directed(), DynamicGraphConfig::default())
                        .unwrap(),
                )
            });
        });
    });
}

criterion_group!(benches, bench_batches, bench_conversions);
criterion_main!(benches);
