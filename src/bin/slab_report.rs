//! Prints a JSON occupancy report for a synthetic dynamic graph.
//!
//! Usage: `slab_report [VERTICES] [EDGES]`

use anyhow::{bail, Context, Result};
use serde::Serialize;
use slabgraph::{
    average_degree, degree_histogram, degree_standard_deviation, BatchSummary, Buffer, CsrView,
    DynamicGraph, DynamicGraphConfig, Edge, GraphProperties, GraphToken, SlabStats,
};

#[derive(Serialize)]
struct Phase {
    name: &'static str,
    batch: Option<BatchSummary>,
    edges: usize,
    slabs: SlabStats,
}

#[derive(Serialize)]
struct Report {
    config: DynamicGraphConfig,
    vertices: usize,
    phases: Vec<Phase>,
    average_degree: f64,
    degree_standard_deviation: f64,
    degree_histogram: Vec<usize>,
}

fn parse_arg(args: &[String], index: usize, default: usize) -> Result<usize> {
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("argument {index} is not a count: {raw:?}")),
        None => Ok(default),
    }
}

fn synthetic_edges(vertices: usize, count: usize) -> Vec<Edge<u32, f32>> {
    let mut state = 0x9E37_79B9_u64;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            let s = (state >> 33) as usize % vertices;
            let d = (state >> 11) as usize % vertices;
            Edge::new(s as u32, d as u32)
        })
        .collect()
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let vertices = parse_arg(&args, 1, 1_024)?;
    let edges = parse_arg(&args, 2, 16_384)?;
    if vertices == 0 || vertices > u32::MAX as usize {
        bail!("vertex count must be in 1..={}", u32::MAX);
    }

    let config = DynamicGraphConfig::default();
    let batch = Buffer::host(synthetic_edges(vertices, edges));
    let half = edges / 2;

    let report = GraphToken::new(|mut token| -> Result<Report> {
        let graph = DynamicGraph::<u32, f32>::new(&token, vertices, GraphProperties::directed(), config)
            .context("creating dynamic graph")?;
        let mut phases = Vec::new();

        let inserted = graph
            .insert_edges_batch(&mut token, &batch, edges, true)
            .context("inserting synthetic batch")?;
        phases.push(Phase {
            name: "insert",
            batch: Some(inserted),
            edges: graph.number_of_edges(&token),
            slabs: graph.slab_stats(&token),
        });

        let deleted = graph
            .delete_edges_batch(&mut token, &batch, half)
            .context("deleting first half of batch")?;
        phases.push(Phase {
            name: "delete",
            batch: Some(deleted),
            edges: graph.number_of_edges(&token),
            slabs: graph.slab_stats(&token),
        });

        let mut graph = graph;
        graph.compact(&mut token).context("compacting slabs")?;
        phases.push(Phase {
            name: "compact",
            batch: None,
            edges: graph.number_of_edges(&token),
            slabs: graph.slab_stats(&token),
        });

        let csr: CsrView<u32, u32, f32> = graph.to_csr(&token).context("exporting to csr")?;
        graph.release(&mut token);

        Ok(Report {
            config,
            vertices,
            phases,
            average_degree: average_degree(&csr),
            degree_standard_deviation: degree_standard_deviation(&csr),
            degree_histogram: degree_histogram(&csr).context("building degree histogram")?,
        })
    })?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
