//! End-to-end scenarios run over the full coordinator+worker topology
//! via the in-process channel transport.

use std::io::Write;

use parclique::coordinator::{AggregateResult, Coordinator};
use parclique::transport::channel_fleet;
use parclique::worker::Worker;

fn write_edges(edges: &[(u32, u32)]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for &(u, v) in edges {
        writeln!(file, "{u}\t{v}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn run(edges: &[(u32, u32)], num_workers: usize, donation_enabled: bool, threshold: Option<u64>) -> AggregateResult {
    let file = write_edges(edges);
    let path = file.path().to_string_lossy().into_owned();

    let world_size = num_workers + 1;
    let fleet = channel_fleet(world_size);
    let mut transports = fleet.into_iter();
    let coordinator_transport = transports.next().unwrap();
    let worker_transports: Vec<_> = transports.collect();

    let handles: Vec<_> = worker_transports
        .into_iter()
        .map(|transport| {
            std::thread::spawn(move || {
                let worker = Worker::new(&transport, donation_enabled, threshold);
                worker.run()
            })
        })
        .collect();

    let coordinator = Coordinator::new(&coordinator_transport);
    let result = coordinator.run(&path).expect("coordinator run failed");

    for handle in handles {
        handle.join().expect("worker thread panicked").expect("worker failed");
    }

    result
}

#[test]
fn triangle_two_ranks() {
    let result = run(&[(1, 2), (2, 3), (1, 3)], 1, true, None);
    assert_eq!(result.counts.get(3), 1);
    assert_eq!(result.counts.get(4), 0);
}

#[test]
fn k4_one_worker() {
    let edges = [(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)];
    let result = run(&edges, 1, true, None);
    assert_eq!(result.counts.get(3), 4);
    assert_eq!(result.counts.get(4), 1);
}

#[test]
fn k5_two_workers() {
    let mut edges = Vec::new();
    for u in 1..=5u32 {
        for v in (u + 1)..=5u32 {
            edges.push((u, v));
        }
    }
    let result = run(&edges, 2, true, None);
    assert_eq!(result.counts.get(3), 10);
    assert_eq!(result.counts.get(4), 5);
    assert_eq!(result.counts.get(5), 1);
}

#[test]
fn two_disjoint_triangles_two_workers() {
    let edges = [(1, 2), (2, 3), (1, 3), (4, 5), (5, 6), (4, 6)];
    let result = run(&edges, 2, true, None);
    assert_eq!(result.counts.get(3), 2);
}

#[test]
fn bowtie_single_worker() {
    let edges = [(1, 2), (2, 3), (1, 3), (1, 4), (4, 5), (1, 5)];
    let result = run(&edges, 1, true, None);
    assert_eq!(result.counts.get(3), 2);
    assert_eq!(result.counts.get(4), 0);
}

/// A star of disjoint cliques hanging off one hub node, run under a low
/// threshold so donation actually triggers, and checked against the
/// donation-disabled aggregate: donation must never change the count,
/// only how the work to get there is split up.
#[test]
fn donation_stress_matches_single_worker_baseline() {
    let mut edges = Vec::new();
    let mut next = 2u32;
    for _ in 0..6 {
        let clique: Vec<u32> = (next..next + 4).collect();
        for i in 0..clique.len() {
            edges.push((1, clique[i]));
            for j in (i + 1)..clique.len() {
                edges.push((clique[i], clique[j]));
            }
        }
        next += 4;
    }

    let baseline = run(&edges, 1, false, None);
    let donated = run(&edges, 4, true, Some(2));

    for size in 2..=6 {
        assert_eq!(
            baseline.counts.get(size),
            donated.counts.get(size),
            "mismatch at size {size}"
        );
    }
}

#[test]
fn donation_neutrality_holds_across_worker_counts() {
    let mut edges = Vec::new();
    for u in 1..=6u32 {
        for v in (u + 1)..=6u32 {
            edges.push((u, v));
        }
    }
    let enabled = run(&edges, 3, true, Some(2));
    let disabled = run(&edges, 3, false, Some(2));
    for size in 2..=6 {
        assert_eq!(enabled.counts.get(size), disabled.counts.get(size));
    }
}
