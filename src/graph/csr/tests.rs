//! Tests for the CSR adjacency.

use super::*;

#[test]
fn test_csr_path_degrees() {
    // 0 - 1 - 2
    let adjacency = vec![vec![1], vec![0, 2], vec![1]];
    let graph = CsrAdjacency::from_adjacency(&adjacency);

    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.degree(1), 2);
    assert_eq!(graph.max_degree(), 2);
    assert_eq!(graph.neighbors(1), &[0, 2]);
    assert!(graph.has_edge(2, 1));
    assert!(!graph.has_edge(0, 2));
}

#[test]
fn test_from_csr_parts_reconstruction() {
    let offsets = vec![0, 2, 3, 4];
    let neighbors = vec![1, 2, 0, 0];

    let graph = CsrAdjacency::from_csr_parts(offsets, neighbors).unwrap();
    assert_eq!(graph.neighbors(0), &[1, 2]);
    assert_eq!(graph.neighbors(2), &[0]);
    assert_eq!(
        graph,
        CsrAdjacency::from_adjacency(&[vec![1, 2], vec![0], vec![0]])
    );
}

#[test]
fn test_from_csr_parts_rejects_malformed() {
    assert!(CsrAdjacency::from_csr_parts(vec![], vec![]).is_err());
    assert!(CsrAdjacency::from_csr_parts(vec![0, 2, 1], vec![0, 1]).is_err());
    assert!(CsrAdjacency::from_csr_parts(vec![0, 1], vec![0, 0]).is_err());
    assert!(CsrAdjacency::from_csr_parts(vec![0, 1], vec![5]).is_err());
    assert!(CsrAdjacency::from_csr_parts(vec![1, 1], vec![]).is_err());
}

#[test]
fn test_empty_graph() {
    let graph = CsrAdjacency::from_adjacency(&[]);
    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.max_degree(), 0);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_from_adjacency_panics_on_dangling_edge() {
    let _ = CsrAdjacency::from_adjacency(&[vec![3]]);
}
