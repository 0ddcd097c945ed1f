use ghostcolor::coloring::{
    color_local, detect_conflicts, BitwiseGreedy, ColorSummary, ColoringStrategy, EdgeBasedGreedy,
    GhostedColors, SequentialGreedy, TieBreak,
};
use ghostcolor::graph::generators::{self, GlobalAdjacency};
use ghostcolor::{color_cluster, ColoringConfig, ColoringOutcome, CsrAdjacency, VertexLayout};
use proptest::prelude::*;

fn gather(outcomes: &[ColoringOutcome], n: usize) -> Vec<u32> {
    let mut colors = vec![0; n];
    for (gid, color) in outcomes.iter().flat_map(ColoringOutcome::iter) {
        colors[gid as usize] = color;
    }
    colors
}

fn assert_proper(adj: &GlobalAdjacency, colors: &[u32]) {
    for (u, nbrs) in adj.iter().enumerate() {
        assert_ne!(colors[u], 0, "vertex {u} uncolored");
        for &v in nbrs {
            assert_ne!(colors[u], colors[v as usize], "edge {u}-{v}");
        }
    }
}

fn graph_strategy() -> impl Strategy<Value = GlobalAdjacency> {
    (1usize..60, 0usize..200, any::<u64>()).prop_map(|(n, m, seed)| generators::random(n, m, seed))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn block_partitions_color_properly(
        adj in graph_strategy(),
        ranks in 1usize..5,
        seed in any::<u64>(),
    ) {
        let (ownership, locals) = generators::partition_blocks(&adj, ranks);
        let config = ColoringConfig::default().with_seed(seed).with_validation(true);
        let outcomes = color_cluster(&ownership, &locals, &config).unwrap();
        assert_proper(&adj, &gather(&outcomes, adj.len()));
    }

    #[test]
    fn scattered_partitions_color_properly(
        adj in graph_strategy(),
        ranks in 2usize..5,
        salt in any::<u64>(),
    ) {
        // Round-robin-ish owners maximize the number of cross-rank edges.
        let owners: Vec<usize> = (0..adj.len())
            .map(|v| {
                ((v as u64).wrapping_mul(0x9E37_79B9).wrapping_add(salt) % ranks as u64) as usize
            })
            .collect();
        let (ownership, locals) = generators::partition_by_owner(&adj, &owners, ranks);
        let outcomes = color_cluster(&ownership, &locals, &ColoringConfig::default()).unwrap();
        assert_proper(&adj, &gather(&outcomes, adj.len()));
    }

    #[test]
    fn same_seed_same_coloring(adj in graph_strategy(), ranks in 1usize..5, seed in any::<u64>()) {
        let (ownership, locals) = generators::partition_blocks(&adj, ranks);
        let config = ColoringConfig::default().with_seed(seed);
        let first = color_cluster(&ownership, &locals, &config).unwrap();
        let second = color_cluster(&ownership, &locals, &config).unwrap();
        prop_assert_eq!(gather(&first, adj.len()), gather(&second, adj.len()));
    }

    #[test]
    fn local_kernels_respect_degree_bound(adj in graph_strategy()) {
        let rows: Vec<Vec<usize>> =
            adj.iter().map(|n| n.iter().map(|&v| v as usize).collect()).collect();
        let csr = CsrAdjacency::from_adjacency(&rows);
        let strategies: [&dyn ColoringStrategy; 3] =
            [&SequentialGreedy, &EdgeBasedGreedy, &BitwiseGreedy];
        for strategy in strategies {
            let colors = color_local(&csr, strategy);
            assert_proper(&adj, &colors);
            let summary = ColorSummary::from_colors(&colors);
            prop_assert!(
                summary.num_colors as usize <= csr.max_degree() + 1,
                "{}",
                strategy.name()
            );
        }
    }

    #[test]
    fn only_boundary_vertices_are_ever_reset(
        adj in graph_strategy(),
        ranks in 2usize..5,
        palette in 1u32..4,
        seed in any::<u64>(),
    ) {
        let (ownership, locals) = generators::partition_blocks(&adj, ranks);
        let tiebreak = TieBreak::new(seed);
        for (rank, local) in locals.iter().enumerate() {
            let layout = VertexLayout::build(rank, local, &ownership).unwrap();
            let mut colors = GhostedColors::new(&layout);
            // A tiny palette guarantees plenty of clashes.
            for (v, c) in colors.as_mut_slice().iter_mut().enumerate() {
                *c = (layout.gid(v) % u64::from(palette)) as u32 + 1;
            }
            let scan = detect_conflicts(&layout, &mut colors, &tiebreak);
            for v in scan.owned(&layout) {
                prop_assert!(layout.is_boundary(v));
            }
            for &v in &scan.worklist {
                prop_assert_eq!(colors.get(v), 0);
            }
        }
    }
}
