use nauty_canon::prelude::*;
use testing::{GraphIter, randomize_labels};

use criterion::{BatchSize, black_box, criterion_group, criterion_main, Criterion};
use petgraph::{
    EdgeType,
    graph::Graph,
    Directed, Undirected,
};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256Plus;

type Pair = (LabelledGraph<usize, u8>, LabelledGraph<usize, u8>);

fn pairs<Ty: EdgeType>(
    graphs: impl Iterator<Item = Graph<u8, u8, Ty>>,
    rng: &mut impl Rng,
) -> Vec<Pair> {
    Vec::from_iter(graphs.map(|g| {
        let h = randomize_labels(g.clone(), rng);
        (LabelledGraph::from(&g), LabelledGraph::from(&h))
    }))
}

fn iso<S: AutomorphismSearcher>(searcher: &S, graphs: Vec<Pair>) -> bool {
    graphs.into_iter().all(|(g, h)| {
        canonical_form_with(searcher, &g, None).unwrap()
            == canonical_form_with(searcher, &h, None).unwrap()
    })
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = Xoshiro256Plus::seed_from_u64(0);

    let graphs = pairs(GraphIter::<Undirected>::loopless().take(1000), &mut rng);
    let g = graphs.clone();
    c.bench_function("undirected dense nauty", move |b| {
        b.iter_batched(|| g.clone(), |g| iso(&DenseNauty, black_box(g)), BatchSize::SmallInput)
    });
    let g = graphs.clone();
    c.bench_function("undirected sparse nauty", move |b| {
        b.iter_batched(|| g.clone(), |g| iso(&SparseNauty, black_box(g)), BatchSize::SmallInput)
    });
    c.bench_function("undirected traces", move |b| {
        b.iter_batched(|| graphs.clone(), |g| iso(&Traces, black_box(g)), BatchSize::SmallInput)
    });

    let graphs = pairs(GraphIter::<Directed>::default().take(1000), &mut rng);
    let g = graphs.clone();
    c.bench_function("directed dense nauty", move |b| {
        b.iter_batched(|| g.clone(), |g| iso(&DenseNauty, black_box(g)), BatchSize::SmallInput)
    });
    c.bench_function("directed sparse nauty", move |b| {
        b.iter_batched(|| graphs.clone(), |g| iso(&SparseNauty, black_box(g)), BatchSize::SmallInput)
    });

    let graphs = pairs(GraphIter::<Undirected>::default().take(1000), &mut rng);
    c.bench_function("automorphisms dense nauty", move |b| {
        b.iter_batched(
            || graphs.clone(),
            |g| {
                g.into_iter()
                    .map(|(g, _)| automorphism_group(black_box(&g), None).unwrap().order())
                    .sum::<f64>()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
