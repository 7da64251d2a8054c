use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use neuroatlas::{
    aggregate_all, build_hierarchy, build_organ_catalog, AggregationScope, AtlasConfig,
    EndOrganOrderMap, Filters, HierarchyRecord, KnowledgeStatement, OrganAxis, StatementMap,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PHENOTYPES: [&str; 4] = ["sympathetic", "parasympathetic", "sensory", ""];

/// Synthetic dataset: `regions` level-2 regions under brain and a ganglion
/// chain, 8 leaves each, one statement per leaf into one of 20 organs
fn dataset(regions: usize) -> (Vec<HierarchyRecord>, StatementMap) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut records = Vec::new();
    let mut statements = StatementMap::new();

    for r in 0..regions {
        let (l1_id, l1_name) = if r % 2 == 0 { ("brain", "brain") } else { ("chain", "ganglion chain") };
        for leaf in 0..8 {
            let ks = format!("ks{}_{}", r, leaf);
            let organ = rng.gen_range(0..20);
            records.push(
                HierarchyRecord::default()
                    .with_level(l1_id, l1_name)
                    .with_level(&format!("region{}", r), &format!("Region {}", r))
                    .with_leaf(&format!("leaf{}_{}", r, leaf), &format!("Leaf {}", leaf))
                    .with_statement(&ks)
                    .with_target_organ(&format!("organ{}", organ), &format!("Organ {}", organ))
                    .with_end_organ(&format!("end{}", organ), &format!("End {}", organ)),
            );
            let phenotype = PHENOTYPES[rng.gen_range(0..PHENOTYPES.len())];
            statements.insert(ks.clone(), KnowledgeStatement::new(ks).with_phenotype(phenotype));
        }
    }
    (records, statements)
}

fn bench_build_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_hierarchy");
    let config = AtlasConfig::default();

    for size in [10, 100, 1000].iter() {
        let (records, _) = dataset(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| build_hierarchy(records, &config));
        });
    }
    group.finish();
}

fn bench_aggregate_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_all");
    let config = AtlasConfig::default();

    for size in [10, 100, 1000].iter() {
        let (records, statements) = dataset(*size);
        let hierarchy = build_hierarchy(&records, &config);
        let catalog = build_organ_catalog(&records, &EndOrganOrderMap::new(), &config);
        let axis = OrganAxis::target_organs(catalog.organs.values());
        let filters = Filters::new();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| aggregate_all(&hierarchy, &axis, &statements, &filters));
        });
    }
    group.finish();
}

/// Repeated requests against one scope are served from the memo
fn bench_memoized_root(c: &mut Criterion) {
    let config = AtlasConfig::default();
    let (records, statements) = dataset(1000);
    let hierarchy = build_hierarchy(&records, &config);
    let catalog = build_organ_catalog(&records, &EndOrganOrderMap::new(), &config);
    let axis = OrganAxis::target_organs(catalog.organs.values());
    let filters = Filters::new();
    let root = config.roots[0].id.clone();

    let mut scope = AggregationScope::new(&hierarchy, &axis, &statements, &filters);
    c.bench_function("memoized_root", |b| {
        b.iter(|| scope.node(&root).map(|cells| cells.len()));
    });
}

criterion_group!(
    benches,
    bench_build_hierarchy,
    bench_aggregate_all,
    bench_memoized_root
);
criterion_main!(benches);
