use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use curation_api::entity::{Flag, Gene};
use curation_api::{
    CriteriaSet, Database, EagerLoader, EntityStore, PageRequest, QueryService, Record, Resolver,
};

const GENES: i64 = 2_000;
const FLAGS: i64 = 200;

fn make_database() -> Database {
    let db = Database::new();
    for id in 1..=GENES {
        let entrez = i32::try_from(id).unwrap_or(i32::MAX) * 10;
        let gene = Gene::new(id, entrez, format!("GENE{id}")).with_alias(format!("ALIAS{id}"));
        db.genes.insert(gene).unwrap();
    }
    // Each flag links a sliding window of 25 genes, so joins fan out.
    for id in 1..=FLAGS {
        let start = (id * 7) % GENES + 1;
        let genes = (start..start + 25).map(|g| (g - 1) % GENES + 1);
        let flag = Flag::new(id, "GENE", format!("F{id}"), format!("Flag {id}")).with_genes(genes);
        db.flags.insert(flag).unwrap();
    }
    db
}

fn bench_criteria_scan(c: &mut Criterion) {
    let db = make_database();
    let service = QueryService::<Gene>::new(&db.genes);
    let criteria = CriteriaSet::from_query_pairs(
        Gene::SCHEMA,
        [("hugoSymbol.contains", "gene1"), ("entrezGeneId.greaterThan", "5000")],
    )
    .unwrap();
    let page = PageRequest::new(0, 20).unwrap();

    let mut group = c.benchmark_group("criteria");
    group.throughput(Throughput::Elements(GENES as u64));
    group.bench_function("gene_scan_paged", |b| {
        b.iter(|| service.find_by_criteria(black_box(&criteria), &page).unwrap());
    });
    group.finish();
}

fn bench_distinct_fan_out(c: &mut Criterion) {
    let db = make_database();
    let service = QueryService::<Flag>::new(&db.flags);
    let criteria = CriteriaSet::from_query_pairs(
        Flag::SCHEMA,
        [("geneId.in", "10,500,1500"), ("distinct", "true")],
    )
    .unwrap();

    c.bench_function("criteria/flag_join_distinct", |b| {
        b.iter(|| service.find_all_by_criteria(black_box(&criteria)).unwrap());
    });
}

fn bench_eager_paging(c: &mut Criterion) {
    let db = make_database();
    let loader = EagerLoader::<Flag>::new(&db.flags, &db);
    let page = PageRequest::new(3, 20).unwrap();

    let mut group = c.benchmark_group("eager");
    group.bench_function("flags_page", |b| {
        b.iter(|| loader.find_all_paged(true, black_box(&page)).unwrap());
    });
    group.bench_function("flags_page_lazy", |b| {
        b.iter(|| loader.find_all_paged(false, black_box(&page)).unwrap());
    });
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let db = make_database();
    let resolver = Resolver::<Gene>::new(&db.genes);
    let tokens = ["730", "GENE42", "alias1999", "missing"];

    c.bench_function("resolver/batch", |b| {
        b.iter(|| resolver.resolve_all(black_box(&tokens)).unwrap());
    });
}

criterion_group!(
    criteria,
    bench_criteria_scan,
    bench_distinct_fan_out,
    bench_eager_paging,
    bench_resolve
);
criterion_main!(criteria);
