// Criterion benchmarks for Goodfellows Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use goodfellows_match::core::{filter_eligible, parse_ages, Matchmaker};
use goodfellows_match::models::{AgeRange, Ages, DonorPreference, Gender, GenderPref, Principal, RecipientRecord, Role};
use goodfellows_match::services::MemoryProfileStore;
use std::sync::Arc;

fn create_candidate(id: usize) -> RecipientRecord {
    let kid_count = (id % 4 + 1) as u32;
    RecipientRecord {
        id: format!("rec{:06}", id),
        address: format!("{} Cherry Hill Rd", id),
        zip_code: "48187".to_string(),
        kid_count,
        ages: Ages::Parsed((0..kid_count).map(|k| ((id + k as usize * 3) % 15) as u32).collect()),
        gender: if id % 2 == 0 { Gender::Female } else { Gender::Male },
        approved: true,
        claimed_by: None,
        claimed_at: None,
        wishlists: None,
        documents: Default::default(),
        created_at: None,
    }
}

fn create_preference() -> DonorPreference {
    DonorPreference {
        child_count: 3,
        gender_pref: GenderPref::Female,
        age_range: AgeRange::new(3, 10).ok(),
    }
}

fn bench_parse_ages(c: &mut Criterion) {
    c.bench_function("parse_ages", |b| {
        b.iter(|| parse_ages(black_box("4, 6, 11, 2, 9")));
    });
}

fn bench_filtering(c: &mut Criterion) {
    let preference = create_preference();

    let mut group = c.benchmark_group("filter_eligible");

    for candidate_count in [100, 1_000, 10_000].iter() {
        let candidates: Vec<RecipientRecord> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("candidates", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| filter_eligible(black_box(&preference), black_box(candidates.clone())));
            },
        );
    }

    group.finish();
}

fn bench_eligible_query(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("build tokio runtime");
    let store = Arc::new(MemoryProfileStore::with_recipients((0..1_000).map(create_candidate)));
    let matchmaker = Matchmaker::new(store, vec!["48187".to_string()]);
    let donor = Principal::new("donor-bench", Role::Donor);
    let preference = create_preference();

    c.bench_function("eligible_with_1000_records", |b| {
        b.iter(|| {
            runtime
                .block_on(matchmaker.eligible_with(black_box(&donor), black_box(&preference)))
                .expect("eligible query")
        });
    });
}

criterion_group!(benches, bench_parse_ages, bench_filtering, bench_eligible_query);

criterion_main!(benches);
