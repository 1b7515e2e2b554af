use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use ridebook::db::{MemoryStore, RideStore};
use ridebook::models::{Difficulty, RideStatus};
use ridebook::services::seed::demo_rides;
use ridebook::services::{PageRequest, RideFilter, RideListingService};
use std::hint::black_box;
use std::sync::Arc;

const RIDE_COUNT: i64 = 10_000;

fn benchmark_cursor_paging(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    // Spread copies of the demo rides over the following year
    let store = Arc::new(MemoryStore::new());
    let templates = demo_rides(now);
    runtime.block_on(async {
        for i in 0..RIDE_COUNT {
            let mut ride = templates[i as usize % templates.len()].clone();
            ride.id = format!("bench-{i:05}");
            ride.start_date_time_utc = now + Duration::minutes(i * 53);
            store.put_ride(&ride).await.expect("memory put");
        }
    });
    let service = RideListingService::new(store);

    let mut group = c.benchmark_group("cursor_paging");

    group.bench_function("first_page_default_view", |b| {
        let filter = RideFilter::default();
        let page = PageRequest::default();
        b.iter(|| runtime.block_on(service.list_at(black_box(&filter), &page, now)))
    });

    group.bench_function("walk_all_pages_selective_filter", |b| {
        let filter = RideFilter {
            include_past: true,
            difficulty: Some(Difficulty::Hard),
            status: Some(RideStatus::Published),
            ..Default::default()
        };
        b.iter(|| {
            runtime.block_on(async {
                let mut cursor: Option<String> = None;
                let mut total = 0;
                loop {
                    let page = PageRequest::new(Some(100), cursor.take()).expect("valid page");
                    let result = service.list_at(&filter, &page, now).await.expect("listing");
                    total += result.rides.len();
                    match result.next_cursor {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                black_box(total)
            })
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_cursor_paging);
criterion_main!(benches);
