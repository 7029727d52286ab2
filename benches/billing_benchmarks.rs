//! Performance benchmarks for the shift billing engine.
//!
//! Covers the engine run on its own and the full HTTP round trip:
//! - One month of a single airport (60 rows)
//! - A busy month across airports and sub-operators (1000 rows)
//! - POST /compute with a one-row request
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use shift_billing_engine::api::{AppState, ComputeRequest, create_router};
use shift_billing_engine::calculation::{HolidayCalendar, run_billing};
use shift_billing_engine::config::ConfigLoader;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const SHIFTS: &[&str] = &["08-11", "06:30-10:30", "22:00\u{2013}02:00", "13.00/17.00", "09-12 no dec"];
const AIRPORTS: &[&str] = &["BGY", "VRN", "Malpensa"];

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config").expect("Failed to load config")
}

/// Builds a request with `row_count` rows spread over March 2025.
fn create_request(partner: &str, row_count: usize) -> ComputeRequest {
    let rows: Vec<serde_json::Value> = (0..row_count)
        .map(|i| {
            let day = (i % 31) + 1;
            serde_json::json!({
                "date": format!("2025-03-{:02}", day),
                "location": AIRPORTS[i % AIRPORTS.len()],
                "shift": SHIFTS[i % SHIFTS.len()],
                "actual_departures": if i % 4 == 0 { "11:45" } else { "" },
                "scheduled_departures": "10:30",
                "checkin": "09:00",
                "sub_operator": if i % 2 == 0 { "OPA" } else { "OPB" },
                "service_category": "Tour Operator",
                "passengers": (i % 40) as u32,
                "assistant": if i % 3 == 0 { "Giulia Rossi" } else { "Luca Verdi" },
                "provided_amount": "75,00"
            })
        })
        .collect();

    serde_json::from_value(serde_json::json!({
        "partner": partner,
        "files": [{
            "file_id": "bench.xlsx",
            "sheets": [{ "sheet_id": "Foglio1", "rows": rows }]
        }]
    }))
    .expect("Failed to create request")
}

/// Benchmark: engine run per partner over a month of rows.
fn bench_run_billing(c: &mut Criterion) {
    let config = load_config();
    let calendar = HolidayCalendar::italian();

    let mut group = c.benchmark_group("run_billing");
    for &row_count in &[60usize, 1000] {
        group.throughput(Throughput::Elements(row_count as u64));
        for partner in config.partner_ids() {
            let policy = config.get_policy(partner).expect("shipped partner");
            let sheets = create_request(partner, row_count).into_sheets();
            group.bench_with_input(
                BenchmarkId::new(partner, row_count),
                &sheets,
                |b, sheets| {
                    b.iter(|| {
                        black_box(run_billing(
                            black_box(sheets),
                            policy,
                            &calendar,
                            config.collaborators(),
                        ))
                    })
                },
            );
        }
    }
    group.finish();
}

/// Benchmark: a one-row request through the router.
fn bench_compute_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_config()));
    let body = serde_json::json!({
        "partner": "alpitour",
        "files": [{"file_id": "f", "sheets": [{"sheet_id": "BGY", "rows": [
            {"date": "2025-03-04", "location": "BGY", "shift": "08-11", "actual_departures": "11:20"}
        ]}]}]
    })
    .to_string();

    c.bench_function("compute_single_row", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/compute")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(benches, bench_run_billing, bench_compute_endpoint);
criterion_main!(benches);
