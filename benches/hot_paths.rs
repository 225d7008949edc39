use conflict_dash::data;
use conflict_dash::report::{recompute, Selection};
use criterion::{criterion_group, criterion_main, Criterion};

const COUNTRIES: [&str; 6] = [
    "Myanmar",
    "Indonesia",
    "Philippines",
    "Thailand",
    "Vietnam",
    "Cambodia",
];
const EVENT_TYPES: [&str; 4] = ["Battles", "Protests", "Riots", "Violence against civilians"];

/// Deterministic synthetic dataset shaped like the real export.
fn synthetic_csv(rows: usize) -> String {
    let mut out = String::from(
        "EVENT_DATE,YEAR,EVENT_TYPE,SUB_EVENT_TYPE,ACTOR1,INTERACTION,REGION,COUNTRY,LOCATION,LATITUDE,LONGITUDE,FATALITIES,TIMESTAMP\n",
    );
    for i in 0..rows {
        let year = 2010 + (i % 13);
        let month = 1 + i % 12;
        let day = 1 + i % 28;
        let country = COUNTRIES[i % COUNTRIES.len()];
        let event_type = EVENT_TYPES[i % EVENT_TYPES.len()];
        let lat = 10.0 + (i % 20) as f64 * 0.5;
        let lon = 96.0 + (i % 40) as f64 * 0.5;
        let fatalities = i % 7;
        let timestamp = 1_600_000_000 + i as i64;
        out.push_str(&format!(
            "{year}-{month:02}-{day:02},{year},{event_type},Sub,Actor {},{},East Asia Pacific,{country},Town {},{lat},{lon},{fatalities},{timestamp}\n",
            i % 50,
            10 + (i % 5) * 10,
            i % 100,
        ));
    }
    out
}

fn bench_load(c: &mut Criterion) {
    let csv = synthetic_csv(5_000);
    c.bench_function("load_and_clean_5k_rows", |b| {
        b.iter(|| data::load_from_reader(csv.as_bytes(), "bench").unwrap())
    });
}

fn bench_recompute(c: &mut Criterion) {
    let csv = synthetic_csv(5_000);
    let (dataset, clean_report) = data::load_from_reader(csv.as_bytes(), "bench").unwrap();
    let selection = Selection::default();
    c.bench_function("recompute_5k_rows", |b| {
        b.iter(|| recompute(&dataset, &clean_report, &selection))
    });
}

criterion_group!(benches, bench_load, bench_recompute);
criterion_main!(benches);
