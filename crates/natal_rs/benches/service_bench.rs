use criterion::{Criterion, black_box, criterion_group, criterion_main};
use natal_rs::{ChartRequest, ChartService, NatalConfig};

fn service_bench(c: &mut Criterion) {
    let service = ChartService::from_config(NatalConfig::default()).expect("default config is valid");
    let mut request = ChartRequest::new("1990-07-15T06:45:00+02:00", 52.52, 13.405);

    let mut group = c.benchmark_group("service");
    group.bench_function("calculate_chart_placidus", |b| {
        b.iter(|| service.calculate_chart(black_box(&request)).expect("chart should compute"))
    });
    request.house_system = Some("KOCH".into());
    group.bench_function("calculate_houses_koch", |b| {
        b.iter(|| service.calculate_houses(black_box(&request)).expect("houses should compute"))
    });
    group.finish();
}

criterion_group!(benches, service_bench);
criterion_main!(benches);
