//! Benchmarks for health check rounds and aggregation with varying endpoint counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use healthwatch::health::{
    CheckConfig, EndpointRegistration, EndpointState, HealthCheckResult, HealthMonitor,
    HealthStatus, SystemHealth,
};
use healthwatch::probe;
use std::time::Duration;

fn create_monitor(endpoint_count: usize) -> HealthMonitor {
    let monitor = HealthMonitor::new();
    for i in 0..endpoint_count {
        let name = format!("svc-{}", i);
        let healthy = i % 7 != 0;
        monitor
            .register_endpoint(EndpointRegistration::new(
                name.clone(),
                probe::capability(name, move || async move { Ok::<_, String>(healthy) }),
            ))
            .unwrap();
    }
    monitor
}

fn bench_rounds(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("perform_health_checks");
    for count in [1, 10, 100] {
        let monitor = create_monitor(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| runtime.block_on(monitor.perform_health_checks()))
        });
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("system_health");
    for count in [10, 100, 1000] {
        let results: Vec<HealthCheckResult> = (0..count)
            .map(|i| {
                let status = match i % 4 {
                    0 => HealthStatus::Degraded,
                    1 => HealthStatus::Unhealthy,
                    _ => HealthStatus::Healthy,
                };
                HealthCheckResult::new(format!("svc-{}", i), status, Duration::from_millis(5))
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &results, |b, results| {
            b.iter(|| SystemHealth::from_results(black_box(results.clone())))
        });
    }
    group.finish();
}

fn bench_state_transitions(c: &mut Criterion) {
    let config = CheckConfig::default();
    let failing = HealthCheckResult::unhealthy("svc", "down", Duration::from_millis(1));
    let healthy = HealthCheckResult::new("svc", HealthStatus::Healthy, Duration::from_millis(1));

    c.bench_function("endpoint_state_fail_recover", |b| {
        b.iter(|| {
            let mut state = EndpointState::default();
            for _ in 0..5 {
                black_box(state.apply_result(failing.clone(), &config));
            }
            black_box(state.apply_result(healthy.clone(), &config))
        })
    });
}

criterion_group!(benches, bench_rounds, bench_aggregation, bench_state_transitions);
criterion_main!(benches);
