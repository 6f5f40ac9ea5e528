//! Performance benchmarks for OrgChart hierarchy operations
//!
//! Run with: `cargo bench -p orgchart-core`
//!
//! These benchmarks measure critical path performance:
//! - Forest assembly from a flat snapshot (in memory)
//! - Descendant collection for cascade deletes (in memory)
//! - `get_hierarchy` end to end over libsql

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orgchart_core::db::{DatabaseService, TursoStore};
use orgchart_core::services::{HierarchyIndex, PositionService};
use orgchart_core::{PositionInput, PositionRecord};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Balanced tree snapshot with the given fan-out, in creation order
fn generate_org(size: usize, fan_out: usize) -> Vec<PositionRecord> {
    let mut records: Vec<PositionRecord> = Vec::with_capacity(size);
    for i in 0..size {
        let parent_id = if i == 0 {
            None
        } else {
            Some(records[(i - 1) / fan_out].id.clone())
        };
        records.push(PositionRecord::new(format!("Position {}", i), "", parent_id));
    }
    records
}

/// Setup a service with `size` positions in a fresh database
async fn setup_test_service(size: usize) -> (PositionService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bench.db");

    let db = Arc::new(DatabaseService::new(db_path).await.unwrap());
    let service = PositionService::new(Arc::new(TursoStore::new(db)));

    let mut ids: Vec<String> = Vec::with_capacity(size);
    for i in 0..size {
        let parent_id = if i == 0 { None } else { Some(ids[(i - 1) / 4].clone()) };
        let position = service
            .create_position(PositionInput::new(format!("Position {}", i), "", parent_id))
            .await
            .unwrap();
        ids.push(position.id);
    }

    (service, temp_dir)
}

fn bench_forest_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_assembly");

    for size in [100, 1_000, 10_000] {
        let records = generate_org(size, 5);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let index = HierarchyIndex::build(black_box(records));
                black_box(index.forest())
            })
        });
    }

    group.finish();
}

fn bench_descendants(c: &mut Criterion) {
    let records = generate_org(10_000, 5);
    let root_id = records[0].id.clone();

    c.bench_function("descendants_of_root_10k", |b| {
        b.iter(|| {
            let index = HierarchyIndex::build(&records);
            black_box(index.descendants(black_box(&root_id)))
        })
    });
}

/// Snapshot read plus assembly over a 500-position database
fn bench_get_hierarchy(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (service, _temp) = rt.block_on(setup_test_service(500));

    c.bench_function("get_hierarchy_500", |b| {
        b.iter(|| rt.block_on(async { black_box(service.get_hierarchy().await.unwrap()) }))
    });
}

criterion_group!(
    benches,
    bench_forest_assembly,
    bench_descendants,
    bench_get_hierarchy
);
criterion_main!(benches);
