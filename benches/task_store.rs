//! Benchmarks for the SQLite task store.
//!
//! These benchmarks measure insert and list latency against an in-memory database.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tareas::{Task, TaskStore};
use tokio::runtime::Runtime;

fn seeded_store(rt: &Runtime, count: usize) -> TaskStore {
    rt.block_on(async {
        let store = TaskStore::open_in_memory().unwrap();
        store.migrate().await.unwrap();
        for i in 0..count {
            store
                .insert(&Task::new(&i.to_string(), "Buy milk"))
                .await
                .unwrap();
        }
        store
    })
}

fn bench_insert(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = seeded_store(&rt, 0);
    let mut next = 0u64;

    c.bench_function("task_store_insert", |b| {
        b.iter(|| {
            next += 1;
            let task = Task::new(&next.to_string(), "Walk the dog");
            rt.block_on(store.insert(black_box(&task))).unwrap()
        })
    });
}

fn bench_list_all(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = seeded_store(&rt, 500);

    c.bench_function("task_store_list_all_500", |b| {
        b.iter(|| rt.block_on(store.list_all()).unwrap())
    });
}

fn bench_toggle(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = seeded_store(&rt, 1);
    let mut completed = false;

    c.bench_function("task_store_update", |b| {
        b.iter(|| {
            completed = !completed;
            rt.block_on(store.update(black_box("0"), completed)).unwrap()
        })
    });
}

criterion_group!(benches, bench_insert, bench_list_all, bench_toggle);
criterion_main!(benches);
