//! Concurrent session file access tests
//!
//! Several `rw` processes may touch session.json at once. Each storage
//! instance here stands in for one process; every write must survive.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use rewards_core::adapters::file_store::FileSessionStorage;
use rewards_core::ports::SessionStorage;
use rewards_core::services::SessionStore;
use rewards_core::User;

const THREAD_COUNT: usize = 6;
const ITERATIONS_PER_THREAD: usize = 10;

#[test]
fn test_concurrent_instances_keep_every_key() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.json");
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|t| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let storage = FileSessionStorage::new(path);
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    storage
                        .set(&format!("thread{}.key{}", t, i), &i.to_string())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let storage = FileSessionStorage::new(&path);
    let keys = storage.keys().unwrap();
    assert_eq!(keys.len(), THREAD_COUNT * ITERATIONS_PER_THREAD);
    assert_eq!(storage.get("thread3.key7").unwrap(), Some("7".to_string()));
}

#[test]
fn test_readers_never_see_partial_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.json");
    let writer = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    writer.save("t0", &User::new(1, "a@b.com")).unwrap();

    let reader_path = path.clone();
    let reader = thread::spawn(move || {
        let store = SessionStore::new(Arc::new(FileSessionStorage::new(reader_path)));
        for _ in 0..50 {
            // A torn write would read as a missing user
            assert!(store.current_user().unwrap().is_some());
        }
    });

    for i in 0..50 {
        writer
            .save(&format!("t{}", i), &User::new(i as i64, "a@b.com"))
            .unwrap();
    }
    reader.join().unwrap();
}
