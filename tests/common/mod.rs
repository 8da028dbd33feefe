use std::path::PathBuf;

use buddy_quiz::storage::LocalStore;

pub fn temp_data_dir(name: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "buddy_quiz_test_{}_{}_{}",
        name,
        std::process::id(),
        id
    ));
    // Clean up leftovers from previous runs
    let _ = std::fs::remove_dir_all(&path);
    path
}

pub fn create_local_store(name: &str) -> LocalStore {
    LocalStore::open(temp_data_dir(name)).expect("failed to create local store")
}
