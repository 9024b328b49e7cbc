//! Transaction exclusion across threads and handles

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

use vault_git::{AuthorConfiguration, Repository};
use vault_test_utils::{TestDir, git};

fn author() -> AuthorConfiguration {
    AuthorConfiguration::new("Worker", "worker@example.com")
}

#[test]
fn test_second_begin_waits_for_cancel() {
    let dir = TestDir::new();
    let repo = Arc::new(Repository::initialize(dir.root(), author()).unwrap());

    let mut held = repo.begin().unwrap();
    let (tx, rx) = mpsc::channel();

    let waiter = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || {
            let mut second = repo.begin().unwrap();
            tx.send(()).unwrap();
            second.cancel().unwrap();
        })
    };

    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
    held.cancel().unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
    waiter.join().unwrap();
}

#[test]
fn test_second_begin_waits_for_commit() {
    let dir = TestDir::new();
    let repo = Arc::new(Repository::initialize(dir.root(), author()).unwrap());
    dir.write("a.txt", "a");

    let mut held = repo.begin().unwrap();
    held.stage(&["a.txt"]).unwrap();
    let (tx, rx) = mpsc::channel();

    let waiter = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || {
            let _second = repo.begin().unwrap();
            tx.send(repo.get_history(0).unwrap().len()).unwrap();
        })
    };

    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
    held.commit("first").unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 1);
    waiter.join().unwrap();
}

#[test]
fn test_handles_to_same_directory_share_the_lock() {
    let dir = TestDir::new();
    let a = Repository::initialize(dir.root(), author()).unwrap();
    let b = Repository::initialize(dir.root(), author()).unwrap();

    let held = a.begin().unwrap();
    assert!(b.try_begin().unwrap().is_none());
    drop(held);
    assert!(b.try_begin().unwrap().is_some());
}

#[cfg(unix)]
#[test]
fn test_symlinked_path_shares_the_lock() {
    let dir = TestDir::new();
    let real = Repository::initialize(dir.path("real"), author()).unwrap();
    dir.symlink("real", "alias");
    let alias = Arc::new(Repository::initialize(dir.path("alias"), author()).unwrap());
    assert_eq!(real.path(), alias.path());

    let mut held = real.begin().unwrap();
    assert!(alias.try_begin().unwrap().is_none());

    let (tx, rx) = mpsc::channel();
    let waiter = {
        let alias = Arc::clone(&alias);
        thread::spawn(move || {
            let mut second = alias.begin().unwrap();
            tx.send(()).unwrap();
            second.cancel().unwrap();
        })
    };

    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
    held.cancel().unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
    waiter.join().unwrap();
}

#[test]
fn test_distinct_repositories_do_not_block() {
    let dir = TestDir::new();
    let outer = Repository::initialize(dir.path("outer"), author()).unwrap();
    let other = Repository::initialize(dir.path("other"), author()).unwrap();
    let nested = Repository::initialize(dir.path("outer/nested"), author()).unwrap();

    let _a = outer.begin().unwrap();
    let _b = other.try_begin().unwrap().expect("other repository is independent");
    let _c = nested.try_begin().unwrap().expect("nested repository is independent");
}

#[test]
fn test_at_most_one_open_transaction() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 5;

    let dir = TestDir::new();
    let repo = Arc::new(Repository::initialize(dir.root(), author()).unwrap());
    let open = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let repo = Arc::clone(&repo);
            let open = Arc::clone(&open);
            let max_seen = Arc::clone(&max_seen);
            let barrier = Arc::clone(&barrier);
            let file = repo.path().join(format!("worker-{worker}.txt"));
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let mut tx = repo.begin().unwrap();
                    let now = open.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);

                    std::fs::write(&file, format!("{worker}:{round}")).unwrap();
                    let name = format!("worker-{worker}.txt");
                    tx.stage(&[name.as_str()]).unwrap();

                    open.fetch_sub(1, Ordering::SeqCst);
                    if round % 2 == 0 {
                        tx.commit(&format!("{worker}:{round}")).unwrap();
                    } else {
                        tx.cancel().unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    let commits_per_worker = ROUNDS.div_ceil(2);
    assert_eq!(git::commit_count(dir.root()), THREADS * commits_per_worker);
    assert!(git::parent_counts(dir.root()).iter().all(|&p| p <= 1));
}
