//! Submission-lane ordering and timeout-detach guarantees, exercised through
//! the public registry API.

use crime_fleet::scheduler::LaneRegistry;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration, Instant};

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn back_to_back_calls_on_one_key_serialize_in_order() {
    let lanes = Arc::new(LaneRegistry::new());
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let started = Instant::now();

    let ev1 = Arc::clone(&events);
    let fn1 = lanes.run_exclusive("alice", "pls", 60_000, move || async move {
        ev1.lock().unwrap().push("fn1-start");
        sleep(Duration::from_millis(200)).await;
        ev1.lock().unwrap().push("fn1-end");
    });
    let ev2 = Arc::clone(&events);
    let fn2 = lanes.run_exclusive("alice", "pls", 60_000, move || async move {
        ev2.lock().unwrap().push("fn2-start");
        sleep(Duration::from_millis(100)).await;
        ev2.lock().unwrap().push("fn2-end");
    });

    let (r1, r2) = tokio::join!(fn1, fn2);
    r1.expect("fn1 settles");
    r2.expect("fn2 settles");

    assert_eq!(
        *events.lock().unwrap(),
        vec!["fn1-start", "fn1-end", "fn2-start", "fn2-end"],
        "fn1 must fully complete before fn2 begins"
    );
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn distinct_keys_impose_no_ordering() {
    let lanes = Arc::new(LaneRegistry::new());
    let started = Instant::now();
    let concurrent_peak = Arc::new(AtomicUsize::new(0));
    let in_flight = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for key in [("alice", "pls"), ("alice", "bsc"), ("bob", "pls")] {
        let lanes = Arc::clone(&lanes);
        let peak = Arc::clone(&concurrent_peak);
        let current = Arc::clone(&in_flight);
        handles.push(tokio::spawn(async move {
            lanes
                .run_exclusive(key.0, key.1, 60_000, move || async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(100)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("settles");
    }

    assert!(
        concurrent_peak.load(Ordering::SeqCst) >= 2,
        "independent keys should overlap in time"
    );
    assert!(started.elapsed() < Duration::from_millis(250));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn timeout_detaches_caller_without_releasing_the_lane() {
    let lanes = Arc::new(LaneRegistry::new());
    let finished = Arc::new(AtomicBool::new(false));
    let started = Instant::now();

    let flag = Arc::clone(&finished);
    let err = lanes
        .run_exclusive("alice", "pls", 50, move || async move {
            sleep(Duration::from_millis(200)).await;
            flag.store(true, Ordering::SeqCst);
        })
        .await
        .expect_err("caller must observe a timeout at ~50ms");
    assert!(err.to_string().contains("alice:pls"));
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert!(started.elapsed() < Duration::from_millis(200));
    assert!(!finished.load(Ordering::SeqCst), "original attempt still running");

    // The next call on the same key queues behind the detached attempt.
    lanes
        .run_exclusive("alice", "pls", 60_000, || async {})
        .await
        .expect("queued call settles");
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert!(finished.load(Ordering::SeqCst), "detached attempt ran to completion");
}
