use std::fs;

#[test]
fn wallet_scheduler_stop_is_cooperative_only() {
    let source = fs::read_to_string("src/scheduler/wallet.rs")
        .expect("src/scheduler/wallet.rs must be readable for stop audit");

    for needle in [
        "shared.stop_notify.notified()",
        "shared.stop.load(Ordering::SeqCst)",
        "set_phase(SchedulePhase::Stopped)",
    ] {
        assert!(
            source.contains(needle),
            "scheduler must contain `{needle}` for cooperative stop"
        );
    }

    assert!(
        !source.contains(".abort()"),
        "in-flight attempts are settled, never aborted"
    );

    // The stop flag must be consulted again after the attempt settles so a
    // stop issued mid-flight suppresses re-arming.
    let attempt_at = source.find("run_exclusive").expect("attempt present");
    let recheck = &source[attempt_at..];
    assert!(
        recheck.contains("stop.load(Ordering::SeqCst)"),
        "stop flag must be rechecked after the attempt settles"
    );
}
