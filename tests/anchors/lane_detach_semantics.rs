use std::fs;

#[test]
fn lane_timeout_detaches_caller_without_force_release() {
    let source = fs::read_to_string("src/scheduler/lane.rs")
        .expect("src/scheduler/lane.rs must be readable for lane audit");

    for needle in [
        "LaneError::Timeout",
        "mpsc::unbounded_channel::<LaneJob>()",
        "struct PendingGuard",
        "tokio::spawn(job).await",
    ] {
        assert!(
            source.contains(needle),
            "lane must contain `{needle}`: timeouts detach the caller, the worker keeps draining in order"
        );
    }

    assert!(
        !source.contains("abort()"),
        "lane must never hard-kill an in-flight attempt"
    );
}
