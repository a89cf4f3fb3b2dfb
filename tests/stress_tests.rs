//! Stress tests for concurrent executions
//!
//! Each execution owns its process and workspace; these check that nothing
//! leaks between concurrent requests or survives them.

use futures::future::join_all;
use playground_exec::{utils, ExecutionRequest, PlaygroundBuilder, COMPLETION_SENTINEL};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

fn has(program: &str) -> bool {
    utils::find_executable(Path::new(program)).is_some()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_concurrent_python_executions_are_isolated() {
    if !has("python3") {
        return;
    }
    let playground = PlaygroundBuilder::new()
        .deadline(Duration::from_secs(30))
        .build()
        .unwrap();

    let requests: Vec<_> = (0..16)
        .map(|i| ExecutionRequest::new(format!("print({} * 10)", i), "python"))
        .collect();
    let outcomes = join_all(requests.iter().map(|r| playground.execute(r))).await;

    for (i, outcome) in outcomes.into_iter().enumerate() {
        let outcome = outcome.unwrap();
        assert!(outcome.succeeded, "stderr: {}", outcome.stderr);
        assert!(outcome.stdout.starts_with(&format!("{}\n", i * 10)));
        assert!(outcome.stdout.contains(COMPLETION_SENTINEL));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_slow_execution_does_not_block_others() {
    if !has("python3") {
        return;
    }
    let playground = PlaygroundBuilder::new()
        .deadline(Duration::from_secs(3))
        .build()
        .unwrap();

    let slow = ExecutionRequest::new("while True: pass", "python");
    let fast = ExecutionRequest::new("print('quick')", "python");

    let start = Instant::now();
    let (slow_outcome, fast_outcome) = tokio::join!(
        playground.execute(&slow),
        async {
            let outcome = playground.execute(&fast).await;
            (outcome, start.elapsed())
        }
    );

    let (fast_outcome, fast_elapsed) = fast_outcome;
    assert!(fast_outcome.unwrap().succeeded);
    assert!(fast_elapsed < Duration::from_secs(3));
    assert!(!slow_outcome.unwrap().succeeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_concurrent_javascript_workspaces_removed() {
    if !has("node") {
        return;
    }
    let scratch = tempfile::tempdir().unwrap();
    let deps = tempfile::tempdir().unwrap();
    let playground = PlaygroundBuilder::new()
        .scratch_dir(scratch.path())
        .dependency_root(deps.path())
        .js_imports(Vec::new())
        .build()
        .unwrap();

    let requests: Vec<_> = (0..8)
        .map(|i| {
            let code = if i % 2 == 0 {
                format!("console.log({});", i)
            } else {
                format!("throw new Error('fail {}');", i)
            };
            ExecutionRequest::new(code, "javascript")
        })
        .collect();
    let outcomes = join_all(requests.iter().map(|r| playground.execute(r))).await;

    for (i, outcome) in outcomes.into_iter().enumerate() {
        let outcome = outcome.unwrap();
        assert_eq!(outcome.succeeded, i % 2 == 0, "stderr: {}", outcome.stderr);
        if i % 2 == 1 {
            assert!(outcome.stderr.contains(&format!("fail {}", i)));
        }
    }
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn stress_rapid_rejections() {
    let scratch = tempfile::tempdir().unwrap();
    let playground = PlaygroundBuilder::new()
        .scratch_dir(scratch.path())
        .build()
        .unwrap();

    for i in 0..100 {
        let request = ExecutionRequest::new("1", format!("lang-{}", i));
        assert!(playground.execute(&request).await.is_err());
    }
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}
