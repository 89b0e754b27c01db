// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::engine::test_helpers::{wait_until, TestContext, TestRegistry};
use ci_adapters::{FakeBuildRunner, FakeWorkspace};
use ci_core::FakeClock;
use std::time::Duration;

type TestCtx = ListenCtx<FakeWorkspace, FakeBuildRunner, FakeClock>;

fn listen_ctx(registry: TestRegistry) -> TestCtx {
    ListenCtx { registry: Arc::new(registry), start_time: Instant::now(), shutdown: Arc::new(Notify::new()) }
}

fn setup() -> (TestCtx, TestContext) {
    // The context keeps the temp dir and fakes alive; the listener owns a
    // second registry over the same fakes and workspace root.
    let test = TestContext::new();
    let registry = Registry::new(test.deps(), test.registry.config().clone());
    (listen_ctx(registry), test)
}

#[tokio::test]
async fn ping_and_hello() {
    let (ctx, _test) = setup();

    assert_eq!(handle_request(Request::Ping, &ctx).await, Response::Pong);
    assert_eq!(
        handle_request(Request::Hello { version: "0.0.1".into() }, &ctx).await,
        Response::Hello { version: PROTOCOL_VERSION.to_string() }
    );
}

#[tokio::test]
async fn add_list_details_remove() {
    let (ctx, _test) = setup();
    let add = Request::AddJob { name: "mrepo".into(), remote: "git@host:mrepo.git".into(), branch: "master".into() };

    assert_eq!(handle_request(add.clone(), &ctx).await, Response::Ok);
    assert_eq!(
        handle_request(add, &ctx).await,
        Response::error("job \"mrepo\" already exists")
    );

    let Response::Jobs { jobs } =
        handle_request(Request::ListJobs { refresh_output: false, build_output: false }, &ctx).await
    else {
        panic!("expected Jobs");
    };
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "mrepo");

    let Response::Job { job } = handle_request(Request::JobDetails { name: "mrepo".into() }, &ctx).await else {
        panic!("expected Job");
    };
    assert_eq!(job.remote, "git@host:mrepo.git");

    assert_eq!(handle_request(Request::RemoveJob { name: "mrepo".into() }, &ctx).await, Response::Ok);
    assert_eq!(
        handle_request(Request::JobDetails { name: "mrepo".into() }, &ctx).await,
        Response::error("job \"mrepo\" not found")
    );
}

#[tokio::test]
async fn heartbeat_is_counted_in_status() {
    let (ctx, _test) = setup();
    ctx.registry.add_job("mrepo", "r", "master").unwrap();

    assert_eq!(handle_request(Request::HeartBeat, &ctx).await, Response::Ok);
    assert_eq!(handle_request(Request::HeartBeat, &ctx).await, Response::Ok);

    let Response::Status { jobs, heartbeats, .. } = handle_request(Request::Status, &ctx).await else {
        panic!("expected Status");
    };
    assert_eq!(jobs, 1);
    assert_eq!(heartbeats, 2);
}

#[tokio::test]
async fn invalid_name_is_reported() {
    let (ctx, _test) = setup();
    let response = handle_request(
        Request::AddJob { name: "../escape".into(), remote: "r".into(), branch: "master".into() },
        &ctx,
    )
    .await;
    assert!(matches!(response, Response::Error { ref message } if message.contains("relative path")));
}

#[tokio::test]
async fn shutdown_notifies_the_main_loop() {
    let (ctx, _test) = setup();
    assert_eq!(handle_request(Request::Shutdown, &ctx).await, Response::ShuttingDown);
    // The stored permit completes immediately.
    tokio::time::timeout(Duration::from_secs(1), ctx.shutdown.notified()).await.unwrap();
}

#[tokio::test]
async fn connection_round_trip() {
    let (ctx, _test) = setup();
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let (mut client_read, mut client_write) = tokio::io::split(client);

    let serve = handle_connection(server_read, server_write, &ctx);
    let talk = async {
        protocol::write_request(&mut client_write, &Request::Ping, Duration::from_secs(1)).await.unwrap();
        protocol::read_response(&mut client_read, Duration::from_secs(1)).await.unwrap()
    };
    let (served, response) = tokio::join!(serve, talk);

    served.unwrap();
    assert_eq!(response, Response::Pong);
}

#[tokio::test(start_paused = true)]
async fn remove_answers_before_a_long_build_ends() {
    let (ctx, test) = setup();
    test.builder.set_delay(Duration::from_secs(600));
    ctx.registry.add_job("mrepo", "r", "master").unwrap();
    let job = ctx.registry.job("mrepo").unwrap();
    let run = tokio::spawn(async move { job.run().await });
    assert!(wait_until(|| test.builder.builds() == 1).await);

    let asked = tokio::time::Instant::now();
    let response = handle_request(Request::RemoveJob { name: "mrepo".into() }, &ctx).await;

    assert_eq!(response, Response::Ok);
    assert!(asked.elapsed() < ipc_timeout());
    assert!(ctx.registry.job_details("mrepo").is_err());
    assert_eq!(
        ctx.registry.add_job("mrepo", "r", "master").unwrap_err().to_string(),
        "job \"mrepo\" is still being removed"
    );

    run.await.unwrap();
    assert!(wait_until(|| !test.job_dir("mrepo").exists()).await);
    assert!(wait_until(|| ctx.registry.add_job("mrepo", "r", "master").is_ok()).await);
}
