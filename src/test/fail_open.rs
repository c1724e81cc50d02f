use std::time::Duration;

use crate::test::slow_transport::SlowTransport;

#[tokio::test]
async fn failed_fetch_reads_as_enabled() {
    super::init_tracing();

    // No flags set: every fetch fails.
    let transport = SlowTransport::new(Duration::from_millis(100));

    let (client, worker) = crate::Builder::new().build_with(transport.clone());
    let worker = tokio::spawn(worker.wait());

    assert!(client.is_enabled_now("home.postSlider"));
    assert!(!client.is_loaded());

    assert!(client.is_enabled("never.declared").await);
    assert!(client.is_enabled("home.postSlider").await);
    assert!(client.get_all().await.is_empty());

    // The empty result is cached, not retried.
    transport.set_flags(&[("home.postSlider", false)]).await;
    assert!(client.is_enabled("home.postSlider").await);
    assert!(client.is_enabled_now("home.postSlider"));
    assert_eq!(transport.requests(), 1);

    drop(client);
    worker.await.unwrap();
}

#[tokio::test]
async fn sync_reads_follow_the_cache_once_loaded() {
    super::init_tracing();

    let transport = SlowTransport::new(Duration::from_millis(0));
    transport
        .set_flags(&[("home.sponsors", false), ("home.stats", true)])
        .await;

    let (client, worker) = crate::Builder::new().build_with(transport);
    let worker = tokio::spawn(worker.wait());

    assert!(client.is_enabled_now("home.sponsors"));
    client.get_all().await;

    assert!(client.is_loaded());
    assert!(!client.is_enabled_now("home.sponsors"));
    assert!(client.is_enabled_now("home.stats"));
    assert!(client.is_enabled_now("never.declared"));
    assert!(!client.are_enabled_now(&["home.sponsors", "home.stats"], true));
    assert!(client.are_enabled(&["home.sponsors", "home.stats"], false).await);

    drop(client);
    worker.await.unwrap();
}
