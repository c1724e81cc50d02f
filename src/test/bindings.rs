use std::time::Duration;

use crate::binding::{FlagWatch, FlagsWatch};
use crate::sections::{Section, visible_sections};
use crate::test::slow_transport::SlowTransport;

#[tokio::test]
async fn watch_settles_once() {
    super::init_tracing();

    let transport = SlowTransport::new(Duration::from_millis(20));
    transport
        .set_flags(&[("home.newsTicker", false), ("home.stats", true)])
        .await;

    let (client, worker) = crate::Builder::new().build_with(transport.clone());
    let worker = tokio::spawn(worker.wait());

    let mut ticker = FlagWatch::new(&client, "home.newsTicker");
    let mut stats = FlagWatch::new(&client, "home.stats");

    assert!(ticker.value());
    assert!(!ticker.is_settled());

    assert!(ticker.settle().await);
    assert!(!ticker.value());
    assert!(ticker.is_settled());

    assert!(!stats.settle().await);
    assert!(stats.value());

    // Fixed for the session.
    assert!(!ticker.settle().await);
    assert_eq!(transport.requests(), 1);

    drop((ticker, stats, client));
    worker.await.unwrap();
}

#[tokio::test]
async fn multi_flag_watch() {
    super::init_tracing();

    let transport = SlowTransport::new(Duration::from_millis(0));
    transport
        .set_flags(&[("cms.matchEvents", false), ("cms.matches", true)])
        .await;

    let (client, worker) = crate::Builder::new().build_with(transport);
    let worker = tokio::spawn(worker.wait());

    let mut all = FlagsWatch::new(&client, ["cms.matches", "cms.matchEvents"], true);
    let mut any = FlagsWatch::new(&client, ["cms.matches", "cms.matchEvents"], false);

    assert!(all.value());
    assert!(any.value());

    assert!(all.settle().await);
    assert!(!all.value());
    assert!(!any.settle().await);
    assert!(any.value());

    drop((all, any, client));
    worker.await.unwrap();
}

#[tokio::test]
async fn any_watch_starts_from_the_cached_and() {
    super::init_tracing();

    let transport = SlowTransport::new(Duration::from_millis(0));
    transport
        .set_flags(&[("home.stats", false), ("home.sponsors", true)])
        .await;

    let (client, worker) = crate::Builder::new().build_with(transport.clone());
    let worker = tokio::spawn(worker.wait());

    client.get_all().await;

    let mut any = FlagsWatch::new(&client, ["home.stats", "home.sponsors"], false);

    assert!(!any.value());
    assert!(any.settle().await);
    assert!(any.value());
    assert_eq!(transport.requests(), 1);

    drop((any, client));
    worker.await.unwrap();
}

#[tokio::test]
async fn sections_follow_their_flags() {
    super::init_tracing();

    let transport = SlowTransport::new(Duration::from_millis(0));
    transport
        .set_flags(&[("home.sponsors", false), ("home.standings", false)])
        .await;

    let (client, worker) = crate::Builder::new().build_with(transport);
    let worker = tokio::spawn(worker.wait());

    // Before the fetch everything renders.
    assert_eq!(
        Section::Sponsors.render(&client, || String::from("sponsors")),
        "sponsors"
    );

    let visible = visible_sections(&client, Section::HOMEPAGE).await;

    assert!(!visible.contains(&Section::Sponsors));
    assert!(!visible.contains(&Section::Standings));
    assert!(visible.contains(&Section::HeroPostSlider));
    assert_eq!(visible.len(), Section::HOMEPAGE.len() - 2);
    assert_eq!(Section::Sponsors.render(&client, || String::from("sponsors")), "");

    drop(client);
    worker.await.unwrap();
}
