//! Presence lifecycle: online edges, grace windows, offline edges.

mod common;

use std::time::Duration;

use common::*;
use fanline_realtime::event::ServerEvent;

#[tokio::test]
async fn first_connection_produces_single_online_broadcast() {
    let users = InMemoryDirectory::new();
    let engine = build_engine(users.clone(), InMemoryStore::new());
    let observer = users.add(FakeUser::fan("observer"));
    let alice = users.add(FakeUser::fan("alice"));

    let (_obs, mut obs_rx) = engine.connect(observer).await;

    let (_a1, _rx1) = engine.connect(alice).await;
    let (_a2, _rx2) = engine.connect(alice).await;
    assert!(users.is_online(alice));

    let events = collect_for(&mut obs_rx, Duration::from_millis(100)).await;
    let online_edges = events
        .iter()
        .filter(|e| matches!(e, ServerEvent::UserOnline { user_id } if *user_id == alice))
        .count();
    assert_eq!(online_edges, 1);
}

#[tokio::test]
async fn reconnect_within_grace_window_suppresses_offline() {
    let users = InMemoryDirectory::new();
    let engine = build_engine(users.clone(), InMemoryStore::new());
    let observer = users.add(FakeUser::fan("observer"));
    let alice = users.add(FakeUser::fan("alice"));

    let (_obs, mut obs_rx) = engine.connect(observer).await;
    let (a1, _rx1) = engine.connect(alice).await;

    engine.disconnect(a1.id).await;
    // Reconnect well inside the grace window.
    pause(TEST_GRACE_MS / 4).await;
    let (_a2, _rx2) = engine.connect(alice).await;
    pause(TEST_GRACE_MS * 3).await;

    assert!(users.is_online(alice));
    let events = collect_for(&mut obs_rx, Duration::from_millis(50)).await;
    assert!(!events
        .iter()
        .any(|e| matches!(e, ServerEvent::UserOffline { user_id } if *user_id == alice)));
}

#[tokio::test]
async fn last_disconnect_goes_offline_after_grace() {
    let users = InMemoryDirectory::new();
    let engine = build_engine(users.clone(), InMemoryStore::new());
    let observer = users.add(FakeUser::fan("observer"));
    let alice = users.add(FakeUser::fan("alice"));

    let (_obs, mut obs_rx) = engine.connect(observer).await;
    let (a1, _rx1) = engine.connect(alice).await;
    assert!(users.is_online(alice));

    engine.disconnect(a1.id).await;
    // Still online during the grace window.
    assert!(users.is_online(alice));

    let edge = expect_event(&mut obs_rx, |e| {
        matches!(e, ServerEvent::UserOffline { user_id } if *user_id == alice)
    })
    .await;
    assert!(matches!(edge, ServerEvent::UserOffline { .. }));
    assert!(!users.is_online(alice));
    assert!(engine.activity.last_seen(alice).is_none());
}

#[tokio::test]
async fn overlapping_disconnects_produce_one_offline_broadcast() {
    let users = InMemoryDirectory::new();
    let engine = build_engine(users.clone(), InMemoryStore::new());
    let observer = users.add(FakeUser::fan("observer"));
    let alice = users.add(FakeUser::fan("alice"));

    let (_obs, mut obs_rx) = engine.connect(observer).await;
    let (a1, _rx1) = engine.connect(alice).await;
    let (a2, _rx2) = engine.connect(alice).await;

    engine.disconnect(a1.id).await;
    engine.disconnect(a2.id).await;
    pause(TEST_GRACE_MS * 4).await;

    let events = collect_for(&mut obs_rx, Duration::from_millis(50)).await;
    let offline_edges = events
        .iter()
        .filter(|e| matches!(e, ServerEvent::UserOffline { user_id } if *user_id == alice))
        .count();
    assert_eq!(offline_edges, 1);
    assert!(!users.is_online(alice));
}

#[tokio::test]
async fn new_connection_receives_presence_snapshots() {
    let users = InMemoryDirectory::new();
    let engine = build_engine(users.clone(), InMemoryStore::new());
    let mira = users.add(FakeUser::creator("mira"));
    let bob = users.add(FakeUser::fan("bob"));

    let (_m, _m_rx) = engine.connect(mira).await;
    let (_b, mut b_rx) = engine.connect(bob).await;

    let snapshot = expect_event(&mut b_rx, |e| matches!(e, ServerEvent::OnlineUsers { .. })).await;
    if let ServerEvent::OnlineUsers { users: online } = snapshot {
        assert!(online.contains(&mira));
        assert!(online.contains(&bob));
    }

    let roster =
        expect_event(&mut b_rx, |e| matches!(e, ServerEvent::OnlineCreators { .. })).await;
    if let ServerEvent::OnlineCreators { creators } = roster {
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].id, mira);
    }
}

#[tokio::test]
async fn creator_transitions_refresh_roster_broadcast() {
    let users = InMemoryDirectory::new();
    let engine = build_engine(users.clone(), InMemoryStore::new());
    let observer = users.add(FakeUser::fan("observer"));
    let mira = users.add(FakeUser::creator("mira"));

    let (_obs, mut obs_rx) = engine.connect(observer).await;
    let (m1, _m_rx) = engine.connect(mira).await;

    let roster = expect_event(&mut obs_rx, |e| {
        matches!(e, ServerEvent::OnlineCreators { creators } if creators.len() == 1)
    })
    .await;
    assert!(matches!(roster, ServerEvent::OnlineCreators { .. }));

    engine.disconnect(m1.id).await;
    let roster = expect_event(&mut obs_rx, |e| {
        matches!(e, ServerEvent::OnlineCreators { creators } if creators.is_empty())
    })
    .await;
    assert!(matches!(roster, ServerEvent::OnlineCreators { .. }));
}

#[tokio::test]
async fn roster_fetch_survives_transient_failures() {
    let users = InMemoryDirectory::new();
    let engine = build_engine(users.clone(), InMemoryStore::new());
    let mira = users.add(FakeUser::creator("mira"));
    let (_m, _m_rx) = engine.connect(mira).await;

    // Two injected failures are within the retry budget of three.
    users.fail_creator_fetches(2);
    let creators = engine.presence.online_creators().await.unwrap();
    assert_eq!(creators.len(), 1);

    // Three failures exhaust it.
    users.fail_creator_fetches(3);
    assert!(engine.presence.online_creators().await.is_err());
}
