//! Tests for the output channel

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;

fn counting_waker() -> (Waker, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = count.clone();
    let waker: Waker = Arc::new(move || {
        inner.fetch_add(1, Ordering::SeqCst);
    });
    (waker, count)
}

fn texts(records: &[OutputRecord]) -> Vec<&str> {
    records.iter().map(|r| r.text()).collect()
}

#[test]
fn test_backlog_is_retained_until_subscribe() {
    let channel = OutputChannel::new();
    channel.post("a\n".into());
    channel.post("b\n".into());
    assert_eq!(channel.pending(), 2);

    let sub = channel.subscribe();
    let records = sub.drain().unwrap();
    assert_eq!(texts(&records), vec!["a\n", "b\n"]);
    assert_eq!(channel.pending(), 0);
}

#[test]
fn test_live_delivery_preserves_order() {
    let channel = OutputChannel::new();
    let sub = channel.subscribe();
    for i in 0..50 {
        channel.post(OutputRecord::new(format!("{}", i)));
    }
    let records = sub.drain().unwrap();
    let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
    assert_eq!(texts(&records), expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_replacing_subscriber_supersedes_old_one() {
    let channel = OutputChannel::new();
    let old = channel.subscribe();
    channel.post("x".into());

    let new = channel.subscribe();
    assert!(old.is_superseded());
    assert_eq!(old.try_next(), Err(ChannelError::Superseded(old.generation())));
    assert_eq!(old.pending(), 0);

    // The backlog the old subscriber never took goes to the new one
    assert_eq!(texts(&new.drain().unwrap()), vec!["x"]);
}

#[test]
fn test_dropped_subscriber_loses_nothing() {
    let channel = OutputChannel::new();
    {
        let sub = channel.subscribe();
        channel.post("before".into());
        assert_eq!(sub.try_next().unwrap().unwrap().text(), "before");
    }
    assert!(!channel.has_subscriber());

    channel.post("while detached".into());
    let sub = channel.subscribe();
    assert_eq!(texts(&sub.drain().unwrap()), vec!["while detached"]);

    let stats = channel.stats();
    assert_eq!(stats.posted, 2);
    assert_eq!(stats.delivered, 2);
    assert_eq!(stats.subscribers, 2);
}

#[test]
fn test_dropping_stale_subscription_keeps_current_attached() {
    let channel = OutputChannel::new();
    let old = channel.subscribe();
    let _new = channel.subscribe();
    drop(old);
    assert!(channel.has_subscriber());
}

#[test]
fn test_burst_coalesces_into_one_wakeup() {
    let channel = OutputChannel::new();
    let (waker, wakes) = counting_waker();
    let sub = channel.subscribe_with_waker(waker);

    for _ in 0..100 {
        channel.post("tick".into());
    }
    assert_eq!(wakes.load(Ordering::SeqCst), 1);

    assert_eq!(sub.drain().unwrap().len(), 100);
    channel.post("next burst".into());
    assert_eq!(wakes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_subscribe_wakes_immediately_for_backlog() {
    let channel = OutputChannel::new();
    channel.post("queued".into());

    let (waker, wakes) = counting_waker();
    let _sub = channel.subscribe_with_waker(waker);
    assert_eq!(wakes.load(Ordering::SeqCst), 1);

    // Still the same burst: no extra wake
    channel.post("more".into());
    assert_eq!(wakes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wakeup_stat_counts_only_invoked_callbacks() {
    let channel = OutputChannel::new();
    channel.post("before".into());
    let sub = channel.subscribe();
    channel.post("during".into());
    sub.drain().unwrap();
    channel.post("after".into());
    assert_eq!(channel.stats().wakeups, 0);

    let (waker, wakes) = counting_waker();
    let sub = channel.subscribe_with_waker(waker);
    sub.drain().unwrap();
    channel.post("woken".into());
    assert_eq!(wakes.load(Ordering::SeqCst), 2);
    assert_eq!(channel.stats().wakeups, 2);
}

#[test]
fn test_no_wakeup_without_subscriber() {
    let channel = OutputChannel::new();
    let (waker, wakes) = counting_waker();
    drop(channel.subscribe_with_waker(waker));
    channel.post("orphan".into());
    assert_eq!(wakes.load(Ordering::SeqCst), 0);
    assert_eq!(channel.pending(), 1);
}

#[test]
fn test_posts_from_worker_thread_arrive_in_order() {
    let channel = OutputChannel::new();
    let worker = {
        let channel = channel.clone();
        std::thread::spawn(move || {
            for i in 0..1000 {
                channel.post(OutputRecord::new(i.to_string()));
            }
        })
    };

    let sub = channel.subscribe();
    let mut received = Vec::new();
    worker.join().unwrap();
    received.extend(sub.drain().unwrap());

    let numbers: Vec<usize> = received.iter().map(|r| r.text().parse().unwrap()).collect();
    assert_eq!(numbers, (0..1000).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_next_waits_for_post() {
    let channel = OutputChannel::new();
    let sub = channel.subscribe();

    let poster = channel.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        poster.post("late".into());
    });

    let record = sub.next().await.unwrap();
    assert_eq!(record.text(), "late");
    handle.join().unwrap();
}

#[tokio::test]
async fn test_next_returns_none_when_superseded() {
    let channel = OutputChannel::new();
    let old = channel.subscribe();

    let replacer = channel.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        replacer.subscribe()
    });

    assert!(old.next().await.is_none());
    let _new = handle.join().unwrap();
}
