///
/// # Channel Integration Tests
///
/// Ordering in every capacity mode, rendezvous hand-off semantics, and the
/// close/drain lifecycle observed from several threads.
///

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use concord_std_threads::{spawn, Channel, ChannelMode, Scalar};

#[test]
fn test_fifo_for_each_buffered_capacity() {
    common::init_logging();
    for capacity in [1usize, 4, 16] {
        let channel = Arc::new(Channel::new(capacity).unwrap());
        let producer = spawn(
            |channel: Arc<Channel>| {
                for i in 0..500i64 {
                    channel.send(i);
                }
            },
            Arc::clone(&channel),
        )
        .unwrap();

        let received: Vec<i64> = (0..500).map(|_| channel.receive().as_int().unwrap()).collect();
        producer.join().unwrap();
        assert_eq!(received, (0..500).collect::<Vec<_>>(), "capacity {}", capacity);
    }
}

#[test]
fn test_sequential_send_then_receive_keeps_order() {
    let channel = Channel::new(16).unwrap();
    let values = [Scalar::Int(-5), Scalar::Uint(7), Scalar::Float(0.5), Scalar::Int(9)];
    for value in values {
        channel.send(value);
    }
    for value in values {
        assert_eq!(channel.receive(), value);
    }
}

#[test]
fn test_rendezvous_send_waits_for_receiver() {
    common::init_logging();
    let channel = Arc::new(Channel::new(0).unwrap());
    assert_eq!(channel.mode(), ChannelMode::Rendezvous);
    let delivered = Arc::new(AtomicBool::new(false));

    let sender = {
        let channel = Arc::clone(&channel);
        let delivered = Arc::clone(&delivered);
        thread::spawn(move || {
            channel.send(99i64);
            delivered.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!delivered.load(Ordering::SeqCst), "send completed with no receiver");

    assert_eq!(channel.receive(), Scalar::Int(99));
    sender.join().unwrap();
    assert!(delivered.load(Ordering::SeqCst));
}

#[test]
fn test_rendezvous_stream_has_no_loss_or_duplication() {
    let channel = Arc::new(Channel::new(0).unwrap());
    let producer = {
        let channel = Arc::clone(&channel);
        thread::spawn(move || {
            for i in 0..1000i64 {
                channel.send(i);
            }
        })
    };

    for expected in 0..1000i64 {
        assert_eq!(channel.receive(), Scalar::Int(expected));
    }
    producer.join().unwrap();
    assert!(channel.is_empty());
}

#[test]
fn test_rendezvous_many_receivers_each_value_once() {
    let channel = Arc::new(Channel::new(0).unwrap());

    let receivers: Vec<_> = (0..4)
        .map(|_| {
            let channel = Arc::clone(&channel);
            thread::spawn(move || {
                let mut seen = Vec::new();
                loop {
                    let value = channel.receive();
                    // only the close hands out zero; the values sent start at 1
                    if value.is_zero() {
                        assert!(channel.is_closed());
                        return seen;
                    }
                    seen.push(value.as_int().unwrap());
                }
            })
        })
        .collect();

    for i in 1..=400i64 {
        channel.send(i);
    }
    channel.close();

    let mut all: Vec<i64> = receivers.into_iter().flat_map(|r| r.join().unwrap()).collect();
    all.sort_unstable();
    assert_eq!(all, (1..=400).collect::<Vec<_>>());
}

#[test]
fn test_close_with_buffered_values_drains_in_order() {
    let channel = Arc::new(Channel::new(8).unwrap());
    for i in 1..=5i64 {
        channel.send(i);
    }
    channel.close();

    let consumer = {
        let channel = Arc::clone(&channel);
        thread::spawn(move || {
            let mut values = Vec::new();
            while !channel.is_drained() {
                values.push(channel.receive());
            }
            values
        })
    };

    let values = consumer.join().unwrap();
    let expected: Vec<Scalar> = (1..=5i64).map(Scalar::from).collect();
    assert_eq!(values, expected);
    for _ in 0..10 {
        assert!(channel.receive().is_zero());
    }
}

#[test]
fn test_pipeline_of_channels() {
    common::init_logging();
    // generator -> doubler -> collector, each stage closes its output
    let first = Arc::new(Channel::new(4).unwrap());
    let second = Arc::new(Channel::new(0).unwrap());

    let generator = spawn(
        |out: Arc<Channel>| {
            for i in 1..=50i64 {
                out.send(i);
            }
            out.close();
        },
        Arc::clone(&first),
    )
    .unwrap();

    let doubler = spawn(
        |(input, out): (Arc<Channel>, Arc<Channel>)| {
            loop {
                let value = input.receive();
                if input.is_drained() && value.is_zero() {
                    break;
                }
                out.send(value.as_int().unwrap() * 2);
            }
            out.close();
        },
        (Arc::clone(&first), Arc::clone(&second)),
    )
    .unwrap();

    let mut total = 0i64;
    loop {
        let value = second.receive();
        if value.is_zero() {
            assert!(second.is_closed());
            break;
        }
        total += value.as_int().unwrap();
    }

    generator.join().unwrap();
    doubler.join().unwrap();
    assert_eq!(total, 2 * (1..=50i64).sum::<i64>());
}

#[test]
fn test_send_after_close_panics_in_sender_thread() {
    let channel = Arc::new(Channel::new(2).unwrap());
    channel.close();

    let sender = {
        let channel = Arc::clone(&channel);
        thread::spawn(move || channel.send(1i64))
    };
    assert!(sender.join().is_err());
    assert!(channel.is_empty());
    assert!(channel.is_drained());
}

#[test]
fn test_close_fails_blocked_rendezvous_sender() {
    common::init_logging();
    let channel = Arc::new(Channel::new(0).unwrap());

    let sender = {
        let channel = Arc::clone(&channel);
        thread::spawn(move || channel.send(9i64))
    };
    // no receiver ever arrives, so the sender stays parked
    thread::sleep(Duration::from_millis(50));
    assert!(!sender.is_finished());

    channel.close();
    assert!(sender.join().is_err());
    assert!(channel.receive().is_zero());
    assert!(channel.is_empty());
    assert!(channel.is_drained());
}

#[test]
fn test_close_fails_sender_blocked_on_full_slot() {
    common::init_logging();
    let channel = Arc::new(Channel::new(1).unwrap());
    assert_eq!(channel.mode(), ChannelMode::Shared);
    channel.send(1i64);

    let sender = {
        let channel = Arc::clone(&channel);
        thread::spawn(move || channel.send(2i64))
    };
    thread::sleep(Duration::from_millis(50));
    assert!(!sender.is_finished());

    channel.close();
    assert!(sender.join().is_err());

    // the value deposited before the close still comes out first
    assert!(!channel.is_drained());
    assert_eq!(channel.receive(), Scalar::Int(1));
    assert!(channel.is_drained());
    assert!(channel.receive().is_zero());
    assert!(channel.is_empty());
}
