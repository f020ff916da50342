//! Queue semantics of running active objects.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ao::{from_fn, ActiveContext, ActiveObject, ActiveObjectConfig, AoError, Behavior, SendError};
use parking_lot::Mutex;

#[test]
fn events_are_dispatched_in_send_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let probe = Arc::clone(&log);

    let ao = ActiveObject::start(
        ActiveObjectConfig::builder().name("fifo").queue_capacity(4).build(),
        from_fn(move |_: &mut ActiveContext, value: u32| probe.lock().push(value)),
    )
    .unwrap();

    for value in 0..500 {
        ao.send(value).unwrap();
    }
    ao.join().unwrap();

    assert_eq!(*log.lock(), (0..500).collect::<Vec<_>>());
}

#[test]
fn each_producer_keeps_its_relative_order() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 200;

    let log = Arc::new(Mutex::new(Vec::new()));
    let probe = Arc::clone(&log);
    let ao = ActiveObject::start(
        ActiveObjectConfig::builder().name("mpsc").queue_capacity(2).build(),
        from_fn(move |_: &mut ActiveContext, event: (u32, u32)| probe.lock().push(event)),
    )
    .unwrap();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let sender = ao.sender();
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    sender.send((producer, seq)).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    ao.join().unwrap();

    let log = log.lock();
    assert_eq!(log.len(), (PRODUCERS * PER_PRODUCER) as usize);
    for producer in 0..PRODUCERS {
        let seqs: Vec<_> = log
            .iter()
            .filter(|(p, _)| *p == producer)
            .map(|(_, seq)| *seq)
            .collect();
        assert_eq!(seqs, (0..PER_PRODUCER).collect::<Vec<_>>());
    }
}

struct ExclusiveProbe {
    in_dispatch: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    handled: Arc<AtomicUsize>,
}

impl Behavior for ExclusiveProbe {
    type Event = ();

    fn on_event(&mut self, _ctx: &mut ActiveContext, _event: ()) {
        if self.in_dispatch.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::yield_now();
        self.handled.fetch_add(1, Ordering::SeqCst);
        self.in_dispatch.store(false, Ordering::SeqCst);
    }
}

#[test]
fn dispatch_is_never_concurrent() {
    let overlaps = Arc::new(AtomicUsize::new(0));
    let handled = Arc::new(AtomicUsize::new(0));
    let ao = ActiveObject::start(
        ActiveObjectConfig::named("exclusive"),
        ExclusiveProbe {
            in_dispatch: Arc::new(AtomicBool::new(false)),
            overlaps: Arc::clone(&overlaps),
            handled: Arc::clone(&handled),
        },
    )
    .unwrap();

    let producers: Vec<_> = (0..6)
        .map(|_| {
            let sender = ao.sender();
            thread::spawn(move || {
                for _ in 0..100 {
                    sender.send(()).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    ao.join().unwrap();

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(handled.load(Ordering::SeqCst), 600);
}

/// Starts an object whose handler parks on `gate` after reporting on `entered`.
fn gated(
    capacity: usize,
) -> (
    ActiveObject<u32>,
    mpsc::Receiver<u32>,
    mpsc::Sender<()>,
    Arc<Mutex<Vec<u32>>>,
) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let done = Arc::new(Mutex::new(Vec::new()));
    let probe = Arc::clone(&done);

    let ao = ActiveObject::start(
        ActiveObjectConfig::builder()
            .name("gated")
            .queue_capacity(capacity)
            .build(),
        from_fn(move |_: &mut ActiveContext, value: u32| {
            entered_tx.send(value).unwrap();
            let _ = gate_rx.recv();
            probe.lock().push(value);
        }),
    )
    .unwrap();

    (ao, entered_rx, gate_tx, done)
}

#[test]
fn try_send_reports_full_queue_and_returns_the_event() {
    let (ao, entered, gate, done) = gated(2);

    ao.send(1).unwrap();
    assert_eq!(entered.recv().unwrap(), 1);

    ao.try_send(2).unwrap();
    ao.try_send(3).unwrap();
    assert_eq!(ao.len(), 2);

    let err = ao.try_send(4).unwrap_err();
    assert!(err.is_full());
    assert_eq!(err.into_event(), 4);

    drop(gate);
    ao.join().unwrap();
    assert_eq!(*done.lock(), vec![1, 2, 3]);
}

#[test]
fn send_timeout_gives_up_on_a_full_queue() {
    let (ao, entered, gate, _done) = gated(1);

    ao.send(1).unwrap();
    entered.recv().unwrap();
    ao.send(2).unwrap();

    match ao.send_timeout(3, Duration::from_millis(20)) {
        Err(SendError::Timeout { name, event }) => {
            assert_eq!(name, "gated");
            assert_eq!(event, 3);
        }
        other => panic!("expected timeout, got {other:?}"),
    }

    drop(gate);
    ao.join().unwrap();
}

#[test]
fn blocking_send_waits_for_room() {
    let (ao, entered, gate, done) = gated(1);
    ao.send(1).unwrap();
    entered.recv().unwrap();
    ao.send(2).unwrap();

    let sender = ao.sender();
    let blocked = thread::spawn(move || sender.send(3));

    thread::sleep(Duration::from_millis(20));
    assert!(!blocked.is_finished());

    drop(gate);
    blocked.join().unwrap().unwrap();
    ao.join().unwrap();
    assert_eq!(*done.lock(), vec![1, 2, 3]);
}

#[test]
fn send_after_worker_death_is_disconnected() {
    let ao = ActiveObject::start(
        ActiveObjectConfig::named("doomed"),
        from_fn(|_: &mut ActiveContext, _: u8| panic!("corrupted message")),
    )
    .unwrap();
    let sender = ao.sender();

    ao.send(0).unwrap();
    let mut outcome = Ok(());
    for _ in 0..1_000 {
        outcome = sender.send(1);
        if outcome.is_err() {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    let err = outcome.unwrap_err();
    assert!(err.is_disconnected());

    drop(sender);
    assert!(matches!(ao.join(), Err(AoError::WorkerPanicked { name: "doomed" })));
}
