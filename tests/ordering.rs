use object_monitor::config::NoSpin;
use object_monitor::{IllegalStateError, Monitor, MonitorState};
use parking_lot::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn distinct_monitors_do_not_serialize() {
    let first = Arc::new(Monitor::<NoSpin>::new());
    let second = Arc::new(Monitor::<NoSpin>::new());
    let (entered_tx, entered_rx) = channel();

    let mut leave_txs = Vec::new();
    let handles: Vec<_> = vec![first, second]
        .into_iter()
        .map(|monitor| {
            let entered_tx = entered_tx.clone();
            let (leave_tx, leave_rx) = channel::<()>();
            leave_txs.push(leave_tx);
            thread::spawn(move || {
                monitor.synchronized(|| {
                    entered_tx.send(()).unwrap();
                    // Stay inside until told to leave or the sender goes away.
                    let _ = leave_rx.recv();
                });
            })
        })
        .collect();

    // Both critical sections must be open at the same time.
    let both_entered = (0..2)
        .map(|_| entered_rx.recv_timeout(Duration::from_secs(5)))
        .all(|entered| entered.is_ok());

    drop(leave_txs);
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(both_entered);
}

#[test]
fn second_entry_follows_first_release() {
    let monitor = Arc::new(Monitor::<NoSpin>::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let published = Arc::new(AtomicU64::new(0));
    let (entered_tx, entered_rx) = channel();

    let first = {
        let monitor = monitor.clone();
        let events = events.clone();
        let published = published.clone();
        thread::spawn(move || {
            monitor.synchronized(|| {
                events.lock().push("first-enter");
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(20));
                published.store(42, Relaxed);
                events.lock().push("first-exit");
            });
        })
    };

    entered_rx.recv().unwrap();
    monitor.synchronized(|| {
        // The write made inside the first section is visible here.
        assert_eq!(published.load(Relaxed), 42);
        events.lock().push("second-enter");
    });

    first.join().unwrap();
    assert_eq!(
        *events.lock(),
        vec!["first-enter", "first-exit", "second-enter"]
    );
}

#[test]
fn contended_release_wakes_every_waiter_eventually() {
    let monitor = Arc::new(Monitor::<NoSpin>::new());
    let entered = Arc::new(AtomicU64::new(0));
    let guard = monitor.enter();

    let waiters: Vec<_> = (0..6)
        .map(|_| {
            let monitor = monitor.clone();
            let entered = entered.clone();
            thread::spawn(move || {
                monitor.synchronized(|| {
                    entered.fetch_add(1, Relaxed);
                });
            })
        })
        .collect();

    while !monitor.state().contains(MonitorState::CONTENDED) {
        thread::yield_now();
    }
    assert_eq!(entered.load(Relaxed), 0);

    drop(guard);
    for waiter in waiters {
        waiter.join().unwrap();
    }

    assert_eq!(entered.load(Relaxed), 6);
    assert_eq!(monitor.state(), MonitorState::empty());
}

#[test]
fn reentry_does_not_deadlock() {
    let monitor = Monitor::<NoSpin>::new();

    let depth = monitor.synchronized(|| {
        monitor.synchronized(|| monitor.synchronized(|| monitor.hold_count()))
    });
    assert_eq!(depth, 3);
    assert!(!monitor.is_locked());
}

#[test]
fn release_of_unheld_monitor_is_rejected() {
    let monitor = Arc::new(Monitor::<NoSpin>::new());
    let me = thread::current().id();

    let err: IllegalStateError = monitor.release(me).unwrap_err();
    assert!(!err.is_foreign());
    assert_eq!(err.holder(), None);

    monitor.acquire(me).unwrap();
    let other = monitor.clone();
    let err = thread::spawn(move || other.release(thread::current().id()))
        .join()
        .unwrap()
        .unwrap_err();
    assert_eq!(err.holder(), Some(me));

    monitor.release(me).unwrap();
    assert!(monitor.release(me).is_err());
}

#[test]
fn foreign_thread_cannot_act_as_holder() {
    let monitor = Arc::new(Monitor::<NoSpin>::new());
    let me = thread::current().id();
    let guard = monitor.enter();

    let other = monitor.clone();
    let (released, acquired) = thread::spawn(move || (other.release(me), other.try_acquire(me)))
        .join()
        .unwrap();
    assert!(released.unwrap_err().is_foreign());
    assert!(acquired.unwrap_err().is_foreign());

    // Still exclusively ours.
    assert!(monitor.is_held_by(me));
    assert_eq!(monitor.hold_count(), 1);
    drop(guard);
    assert!(!monitor.is_locked());
}
