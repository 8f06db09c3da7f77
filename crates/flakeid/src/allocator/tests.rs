use crate::{Error, IdAllocator, IdGenStatus, SnowflakeId, TimeSource, WallClock};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::scope;
use std::time::Duration;

struct MockTime {
    millis: i64,
}

impl TimeSource for MockTime {
    fn now_millis(&self) -> i64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl TimeSource for SharedMockStepTime {
    fn now_millis(&self) -> i64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<i64>,
    index: Cell<usize>,
}

/// A clock another thread can move while an allocator blocks on it.
#[derive(Default)]
struct AtomicMockTime {
    millis: AtomicI64,
}

impl AtomicMockTime {
    fn at(millis: i64) -> Arc<Self> {
        Arc::new(Self {
            millis: AtomicI64::new(millis),
        })
    }

    fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for AtomicMockTime {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> SnowflakeId;
    fn unwrap_pending(self) -> i64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> SnowflakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_until } => {
                panic!("unexpected pending (yield until: {yield_until})")
            }
        }
    }

    fn unwrap_pending(self) -> i64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_until } => yield_until,
        }
    }
}

fn expected(t: u64, d: u64, w: u64, s: u64) -> u64 {
    (t << 22) | (d << 17) | (w << 12) | s
}

#[test]
fn frozen_clock_issues_consecutive_sequences() {
    let allocator = IdAllocator::with_clock(1, 1, MockTime { millis: 5000 }).unwrap();

    assert_eq!(allocator.generate(), expected(5000, 1, 1, 0));
    assert_eq!(allocator.generate(), expected(5000, 1, 1, 1));
    assert_eq!(allocator.generate(), expected(5000, 1, 1, 2));
}

#[test]
fn sequence_increments_within_same_tick() {
    let allocator = IdAllocator::with_clock(2, 3, MockTime { millis: 42 }).unwrap();

    let id1 = allocator.try_poll_id().unwrap().unwrap_ready();
    let id2 = allocator.try_poll_id().unwrap().unwrap_ready();
    let id3 = allocator.try_poll_id().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn first_call_at_the_epoch_starts_at_sequence_one() {
    // The initial last timestamp of zero counts as an issued millisecond.
    let allocator = IdAllocator::with_clock(0, 0, MockTime { millis: 0 }).unwrap();
    let id = allocator.try_generate().unwrap();
    assert_eq!(id.timestamp(), 0);
    assert_eq!(id.sequence(), 1);
}

#[test]
fn pending_when_sequence_exhausted() {
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![42, 43],
            index: Cell::new(0),
        }),
    };
    let allocator = IdAllocator::with_clock(1, 1, shared_time.clone()).unwrap();

    for i in 0..=SnowflakeId::MAX_SEQUENCE {
        let id = allocator.try_poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }

    let yield_until = allocator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_until, 43);
    // Still pending: the failed attempt must not consume anything.
    assert_eq!(allocator.try_poll_id().unwrap().unwrap_pending(), 43);

    shared_time.clock.index.set(1);

    let id = allocator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn generate_blocks_until_next_millisecond_after_rollover() {
    let clock = AtomicMockTime::at(42);
    let allocator = IdAllocator::with_clock(1, 1, Arc::clone(&clock)).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..=SnowflakeId::MAX_SEQUENCE {
        assert!(seen.insert(allocator.generate()));
    }

    let id = scope(|s| {
        s.spawn(|| {
            std::thread::sleep(Duration::from_millis(20));
            clock.set(43);
        });
        SnowflakeId::from_raw(allocator.generate())
    });

    assert!(!seen.contains(&id.to_raw()));
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn before_epoch_is_pending_until_zero() {
    let allocator = IdAllocator::with_clock(1, 1, MockTime { millis: -25 }).unwrap();
    assert_eq!(allocator.try_poll_id().unwrap().unwrap_pending(), 0);
}

#[test]
fn generate_waits_out_a_clock_before_the_epoch() {
    let clock = AtomicMockTime::at(-3);
    let allocator = IdAllocator::with_clock(4, 5, Arc::clone(&clock)).unwrap();

    let id = scope(|s| {
        s.spawn(|| {
            std::thread::sleep(Duration::from_millis(10));
            clock.set(7);
        });
        allocator.try_generate().unwrap()
    });

    assert_eq!(id, SnowflakeId::from_components(7, 4, 5, 0));
}

#[test]
fn clock_regression_is_accepted_as_a_new_millisecond() {
    let clock = AtomicMockTime::at(100);
    let allocator = IdAllocator::with_clock(1, 1, Arc::clone(&clock)).unwrap();

    let before = allocator.try_generate().unwrap();
    let _ = allocator.try_generate().unwrap();

    clock.set(50);
    let after = allocator.try_generate().unwrap();

    assert_eq!(after.timestamp(), 50);
    assert_eq!(after.sequence(), 0);
    assert!(after < before);

    // The earlier timestamp is now the last one issued.
    let next = allocator.try_generate().unwrap();
    assert_eq!(next.timestamp(), 50);
    assert_eq!(next.sequence(), 1);
}

#[test]
fn last_representable_timestamp_is_accepted() {
    let max = SnowflakeId::MAX_TIMESTAMP as i64;
    let allocator = IdAllocator::with_clock(31, 31, MockTime { millis: max }).unwrap();
    let id = allocator.try_generate().unwrap();
    assert_eq!(id.timestamp(), SnowflakeId::MAX_TIMESTAMP);
    assert_eq!(id.datacenter_id(), 31);
    assert_eq!(id.worker_id(), 31);
}

#[test]
fn timestamp_overflow_is_an_error() {
    let past = SnowflakeId::MAX_TIMESTAMP as i64 + 1;
    let allocator = IdAllocator::with_clock(1, 1, MockTime { millis: past }).unwrap();
    assert_eq!(
        allocator.try_generate(),
        Err(Error::TimestampOverflow { timestamp: past })
    );
    assert_eq!(
        allocator.try_poll_id(),
        Err(Error::TimestampOverflow { timestamp: past })
    );
}

#[test]
#[should_panic(expected = "overflows the 41-bit field")]
fn timestamp_overflow_panics_in_generate() {
    let past = SnowflakeId::MAX_TIMESTAMP as i64 + 1;
    let allocator = IdAllocator::with_clock(1, 1, MockTime { millis: past }).unwrap();
    allocator.generate();
}

#[test]
fn rejects_out_of_range_identity() {
    assert_eq!(
        IdAllocator::with_clock(32, 0, MockTime { millis: 1 }).unwrap_err(),
        Error::InvalidDatacenterId { value: 32 }
    );
    assert_eq!(
        IdAllocator::with_clock(0, -1, MockTime { millis: 1 }).unwrap_err(),
        Error::InvalidWorkerId { value: -1 }
    );
    assert_eq!(
        IdAllocator::with_clock(-1, 0, MockTime { millis: 1 }).unwrap_err(),
        Error::InvalidDatacenterId { value: -1 }
    );
    assert_eq!(
        IdAllocator::new(0, 32).unwrap_err(),
        Error::InvalidWorkerId { value: 32 }
    );
    assert!(IdAllocator::new(31, 31).is_ok());
    assert!(IdAllocator::new(0, 0).is_ok());
}

#[test]
fn identity_accessors() {
    let allocator = IdAllocator::new(12, 30).unwrap();
    assert_eq!(allocator.datacenter_id(), 12);
    assert_eq!(allocator.worker_id(), 30);
    assert_eq!(*allocator.clock(), WallClock::default());
    let debug = format!("{allocator:?}");
    assert!(debug.contains("datacenter_id: 12"));
    assert!(debug.contains("worker_id: 30"));
}

#[test]
fn distinct_identities_never_collide_at_the_same_instant() {
    let time = MockTime { millis: 777 };
    let allocators: Vec<_> = [(1, 1), (1, 2), (2, 1), (31, 31)]
        .into_iter()
        .map(|(d, w)| IdAllocator::with_clock(d, w, &time).unwrap())
        .collect();

    let mut seen = HashSet::new();
    for _ in 0..=SnowflakeId::MAX_SEQUENCE {
        for allocator in &allocators {
            assert!(seen.insert(allocator.try_poll_id().unwrap().unwrap_ready()));
        }
    }
    assert_eq!(seen.len(), 4 * 4096);
}

#[test]
fn wall_clock_ids_strictly_increase() {
    const TOTAL_IDS: usize = 4096 * 64;
    let allocator = IdAllocator::new(1, 1).unwrap();

    let mut last_timestamp = 0;
    let mut sequence = 0;
    let mut last = None;

    for _ in 0..TOTAL_IDS {
        let id = allocator.try_generate().unwrap();
        let ts = id.timestamp();
        if ts > last_timestamp {
            sequence = 0;
        }

        assert!(ts >= last_timestamp);
        assert_eq!(id.datacenter_id(), 1);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.sequence(), sequence);
        if let Some(prev) = last {
            assert!(id > prev);
        }

        last_timestamp = ts;
        sequence += 1;
        last = Some(id);
    }
}

#[test]
fn threaded_generation_is_unique_and_well_formed() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 16;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let allocator = IdAllocator::new(9, 17).unwrap();
    let seen_ids = Mutex::new(HashSet::with_capacity(TOTAL_IDS));

    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                let mut prev = 0;
                for _ in 0..IDS_PER_THREAD {
                    let id = allocator.generate();
                    // Each caller observes its own IDs in increasing order.
                    assert!(id > prev);
                    prev = id;
                    local.push(id);
                }
                let mut seen = seen_ids.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate id {id}");
                }
            });
        }
    });

    let seen = seen_ids.into_inner().unwrap();
    assert_eq!(seen.len(), TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
    for raw in seen {
        let id = SnowflakeId::from_raw(raw);
        assert_eq!(id.datacenter_id(), 9);
        assert_eq!(id.worker_id(), 17);
        assert_eq!(
            SnowflakeId::from_components(id.timestamp(), 9, 17, id.sequence()),
            id
        );
    }
}

#[test]
fn threaded_generation_against_a_frozen_clock_blocks_then_resumes() {
    const THREADS: usize = 4;
    const IDS_PER_THREAD: usize = 2048;

    let clock = AtomicMockTime::at(1000);
    let allocator = IdAllocator::with_clock(0, 1, Arc::clone(&clock)).unwrap();
    let seen_ids = Mutex::new(HashSet::new());

    // 8192 IDs need at least two milliseconds; a ticker advances the clock.
    scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    for _ in 0..IDS_PER_THREAD {
                        let id = allocator.try_generate().unwrap();
                        assert!(seen_ids.lock().unwrap().insert(id));
                    }
                })
            })
            .collect();

        s.spawn(move || {
            while workers.iter().any(|w| !w.is_finished()) {
                std::thread::sleep(Duration::from_millis(5));
                clock.set(clock.now_millis() + 1);
            }
        });
    });

    let seen = seen_ids.into_inner().unwrap();
    assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
    let ms_used: HashSet<_> = seen.iter().map(SnowflakeId::timestamp).collect();
    assert!(ms_used.len() >= 2);
}
