// Integration tests for pool backpressure and concurrent use
// Tests cover: blocking on exhaustion, cancellation, recycling, shared buffers

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use segpool::{AcquireContext, AcquireError, BufferError, BufferPool, CancelToken};

// ============================================================================
// Blocking Tests
// ============================================================================

#[test]
fn test_exhausted_pool_blocks_until_free() {
    let pool = BufferPool::new(16, 4).unwrap();
    let holder = pool.buffer(0);
    holder.write(b"0123456789ABCDEF").unwrap();
    assert_eq!(pool.segment_pool().available(), Some(0));

    let waiter = pool.buffer(0);
    let done = Arc::new(AtomicBool::new(false));
    let handle = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let written = waiter.write(b"wxyz");
            done.store(true, Ordering::SeqCst);
            written.map(|n| (n, waiter.read_all().unwrap()))
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(
        !done.load(Ordering::SeqCst),
        "write must block while the pool is exhausted"
    );

    holder.free();
    let (written, data) = handle.join().unwrap().unwrap();
    assert!(done.load(Ordering::SeqCst));
    assert_eq!(written, 4);
    assert_eq!(&data[..], b"wxyz");
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[test]
fn test_deadline_during_exhaustion() {
    let pool = BufferPool::new(16, 4).unwrap();
    let holder = pool.buffer(0);
    holder.write(&[0u8; 12]).unwrap();

    let buffer = pool.buffer(0);
    let ctx = AcquireContext::background().with_timeout(Duration::from_millis(30));
    let err = buffer.write_with(&ctx, b"abcdefgh").unwrap_err();

    match err {
        BufferError::Acquire { written, source } => {
            assert_eq!(written, 4, "only the last free segment could be filled");
            assert_eq!(source, AcquireError::DeadlineExceeded);
        }
        other => panic!("expected acquisition failure, got {:?}", other),
    }
    assert_eq!(buffer.len(), 4);
    assert_eq!(pool.stats().outstanding, 4);

    // The buffer stays usable once segments come back.
    holder.free();
    assert_eq!(buffer.write(b"efgh").unwrap(), 4);
    assert_eq!(&buffer.read_all().unwrap()[..], b"abcdefgh");
}

#[test]
fn test_cancel_token_during_exhaustion() {
    let pool = BufferPool::new(8, 4).unwrap();
    let holder = pool.buffer(0);
    holder.write(&[1u8; 8]).unwrap();

    let token = CancelToken::new();
    let buffer = pool.buffer(0);
    let handle = {
        let token = token.clone();
        thread::spawn(move || {
            let ctx = AcquireContext::background().with_token(token);
            let result = buffer.write_with(&ctx, b"zz");
            (result, buffer.len())
        })
    };

    thread::sleep(Duration::from_millis(30));
    token.cancel();
    let (result, len) = handle.join().unwrap();

    match result {
        Err(BufferError::Acquire { written, source }) => {
            assert_eq!(written, 0);
            assert_eq!(source, AcquireError::Cancelled);
        }
        other => panic!("expected cancellation, got {:?}", other),
    }
    assert_eq!(len, 0, "no bytes may be written after cancellation");
    assert_eq!(pool.segment_pool().available(), Some(0));
    assert_eq!(pool.stats().outstanding, 2);
}

#[test]
fn test_cancelled_write_leaves_pool_unchanged() {
    let pool = BufferPool::new(16, 4).unwrap();
    let token = CancelToken::new();
    token.cancel();

    let buffer = pool.buffer(0);
    let ctx = AcquireContext::background().with_token(token);
    let err = buffer.write_with(&ctx, b"abc").unwrap_err();

    assert_eq!(err.transferred(), 0);
    assert_eq!(pool.segment_pool().available(), Some(4));
    assert_eq!(pool.stats().allocated, 0);
}

// ============================================================================
// Recycling Tests
// ============================================================================

#[test]
fn test_reuse_after_free_does_not_block() {
    let pool = BufferPool::new(16, 4).unwrap();
    let first = pool.buffer(0);
    first.write(&[7u8; 16]).unwrap();
    first.free();

    let second = pool.buffer(0);
    // Timing out here would mean the freed segments were not returned.
    let ctx = AcquireContext::background().with_timeout(Duration::from_secs(5));
    assert_eq!(second.write_with(&ctx, &[9u8; 16]).unwrap(), 16);

    let stats = pool.stats();
    assert_eq!(stats.allocated, 4);
    assert_eq!(stats.peak_outstanding, 4);
}

#[test]
fn test_many_threads_respect_bound() {
    const THREADS: usize = 32;
    const ROUNDS: usize = 200;
    const SEGMENT: usize = 64;

    let pool = BufferPool::new(16 * SEGMENT, SEGMENT).unwrap();
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let pool = pool.clone();
            thread::spawn(move || {
                let buffer = pool.buffer(0);
                let record = [t as u8; SEGMENT];
                for _ in 0..ROUNDS {
                    buffer.write(&record).unwrap();
                    let out = buffer.read_all().unwrap();
                    assert_eq!(&out[..], &record[..]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = pool.stats();
    assert_eq!(stats.outstanding, 0);
    assert!(
        stats.peak_outstanding <= 16,
        "peak {} exceeded the pool bound",
        stats.peak_outstanding
    );
    assert!(stats.allocated <= 16);
    assert_eq!(pool.segment_pool().available(), Some(16));
}

// ============================================================================
// Shared Buffer Tests
// ============================================================================

#[test]
fn test_shared_buffer_serializes_writes() {
    const WRITERS: usize = 4;
    const RECORDS: usize = 250;
    const RECORD: usize = 8;

    let pool = BufferPool::new(0, 16).unwrap();
    let buffer = Arc::new(pool.buffer(0));

    let handles: Vec<_> = (0..WRITERS)
        .map(|w| {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let record = [w as u8; RECORD];
                for _ in 0..RECORDS {
                    buffer.write(&record).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let data = buffer.read_all().unwrap();
    assert_eq!(data.len(), WRITERS * RECORDS * RECORD);

    let mut counts = [0usize; WRITERS];
    for record in data.chunks(RECORD) {
        assert!(
            record.iter().all(|&b| b == record[0]),
            "writes from different threads were interleaved"
        );
        counts[record[0] as usize] += 1;
    }
    assert!(counts.iter().all(|&c| c == RECORDS));
}
