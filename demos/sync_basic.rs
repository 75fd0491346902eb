//! Basic synchronous example: a bounded pool shared by a producer and a consumer.
//!
//! Run with:
//!     cargo run --example sync_basic

use std::io::Write;
use std::thread;
use std::time::Duration;

use segpool::{AcquireContext, BufferError, BufferPool};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 64 KiB budget in 4 KiB segments
    let pool = BufferPool::new(64 * 1024, 4 * 1024)?;
    println!(
        "Pool: {} segments of {} bytes\n",
        pool.segment_pool().capacity(),
        pool.segment_pool().segment_size()
    );

    // Serialize some records into a buffer
    let mut buffer = pool.buffer(32 * 1024);
    for i in 0..1000 {
        writeln!(buffer, "record {:04}", i)?;
    }
    println!(
        "Wrote {} bytes using {} segments",
        buffer.len(),
        buffer.segment_count()
    );

    // Buffer limit is enforced before anything is copied
    match buffer.write(&vec![0u8; 32 * 1024]) {
        Err(BufferError::BufferTooSmall {
            requested,
            capacity,
        }) => println!("Rejected write: {} bytes > {} byte limit", requested, capacity),
        other => println!("Unexpected: {:?}", other),
    }

    let data = buffer.read_all()?;
    let first_line = data.split(|&b| b == b'\n').next().unwrap_or_default();
    println!(
        "Drained {} bytes, first line: {:?}\n",
        data.len(),
        String::from_utf8_lossy(first_line)
    );

    // Exhaust the pool, then show a bounded wait and a blocking wait
    let hog = pool.buffer(0);
    hog.write(&vec![1u8; 64 * 1024])?;
    println!("Pool stats while exhausted: {:?}", pool.stats());

    let waiter = pool.buffer(0);
    let ctx = AcquireContext::background().with_timeout(Duration::from_millis(100));
    if let Err(e) = waiter.write_with(&ctx, b"late") {
        println!("Bounded wait gave up: {}", e);
    }

    let consumer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        hog.free();
    });
    let written = waiter.write(b"unblocked")?;
    consumer.join().expect("consumer thread panicked");
    println!("Blocking write finished after free: {} bytes", written);

    waiter.free();
    println!("\nFinal pool stats: {:?}", pool.stats());

    Ok(())
}
