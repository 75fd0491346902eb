//! Async producers sharing one bounded pool.
//!
//! Writers park at the pool's permit gate instead of blocking a runtime
//! thread when the budget is used up.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io

use std::time::Duration;

use futures_util::io::{AsyncReadExt, AsyncWriteExt};
use segpool::BufferPool;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Room for 4 segments of 1 KiB in total
    let pool = BufferPool::new(4 * 1024, 1024)?;

    println!("Spawning 8 producers on a 4-segment pool...\n");

    let handles: Vec<_> = (0..8u8)
        .map(|id| {
            let pool = pool.clone();
            tokio::spawn(async move {
                let mut buffer = pool.buffer(0);
                buffer.write_all(&[id; 1024]).await?;

                // Hold the segment for a while so others have to wait
                tokio::time::sleep(Duration::from_millis(50)).await;

                let mut out = Vec::new();
                buffer.read_to_end(&mut out).await?;
                Ok::<_, std::io::Error>((id, out.len()))
            })
        })
        .collect();

    for handle in handles {
        let (id, len) = handle.await??;
        println!("Producer {}: round-tripped {} bytes", id, len);
    }

    println!("\nPool stats: {:?}", pool.stats());
    Ok(())
}
