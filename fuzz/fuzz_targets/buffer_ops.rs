#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use segpool::{AcquireContext, BufferError, BufferPool};

fuzz_target!(|ops: Vec<(u8, u8)>| {
    // 8 segments of 8 bytes, one buffer limited to 48 bytes
    let pool = BufferPool::new(64, 8).unwrap();
    let buffer = pool.buffer(48);
    // Never wait: only this buffer draws from the pool
    let ctx = AcquireContext::background();
    let mut model: VecDeque<u8> = VecDeque::new();

    for (op, arg) in ops {
        match op % 4 {
            0 | 1 => {
                let data: Vec<u8> = (0..arg % 20).map(|i| arg.wrapping_add(i)).collect();
                match buffer.write_with(&ctx, &data) {
                    Ok(n) => {
                        assert_eq!(n, data.len());
                        model.extend(&data);
                    }
                    Err(BufferError::BufferTooSmall { .. }) | Err(BufferError::PoolTooSmall { .. }) => {}
                    Err(e) => panic!("unexpected write error: {}", e),
                }
            }
            2 => {
                let mut out = vec![0u8; (arg % 24) as usize];
                let n = match buffer.read(&mut out) {
                    Ok(n) => n,
                    Err(BufferError::EndOfData { read }) => read,
                    Err(e) => panic!("unexpected read error: {}", e),
                };
                let expected: Vec<u8> = model.drain(..n).collect();
                assert_eq!(&out[..n], &expected[..]);
            }
            _ => {
                if arg % 2 == 0 {
                    let out = buffer.read_all().unwrap();
                    let expected: Vec<u8> = model.drain(..).collect();
                    assert_eq!(&out[..], &expected[..]);
                } else {
                    buffer.free();
                    model.clear();
                }
            }
        }

        // Verify: unread length always matches the model
        assert_eq!(buffer.len(), model.len());
        assert!(buffer.accounted_size() >= buffer.len());
        assert!(pool.stats().outstanding <= 8);
    }
});
