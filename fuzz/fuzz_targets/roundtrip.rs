#![no_main]

use libfuzzer_sys::fuzz_target;
use segpool::BufferPool;

fuzz_target!(|data: Vec<u8>| {
    // Test with various segment sizes
    for segment_size in [1, 3, 64, 4096] {
        let pool = BufferPool::new(0, segment_size).unwrap();
        let buffer = pool.buffer(0);

        // Verify: whatever goes in comes out unchanged
        assert_eq!(buffer.write(&data).unwrap(), data.len());
        assert_eq!(buffer.len(), data.len());
        let out = buffer.read_all().unwrap();
        assert_eq!(&out[..], &data[..]);

        // Verify: draining returns every segment
        assert_eq!(pool.stats().outstanding, 0);
    }
});
