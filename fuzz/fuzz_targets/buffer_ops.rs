#![no_main]

use std::collections::VecDeque;
use std::io::Read;

use chunked::{ChunkedBuffer, Pool};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<u8>| {
    let pool = Pool::new(4, 64);
    let mut buf = ChunkedBuffer::with_pool(&pool);
    let mut model: VecDeque<u8> = VecDeque::new();

    // Each op byte is followed by its argument bytes
    let mut input = &data[..];
    while let Some((&op, rest)) = input.split_first() {
        input = rest;
        let arg = input.first().copied().unwrap_or(0) as usize;

        match op % 6 {
            0 => {
                let n = arg.min(input.len());
                let (head, tail) = input.split_at(n);
                assert_eq!(buf.extend_from_slice(head), n);
                model.extend(head);
                input = tail;
            }
            1 => {
                buf.write_byte(arg as u8);
                model.push_back(arg as u8);
            }
            2 => assert_eq!(buf.read_byte(), model.pop_front()),
            3 => {
                let mut dst = vec![0u8; arg];
                let n = buf.read(&mut dst).unwrap();
                let expected: Vec<u8> = model.drain(..n).collect();
                assert_eq!(&dst[..n], &expected[..]);
                assert!(n == arg || model.is_empty());
            }
            4 => {
                let flat = buf.contiguous();
                assert!(flat.iter().eq(model.iter()));
            }
            _ => {
                buf.reset();
                model.clear();
            }
        }

        // Verify: length, ends and capacity bookkeeping stay in step
        assert_eq!(buf.len(), model.len());
        assert_eq!(buf.peek_byte(), model.front().copied().unwrap_or(0));
        assert!(buf.cap() >= buf.len());
        if model.is_empty() {
            assert!(buf.cap() <= 64, "an empty buffer holds at most one chunk");
        }
    }

    // Verify: draining yields the model exactly
    let mut out = Vec::new();
    buf.write_to(&mut out).unwrap();
    assert!(out.iter().eq(model.iter()));
    assert_eq!(buf.cap(), 0);
});
