#![no_main]

use bytestream::{ByteReader, Width};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;
        let arg = u64::from(data.get(idx).copied().unwrap_or(0));

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_u16();
            }
            2 => {
                let _ = reader.read_word(Width::W32);
            }
            3 => {
                let _ = reader.read_sword(Width::W64);
            }
            4 => {
                let _ = reader.align_to(1 << (arg % 4));
            }
            5 => {
                let _ = reader.slice(arg, arg / 2);
            }
            6 => {
                let before = reader.position();
                if let Ok(mut scoped) = reader.at(arg) {
                    let _ = scoped.read_u32();
                }
                assert_eq!(reader.position(), before);
            }
            _ => {
                let _ = reader.seek(arg);
            }
        }
    }
});
