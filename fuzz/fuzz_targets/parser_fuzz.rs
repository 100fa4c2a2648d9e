//! Parser fuzz target: feed arbitrary bytes to the format parser, pack an empty
//! value list, and hand the remaining bytes to `unpack` / `iter_unpack`.
//! Nothing may panic; every failure must come back as a `CodecError`.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let format = match std::str::from_utf8(&data[..split]) {
        Ok(x) => x,
        Err(_) => return,
    };
    let buffer = data.get(split + 1..).unwrap_or(&[]);
    if structfmt::parse(format).is_ok() {
        let _ = structfmt::pack(format, &[]);
        let _ = structfmt::unpack(format, buffer);
        for _ in structfmt::iter_unpack(format, buffer) {}
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
