//! Fuzz target: `dht::decode`
//!
//! Each input byte becomes one pulse: the top bit is the level, the low
//! seven bits the width in microseconds.  The decoder must never panic
//! and an accepted reading must carry a plausible humidity.
//!
//! cargo fuzz run fuzz_pulse_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use pimon::sensors::dht::decode;
use pimon::sensors::{Level, Pulse, SensorFamily};

fuzz_target!(|data: &[u8]| {
    let pulses: Vec<Pulse> = data
        .iter()
        .map(|&b| {
            let us = u64::from(b & 0x7F);
            if b & 0x80 != 0 {
                Pulse::high(us)
            } else {
                Pulse::low(us)
            }
        })
        .collect();

    for family in [SensorFamily::Dht11, SensorFamily::Dht22] {
        if let Ok(r) = decode(family, &pulses) {
            assert!(r.humidity <= 100.0, "accepted out-of-range humidity");
            assert!(pulses.iter().any(|p| p.level == Level::High));
        }
    }
});
