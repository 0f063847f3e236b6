//! Fuzz target: `parse_csv_series`
//!
//! Arbitrary text must either parse or report a line number inside the
//! input.  Parsed records must render in every output format.
//!
//! cargo fuzz run fuzz_csv_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use pimon::measurement::parse_csv_series;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    match parse_csv_series(text) {
        Ok(series) => {
            for m in series {
                let _ = (m.to_record(), m.to_json(), m.to_string());
            }
        }
        Err((line, _)) => assert!(line < text.lines().count()),
    }
});
