//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `binary_store` | RecordStore        | length-prefixed postcard log |
//! | `config_file`  | ConfigPort         | JSON file on disk            |
//! | `csv_store`    | RecordStore        | CSV text log                 |
//! | `gpio`         | PulseCapture       | Linux sysfs GPIO (sensor)    |
//! |                | OutputPin          | Linux sysfs GPIO (LED)       |
//! | `log_sink`     | EventSink          | `log` facade                 |
//! | `sim`          | PulseCapture       | synthesised DHTxx frames     |
//! |                | OutputPin          | trace log                    |
//! | `status`       | (reads Monitor)    | HTTP status endpoint         |
//! | `time`         | Clock              | `std::time` monotonic clock  |

pub mod binary_store;
pub mod config_file;
pub mod csv_store;
pub mod gpio;
pub mod log_sink;
pub mod sim;
pub mod status;
pub mod time;
