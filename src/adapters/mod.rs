//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements           | Connects to                    |
//! |-------------|----------------------|--------------------------------|
//! | `hardware`  | ChipDriver, DelayNs  | `embedded-hal` digital pins    |
//! | `simulated` | ChipDriver, DelayNs  | in-memory registers            |
//! | `log_sink`  | EventSink            | `log` facade                   |
//! | `time`      | DelayNs              | `std::thread::sleep`           |

pub mod hardware;
pub mod log_sink;
pub mod simulated;
pub mod time;
