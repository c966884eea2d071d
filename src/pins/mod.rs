//! Board pins and their allocation to named devices.
//!
//! ```text
//!   Board (declared pins) ──▶ PinAllocator ──▶ InputLine / OutputLine
//!                              name ↔ (board, pin)
//! ```
//!
//! Every device constructor reserves its pins here before it touches
//! hardware; the allocator is the only place that knows which name owns
//! which pin.

mod allocator;
mod board;
mod line;

pub use allocator::{MappedPin, PinAllocator};
pub use board::{Board, BoardType, Pin, PinCapability, PinKind};
pub use line::{InputLine, OutputLine};
