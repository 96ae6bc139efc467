pub mod instrument;
pub mod session;

pub use instrument::{supported_symbols, Instrument, SUPPORTED_INSTRUMENTS};
pub use session::{ClientSession, ConnectionId};
