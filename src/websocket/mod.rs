pub mod channel;
pub mod handler;
pub mod messages;

pub use channel::ClientChannel;
pub use handler::websocket_handler;
pub use messages::{ClientMessage, LoginSuccess, PriceUpdate, ServerMessage};
