pub mod handler;
pub mod room;
pub mod router;
pub mod types;

pub use room::BoardRoom;
pub use router::router;
