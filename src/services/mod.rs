pub mod cluster;
pub mod consensus;
pub mod pin;
pub mod selection;
pub mod sync;
