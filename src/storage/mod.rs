pub mod disk;
pub mod sink;

pub use disk::DiskStorage;
pub use sink::EventSink;
