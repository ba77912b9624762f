pub mod io_bus;
pub mod mb14241;

pub use io_bus::IoBus;
pub use mb14241::Mb14241;
