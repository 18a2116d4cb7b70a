#[cfg(all(feature = "layout-cnc", feature = "layout-desktop"))]
compile_error!("Only one of the features \"layout-cnc\" and \"layout-desktop\" can be enabled");

#[cfg(not(any(feature = "layout-cnc", feature = "layout-desktop")))]
compile_error!("One of the features \"layout-cnc\" or \"layout-desktop\" must be enabled");

#[cfg(feature = "layout-cnc")]
mod cnc;
#[cfg(feature = "layout-cnc")]
pub use cnc::BINDINGS;

#[cfg(feature = "layout-desktop")]
mod desktop;
#[cfg(feature = "layout-desktop")]
pub use desktop::BINDINGS;
