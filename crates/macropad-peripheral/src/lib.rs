#![no_std]

pub mod bootloader;
pub mod usb_hid;
pub mod watchdog;

pub use bootloader::BootloaderUtil;
