#![no_std]

pub mod action;
pub mod boot;
pub mod control;
pub mod encoder;
pub mod hid;
pub mod indicator;
pub mod input;
pub mod keys;

#[cfg(test)]
mod testing;
