pub mod client;

pub use client::{DeviceApi, HttpDeviceApi, SharedApi};
