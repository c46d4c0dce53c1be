#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod get;
pub mod manifests;
pub mod table;
