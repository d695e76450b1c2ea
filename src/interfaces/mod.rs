pub mod loopback;
pub mod stdio;
