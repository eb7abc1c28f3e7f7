//! Library side of `warpcheck`: pieces shared by the binary and its tests.

pub mod export;
pub mod summary;
