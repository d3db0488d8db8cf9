//! 도메인 모델.

mod fund;
mod lenient;
mod share;

pub use fund::*;
pub use share::*;
