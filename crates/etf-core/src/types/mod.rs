//! 데이터 수집 전반에서 사용되는 공통 타입.

mod compact_date;

pub use compact_date::*;
