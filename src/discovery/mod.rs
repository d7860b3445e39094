// Universe selection: ticker rankings and ordered set combinators
pub mod ranking;
pub mod sets;

pub use ranking::{common_symbols, rank_by_return, rank_by_value, RankBase, DEFAULT_UNIVERSE_SIZE};
pub use sets::{exclude, intersect, union};
