use crate::models::Snapshot;
use serde::{Deserialize, Serialize};

/// Default universe size for both rankings
pub const DEFAULT_UNIVERSE_SIZE: usize = 100;

/// Top `limit` symbols by 24h traded value, descending.
///
/// Symbols whose traded volume or traded value did not parse are left out.
/// Equal values keep snapshot order.
pub fn rank_by_value(snapshot: &Snapshot, limit: usize) -> Vec<String> {
    let mut coins: Vec<(&str, f64)> = snapshot
        .iter()
        .filter(|entry| {
            entry.info.units_traded_24h.is_finite() && entry.info.acc_trade_value_24h.is_finite()
        })
        .map(|entry| (entry.symbol.as_str(), entry.info.acc_trade_value_24h))
        .collect();

    // sort_by is stable
    coins.sort_by(|a, b| b.1.total_cmp(&a.1));

    coins
        .into_iter()
        .take(limit)
        .map(|(symbol, _)| symbol.to_string())
        .collect()
}

/// Top `limit` symbols by session return `(close - open) / open`, descending.
///
/// Symbols with an unparseable price or a zero opening price are left out.
pub fn rank_by_return(snapshot: &Snapshot, limit: usize) -> Vec<String> {
    let mut coins: Vec<(&str, f64)> = snapshot
        .iter()
        .filter_map(|entry| {
            entry
                .info
                .session_return()
                .map(|rate| (entry.symbol.as_str(), rate))
        })
        .collect();

    coins.sort_by(|a, b| b.1.total_cmp(&a.1));

    coins
        .into_iter()
        .take(limit)
        .map(|(symbol, _)| symbol.to_string())
        .collect()
}

/// Which ranking orders the common-symbol list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBase {
    Value,
    #[default]
    Return,
}

/// Symbols present in both rankings, in the order of `base`
pub fn common_symbols(by_value: &[String], by_return: &[String], base: RankBase) -> Vec<String> {
    match base {
        RankBase::Value => super::intersect(by_value, by_return),
        RankBase::Return => super::intersect(by_return, by_value),
    }
}
