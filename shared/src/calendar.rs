//! 公开赛事日历与群组活动的按日筛选

use crate::{GroupEvent, PublicRun};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

/// 后端日期字符串所在的日历日
///
/// 接受纯日期（`2025-03-02`）、RFC 3339 时间戳（按时间戳自身的偏移取日期）
/// 以及 `datetime-local` 取值（`2025-03-02T06:30`）。
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

pub fn runs_on(runs: &[PublicRun], day: NaiveDate) -> Vec<&PublicRun> {
    runs.iter()
        .filter(|run| parse_day(&run.date) == Some(day))
        .collect()
}

pub fn events_on(events: &[GroupEvent], day: NaiveDate) -> Vec<&GroupEvent> {
    events
        .iter()
        .filter(|event| parse_day(&event.start_date) == Some(day))
        .collect()
}

/// 至少有一场赛事的日期，用于高亮
pub fn race_days(runs: &[PublicRun]) -> BTreeSet<NaiveDate> {
    runs.iter().filter_map(|run| parse_day(&run.date)).collect()
}

/// `dd/mm/yyyy`
pub fn format_day(day: NaiveDate) -> String {
    day.format("%d/%m/%Y").to_string()
}

/// 将后端时间戳格式化为 `dd/mm/yyyy HH:MM`，无法解析时原样返回
pub fn format_timestamp(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(ts) => ts.format("%d/%m/%Y %H:%M").to_string(),
        Err(_) => parse_day(value).map(format_day).unwrap_or_else(|| value.to_string()),
    }
}
