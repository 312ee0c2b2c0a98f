//! 视图共用的显示辅助函数

use crate::{AVATAR_CHOICES, ElapsedTime, Profile};

const FALLBACK_NAME: &str = "Usuário";

/// 将每公里分钟数渲染为 `5'30" /km`
///
/// 后端无法计算的配速（零、负数、无穷或 NaN）返回 `None`。
pub fn format_pace(min_per_km: f64) -> Option<String> {
    if !min_per_km.is_finite() || min_per_km <= 0.0 {
        return None;
    }
    let mut minutes = min_per_km.floor() as u64;
    let mut seconds = ((min_per_km - min_per_km.floor()) * 60.0).round() as u64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    Some(format!("{}'{:02}\" /km", minutes, seconds))
}

/// `reference` 对应的内置头像，否则取第一个内置头像
pub fn resolve_avatar(reference: &str) -> &str {
    if AVATAR_CHOICES.contains(&reference) {
        reference
    } else {
        AVATAR_CHOICES[0]
    }
}

pub fn display_name(profile: Option<&Profile>) -> &str {
    profile.map(|p| p.name.as_str()).unwrap_or(FALLBACK_NAME)
}

/// 名字首字母，头像加载失败时显示
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

pub fn total_minutes(hours: u32, minutes: u32, seconds: u32) -> f64 {
    f64::from(hours) * 60.0 + f64::from(minutes) + f64::from(seconds) / 60.0
}

/// 解析用户输入的小数，允许逗号作小数点（"5,2"）
pub fn parse_decimal(input: &str) -> Option<f64> {
    let value: f64 = input.trim().replace(',', ".").parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn format_elapsed(time: &ElapsedTime) -> String {
    format!("{}h {}m {}s", time.hours, time.minutes, time.seconds)
}

/// 0..=5 评分对应的五星条
pub fn rating_stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn medal(position: usize) -> Option<&'static str> {
    match position {
        0 => Some("🥇"),
        1 => Some("🥈"),
        2 => Some("🥉"),
        _ => None,
    }
}
