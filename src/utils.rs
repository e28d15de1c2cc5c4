use lyric_sync_core::SyncError;

/// 浮点误差补偿，避免 `0.29 * 100.0 = 28.999…` 这类情况在向下取整时丢掉一个单位。
const FLOOR_EPSILON: f64 = 1e-6;

/// 把秒数转换为百分之一秒（向下取整）。负数和非有限值视为 0。
#[must_use]
pub fn centiseconds(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 100.0 + FLOOR_EPSILON).floor() as u64
}

/// 格式化为 LRC 时间戳 `[MM:SS.ff]`。
#[must_use]
pub fn format_lrc_time(secs: f64) -> String {
    let total_cs = centiseconds(secs);
    let minutes = total_cs / 6000;
    let seconds = (total_cs / 100) % 60;
    let cs = total_cs % 100;
    format!("[{minutes:02}:{seconds:02}.{cs:02}]")
}

/// 解析用户在编辑框里输入的时间。
///
/// 接受 `M:SS.t`、`MM:SS.ff`、`[MM:SS.fff]` 以及纯秒数 `12.5`。
/// 负数、非有限值和格式错误的输入都会被拒绝。
pub fn parse_time_input(input: &str) -> Result<f64, SyncError> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();
    if trimmed.is_empty() {
        return Err(SyncError::InvalidTime("输入为空".to_string()));
    }

    let secs = if let Some((minutes_str, seconds_str)) = trimmed.split_once(':') {
        let minutes: u64 = minutes_str.trim().parse().map_err(|e| {
            SyncError::InvalidTime(format!("无效的分钟 '{minutes_str}': {e}"))
        })?;
        let seconds = parse_plain_seconds(seconds_str.trim(), input)?;
        if seconds >= 60.0 {
            return Err(SyncError::InvalidTime(format!(
                "秒数必须小于 60: '{input}'"
            )));
        }
        minutes as f64 * 60.0 + seconds
    } else {
        parse_plain_seconds(trimmed, input)?
    };

    if secs.is_finite() {
        Ok(secs)
    } else {
        Err(SyncError::InvalidTime(format!("时间超出范围: '{input}'")))
    }
}

fn parse_plain_seconds(s: &str, original: &str) -> Result<f64, SyncError> {
    // 只允许数字和一个小数点，拒绝 "inf"、"1e3"、"-1" 之类 f64 能解析但不是时间的写法
    if s.is_empty()
        || s.chars().any(|c| !c.is_ascii_digit() && c != '.')
        || s.matches('.').count() > 1
        || s == "."
    {
        return Err(SyncError::InvalidTime(format!(
            "无效的时间格式: '{original}'"
        )));
    }
    s.parse::<f64>()
        .map_err(|e| SyncError::InvalidTime(format!("无法解析 '{original}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lrc_time_floors() {
        assert_eq!(format_lrc_time(0.0), "[00:00.00]");
        assert_eq!(format_lrc_time(1.999), "[00:01.99]");
        assert_eq!(format_lrc_time(0.29), "[00:00.29]");
        assert_eq!(format_lrc_time(61.5), "[01:01.50]");
        assert_eq!(format_lrc_time(-3.0), "[00:00.00]");
        assert_eq!(format_lrc_time(f64::NAN), "[00:00.00]");
    }

    #[test]
    fn test_parse_time_input_accepts_common_forms() {
        assert!((parse_time_input("1:05.3").unwrap() - 65.3).abs() < 1e-9);
        assert!((parse_time_input("01:05.30").unwrap() - 65.3).abs() < 1e-9);
        assert!((parse_time_input("[00:01.500]").unwrap() - 1.5).abs() < 1e-9);
        assert!((parse_time_input(" 12.5 ").unwrap() - 12.5).abs() < 1e-9);
        assert!((parse_time_input("7").unwrap() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_time_input_rejects_invalid() {
        for bad in ["", "abc", "-1", "-0:10", "1:75", "inf", "NaN", "1e3", "1:2:3", ".", "1..2"] {
            assert!(parse_time_input(bad).is_err(), "应当拒绝 '{bad}'");
        }
    }
}
