//! # LRC 格式解析器
//!
//! 解析永远不会失败：无法识别的行、时间戳分量无效的行都会被跳过，
//! 空输入或完全无效的输入得到空序列。

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use lyric_sync_core::{
    LrcMetadata, LrcMetadataKey, LyricLine, sanitize_seconds, sort_lines_by_timestamp,
};

/// 用于匹配一个完整的 LRC 歌词行，捕获时间戳部分和文本部分
static LRC_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\[\d{2,}:\d{2}\.\d{2,3}\])+)(.*)$").expect("未能编译 LRC_LINE_REGEX")
});

/// 用于从一个时间戳组中提取出单个时间戳
static LRC_TIMESTAMP_EXTRACT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{2,}):(\d{2})\.(\d{2,3})\]").expect("未能编译 LRC_TIMESTAMP_EXTRACT_REGEX")
});

static LRC_METADATA_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([A-Za-z]+):(.*)\]$").expect("未能编译 LRC_METADATA_TAG_REGEX")
});

/// 解析整份 LRC 文档的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLrc {
    /// 按时间戳稳定排序后的歌词行
    pub lines: Vec<LyricLine>,
    /// 识别出的头部标签
    pub metadata: LrcMetadata,
    /// 被跳过的行的说明，仅供展示
    pub warnings: Vec<String>,
}

impl ParsedLrc {
    /// 把 `[offset:]` 标签应用到所有时间戳上，并移除该标签，避免播放器重复应用。
    ///
    /// 正的偏移表示歌词提前出现。标签不存在或无法解析时不做任何事，返回 `false`。
    pub fn apply_offset_tag(&mut self) -> bool {
        let Some(offset) = self.metadata.offset_secs() else {
            return false;
        };
        self.metadata.remove(LrcMetadataKey::Offset);
        for line in &mut self.lines {
            line.timestamp = sanitize_seconds(line.timestamp - offset);
        }
        debug!("[LRC 解析] 已应用 {offset}s 的偏移标签");
        true
    }
}

/// 解析 LRC 文本，只返回歌词行。
#[must_use]
pub fn parse_lrc(content: &str) -> Vec<LyricLine> {
    parse_lrc_document(content).lines
}

/// 解析任意字节输入。非 UTF-8 的字节会被替换，不会导致失败。
#[must_use]
pub fn parse_lrc_bytes(bytes: &[u8]) -> Vec<LyricLine> {
    parse_lrc(&String::from_utf8_lossy(bytes))
}

/// 解析 LRC 文本，同时收集头部标签和警告。
#[must_use]
pub fn parse_lrc_document(content: &str) -> ParsedLrc {
    let mut result = ParsedLrc::default();

    for (line_num, line_str) in content.lines().enumerate() {
        let line_str_trimmed = line_str.trim();
        if line_str_trimmed.is_empty() {
            continue;
        }

        if let Some(line_caps) = LRC_LINE_REGEX.captures(line_str_trimmed) {
            let all_timestamps_str = line_caps.get(1).map_or("", |m| m.as_str());
            let text_part = line_caps.get(2).map_or("", |m| m.as_str()).trim();

            for ts_cap in LRC_TIMESTAMP_EXTRACT_REGEX.captures_iter(all_timestamps_str) {
                match timestamp_from_parts(&ts_cap[1], &ts_cap[2], &ts_cap[3]) {
                    Some(timestamp) => result.lines.push(LyricLine::new(timestamp, text_part)),
                    None => {
                        debug!(
                            "[LRC 解析] 行 {}: 时间戳分量无效，已跳过: '{}'",
                            line_num + 1,
                            &ts_cap[0]
                        );
                        result.warnings.push(format!(
                            "行 {}: 无效的时间戳 '{}'",
                            line_num + 1,
                            &ts_cap[0]
                        ));
                    }
                }
            }
        } else if !parse_metadata_tag(line_str_trimmed, &mut result.metadata) {
            debug!(
                "[LRC 解析] 行 {}: 跳过未识别的行: '{}'",
                line_num + 1,
                line_str_trimmed
            );
            result
                .warnings
                .push(format!("行 {}: 未识别的行", line_num + 1));
        }
    }

    sort_lines_by_timestamp(&mut result.lines);

    info!(
        "[LRC 解析] 解析完成，共 {} 行歌词，{} 个标签，跳过 {} 行。",
        result.lines.len(),
        result.metadata.len(),
        result.warnings.len()
    );
    result
}

/// 纯文本导入：每个非空行成为一行时间戳为 0 的歌词，保持文档顺序。
#[must_use]
pub fn parse_plain_text(content: &str) -> Vec<LyricLine> {
    let lines: Vec<LyricLine> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| LyricLine::new(0.0, l))
        .collect();
    info!("[纯文本导入] 导入了 {} 行歌词。", lines.len());
    lines
}

/// 根据分、秒和小数部分计算秒数。小数部分的位数决定其单位（2 位为百分之一秒，3 位为毫秒）。
fn timestamp_from_parts(minutes_str: &str, seconds_str: &str, fraction_str: &str) -> Option<f64> {
    let minutes: u64 = minutes_str.parse().ok()?;
    let seconds: u64 = seconds_str.parse().ok()?;
    let fraction: u64 = fraction_str.parse().ok()?;
    let scale = match fraction_str.len() {
        2 => 100.0,
        3 => 1000.0,
        _ => return None,
    };
    Some(minutes as f64 * 60.0 + seconds as f64 + fraction as f64 / scale)
}

fn parse_metadata_tag(line: &str, metadata: &mut LrcMetadata) -> bool {
    let Some(caps) = LRC_METADATA_TAG_REGEX.captures(line) else {
        return false;
    };
    let Ok(key) = LrcMetadataKey::from_str(&caps[1]) else {
        return false;
    };
    metadata.set(key, caps[2].trim());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(lines: &[LyricLine]) -> Vec<(f64, &str)> {
        lines.iter().map(|l| (l.timestamp, l.text.as_str())).collect()
    }

    #[test]
    fn test_parse_skips_bad_lines_and_sorts() {
        let content = "[00:01.50]Hello\n[00:03.00]World\n[bad line]\n[00:00.00]Start";
        let lines = parse_lrc(content);
        assert_eq!(
            summary(&lines),
            vec![(0.0, "Start"), (1.5, "Hello"), (3.0, "World")]
        );
    }

    #[test]
    fn test_fraction_scale_follows_digit_count() {
        let lines = parse_lrc("[00:01.05]a\n[00:01.050]b\n[01:02.123]c");
        assert!((lines[0].timestamp - 1.05).abs() < 1e-9);
        assert!((lines[1].timestamp - 1.05).abs() < 1e-9);
        assert!((lines[2].timestamp - 62.123).abs() < 1e-9);
    }

    #[test]
    fn test_text_is_trimmed() {
        let lines = parse_lrc("  [00:02.00]   spaced out   \r\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "spaced out");
    }

    #[test]
    fn test_empty_text_is_kept() {
        let lines = parse_lrc("[00:02.00]");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "");
    }

    #[test]
    fn test_garbage_yields_empty_sequence() {
        assert!(parse_lrc("").is_empty());
        assert!(parse_lrc("just some words\n[1:2.3]nope\n[aa:bb.cc]x").is_empty());
        assert!(parse_lrc_bytes(&[0xff, 0xfe, 0x00, 0x5b, 0x0a]).is_empty());
    }

    #[test]
    fn test_ties_keep_document_order() {
        let lines = parse_lrc("[00:05.00]second\n[00:01.00]first\n[00:05.00]third");
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_repeated_timestamps_expand_to_multiple_lines() {
        let lines = parse_lrc("[00:10.00][00:01.00]chorus");
        assert_eq!(summary(&lines), vec![(1.0, "chorus"), (10.0, "chorus")]);
        assert_ne!(lines[0].id(), lines[1].id());
    }

    #[test]
    fn test_metadata_tags_are_collected() {
        let parsed = parse_lrc_document("[ti: Song ]\n[ar:Someone]\n[xx:unknown]\n[00:01.00]a");
        assert_eq!(parsed.metadata.get(LrcMetadataKey::Title), Some("Song"));
        assert_eq!(parsed.metadata.get(LrcMetadataKey::Artist), Some("Someone"));
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_applied_offset_tag_is_removed() {
        let mut parsed =
            parse_lrc_document("[ti:Song]\n[offset:500]\n[00:01.00]a\n[00:00.20]b");
        assert!(parsed.apply_offset_tag());
        assert_eq!(summary(&parsed.lines), vec![(0.0, "b"), (0.5, "a")]);
        assert_eq!(parsed.metadata.get(LrcMetadataKey::Offset), None);
        assert_eq!(
            crate::lrc_generator::generate_lrc_document(&parsed.lines, &parsed.metadata),
            "[ti:Song]\n[00:00.00] b\n[00:00.50] a"
        );
        assert!(!parsed.apply_offset_tag(), "标签已被移除，不应再次应用");
    }

    #[test]
    fn test_unparsable_offset_tag_is_left_alone() {
        let mut parsed = parse_lrc_document("[offset:soon]\n[00:01.00]a");
        assert!(!parsed.apply_offset_tag());
        assert_eq!(parsed.metadata.get(LrcMetadataKey::Offset), Some("soon"));
        assert_eq!(summary(&parsed.lines), vec![(1.0, "a")]);
    }

    #[test]
    fn test_long_minutes_are_accepted() {
        let lines = parse_lrc("[120:00.00]late");
        assert!((lines[0].timestamp - 7200.0).abs() < 1e-9);
    }

    #[test]
    fn test_plain_text_import() {
        let lines = parse_plain_text("first\n\n   \n  second  \nthird");
        assert_eq!(
            summary(&lines),
            vec![(0.0, "first"), (0.0, "second"), (0.0, "third")]
        );
    }
}
