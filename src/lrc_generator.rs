//! # LRC 格式生成器
//!
//! 导出格式固定为百分之一秒精度 `[MM:SS.ff] text`，小数部分向下取整。

use std::borrow::Cow;

use tracing::info;

use lyric_sync_core::{LrcMetadata, LyricLine};

use crate::utils::{centiseconds, format_lrc_time};

/// LRC 每条记录只能占一行，文本中的换行替换为空格。
fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\r', '\n']) {
        Cow::Owned(text.replace("\r\n", " ").replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(text)
    }
}

/// 按序列顺序生成规范的 LRC 正文，各行以换行符连接。
///
/// 文本中的换行会被替换为空格，否则多出来的行没有时间戳，重新导入时会被丢弃。
#[must_use]
pub fn generate_lrc(lines: &[LyricLine]) -> String {
    let output = lines
        .iter()
        .map(|line| {
            format!(
                "{} {}",
                format_lrc_time(line.timestamp),
                single_line(&line.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    info!("[LRC 生成] 生成了 {} 行歌词。", lines.len());
    output
}

/// 先写入头部标签，再写入正文。
#[must_use]
pub fn generate_lrc_document(lines: &[LyricLine], metadata: &LrcMetadata) -> String {
    let body = generate_lrc(lines);
    if metadata.is_empty() {
        return body;
    }

    let mut parts: Vec<String> = metadata
        .iter()
        .map(|(key, value)| format!("[{}:{}]", key.as_ref(), value))
        .collect();
    if !body.is_empty() {
        parts.push(body);
    }
    parts.join("\n")
}

/// 屏幕编辑用的时间显示 `M:SS.t`，精确到十分之一秒（向下取整），分钟不补零。
///
/// 这是有损的表示，只用于展示，不参与导出。
#[must_use]
pub fn format_display_time(secs: f64) -> String {
    let total_ds = centiseconds(secs) / 10;
    let minutes = total_ds / 600;
    let seconds = (total_ds / 10) % 60;
    let tenths = total_ds % 10;
    format!("{minutes}:{seconds:02}.{tenths}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrc_parser::parse_lrc;
    use lyric_sync_core::LrcMetadataKey;

    #[test]
    fn test_generate_canonical_lines() {
        let lines = vec![
            LyricLine::new(0.0, "Start"),
            LyricLine::new(1.5, "Hello"),
            LyricLine::new(83.129, "Later"),
        ];
        insta::assert_snapshot!(generate_lrc(&lines), @r"
        [00:00.00] Start
        [00:01.50] Hello
        [01:23.12] Later
        ");
    }

    #[test]
    fn test_line_breaks_in_text_survive_round_trip() {
        let lines = vec![
            LyricLine::new(1.0, "first\nsecond"),
            LyricLine::new(2.0, "a\r\nb\rc"),
        ];
        let exported = generate_lrc(&lines);
        assert_eq!(exported, "[00:01.00] first second\n[00:02.00] a b c");
        let texts: Vec<_> = parse_lrc(&exported).into_iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["first second", "a b c"]);
    }

    #[test]
    fn test_generate_empty_sequence() {
        assert_eq!(generate_lrc(&[]), "");
    }

    #[test]
    fn test_round_trip_keeps_text_and_time() {
        let original = parse_lrc("[00:00.29]a\n[00:12.345]b  c\n[03:59.99]\n[10:00.07]end");
        let reparsed = parse_lrc(&generate_lrc(&original));
        assert_eq!(reparsed.len(), original.len());
        for (a, b) in original.iter().zip(&reparsed) {
            assert_eq!(a.text, b.text);
            assert!((a.timestamp - b.timestamp).abs() < 0.01 + 1e-9);
            assert_ne!(a.id(), b.id());
        }
    }

    #[test]
    fn test_document_writes_tags_first() {
        let mut metadata = LrcMetadata::new();
        metadata.set(LrcMetadataKey::Title, "Song");
        metadata.set(LrcMetadataKey::Artist, "Someone");
        let lines = vec![LyricLine::new(1.0, "a")];
        assert_eq!(
            generate_lrc_document(&lines, &metadata),
            "[ti:Song]\n[ar:Someone]\n[00:01.00] a"
        );
    }

    #[test]
    fn test_display_time() {
        assert_eq!(format_display_time(0.0), "0:00.0");
        assert_eq!(format_display_time(1.56), "0:01.5");
        assert_eq!(format_display_time(59.99), "0:59.9");
        assert_eq!(format_display_time(754.3), "12:34.3");
    }
}
