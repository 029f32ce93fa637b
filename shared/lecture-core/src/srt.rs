//! SubRip export and import for lesson subtitle lists

use crate::subtitle::{SubtitleEntry, SubtitleId};
use crate::{LectureCoreError, Result};

/// A cue read back from an SRT file, not yet attached to any lesson
#[derive(Debug, Clone, PartialEq)]
pub struct SrtCue {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

impl SrtCue {
    /// Turn the cue into a provisional subtitle entry
    pub fn into_entry(self) -> SubtitleEntry {
        SubtitleEntry::new(SubtitleId::provisional(), self.start_time, self.end_time, self.text)
    }
}

/// Render subtitles as SRT, ordered by start time.
///
/// Entries with unusable times are skipped. Negative starts (provisional
/// entries created near the beginning) are written as 00:00:00,000.
pub fn to_srt(entries: &[SubtitleEntry]) -> String {
    let mut usable: Vec<&SubtitleEntry> = entries
        .iter()
        .filter(|entry| entry.start_time.is_finite() && entry.end_time.is_finite())
        .collect();
    usable.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let mut srt_content = String::new();
    for (i, entry) in usable.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(entry.start_time),
            format_timestamp(entry.end_time),
            clean_text(&entry.text)
        ));
    }
    srt_content
}

/// Parse SRT content into cues
pub fn parse_srt(content: &str) -> Result<Vec<SrtCue>> {
    let mut cues = Vec::new();
    let mut lines = content.lines().enumerate().peekable();

    while let Some((line_no, line)) = lines.next() {
        let line = line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() {
            continue;
        }

        // Cue number line is optional in the wild; accept a timing line directly.
        let (timing_no, timing) = if line.contains("-->") {
            (line_no, line.to_string())
        } else {
            match lines.next() {
                Some((n, l)) => (n, l.trim().to_string()),
                None => {
                    return Err(LectureCoreError::SrtParse {
                        line: line_no + 1,
                        reason: "cue number without timing line".to_string(),
                    })
                }
            }
        };

        let (start, end) = parse_timing_line(&timing).map_err(|reason| LectureCoreError::SrtParse {
            line: timing_no + 1,
            reason,
        })?;

        let mut text_lines = Vec::new();
        while let Some((_, text_line)) = lines.peek() {
            if text_line.trim().is_empty() {
                break;
            }
            text_lines.push(text_line.trim().to_string());
            lines.next();
        }

        cues.push(SrtCue {
            start_time: start,
            end_time: end,
            text: text_lines.join(" "),
        });
    }

    Ok(cues)
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

fn parse_timing_line(line: &str) -> std::result::Result<(f64, f64), String> {
    let parts: Vec<&str> = line.split("-->").collect();
    if parts.len() != 2 {
        return Err(format!("invalid timing line {:?}", line));
    }
    // Trailing position hints ("X1:...") may follow the end timestamp
    let end = parts[1].split_whitespace().next().unwrap_or("");
    Ok((parse_timestamp(parts[0].trim())?, parse_timestamp(end)?))
}

/// Parse a single timestamp (HH:MM:SS,mmm) into seconds
fn parse_timestamp(timestamp: &str) -> std::result::Result<f64, String> {
    let (hms, millis) = timestamp
        .split_once(',')
        .or_else(|| timestamp.split_once('.'))
        .ok_or_else(|| format!("invalid timestamp {:?}", timestamp))?;

    let hms_parts: Vec<&str> = hms.split(':').collect();
    if hms_parts.len() != 3 {
        return Err(format!("invalid time {:?}", hms));
    }

    let number = |s: &str| s.trim().parse::<u64>().map_err(|e| format!("{:?}: {}", s, e));
    let (hours, minutes, seconds) = (number(hms_parts[0])?, number(hms_parts[1])?, number(hms_parts[2])?);
    let millis = parse_millis(millis)?;

    let total_millis = hours
        .checked_mul(3600)
        .and_then(|s| s.checked_add(minutes.checked_mul(60)?))
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(|| "timestamp out of range".to_string())?;

    Ok(total_millis as f64 / 1000.0)
}

/// Read the fractional part as milliseconds, so `5` is 500 and `05` is 50
fn parse_millis(fraction: &str) -> std::result::Result<u64, String> {
    let fraction = fraction.trim();
    if fraction.is_empty() || fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid milliseconds {:?}", fraction));
    }
    format!("{:0<3}", fraction)
        .parse()
        .map_err(|e| format!("{:?}: {}", fraction, e))
}

/// Collapse whitespace so a caption stays on one SRT line
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(format_timestamp(3661.0), "01:01:01,000");
        assert_eq!(format_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(-2.0), "00:00:00,000");
    }

    #[test]
    fn test_export_sorts_and_skips_unusable_entries() {
        let entries = vec![
            SubtitleEntry::new(SubtitleId::persisted("2"), 5.0, 10.0, "Second\nline"),
            SubtitleEntry::new(SubtitleId::persisted("x"), f64::NAN, 1.0, "broken"),
            SubtitleEntry::new(SubtitleId::persisted("1"), 0.0, 5.0, "First"),
        ];

        let content = to_srt(&entries);

        assert!(content.starts_with("1\n00:00:00,000 --> 00:00:05,000\nFirst\n"));
        assert!(content.contains("2\n00:00:05,000 --> 00:00:10,000\nSecond line\n"));
        assert!(!content.contains("broken"));
    }

    #[test]
    fn test_parse_cues_with_multiline_text() {
        let content = "1\n00:00:01,000 --> 00:00:04,250\nBuenos\ndías\n\n2\n00:01:00,000 --> 00:01:02,000\nClase\n";
        let cues = parse_srt(content).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start_time, 1.0);
        assert_eq!(cues[0].end_time, 4.25);
        assert_eq!(cues[0].text, "Buenos días");
        assert_eq!(cues[1].start_time, 60.0);
        assert!(cues[1].clone().into_entry().is_provisional());
    }

    #[test]
    fn test_parse_rejects_bad_timing() {
        let err = parse_srt("1\nnot a timing line\nhola\n").unwrap_err();
        assert!(matches!(err, LectureCoreError::SrtParse { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_overflowing_timestamp() {
        let content = "1\n9999999999999999:00:00,000 --> 9999999999999999:00:01,000\nhola\n";
        let err = parse_srt(content).unwrap_err();
        match err {
            LectureCoreError::SrtParse { line, reason } => {
                assert_eq!(line, 2);
                assert_eq!(reason, "timestamp out of range");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_millisecond_field_is_a_fraction() {
        assert_eq!(parse_timestamp("00:00:00,5"), Ok(0.5));
        assert_eq!(parse_timestamp("00:00:01.05"), Ok(1.05));
        assert_eq!(parse_timestamp("00:00:01,250"), Ok(1.25));
        assert!(parse_timestamp("00:00:01,").is_err());
        assert!(parse_timestamp("00:00:01,1234").is_err());
        assert!(parse_timestamp("00:00:01,+5").is_err());

        let cues = parse_srt("1\n00:00:00,5 --> 00:00:02,75\nhola\n").unwrap();
        assert_eq!(cues[0].start_time, 0.5);
        assert_eq!(cues[0].end_time, 2.75);
    }

    #[test]
    fn test_exported_content_parses_back() {
        let entries = vec![SubtitleEntry::new(SubtitleId::persisted("1"), 12.345, 15.0, "hola")];
        let cues = parse_srt(&to_srt(&entries)).unwrap();
        assert_eq!(cues, vec![SrtCue { start_time: 12.345, end_time: 15.0, text: "hola".to_string() }]);
    }
}
