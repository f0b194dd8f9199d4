//! Best-effort SRT to WebVTT conversion. Nothing here returns an error:
//! subtitle text is cosmetic, and partial output beats a failed command.

pub const WEBVTT_HEADER: &str = "WEBVTT";

const TIMING_DELIMITER: &str = " --> ";

/// Rewrites SRT decimal commas as WebVTT periods
/// (`HH:MM:SS,mmm` -> `HH:MM:SS.mmm`). Pure text substitution; malformed
/// input passes through untouched apart from the commas.
pub fn convert_timestamp(line: &str) -> String {
    line.replace(',', ".")
}

/// Converts a whole SRT document to WebVTT. Blocks are split on blank
/// lines; a block contributes a cue when it has a timing line and
/// non-empty text below it, and is silently dropped otherwise. The output
/// starts with the WEBVTT header no matter what the input looked like.
pub fn convert_document(srt: &str) -> String {
    let normalized = srt.replace("\r\n", "\n").replace('\r', "\n");
    let mut output = format!("{WEBVTT_HEADER}\n\n");

    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block.lines().collect();
        let Some(timing_index) = lines
            .iter()
            .position(|line| line.contains(TIMING_DELIMITER))
        else {
            continue;
        };
        let text = lines[timing_index + 1..].join("\n");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        output.push_str(&convert_timestamp(lines[timing_index]));
        output.push('\n');
        output.push_str(text);
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_comma_becomes_period() {
        assert_eq!(convert_timestamp("00:01:23,456"), "00:01:23.456");
    }

    #[test]
    fn timing_line_converts_both_timestamps() {
        assert_eq!(
            convert_timestamp("00:00:01,000 --> 00:00:04,000"),
            "00:00:01.000 --> 00:00:04.000"
        );
    }

    #[test]
    fn malformed_timestamp_passes_through() {
        assert_eq!(convert_timestamp("garbage,text"), "garbage.text");
        assert_eq!(convert_timestamp(""), "");
    }

    #[test]
    fn output_always_starts_with_the_header() {
        assert!(convert_document("").starts_with(WEBVTT_HEADER));
        assert!(convert_document("random prose\nwith no cues").starts_with(WEBVTT_HEADER));
    }

    #[test]
    fn simple_block_round_trips() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello\n";
        let vtt = convert_document(srt);
        assert!(vtt.contains("00:00:01.000 --> 00:00:04.000\nHello\n"));
    }

    #[test]
    fn cue_index_lines_are_dropped() {
        let vtt = convert_document("17\n00:00:01,000 --> 00:00:04,000\nHello\n");
        assert!(!vtt.contains("17\n"));
    }

    #[test]
    fn multi_line_text_is_preserved() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nfirst line\nsecond line\n";
        let vtt = convert_document(srt);
        assert!(vtt.contains("first line\nsecond line\n"));
    }

    #[test]
    fn blocks_without_timing_or_text_are_dropped() {
        let srt = "\
just some text\n\
\n\
2\n00:00:05,000 --> 00:00:06,000\n\
\n\
3\n00:00:07,000 --> 00:00:08,000\nkept\n";
        let vtt = convert_document(srt);
        assert!(!vtt.contains("just some text"));
        assert!(!vtt.contains("00:00:05.000"));
        assert!(vtt.contains("00:00:07.000 --> 00:00:08.000\nkept\n"));
    }

    #[test]
    fn crlf_documents_convert_the_same() {
        let srt = "1\r\n00:00:01,000 --> 00:00:04,000\r\nHello\r\n\r\n";
        let vtt = convert_document(srt);
        assert!(vtt.contains("00:00:01.000 --> 00:00:04.000\nHello\n"));
    }
}
