use thiserror::Error;

use super::encoding::decode_bytes;
use super::srt::WEBVTT_HEADER;

const TIMING_DELIMITER: &str = "-->";

/// Structural failures when reading a WebVTT document. Individual
/// malformed cue blocks are skipped, not reported; these cover the cases
/// where the document as a whole is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VttError {
    #[error("subtitle data is not valid text")]
    InvalidEncoding,
    #[error("document does not start with a WEBVTT header")]
    MissingHeader,
    #[error("document contains no cue structure")]
    MalformedStructure,
}

/// One timed span of subtitle text. Immutable once parsed; `start <= end`
/// holds for every cue this module produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    /// Start-inclusive, end-exclusive: a cue ending at T does not overlap
    /// one starting at T.
    pub fn is_active(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// First cue active at the given time, if any.
pub fn active_at(cues: &[Cue], time: f64) -> Option<&Cue> {
    cues.iter().find(|cue| cue.is_active(time))
}

/// Decodes and parses in one step; the byte decoder is total, so this only
/// fails for structural reasons.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<Cue>, VttError> {
    parse(&decode_bytes(bytes))
}

/// Strict variant for callers that require UTF-8 input outright.
pub fn parse_utf8(bytes: &[u8]) -> Result<Vec<Cue>, VttError> {
    let text = std::str::from_utf8(bytes).map_err(|_| VttError::InvalidEncoding)?;
    parse(text)
}

/// Parses a WebVTT document into cues sorted by start time.
///
/// The header token must open the document. After that, parsing is
/// tolerant: blocks with a missing or unparsable timing line are skipped.
/// A document whose body has content but not a single timing delimiter is
/// rejected as structurally malformed rather than returned as zero cues.
pub fn parse(document: &str) -> Result<Vec<Cue>, VttError> {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);
    if !document.starts_with(WEBVTT_HEADER) {
        return Err(VttError::MissingHeader);
    }

    let normalized = document.replace("\r\n", "\n").replace('\r', "\n");
    // Everything after the header line; metadata lines up to the first
    // blank line form their own block and are skipped below.
    let body = normalized
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or("");

    if !body.trim().is_empty() && !body.contains(TIMING_DELIMITER) {
        return Err(VttError::MalformedStructure);
    }

    let mut cues = Vec::new();
    for block in body.split("\n\n") {
        let lines: Vec<&str> = block
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        let Some(timing_index) = lines
            .iter()
            .position(|line| line.contains(TIMING_DELIMITER))
        else {
            continue;
        };
        let Some((start, end)) = parse_timing_line(lines[timing_index]) else {
            continue;
        };
        let text = lines[timing_index + 1..]
            .iter()
            .map(|line| strip_tags(line))
            .collect::<Vec<String>>()
            .join("\n");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        cues.push(Cue {
            start,
            end,
            text: text.to_string(),
        });
    }

    cues.sort_by(|a, b| a.start.total_cmp(&b.start));
    Ok(cues)
}

fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (start_raw, end_raw) = line.split_once(TIMING_DELIMITER)?;
    let start = parse_timestamp(start_raw.trim())?;
    // Cue settings such as "align:start" may trail the end timestamp.
    let end = parse_timestamp(end_raw.trim().split_whitespace().next()?)?;
    (start <= end).then_some((start, end))
}

/// `HH:MM:SS.mmm` or `MM:SS.mmm`; a comma decimal separator is accepted
/// for robustness against half-converted SRT input.
fn parse_timestamp(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    let (hours, minutes, seconds_raw) = match parts.as_slice() {
        [h, m, s] => (h.trim().parse::<u32>().ok()?, m.trim().parse::<u32>().ok()?, *s),
        [m, s] => (0, m.trim().parse::<u32>().ok()?, *s),
        _ => return None,
    };
    let seconds = seconds_raw.trim().replace(',', ".").parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

/// Removes inline styling spans of the `<...>` form, keeping the text
/// between them. An unclosed tag swallows the rest of the line.
fn strip_tags(line: &str) -> String {
    let mut output = String::with_capacity(line.len());
    let mut in_tag = false;
    for ch in line.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => output.push(ch),
            _ => {}
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_parse_timestamp {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;
                assert_eq!(parse_timestamp(input), expected);
            }
        )*
        }
    }

    test_parse_timestamp! {
        timestamp_hms: ("00:01:23.500", Some(83.5)),
        timestamp_hms_comma: ("00:01:23,500", Some(83.5)),
        timestamp_ms: ("01:23.500", Some(83.5)),
        timestamp_no_fraction: ("00:00:05", Some(5.0)),
        timestamp_large_hours: ("10:00:00.000", Some(36000.0)),
        timestamp_single_part: ("42", None),
        timestamp_empty: ("", None),
        timestamp_alpha: ("aa:bb:cc", None),
        timestamp_negative_seconds: ("00:00:-5", None),
    }

    fn doc(body: &str) -> String {
        format!("WEBVTT\n\n{body}")
    }

    #[test]
    fn missing_header_is_an_error() {
        let result = parse("00:00:01.000 --> 00:00:04.000\nHello\n");
        assert_eq!(result, Err(VttError::MissingHeader));
    }

    #[test]
    fn bom_before_the_header_is_tolerated() {
        let cues = parse("\u{feff}WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHello\n").unwrap();
        assert_eq!(cues.len(), 1);
    }

    #[test]
    fn header_only_document_yields_no_cues() {
        assert_eq!(parse("WEBVTT\n"), Ok(Vec::new()));
        assert_eq!(parse("WEBVTT"), Ok(Vec::new()));
    }

    #[test]
    fn body_without_any_timing_line_is_malformed() {
        let result = parse(&doc("this is prose\nnot subtitles\n"));
        assert_eq!(result, Err(VttError::MalformedStructure));
    }

    #[test]
    fn parses_a_basic_cue() {
        let cues = parse(&doc("00:00:01.000 --> 00:00:04.000\nHello\n")).unwrap();
        assert_eq!(
            cues,
            vec![Cue {
                start: 1.0,
                end: 4.0,
                text: "Hello".to_string()
            }]
        );
    }

    #[test]
    fn cues_are_sorted_by_start_time() {
        let body = "\
00:00:10.000 --> 00:00:12.000\nsecond\n\n\
00:00:01.000 --> 00:00:04.000\nfirst\n";
        let cues = parse(&doc(body)).unwrap();
        assert_eq!(cues[0].text, "first");
        assert_eq!(cues[1].text, "second");
        assert!(cues.windows(2).all(|pair| pair[0].start <= pair[1].start));
    }

    #[test]
    fn malformed_blocks_are_skipped_not_fatal() {
        let body = "\
bad --> timing\nskipped\n\n\
00:00:04.000 --> 00:00:01.000\nreversed, skipped\n\n\
00:00:01.000 --> 00:00:04.000\nkept\n";
        let cues = parse(&doc(body)).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "kept");
    }

    #[test]
    fn cue_identifier_lines_are_ignored() {
        let cues = parse(&doc("intro-cue\n00:00:01.000 --> 00:00:04.000\nHello\n")).unwrap();
        assert_eq!(cues[0].text, "Hello");
    }

    #[test]
    fn cue_settings_after_the_end_timestamp_are_ignored() {
        let cues =
            parse(&doc("00:00:01.000 --> 00:00:04.000 align:start line:0%\nHello\n")).unwrap();
        assert_eq!(cues[0].end, 4.0);
    }

    #[test]
    fn styling_tags_are_stripped() {
        let cues = parse(&doc("00:00:01.000 --> 00:00:04.000\n<i>Hello</i> <b>there</b>\n"))
            .unwrap();
        assert_eq!(cues[0].text, "Hello there");
    }

    #[test]
    fn comma_decimals_are_accepted_in_cue_timing() {
        let cues = parse(&doc("00:00:01,500 --> 00:00:04,250\nHello\n")).unwrap();
        assert_eq!(cues[0].start, 1.5);
        assert_eq!(cues[0].end, 4.25);
    }

    #[test]
    fn activity_is_start_inclusive_end_exclusive() {
        let cue = Cue {
            start: 1.0,
            end: 4.0,
            text: "Hello".to_string(),
        };
        assert!(cue.is_active(1.0));
        assert!(cue.is_active(3.999));
        assert!(!cue.is_active(4.0));
        assert!(!cue.is_active(0.999));
    }

    #[test]
    fn active_at_finds_the_covering_cue() {
        let cues = parse(&doc(
            "00:00:01.000 --> 00:00:04.000\nfirst\n\n00:00:04.000 --> 00:00:06.000\nsecond\n",
        ))
        .unwrap();
        // End-exclusive boundary: exactly 4.0 belongs to the second cue.
        assert_eq!(active_at(&cues, 4.0).map(|c| c.text.as_str()), Some("second"));
        assert_eq!(active_at(&cues, 2.0).map(|c| c.text.as_str()), Some("first"));
        assert_eq!(active_at(&cues, 10.0), None);
    }

    #[test]
    fn parse_utf8_rejects_invalid_bytes() {
        assert_eq!(parse_utf8(b"WEBVTT\n\n\xFF\xFE"), Err(VttError::InvalidEncoding));
    }

    #[test]
    fn parse_bytes_decodes_windows_1252_text() {
        let mut bytes = b"WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nit".to_vec();
        bytes.push(0x92);
        bytes.extend_from_slice(b"s here\n");
        let cues = parse_bytes(&bytes).unwrap();
        assert_eq!(cues[0].text, "it\u{2019}s here");
    }
}
