//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing for static files (RFC 9110 §14).

/// Inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(ByteRange),
    /// Range cannot be satisfied for this file - should return 416
    NotSatisfiable,
    /// No Range header, unsupported unit, multiple ranges or malformed:
    /// serve the full content
    None,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Examples
/// ```
/// use devgate::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 0, end: 99 }));
///
/// let result = parse_range_header(None, 1000);
/// assert_eq!(result, RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        return parse_suffix_range(end_str, file_size);
    }

    parse_standard_range(start_str, end_str, file_size)
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, file_size: u64) -> RangeParseResult {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return RangeParseResult::None;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    // Suffix larger than file selects the whole file
    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: u64) -> RangeParseResult {
    let Ok(start) = start_str.parse::<u64>() else {
        return RangeParseResult::None;
    };

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        let Ok(end) = end_str.parse::<u64>() else {
            return RangeParseResult::None;
        };
        if end < start {
            return RangeParseResult::None;
        }
        end.min(file_size - 1)
    };

    RangeParseResult::Valid(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_range() {
        let RangeParseResult::Valid(r) = parse_range_header(Some("bytes=0-9"), 100) else {
            panic!("Expected Valid");
        };
        assert_eq!(r, ByteRange { start: 0, end: 9 });
        assert_eq!(r.len(), 10);
        assert_eq!(r.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_range_and_clamped_end() {
        assert_eq!(
            parse_range_header(Some("bytes=50-"), 100),
            RangeParseResult::Valid(ByteRange { start: 50, end: 99 })
        );
        assert_eq!(
            parse_range_header(Some("bytes=90-500"), 100),
            RangeParseResult::Valid(ByteRange { start: 90, end: 99 })
        );
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            parse_range_header(Some("bytes=-20"), 100),
            RangeParseResult::Valid(ByteRange { start: 80, end: 99 })
        );
        assert_eq!(
            parse_range_header(Some("bytes=-500"), 100),
            RangeParseResult::Valid(ByteRange { start: 0, end: 99 })
        );
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(
            parse_range_header(Some("bytes=200-"), 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=-0"), 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_ignored_ranges() {
        assert_eq!(parse_range_header(None, 100), RangeParseResult::None);
        assert_eq!(
            parse_range_header(Some("bytes=a-b"), 100),
            RangeParseResult::None
        );
        assert_eq!(
            parse_range_header(Some("bytes=0-9,20-29"), 100),
            RangeParseResult::None
        );
        assert_eq!(
            parse_range_header(Some("items=0-9"), 100),
            RangeParseResult::None
        );
        assert_eq!(
            parse_range_header(Some("bytes=9-0"), 100),
            RangeParseResult::None
        );
    }
}
