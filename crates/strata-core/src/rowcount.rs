//! Affected-row count extraction from command tags.

/// Extracts the affected-row count from mutating-statement output.
///
/// The database client reports success as a trailing command tag of the form
/// `<VERB> <N>` (`DELETE 42`, `UPDATE 0`) or `INSERT <oid> <N>`. The output
/// may carry earlier lines from session-setting statements (`SET`), so lines
/// are scanned from the end. Absence of a parseable count is not an error:
/// the caller gets `0`.
#[must_use]
pub fn parse_affected_rows(output: &str) -> u64 {
    output.lines().rev().find_map(parse_command_tag).unwrap_or(0)
}

fn parse_command_tag(line: &str) -> Option<u64> {
    let mut fields = line.split_whitespace();
    let verb = fields.next()?;
    if verb.len() < 2 || !verb.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    fields.last()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_affected_rows;

    #[test]
    fn parses_delete_tag() {
        assert_eq!(parse_affected_rows("DELETE 42"), 42);
    }

    #[test]
    fn parses_zero_count() {
        assert_eq!(parse_affected_rows("DELETE 0"), 0);
    }

    #[test]
    fn parses_update_tag_with_trailing_newline() {
        assert_eq!(parse_affected_rows("UPDATE 128\n"), 128);
    }

    #[test]
    fn parses_insert_tag_with_oid_field() {
        assert_eq!(parse_affected_rows("INSERT 0 7"), 7);
    }

    #[test]
    fn skips_session_setting_lines() {
        assert_eq!(parse_affected_rows("SET\nUPDATE 31337"), 31337);
    }

    #[test]
    fn malformed_output_yields_zero() {
        assert_eq!(parse_affected_rows("done"), 0);
        assert_eq!(parse_affected_rows("DELETE many"), 0);
        assert_eq!(parse_affected_rows("DELETE"), 0);
        assert_eq!(parse_affected_rows(""), 0);
    }
}
