//! The three-state formula text scanner
//!
//! Splits formula text into string literals, candidate reference tokens, and
//! the delimiter runs between them, without building a formula AST. The
//! scanner has three states: normal text, inside a double-quoted string
//! literal (`""` escapes a quote and does not terminate), and inside a
//! single-quoted sheet name (`''` likewise). Everything the rewrite rules do
//! is driven by this segmentation: tokens are tried as addresses, all other
//! segments pass through untouched.

/// One segment of a scanned formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A candidate reference/identifier token; may embed a quoted sheet name
    Token(&'a str),
    /// A double-quoted string literal, quotes included
    StringLiteral(&'a str),
    /// Operators, separators and whitespace between tokens
    Delimiter(&'a str),
}

impl<'a> Segment<'a> {
    /// The raw text of the segment
    pub fn text(&self) -> &'a str {
        match *self {
            Segment::Token(s) | Segment::StringLiteral(s) | Segment::Delimiter(s) => s,
        }
    }
}

/// Characters that can appear in a reference token outside quoted spans
///
/// Covers cell coordinates with `$` markers, `Sheet!` qualifiers, range
/// colons, `[n]` workbook brackets, structured-reference brackets with `#`
/// and `@` specifiers, and identifier characters.
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(c, '_' | '$' | '!' | ':' | '.' | '#' | '[' | ']' | '@')
}

/// Scan a formula into segments
///
/// The concatenation of all segment texts is always exactly the input;
/// unterminated literals or quoted names simply run to the end of the text
/// (best effort, never an error).
pub fn scan(formula: &str) -> Vec<Segment<'_>> {
    #[derive(PartialEq, Eq, Clone, Copy)]
    enum Run {
        Token,
        Delimiter,
    }

    let mut segments = Vec::new();
    let mut run: Option<Run> = None;
    let mut run_start = 0;
    let mut chars = formula.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '"' {
            if let Some(kind) = run.take() {
                let text = &formula[run_start..i];
                segments.push(match kind {
                    Run::Token => Segment::Token(text),
                    Run::Delimiter => Segment::Delimiter(text),
                });
            }
            let mut end = formula.len();
            while let Some((j, d)) = chars.next() {
                if d == '"' {
                    if matches!(chars.peek(), Some((_, '"'))) {
                        chars.next();
                    } else {
                        end = j + 1;
                        break;
                    }
                }
            }
            segments.push(Segment::StringLiteral(&formula[i..end]));
            run_start = end;
            continue;
        }

        if c == '\'' {
            // A quoted sheet name belongs to the surrounding token.
            if run == Some(Run::Delimiter) {
                segments.push(Segment::Delimiter(&formula[run_start..i]));
                run = None;
            }
            if run.is_none() {
                run = Some(Run::Token);
                run_start = i;
            }
            while let Some((_, d)) = chars.next() {
                if d == '\'' {
                    if matches!(chars.peek(), Some((_, '\''))) {
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            continue;
        }

        let kind = if is_token_char(c) {
            Run::Token
        } else {
            Run::Delimiter
        };
        match run {
            Some(current) if current == kind => {}
            Some(current) => {
                let text = &formula[run_start..i];
                segments.push(match current {
                    Run::Token => Segment::Token(text),
                    Run::Delimiter => Segment::Delimiter(text),
                });
                run = Some(kind);
                run_start = i;
            }
            None => {
                run = Some(kind);
                run_start = i;
            }
        }
    }

    if let Some(kind) = run {
        let text = &formula[run_start..];
        segments.push(match kind {
            Run::Token => Segment::Token(text),
            Run::Delimiter => Segment::Delimiter(text),
        });
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(formula: &str) -> Vec<String> {
        scan(formula).iter().map(|s| s.text().to_string()).collect()
    }

    #[test]
    fn test_segments_reassemble_to_input() {
        for formula in [
            "=SUM(A1:B3)+Sheet1!C4",
            "=\"Hello,\"\" World\"&\"!\"",
            "='My Sheet'!$A$1*2",
            "=IF(A1>0,\"yes\",'Old''s'!B2)",
            "",
            "=\"unterminated",
            "='unterminated!A1",
        ] {
            assert_eq!(texts(formula).concat(), formula, "{:?}", formula);
        }
    }

    #[test]
    fn test_token_and_delimiter_split() {
        let segments = scan("=SUM(A1:B3)+C4");
        assert_eq!(
            segments,
            vec![
                Segment::Delimiter("="),
                Segment::Token("SUM"),
                Segment::Delimiter("("),
                Segment::Token("A1:B3"),
                Segment::Delimiter(")+"),
                Segment::Token("C4"),
            ]
        );
    }

    #[test]
    fn test_quoted_sheet_name_stays_in_token() {
        let segments = scan("5+'Old Sheet'!$G3");
        assert_eq!(
            segments,
            vec![
                Segment::Token("5"),
                Segment::Delimiter("+"),
                Segment::Token("'Old Sheet'!$G3"),
            ]
        );
    }

    #[test]
    fn test_escaped_quote_inside_sheet_name() {
        let segments = scan("'It''s here'!A1+1");
        assert_eq!(segments[0], Segment::Token("'It''s here'!A1"));
    }

    #[test]
    fn test_string_literal_with_escaped_quotes() {
        let segments = scan("\"Hello,\"\" World\"&\"!\"");
        assert_eq!(
            segments,
            vec![
                Segment::StringLiteral("\"Hello,\"\" World\""),
                Segment::Delimiter("&"),
                Segment::StringLiteral("\"!\""),
            ]
        );
    }

    #[test]
    fn test_references_inside_string_are_not_tokens() {
        let segments = scan("\"A1+B2\"&C3");
        assert_eq!(segments[0], Segment::StringLiteral("\"A1+B2\""));
        assert_eq!(segments[2], Segment::Token("C3"));
    }

    #[test]
    fn test_sheet_qualifier_and_workbook_bracket() {
        let segments = scan("[1]Data!B2+Sheet1!C3");
        assert_eq!(segments[0], Segment::Token("[1]Data!B2"));
        assert_eq!(segments[2], Segment::Token("Sheet1!C3"));
    }

    #[test]
    fn test_whitespace_is_delimiter() {
        let segments = scan("A1 , B2");
        assert_eq!(
            segments,
            vec![
                Segment::Token("A1"),
                Segment::Delimiter(" , "),
                Segment::Token("B2"),
            ]
        );
    }
}
