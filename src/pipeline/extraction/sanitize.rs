/// Normalize one extracted line: strip characters outside letters, digits
/// and financial punctuation, then collapse runs of whitespace.
pub fn clean_line(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '('
                        | ')'
                        | '+'
                        | '='
                        | '%'
                        | '#'
                        | '@'
                        | '&'
                        | '*'
                        | '_'
                        | '$'
                        | '|'
                        | '<'
                        | '>'
                )
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a whole text block line by line, dropping lines that come out
/// empty.
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        let clean = clean_line("PIX ENVIADO\x00\x01 R$ 120,00");
        assert!(!clean.contains('\x00'));
        assert_eq!(clean, "PIX ENVIADO R$ 120,00");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_line("  05/06/2025\t\tUBER   25,50 "), "05/06/2025 UBER 25,50");
    }

    #[test]
    fn preserves_currency_and_separators() {
        let clean = clean_line("R$ 1.234,56 (estorno) 10%");
        assert_eq!(clean, "R$ 1.234,56 (estorno) 10%");
    }

    #[test]
    fn drops_lines_emptied_by_cleaning() {
        let clean = clean_text("linha um\n\x02\x03\nlinha dois");
        assert_eq!(clean, "linha um\nlinha dois");
    }
}
