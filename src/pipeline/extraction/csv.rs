use super::encoding::decode_chain;
use super::types::CsvRow;
use super::ExtractionError;

const CANDIDATE_DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];
const SNIFF_LINES: usize = 5;

/// Decode and parse a CSV export into field-map rows. Rows without both a
/// date-like and an amount-like value are dropped; header-only or empty
/// files come back as an empty vec.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<CsvRow>, ExtractionError> {
    let text = decode_chain(bytes);
    let delimiter = sniff_delimiter(&text);
    let (body, skipped) = skip_preamble(&text, delimiter);

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ExtractionError::Decode(format!("CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line = skipped + i + 2, error = %e, "skipping malformed CSV record");
                continue;
            }
        };
        let fields: Vec<(String, String)> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.trim().to_string()))
            .collect();
        let row = CsvRow { line: skipped + i + 2, fields };
        if has_date_and_amount(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Pick the delimiter with the highest column count summed over the first
/// few non-empty lines. Brazilian bank exports favor `;`.
fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = (b';', 0usize);
    for &delim in &CANDIDATE_DELIMITERS {
        let columns: usize = sample.iter().map(|l| l.split(delim as char).count()).sum();
        if columns > best.1 {
            best = (delim, columns);
        }
    }
    best.0
}

/// Some exports open with a title or account line before the header. The
/// header is taken to be the first line the delimiter actually splits;
/// returns the remaining text and the number of lines dropped.
fn skip_preamble(text: &str, delimiter: u8) -> (&str, usize) {
    let delim = delimiter as char;
    let mut offset = 0;
    let mut skipped = 0;
    for line in text.split_inclusive('\n') {
        if line.contains(delim) {
            break;
        }
        offset += line.len();
        skipped += 1;
    }
    (&text[offset..], skipped)
}

fn has_date_and_amount(row: &CsvRow) -> bool {
    let has_date = row.has_field_like("data") || row.has_field_like("date");
    let has_amount =
        row.has_field_like("valor") || row.has_field_like("amount") || row.has_field_like("value");
    has_date && has_amount
}
