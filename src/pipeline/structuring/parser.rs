use super::types::ChunkPayload;
use super::StructuringError;

/// Find the first balanced `{...}` block, skipping braces inside JSON
/// strings. Models wrap their JSON in prose and markdown fences; taking the
/// first balanced object ignores all of it.
pub fn extract_json_block(raw: &str) -> Result<&str, StructuringError> {
    let start = raw.find('{').ok_or(StructuringError::NoJsonFound)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&raw[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    Err(StructuringError::NoJsonFound)
}

/// Extract and deserialize one chunk response.
pub fn parse_payload(raw: &str) -> Result<ChunkPayload, StructuringError> {
    let block = extract_json_block(raw)?;
    serde_json::from_str(block).map_err(|e| StructuringError::JsonParsing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_json_wrapped_in_prose() {
        let raw = "Claro! Aqui estão as transações:\n```json\n{\"transacoes\": []}\n```\nEspero ter ajudado.";
        assert_eq!(extract_json_block(raw).unwrap(), r#"{"transacoes": []}"#);
    }

    #[test]
    fn handles_nested_objects() {
        let raw = r#"texto {"transacoes": [{"data": "01/06/2025", "itens": [{"nome_item": "X"}]}]} fim"#;
        let block = extract_json_block(raw).unwrap();
        assert!(block.starts_with('{') && block.ends_with('}'));
        assert!(serde_json::from_str::<serde_json::Value>(block).is_ok());
    }

    #[test]
    fn braces_inside_strings_do_not_close_the_block() {
        let raw = r#"{"transacoes": [{"descricao": "LOJA {PROMO}", "valor": 10.0}]}"#;
        assert_eq!(extract_json_block(raw).unwrap(), raw);
    }

    #[test]
    fn no_object_is_an_error() {
        assert!(matches!(
            extract_json_block("não encontrei transações"),
            Err(StructuringError::NoJsonFound)
        ));
        assert!(matches!(
            extract_json_block("aberto { sem fim"),
            Err(StructuringError::NoJsonFound)
        ));
    }

    #[test]
    fn invalid_json_in_block_is_a_parse_error() {
        let err = parse_payload(r#"{"transacoes": [,]}"#).unwrap_err();
        assert!(matches!(err, StructuringError::JsonParsing(_)));
    }
}
