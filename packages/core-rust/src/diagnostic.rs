//! Normalization of raw schema-validator messages into user-facing text.

use std::sync::LazyLock;

use regex::Regex;

/// libxml-style diagnostic: `[error] <code>: <description> (<line>:<column>)`.
static DIAGNOSTIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[error\]\s(.+?):\s(.+?)\s\((\d+):(\d+)\)").expect("diagnostic pattern is valid")
});

/// Rewrites a validator message into the fixed Portuguese format shown to
/// users. Messages that do not follow the expected pattern are kept verbatim
/// behind a generic prefix.
#[must_use]
pub fn normalize(raw: &str) -> String {
    match DIAGNOSTIC_RE.captures(raw) {
        Some(caps) => format!(
            "Erro na Validação do XML: {} na linha {}, coluna {}. Descrição: {}",
            &caps[1], &caps[3], &caps[4], &caps[2]
        ),
        None => format!("Erro Não Identificado na Validação do XML: {raw}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_matching_message() {
        assert_eq!(
            normalize("[error] E001: bad element (12:5)"),
            "Erro na Validação do XML: E001 na linha 12, coluna 5. Descrição: bad element"
        );
    }

    #[test]
    fn description_may_contain_colons() {
        assert_eq!(
            normalize("[error] cvc-complex-type.2.4.a: Invalid content: 'cUF' expected (1:120)"),
            "Erro na Validação do XML: cvc-complex-type.2.4.a na linha 1, coluna 120. \
             Descrição: Invalid content: 'cUF' expected"
        );
    }

    #[test]
    fn unmatched_message_is_kept_verbatim() {
        assert_eq!(
            normalize("schema not found"),
            "Erro Não Identificado na Validação do XML: schema not found"
        );
    }

    #[test]
    fn missing_position_does_not_match() {
        assert!(normalize("[error] E002: no position").starts_with("Erro Não Identificado"));
    }
}
