//! Business-level classification of webservice responses.
//!
//! A response that arrived fine at the transport level can still carry a
//! rejection. Classification looks for the status reason (`xMotivo`) and the
//! protocol envelope (`infProt`) anywhere in the converted tree and decides
//! between [`Classification::Accepted`] and [`Classification::Rejected`].
//!
//! # Rejection heuristic
//!
//! A reason counts as a rejection when it contains `"Rejeição"` or
//! `"Rejeicao"` (case-sensitive substring). This is what the state services
//! emit, but any unrelated text containing those words will also be
//! classified as rejected.

use serde::Serialize;

use crate::error::{RejectionError, TreeError};
use crate::tree::Node;
use crate::xml::to_tree;

/// Field holding the status reason text.
pub const REASON_FIELD: &str = "xMotivo";

/// Field holding the protocol envelope.
pub const PROTOCOL_FIELD: &str = "infProt";

const REJECTION_MARKERS: [&str; 2] = ["Rejeição", "Rejeicao"];

/// Whether a reason text signals a rejection.
#[must_use]
pub fn is_rejection(reason: &str) -> bool {
    REJECTION_MARKERS
        .iter()
        .any(|marker| reason.contains(marker))
}

// ---------------------------------------------------------------------------
// ProtocolEnvelope
// ---------------------------------------------------------------------------

/// Acknowledgment data returned with a processed document (`infProt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProtocolEnvelope {
    node: Node,
}

impl ProtocolEnvelope {
    #[must_use]
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    /// The raw envelope subtree.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.node.get(name).and_then(Node::text)
    }

    /// Status reason of this protocol (`xMotivo`).
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.field(REASON_FIELD)
    }

    /// Protocol number (`nProt`).
    #[must_use]
    pub fn protocol_number(&self) -> Option<&str> {
        self.field("nProt")
    }

    /// Status code (`cStat`).
    #[must_use]
    pub fn status_code(&self) -> Option<&str> {
        self.field("cStat")
    }

    /// Access key of the document (`chNFe`).
    #[must_use]
    pub fn access_key(&self) -> Option<&str> {
        self.field("chNFe")
    }

    /// Receipt timestamp (`dhRecbto`).
    #[must_use]
    pub fn received_at(&self) -> Option<&str> {
        self.field("dhRecbto")
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A response tree with the fields classification derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedResponse {
    pub tree: Node,
    /// First `xMotivo` found (outermost wins).
    pub reason: Option<String>,
    /// First `infProt` found.
    pub protocol: Option<ProtocolEnvelope>,
}

/// Outcome of classifying a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted(ClassifiedResponse),
    Rejected {
        /// The reason text that matched the rejection heuristic.
        reason: String,
        response: ClassifiedResponse,
    },
}

impl Classification {
    /// The classified response, whatever the outcome.
    #[must_use]
    pub fn response(&self) -> &ClassifiedResponse {
        match self {
            Self::Accepted(response) | Self::Rejected { response, .. } => response,
        }
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Turns a rejection into an error, for call sites that propagate with `?`.
    ///
    /// # Errors
    ///
    /// Returns `RejectionError` carrying the reason text of a rejected response.
    pub fn into_result(self) -> Result<ClassifiedResponse, RejectionError> {
        match self {
            Self::Accepted(response) => Ok(response),
            Self::Rejected { reason, .. } => Err(RejectionError { reason }),
        }
    }
}

/// Classifies an already converted response tree.
#[must_use]
pub fn classify_tree(tree: Node) -> Classification {
    let reason = tree.find_text(REASON_FIELD).map(str::to_owned);
    let protocol = tree.find(PROTOCOL_FIELD).map(|node| {
        let first = match node {
            Node::Sequence(items) => items.first().cloned().unwrap_or_else(Node::mapping),
            other => other.clone(),
        };
        ProtocolEnvelope::new(first)
    });

    let rejection = match (&reason, &protocol) {
        (Some(reason), _) if is_rejection(reason) => Some(reason.clone()),
        (_, Some(envelope)) => envelope
            .reason()
            .filter(|nested| is_rejection(nested))
            .map(str::to_owned),
        _ => None,
    };

    let response = ClassifiedResponse {
        tree,
        reason,
        protocol,
    };
    match rejection {
        Some(reason) => Classification::Rejected { reason, response },
        None => Classification::Accepted(response),
    }
}

/// Converts and classifies raw response XML.
///
/// # Errors
///
/// Returns `TreeError::Parse` if `xml` is malformed.
pub fn classify(xml: &str) -> Result<Classification, TreeError> {
    Ok(classify_tree(to_tree(xml)?))
}

// ---------------------------------------------------------------------------
// Receipt extraction
// ---------------------------------------------------------------------------

/// Identifiers returned by an authorization submission or its polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Batch receipt number (`nRec`), used to poll for the result.
    pub receipt_number: Option<String>,
    /// Authorization protocols (`protNFe`), one per document.
    pub protocols: Vec<Node>,
}

/// Extracts the receipt number and authorization protocols from a response.
#[must_use]
pub fn extract_receipt(tree: &Node) -> Receipt {
    let protocols = match tree.find("protNFe") {
        Some(Node::Sequence(items)) => items.clone(),
        Some(node) => vec![node.clone()],
        None => Vec::new(),
    };
    Receipt {
        receipt_number: tree.find_text("nRec").map(str::to_owned),
        protocols,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHORIZED: &str = r#"<retConsSitNFe versao="4.00">
        <cStat>100</cStat>
        <xMotivo>Autorizado o uso da NF-e</xMotivo>
        <protNFe versao="4.00">
          <infProt>
            <chNFe>35230112345678000190550010000000011000000010</chNFe>
            <dhRecbto>2023-01-10T10:00:00-03:00</dhRecbto>
            <nProt>135230000000001</nProt>
            <cStat>100</cStat>
            <xMotivo>Autorizado o uso da NF-e</xMotivo>
          </infProt>
        </protNFe>
      </retConsSitNFe>"#;

    #[test]
    fn rejection_reason_yields_rejected() {
        let outcome =
            classify("<retEnviNFe><cStat>204</cStat><xMotivo>Rejeição: duplicidade</xMotivo></retEnviNFe>")
                .unwrap();
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Rejeição: duplicidade");
    }

    #[test]
    fn unaccented_spelling_is_also_rejection() {
        let outcome = classify("<r><xMotivo>Rejeicao: CNPJ invalido</xMotivo></r>").unwrap();
        assert!(outcome.is_rejected());
    }

    #[test]
    fn heuristic_is_case_sensitive() {
        assert!(!is_rejection("rejeição em minúsculas"));
        assert!(!is_rejection("REJEICAO"));
        assert!(is_rejection("Lote processado. Rejeicao parcial"));
    }

    #[test]
    fn authorized_protocol_is_accepted() {
        let outcome = classify(AUTHORIZED).unwrap();
        assert!(!outcome.is_rejected());
        let response = outcome.into_result().unwrap();
        assert_eq!(response.reason.as_deref(), Some("Autorizado o uso da NF-e"));
        let envelope = response.protocol.unwrap();
        assert_eq!(envelope.protocol_number(), Some("135230000000001"));
        assert_eq!(envelope.status_code(), Some("100"));
        assert_eq!(
            envelope.access_key(),
            Some("35230112345678000190550010000000011000000010")
        );
        assert_eq!(envelope.received_at(), Some("2023-01-10T10:00:00-03:00"));
    }

    #[test]
    fn protocol_without_outer_reason() {
        let outcome =
            classify("<r><protNFe><infProt><nProt>1</nProt></infProt></protNFe></r>").unwrap();
        let response = outcome.into_result().unwrap();
        assert!(response.reason.is_none());
        assert_eq!(response.protocol.unwrap().protocol_number(), Some("1"));
    }

    #[test]
    fn nested_protocol_rejection_carries_nested_reason() {
        let outcome = classify(
            "<r><xMotivo>Lote processado</xMotivo><protNFe><infProt>\
             <cStat>539</cStat><xMotivo>Rejeição: Duplicidade de NF-e</xMotivo>\
             </infProt></protNFe></r>",
        )
        .unwrap();
        match outcome {
            Classification::Rejected { reason, response } => {
                assert_eq!(reason, "Rejeição: Duplicidade de NF-e");
                assert_eq!(response.reason.as_deref(), Some("Lote processado"));
            }
            Classification::Accepted(_) => panic!("expected rejection"),
        }
    }

    #[test]
    fn envelope_without_reason_is_not_rejection() {
        let outcome = classify(
            "<r><xMotivo>Lote processado</xMotivo><protNFe><infProt><nProt>1</nProt></infProt></protNFe></r>",
        )
        .unwrap();
        assert!(!outcome.is_rejected());
        assert!(outcome.response().protocol.as_ref().unwrap().reason().is_none());
    }

    #[test]
    fn scalar_envelope_is_not_rejection() {
        let outcome = classify("<r><infProt>texto</infProt></r>").unwrap();
        assert!(!outcome.is_rejected());
        assert!(outcome.response().protocol.is_some());
    }

    #[test]
    fn response_without_fields_is_accepted() {
        let outcome = classify("<r><cStat>107</cStat></r>").unwrap();
        let response = outcome.into_result().unwrap();
        assert!(response.reason.is_none());
        assert!(response.protocol.is_none());
    }

    #[test]
    fn malformed_xml_is_tree_error() {
        assert!(classify("<r><xMotivo>").is_err());
    }

    #[test]
    fn extracts_receipt_number() {
        let tree = to_tree(
            "<retEnviNFe><cStat>103</cStat><infRec><nRec>351000012345678</nRec></infRec></retEnviNFe>",
        )
        .unwrap();
        let receipt = extract_receipt(&tree);
        assert_eq!(receipt.receipt_number.as_deref(), Some("351000012345678"));
        assert!(receipt.protocols.is_empty());
    }

    #[test]
    fn extracts_every_protocol() {
        let tree = to_tree(
            "<retConsReciNFe><nRec>1</nRec>\
             <protNFe><infProt><nProt>A</nProt></infProt></protNFe>\
             <protNFe><infProt><nProt>B</nProt></infProt></protNFe>\
             </retConsReciNFe>",
        )
        .unwrap();
        let receipt = extract_receipt(&tree);
        assert_eq!(receipt.protocols.len(), 2);
        assert_eq!(receipt.protocols[1].find_text("nProt"), Some("B"));
    }
}
