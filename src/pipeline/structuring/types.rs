use serde::Deserialize;

/// One transaction as the structuring service reports it. Every field is
/// optional and loosely typed at the wire; the validator tightens them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateTransaction {
    #[serde(rename = "data", default)]
    pub date: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "valor", default)]
    pub amount: Option<serde_json::Value>,
    #[serde(rename = "tipo_transacao", default)]
    pub direction: Option<String>,
    #[serde(rename = "categoria_sugerida", default)]
    pub suggested_category: Option<String>,
    #[serde(rename = "subcategoria_sugerida", default)]
    pub suggested_subcategory: Option<String>,
    #[serde(rename = "documento_fiscal", default)]
    pub fiscal_document: Option<String>,
    #[serde(rename = "hora", default)]
    pub time: Option<String>,
    #[serde(rename = "itens", default)]
    pub items: Vec<CandidateItem>,
}

impl CandidateTransaction {
    /// The service sometimes emits amounts as strings ("1.234,56") instead
    /// of numbers; accept both.
    pub fn amount_f64(&self) -> Option<f64> {
        match self.amount.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => {
                let s = s.trim().trim_start_matches("R$").trim();
                if s.contains(',') {
                    s.replace('.', "").replace(',', ".").parse().ok()
                } else {
                    s.parse().ok()
                }
            }
            _ => None,
        }
    }
}

/// One itemized purchase line inside a receipt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateItem {
    #[serde(rename = "nome_item", default)]
    pub name: Option<String>,
    #[serde(rename = "quantidade", default)]
    pub quantity: Option<f64>,
    #[serde(rename = "valor_unitario", default)]
    pub unit_price: Option<f64>,
}

/// Full payload of one structured chunk. The extra fields only appear on
/// credit-card invoices.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkPayload {
    #[serde(rename = "transacoes", default)]
    pub transactions: Vec<CandidateTransaction>,
    #[serde(rename = "vencimento_fatura_sugerido", default)]
    pub suggested_due_date: Option<String>,
    #[serde(rename = "nome_cartao_sugerido", default)]
    pub suggested_card_name: Option<String>,
}
