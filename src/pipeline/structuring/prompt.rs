use crate::models::{CategoryCatalog, SourceKind};

/// Builds one prompt per chunk: the document-kind instructions, the category
/// catalog, the user's name, the current year, and the chunk text itself.
pub struct PromptBuilder<'a> {
    catalog: &'a CategoryCatalog,
    user_name: &'a str,
    year: i32,
}

const STATEMENT_INSTRUCTIONS: &str = r#"TAREFA: Analise o texto de um extrato bancário e converta as transações em um objeto JSON. Seja extremamente rigoroso.

REGRAS:
1. Sua resposta deve ser APENAS o código JSON, sem explicações ou saudações.
2. IGNORE linhas de saldo, limites e informações de cabeçalho. Foque apenas na lista de transações.
3. Use a descrição para definir o `tipo_transacao`:
   - "Entrada": PIX recebido, TED recebida, Depósito, Salário, Rendimento, Estorno recebido.
   - "Saída": PIX enviado, TED enviada, Pagamento de Boleto, Compra no Débito, Saque, Tarifa.
4. Se o ano não for explícito na data, use o ano atual."#;

const INVOICE_INSTRUCTIONS: &str = r#"TAREFA: Analise o texto de uma fatura de cartão de crédito e converta os lançamentos em um objeto JSON.

REGRAS:
1. Sua resposta deve ser APENAS o código JSON, sem explicações ou saudações.
2. IGNORE totais, limites, encargos informativos e pagamentos de fatura anterior.
3. Todo lançamento de fatura é uma despesa: `tipo_transacao` é sempre "Saída".
4. Identifique também o nome do cartão (`nome_cartao_sugerido`) e a data de
   vencimento da fatura (`vencimento_fatura_sugerido`, formato DD/MM/AAAA).
5. Se o ano não for explícito na data de um lançamento, use o ano atual."#;

const RECEIPT_INSTRUCTIONS: &str = r#"TAREFA: Analise o texto de um cupom fiscal ou comprovante e extraia a transação em um objeto JSON.

REGRAS:
1. Sua resposta deve ser APENAS o código JSON, sem explicações ou saudações.
2. `documento_fiscal`: CNPJ/CPF do estabelecimento (apenas números).
3. `descricao`: o nome do estabelecimento.
4. `data` e `hora`: data (DD/MM/AAAA) e hora (HH:MM:SS) da transação.
5. `itens`: lista de objetos com `nome_item`, `quantidade`, `valor_unitario`.
   Para comprovantes sem itens detalhados, retorne [].
6. Compras em estabelecimentos são sempre "Saída"."#;

impl<'a> PromptBuilder<'a> {
    pub fn new(catalog: &'a CategoryCatalog, user_name: &'a str, year: i32) -> Self {
        Self { catalog, user_name, year }
    }

    pub fn build(&self, kind: SourceKind, chunk_text: &str) -> String {
        let instructions = match kind {
            SourceKind::BankStatement => STATEMENT_INSTRUCTIONS,
            SourceKind::CreditCardInvoice => INVOICE_INSTRUCTIONS,
            SourceKind::Receipt => RECEIPT_INSTRUCTIONS,
        };

        format!(
            r#"{instructions}

USUÁRIO: {user}
ANO ATUAL: {year}

CATEGORIAS DISPONÍVEIS (use exatamente estes nomes):
{catalog}

FORMATO DA SAÍDA JSON (OBRIGATÓRIO):
{{
  "transacoes": [
    {{
      "data": "DD/MM/AAAA",
      "descricao": "DESCRIÇÃO COMPLETA DA TRANSAÇÃO",
      "valor": VALOR_NUMERICO_FLOAT,
      "tipo_transacao": "Entrada ou Saída",
      "categoria_sugerida": "Nome da Categoria",
      "subcategoria_sugerida": "Nome da Subcategoria"
    }}
  ]
}}

TEXTO PARA ANÁLISE:
{chunk}"#,
            instructions = instructions,
            user = self.user_name,
            year = self.year,
            catalog = self.catalog_lines(),
            chunk = chunk_text,
        )
    }

    /// One line per category: `- Nome: (sub1, sub2, ...)`.
    fn catalog_lines(&self) -> String {
        self.catalog
            .categories()
            .iter()
            .map(|c| {
                let subs: Vec<&str> =
                    c.subcategories.iter().map(|s| s.name.as_str()).collect();
                format!("- {}: ({})", c.name, subs.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
