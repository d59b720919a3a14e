use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

str_enum!(Direction {
    Inflow => "inflow",
    Outflow => "outflow",
});

impl Direction {
    /// Parse the structuring service's wire value ("Entrada" / "Saída").
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "Entrada" => Some(Self::Inflow),
            "Saída" | "Saida" => Some(Self::Outflow),
            _ => None,
        }
    }
}

str_enum!(SourceKind {
    BankStatement => "bank_statement",
    Receipt => "receipt",
    CreditCardInvoice => "credit_card_invoice",
});

str_enum!(AccountKind {
    Checking => "checking",
    CreditCard => "credit_card",
    Wallet => "wallet",
    Other => "other",
});
