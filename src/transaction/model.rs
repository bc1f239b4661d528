use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Value moved by a transaction. Integers stay integers on the wire
/// (`5`, not `5.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Integer(i64),
    Decimal(f64),
}

impl Amount {
    /// NaN and infinities have no JSON form and are rejected here.
    pub fn ensure_finite(self) -> Result<Self> {
        match self {
            Amount::Decimal(v) if !v.is_finite() => Err(LedgerError::Serialization(format!(
                "amount {v} is not a finite number"
            ))),
            other => Ok(other),
        }
    }
}

impl From<i64> for Amount {
    fn from(v: i64) -> Self {
        Amount::Integer(v)
    }
}

impl From<i32> for Amount {
    fn from(v: i32) -> Self {
        Amount::Integer(i64::from(v))
    }
}

impl From<u32> for Amount {
    fn from(v: u32) -> Self {
        Amount::Integer(i64::from(v))
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Amount::Decimal(v)
    }
}

/// A transfer record waiting in the pool or committed in a block.
///
/// Fields are declared in lexicographic order: the derived `Serialize`
/// output is the canonical form hashed into blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: Amount,
    pub recipient: String,
    pub sender: String,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: Amount) -> Self {
        Self {
            amount,
            recipient: recipient.into(),
            sender: sender.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Amount, Transaction};

    #[test]
    fn serializes_with_sorted_keys() {
        let tx = Transaction::new("A", "B", Amount::from(5));
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"amount":5,"recipient":"B","sender":"A"}"#);
    }

    #[test]
    fn decimal_amount_keeps_fraction() {
        let tx = Transaction::new("A", "B", Amount::from(2.5));
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"amount":2.5,"recipient":"B","sender":"A"}"#);
    }

    #[test]
    fn negative_amounts_are_allowed() {
        assert_eq!(Amount::from(-7).ensure_finite(), Ok(Amount::Integer(-7)));
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        assert!(Amount::from(f64::NAN).ensure_finite().is_err());
        assert!(Amount::from(f64::INFINITY).ensure_finite().is_err());
    }
}
