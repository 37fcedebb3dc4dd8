//! Bills and their line items.
//!
//! `paid_amount` and `status` are mutated only by the payment operation on
//! the store, which recomputes both inside one transaction. A plain patch
//! cannot touch them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Unpaid,
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    Paid,
}

impl BillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BillStatus::Unpaid => "Unpaid",
            BillStatus::PartiallyPaid => "Partially Paid",
            BillStatus::Paid => "Paid",
        }
    }

    /// Derive the status from amounts: paid >= total is Paid, a positive
    /// partial amount is Partially Paid, zero is Unpaid.
    pub fn from_amounts(paid: f64, total: f64) -> BillStatus {
        if paid >= total {
            BillStatus::Paid
        } else if paid > 0.0 {
            BillStatus::PartiallyPaid
        } else {
            BillStatus::Unpaid
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(BillStatus::Unpaid),
            "Partially Paid" => Ok(BillStatus::PartiallyPaid),
            "Paid" => Ok(BillStatus::Paid),
            other => Err(format!("invalid bill status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub description: String,
    pub quantity: u32,
    pub rate: f64,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BillItemInsert {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: u32,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub date: NaiveDate,
    pub subtotal: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: BillStatus,
    pub items: Vec<BillItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BillInsert {
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub date: NaiveDate,
    pub subtotal: f64,
    pub discount: f64,
    #[validate(range(min = 0.0, message = "Total must not be negative"))]
    pub total_amount: f64,
    #[serde(default)]
    #[validate]
    pub items: Vec<BillItemInsert>,
}

/// Patch shape for a bill. Money state is out of reach: payments go through
/// the payment operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Payment {
    #[validate(range(min = 0.01, message = "Payment amount must be positive"))]
    pub amount: f64,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    pub transaction_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, 1000.0, BillStatus::Unpaid)]
    #[test_case(400.0, 1000.0, BillStatus::PartiallyPaid)]
    #[test_case(1000.0, 1000.0, BillStatus::Paid)]
    #[test_case(1200.0, 1000.0, BillStatus::Paid)]
    fn status_from_amounts(paid: f64, total: f64, expected: BillStatus) {
        assert_eq!(BillStatus::from_amounts(paid, total), expected);
    }

    #[test]
    fn partially_paid_wire_string() {
        let json = serde_json::to_string(&BillStatus::PartiallyPaid).unwrap();
        assert_eq!(json, "\"Partially Paid\"");
        assert_eq!("Partially Paid".parse::<BillStatus>(), Ok(BillStatus::PartiallyPaid));
    }
}
