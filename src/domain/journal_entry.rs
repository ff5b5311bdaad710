use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EnumOption;

pub type JournalEntryId = i64;

/// Which optional sections of a journal entry should be loaded.
///
/// Each flag adds columns (and, for transaction details, joins) to the
/// generated query; unset flags leave the matching view fields empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryAssociations {
    pub running_balance: bool,
    pub transaction_details: bool,
}

impl JournalEntryAssociations {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_running_balance(mut self) -> Self {
        self.running_balance = true;
        self
    }

    pub fn with_transaction_details(mut self) -> Self {
        self.transaction_details = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyView {
    pub code: String,
    pub name: Option<String>,
    pub decimal_places: Option<i64>,
    pub in_multiples_of: Option<i64>,
    pub display_symbol: Option<String>,
    pub name_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeValue {
    pub id: i64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetail {
    /// Id of the journal entry the payment was read through.
    pub id: JournalEntryId,
    pub payment_type: CodeValue,
    pub account_number: Option<String>,
    pub check_number: Option<String>,
    pub routing_code: Option<String>,
    pub receipt_number: Option<String>,
    pub bank_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: i64,
    pub note: Option<String>,
}

/// Payment, note and transaction-type detail of the portfolio transaction
/// behind a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub transaction_id: Option<i64>,
    pub payment_details: Option<PaymentDetail>,
    pub note_data: Option<NoteView>,
    pub transaction_type: Option<EnumOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryView {
    pub id: JournalEntryId,
    pub office_id: i64,
    pub office_name: Option<String>,
    pub gl_account_name: Option<String>,
    pub gl_account_id: i64,
    pub gl_account_code: Option<String>,
    pub gl_account_type: EnumOption,
    pub transaction_date: NaiveDate,
    pub entry_type: EnumOption,
    pub amount: Decimal,
    pub exchange_rate: Option<Decimal>,
    pub transaction_id: Option<String>,
    pub manual_entry: bool,
    pub entity_type: Option<EnumOption>,
    pub entity_id: Option<i64>,
    pub created_by_user_id: i64,
    pub created_date: Option<NaiveDate>,
    pub created_by_user_name: Option<String>,
    pub comments: Option<String>,
    pub reversed: bool,
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_running_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_running_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_balance_computed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_details: Option<TransactionDetail>,
    pub currency: CurrencyView,
    pub unidentified_entry: bool,
    pub is_profit: bool,
    pub profit_transaction_id: Option<String>,
    pub used_in_loan: bool,
    pub is_reversal_entry: bool,
    pub is_transaction_reversed: bool,
}

/// Loan and client a journal entry has been matched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryAssignment {
    pub journal_id: JournalEntryId,
    pub loan_id: i64,
    pub loan_status: Option<String>,
    pub client_name: Option<String>,
    pub client_file_number: Option<String>,
    pub loan_account_number: Option<String>,
}

/// Category restriction for the grouped journal-entry count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountCategory {
    #[default]
    All,
    Reversed,
    UnidentifiedProfit,
    UnidentifiedDeposits,
}

impl CountCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountCategory::All => "all",
            CountCategory::Reversed => "reversed",
            CountCategory::UnidentifiedProfit => "unidentified_profit",
            CountCategory::UnidentifiedDeposits => "unidentified_deposits",
        }
    }

    /// Unknown categories mean no category restriction.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "reversed" => CountCategory::Reversed,
            "unidentified_profit" => CountCategory::UnidentifiedProfit,
            "unidentified_deposits" => CountCategory::UnidentifiedDeposits,
            _ => CountCategory::All,
        }
    }
}

impl std::fmt::Display for CountCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse the numeric part of a portfolio transaction id such as `L1042`.
pub fn parse_transaction_number(transaction_id: &str) -> Option<i64> {
    let mut chars = transaction_id.chars();
    chars.next()?;
    chars.as_str().trim().parse().ok()
}
