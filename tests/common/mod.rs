// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use glledger::application::JournalEntryReadService;
use glledger::domain::{MicroUnits, to_micro_units};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(JournalEntryReadService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = JournalEntryReadService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Helper to convert a test amount into stored micro-units
pub fn micro(amount: f64) -> MicroUnits {
    to_micro_units(Decimal::try_from(amount).unwrap()).unwrap()
}

/// Test fixture: reference data shared by the journal-entry tests.
///
/// - offices 1 "Head Office" and 2 "Branch"
/// - user 1 "admin", currency USD
/// - GL accounts 1 "Cash" (1000), 2 "Loan Portfolio" (1100), 3 "Interest Income" (4000)
/// - client 1 "Jane Doe" (F-001) with active loan 1 (000000001)
/// - loan transaction 1: repayment of 100 paid in cash (receipt R-1) with a note
/// - savings transaction 1: deposit of 50
pub struct StandardLedger;

impl StandardLedger {
    pub async fn seed(service: &JournalEntryReadService) -> Result<()> {
        sqlx::query(
            "INSERT INTO m_office (id, name, opening_date) VALUES
                (1, 'Head Office', '2020-01-01'),
                (2, 'Branch', '2021-06-01');
             INSERT INTO m_appuser (id, username, firstname, lastname) VALUES (1, 'admin', 'App', 'Admin');
             INSERT INTO m_currency (id, code, decimal_places, currency_multiplesof, display_symbol, name, internationalized_name_code)
                VALUES (1, 'USD', 2, 1, '$', 'US Dollar', 'currency.USD');
             INSERT INTO acc_gl_account (id, name, gl_code, classification_enum, currency_code) VALUES
                (1, 'Cash', '1000', 1, 'USD'),
                (2, 'Loan Portfolio', '1100', 1, 'USD'),
                (3, 'Interest Income', '4000', 4, 'USD');
             INSERT INTO m_client (id, display_name, external_id) VALUES (1, 'Jane Doe', 'F-001');
             INSERT INTO m_loan (id, account_no, client_id, loan_status_id) VALUES (1, '000000001', 1, 300);
             INSERT INTO r_enum_value (enum_name, enum_id, enum_message_property, enum_value)
                VALUES ('loan_status_id', 300, 'loanStatusType.active', 'Active');
             INSERT INTO m_code_value (id, code_id, code_value) VALUES (1, 1, 'Cash');
             INSERT INTO m_payment_detail (id, payment_type_cv_id, receipt_number) VALUES (1, 1, 'R-1');
             INSERT INTO m_loan_transaction (id, loan_id, payment_detail_id, is_reversed, transaction_type_enum, transaction_date, amount)
                VALUES (1, 1, 1, 0, 2, '2024-01-15', 100000000);
             INSERT INTO m_savings_account_transaction (id, savings_account_id, is_reversed, transaction_type_enum, transaction_date, amount)
                VALUES (1, 1, 0, 1, '2024-02-01', 50000000);
             INSERT INTO m_note (id, loan_transaction_id, note) VALUES (1, 1, 'First repayment');",
        )
        .execute(service.repository().pool())
        .await?;
        Ok(())
    }
}

/// A journal entry row to insert. Start from [`EntryFixture::new`] and
/// override fields as needed.
#[derive(Debug, Clone)]
pub struct EntryFixture {
    pub account_id: i64,
    pub office_id: i64,
    pub transaction_id: String,
    pub entry_date: String,
    pub type_enum: i64,
    pub amount: MicroUnits,
    pub entity_type: Option<i64>,
    pub entity_id: Option<i64>,
    pub loan_transaction_id: Option<i64>,
    pub savings_transaction_id: Option<i64>,
    pub reversal_id: Option<i64>,
    pub manual_entry: bool,
    pub reversed: bool,
    pub unidentified_entry: bool,
    pub profit: bool,
    pub description: Option<String>,
    pub running_balance_calculated: bool,
    pub office_running_balance: MicroUnits,
    pub organization_running_balance: MicroUnits,
}

impl EntryFixture {
    /// A credit to the cash account in the head office.
    pub fn new(transaction_id: &str, entry_date: &str, amount: f64) -> Self {
        Self {
            account_id: 1,
            office_id: 1,
            transaction_id: transaction_id.to_string(),
            entry_date: entry_date.to_string(),
            type_enum: 1,
            amount: micro(amount),
            entity_type: None,
            entity_id: None,
            loan_transaction_id: None,
            savings_transaction_id: None,
            reversal_id: None,
            manual_entry: false,
            reversed: false,
            unidentified_entry: false,
            profit: false,
            description: None,
            running_balance_calculated: false,
            office_running_balance: 0,
            organization_running_balance: 0,
        }
    }

    pub fn debit(mut self) -> Self {
        self.type_enum = 2;
        self
    }

    pub fn account(mut self, account_id: i64) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn office(mut self, office_id: i64) -> Self {
        self.office_id = office_id;
        self
    }

    pub fn manual(mut self) -> Self {
        self.manual_entry = true;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Entry generated for loan 1 through the given loan transaction.
    pub fn for_loan(mut self, loan_transaction_id: i64) -> Self {
        self.entity_type = Some(1);
        self.entity_id = Some(1);
        self.loan_transaction_id = Some(loan_transaction_id);
        self
    }

    /// Entry generated for savings account 1 through the given transaction.
    pub fn for_savings(mut self, savings_transaction_id: i64) -> Self {
        self.entity_type = Some(2);
        self.entity_id = Some(1);
        self.savings_transaction_id = Some(savings_transaction_id);
        self
    }

    pub async fn insert(&self, service: &JournalEntryReadService) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO acc_gl_journal_entry (
                account_id, office_id, reversal_id, currency_code, transaction_id,
                loan_transaction_id, savings_transaction_id, reversed, manual_entry,
                entry_date, type_enum, amount, description, entity_type_enum, entity_id,
                createdby_id, created_date, is_running_balance_calculated,
                office_running_balance, organization_running_balance,
                unidentified_entry, profit
            ) VALUES (?, ?, ?, 'USD', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?, ?)",
        )
        .bind(self.account_id)
        .bind(self.office_id)
        .bind(self.reversal_id)
        .bind(self.transaction_id.as_str())
        .bind(self.loan_transaction_id)
        .bind(self.savings_transaction_id)
        .bind(self.reversed)
        .bind(self.manual_entry)
        .bind(self.entry_date.as_str())
        .bind(self.type_enum)
        .bind(self.amount)
        .bind(self.description.as_deref())
        .bind(self.entity_type)
        .bind(self.entity_id)
        .bind(format!("{} 09:30:00", self.entry_date))
        .bind(self.running_balance_calculated)
        .bind(self.office_running_balance)
        .bind(self.organization_running_balance)
        .bind(self.unidentified_entry)
        .bind(self.profit)
        .execute(service.repository().pool())
        .await?;
        Ok(result.last_insert_rowid())
    }
}

/// Insert a loan transaction against loan 1 that matches journal entries
/// carrying `related_transaction_id`.
pub async fn insert_related_loan_transaction(
    service: &JournalEntryReadService,
    id: i64,
    related_transaction_id: &str,
    is_reversed: bool,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO m_loan_transaction (id, loan_id, is_reversed, transaction_type_enum, transaction_date, amount, related_transaction_id)
         VALUES (?, 1, ?, 2, '2024-03-01', 75000000, ?)",
    )
    .bind(id)
    .bind(is_reversed)
    .bind(related_transaction_id)
    .execute(service.repository().pool())
    .await?;
    Ok(())
}
