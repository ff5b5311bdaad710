use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::domain::{
    CodeValue, CurrencyView, Enumeration, GlAccountType, JournalEntryAssignment,
    JournalEntryAssociations, JournalEntryId, JournalEntryType, JournalEntryView,
    LoanTransactionType, NoteView, Page, PaymentDetail, PortfolioProductType,
    SavingsTransactionType, TransactionDetail, from_micro_units, parse_transaction_number,
};

use super::MIGRATION_001_SCHEMA;
use super::query::{
    DATE_FORMAT, JOURNAL_ENTRY_ASSIGNMENTS_SQL, JournalEntryCountQuery, JournalEntryQuery,
    SqlParam,
};

/// Read access to the general-ledger tables.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the general-ledger schema if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_SCHEMA)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================
    // Journal entries
    // ========================

    /// Fetch one page of journal entries plus the number of rows matching
    /// the query without its limit and offset.
    pub async fn find_journal_entries(
        &self,
        query: &JournalEntryQuery,
    ) -> Result<Page<JournalEntryView>> {
        let sql = query.select_sql();
        debug!(sql = %sql, params = ?query.params(), "selecting journal entries");

        let rows = bind_params(sqlx::query(&sql), query.params())
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch journal entries")?;

        let count_sql = query.count_sql();
        let total: i64 = bind_params(sqlx::query(&count_sql), query.params())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count journal entries")?
            .try_get("total")?;

        let associations = query.associations();
        let items = rows
            .iter()
            .map(|row| Self::row_to_journal_entry(row, associations))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, total))
    }

    /// Fetch the first row matching the query, if any.
    pub async fn find_journal_entry(
        &self,
        query: &JournalEntryQuery,
    ) -> Result<Option<JournalEntryView>> {
        let sql = query.select_sql();
        debug!(sql = %sql, params = ?query.params(), "selecting journal entry");

        let row = bind_params(sqlx::query(&sql), query.params())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch journal entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_journal_entry(
                &row,
                query.associations(),
            )?)),
            None => Ok(None),
        }
    }

    /// Loans and clients linked to a journal entry through its transaction id.
    pub async fn find_journal_entry_assignments(
        &self,
        journal_entry_id: JournalEntryId,
    ) -> Result<Vec<JournalEntryAssignment>> {
        let rows = sqlx::query(JOURNAL_ENTRY_ASSIGNMENTS_SQL)
            .bind(journal_entry_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch journal entry assignments")?;

        rows.iter().map(Self::row_to_assignment).collect()
    }

    /// Grouped journal-entry count.
    pub async fn count_journal_entries(&self, query: &JournalEntryCountQuery) -> Result<i64> {
        let params = query.params();
        let row = bind_params(sqlx::query(query.sql()), &params)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count journal entries")?;

        Ok(row.try_get("je_count")?)
    }

    // ========================
    // Row mapping
    // ========================

    fn row_to_journal_entry(
        row: &SqliteRow,
        associations: JournalEntryAssociations,
    ) -> Result<JournalEntryView> {
        let id: i64 = row.try_get("id")?;
        let classification: Option<i64> = row.try_get("classification")?;
        let entry_type: Option<i64> = row.try_get("entryType")?;
        let entity_type_id: Option<i64> = row.try_get("entityType")?;
        let transaction_id: Option<String> = row.try_get("transactionId")?;
        let transaction_date_str: String = row.try_get("transactionDate")?;
        let created_date_str: Option<String> = row.try_get("createdDate")?;
        let amount: i64 = row.try_get("amount")?;
        let exchange_rate: Option<i64> = row.try_get("exchangeRate")?;

        let (office_running_balance, organization_running_balance, running_balance_computed) =
            if associations.running_balance {
                let office: Option<i64> = row.try_get("officeRunningBalance")?;
                let organization: Option<i64> = row.try_get("organizationRunningBalance")?;
                let computed: Option<bool> = row.try_get("runningBalanceComputed")?;
                (
                    office.map(from_micro_units),
                    organization.map(from_micro_units),
                    Some(computed.unwrap_or(false)),
                )
            } else {
                (None, None, None)
            };

        let transaction_details = if associations.transaction_details {
            Some(Self::row_to_transaction_detail(
                row,
                id,
                entity_type_id,
                transaction_id.as_deref(),
            )?)
        } else {
            None
        };

        Ok(JournalEntryView {
            id,
            office_id: row.try_get::<Option<i64>, _>("officeId")?.unwrap_or(0),
            office_name: row.try_get("officeName")?,
            gl_account_name: row.try_get("glAccountName")?,
            gl_account_id: row.try_get::<Option<i64>, _>("glAccountId")?.unwrap_or(0),
            gl_account_code: row.try_get("glAccountCode")?,
            gl_account_type: GlAccountType::option_for(classification.unwrap_or(0)),
            transaction_date: parse_date(&transaction_date_str).context("Invalid entry_date")?,
            entry_type: JournalEntryType::option_for(entry_type.unwrap_or(0)),
            amount: from_micro_units(amount),
            exchange_rate: exchange_rate.map(from_micro_units),
            transaction_id,
            manual_entry: flag(row, "manualEntry")?,
            entity_type: entity_type_id.map(PortfolioProductType::option_for),
            entity_id: row.try_get("entityId")?,
            created_by_user_id: row
                .try_get::<Option<i64>, _>("createdByUserId")?
                .unwrap_or(0),
            created_date: created_date_str
                .as_deref()
                .map(parse_date)
                .transpose()
                .context("Invalid created_date")?,
            created_by_user_name: row.try_get("createdByUserName")?,
            comments: row.try_get("comments")?,
            reversed: flag(row, "reversed")?,
            reference_number: row.try_get("referenceNumber")?,
            office_running_balance,
            organization_running_balance,
            running_balance_computed,
            transaction_details,
            currency: CurrencyView {
                code: row.try_get("currencyCode")?,
                name: row.try_get("currencyName")?,
                decimal_places: row.try_get("currencyDigits")?,
                in_multiples_of: row.try_get("inMultiplesOf")?,
                display_symbol: row.try_get("currencyDisplaySymbol")?,
                name_code: row.try_get("currencyNameCode")?,
            },
            unidentified_entry: flag(row, "unidentifiedEntry")?,
            is_profit: flag(row, "isProfit")?,
            profit_transaction_id: row.try_get("profitTransactionId")?,
            used_in_loan: flag(row, "usedInLoan")?,
            is_reversal_entry: flag(row, "isReversalEntry")?,
            is_transaction_reversed: flag(row, "isTransactionReversed")?,
        })
    }

    fn row_to_transaction_detail(
        row: &SqliteRow,
        journal_entry_id: JournalEntryId,
        entity_type_id: Option<i64>,
        transaction_id: Option<&str>,
    ) -> Result<TransactionDetail> {
        let payment_type_id: Option<i64> = row.try_get("paymentTypeId")?;
        let payment_details = match payment_type_id {
            Some(type_id) => Some(PaymentDetail {
                id: journal_entry_id,
                payment_type: CodeValue {
                    id: type_id,
                    name: row.try_get("paymentTypeName")?,
                },
                account_number: row.try_get("accountNumber")?,
                check_number: row.try_get("checkNumber")?,
                routing_code: row.try_get("routingCode")?,
                receipt_number: row.try_get("receiptNumber")?,
                bank_number: row.try_get("bankNumber")?,
            }),
            None => None,
        };

        let note_id: Option<i64> = row.try_get("noteId")?;
        let note_data = match note_id {
            Some(id) => Some(NoteView {
                id,
                note: row.try_get("transactionNote")?,
            }),
            None => None,
        };

        let transaction = entity_type_id
            .and(transaction_id)
            .and_then(parse_transaction_number);

        let transaction_type = match entity_type_id.and_then(PortfolioProductType::from_id) {
            Some(kind) if kind.is_loan_account() => {
                let stored: Option<i64> = row.try_get("loanTransactionType")?;
                Some(LoanTransactionType::option_for(stored.unwrap_or(0)))
            }
            Some(kind) if kind.is_savings_account() => {
                let stored: Option<i64> = row.try_get("savingsTransactionType")?;
                Some(SavingsTransactionType::option_for(stored.unwrap_or(0)))
            }
            _ => None,
        };

        Ok(TransactionDetail {
            transaction_id: transaction,
            payment_details,
            note_data,
            transaction_type,
        })
    }

    fn row_to_assignment(row: &SqliteRow) -> Result<JournalEntryAssignment> {
        Ok(JournalEntryAssignment {
            journal_id: row.try_get("journal_id")?,
            loan_id: row.try_get("loan_id")?,
            loan_status: row.try_get("enum_value")?,
            client_name: row.try_get("display_name")?,
            client_file_number: row.try_get("external_id")?,
            loan_account_number: row.try_get("account_no")?,
        })
    }
}

/// Bind parameters in the order the query recorded them.
fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Text(value) => query.bind(value.as_str()),
            SqlParam::Int(value) => query.bind(*value),
        };
    }
    query
}

/// Nullable boolean column; NULL reads as false.
fn flag(row: &SqliteRow, column: &str) -> Result<bool> {
    let value: Option<bool> = row.try_get(column)?;
    Ok(value.unwrap_or(false))
}

/// Accepts a bare date or a timestamp whose first ten characters are the date.
fn parse_date(value: &str) -> Result<NaiveDate> {
    let date = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .with_context(|| format!("Invalid date: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("2024-03-09 14:22:01").unwrap(), expected);
        assert!(parse_date("09/03/2024").is_err());
    }
}
