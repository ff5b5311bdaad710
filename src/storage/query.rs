//! Typed construction of the journal-entry read queries.
//!
//! A [`JournalEntryQuery`] records its predicates and bound parameters in the
//! order they were added and only renders SQL text at the end, so callers and
//! tests can reason about the filter structure without parsing strings.

use crate::domain::{
    CountCategory, JournalEntryAssociations, JournalEntryFilter, JournalEntryId, OrderBy,
    SortOrder,
};

/// Format used when binding dates against `entry_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

/// One conjunct of the journal-entry `WHERE` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    Id,
    TransactionId,
    EntityType,
    OfficeId,
    GlAccountId,
    EntryDateBetween,
    EntryDateFrom,
    EntryDateTo,
    ManualOnly,
    UnidentifiedOnly,
}

impl Predicate {
    pub fn sql(self) -> &'static str {
        match self {
            Predicate::Id => "journalEntry.id = ?",
            Predicate::TransactionId => "journalEntry.transaction_id = ?",
            Predicate::EntityType => "journalEntry.entity_type_enum = ?",
            Predicate::OfficeId => "journalEntry.office_id = ?",
            Predicate::GlAccountId => "journalEntry.account_id = ?",
            Predicate::EntryDateBetween => "journalEntry.entry_date between ? and ?",
            Predicate::EntryDateFrom => "journalEntry.entry_date >= ?",
            Predicate::EntryDateTo => "journalEntry.entry_date <= ?",
            Predicate::ManualOnly => "journalEntry.manual_entry = 1",
            Predicate::UnidentifiedOnly => {
                "(journalEntry.unidentified_entry = 1 and ltex.id is null)"
            }
        }
    }

    /// Number of parameters the predicate binds.
    pub fn arity(self) -> usize {
        match self {
            Predicate::EntryDateBetween => 2,
            Predicate::ManualOnly | Predicate::UnidentifiedOnly => 0,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Ordering {
    /// `entry_date, id` ascending.
    #[default]
    Default,
    Column {
        column: OrderBy,
        direction: Option<SortOrder>,
    },
}

const BASE_COLUMNS: &str = "journalEntry.id as id, glAccount.classification_enum as classification, \
    glAccount.name as glAccountName, glAccount.currency_code as glAccountCurrencyCode, \
    glAccount.gl_code as glAccountCode, glAccount.id as glAccountId, \
    journalEntry.office_id as officeId, office.name as officeName, journalEntry.ref_num as referenceNumber, \
    journalEntry.manual_entry as manualEntry, journalEntry.entry_date as transactionDate, \
    journalEntry.unidentified_entry as unidentifiedEntry, \
    journalEntry.type_enum as entryType, journalEntry.amount as amount, \
    journalEntry.exchange_rate as exchangeRate, journalEntry.transaction_id as transactionId, \
    journalEntry.entity_type_enum as entityType, journalEntry.entity_id as entityId, \
    creatingUser.id as createdByUserId, creatingUser.username as createdByUserName, \
    journalEntry.description as comments, journalEntry.created_date as createdDate, \
    journalEntry.reversed as reversed, journalEntry.currency_code as currencyCode, \
    curr.name as currencyName, curr.internationalized_name_code as currencyNameCode, \
    curr.display_symbol as currencyDisplaySymbol, curr.decimal_places as currencyDigits, \
    curr.currency_multiplesof as inMultiplesOf, journalEntry.profit as isProfit, \
    journalEntry.profit_transaction_id as profitTransactionId, (ltex.id is not null) as usedInLoan, \
    (reversalJournalEntry.id is not null) as isReversalEntry, lt.is_reversed as isTransactionReversed";

const RUNNING_BALANCE_COLUMNS: &str = ", journalEntry.is_running_balance_calculated as runningBalanceComputed, \
    journalEntry.office_running_balance as officeRunningBalance, \
    journalEntry.organization_running_balance as organizationRunningBalance";

const TRANSACTION_DETAIL_COLUMNS: &str = ", pd.receipt_number as receiptNumber, pd.check_number as checkNumber, \
    pd.account_number as accountNumber, cdv.code_value as paymentTypeName, \
    pd.payment_type_cv_id as paymentTypeId, pd.bank_number as bankNumber, \
    pd.routing_code as routingCode, note.id as noteId, note.note as transactionNote, \
    lt.transaction_type_enum as loanTransactionType, st.transaction_type_enum as savingsTransactionType";

const BASE_JOINS: &str = " from acc_gl_journal_entry as journalEntry \
    left join acc_gl_account as glAccount on glAccount.id = journalEntry.account_id \
    left join m_office as office on office.id = journalEntry.office_id \
    left join m_appuser as creatingUser on creatingUser.id = journalEntry.createdby_id \
    join m_currency curr on curr.code = journalEntry.currency_code \
    left join m_loan_transaction as lt on journalEntry.loan_transaction_id = lt.id";

const TRANSACTION_DETAIL_JOINS: &str = " left join m_savings_account_transaction as st on journalEntry.savings_transaction_id = st.id \
    left join m_payment_detail as pd on lt.payment_detail_id = pd.id or st.payment_detail_id = pd.id \
    left join m_code_value as cdv on cdv.id = pd.payment_type_cv_id \
    left join m_note as note on lt.id = note.loan_transaction_id or st.id = note.savings_account_transaction_id";

const TRAILING_JOINS: &str = " left join m_loan_transaction as ltex on journalEntry.transaction_id = ltex.related_transaction_id \
    left join acc_gl_journal_entry as reversalJournalEntry on journalEntry.id = reversalJournalEntry.reversal_id";

/// Query against `acc_gl_journal_entry` with optional association joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryQuery {
    associations: JournalEntryAssociations,
    predicates: Vec<Predicate>,
    params: Vec<SqlParam>,
    ordering: Ordering,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl JournalEntryQuery {
    pub fn new(associations: JournalEntryAssociations) -> Self {
        Self {
            associations,
            predicates: Vec::new(),
            params: Vec::new(),
            ordering: Ordering::Default,
            limit: None,
            offset: None,
        }
    }

    /// Build the listing query for a filter. Clauses are added in a fixed
    /// order, and each present filter binds its parameters in that order.
    pub fn from_filter(filter: &JournalEntryFilter, associations: JournalEntryAssociations) -> Self {
        let mut query = Self::new(associations);

        if let Some(transaction_id) = filter
            .transaction_id
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            query.push(
                Predicate::TransactionId,
                [SqlParam::Text(transaction_id.to_string())],
            );
        }

        if filter.only_manual_entries.is_none() {
            if let Some(entity_type) = filter.entity_type.filter(|t| *t != 0) {
                query.push(Predicate::EntityType, [SqlParam::Int(entity_type)]);
            }
        }

        if let Some(office_id) = filter.office_id.filter(|id| *id != 0) {
            query.push(Predicate::OfficeId, [SqlParam::Int(office_id)]);
        }

        if let Some(gl_account_id) = filter.gl_account_id.filter(|id| *id != 0) {
            query.push(Predicate::GlAccountId, [SqlParam::Int(gl_account_id)]);
        }

        let format_date = |d: chrono::NaiveDate| SqlParam::Text(d.format(DATE_FORMAT).to_string());
        match (filter.from_date, filter.to_date) {
            (Some(from), Some(to)) => {
                query.push(Predicate::EntryDateBetween, [format_date(from), format_date(to)])
            }
            (Some(from), None) => query.push(Predicate::EntryDateFrom, [format_date(from)]),
            (None, Some(to)) => query.push(Predicate::EntryDateTo, [format_date(to)]),
            (None, None) => {}
        }

        if filter.only_manual_entries == Some(true) {
            query.push(Predicate::ManualOnly, []);
        }

        if filter.only_unidentified_entries == Some(true) {
            query.push(Predicate::UnidentifiedOnly, []);
        }

        if let Some(column) = &filter.order_by {
            query.ordering = Ordering::Column {
                column: column.clone(),
                direction: filter.sort_order,
            };
        }

        query.limit = filter.limit.filter(|l| *l > 0);
        query.offset = filter.offset.filter(|o| *o >= 0);
        query
    }

    /// Single-entry lookup.
    pub fn by_id(id: JournalEntryId, associations: JournalEntryAssociations) -> Self {
        let mut query = Self::new(associations);
        query.push(Predicate::Id, [SqlParam::Int(id)]);
        query
    }

    fn push<const N: usize>(&mut self, predicate: Predicate, params: [SqlParam; N]) {
        debug_assert_eq!(predicate.arity(), N);
        self.predicates.push(predicate);
        self.params.extend(params);
    }

    pub fn associations(&self) -> JournalEntryAssociations {
        self.associations
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    pub fn ordering(&self) -> &Ordering {
        &self.ordering
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// Offset only applies together with a limit.
    pub fn offset(&self) -> Option<i64> {
        self.limit.and(self.offset)
    }

    /// Projection, joins and `WHERE` clause, without ordering or paging.
    fn body(&self) -> String {
        let mut sql = String::with_capacity(2048);
        sql.push_str(BASE_COLUMNS);
        if self.associations.running_balance {
            sql.push_str(RUNNING_BALANCE_COLUMNS);
        }
        if self.associations.transaction_details {
            sql.push_str(TRANSACTION_DETAIL_COLUMNS);
        }
        sql.push_str(&self.from_clause());
        sql
    }

    fn from_clause(&self) -> String {
        let mut sql = String::from(BASE_JOINS);
        if self.associations.transaction_details {
            sql.push_str(TRANSACTION_DETAIL_JOINS);
        }
        sql.push_str(TRAILING_JOINS);
        sql.push_str(&self.where_clause());
        sql
    }

    pub fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let conjuncts: Vec<&str> = self.predicates.iter().map(|p| p.sql()).collect();
        format!(" where {}", conjuncts.join(" and "))
    }

    pub fn order_clause(&self) -> String {
        match &self.ordering {
            Ordering::Default => " order by journalEntry.entry_date, journalEntry.id".to_string(),
            Ordering::Column { column, direction } => match direction {
                Some(direction) => format!(" order by {} {}", column.as_str(), direction.as_str()),
                None => format!(" order by {}", column.as_str()),
            },
        }
    }

    /// The page query.
    pub fn select_sql(&self) -> String {
        let mut sql = format!("select {}{}", self.body(), self.order_clause());
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" limit {}", limit));
            if let Some(offset) = self.offset() {
                sql.push_str(&format!(" offset {}", offset));
            }
        }
        sql
    }

    /// Found-rows companion: counts every row the page query would match
    /// without its ordering and pagination. Binds the same parameters.
    pub fn count_sql(&self) -> String {
        format!(
            "select count(*) as total from (select journalEntry.id{})",
            self.from_clause()
        )
    }
}

/// Loan/client assignments of one journal entry, non-reversed loan
/// transactions only.
pub const JOURNAL_ENTRY_ASSIGNMENTS_SQL: &str = "SELECT j.id journal_id, l.id loan_id, c.display_name, e.enum_value, c.external_id, l.account_no \
    FROM acc_gl_journal_entry j \
    INNER JOIN m_loan_transaction lt ON lt.related_transaction_id = j.transaction_id \
    INNER JOIN m_loan l ON l.id = lt.loan_id \
    INNER JOIN m_client c ON c.id = l.client_id \
    INNER JOIN r_enum_value e ON e.enum_id = l.loan_status_id \
    WHERE j.id = ? \
    AND lt.is_reversed = 0";

/// Credit and debit sums are matched in six-decimal form, e.g. `100.000000`.
const JOURNAL_ENTRY_COUNT_SQL: &str = "SELECT COUNT(tt.id) AS je_count FROM ( \
    SELECT y.id FROM ( \
        SELECT m.id, strftime('%d/%m/%Y', m.created_date) AS createdOn, \
            strftime('%d/%m/%Y', m.entry_date) AS transactionDate, \
            c.display_name AS clientName, m.description AS description, m.entry_date, \
            SUM(CASE WHEN m.type_enum = 1 THEN (CASE WHEN lt.is_reversed THEN m.amount / 2 ELSE m.amount END) ELSE 0 END) AS Credit, \
            SUM(CASE WHEN m.type_enum = 2 THEN (CASE WHEN lt.is_reversed THEN m.amount / 2 ELSE m.amount END) ELSE 0 END) AS Debit \
        FROM acc_gl_journal_entry m \
        LEFT JOIN m_office o ON o.id = m.office_id \
        LEFT JOIN m_loan l ON l.id = m.entity_id \
        LEFT JOIN m_loan_transaction lt ON lt.id = m.loan_transaction_id \
        LEFT JOIN m_client c ON c.id = l.client_id \
        WHERE 1 \
        AND (CASE WHEN ? = 'reversed' THEN (m.reversed OR lt.is_reversed) ELSE 1 END) \
        AND (CASE WHEN ? = 'unidentified_profit' THEN m.profit ELSE 1 END) \
        AND (CASE WHEN ? = 'unidentified_deposits' THEN m.unidentified_entry ELSE 1 END) \
        GROUP BY m.transaction_id) y \
    WHERE 1 AND ( \
        y.description LIKE ? \
        OR y.clientName LIKE ? \
        OR y.createdOn LIKE ? \
        OR y.transactionDate LIKE ? \
        OR printf('%d.%06d', y.Credit / 1000000, y.Credit % 1000000) LIKE ? \
        OR printf('%d.%06d', y.Debit / 1000000, y.Debit % 1000000) LIKE ?)) tt";

/// Grouped count of journal entries (one per transaction id) restricted by
/// category and a free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryCountQuery {
    pub category: CountCategory,
    pub search: String,
}

impl JournalEntryCountQuery {
    pub fn new(category: CountCategory, search: impl Into<String>) -> Self {
        Self {
            category,
            search: search.into(),
        }
    }

    pub fn sql(&self) -> &'static str {
        JOURNAL_ENTRY_COUNT_SQL
    }

    /// Category bound three times, then the search pattern once per
    /// searchable column.
    pub fn params(&self) -> Vec<SqlParam> {
        let category = SqlParam::Text(self.category.as_str().to_string());
        let pattern = SqlParam::Text(format!("%{}%", self.search.trim()));
        let mut params = vec![category; 3];
        params.extend(std::iter::repeat_n(pattern, 6));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let query = JournalEntryQuery::from_filter(&JournalEntryFilter::default(), Default::default());
        assert!(query.predicates().is_empty());
        assert!(query.params().is_empty());
        assert!(!query.select_sql().contains(" where "));
        assert!(
            query
                .select_sql()
                .ends_with(" order by journalEntry.entry_date, journalEntry.id")
        );
    }

    #[test]
    fn test_transaction_and_office_filters_in_order() {
        let filter = JournalEntryFilter {
            transaction_id: Some("T1".into()),
            office_id: Some(5),
            ..Default::default()
        };
        let query = JournalEntryQuery::from_filter(&filter, Default::default());

        assert_eq!(
            query.predicates(),
            &[Predicate::TransactionId, Predicate::OfficeId]
        );
        assert_eq!(
            query.params(),
            &[SqlParam::Text("T1".into()), SqlParam::Int(5)]
        );
        assert_eq!(placeholders(&query.where_clause()), 2);
        assert_eq!(
            query.where_clause(),
            " where journalEntry.transaction_id = ? and journalEntry.office_id = ?"
        );
    }

    #[test]
    fn test_full_filter_order() {
        let filter = JournalEntryFilter {
            transaction_id: Some("L9".into()),
            entity_type: Some(1),
            office_id: Some(2),
            gl_account_id: Some(3),
            from_date: Some(date("2020-01-01")),
            to_date: Some(date("2020-01-31")),
            only_unidentified_entries: Some(true),
            ..Default::default()
        };
        let query = JournalEntryQuery::from_filter(&filter, Default::default());

        assert_eq!(
            query.predicates(),
            &[
                Predicate::TransactionId,
                Predicate::EntityType,
                Predicate::OfficeId,
                Predicate::GlAccountId,
                Predicate::EntryDateBetween,
                Predicate::UnidentifiedOnly,
            ]
        );
        assert_eq!(
            query.params(),
            &[
                SqlParam::Text("L9".into()),
                SqlParam::Int(1),
                SqlParam::Int(2),
                SqlParam::Int(3),
                SqlParam::Text("2020-01-01".into()),
                SqlParam::Text("2020-01-31".into()),
            ]
        );
        let arity: usize = query.predicates().iter().map(|p| p.arity()).sum();
        assert_eq!(arity, query.params().len());
        assert_eq!(placeholders(&query.select_sql()), query.params().len());
    }

    #[test]
    fn test_date_range_variants() {
        let between = JournalEntryQuery::from_filter(
            &JournalEntryFilter {
                from_date: Some(date("2020-01-01")),
                to_date: Some(date("2020-01-31")),
                ..Default::default()
            },
            Default::default(),
        );
        assert_eq!(between.predicates(), &[Predicate::EntryDateBetween]);
        assert!(between.where_clause().contains("entry_date between ? and ?"));
        assert_eq!(
            between.params(),
            &[
                SqlParam::Text("2020-01-01".into()),
                SqlParam::Text("2020-01-31".into())
            ]
        );

        let from_only = JournalEntryQuery::from_filter(
            &JournalEntryFilter {
                from_date: Some(date("2021-03-04")),
                ..Default::default()
            },
            Default::default(),
        );
        assert_eq!(from_only.predicates(), &[Predicate::EntryDateFrom]);
        assert_eq!(from_only.params(), &[SqlParam::Text("2021-03-04".into())]);

        let to_only = JournalEntryQuery::from_filter(
            &JournalEntryFilter {
                to_date: Some(date("2021-12-31")),
                ..Default::default()
            },
            Default::default(),
        );
        assert_eq!(to_only.predicates(), &[Predicate::EntryDateTo]);
        assert!(to_only.where_clause().contains("entry_date <= ?"));
    }

    #[test]
    fn test_entity_type_dropped_when_manual_flag_present() {
        for manual in [Some(true), Some(false)] {
            let filter = JournalEntryFilter {
                entity_type: Some(2),
                only_manual_entries: manual,
                ..Default::default()
            };
            let query = JournalEntryQuery::from_filter(&filter, Default::default());
            assert!(!query.predicates().contains(&Predicate::EntityType));
            assert!(query.params().is_empty());
            assert_eq!(
                query.predicates().contains(&Predicate::ManualOnly),
                manual == Some(true)
            );
        }
    }

    #[test]
    fn test_zero_and_blank_filters_are_absent() {
        let filter = JournalEntryFilter {
            transaction_id: Some("   ".into()),
            entity_type: Some(0),
            office_id: Some(0),
            gl_account_id: Some(0),
            only_unidentified_entries: Some(false),
            ..Default::default()
        };
        let query = JournalEntryQuery::from_filter(&filter, Default::default());
        assert!(query.predicates().is_empty());
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_ordering_and_pagination() {
        let filter = JournalEntryFilter {
            order_by: OrderBy::new("journalEntry.amount"),
            sort_order: Some(SortOrder::Desc),
            limit: Some(10),
            offset: Some(20),
            ..Default::default()
        };
        let query = JournalEntryQuery::from_filter(&filter, Default::default());
        assert!(
            query
                .select_sql()
                .ends_with(" order by journalEntry.amount DESC limit 10 offset 20")
        );
        assert!(!query.count_sql().contains("limit"));
        assert!(!query.count_sql().contains("order by"));

        let no_limit = JournalEntryQuery::from_filter(
            &JournalEntryFilter {
                offset: Some(20),
                ..Default::default()
            },
            Default::default(),
        );
        assert_eq!(no_limit.offset(), None);
        assert!(!no_limit.select_sql().contains("offset"));
    }

    #[test]
    fn test_associations_control_joins() {
        let plain = JournalEntryQuery::by_id(1, JournalEntryAssociations::none()).select_sql();
        assert!(!plain.contains("m_payment_detail"));
        assert!(!plain.contains("m_note"));
        assert!(!plain.contains("officeRunningBalance"));
        assert!(plain.contains("left join m_loan_transaction as ltex"));

        let detailed = JournalEntryQuery::by_id(
            1,
            JournalEntryAssociations::none()
                .with_running_balance()
                .with_transaction_details(),
        )
        .select_sql();
        assert!(detailed.contains("left join m_payment_detail as pd"));
        assert!(detailed.contains("left join m_savings_account_transaction as st"));
        assert!(detailed.contains("left join m_code_value as cdv"));
        assert!(detailed.contains("left join m_note as note"));
        assert!(detailed.contains("as officeRunningBalance"));
        assert!(detailed.contains("as savingsTransactionType"));
    }

    #[test]
    fn test_by_id_binds_single_param() {
        let query = JournalEntryQuery::by_id(42, Default::default());
        assert_eq!(query.predicates(), &[Predicate::Id]);
        assert_eq!(query.params(), &[SqlParam::Int(42)]);
    }

    #[test]
    fn test_count_query_params() {
        let query = JournalEntryCountQuery::new(CountCategory::Reversed, "salary");
        let params = query.params();
        assert_eq!(params.len(), placeholders(query.sql()));
        assert_eq!(params[..3], vec![SqlParam::Text("reversed".into()); 3][..]);
        assert!(params[3..]
            .iter()
            .all(|p| *p == SqlParam::Text("%salary%".into())));
    }
}
