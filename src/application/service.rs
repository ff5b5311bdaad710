use tracing::{Span, info, instrument};

use crate::domain::{
    CountCategory, JournalEntryAssignment, JournalEntryAssociations, JournalEntryFilter,
    JournalEntryId, JournalEntryView, Page,
};
use crate::storage::{JournalEntryCountQuery, JournalEntryQuery, Repository};

use super::AppError;

/// Read service for journal entries.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct JournalEntryReadService {
    repo: Repository,
}

impl JournalEntryReadService {
    /// Create a new read service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// List one page of journal entries matching the filter.
    #[instrument(
        skip(self, filter),
        fields(
            limit = ?filter.limit,
            offset = ?filter.offset,
            running_balance = associations.running_balance,
            transaction_details = associations.transaction_details,
            total = tracing::field::Empty,
        ),
        err
    )]
    pub async fn retrieve_all(
        &self,
        filter: &JournalEntryFilter,
        associations: JournalEntryAssociations,
    ) -> Result<Page<JournalEntryView>, AppError> {
        let query = JournalEntryQuery::from_filter(filter, associations);
        let page = self.repo.find_journal_entries(&query).await?;

        Span::current().record("total", page.total_filtered_records);
        info!(returned = page.len(), "retrieved journal entries");
        Ok(page)
    }

    /// Fetch a single journal entry.
    #[instrument(skip(self), err)]
    pub async fn retrieve_gl_journal_entry_by_id(
        &self,
        id: JournalEntryId,
        associations: JournalEntryAssociations,
    ) -> Result<JournalEntryView, AppError> {
        let query = JournalEntryQuery::by_id(id, associations);
        self.repo
            .find_journal_entry(&query)
            .await?
            .ok_or(AppError::JournalEntryNotFound(id))
    }

    /// Loans and clients the journal entry's transaction is assigned to.
    #[instrument(skip(self), err)]
    pub async fn retrieve_journal_entry_assignments(
        &self,
        journal_entry_id: JournalEntryId,
    ) -> Result<Vec<JournalEntryAssignment>, AppError> {
        Ok(self
            .repo
            .find_journal_entry_assignments(journal_entry_id)
            .await?)
    }

    /// Count journal-entry transactions in a category whose description,
    /// client name, dates or amounts contain the search term.
    #[instrument(skip(self, category), fields(category = %category), err)]
    pub async fn get_journal_entries_count(
        &self,
        category: CountCategory,
        search: &str,
    ) -> Result<i64, AppError> {
        let query = JournalEntryCountQuery::new(category, search);
        Ok(self.repo.count_journal_entries(&query).await?)
    }
}
