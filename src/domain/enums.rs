use serde::{Deserialize, Serialize};

/// Id/code/label triple handed to callers in place of a raw enum column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub id: i64,
    pub code: String,
    pub value: String,
}

/// A closed enumeration stored as an integer column.
///
/// Every implementor is backed by a lookup table so decoding never compares
/// strings, and the valid range used by request validation is derived from
/// that same table.
pub trait Enumeration: Copy + PartialEq + Sized + 'static {
    /// Prefix of the message code, e.g. `accountType`.
    const CODE_PREFIX: &'static str;

    /// `(variant, stored id, code suffix, label)` rows.
    fn table() -> &'static [(Self, i64, &'static str, &'static str)];

    fn from_id(id: i64) -> Option<Self> {
        Self::table()
            .iter()
            .find(|(_, stored, _, _)| *stored == id)
            .map(|(variant, ..)| *variant)
    }

    fn id(self) -> i64 {
        self.entry().1
    }

    fn label(self) -> &'static str {
        self.entry().3
    }

    fn code(self) -> String {
        format!("{}.{}", Self::CODE_PREFIX, self.entry().2)
    }

    fn min_value() -> i64 {
        Self::table().iter().map(|row| row.1).min().unwrap_or(0)
    }

    fn max_value() -> i64 {
        Self::table().iter().map(|row| row.1).max().unwrap_or(0)
    }

    fn option(self) -> EnumOption {
        EnumOption {
            id: self.id(),
            code: self.code(),
            value: self.label().to_string(),
        }
    }

    /// Decode a stored id, falling back to an `invalid` option for ids
    /// outside the table.
    fn option_for(id: i64) -> EnumOption {
        match Self::from_id(id) {
            Some(variant) => variant.option(),
            None => EnumOption {
                id,
                code: format!("{}.invalid", Self::CODE_PREFIX),
                value: "Invalid".to_string(),
            },
        }
    }

    #[doc(hidden)]
    fn entry(self) -> &'static (Self, i64, &'static str, &'static str) {
        // Every variant is listed in its own table.
        Self::table()
            .iter()
            .find(|row| row.0 == self)
            .unwrap_or(&Self::table()[0])
    }
}

macro_rules! enumeration {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $prefix:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $id:literal => ($code:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl Enumeration for $name {
            const CODE_PREFIX: &'static str = $prefix;

            fn table() -> &'static [(Self, i64, &'static str, &'static str)] {
                &[ $( ($name::$variant, $id, $code, $label) ),+ ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

enumeration! {
    /// Classification of a ledger account (determines its normal balance side).
    pub enum GlAccountType : "accountType" {
        Asset = 1 => ("asset", "ASSET"),
        Liability = 2 => ("liability", "LIABILITY"),
        Equity = 3 => ("equity", "EQUITY"),
        Income = 4 => ("income", "INCOME"),
        Expense = 5 => ("expense", "EXPENSE"),
    }
}

enumeration! {
    /// Whether an account holds entries or only groups child accounts.
    pub enum GlAccountUsage : "accountUsage" {
        Detail = 1 => ("detail", "DETAIL"),
        Header = 2 => ("header", "HEADER"),
    }
}

enumeration! {
    pub enum JournalEntryType : "journalEntryType" {
        Credit = 1 => ("credit", "CREDIT"),
        Debit = 2 => ("debit", "DEBIT"),
    }
}

enumeration! {
    /// Kind of portfolio entity a journal entry was generated for.
    pub enum PortfolioProductType : "portfolioProductType" {
        Loan = 1 => ("loan", "LOAN"),
        Saving = 2 => ("saving", "SAVING"),
        Client = 3 => ("client", "CLIENT"),
        Provisioning = 4 => ("provisioning", "PROVISIONING"),
        Shares = 5 => ("shares", "SHARES"),
    }
}

impl PortfolioProductType {
    pub fn is_loan_account(self) -> bool {
        matches!(self, PortfolioProductType::Loan)
    }

    pub fn is_savings_account(self) -> bool {
        matches!(self, PortfolioProductType::Saving)
    }
}

enumeration! {
    pub enum LoanTransactionType : "loanTransactionType" {
        Invalid = 0 => ("invalid", "Invalid"),
        Disbursement = 1 => ("disbursement", "Disbursement"),
        Repayment = 2 => ("repayment", "Repayment"),
        Contra = 3 => ("contra", "Reversal"),
        WaiveInterest = 4 => ("waiver", "Waive interest"),
        RepaymentAtDisbursement = 5 => ("repaymentAtDisbursement", "Repayment (at time of disbursement)"),
        WriteOff = 6 => ("writeOff", "Write-Off"),
        MarkedForRescheduling = 7 => ("marked.for.rescheduling", "Close (as rescheduled)"),
        RecoveryRepayment = 8 => ("recoveryRepayment", "Recovery Repayment"),
        WaiveCharges = 9 => ("waiveCharges", "Waive loan charges"),
        Accrual = 10 => ("accrual", "Accrual"),
        InitiateTransfer = 12 => ("initiateTransfer", "Initiate Transfer"),
        ApproveTransfer = 13 => ("approveTransfer", "Approve Transfer"),
        WithdrawTransfer = 14 => ("withdrawTransfer", "Withdraw Transfer"),
        RejectTransfer = 15 => ("rejectTransfer", "Reject Transfer"),
        Refund = 16 => ("refund", "Refund"),
        ChargePayment = 17 => ("chargePayment", "Charge Payment"),
        RefundForActiveLoan = 18 => ("refundForActiveLoans", "Refund"),
        IncomePosting = 19 => ("incomePosting", "Income Posting"),
    }
}

enumeration! {
    pub enum SavingsTransactionType : "savingsAccountTransactionType" {
        Invalid = 0 => ("invalid", "Invalid"),
        Deposit = 1 => ("deposit", "Deposit"),
        Withdrawal = 2 => ("withdrawal", "Withdrawal"),
        InterestPosting = 3 => ("interestPosting", "Interest Posting"),
        WithdrawalFee = 4 => ("withdrawalFee", "Withdrawal Fee"),
        AnnualFee = 5 => ("annualFee", "Annual Fee"),
        WaiveCharges = 6 => ("waiveCharge", "Waive Charge"),
        PayCharge = 7 => ("payCharge", "Pay Charge"),
        DividendPayout = 8 => ("dividendPayout", "Dividend Payout"),
        InitiateTransfer = 12 => ("initiateTransfer", "Initiate Transfer"),
        ApproveTransfer = 13 => ("approveTransfer", "Approve Transfer"),
        WithdrawTransfer = 14 => ("withdrawTransfer", "Withdraw Transfer"),
        RejectTransfer = 15 => ("rejectTransfer", "Reject Transfer"),
        WrittenOff = 16 => ("writtenoff", "Written off"),
        OverdraftInterest = 17 => ("overdraftInterest", "Overdraft Interest"),
        WithholdTax = 18 => ("withholdTax", "Withhold Tax"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_table_roundtrips<E: Enumeration + std::fmt::Debug>() {
        for (variant, id, _, _) in E::table() {
            assert_eq!(E::from_id(*id), Some(*variant));
            assert_eq!(variant.id(), *id);
        }
    }

    #[test]
    fn test_tables_roundtrip() {
        assert_table_roundtrips::<GlAccountType>();
        assert_table_roundtrips::<GlAccountUsage>();
        assert_table_roundtrips::<JournalEntryType>();
        assert_table_roundtrips::<PortfolioProductType>();
        assert_table_roundtrips::<LoanTransactionType>();
        assert_table_roundtrips::<SavingsTransactionType>();
    }

    #[test]
    fn test_ranges_follow_tables() {
        assert_eq!(GlAccountType::min_value(), 1);
        assert_eq!(GlAccountType::max_value(), 5);
        assert_eq!(GlAccountUsage::min_value(), 1);
        assert_eq!(GlAccountUsage::max_value(), 2);
        assert_eq!(LoanTransactionType::min_value(), 0);
        assert_eq!(LoanTransactionType::max_value(), 19);
    }

    #[test]
    fn test_option_carries_code_and_label() {
        let option = GlAccountType::Liability.option();
        assert_eq!(option.id, 2);
        assert_eq!(option.code, "accountType.liability");
        assert_eq!(option.value, "LIABILITY");

        let option = SavingsTransactionType::Deposit.option();
        assert_eq!(option.code, "savingsAccountTransactionType.deposit");
    }

    #[test]
    fn test_unknown_id_decodes_as_invalid() {
        let option = JournalEntryType::option_for(7);
        assert_eq!(option.id, 7);
        assert_eq!(option.code, "journalEntryType.invalid");
        assert_eq!(option.value, "Invalid");
        assert!(LoanTransactionType::from_id(11).is_none());
    }

    #[test]
    fn test_portfolio_account_kinds() {
        assert!(PortfolioProductType::Loan.is_loan_account());
        assert!(!PortfolioProductType::Loan.is_savings_account());
        assert!(PortfolioProductType::Saving.is_savings_account());
        assert!(!PortfolioProductType::Client.is_loan_account());
    }
}
