use super::account::{Account, AccountId};
use super::beneficiary::BeneficiaryId;
use super::clock::Clock;
use super::store::Store;
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Classification of a raw type string. Matching ignores case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Credits the account, adds to the beneficiary's balance
    Deposit,

    /// Debits the account, subtracts from the beneficiary's balance
    Withdrawal,

    /// Any other type string. Valid, but it does not move the balance
    Other,
}

impl TransactionType {
    pub fn classify(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("deposit") {
            TransactionType::Deposit
        } else if raw.eq_ignore_ascii_case("withdrawal") {
            TransactionType::Withdrawal
        } else {
            TransactionType::Other
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransactionError {
    #[error("There are no transactions for the last month.")]
    NoWithdrawalsLastMonth,
}

type TransactionResult<T> = Result<T, TransactionError>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct TransactionId(pub i64);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    transaction_id: TransactionId,

    account_id: AccountId,

    /// Positive; the sign comes from the transaction type
    #[serde(
        deserialize_with = "rust_decimal::serde::str::deserialize",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    amount: Decimal,

    /// Served back exactly as loaded
    #[serde(rename = "type")]
    transaction_type: String,

    /// Month/day/two-digit-year, kept as loaded
    date: String,
}

impl Transaction {
    pub fn new(
        transaction_id: TransactionId,
        account_id: AccountId,
        amount: Decimal,
        transaction_type: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id,
            account_id,
            amount,
            transaction_type: transaction_type.into(),
            date: date.into(),
        }
    }

    /// Transactions against any account the beneficiary owns, in load order.
    pub fn find_by_beneficiary(beneficiary_id: BeneficiaryId, store: &Store) -> Vec<&Transaction> {
        let account_ids = account_ids_of(beneficiary_id, store);

        store
            .transactions
            .iter()
            .filter(|tx| account_ids.contains(&tx.account_id))
            .collect()
    }

    /// Deposits minus withdrawals across all of the beneficiary's accounts.
    pub fn balance_of(beneficiary_id: BeneficiaryId, store: &Store) -> Decimal {
        Self::find_by_beneficiary(beneficiary_id, store)
            .into_iter()
            .fold(dec!(0), |balance, tx| balance + tx.signed_amount())
    }

    /// The largest withdrawal dated in the calendar month before `clock.today()`.
    ///
    /// Equal amounts resolve to the transaction loaded last.
    pub fn largest_withdrawal_last_month<'a>(
        beneficiary_id: BeneficiaryId,
        store: &'a Store,
        clock: &dyn Clock,
    ) -> TransactionResult<&'a Transaction> {
        let window = previous_month(clock.today()).ok_or(TransactionError::NoWithdrawalsLastMonth)?;

        // max_by_key yields the last of several equal maxima
        Self::find_by_beneficiary(beneficiary_id, store)
            .into_iter()
            .filter(|tx| tx.transaction_type() == TransactionType::Withdrawal)
            .filter(|tx| tx.date().map(month_of) == Some(window))
            .max_by_key(|tx| tx.amount)
            .ok_or(TransactionError::NoWithdrawalsLastMonth)
    }

    /// Contribution to the balance: +amount, -amount, or zero for unknown types.
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type() {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdrawal => -self.amount,
            TransactionType::Other => dec!(0),
        }
    }

    /// Parsed `MM/dd/yy` date, or `None` when the raw value does not have that shape.
    ///
    /// Two-digit years mean 20xx. A day past the end of its month clamps to the
    /// month's last day, so `02/30/24` reads as 2024-02-29.
    pub fn date(&self) -> Option<NaiveDate> {
        let mut fields = self.date.split('/');
        let month = two_digits(fields.next()?)?;
        let day = two_digits(fields.next()?)?;
        let year = 2000 + two_digits(fields.next()?)? as i32;
        if fields.next().is_some() || !(1..=31).contains(&day) {
            return None;
        }

        (1..=day)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        TransactionType::classify(&self.transaction_type)
    }

    pub fn raw_type(&self) -> &str {
        &self.transaction_type
    }

    pub fn raw_date(&self) -> &str {
        &self.date
    }
}

fn account_ids_of(beneficiary_id: BeneficiaryId, store: &Store) -> HashSet<AccountId> {
    Account::find_by_beneficiary(beneficiary_id, store)
        .into_iter()
        .map(Account::account_id)
        .collect()
}

fn two_digits(field: &str) -> Option<u32> {
    if field.len() == 2 && field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse().ok()
    } else {
        None
    }
}

fn previous_month(today: NaiveDate) -> Option<(i32, u32)> {
    today.checked_sub_months(Months::new(1)).map(month_of)
}

fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Beneficiary, FixedClock};
    use test_case::test_case;

    fn clock(y: i32, m: u32, d: u32) -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn tx(id: i64, account: i64, amount: Decimal, kind: &str, date: &str) -> Transaction {
        Transaction::new(TransactionId(id), AccountId(account), amount, kind, date)
    }

    fn store(transactions: Vec<Transaction>) -> Store {
        Store::new(
            vec![
                Beneficiary::new(BeneficiaryId(1), "Ada", "Lovelace"),
                Beneficiary::new(BeneficiaryId(2), "Alan", "Turing"),
                Beneficiary::new(BeneficiaryId(3), "Grace", "Hopper"),
            ],
            vec![
                Account::new(AccountId(100), BeneficiaryId(1)),
                Account::new(AccountId(101), BeneficiaryId(1)),
                Account::new(AccountId(200), BeneficiaryId(2)),
            ],
            transactions,
        )
    }

    #[test_case("deposit", TransactionType::Deposit ; "lowercase deposit")]
    #[test_case("DEPOSIT", TransactionType::Deposit ; "uppercase deposit")]
    #[test_case("Withdrawal", TransactionType::Withdrawal ; "mixed case withdrawal")]
    #[test_case("transfer", TransactionType::Other ; "unknown type")]
    fn classifies_type_ignoring_case(raw: &str, expected: TransactionType) {
        assert_eq!(TransactionType::classify(raw), expected);
    }

    #[test_case("02/10/24", Some((2024, 2, 10)) ; "two digit fields")]
    #[test_case("12/31/99", Some((2099, 12, 31)) ; "late two digit year")]
    #[test_case("02/30/24", Some((2024, 2, 29)) ; "day past leap february clamps")]
    #[test_case("02/31/23", Some((2023, 2, 28)) ; "day past february clamps")]
    #[test_case("04/31/24", Some((2024, 4, 30)) ; "day past thirty day month clamps")]
    #[test_case("2/1/24", None ; "single digit fields")]
    #[test_case("02/10/2024", None ; "four digit year")]
    #[test_case("2024-02-10", None ; "iso format")]
    #[test_case("13/01/24", None ; "month out of range")]
    #[test_case("00/10/24", None ; "month zero")]
    #[test_case("02/00/24", None ; "day zero")]
    #[test_case("02/32/24", None ; "day beyond any month")]
    #[test_case("02/10/24/1", None ; "extra field")]
    #[test_case("", None ; "empty")]
    fn parses_month_day_year_dates(raw: &str, expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(tx(1, 100, dec!(1), "deposit", raw).date(), expected);
    }

    #[test]
    fn lists_transactions_of_all_owned_accounts() {
        let store = store(vec![
            tx(1, 100, dec!(10), "deposit", "02/01/24"),
            tx(2, 200, dec!(20), "deposit", "02/01/24"),
            tx(3, 101, dec!(30), "withdrawal", "02/01/24"),
            tx(4, 999, dec!(40), "deposit", "02/01/24"),
        ]);

        let ids: Vec<i64> = Transaction::find_by_beneficiary(BeneficiaryId(1), &store)
            .iter()
            .map(|tx| tx.transaction_id().0)
            .collect();

        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn balance_adds_deposits_and_subtracts_withdrawals() {
        let store = store(vec![
            tx(1, 100, dec!(50), "deposit", "02/01/24"),
            tx(2, 101, dec!(20.25), "WITHDRAWAL", "02/02/24"),
            tx(3, 100, dec!(5), "fee", "02/03/24"),
            tx(4, 200, dec!(1000), "deposit", "02/04/24"),
        ]);

        assert_eq!(Transaction::balance_of(BeneficiaryId(1), &store), dec!(29.75));
        assert_eq!(Transaction::balance_of(BeneficiaryId(2), &store), dec!(1000));
    }

    #[test]
    fn balance_may_go_negative() {
        let store = store(vec![tx(1, 200, dec!(12.5), "withdrawal", "02/01/24")]);

        assert_eq!(Transaction::balance_of(BeneficiaryId(2), &store), dec!(-12.5));
    }

    #[test]
    fn picks_largest_withdrawal_within_last_month_only() {
        let store = store(vec![
            tx(1, 100, dec!(50), "deposit", "02/10/24"),
            tx(2, 100, dec!(20), "withdrawal", "02/11/24"),
            tx(3, 100, dec!(80), "withdrawal", "01/11/24"),
        ]);

        let found =
            Transaction::largest_withdrawal_last_month(BeneficiaryId(1), &store, &clock(2024, 3, 15)).unwrap();

        assert_eq!(found.transaction_id(), TransactionId(2));
        assert_eq!(Transaction::balance_of(BeneficiaryId(1), &store), dec!(-50));
    }

    #[test]
    fn equal_amounts_resolve_to_later_loaded() {
        let store = store(vec![
            tx(1, 100, dec!(75), "withdrawal", "02/03/24"),
            tx(2, 101, dec!(75.00), "withdrawal", "02/20/24"),
            tx(3, 100, dec!(10), "withdrawal", "02/28/24"),
        ]);

        let found =
            Transaction::largest_withdrawal_last_month(BeneficiaryId(1), &store, &clock(2024, 3, 1)).unwrap();

        assert_eq!(found.transaction_id(), TransactionId(2));
    }

    #[test]
    fn last_month_wraps_across_year_boundary() {
        let store = store(vec![
            tx(1, 100, dec!(30), "withdrawal", "12/05/23"),
            tx(2, 100, dec!(90), "withdrawal", "12/05/22"),
        ]);

        let found =
            Transaction::largest_withdrawal_last_month(BeneficiaryId(1), &store, &clock(2024, 1, 10)).unwrap();

        assert_eq!(found.transaction_id(), TransactionId(1));
    }

    #[test]
    fn end_of_month_reference_date_still_finds_previous_month() {
        let store = store(vec![tx(1, 100, dec!(30), "withdrawal", "02/29/24")]);

        let found =
            Transaction::largest_withdrawal_last_month(BeneficiaryId(1), &store, &clock(2024, 3, 31)).unwrap();

        assert_eq!(found.transaction_id(), TransactionId(1));
    }

    #[test]
    fn clamped_day_counts_toward_its_month() {
        let store = store(vec![
            tx(1, 100, dec!(40), "withdrawal", "02/30/24"),
            tx(2, 100, dec!(90), "withdrawal", "2/15/24"),
        ]);

        let found =
            Transaction::largest_withdrawal_last_month(BeneficiaryId(1), &store, &clock(2024, 3, 15)).unwrap();

        assert_eq!(found.transaction_id(), TransactionId(1));
    }

    #[test]
    fn unparsable_dates_are_skipped() {
        let store = store(vec![
            tx(1, 100, dec!(500), "withdrawal", "not a date"),
            tx(2, 100, dec!(5), "withdrawal", "02/01/24"),
        ]);

        let found =
            Transaction::largest_withdrawal_last_month(BeneficiaryId(1), &store, &clock(2024, 3, 15)).unwrap();

        assert_eq!(found.transaction_id(), TransactionId(2));
    }

    #[test_case(vec![] ; "no transactions")]
    #[test_case(vec![tx(1, 100, dec!(5), "deposit", "02/01/24")] ; "only deposits")]
    #[test_case(vec![tx(1, 100, dec!(5), "withdrawal", "03/01/24")] ; "only current month")]
    #[test_case(vec![tx(1, 200, dec!(5), "withdrawal", "02/01/24")] ; "other beneficiary")]
    fn no_qualifying_withdrawal_is_not_found(transactions: Vec<Transaction>) {
        let store = store(transactions);

        let result = Transaction::largest_withdrawal_last_month(BeneficiaryId(1), &store, &clock(2024, 3, 15));

        assert_eq!(result, Err(TransactionError::NoWithdrawalsLastMonth));
    }

    #[test_case(3 ; "beneficiary without accounts")]
    #[test_case(42 ; "unknown beneficiary")]
    fn beneficiary_without_accounts_yields_empty_results(id: i64) {
        let store = store(vec![
            tx(1, 100, dec!(50), "deposit", "02/10/24"),
            tx(2, 200, dec!(20), "withdrawal", "02/11/24"),
        ]);
        let id = BeneficiaryId(id);

        assert!(Account::find_by_beneficiary(id, &store).is_empty());
        assert!(Transaction::find_by_beneficiary(id, &store).is_empty());
        assert_eq!(Transaction::balance_of(id, &store), dec!(0));
        assert_eq!(
            Transaction::largest_withdrawal_last_month(id, &store, &clock(2024, 3, 15)),
            Err(TransactionError::NoWithdrawalsLastMonth)
        );
        assert_eq!(
            TransactionError::NoWithdrawalsLastMonth.to_string(),
            "There are no transactions for the last month."
        );
    }

    #[test_case("Withdrawal" ; "capitalised")]
    #[test_case("DEPOSIT" ; "upper case")]
    #[test_case("Transfer" ; "unknown")]
    fn type_is_served_back_as_loaded(raw: &str) {
        let transaction = tx(7, 100, dec!(12.5), raw, "02/01/24");
        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["type"], serde_json::json!(raw));
        assert_eq!(transaction.raw_type(), raw);
    }

    #[test]
    fn serializes_amount_as_number_and_keeps_raw_fields() {
        let json = serde_json::to_value(tx(7, 100, dec!(12.5), "Transfer", "02/01/24")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "transactionId": 7,
                "accountId": 100,
                "amount": 12.5,
                "type": "Transfer",
                "date": "02/01/24",
            })
        );
    }
}
