use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{
    account::{Account, AccountId},
    beneficiary::{Beneficiary, BeneficiaryId},
    transaction::{Transaction, TransactionId},
};

pub const BENEFICIARIES_FILE: &str = "beneficiaries.csv";
pub const ACCOUNTS_FILE: &str = "accounts.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unable to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed {kind} record: {source}")]
    Csv {
        kind: &'static str,
        source: csv::Error,
    },

    #[error("Invalid input - transaction {} has negative amount {amount}", .id.0)]
    InvalidAmount { id: TransactionId, amount: Decimal },
}

type LoadResult<T> = Result<T, LoadError>;

/// Immutable snapshot of beneficiaries, accounts and transactions, in load order
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) beneficiaries: Vec<Beneficiary>,
    pub(crate) accounts: Vec<Account>,
    pub(crate) transactions: Vec<Transaction>,
}

impl Store {
    pub fn new(
        beneficiaries: Vec<Beneficiary>,
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            beneficiaries,
            accounts,
            transactions,
        }
    }

    /// Loads the three CSV tables from `dir`. Any unreadable file or bad row aborts the load.
    pub fn load(dir: impl AsRef<Path>) -> LoadResult<Self> {
        let dir = dir.as_ref();
        Self::from_readers(
            open(&dir.join(BENEFICIARIES_FILE))?,
            open(&dir.join(ACCOUNTS_FILE))?,
            open(&dir.join(TRANSACTIONS_FILE))?,
        )
    }

    pub fn from_readers(
        beneficiaries: impl Read,
        accounts: impl Read,
        transactions: impl Read,
    ) -> LoadResult<Self> {
        let store = Self::new(
            read_records("beneficiary", beneficiaries)?,
            read_records("account", accounts)?,
            read_records("transaction", transactions)?,
        );
        store.validate()?;

        info!(
            "Loaded {} beneficiaries, {} accounts, {} transactions",
            store.beneficiaries.len(),
            store.accounts.len(),
            store.transactions.len()
        );
        Ok(store)
    }

    fn validate(&self) -> LoadResult<()> {
        if let Some(tx) = self.transactions.iter().find(|tx| tx.amount() < dec!(0)) {
            return Err(LoadError::InvalidAmount {
                id: tx.transaction_id(),
                amount: tx.amount(),
            });
        }

        let known: HashSet<BeneficiaryId> = self.beneficiaries.iter().map(Beneficiary::id).collect();
        for account in self
            .accounts
            .iter()
            .filter(|account| !known.contains(&account.beneficiary_id()))
        {
            warn!(
                "Account {} references unknown beneficiary {}",
                account.account_id().0,
                account.beneficiary_id().0
            );
        }

        let accounts: HashSet<AccountId> = self.accounts.iter().map(Account::account_id).collect();
        for tx in self
            .transactions
            .iter()
            .filter(|tx| !accounts.contains(&tx.account_id()))
        {
            warn!(
                "Transaction {} references unknown account {}",
                tx.transaction_id().0,
                tx.account_id().0
            );
        }

        Ok(())
    }
}

fn open(path: &Path) -> LoadResult<File> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_records<T: DeserializeOwned>(kind: &'static str, reader: impl Read) -> LoadResult<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(reader);

    rdr.deserialize()
        .map(|result| result.map_err(|source| LoadError::Csv { kind, source }))
        .collect()
}
