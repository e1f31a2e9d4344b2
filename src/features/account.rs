use super::beneficiary::BeneficiaryId;
use super::store::Store;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct AccountId(pub i64);

/// A financial account belonging to exactly one beneficiary
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    account_id: AccountId,

    /// Expected to reference a loaded beneficiary, but never enforced
    beneficiary_id: BeneficiaryId,
}

impl Account {
    pub fn new(account_id: AccountId, beneficiary_id: BeneficiaryId) -> Self {
        Self {
            account_id,
            beneficiary_id,
        }
    }

    /// All accounts owned by the beneficiary, in load order.
    pub fn find_by_beneficiary(beneficiary_id: BeneficiaryId, store: &Store) -> Vec<&Account> {
        store
            .accounts
            .iter()
            .filter(|account| account.beneficiary_id == beneficiary_id)
            .collect()
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn beneficiary_id(&self) -> BeneficiaryId {
        self.beneficiary_id
    }
}
