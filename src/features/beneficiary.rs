use super::store::Store;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct BeneficiaryId(pub i64);

/// The individual owning one or more accounts
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    #[serde(rename = "beneficiaryId")]
    id: BeneficiaryId,
    first_name: String,
    last_name: String,
}

impl Beneficiary {
    pub fn new(id: BeneficiaryId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// First beneficiary in load order with this id, if any.
    pub fn find_by_id(id: BeneficiaryId, store: &Store) -> Option<&Beneficiary> {
        store.beneficiaries.iter().find(|beneficiary| beneficiary.id == id)
    }

    pub fn id(&self) -> BeneficiaryId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}
