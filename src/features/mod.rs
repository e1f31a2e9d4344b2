mod account;
mod beneficiary;
mod clock;
mod store;
mod transaction;

pub use self::{
    account::{Account, AccountId},
    beneficiary::{Beneficiary, BeneficiaryId},
    clock::{Clock, FixedClock, SystemClock},
    store::Store,
    transaction::{Transaction, TransactionError, TransactionId, TransactionType},
};
