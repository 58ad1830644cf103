use crate::codes::normalize_code;
use crate::error::{CreateError, StoreError};
use crate::models::{BankCodeRecord, NewBankCode};
use crate::store::SwiftStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub record: BankCodeRecord,
    /// Always empty for a branch; may be empty for a head office too.
    pub branches: Vec<BankCodeRecord>,
}

pub fn resolve(store: &SwiftStore, code: &str) -> Result<Resolution, StoreError> {
    let record = store.find_by_code(&normalize_code(code))?;
    if !record.is_headquarters {
        return Ok(Resolution {
            record,
            branches: Vec::new(),
        });
    }
    let branches = store.find_by_headquarters_code(&record.swift_code)?;
    Ok(Resolution { record, branches })
}

/// Records listed under a country. An empty list is a normal result here;
/// whether it means "not found" is up to the caller.
pub fn list_country(store: &SwiftStore, iso2: &str) -> Result<Vec<BankCodeRecord>, StoreError> {
    store.find_by_country(&normalize_code(iso2))
}

pub fn create(store: &SwiftStore, raw: NewBankCode) -> Result<BankCodeRecord, CreateError> {
    let record = BankCodeRecord::try_from(raw)?;
    store.insert(&record)?;
    Ok(record)
}

pub fn remove(store: &SwiftStore, code: &str) -> Result<(), StoreError> {
    store.delete(&normalize_code(code))
}
