//! In-memory registration store with injectable faults.

use async_trait::async_trait;
use std::io;
use std::sync::Mutex;

use crate::registrations::store::{replace_record, RegistrationStore, StoreError};
use crate::registrations::types::{normalize_address, RegistrationRecord};

#[derive(Default)]
pub(crate) struct MemoryStore {
    records: Mutex<Vec<RegistrationRecord>>,
    fail_reads: bool,
    fail_upserts: bool,
    fail_deletes: bool,
}

fn fault(op: &str) -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::Other, format!("simulated {} fault", op)))
}

impl MemoryStore {
    pub fn with_records(records: Vec<RegistrationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_upserts(mut self) -> Self {
        self.fail_upserts = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn records(&self) -> Vec<RegistrationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        if self.fail_reads {
            return Err(fault("read"));
        }
        Ok(self.records())
    }

    async fn upsert(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        if self.fail_upserts {
            return Err(fault("write"));
        }
        replace_record(&mut self.records.lock().unwrap(), record);
        Ok(())
    }

    async fn delete_by_key(&self, address: &str) -> Result<(), StoreError> {
        if self.fail_deletes {
            return Err(fault("delete"));
        }
        let key = normalize_address(address);
        self.records.lock().unwrap().retain(|r| r.key() != key);
        Ok(())
    }
}
