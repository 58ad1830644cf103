use crate::error::StoreError;
use crate::models::BankCodeRecord;
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS swift_codes (
        country_iso2   TEXT NOT NULL,
        swift_code     TEXT PRIMARY KEY,
        code_type      TEXT NOT NULL,
        name           TEXT NOT NULL,
        address        TEXT NOT NULL,
        town_name      TEXT NOT NULL,
        country_name   TEXT NOT NULL,
        time_zone      TEXT NOT NULL,
        is_headquarter INTEGER NOT NULL,
        hq_swift_code  TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS idx_swift_codes_hq ON swift_codes(hq_swift_code);
    CREATE INDEX IF NOT EXISTS idx_swift_codes_country ON swift_codes(country_iso2);
"#;

const COLUMNS: &str = "country_iso2, swift_code, code_type, name, address, \
                       town_name, country_name, time_zone, is_headquarter, hq_swift_code";

/// SQLite-backed record store. Writes are serialized by the connection lock.
pub struct SwiftStore {
    conn: Mutex<Connection>,
}

impl SwiftStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path == Path::new(":memory:") {
            return Self::open_in_memory();
        }
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn insert(&self, record: &BankCodeRecord) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "INSERT INTO swift_codes ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        );
        conn.execute(
            &sql,
            params![
                record.country_iso2,
                record.swift_code,
                record.code_type,
                record.name,
                record.address,
                record.town_name,
                record.country_name,
                record.time_zone,
                record.is_headquarters,
                record.headquarters_code,
            ],
        )
        .map_err(|err| match err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                StoreError::DuplicateKey(record.swift_code.clone())
            }
            other => StoreError::Storage(other),
        })?;
        Ok(())
    }

    pub fn find_by_code(&self, code: &str) -> Result<BankCodeRecord, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {COLUMNS} FROM swift_codes WHERE swift_code = ?1");
        conn.query_row(&sql, params![code], read_record)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    pub fn find_by_headquarters_code(&self, code: &str) -> Result<Vec<BankCodeRecord>, StoreError> {
        self.select_where("hq_swift_code", code)
    }

    pub fn find_by_country(&self, iso2: &str) -> Result<Vec<BankCodeRecord>, StoreError> {
        self.select_where("country_iso2", &iso2.to_uppercase())
    }

    /// Removes the record if present. Deleting an unknown code is not an error.
    pub fn delete(&self, code: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM swift_codes WHERE swift_code = ?1", params![code])?;
        log::debug!("delete {} removed {} row(s)", code, removed);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn select_where(&self, column: &str, value: &str) -> Result<Vec<BankCodeRecord>, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {COLUMNS} FROM swift_codes WHERE {column} = ?1 ORDER BY rowid");
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![value], read_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<BankCodeRecord> {
    Ok(BankCodeRecord {
        country_iso2: row.get(0)?,
        swift_code: row.get(1)?,
        code_type: row.get(2)?,
        name: row.get(3)?,
        address: row.get(4)?,
        town_name: row.get(5)?,
        country_name: row.get(6)?,
        time_zone: row.get(7)?,
        is_headquarters: row.get(8)?,
        headquarters_code: row.get(9)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(iso2: &str, code: &str, hq_code: &str) -> BankCodeRecord {
        BankCodeRecord {
            country_iso2: iso2.to_string(),
            swift_code: code.to_string(),
            code_type: if hq_code.is_empty() { "BANK" } else { "BRANCH" }.to_string(),
            name: "ZELAND NATIONAL BANK".to_string(),
            address: "1 MAIN PLAZA".to_string(),
            town_name: "CAPITAL".to_string(),
            country_name: "ZELAND".to_string(),
            time_zone: "UTC+00:00".to_string(),
            is_headquarters: hq_code.is_empty(),
            headquarters_code: hq_code.to_string(),
        }
    }

    #[test]
    fn insert_then_find_by_code() {
        let store = SwiftStore::open_in_memory().unwrap();
        let head_office = record("ZZ", "ZZBANKXXX", "");
        store.insert(&head_office).unwrap();

        assert_eq!(store.find_by_code("ZZBANKXXX").unwrap(), head_office);
        assert!(matches!(
            store.find_by_code("zzbankxxx"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_insert_leaves_store_unchanged() {
        let store = SwiftStore::open_in_memory().unwrap();
        store.insert(&record("ZZ", "ZZBANKXXX", "")).unwrap();

        let mut clash = record("AA", "ZZBANKXXX", "");
        clash.name = "OTHER BANK".to_string();
        assert!(matches!(
            store.insert(&clash),
            Err(StoreError::DuplicateKey(code)) if code == "ZZBANKXXX"
        ));
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find_by_code("ZZBANKXXX").unwrap().name, "ZELAND NATIONAL BANK");
    }

    #[test]
    fn other_constraint_failures_are_storage_errors() {
        let store = SwiftStore::open_in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute_batch("CREATE UNIQUE INDEX idx_unique_name ON swift_codes(name)")
            .unwrap();
        store.insert(&record("ZZ", "ZZBANKXXX", "")).unwrap();

        let same_name = record("ZZ", "YYBANKXXX", "");
        assert!(matches!(
            store.insert(&same_name),
            Err(StoreError::Storage(_))
        ));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn branches_come_back_in_insertion_order() {
        let store = SwiftStore::open_in_memory().unwrap();
        store.insert(&record("ZZ", "ZZBANK002", "ZZBANKXXX")).unwrap();
        store.insert(&record("ZZ", "ZZBANKXXX", "")).unwrap();
        store.insert(&record("ZZ", "ZZBANK001", "ZZBANKXXX")).unwrap();
        store.insert(&record("ZZ", "YYBANK001", "YYBANKXXX")).unwrap();

        let codes: Vec<String> = store
            .find_by_headquarters_code("ZZBANKXXX")
            .unwrap()
            .into_iter()
            .map(|branch| branch.swift_code)
            .collect();
        assert_eq!(codes, vec!["ZZBANK002", "ZZBANK001"]);
        assert!(store.find_by_headquarters_code("NOBANKXXX").unwrap().is_empty());
    }

    #[test]
    fn country_listing_is_case_insensitive_on_input() {
        let store = SwiftStore::open_in_memory().unwrap();
        store.insert(&record("AA", "AABANKXXX", "")).unwrap();
        store.insert(&record("BB", "BBBANKXXX", "")).unwrap();

        let listed = store.find_by_country("aa").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].country_iso2, "AA");
        assert!(store.find_by_country("CC").unwrap().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let store = SwiftStore::open_in_memory().unwrap();
        store.delete("ANY").unwrap();

        store.insert(&record("ZZ", "ZZBANKXXX", "")).unwrap();
        store.delete("ZZBANKXXX").unwrap();
        store.delete("ZZBANKXXX").unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn schema_creation_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("swift_codes.db");
        {
            let store = SwiftStore::open(&path).unwrap();
            store.insert(&record("ZZ", "ZZBANKXXX", "")).unwrap();
        }
        let reopened = SwiftStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
