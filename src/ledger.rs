//! Keyed balance store: identity → (minted amount, item count, updated at).
//!
//! `put` replaces the stored record in full. It does not add to the previous
//! balance: writing `(5.0, 2)` then `(7.0, 1)` leaves `(7.0, 1)`.
//! `get` on an identity that was never written returns `(0.0, 0)`.
//!
//! Two backends implement [`Ledger`]:
//!
//! - [`MemoryLedger`]: process-local `hashbrown::HashMap` behind a lock.
//! - [`FileLedger`] (`serde` feature): a JSON object on disk, rewritten
//!   atomically on every `put`.

use chrono::{DateTime, Utc};

use crate::error::{EsqetError, EsqetResult};

// ─── Records ────────────────────────────────────────────────────────────────

/// Balance view of a ledger entry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Balance {
    /// Minted amount last written for the identity.
    pub minted_amount: f64,
    /// Item count last written for the identity.
    pub item_count: u64,
}

/// Full ledger entry for one identity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerRecord {
    /// Minted amount, finite and >= 0.
    pub minted_amount: f64,
    /// Item count.
    pub item_count: u64,
    /// UTC time of the last `put`, serialized as RFC 3339.
    pub updated_at: DateTime<Utc>,
}

impl LedgerRecord {
    fn stamped(minted_amount: f64, item_count: u64) -> EsqetResult<Self> {
        if !minted_amount.is_finite() || minted_amount < 0.0 {
            return Err(EsqetError::Ledger(format!(
                "minted amount must be finite and >= 0, got {minted_amount}"
            )));
        }
        Ok(Self {
            minted_amount,
            item_count,
            updated_at: Utc::now(),
        })
    }

    /// Balance part of the record.
    pub fn balance(&self) -> Balance {
        Balance {
            minted_amount: self.minted_amount,
            item_count: self.item_count,
        }
    }
}

// ─── Ledger trait ───────────────────────────────────────────────────────────

/// Keyed store consumed by the pipeline. Implementations must make a single
/// `put` atomic with respect to concurrent writers.
pub trait Ledger {
    /// Replace the record for `identity`.
    fn put(&self, identity: &str, minted_amount: f64, item_count: u64) -> EsqetResult<()>;

    /// Full record for `identity`, or `None` if never written.
    fn record(&self, identity: &str) -> EsqetResult<Option<LedgerRecord>>;

    /// Balance for `identity`; `(0.0, 0)` if never written.
    fn get(&self, identity: &str) -> EsqetResult<Balance> {
        Ok(self
            .record(identity)?
            .map(|r| r.balance())
            .unwrap_or_default())
    }
}

fn check_identity(identity: &str) -> EsqetResult<()> {
    if identity.is_empty() {
        return Err(EsqetError::Ledger("identity must not be empty".into()));
    }
    Ok(())
}

// ─── MemoryLedger ───────────────────────────────────────────────────────────

/// In-process ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: parking_lot::RwLock<hashbrown::HashMap<String, LedgerRecord>>,
}

impl MemoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities stored.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Ledger for MemoryLedger {
    fn put(&self, identity: &str, minted_amount: f64, item_count: u64) -> EsqetResult<()> {
        check_identity(identity)?;
        let record = LedgerRecord::stamped(minted_amount, item_count)?;
        self.records.write().insert(identity.to_owned(), record);
        tracing::info!(identity, minted_amount, item_count, "ledger record replaced");
        Ok(())
    }

    fn record(&self, identity: &str) -> EsqetResult<Option<LedgerRecord>> {
        Ok(self.records.read().get(identity).cloned())
    }
}

// ─── FileLedger ─────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
pub use file::FileLedger;

#[cfg(feature = "serde")]
mod file {
    use std::collections::BTreeMap;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use parking_lot::Mutex;

    use super::{check_identity, Ledger, LedgerRecord};
    use crate::error::{EsqetError, EsqetResult};

    type Table = BTreeMap<String, LedgerRecord>;

    /// Ledger persisted as a pretty-printed JSON object keyed by identity.
    ///
    /// Every `put` is a read-modify-write under a process-wide lock, and the
    /// file is replaced by rename so readers never observe a partial write.
    #[derive(Debug)]
    pub struct FileLedger {
        path: PathBuf,
        lock: Mutex<()>,
    }

    impl FileLedger {
        /// Open (or lazily create) the ledger at `path`.
        pub fn open(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                lock: Mutex::new(()),
            }
        }

        /// Backing file path.
        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Every stored record, ordered by identity.
        pub fn entries(&self) -> EsqetResult<Vec<(String, LedgerRecord)>> {
            let _guard = self.lock.lock();
            Ok(self.load()?.into_iter().collect())
        }

        fn load(&self) -> EsqetResult<Table> {
            match std::fs::read(&self.path) {
                Ok(bytes) if bytes.is_empty() => Ok(Table::new()),
                Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                    EsqetError::Ledger(format!("{}: {e}", self.path.display()))
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Table::new()),
                Err(e) => Err(EsqetError::Ledger(format!("{}: {e}", self.path.display()))),
            }
        }

        fn store(&self, table: &Table) -> EsqetResult<()> {
            let ledger_err = |e: std::io::Error| {
                EsqetError::Ledger(format!("{}: {e}", self.path.display()))
            };
            let mut tmp = self.path.clone().into_os_string();
            tmp.push(".tmp");
            let tmp = PathBuf::from(tmp);
            let bytes = serde_json::to_vec_pretty(table)
                .map_err(|e| EsqetError::Ledger(format!("{}: {e}", self.path.display())))?;
            {
                let mut f = std::fs::File::create(&tmp).map_err(ledger_err)?;
                f.write_all(&bytes).map_err(ledger_err)?;
                f.sync_all().map_err(ledger_err)?;
            }
            std::fs::rename(&tmp, &self.path).map_err(ledger_err)
        }
    }

    impl Ledger for FileLedger {
        fn put(&self, identity: &str, minted_amount: f64, item_count: u64) -> EsqetResult<()> {
            check_identity(identity)?;
            let record = LedgerRecord::stamped(minted_amount, item_count)?;
            let _guard = self.lock.lock();
            let mut table = self.load()?;
            table.insert(identity.to_owned(), record);
            if let Err(e) = self.store(&table) {
                tracing::warn!(identity, error = %e, "ledger write failed");
                return Err(e);
            }
            tracing::info!(
                identity,
                minted_amount,
                item_count,
                path = %self.path.display(),
                "ledger record replaced"
            );
            Ok(())
        }

        fn record(&self, identity: &str) -> EsqetResult<Option<LedgerRecord>> {
            let _guard = self.lock.lock();
            Ok(self.load()?.remove(identity))
        }
    }
}
