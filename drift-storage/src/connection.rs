//! Connection management: one writer connection behind a mutex (WAL's
//! single-writer rule), a bounded pool of reader connections, and the
//! pragmas that make concurrent reads safe while a write is in flight.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use drift_core::errors::StorageError;
use rusqlite::Connection;

use crate::migrations::apply_pending_migrations;

const READER_POOL_SIZE: usize = 4;

fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

fn set_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA mmap_size = 268435456;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(sqe)
}

/// Owns the single write connection and a small pool of read connections.
/// All writes go through `with_writer` (serialized); all reads through
/// `with_reader` (parallel, each on its own connection).
pub struct DatabaseManager {
    path: Option<PathBuf>,
    writer: Mutex<Connection>,
    reader_tx: Sender<Connection>,
    reader_rx: Receiver<Connection>,
}

impl DatabaseManager {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(sqe)?;
        set_pragmas(&writer)?;
        apply_pending_migrations(&writer)?;

        let (reader_tx, reader_rx) = crossbeam_channel::bounded(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let reader = Connection::open(path).map_err(sqe)?;
            set_pragmas(&reader)?;
            reader_tx.send(reader).map_err(|e| sqe(e))?;
        }

        Ok(Self {
            path: Some(path.to_path_buf()),
            writer: Mutex::new(writer),
            reader_tx,
            reader_rx,
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        // A shared in-memory database so the reader pool sees the writer's
        // data; plain `:memory:` connections are each their own database.
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:drift-mem-{id}?mode=memory&cache=shared");
        let writer = Connection::open(&uri).map_err(sqe)?;
        set_pragmas(&writer)?;
        apply_pending_migrations(&writer)?;

        let (reader_tx, reader_rx) = crossbeam_channel::bounded(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let reader = Connection::open(&uri).map_err(sqe)?;
            reader_tx.send(reader).map_err(|e| sqe(e))?;
        }

        Ok(Self {
            path: None,
            writer: Mutex::new(writer),
            reader_tx,
            reader_rx,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the single write connection, serialized with every
    /// other writer. Callers issue `BEGIN IMMEDIATE` themselves when a
    /// multi-statement transaction needs atomicity.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        f(&conn)
    }

    /// Borrow a pooled reader connection, blocking until one is free.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.reader_rx.recv().map_err(|e| sqe(e))?;
        let result = f(&conn);
        let _ = self.reader_tx.send(conn);
        result
    }

    /// Open an extra connection for the batch writer thread, which needs
    /// its own handle distinct from the synchronous writer path.
    pub fn open_batch_connection(&self) -> Result<Connection, StorageError> {
        let conn = match &self.path {
            Some(path) => Connection::open(path).map_err(sqe)?,
            None => return self.with_writer(|_| Err(StorageError::NotSupported {
                operation: "open_batch_connection".into(),
                reason: "in-memory engines share the writer connection directly".into(),
            })),
        };
        set_pragmas(&conn)?;
        Ok(conn)
    }

    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);").map_err(sqe)
        })
    }
}
