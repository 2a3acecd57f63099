//! Redis-backed store client
//!
//! One multiplexed connection per namespace: the lifecycle sets map onto
//! logical databases 0-3 and the settings record onto database 4. Every
//! command runs through a bounded retry loop so a brief network hiccup does
//! not kill a run, while a store that stays down surfaces
//! [`StoreError::Unavailable`] to the caller.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, FromRedisValue, RedisError};
use std::time::Duration;

use crate::store::{Namespace, Store, StoreError, StoreResult};

/// Command attempts before reporting the store unavailable.
const MAX_RETRIES: u32 = 10;

/// Delay between retry attempts.
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// SCAN page size hint.
const SCAN_COUNT: usize = 100;

/// Store client speaking the Redis protocol
#[derive(Clone)]
pub struct RedisStore {
    todo: ConnectionManager,
    doing: ConnectionManager,
    done: ConnectionManager,
    trash: ConnectionManager,
    settings: ConnectionManager,
}

impl RedisStore {
    /// Connects to the store at `host:port`, opening one connection per
    /// namespace.
    pub async fn connect(host: &str, port: u16) -> StoreResult<Self> {
        Ok(Self {
            todo: open(host, port, Namespace::Todo).await?,
            doing: open(host, port, Namespace::Doing).await?,
            done: open(host, port, Namespace::Done).await?,
            trash: open(host, port, Namespace::Trash).await?,
            settings: open(host, port, Namespace::Settings).await?,
        })
    }

    fn conn(&self, ns: Namespace) -> ConnectionManager {
        match ns {
            Namespace::Todo => self.todo.clone(),
            Namespace::Doing => self.doing.clone(),
            Namespace::Done => self.done.clone(),
            Namespace::Trash => self.trash.clone(),
            Namespace::Settings => self.settings.clone(),
        }
    }

    /// Runs one command with bounded retries on transient failures.
    async fn query<T: FromRedisValue>(&self, ns: Namespace, cmd: &redis::Cmd) -> StoreResult<T> {
        let mut conn = self.conn(ns);
        let mut attempt = 0u32;
        loop {
            match cmd.query_async::<_, T>(&mut conn).await {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(StoreError::Unavailable {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    tracing::debug!("store command failed (attempt {attempt}): {e}");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(StoreError::Protocol(e.to_string())),
            }
        }
    }
}

async fn open(host: &str, port: u16, ns: Namespace) -> StoreResult<ConnectionManager> {
    let addr = format!("{host}:{port}");
    let client =
        Client::open(format!("redis://{addr}/{}", ns.db_index())).map_err(|e| StoreError::Connect {
            addr: addr.clone(),
            message: e.to_string(),
        })?;
    ConnectionManager::new(client)
        .await
        .map_err(|e| StoreError::Connect {
            addr,
            message: e.to_string(),
        })
}

fn is_transient(e: &RedisError) -> bool {
    e.is_io_error() || e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal()
}

#[async_trait]
impl Store for RedisStore {
    async fn put(&self, ns: Namespace, key: &str, value: &str) -> StoreResult<()> {
        self.query(ns, redis::cmd("SET").arg(key).arg(value)).await
    }

    async fn get(&self, ns: Namespace, key: &str) -> StoreResult<Option<String>> {
        self.query(ns, redis::cmd("GET").arg(key)).await
    }

    async fn delete(&self, ns: Namespace, key: &str) -> StoreResult<bool> {
        let removed: u64 = self.query(ns, redis::cmd("DEL").arg(key)).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, ns: Namespace, key: &str) -> StoreResult<bool> {
        self.query(ns, redis::cmd("EXISTS").arg(key)).await
    }

    async fn random_key(&self, ns: Namespace) -> StoreResult<Option<String>> {
        self.query(ns, &redis::cmd("RANDOMKEY")).await
    }

    async fn scan_all(&self, ns: Namespace) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, mut page): (u64, Vec<String>) = self
                .query(ns, redis::cmd("SCAN").arg(cursor).arg("COUNT").arg(SCAN_COUNT))
                .await?;
            keys.append(&mut page);
            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }

    async fn size(&self, ns: Namespace) -> StoreResult<u64> {
        self.query(ns, &redis::cmd("DBSIZE")).await
    }

    async fn flush_all(&self) -> StoreResult<()> {
        // FLUSHALL wipes every logical database, so one call covers all
        // five namespaces.
        self.query(Namespace::Todo, &redis::cmd("FLUSHALL")).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let _: String = self.query(Namespace::Settings, &redis::cmd("PING")).await?;
        Ok(())
    }
}
