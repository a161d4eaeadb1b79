use async_trait::async_trait;
use contracts::domain::a027_inventory_item::DraftSnapshot;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Префикс ключа черновика
pub const DRAFT_KEY_PREFIX: &str = "merch_crm_new_item_draft";

/// Допустимое расхождение часов для `savedAt` из будущего
const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("Draft storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Draft writer is not running")]
    Closed,
}

/// Хранилище сериализованных черновиков по ключу
#[async_trait]
pub trait DraftStorage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, DraftStoreError>;

    async fn save(&self, key: &str, payload: &str) -> Result<(), DraftStoreError>;

    async fn remove(&self, key: &str) -> Result<(), DraftStoreError>;
}

/// Черновики в файлах `<dir>/<key>.json`
pub struct FileDraftStorage {
    dir: PathBuf,
}

impl FileDraftStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl DraftStorage for FileDraftStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, DraftStoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, payload: &str) -> Result<(), DraftStoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DraftStoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

enum Command {
    Persist {
        key: String,
        payload: String,
    },
    Clear {
        key: String,
        ack: oneshot::Sender<Result<(), DraftStoreError>>,
    },
    Flush {
        ack: oneshot::Sender<()>,
    },
}

/// Отложенное сохранение черновиков.
///
/// `persist` не ждет записи: команды уходят фоновой задаче, которая для каждого ключа
/// пишет только последнее состояние, после паузы `debounce` без новых изменений.
#[derive(Clone)]
pub struct DraftStore {
    tx: mpsc::UnboundedSender<Command>,
    storage: Arc<dyn DraftStorage>,
    ttl: Option<chrono::Duration>,
}

impl DraftStore {
    /// Запустить фоновую задачу записи (нужен запущенный runtime tokio)
    pub fn spawn(
        storage: Arc<dyn DraftStorage>,
        debounce: Duration,
        ttl: Option<chrono::Duration>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(Arc::clone(&storage), debounce, rx));
        Self { tx, storage, ttl }
    }

    /// Ключ черновика для вкладки/пользователя
    pub fn key_for(draft_key: Option<&str>) -> String {
        let scope = draft_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or("default");
        format!("{}:{}", DRAFT_KEY_PREFIX, scope)
    }

    pub fn persist(&self, key: &str, snapshot: &DraftSnapshot) {
        let payload = match serde_json::to_string(snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to serialize draft {}: {}", key, e);
                return;
            }
        };
        let command = Command::Persist {
            key: key.to_string(),
            payload,
        };
        if self.tx.send(command).is_err() {
            tracing::warn!("Draft writer stopped, draft {} not saved", key);
        }
    }

    /// Прочитать черновик. Отсутствующий, поврежденный или просроченный черновик
    /// дает `None`; ошибки только логируются.
    pub async fn restore(&self, key: &str) -> Option<DraftSnapshot> {
        self.flush().await;

        let raw = match self.storage.load(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to load draft {}: {}", key, e);
                return None;
            }
        };

        let snapshot: DraftSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Ignoring corrupted draft {}: {}", key, e);
                return None;
            }
        };

        let now = chrono::Utc::now();
        let ahead = snapshot.saved_at.signed_duration_since(now);
        if ahead > chrono::TimeDelta::seconds(CLOCK_SKEW_SECS) {
            tracing::warn!(
                "Discarding draft {} saved in the future at {}",
                key,
                snapshot.saved_at
            );
            self.discard(key).await;
            return None;
        }

        if let Some(ttl) = self.ttl {
            // None: срок хранения выходит за пределы календаря
            let expired = match snapshot.saved_at.checked_add_signed(ttl) {
                Some(expires_at) => expires_at < now,
                None => true,
            };
            if expired {
                tracing::info!("Discarding expired draft {} saved at {}", key, snapshot.saved_at);
                self.discard(key).await;
                return None;
            }
        }

        Some(snapshot)
    }

    async fn discard(&self, key: &str) {
        if let Err(e) = self.storage.remove(key).await {
            tracing::warn!("Failed to remove draft {}: {}", key, e);
        }
    }

    /// Удалить черновик вместе с ожидающей записью
    pub async fn clear(&self, key: &str) -> Result<(), DraftStoreError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Clear {
                key: key.to_string(),
                ack,
            })
            .map_err(|_| DraftStoreError::Closed)?;
        done.await.map_err(|_| DraftStoreError::Closed)?
    }

    /// Записать все ожидающие черновики немедленно
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush { ack }).is_ok() {
            let _ = done.await;
        }
    }
}

async fn write(storage: &dyn DraftStorage, key: &str, payload: &str) {
    match storage.save(key, payload).await {
        Ok(()) => tracing::debug!("Draft {} saved", key),
        Err(e) => tracing::warn!("Failed to save draft {}: {}", key, e),
    }
}

async fn run_writer(
    storage: Arc<dyn DraftStorage>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: HashMap<String, (String, Instant)> = HashMap::new();

    loop {
        let next_deadline = pending.values().map(|(_, deadline)| *deadline).min();
        let sleep_until = next_deadline.unwrap_or_else(|| Instant::now() + debounce);

        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Persist { key, payload }) => {
                    pending.insert(key, (payload, Instant::now() + debounce));
                }
                Some(Command::Clear { key, ack }) => {
                    pending.remove(&key);
                    let _ = ack.send(storage.remove(&key).await);
                }
                Some(Command::Flush { ack }) => {
                    for (key, (payload, _)) in pending.drain() {
                        write(storage.as_ref(), &key, &payload).await;
                    }
                    let _ = ack.send(());
                }
                None => {
                    for (key, (payload, _)) in pending.drain() {
                        write(storage.as_ref(), &key, &payload).await;
                    }
                    break;
                }
            },
            _ = tokio::time::sleep_until(sleep_until), if next_deadline.is_some() => {
                let now = Instant::now();
                let due: Vec<String> = pending
                    .iter()
                    .filter(|(_, (_, deadline))| *deadline <= now)
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in due {
                    if let Some((payload, _)) = pending.remove(&key) {
                        write(storage.as_ref(), &key, &payload).await;
                    }
                }
            }
        }
    }

    tracing::debug!("Draft writer stopped");
}
