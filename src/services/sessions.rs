use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::{
    services::desk::ShiftDesk,
    structs::auth::{Identity, PendingLogin},
    utils::random::random_string,
};

pub const SESSION_COOKIE: &str = "shift_desk_sid";
const SESSION_ID_LENGTH: usize = 32;

/// 每個瀏覽器各自的畫面狀態與登入資訊
#[derive(Debug, Default)]
pub struct Session {
    pub desk: ShiftDesk,
    pub identity: Option<Identity>,
    pub pending_login: Option<PendingLogin>,
    /// 是否已向後端載入過清單
    pub loaded: bool,
    /// 註冊、登入等輔助表單的訊息
    pub auth_message: Option<String>,
}

impl Session {
    pub fn api_token(&self) -> Option<String> {
        self.identity
            .as_ref()
            .map(|identity| identity.api_token.clone())
    }

    /// 有效的登入身分；過期的會被清掉
    pub fn active_identity(&mut self) -> Option<&Identity> {
        if self
            .identity
            .as_ref()
            .is_some_and(|identity| identity.is_expired(Utc::now()))
        {
            tracing::debug!("session identity expired");
            self.sign_out();
        }
        self.identity.as_ref()
    }

    pub fn sign_in(&mut self, identity: Identity) {
        self.identity = Some(identity);
        self.pending_login = None;
        // 換了身分，下次進首頁重新載入
        self.loaded = false;
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
        self.pending_login = None;
        self.loaded = false;
        self.desk = ShiftDesk::default();
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

struct Entry {
    session: SessionHandle,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// 依 cookie 取 session，沒有或已過期就建新的；回傳 (id, session, 是否新建)
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, SessionHandle, bool) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if let Some(id) = id {
            if let Some(entry) = entries.get_mut(id) {
                if now.duration_since(entry.last_seen) < self.ttl {
                    entry.last_seen = now;
                    return (id.to_string(), entry.session.clone(), false);
                }
            }
        }

        let ttl = self.ttl;
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_seen) < ttl);
        if entries.len() < before {
            tracing::debug!("purged {} idle sessions", before - entries.len());
        }

        let id = random_string(SESSION_ID_LENGTH);
        let session: SessionHandle = Arc::new(Mutex::new(Session::default()));
        entries.insert(
            id.clone(),
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );

        (id, session, true)
    }

    pub async fn remove(&self, id: &str) {
        self.entries.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
