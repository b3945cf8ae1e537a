use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

pub(crate) const SERVICE_NAME: &str = "flowstate-sync";
const KEYRING_SERVER: &str = "remote-session";

/// The identity all remote rows are scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Resolving,
    SignedOut,
    SignedIn(Session),
}

/// Answers "is remote sync configured, and who is signed in". The identity
/// itself lives in `session.json` in the data dir; the access token lives in
/// the system keyring. Everything else about auth belongs to the remote
/// provider, not to us.
pub struct SessionGate {
    configured: bool,
    session_path: PathBuf,
    state_tx: watch::Sender<SessionState>,
}

impl SessionGate {
    pub fn new(configured: bool, session_path: impl Into<PathBuf>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Resolving);
        Self {
            configured,
            session_path: session_path.into(),
            state_tx,
        }
    }

    pub fn configured(&self) -> bool {
        self.configured
    }

    pub fn loading(&self) -> bool {
        *self.state_tx.borrow() == SessionState::Resolving
    }

    pub fn session(&self) -> Option<Session> {
        match &*self.state_tx.borrow() {
            SessionState::SignedIn(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Watch for sign-in/sign-out transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Work out whether a usable identity exists. Unconfigured setups and
    /// machines without a persisted identity resolve signed-out without ever
    /// touching the keyring.
    pub async fn resolve(&self) {
        if !self.configured || !self.session_path.exists() {
            self.state_tx.send_replace(SessionState::SignedOut);
            return;
        }

        let session = match self.read_persisted() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Discarding unreadable session file: {}", e);
                let _ = fs::remove_file(&self.session_path);
                self.state_tx.send_replace(SessionState::SignedOut);
                return;
            }
        };

        match load_access_token().await {
            Ok(Some(_)) => {
                log::info!("Resolved session for {}", session.email);
                self.state_tx.send_replace(SessionState::SignedIn(session));
            }
            Ok(None) => {
                log::info!("Session file present but no access token stored");
                self.state_tx.send_replace(SessionState::SignedOut);
            }
            Err(e) => {
                log::warn!("Keyring unavailable: {}", e);
                self.state_tx.send_replace(SessionState::SignedOut);
            }
        }
    }

    /// Persist an identity and its token, then announce the sign-in.
    pub async fn sign_in(&self, session: Session, access_token: &str) -> Result<(), String> {
        store_access_token(access_token).await?;
        self.write_persisted(&session)?;
        self.state_tx.send_replace(SessionState::SignedIn(session));
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), String> {
        clear_access_token().await?;
        if self.session_path.exists() {
            fs::remove_file(&self.session_path)
                .map_err(|e| format!("Failed to remove session file: {}", e))?;
        }
        self.state_tx.send_replace(SessionState::SignedOut);
        Ok(())
    }

    fn read_persisted(&self) -> Result<Session, String> {
        let raw = fs::read_to_string(&self.session_path)
            .map_err(|e| format!("Failed to read session file: {}", e))?;
        serde_json::from_str(&raw).map_err(|e| format!("Failed to parse session file: {}", e))
    }

    fn write_persisted(&self, session: &Session) -> Result<(), String> {
        if let Some(parent) = self.session_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data dir: {}", e))?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| format!("Failed to encode session: {}", e))?;
        fs::write(&self.session_path, json)
            .map_err(|e| format!("Failed to write session file: {}", e))
    }
}

/// Store the remote access token in the system keyring via Secret Service.
pub async fn store_access_token(token: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", KEYRING_SERVER);

    keyring
        .create_item(
            &format!("Flowstate session ({})", KEYRING_SERVER),
            &attrs,
            token.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store access token: {}", e))?;

    Ok(())
}

/// Load the remote access token from the system keyring, if one is stored.
pub async fn load_access_token() -> Result<Option<String>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", KEYRING_SERVER);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let token = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        return Ok(Some(token));
    }

    Ok(None)
}

/// Delete the remote access token from the system keyring.
pub async fn clear_access_token() -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", KEYRING_SERVER);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete access token: {}", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("flowstate-session-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn unconfigured_gate_resolves_signed_out() {
        let gate = SessionGate::new(false, scratch_path());
        assert!(gate.loading());
        gate.resolve().await;
        assert!(!gate.loading());
        assert_eq!(gate.session(), None);
    }

    #[tokio::test]
    async fn configured_gate_without_identity_resolves_signed_out() {
        let gate = SessionGate::new(true, scratch_path());
        gate.resolve().await;
        assert_eq!(gate.session(), None);
        assert!(!gate.loading());
    }

    #[tokio::test]
    async fn subscribers_see_the_resolution() {
        let gate = SessionGate::new(false, scratch_path());
        let mut rx = gate.subscribe();
        assert_eq!(*rx.borrow(), SessionState::Resolving);
        gate.resolve().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SessionState::SignedOut);
    }
}
