//! Shared application state

use std::sync::Arc;

use busgo_agent::{DelegatedDialogue, ScriptedDialogue};
use busgo_config::Settings;
use busgo_store::InventoryStore;

use crate::session::SessionManager;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,
    /// Route and reservation inventory
    pub store: Arc<InventoryStore>,
    /// Active sessions
    pub sessions: Arc<SessionManager>,
    /// Typed-chat dialogue driver
    pub scripted: Arc<ScriptedDialogue>,
    /// Voice-flow dialogue driver
    pub delegated: Arc<DelegatedDialogue>,
}
