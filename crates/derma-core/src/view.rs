use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::user::User;

/// Top-level screens of the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Home,
    Login,
    Register,
    Products,
    AiChat,
    Admin,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Home,
        View::Login,
        View::Register,
        View::Products,
        View::AiChat,
        View::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Register => "register",
            Self::Products => "products",
            Self::AiChat => "ai-chat",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        View::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .or(match s.as_str() {
                "chat" | "ai_chat" => Some(View::AiChat),
                "shop" => Some(View::Products),
                _ => None,
            })
            .ok_or_else(|| format!("unknown view '{s}'"))
    }
}

/// In-memory view selection. Every transition is unconditional except
/// [`View::Admin`], which requires an admin user and falls back to home.
#[derive(Debug, Clone, Default)]
pub struct Router {
    current: View,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    /// Switches to `target` and returns the view actually shown.
    pub fn navigate(&mut self, target: View, user: Option<&User>) -> View {
        self.current = match target {
            View::Admin if !user.is_some_and(User::is_admin) => {
                tracing::debug!("admin view refused, redirecting home");
                View::Home
            }
            other => other,
        };
        self.current
    }

    pub fn on_login(&mut self) {
        self.current = View::Home;
    }

    pub fn on_register(&mut self) {
        self.current = View::Login;
    }

    pub fn on_logout(&mut self) {
        self.current = View::Home;
    }
}
