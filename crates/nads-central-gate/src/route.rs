use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-side application routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// `/` - landing page and wallet gate
    Landing,
    /// `/members` - post-gate dashboard
    Members,
    /// `/locked` - explicit denial
    Locked,
    /// Any other path
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Landing,
            "/members" => Route::Members,
            "/locked" => Route::Locked,
            _ => Route::NotFound,
        }
    }

    /// Canonical path; `NotFound` has none
    pub fn path(&self) -> Option<&'static str> {
        match self {
            Route::Landing => Some("/"),
            Route::Members => Some("/members"),
            Route::Locked => Some("/locked"),
            Route::NotFound => None,
        }
    }

    /// Whether the gate controls navigation away from this route
    pub fn is_gated(&self) -> bool {
        !matches!(self, Route::NotFound)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().unwrap_or("<not found>"))
    }
}
