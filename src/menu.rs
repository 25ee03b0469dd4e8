use std::{collections::HashSet, fs, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    icons::IconId,
    models::{Role, User},
    session::Session,
};

/// Menu shipped with the binary; `MENU_CONFIG_PATH` replaces it.
const BUILTIN_MENU: &str = include_str!("../config/menu.json");

/// SubmenuItem
///
/// A link nested under a submenu entry. Children carry no roles of their own: they are
/// shown whenever their parent is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmenuItem {
    pub label: String,
    pub route: String,
}

/// MenuEntry
///
/// One top-level navigation node: either a direct link (`route`) or a group of links
/// (`submenu`), visible to the listed `roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MenuEntry {
    pub label: String,
    pub icon: IconId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submenu: Vec<SubmenuItem>,
    pub roles: Vec<Role>,
}

/// Borrowed view of what a menu entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget<'a> {
    Route(&'a str),
    Submenu(&'a [SubmenuItem]),
}

impl MenuEntry {
    pub fn target(&self) -> MenuTarget<'_> {
        match &self.route {
            Some(route) => MenuTarget::Route(route),
            None => MenuTarget::Submenu(&self.submenu),
        }
    }

    /// Set membership: any listed role sees the entry.
    pub fn is_visible_to(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Every route this entry links to, in display order.
    pub fn links(&self) -> Vec<&str> {
        match self.target() {
            MenuTarget::Route(route) => vec![route],
            MenuTarget::Submenu(items) => items.iter().map(|item| item.route.as_str()).collect(),
        }
    }

    fn validate(&self, index: usize) -> Result<(), MenuConfigError> {
        if self.label.trim().is_empty() {
            return Err(MenuConfigError::EmptyLabel { index });
        }
        let label = || self.label.clone();

        if self.roles.is_empty() {
            return Err(MenuConfigError::NoRoles { label: label() });
        }
        match (&self.route, self.submenu.is_empty()) {
            (Some(_), false) => return Err(MenuConfigError::AmbiguousTarget { label: label() }),
            (None, true) => return Err(MenuConfigError::MissingTarget { label: label() }),
            _ => {}
        }
        for item in &self.submenu {
            if item.label.trim().is_empty() {
                return Err(MenuConfigError::EmptyLabel { index });
            }
        }
        for route in self.links() {
            if !route.starts_with('/') {
                return Err(MenuConfigError::InvalidRoute {
                    label: label(),
                    route: route.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MenuConfigError {
    #[error("cannot read menu configuration `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed menu configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("menu entry #{index} has an empty label")]
    EmptyLabel { index: usize },
    #[error("menu entry `{label}` lists no roles")]
    NoRoles { label: String },
    #[error("menu entry `{label}` declares both a route and a submenu")]
    AmbiguousTarget { label: String },
    #[error("menu entry `{label}` declares neither a route nor a submenu")]
    MissingTarget { label: String },
    #[error("menu entry `{label}` links to `{route}`, which is not an absolute path")]
    InvalidRoute { label: String, route: String },
    #[error("menu label `{label}` is declared more than once")]
    DuplicateLabel { label: String },
}

/// visible_entries
///
/// The entries `user` may see, in declaration order. No user, no menu.
pub fn visible_entries<'a>(entries: &'a [MenuEntry], user: Option<&User>) -> Vec<&'a MenuEntry> {
    match user {
        Some(user) => entries
            .iter()
            .filter(|entry| entry.is_visible_to(user.role))
            .collect(),
        None => Vec::new(),
    }
}

/// MenuDescriptor
///
/// The validated, immutable navigation structure. Built once at startup and shared
/// through `AppState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDescriptor {
    entries: Vec<MenuEntry>,
}

pub type MenuState = Arc<MenuDescriptor>;

impl MenuDescriptor {
    pub fn builtin() -> Result<Self, MenuConfigError> {
        Self::from_json(BUILTIN_MENU)
    }

    /// Loads the menu from `path`, or the built-in one when no path is configured.
    pub fn load(path: Option<&str>) -> Result<Self, MenuConfigError> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| MenuConfigError::Io {
                    path: path.to_string(),
                    source,
                })?;
                Self::from_json(&raw)
            }
            None => Self::builtin(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, MenuConfigError> {
        let entries: Vec<MenuEntry> = serde_json::from_str(raw)?;
        Self::new(entries)
    }

    pub fn new(entries: Vec<MenuEntry>) -> Result<Self, MenuConfigError> {
        let mut labels = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            entry.validate(index)?;
            if !labels.insert(entry.label.as_str()) {
                return Err(MenuConfigError::DuplicateLabel {
                    label: entry.label.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn visible_to(&self, session: &Session) -> Vec<&MenuEntry> {
        visible_entries(&self.entries, session.current_user())
    }

    /// First link a role can see; where a fresh login is sent.
    pub fn landing_for(&self, role: Role) -> Option<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.is_visible_to(role))
            .flat_map(|entry| entry.links())
            .next()
    }
}
