use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// IconId
///
/// Closed set of icons the navigation can draw. Menu configuration names icons by these
/// identifiers; an unknown name is rejected when the menu is loaded instead of rendering
/// an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum IconId {
    FiHome,
    FaTag,
    MdDevices,
    FaGamepad,
    FiUsers,
    FiSettings,
    FiList,
    FiLogOut,
    FiChevronRight,
}

impl IconId {
    pub const ALL: [IconId; 9] = [
        IconId::FiHome,
        IconId::FaTag,
        IconId::MdDevices,
        IconId::FaGamepad,
        IconId::FiUsers,
        IconId::FiSettings,
        IconId::FiList,
        IconId::FiLogOut,
        IconId::FiChevronRight,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            IconId::FiHome => "FiHome",
            IconId::FaTag => "FaTag",
            IconId::MdDevices => "MdDevices",
            IconId::FaGamepad => "FaGamepad",
            IconId::FiUsers => "FiUsers",
            IconId::FiSettings => "FiSettings",
            IconId::FiList => "FiList",
            IconId::FiLogOut => "FiLogOut",
            IconId::FiChevronRight => "FiChevronRight",
        }
    }

    /// HTML entity drawn inside the icon slot.
    pub const fn glyph(self) -> &'static str {
        match self {
            IconId::FiHome => "&#8962;",
            IconId::FaTag => "&#127991;",
            IconId::MdDevices => "&#128421;",
            IconId::FaGamepad => "&#127918;",
            IconId::FiUsers => "&#128101;",
            IconId::FiSettings => "&#9881;",
            IconId::FiList => "&#9776;",
            IconId::FiLogOut => "&#10162;",
            IconId::FiChevronRight => "&#8250;",
        }
    }

    /// Renders the icon as a span the stylesheet can target.
    pub fn render(self) -> String {
        format!(
            r#"<span class="nav-icon icon-{}" aria-hidden="true">{}</span>"#,
            self.name().to_ascii_lowercase(),
            self.glyph()
        )
    }
}

impl fmt::Display for IconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown icon `{0}`")]
pub struct UnknownIcon(pub String);

impl FromStr for IconId {
    type Err = UnknownIcon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IconId::ALL
            .into_iter()
            .find(|icon| icon.name() == s)
            .ok_or_else(|| UnknownIcon(s.to_string()))
    }
}
