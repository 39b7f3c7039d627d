//! View Router: exactly one visible section at a time.
//!
//! Each section carries its own visibility flag, mirroring the page where
//! every panel is shown or hidden independently. Activation rewrites every
//! flag, so the "exactly one visible" invariant holds after any call
//! regardless of prior state.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::AppError;

/// The fixed set of page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Home,
    ProductDetails,
    Cart,
    Login,
    Register,
}

impl Section {
    /// Every section, in page order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::ProductDetails,
        Self::Cart,
        Self::Login,
        Self::Register,
    ];

    /// The element identifier of the section.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::ProductDetails => "product-details",
            Self::Cart => "cart",
            Self::Login => "login",
            Self::Register => "register",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| AppError::UnknownSection(s.to_string()))
    }
}

/// Tracks which section is visible.
///
/// Transient: a new router always starts on [`Section::Home`].
#[derive(Debug)]
pub struct ViewRouter {
    visible: Mutex<[bool; Section::ALL.len()]>,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    #[must_use]
    pub fn new() -> Self {
        let router = Self {
            visible: Mutex::new([false; Section::ALL.len()]),
        };
        router.show(Section::Home);
        router
    }

    /// Activate a section by its element identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownSection` if `section_id` names no section.
    /// The current view is left as it was.
    pub fn activate(&self, section_id: &str) -> Result<Section, AppError> {
        let section = section_id.parse::<Section>().inspect_err(|e| {
            warn!(error = %e, "Ignoring navigation to unknown section");
        })?;
        self.show(section);
        Ok(section)
    }

    /// Make `section` the sole visible section.
    pub fn show(&self, section: Section) {
        let mut visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);
        for candidate in Section::ALL {
            if let Some(flag) = visible.get_mut(candidate.index()) {
                *flag = candidate == section;
            }
        }
        debug!(section = %section, "Section activated");
    }

    /// The section currently shown.
    #[must_use]
    pub fn active(&self) -> Section {
        self.visible_sections()
            .first()
            .copied()
            .unwrap_or(Section::Home)
    }

    #[must_use]
    pub fn is_visible(&self, section: Section) -> bool {
        self.visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(section.index())
            .copied()
            .unwrap_or(false)
    }

    /// All sections whose flag is set. Always exactly one element.
    #[must_use]
    pub fn visible_sections(&self) -> Vec<Section> {
        let visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);
        Section::ALL
            .into_iter()
            .filter(|s| visible.get(s.index()).copied().unwrap_or(false))
            .collect()
    }
}
