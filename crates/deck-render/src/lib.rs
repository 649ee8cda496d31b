//! `deck-render` - page rendering and diffing for a button deck.
//!
//! A [`Configuration`] holds pages of button specs. Rendering a page binds
//! each button to live entity state from a [`StateSnapshot`], evaluates
//! templates, applies visibility, inserts navigation buttons for pagination
//! and reports which slots changed since the previous render:
//!
//! ```
//! use deck_render::{Configuration, EntityState, StateSnapshot};
//!
//! let config = Configuration::from_toml_str(r#"
//!     buttons_per_page = 3
//!     [pages.main]
//!     buttons = [{ entity_id = "light.kitchen", states = { on = { name = "ON!" } } }]
//! "#).unwrap();
//! let snapshot = StateSnapshot::new().with_entity("light.kitchen", EntityState::new("on"));
//!
//! let frame = config.render("main", &snapshot, 1).unwrap();
//! assert_eq!(frame.buttons[0].as_ref().unwrap().name.as_deref(), Some("ON!"));
//! assert_eq!(frame.changed.len(), 1);
//!
//! let again = config.render("main", &snapshot, 1).unwrap();
//! assert!(again.changed.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Button actions and dispatch collaborators.
pub mod action;
/// Configuration loading and page cache.
pub mod config;
/// Button and page elements.
pub mod element;
/// Error types.
pub mod error;
/// Icon descriptors.
pub mod icon;
/// Deep merge and presets.
pub mod merge;
/// Page stack navigation.
pub mod navigation;
/// Entity state snapshot.
pub mod state;
/// Template evaluation.
pub mod template;
/// Semi-structured values.
pub mod value;

pub use action::{ActionSpec, InteractionType, NavigationContext, NavigationKind, ServiceCaller};
pub use config::Configuration;
pub use element::{
    ButtonElement, PageDefinition, PageElement, RenderFrame, RenderRequest, SystemButton,
    SystemButtonLayout, Visibility,
};
pub use error::{ActionError, ConfigError, TemplateError};
pub use icon::{IconDescriptor, IconProvider, IconSource};
pub use navigation::{PageCursor, PageStack};
pub use state::{EntityState, StateSnapshot};
pub use value::{Mapping, Value};
