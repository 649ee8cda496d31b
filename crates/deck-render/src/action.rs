//! Button actions and the collaborators they dispatch to.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;
use smol_str::SmolStr;

use crate::error::ActionError;
use crate::value::Value;

/// How the user interacted with a physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Tap,
    Hold,
}

impl InteractionType {
    pub const ALL: [Self; 2] = [Self::Tap, Self::Hold];

    /// Button spec key holding the action for this interaction.
    #[must_use]
    pub fn spec_key(self) -> &'static str {
        match self {
            Self::Tap => "tap_action",
            Self::Hold => "hold_action",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tap => "tap",
            Self::Hold => "hold",
        })
    }
}

/// Synthetic navigation controls inserted by pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    Back,
    Previous,
    Next,
}

impl NavigationKind {
    pub const ALL: [Self; 3] = [Self::Back, Self::Previous, Self::Next];

    /// Action name, also used as the `system_buttons` key.
    #[must_use]
    pub fn action_name(self) -> &'static str {
        match self {
            Self::Back => PAGE_BACK,
            Self::Previous => PAGE_PREVIOUS,
            Self::Next => PAGE_NEXT,
        }
    }

    #[must_use]
    pub fn from_action_name(name: &str) -> Option<Self> {
        match name {
            PAGE_BACK => Some(Self::Back),
            PAGE_PREVIOUS => Some(Self::Previous),
            PAGE_NEXT => Some(Self::Next),
            _ => None,
        }
    }

    /// Action bound to the system button of this kind.
    #[must_use]
    pub fn action(self) -> ActionSpec {
        match self {
            Self::Back => ActionSpec::PageBack,
            Self::Previous => ActionSpec::PagePrevious,
            Self::Next => ActionSpec::PageNext,
        }
    }
}

pub const PAGE_BACK: &str = "$page.back";
pub const PAGE_PREVIOUS: &str = "$page.previous";
pub const PAGE_NEXT: &str = "$page.next";
pub const PAGE_GO_TO: &str = "$page.go_to";

/// Parsed action bound to an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSpec {
    PageBack,
    PagePrevious,
    PageNext,
    PageGoTo {
        target: SmolStr,
    },
    ServiceCall {
        domain: SmolStr,
        service: SmolStr,
        data: Value,
    },
}

impl ActionSpec {
    /// Parses `{ action = "...", data = ... }` or a bare action name.
    pub fn parse(raw: &Value) -> Result<Self, ActionError> {
        let (name, data) = match raw {
            Value::String(name) => (name.as_str(), Value::Null),
            Value::Mapping(map) => {
                let name = map
                    .get("action")
                    .and_then(Value::as_str)
                    .ok_or(ActionError::Missing)?;
                (name, map.get("data").cloned().unwrap_or_default())
            }
            Value::Null => return Err(ActionError::Missing),
            other => return Err(ActionError::Malformed(other.to_display_text().into())),
        };
        Self::from_parts(name, data)
    }

    fn from_parts(name: &str, data: Value) -> Result<Self, ActionError> {
        if let Some(kind) = NavigationKind::from_action_name(name) {
            return Ok(kind.action());
        }
        if name == PAGE_GO_TO {
            let target = match &data {
                Value::String(page) => Some(page.as_str()),
                Value::Mapping(map) => map.get("page").and_then(Value::as_str),
                _ => None,
            };
            return target
                .filter(|page| !page.is_empty())
                .map(|page| Self::PageGoTo {
                    target: SmolStr::new(page),
                })
                .ok_or(ActionError::MissingTarget);
        }
        match name.split_once('.') {
            Some((domain, service)) if !domain.is_empty() && !service.is_empty() => {
                Ok(Self::ServiceCall {
                    domain: SmolStr::new(domain),
                    service: SmolStr::new(service),
                    data,
                })
            }
            _ => Err(ActionError::Malformed(SmolStr::new(name))),
        }
    }

    /// Runs the action against its collaborator.
    pub fn dispatch(&self, navigation: &mut dyn NavigationContext, services: &mut dyn ServiceCaller) {
        match self {
            Self::PageBack => navigation.go_back(),
            Self::PagePrevious => navigation.go_previous(),
            Self::PageNext => navigation.go_next(),
            Self::PageGoTo { target } => navigation.go_to(target),
            Self::ServiceCall {
                domain,
                service,
                data,
            } => services.call_service(domain, service, data),
        }
    }
}

/// Page navigation driven by system buttons and `$page.go_to`.
pub trait NavigationContext {
    fn go_back(&mut self);
    fn go_previous(&mut self);
    fn go_next(&mut self);
    fn go_to(&mut self, page_id: &str);
}

/// Remote service invocation on the state provider.
pub trait ServiceCaller {
    fn call_service(&mut self, domain: &str, service: &str, data: &Value);
}
