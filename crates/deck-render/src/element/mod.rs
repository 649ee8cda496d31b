//! Button and page elements.

#![allow(missing_docs)]

pub mod button;
pub mod page;

pub use button::ButtonElement;
pub use page::{
    PageDefinition, PageElement, RawFrame, RenderFrame, RenderRequest, SystemButton,
    SystemButtonLayout, Visibility,
};
