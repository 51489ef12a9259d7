//! Reusable HTML components for page generation
//!
//! Maud component functions used by the site writer: the page shell with
//! theme and font preferences applied, the collapsible navigation sidebar,
//! the table of contents and the document content region.

pub mod content;
pub mod layout;
pub mod nav;
pub mod sidebar;
pub mod toc;
