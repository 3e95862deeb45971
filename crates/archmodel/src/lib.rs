//! Archmodel - A C4-style software architecture model with view projection.
//!
//! A [`Model`](model::Model) holds people, software systems, containers,
//! components and deployment elements, plus the relationships between them.
//! Views select parts of the model for rendering. The
//! [`Workspace`] ties a model to its [`ViewSet`](view::ViewSet) and handles
//! hydration after deserialization.
//!
//! # Example
//!
//! ```
//! use archmodel::{
//!     Workspace,
//!     view::{StaticView, View},
//! };
//!
//! let mut workspace = Workspace::new("Banking", "");
//! let model = workspace.model_mut();
//! let customer = model.add_person("Customer", "").unwrap();
//! let bank = model.add_software_system("Internet Banking", "").unwrap();
//! model.uses(&customer, &bank, "Uses").unwrap();
//!
//! let (model, views) = workspace.model_and_views_mut();
//! let view = views
//!     .create_system_context_view(model, &bank, "context", "")
//!     .unwrap();
//! view.add_all_elements(model);
//! assert_eq!(view.core().relationships().len(), 1);
//! ```

pub mod config;
pub mod model;
pub mod view;

mod error;
mod workspace;

pub use archmodel_core::{identifier, layout, tags};

pub use error::{ModelError, Result};
pub use workspace::{Role, User, Workspace, WorkspaceConfiguration};
