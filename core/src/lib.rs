//! SchemaForge core
//!
//! The schema data model, the recursive property-tree editor, and the
//! schema-to-form compiler (validation ruleset plus render plan). Pure and
//! synchronous; shared by the registry server and the browser front-end.

pub mod editor;
pub mod form;
pub mod model;
pub mod notify;
pub mod path;
pub mod plan;
pub mod rules;

pub use editor::{Edit, OutlineEntry};
pub use form::{FormSession, FormState, SubmitError, TagInput, TagKey};
pub use model::{
    Choices, CreateSchemaRequest, Format, ItemsDescriptor, JsonSchema, ProductSchema, PropertyGroup,
    PropertyKind, PropertyMap, PropertyType, SaveError, SchemaError, SchemaProperty,
};
pub use notify::{Notification, NotificationLevel, NotificationSink};
pub use path::FieldPath;
pub use plan::{FieldPlan, FormMode, RenderPlan, StepCursor, Widget};
pub use rules::{compile, compile_schema, FieldErrors, FieldValue, FormValues, Ruleset};
