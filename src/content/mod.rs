mod editor;
pub mod list;
mod node;
mod path;
mod section;

pub use editor::{
    add_item, blank_template, get, move_item, remove_item, set_value, update_item, EditError,
    EditResult,
};
pub use node::Node;
pub use path::Path;
pub use section::{is_image_key, shape_key, EditorKinds, LeafKind, SectionContent};
