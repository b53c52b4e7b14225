pub mod select;
pub mod templates;

pub use select::{
    Chooser, PromptError, PromptItem, SelectAction, SelectState, TerminalChooser,
    DEFAULT_PAGE_SIZE,
};
pub use templates::{ContainerTemplate, ItemTemplate, PodTemplate};
