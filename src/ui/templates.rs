//! Item templates for the selection prompts
//!
//! Each item renders three ways: highlighted under the cursor, as a plain
//! list row, and as the confirmation line once chosen. Naked templates carry
//! the same text without colour.

use crossterm::style::Stylize;
use k8s_openapi::api::core::v1::{Container, Pod};

/// Marker in front of the highlighted row
pub const ICON_SELECT: &str = "▸";
/// Marker in front of the confirmed choice
pub const ICON_GOOD: &str = "✔";

/// How one prompt item renders in each of its states
pub trait ItemTemplate<T> {
    fn active(&self, item: &T) -> String;
    fn inactive(&self, item: &T) -> String;
    fn selected(&self, item: &T) -> String;
}

fn select_icon(naked: bool) -> String {
    if naked {
        ICON_SELECT.to_string()
    } else {
        ICON_SELECT.bold().to_string()
    }
}

fn good_icon(naked: bool) -> String {
    if naked {
        ICON_GOOD.to_string()
    } else {
        ICON_GOOD.green().to_string()
    }
}

/// Pod rows: `Namespace: <ns> | Pod: <name>`
#[derive(Debug, Clone, Copy, Default)]
pub struct PodTemplate {
    pub naked: bool,
}

impl PodTemplate {
    pub fn new(naked: bool) -> Self {
        Self { naked }
    }

    fn namespace(&self, pod: &Pod) -> String {
        let ns = pod.metadata.namespace.as_deref().unwrap_or_default();
        if self.naked {
            ns.to_string()
        } else {
            ns.blue().to_string()
        }
    }
}

fn pod_name(pod: &Pod) -> &str {
    pod.metadata.name.as_deref().unwrap_or_default()
}

impl ItemTemplate<Pod> for PodTemplate {
    fn active(&self, pod: &Pod) -> String {
        let name = if self.naked {
            pod_name(pod).to_string()
        } else {
            pod_name(pod).cyan().to_string()
        };
        format!(
            "Namespace: {} | Pod: {} {}",
            self.namespace(pod),
            select_icon(self.naked),
            name
        )
    }

    fn inactive(&self, pod: &Pod) -> String {
        let name = if self.naked {
            pod_name(pod).to_string()
        } else {
            pod_name(pod).magenta().to_string()
        };
        format!("Namespace: {} | Pod: {}", self.namespace(pod), name)
    }

    fn selected(&self, pod: &Pod) -> String {
        let name = if self.naked {
            pod_name(pod).to_string()
        } else {
            pod_name(pod).cyan().to_string()
        };
        format!(
            "Namespace: {} | Pod: {} {}",
            self.namespace(pod),
            good_icon(self.naked),
            name
        )
    }
}

/// Container rows: `Container: <name>`
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerTemplate {
    pub naked: bool,
}

impl ContainerTemplate {
    pub fn new(naked: bool) -> Self {
        Self { naked }
    }
}

impl ItemTemplate<Container> for ContainerTemplate {
    fn active(&self, container: &Container) -> String {
        let name = if self.naked {
            container.name.clone()
        } else {
            container.name.as_str().cyan().to_string()
        };
        format!("Container: {} {}", select_icon(self.naked), name)
    }

    fn inactive(&self, container: &Container) -> String {
        let name = if self.naked {
            container.name.clone()
        } else {
            container.name.as_str().magenta().to_string()
        };
        format!("Container: {}", name)
    }

    fn selected(&self, container: &Container) -> String {
        let name = if self.naked {
            container.name.clone()
        } else {
            container.name.as_str().cyan().to_string()
        };
        format!("Container: {} {}", good_icon(self.naked), name)
    }
}
