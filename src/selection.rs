//! Pod and container filtering and choice
//!
//! Filters are plain case-sensitive substring matches on names. A single
//! candidate is taken without asking; anything more goes to a [`Chooser`].

use k8s_openapi::api::core::v1::{Container, Pod};
use thiserror::Error;

use crate::ui::{Chooser, ContainerTemplate, ItemTemplate, PodTemplate, PromptError, PromptItem};

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no pods found for filter: {0}")]
    NoPodsMatch(String),
    #[error("no containers found for filter: {0}")]
    NoContainersMatch(String),
    #[error("pod {0}/{1} has no containers")]
    NoContainers(String, String),
    #[error("prompt returned out of range choice {0}")]
    InvalidChoice(usize),
    #[error("unable to run prompt: {0}")]
    Prompt(#[from] PromptError),
}

fn name_of(pod: &Pod) -> &str {
    pod.metadata.name.as_deref().unwrap_or_default()
}

fn namespace_of(pod: &Pod) -> &str {
    pod.metadata.namespace.as_deref().unwrap_or_default()
}

/// Keep pods whose name contains `filter`, ordered by namespace then name
pub fn match_pods(pods: Vec<Pod>, filter: &str) -> Result<Vec<Pod>, SelectionError> {
    tracing::info!(search_filter = filter, "Get all pods for podFilter...");

    let mut matching: Vec<Pod> = pods
        .into_iter()
        .enumerate()
        .filter(|(index, pod)| {
            let found = name_of(pod).contains(filter);
            if found {
                tracing::info!(pod_name = name_of(pod), index, "Found pod...");
            }
            found
        })
        .map(|(_, pod)| pod)
        .collect();

    if matching.is_empty() {
        return Err(SelectionError::NoPodsMatch(filter.to_string()));
    }

    matching.sort_by(|a, b| {
        namespace_of(a)
            .cmp(namespace_of(b))
            .then_with(|| name_of(a).cmp(name_of(b)))
    });

    Ok(matching)
}

/// Containers of `pod` whose name contains `filter`
///
/// Without a filter every container is returned in spec order. With one the
/// matches are sorted by name.
pub fn match_containers(pod: &Pod, filter: &str) -> Result<Vec<Container>, SelectionError> {
    let containers = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.clone())
        .unwrap_or_default();

    if containers.is_empty() {
        return Err(SelectionError::NoContainers(
            namespace_of(pod).to_string(),
            name_of(pod).to_string(),
        ));
    }

    if filter.is_empty() {
        return Ok(containers);
    }

    tracing::info!(search_filter = filter, "Get all containers for containerFilter...");

    let mut matching: Vec<Container> = containers
        .into_iter()
        .enumerate()
        .filter(|(index, container)| {
            let found = container.name.contains(filter);
            if found {
                tracing::info!(container_name = %container.name, index, "Found container...");
            }
            found
        })
        .map(|(_, container)| container)
        .collect();

    if matching.is_empty() {
        return Err(SelectionError::NoContainersMatch(filter.to_string()));
    }

    matching.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(matching)
}

/// Take the only candidate, or ask `chooser` to pick one
pub fn choose_one<T>(
    mut candidates: Vec<T>,
    label: &str,
    chooser: &dyn Chooser,
    template: &impl ItemTemplate<T>,
) -> Result<T, SelectionError> {
    match candidates.len() {
        0 => Err(PromptError::Empty.into()),
        1 => Ok(candidates.remove(0)),
        len => {
            let items: Vec<PromptItem> = candidates
                .iter()
                .map(|c| PromptItem::render(c, template))
                .collect();
            let index = chooser.choose(label, &items)?;
            if index >= len {
                return Err(SelectionError::InvalidChoice(index));
            }
            Ok(candidates.swap_remove(index))
        }
    }
}

pub fn select_pod(
    pods: Vec<Pod>,
    chooser: &dyn Chooser,
    template: &PodTemplate,
) -> Result<Pod, SelectionError> {
    choose_one(pods, "Select Pod", chooser, template)
}

pub fn select_container(
    containers: Vec<Container>,
    chooser: &dyn Chooser,
    template: &ContainerTemplate,
) -> Result<Container, SelectionError> {
    choose_one(containers, "Select Container", chooser, template)
}
