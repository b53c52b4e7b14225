//! End-to-end tests for the selection pipeline
//!
//! These drive `Iexec::select_target` against an in-memory cluster and a
//! scripted prompt.


use iexec::config::Settings;
use iexec::selection::SelectionError;
use iexec::ui::PromptError;
use iexec::{Iexec, IexecConfig, IexecError, Target};

use test_utils::*;

fn config(namespace: Option<&str>, pod_filter: &str, container_filter: &str) -> IexecConfig {
    IexecConfig {
        namespace: namespace.map(String::from),
        naked: true,
        pod_filter: pod_filter.to_string(),
        container_filter: container_filter.to_string(),
        ..Default::default()
    }
}

fn target(namespace: &str, pod: &str, container: &str) -> Target {
    Target {
        namespace: namespace.to_string(),
        pod: pod.to_string(),
        container: container.to_string(),
    }
}

// ============================================================================
// Automatic selection
// ============================================================================

#[tokio::test]
async fn test_unique_pod_and_container_need_no_prompt() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(Some("db"), "postgres", ""));
    let chooser = ScriptedChooser::silent();

    let selected = iexec.select_target(&chooser).await.unwrap();

    assert_eq!(selected, target("db", "postgres-0", "postgres"));
    assert!(chooser.labels().is_empty());
}

#[tokio::test]
async fn test_container_filter_narrows_to_one() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(Some("db"), "redis", "metrics"));
    let chooser = ScriptedChooser::silent();

    let selected = iexec.select_target(&chooser).await.unwrap();
    assert_eq!(selected, target("db", "redis-0", "metrics-exporter"));
}

// ============================================================================
// Prompting
// ============================================================================

#[tokio::test]
async fn test_multiple_pods_prompt_in_sorted_order() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(Some("web"), "nginx", ""));
    let chooser = ScriptedChooser::new(vec![Ok(1)]);

    let selected = iexec.select_target(&chooser).await.unwrap();
    assert_eq!(selected, target("web", "nginx-7c9d8-fghij", "nginx"));

    let prompts = chooser.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].0, "Select Pod");
    let rows: Vec<&str> = prompts[0].1.iter().map(|i| i.inactive.as_str()).collect();
    assert_eq!(
        rows,
        vec![
            "Namespace: web | Pod: nginx-7c9d8-abcde",
            "Namespace: web | Pod: nginx-7c9d8-fghij",
        ]
    );
}

#[tokio::test]
async fn test_pod_then_container_prompt() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(None, "", ""));
    // Sorted: db/postgres-0, db/redis-0, web/api-..., web/nginx-..., web/nginx-...
    let chooser = ScriptedChooser::new(vec![Ok(1), Ok(2)]);

    let selected = iexec.select_target(&chooser).await.unwrap();
    assert_eq!(selected, target("db", "redis-0", "log-shipper"));
    assert_eq!(chooser.labels(), vec!["Select Pod", "Select Container"]);

    let prompts = chooser.prompts.lock().unwrap();
    let containers: Vec<&str> = prompts[1].1.iter().map(|i| i.inactive.as_str()).collect();
    assert_eq!(
        containers,
        vec![
            "Container: redis",
            "Container: metrics-exporter",
            "Container: log-shipper",
        ]
    );
}

#[tokio::test]
async fn test_prompt_interrupt_aborts_run() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(Some("web"), "nginx", ""));
    let chooser = ScriptedChooser::new(vec![Err(PromptError::Interrupted)]);

    let err = iexec.select_target(&chooser).await.unwrap_err();
    assert!(matches!(
        err,
        IexecError::Selection(SelectionError::Prompt(PromptError::Interrupted))
    ));
}

// ============================================================================
// Listing scope
// ============================================================================

#[tokio::test]
async fn test_namespace_and_selector_reach_the_source() {
    let source = FakePodSource::new(populate_test_pods());
    let mut cfg = config(Some("web"), "", "");
    cfg.label_selector = Some("app=api".to_string());
    let iexec = Iexec::new(source, cfg);
    let chooser = ScriptedChooser::new(vec![Ok(0)]);

    let selected = iexec.select_target(&chooser).await.unwrap();
    assert_eq!(selected, target("web", "api-5f6b7-klmno", "api"));
    // Only the container prompt: the selector left a single pod.
    assert_eq!(chooser.labels(), vec!["Select Container"]);
}

#[tokio::test]
async fn test_all_namespaces_lists_without_namespace() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(None, "postgres", ""));
    let chooser = ScriptedChooser::silent();

    let selected = iexec.select_target(&chooser).await.unwrap();
    assert_eq!(selected.namespace, "db");
}

#[tokio::test]
async fn test_source_receives_scope() {
    let source = FakePodSource::new(populate_test_pods());
    let mut cfg = config(Some("db"), "postgres", "");
    cfg.label_selector = Some("app=postgres".to_string());
    let iexec = Iexec::new(source, cfg);

    iexec.select_target(&ScriptedChooser::silent()).await.unwrap();

    let calls = iexec.source().calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![(Some("db".to_string()), Some("app=postgres".to_string()))]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_no_running_pods() {
    let source = FakePodSource::new(Vec::new());
    let iexec = Iexec::new(source, config(Some("default"), "", ""));

    let err = iexec
        .select_target(&ScriptedChooser::silent())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no running pods found");
}

#[tokio::test]
async fn test_no_pod_matches_filter() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(Some("web"), "postgres", ""));

    let err = iexec
        .select_target(&ScriptedChooser::silent())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no pods found for filter: postgres");
}

#[tokio::test]
async fn test_no_container_matches_filter() {
    let source = FakePodSource::new(populate_test_pods());
    let iexec = Iexec::new(source, config(Some("db"), "postgres", "sidecar"));

    let err = iexec
        .select_target(&ScriptedChooser::silent())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no containers found for filter: sidecar");
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_settings_load_from_nested_dir() {
    let ctx = TestContext::new();
    let path = ctx.settings_path();

    let settings = Settings {
        vim_mode: true,
        default_command: vec!["/bin/bash".to_string()],
        ..Default::default()
    };
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert!(loaded.vim_mode);
    assert_eq!(loaded.default_command, vec!["/bin/bash".to_string()]);
}
