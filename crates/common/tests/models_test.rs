use nokast_common::models::{reconcile, RecommendedModel, RECOMMENDED_MODELS};
use nokast_common::types::{DownloadedModel, ModelStatus};

const CATALOG: &[RecommendedModel] = &[
    RecommendedModel { name: "llama3.2:1b", size: "1.3 GB", note: "" },
    RecommendedModel { name: "phi3:mini", size: "2.2 GB", note: "" },
];

fn downloaded(name: &str, size: &str) -> DownloadedModel {
    DownloadedModel { name: name.to_string(), size: Some(size.to_string()) }
}

#[test]
fn test_tagged_download_matches_recommended_name() {
    let models = reconcile(CATALOG, &[downloaded("llama3.2:1b-q4", "1.1")], &[]);

    let llama = &models[0];
    assert_eq!(llama.name, "llama3.2:1b");
    assert_eq!(llama.status, ModelStatus::Idle);
    assert!(!llama.is_active);
    assert_eq!(llama.size, "1.1");
    assert_eq!(models[1].status, ModelStatus::NotDownloaded);
    assert_eq!(models[1].size, "2.2 GB");
}

#[test]
fn test_running_model_is_active() {
    let models = reconcile(
        CATALOG,
        &[downloaded("llama3.2:1b-q4", "1.1")],
        &["llama3.2:1b-q4".to_string()],
    );

    assert_eq!(models[0].status, ModelStatus::Running);
    assert!(models[0].is_active);
}

#[test]
fn test_unlisted_downloads_follow_the_catalog() {
    let models = reconcile(
        CATALOG,
        &[downloaded("gemma2:2b", "1.6"), downloaded("phi3:mini", "2.2")],
        &["gemma2:2b".to_string()],
    );

    assert_eq!(models.len(), 3);
    assert_eq!(models[1].status, ModelStatus::Idle);
    let extra = &models[2];
    assert_eq!(extra.name, "gemma2:2b");
    assert!(!extra.recommended);
    assert_eq!(extra.status, ModelStatus::Running);
}

#[test]
fn test_runtime_down_leaves_everything_not_downloaded() {
    let models = reconcile(RECOMMENDED_MODELS, &[], &[]);
    assert_eq!(models.len(), RECOMMENDED_MODELS.len());
    assert!(models.iter().all(|m| m.status == ModelStatus::NotDownloaded));
}

#[test]
fn test_prefix_rule_conflates_shorter_names() {
    // Known limitation of the matching rule: an untagged download counts as
    // every catalog entry it prefixes.
    let catalog = &[
        RecommendedModel { name: "llama3.2:1b", size: "", note: "" },
        RecommendedModel { name: "llama3.2:3b", size: "", note: "" },
    ];
    let models = reconcile(catalog, &[downloaded("llama3.2", "2.0")], &[]);
    assert!(models.iter().all(|m| m.status == ModelStatus::Idle));
}
