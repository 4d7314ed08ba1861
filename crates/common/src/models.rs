//! Reconciles the recommended-model catalog with what the runtime reports.
//!
//! The runtime reports two independent signals: the download inventory and the
//! list of running models. Names are correlated with a prefix match in either
//! direction, so `llama3.2:1b` and `llama3.2:1b-q4` are the same model. The
//! rule also conflates distinct models when one name is a prefix of another
//! (`llama3.2` vs `llama3.2:1b`).

use crate::types::{DownloadedModel, LocalModel, ModelStatus};

/// A model suggested for local summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendedModel {
    pub name: &'static str,
    pub size: &'static str,
    pub note: &'static str,
}

/// Model the backend pipeline uses when `OLLAMA_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "qwen3:8b";

pub const RECOMMENDED_MODELS: &[RecommendedModel] = &[
    RecommendedModel {
        name: "llama3.2:1b",
        size: "1.3 GB",
        note: "Fastest, good for quick digests",
    },
    RecommendedModel {
        name: "llama3.2:3b",
        size: "2.0 GB",
        note: "Balanced speed and quality",
    },
    RecommendedModel {
        name: "phi3:mini",
        size: "2.2 GB",
        note: "Compact, strong at summarization",
    },
    RecommendedModel {
        name: "mistral:7b",
        size: "4.1 GB",
        note: "Higher quality, needs more memory",
    },
    RecommendedModel {
        name: DEFAULT_MODEL,
        size: "5.2 GB",
        note: "Pipeline default",
    },
];

/// True when either name is a prefix of the other, ignoring case.
pub fn names_match(recommended: &str, reported: &str) -> bool {
    let a = recommended.trim().to_lowercase();
    let b = reported.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.starts_with(&b) || b.starts_with(&a)
}

fn status_for(name: &str, downloaded: bool, running: &[String]) -> ModelStatus {
    if running.iter().any(|r| names_match(name, r)) {
        ModelStatus::Running
    } else if downloaded {
        ModelStatus::Idle
    } else {
        ModelStatus::NotDownloaded
    }
}

/// Builds the model list: catalog entries first, then downloaded models that
/// match no catalog entry.
pub fn reconcile(
    catalog: &[RecommendedModel],
    downloaded: &[DownloadedModel],
    running: &[String],
) -> Vec<LocalModel> {
    let mut models: Vec<LocalModel> = catalog
        .iter()
        .map(|rec| {
            let local = downloaded.iter().find(|d| names_match(rec.name, &d.name));
            let status = status_for(rec.name, local.is_some(), running);
            let size = local
                .and_then(|d| d.size.clone())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| rec.size.to_string());
            LocalModel {
                name: rec.name.to_string(),
                size,
                status,
                is_active: status == ModelStatus::Running,
                recommended: true,
            }
        })
        .collect();

    for model in downloaded {
        if catalog.iter().any(|rec| names_match(rec.name, &model.name)) {
            continue;
        }
        let status = status_for(&model.name, true, running);
        models.push(LocalModel {
            name: model.name.clone(),
            size: model.size.clone().unwrap_or_else(|| "?".to_string()),
            status,
            is_active: status == ModelStatus::Running,
            recommended: false,
        });
    }

    models
}

/// Name to send to the backend for `model`: the runtime's own tag when it has
/// one downloaded, otherwise the catalog name.
pub fn runtime_name<'a>(model: &'a LocalModel, downloaded: &'a [DownloadedModel]) -> &'a str {
    downloaded
        .iter()
        .find(|d| names_match(&model.name, &d.name))
        .map(|d| d.name.as_str())
        .unwrap_or(model.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloaded(name: &str) -> DownloadedModel {
        DownloadedModel {
            name: name.to_string(),
            size: Some("1.3".to_string()),
        }
    }

    #[test]
    fn test_names_match_either_direction() {
        assert!(names_match("llama3.2:1b", "llama3.2:1b-q4"));
        assert!(names_match("llama3.2:1b-q4", "llama3.2:1b"));
        assert!(names_match("Phi3:Mini", "phi3:mini"));
        assert!(!names_match("llama3.2:1b", "llama3.2:3b"));
        assert!(!names_match("", "llama3.2:1b"));
    }

    #[test]
    fn test_runtime_name_prefers_downloaded_tag() {
        let inventory = vec![downloaded("llama3.2:1b-q4")];
        let models = reconcile(RECOMMENDED_MODELS, &inventory, &[]);
        let llama = &models[0];
        assert_eq!(runtime_name(llama, &inventory), "llama3.2:1b-q4");
        assert_eq!(runtime_name(&models[1], &inventory), "llama3.2:3b");
    }
}
