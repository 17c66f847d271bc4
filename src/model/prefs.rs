use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ambient noise name → volume 0–100 (noises.json)
pub type NoiseVolumes = IndexMap<String, u8>;

/// language.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePref {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// background.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundPref {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_deserialize() {
        let lang: LanguagePref = serde_json::from_str("{}").unwrap();
        assert!(lang.language.is_none());
        let bg: BackgroundPref = serde_json::from_str("{}").unwrap();
        assert!(bg.index.is_none());
        let noises: NoiseVolumes = serde_json::from_str(r#"{"rain":40,"fire":0}"#).unwrap();
        assert_eq!(noises.get("rain"), Some(&40));
    }
}
