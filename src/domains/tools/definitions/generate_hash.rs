//! Hash generator tool definition.

use md5::Md5;
use serde::Deserialize;
use serde_json::{Value, json};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use tracing::instrument;

use super::ToolDefinition;
use crate::domains::tools::error::HandlerError;
use crate::domains::tools::registry::ToolContext;
use crate::domains::tools::schema::{ParameterSpec, ValidatedArgs};

const ALGORITHMS: &[&str] = &[
    Algorithm::Md5.as_str(),
    Algorithm::Sha1.as_str(),
    Algorithm::Sha256.as_str(),
    Algorithm::Sha512.as_str(),
];

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    fn hex_digest(self, data: &[u8]) -> String {
        match self {
            Self::Md5 => hex::<Md5>(data),
            Self::Sha1 => hex::<Sha1>(data),
            Self::Sha256 => hex::<Sha256>(data),
            Self::Sha512 => hex::<Sha512>(data),
        }
    }
}

fn hex<D: Digest>(data: &[u8]) -> String {
    D::digest(data)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[derive(Debug, Deserialize)]
struct GenerateHashParams {
    text: String,
    algorithm: Algorithm,
}

/// Hash tool - hex digest of UTF-8 text.
pub struct GenerateHashTool;

impl ToolDefinition for GenerateHashTool {
    const NAME: &'static str = "generate_hash";

    const DESCRIPTION: &'static str =
        "Generate a hash of text using md5, sha1, sha256 or sha512 (lowercase hex).";

    fn parameters() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string("text", "Text to hash").required(),
            ParameterSpec::string("algorithm", "Hash algorithm")
                .required()
                .one_of(ALGORITHMS),
        ]
    }

    #[instrument(skip_all)]
    fn handle(_ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: GenerateHashParams = args.decode()?;
        let hash = params.algorithm.hex_digest(params.text.as_bytes());

        Ok(json!({
            "algorithm": params.algorithm.as_str(),
            "hash": hash,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notes::MemoryNoteStore;
    use serde_json::Map;
    use std::sync::Arc;

    fn run(text: &str, algorithm: &str) -> Value {
        let ctx = ToolContext::new(Arc::new(MemoryNoteStore::new()));
        let mut raw = Map::new();
        raw.insert("text".into(), json!(text));
        raw.insert("algorithm".into(), json!(algorithm));
        let args = GenerateHashTool::spec().validate(&raw).unwrap();
        GenerateHashTool::handle(&ctx, &args).unwrap()
    }

    #[test]
    fn test_algorithms_names_match_serde() {
        for name in ALGORITHMS {
            let parsed: Algorithm = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
    }

    #[test]
    fn test_known_digests() {
        assert_eq!(run("abc", "md5")["hash"], "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            run("abc", "sha1")["hash"],
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            run("abc", "sha256")["hash"],
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha512_length_and_label() {
        let payload = run("", "sha512");
        assert_eq!(payload["algorithm"], "sha512");
        assert_eq!(payload["hash"].as_str().unwrap().len(), 128);
        assert!(payload["hash"].as_str().unwrap().starts_with("cf83e1357eefb8bd"));
    }
}
