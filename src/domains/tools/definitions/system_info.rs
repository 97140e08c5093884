//! System information tool definition.
//!
//! Reports local time, platform, working directory and a fixed allow-list of
//! environment variables. Nothing outside that list is ever read from the
//! environment.

use std::env;

use chrono::Local;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::instrument;

use super::ToolDefinition;
use crate::domains::tools::error::HandlerError;
use crate::domains::tools::registry::ToolContext;
use crate::domains::tools::schema::{ParameterSpec, ValidatedArgs};

const INFO_TYPES: &[&str] = &["time", "platform", "env", "cwd", "all"];

/// Environment variables that may be reported.
pub const SAFE_ENV_VARS: &[&str] = &["USER", "HOME", "SHELL", "LANG", "PATH"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum InfoType {
    Time,
    Platform,
    Env,
    Cwd,
    All,
}

impl InfoType {
    fn includes(self, section: InfoType) -> bool {
        self == InfoType::All || self == section
    }
}

#[derive(Debug, Deserialize)]
struct SystemInfoParams {
    info_type: InfoType,
}

/// System info tool - time, platform, cwd and safe environment variables.
pub struct SystemInfoTool;

impl ToolDefinition for SystemInfoTool {
    const NAME: &'static str = "system_info";

    const DESCRIPTION: &'static str =
        "Get system information: current time, platform details, working directory, or safe environment variables.";

    fn parameters() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string("info_type", "Type of information to retrieve")
                .required()
                .one_of(INFO_TYPES),
        ]
    }

    #[instrument(skip_all)]
    fn handle(_ctx: &ToolContext, args: &ValidatedArgs) -> Result<Value, HandlerError> {
        let params: SystemInfoParams = args.decode()?;
        let info_type = params.info_type;
        let mut info = Map::new();

        if info_type.includes(InfoType::Time) {
            let now = Local::now();
            info.insert("current_time".into(), json!(now.to_rfc3339()));
            info.insert("timezone".into(), json!(now.offset().to_string()));
        }

        if info_type.includes(InfoType::Platform) {
            info.insert("os".into(), json!(env::consts::OS));
            info.insert("family".into(), json!(env::consts::FAMILY));
            info.insert("arch".into(), json!(env::consts::ARCH));
            info.insert("server_version".into(), json!(env!("CARGO_PKG_VERSION")));
        }

        if info_type.includes(InfoType::Cwd) {
            let cwd = env::current_dir().map_err(|e| {
                HandlerError::internal(format!("cannot read working directory: {e}"))
            })?;
            info.insert("working_directory".into(), json!(cwd.display().to_string()));
        }

        if info_type.includes(InfoType::Env) {
            let environment: Map<String, Value> = SAFE_ENV_VARS
                .iter()
                .map(|&key| {
                    let value = env::var(key).unwrap_or_else(|_| "N/A".to_string());
                    (key.to_string(), json!(value))
                })
                .collect();
            info.insert("environment".into(), Value::Object(environment));
        }

        Ok(Value::Object(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notes::MemoryNoteStore;
    use std::sync::Arc;

    fn run(info_type: &str) -> Value {
        let ctx = ToolContext::new(Arc::new(MemoryNoteStore::new()));
        let mut raw = Map::new();
        raw.insert("info_type".into(), json!(info_type));
        let args = SystemInfoTool::spec().validate(&raw).unwrap();
        SystemInfoTool::handle(&ctx, &args).unwrap()
    }

    #[test]
    fn test_single_sections() {
        let time = run("time");
        assert!(time["current_time"].is_string());
        assert!(time.get("os").is_none());

        let platform = run("platform");
        assert_eq!(platform["os"], env::consts::OS);
        assert_eq!(platform["server_version"], env!("CARGO_PKG_VERSION"));

        let cwd = run("cwd");
        assert!(cwd["working_directory"].is_string());
    }

    #[test]
    fn test_env_is_restricted_to_allow_list() {
        let payload = run("env");
        let environment = payload["environment"].as_object().unwrap();
        let keys: Vec<_> = environment.keys().map(String::as_str).collect();
        assert_eq!(keys, SAFE_ENV_VARS);
    }

    #[test]
    fn test_all_has_every_section() {
        let payload = run("all");
        for key in ["current_time", "timezone", "os", "working_directory", "environment"] {
            assert!(payload.get(key).is_some(), "missing {key}");
        }
    }
}
