use super::{Context, write_json};
use crate::errors::CliResult;
use serde::Serialize;
use std::io::Write;
use tracing::instrument;

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub engine_version: &'static str,
    pub correlation_id: String,
}

#[instrument]
pub fn get_version_info() -> VersionInfo {
    let info = VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
        engine_version: taskline_engine::VERSION,
        correlation_id: crate::tracing::correlation_id().to_string(),
    };

    tracing::debug!(
        package_name = info.name,
        package_version = info.version,
        "Gathered package information"
    );

    info
}

pub fn execute(ctx: &Context, out: &mut impl Write) -> CliResult<()> {
    let info = get_version_info();
    if ctx.json {
        return write_json(out, &info);
    }
    writeln!(
        out,
        "{} {} - {}\nEngine: {}\nCorrelation ID: {}",
        info.name, info.version, info.description, info.engine_version, info.correlation_id
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version_info() {
        let info = get_version_info();
        assert_eq!(info.name, "taskline-cli");
        assert_eq!(info.version, info.engine_version);
        assert_eq!(info.correlation_id.len(), 36);
    }

    #[test]
    fn test_text_output() {
        let mut out = Vec::new();
        execute(&Context::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("taskline-cli "));
        assert!(text.contains("Correlation ID:"));
    }

    #[test]
    fn test_json_output() {
        let ctx = Context {
            json: true,
            ..Context::default()
        };
        let mut out = Vec::new();
        execute(&ctx, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json["name"], "taskline-cli");
    }
}
