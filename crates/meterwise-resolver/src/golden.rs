//! Golden-file rendering
//!
//! Resolved resources render to pretty JSON holding only the descriptor
//! fields: name plus cost components. Output is deterministic for a given
//! input, so recorded files can be compared byte-for-byte.

use meterwise_common::{CostComponent, MeterwiseError, Resource, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Set to rewrite golden files instead of comparing against them
pub const UPDATE_ENV: &str = "UPDATE_GOLDEN";

#[derive(Serialize)]
struct GoldenOutput<'a> {
    resources: Vec<GoldenResource<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoldenResource<'a> {
    name: &'a str,
    cost_components: &'a [CostComponent],
}

/// Render resolved resources as golden JSON, newline-terminated
pub fn render(resources: &[Resource]) -> Result<String> {
    let output = GoldenOutput {
        resources: resources
            .iter()
            .map(|resource| GoldenResource {
                name: &resource.name,
                cost_components: &resource.cost_components,
            })
            .collect(),
    };

    let mut rendered = serde_json::to_string_pretty(&output)?;
    rendered.push('\n');
    Ok(rendered)
}

/// Compare rendered output against a recorded golden file
///
/// With `UPDATE_GOLDEN` set the file is rewritten and the check passes.
pub fn check(path: impl AsRef<Path>, actual: &str) -> Result<()> {
    let path = path.as_ref();

    if std::env::var_os(UPDATE_ENV).is_some() {
        std::fs::write(path, actual)?;
        info!(path = %path.display(), "Updated golden file");
        return Ok(());
    }

    let expected = std::fs::read_to_string(path).map_err(|e| {
        MeterwiseError::Storage(format!(
            "Failed to read golden file {}: {} (run with {}=1 to record it)",
            path.display(),
            e,
            UPDATE_ENV
        ))
    })?;

    if expected != actual {
        let line = expected
            .lines()
            .zip(actual.lines())
            .position(|(e, a)| e != a)
            .unwrap_or_else(|| expected.lines().count().min(actual.lines().count()))
            + 1;
        return Err(MeterwiseError::Internal(format!(
            "Golden file {} differs from output at line {}\n--- expected\n{}\n--- actual\n{}",
            path.display(),
            line,
            expected,
            actual
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::event_notifications::{EnSubscriptionPush, PushDestination};
    use crate::resources::CostResource;

    fn resolved(plan: &str) -> Resource {
        EnSubscriptionPush::new(
            "ibm_en_subscription_firefox.push",
            "us-south",
            plan,
            PushDestination::Firefox,
        )
        .build_resource()
    }

    #[test]
    fn test_render_keeps_descriptor_fields_only() {
        let rendered = render(&[resolved("standard")]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        let resource = &json["resources"][0];
        assert_eq!(resource["name"], "ibm_en_subscription_firefox.push");
        assert!(resource.get("usageSchema").is_none());
        assert_eq!(
            resource["costComponents"][0]["priceFilter"]["unit"],
            "OUTBOUND_DIGITAL_MESSAGES_PUSH"
        );
        assert!(rendered.ends_with("}\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let resources = vec![resolved("lite"), resolved("gold")];
        assert_eq!(render(&resources).unwrap(), render(&resources).unwrap());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]).unwrap(), "{\n  \"resources\": []\n}\n");
    }
}
