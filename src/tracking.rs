//! Front-end tracking snippet
//!
//! [`TrackingSnippet`] holds the computed values; [`TrackingSnippet::render`]
//! turns them into the markup injected into page output.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::connect::PluginSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSnippet {
    pub organization_id: String,
    pub script_url: String,
    /// Changes whenever the organization or the plugin version changes
    pub cache_buster: String,
}

impl TrackingSnippet {
    /// Returns `None` when the site is not connected
    pub fn for_settings(
        settings: Option<&PluginSettings>,
        script_url: &str,
        version: &str,
    ) -> Option<Self> {
        let settings = settings?;
        if settings.organization_id.is_empty() {
            return None;
        }

        Some(Self {
            organization_id: settings.organization_id.clone(),
            script_url: script_url.to_string(),
            cache_buster: cache_buster(&settings.organization_id, version),
        })
    }

    pub fn script_src(&self) -> String {
        let separator = if self.script_url.contains('?') { '&' } else { '?' };
        format!("{}{}v={}", self.script_url, separator, self.cache_buster)
    }

    pub fn render(&self) -> String {
        // serde_json output is a valid JS string literal; escape `</` so the
        // value cannot close the surrounding script element
        let organization_id = serde_json::Value::String(self.organization_id.clone())
            .to_string()
            .replace("</", "<\\/");

        format!(
            r#"<script async src="{src}"></script>
<script>
    window.flowganise = window.flowganise || [];
    function fgan(){{flowganise.push(arguments);}}
    fgan('js', new Date());
    fgan('config', {organization_id});
</script>
"#,
            src = html_escape_attr(&self.script_src()),
        )
    }
}

fn cache_buster(organization_id: &str, version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{organization_id}:{version}"));
    hex::encode(hasher.finalize())[..8].to_string()
}

fn html_escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT_URL: &str = "https://script.flowganise.com/";

    fn settings(id: &str) -> PluginSettings {
        PluginSettings::new(id, "https://example.com")
    }

    #[test]
    fn for_settings_returns_none_when_not_connected() {
        assert_eq!(TrackingSnippet::for_settings(None, SCRIPT_URL, "1.0.0"), None);
        assert_eq!(
            TrackingSnippet::for_settings(Some(&settings("")), SCRIPT_URL, "1.0.0"),
            None
        );
    }

    #[test]
    fn cache_buster_changes_with_version_and_organization() {
        let a = cache_buster("org_123", "1.0.0");

        assert_eq!(a.len(), 8);
        assert_eq!(a, cache_buster("org_123", "1.0.0"));
        assert_ne!(a, cache_buster("org_123", "1.1.0"));
        assert_ne!(a, cache_buster("org_456", "1.0.0"));
    }

    #[test]
    fn render_embeds_script_url_and_organization() {
        let snippet =
            TrackingSnippet::for_settings(Some(&settings("org_123")), SCRIPT_URL, "1.0.0")
                .unwrap();

        let html = snippet.render();

        assert!(html.contains(&format!(
            r#"<script async src="https://script.flowganise.com/?v={}"></script>"#,
            snippet.cache_buster
        )));
        assert!(html.contains(r#"fgan('config', "org_123");"#));
    }

    #[test]
    fn render_escapes_closing_script_tag_in_organization_id() {
        let snippet = TrackingSnippet::for_settings(
            Some(&settings("</script><b>")),
            SCRIPT_URL,
            "1.0.0",
        )
        .unwrap();

        assert!(!snippet.render().contains("</script><b>"));
    }

    #[test]
    fn script_src_appends_to_existing_query() {
        let snippet = TrackingSnippet::for_settings(
            Some(&settings("org_123")),
            "https://script.flowganise.com/?site=1",
            "1.0.0",
        )
        .unwrap();

        assert!(snippet.script_src().starts_with("https://script.flowganise.com/?site=1&v="));
    }
}
