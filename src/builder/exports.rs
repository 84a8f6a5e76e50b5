//! Export map synthesis.
//!
//! Two maps come out of a build plan. The dev map points every export key
//! straight at a source file so workspace consumers run against sources.
//! The publish map points at build output, one condition per enabled target.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::builder::plan::BuildPlan;
use crate::core::manifest::Manifest;
use crate::core::target::RuntimeTarget;

/// Published resolution of one export key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishExport {
    pub types: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    pub default: String,
}

impl PublishExport {
    /// Compiled path for a target, if the target contributes to this key.
    pub fn target(&self, target: RuntimeTarget) -> Option<&str> {
        match target {
            RuntimeTarget::Primary => self.import.as_deref(),
            RuntimeTarget::Compat => self.require.as_deref(),
            RuntimeTarget::Browser => self.browser.as_deref(),
        }
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Dev and publish export maps, both sorted with `"."` first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportMaps {
    dev: Vec<(String, String)>,
    publish: Vec<(String, PublishExport)>,
}

impl ExportMaps {
    /// Derive both maps from a build plan.
    pub fn from_plan(plan: &BuildPlan) -> Self {
        let mut dev = Vec::new();
        let mut publish = Vec::new();

        for (key, group) in plan.groups() {
            let Some(default_entry) = group.select_default() else {
                continue;
            };
            dev.push((key.clone(), format!("./{}", default_entry.path())));

            let types = plan.types_path(default_entry);
            let compiled = |target: RuntimeTarget| {
                if !plan.targets().is_enabled(target) {
                    return None;
                }
                group
                    .select_for_target(target)
                    .map(|entry| plan.output_path(entry, target))
            };

            let import = compiled(RuntimeTarget::Primary);
            let require = compiled(RuntimeTarget::Compat);
            let browser = compiled(RuntimeTarget::Browser);
            let default = import
                .clone()
                .or_else(|| require.clone())
                .or_else(|| browser.clone())
                .unwrap_or_else(|| types_to_js(&types));

            publish.push((
                key.clone(),
                PublishExport {
                    types,
                    import,
                    require,
                    browser,
                    default,
                },
            ));
        }

        ExportMaps { dev, publish }
    }

    /// Dev map entries.
    pub fn dev(&self) -> &[(String, String)] {
        &self.dev
    }

    /// Publish map entries.
    pub fn publish(&self) -> &[(String, PublishExport)] {
        &self.publish
    }

    /// Look up a publish record by key.
    pub fn publish_export(&self, key: &str) -> Option<&PublishExport> {
        self.publish
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, export)| export)
    }

    /// Declaration path of the `"."` export.
    pub fn root_types(&self) -> Option<&str> {
        self.publish_export(".").map(|export| export.types.as_str())
    }

    /// Dev map as a JSON object.
    pub fn dev_json(&self) -> Value {
        let map: Map<String, Value> = self
            .dev
            .iter()
            .map(|(key, path)| (key.clone(), Value::String(path.clone())))
            .collect();
        Value::Object(map)
    }

    /// Publish map as a JSON object.
    pub fn publish_json(&self) -> Value {
        let map: Map<String, Value> = self
            .publish
            .iter()
            .map(|(key, export)| (key.clone(), export.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Write both maps and the root types path into a manifest.
    pub fn apply(&self, manifest: &mut Manifest) {
        manifest.set_exports(self.dev_json());
        manifest.set_publish_exports(self.publish_json());
        if let Some(types) = self.root_types() {
            manifest.set_types(types);
        }
    }
}

fn types_to_js(types: &str) -> String {
    match types.strip_suffix(".d.ts") {
        Some(stem) => format!("{}.js", stem),
        None => types.to_string(),
    }
}
