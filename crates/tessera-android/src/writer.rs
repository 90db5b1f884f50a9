//! Serialises the render tree and resource tables into project files.
//!
//! ```text
//! res/layout/<main_layout>.xml     the document
//! res/layout/<include>.xml         one per data-include subtree
//! res/values/strings.xml           ... colors, dimens, styles, arrays
//! res/drawable/<name>.xml          generated shapes and layer lists
//! ```

use std::fmt::Write;
use std::sync::LazyLock;

use log::{debug, warn};
use serde_json::{Map, Value, json};
use tessera_layout::{
    InsertPosition, InsertionTable, NodeId, NodeTree, OutputFile, ResourceStore, TemplateKind, resource_name,
};

use crate::settings::AndroidSettings;
use crate::template::{apply_template, escape_attribute, rules};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

static VALUES: LazyLock<Map<String, Value>> = LazyLock::new(|| {
    rules(json!({
        "resources": {
            ">": {
                "string": { "@": ["name"], "~": "value" },
                "color": { "@": ["name"], "~": "value" },
                "dimen": { "@": ["name"], "~": "value" },
                "style": {
                    "@": ["name", "parent"],
                    ">": { "item": { "@": ["name"], "~": "value" } }
                },
                "string-array": {
                    "@": ["name"],
                    ">": { "item": { "~": "value" } }
                }
            }
        }
    }))
});

/// Every file for a laid-out document.
#[must_use]
pub fn write_document(
    tree: &NodeTree,
    insertions: &InsertionTable,
    resources: &ResourceStore,
    settings: &AndroidSettings,
) -> Vec<OutputFile> {
    let mut files = Vec::new();
    let Some(&root) = tree.render_children(tree.document()).first() else {
        return files;
    };
    let writer = LayoutWriter {
        tree,
        insertions,
        settings,
    };
    files.push(writer.layout_file(root, &settings.main_layout));
    for id in tree.render_order() {
        if id != root && is_include(tree, id) {
            files.push(writer.layout_file(id, &include_name(tree, id)));
        }
    }
    files.extend(value_files(resources, settings));
    for (name, content) in resources.drawables() {
        files.push(OutputFile::new(
            "res/drawable",
            format!("{name}.xml"),
            format!("{XML_HEADER}{content}"),
        ));
    }
    debug!("wrote {} android files", files.len());
    files
}

fn is_include(tree: &NodeTree, id: NodeId) -> bool {
    tree[id]
        .template
        .as_ref()
        .is_some_and(|t| t.kind == TemplateKind::Include)
}

/// Layout name for an include subtree: its `data-include` value, or the
/// document id.
fn include_name(tree: &NodeTree, id: NodeId) -> String {
    let node = &tree[id];
    let fallback = node.document_id().unwrap_or("include");
    match node.attr("data-include").filter(|v| !v.trim().is_empty()) {
        Some(name) => resource_name(name, fallback),
        None => fallback.to_string(),
    }
}

struct LayoutWriter<'a> {
    tree: &'a NodeTree,
    insertions: &'a InsertionTable,
    settings: &'a AndroidSettings,
}

impl LayoutWriter<'_> {
    fn pad(&self, depth: usize) -> String {
        " ".repeat(depth * self.settings.indent)
    }

    fn layout_file(&self, root: NodeId, name: &str) -> OutputFile {
        let mut out = String::from(XML_HEADER);
        self.view(&mut out, root, 0, true);
        OutputFile::new("res/layout", format!("{name}.xml"), out)
    }

    /// Prefixes used anywhere in the subtree of `root`.
    fn namespaces(&self, root: NodeId) -> Vec<(&'static str, &str)> {
        let mut used = [false; 3];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for (key, _) in self.tree[id].attributes.iter() {
                match key.split_once(':').map(|(prefix, _)| prefix) {
                    Some("app") => used[1] = true,
                    Some("tools") => used[2] = true,
                    _ => {}
                }
            }
            stack.extend(self.tree.render_children(id));
        }
        used[0] = true;
        let namespaces = &self.settings.namespaces;
        [
            ("android", namespaces.android.as_str()),
            ("app", namespaces.app.as_str()),
            ("tools", namespaces.tools.as_str()),
        ]
        .into_iter()
        .zip(used)
        .filter_map(|(entry, used)| used.then_some(entry))
        .collect()
    }

    fn fragments(&self, out: &mut String, id: NodeId, position: InsertPosition, depth: usize) {
        let pad = self.pad(depth);
        for fragment in self.insertions.fragments(id, position) {
            for line in fragment.lines().filter(|l| !l.trim().is_empty()) {
                let _ = writeln!(out, "{pad}{line}");
            }
        }
    }

    fn view(&self, out: &mut String, id: NodeId, depth: usize, root: bool) {
        let node = &self.tree[id];
        let Some(template) = &node.template else {
            return;
        };
        let pad = self.pad(depth);
        self.fragments(out, id, InsertPosition::BeforeOutside, depth);

        if !root && template.kind == TemplateKind::Include {
            let _ = writeln!(
                out,
                "{pad}<include layout=\"@layout/{}\" />",
                include_name(self.tree, id)
            );
            self.fragments(out, id, InsertPosition::AfterOutside, depth);
            return;
        }

        let attribute_pad = self.pad(depth + 1);
        let _ = write!(out, "{pad}<{}", template.control_name);
        if root {
            for (prefix, uri) in self.namespaces(id) {
                let _ = write!(out, "\n{attribute_pad}xmlns:{prefix}=\"{uri}\"");
            }
        }
        for (key, value) in node.attributes.iter() {
            let _ = write!(out, "\n{attribute_pad}{key}=\"{}\"", escape_attribute(value));
        }

        let children: Vec<NodeId> = self
            .tree
            .render_children(id)
            .iter()
            .copied()
            .filter(|&c| !self.tree[c].flags.excluded)
            .collect();
        let empty = children.is_empty()
            && self.insertions.fragments(id, InsertPosition::BeforeInside).is_empty()
            && self.insertions.fragments(id, InsertPosition::AfterInside).is_empty();
        if empty {
            out.push_str(" />\n");
        } else {
            out.push_str(">\n");
            self.fragments(out, id, InsertPosition::BeforeInside, depth + 1);
            for child in children {
                self.view(out, child, depth + 1, false);
            }
            self.fragments(out, id, InsertPosition::AfterInside, depth + 1);
            let _ = writeln!(out, "{pad}</{}>", template.control_name);
        }
        self.fragments(out, id, InsertPosition::AfterOutside, depth);
    }
}

/// Escapes characters `aapt` treats specially in string resources.
fn escape_string(value: &str) -> String {
    value.replace('\'', "\\'").replace('"', "\\\"")
}

fn named(name: &str, value: &str) -> Value {
    json!({ "name": name, "value": value })
}

fn value_files(resources: &ResourceStore, settings: &AndroidSettings) -> Vec<OutputFile> {
    let strings = resources
        .strings()
        .iter()
        .map(|(name, value)| named(name, &escape_string(value)))
        .collect();
    let colors = resources.colors().iter().map(|(n, v)| named(n, v)).collect();
    let dimens = resources.dimens().iter().map(|(n, v)| named(n, v)).collect();
    let styles = resources
        .styles()
        .iter()
        .map(|(name, style)| {
            json!({
                "name": name,
                "parent": style.parent,
                "item": style.items.iter().map(|(n, v)| named(n, v)).collect::<Vec<_>>(),
            })
        })
        .collect();
    let arrays = resources
        .arrays()
        .iter()
        .map(|(name, items)| {
            json!({
                "name": name,
                "item": items.iter().map(|v| json!({ "value": escape_string(v) })).collect::<Vec<_>>(),
            })
        })
        .collect();

    [
        ("strings.xml", "string", strings),
        ("colors.xml", "color", colors),
        ("dimens.xml", "dimen", dimens),
        ("styles.xml", "style", styles),
        ("arrays.xml", "string-array", arrays),
    ]
    .into_iter()
    .filter_map(|(filename, tag, items)| values_file(filename, tag, items, settings))
    .collect()
}

fn values_file(filename: &str, tag: &str, items: Vec<Value>, settings: &AndroidSettings) -> Option<OutputFile> {
    if items.is_empty() {
        return None;
    }
    let mut data = Map::new();
    let _ = data.insert(tag.to_string(), Value::Array(items));
    match apply_template("resources", &VALUES, &[Value::Object(data)], 0, settings.indent) {
        Ok(xml) => Some(OutputFile::new("res/values", filename, format!("{XML_HEADER}{xml}"))),
        Err(err) => {
            warn!("{filename} not written: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use tessera_common::color::Rgba;
    use tessera_layout::StyleResource;

    use super::*;

    #[test]
    fn test_string_escaping() {
        assert_eq!(escape_string("It's \"fine\""), "It\\'s \\\"fine\\\"");
    }

    #[test]
    fn test_value_files() {
        let mut resources = ResourceStore::new();
        let _ = resources.add_string("Don't & go", None);
        let _ = resources.add_color(&Rgba::opaque(255, 0, 0));
        let mut style = StyleResource::default();
        let _ = style.items.insert("android:textSize".to_string(), "14sp".to_string());
        let _ = resources.add_style("TextStyle", style);
        let settings = AndroidSettings::default();
        let files = value_files(&resources, &settings);
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["strings.xml", "colors.xml", "styles.xml"]);
        assert_eq!(
            files[0].content,
            format!("{XML_HEADER}<resources>\n    <string name=\"don_t_go\">Don\\'t &amp; go</string>\n</resources>\n")
        );
        assert!(files[2].content.contains("<style name=\"TextStyle\">\n        <item name=\"android:textSize\">14sp</item>"));
    }
}
