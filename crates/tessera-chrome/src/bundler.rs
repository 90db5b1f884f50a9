//! Asset extraction.
//!
//! Every file the document references is resolved against the document URL
//! and given a place in the bundle: the host and directory become the
//! pathname, the last path segment the filename. The document is then
//! re-serialised with those references pointing at the local copies.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, info, trace};
use tessera_common::css_url::{css_urls, replace_css_urls};
use tessera_common::warning::warn_once;
use tessera_dom::{DomTree, ElementData};
use url::Url;

use crate::asset::{Asset, Bundle};
use crate::error::BundleError;
use crate::html;
use crate::mime::{self, OCTET_STREAM};
use crate::settings::ChromeSettings;

/// Attributes holding a single URL, by element.
const URL_ATTRIBUTES: &[(&str, &str)] = &[
    ("img", "src"),
    ("source", "src"),
    ("video", "src"),
    ("video", "poster"),
    ("audio", "src"),
    ("link", "href"),
    ("script", "src"),
    ("object", "data"),
    ("embed", "src"),
    ("iframe", "src"),
];

/// Attributes holding a `srcset` candidate list, by element.
const SRCSET_ATTRIBUTES: &[(&str, &str)] = &[("img", "srcset"), ("source", "srcset")];

/// Schemes that never name a file to bundle.
const INLINE_SCHEMES: &[&str] = &["data:", "javascript:", "mailto:", "tel:", "about:", "blob:"];

/// URLs of a `srcset` value, without their descriptors.
#[must_use]
pub fn srcset_urls(value: &str) -> Vec<&str> {
    value
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

/// Whether `raw` can point at a file.
fn is_bundleable(raw: &str) -> bool {
    let lower = raw.trim().to_ascii_lowercase();
    !lower.is_empty() && !lower.starts_with('#') && !INLINE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Whether a `<link>` points at something the page loads.
fn is_loaded_link(element: &ElementData) -> bool {
    element
        .attr("rel")
        .unwrap_or_default()
        .split_ascii_whitespace()
        .any(|rel| {
            let rel = rel.to_ascii_lowercase();
            rel == "stylesheet" || rel.ends_with("icon")
        })
}

/// Mime type assumed when the file name does not tell.
fn implied_mime(tag: &str, attribute: &str) -> Option<&'static str> {
    match (tag, attribute) {
        ("link", _) => Some("text/css"),
        ("script", _) => Some("text/javascript"),
        ("iframe", _) => Some("text/html"),
        ("img" | "source", _) | ("video", "poster") | (_, "background-image") => Some("image/png"),
        _ => None,
    }
}

/// Where a reference lands in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    uri: String,
    directories: Vec<String>,
    filename: String,
}

/// Builds bundles for one document location.
#[derive(Debug, Clone, Default)]
pub struct ChromeBundler {
    settings: ChromeSettings,
    base: Option<Url>,
}

impl ChromeBundler {
    /// Creates a bundler for a document without a known location; relative
    /// references are kept relative.
    #[must_use]
    pub fn new(settings: ChromeSettings) -> Self {
        Self { settings, base: None }
    }

    /// Resolves relative references against `url`.
    ///
    /// # Errors
    ///
    /// [`BundleError::InvalidBaseUrl`] when `url` is not an absolute URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, BundleError> {
        let parsed = Url::parse(url).map_err(|source| BundleError::InvalidBaseUrl {
            url: url.to_string(),
            source,
        })?;
        self.base = Some(parsed);
        Ok(self)
    }

    /// Target settings.
    #[must_use]
    pub fn settings(&self) -> &ChromeSettings {
        &self.settings
    }

    /// Collects the document's files and re-serialises it to point at them.
    ///
    /// # Errors
    ///
    /// [`BundleError::EmptyDocument`] when the tree has no root element.
    pub fn bundle(&self, tree: &DomTree) -> Result<Bundle, BundleError> {
        let root = tree.document_element().ok_or(BundleError::EmptyDocument)?;
        let mut collector = Collector::new(self);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(element) = tree.as_element(id) {
                collector.element(element);
            }
            stack.extend(tree.children(id).iter().rev().copied());
        }

        let rewrites = collector.rewrites;
        let content = html::serialize(tree, &|tag, attribute, value| rewrite(&rewrites, tag, attribute, value));
        let mut assets = Vec::with_capacity(collector.assets.len() + 1);
        assets.push(Asset {
            pathname: String::new(),
            filename: self.settings.index_filename.clone(),
            mime_type: "text/html".to_string(),
            content: Some(content),
            uri: None,
            compress: self.settings.compression_for("text/html"),
            commands: self.settings.commands_for("text/html"),
        });
        assets.extend(collector.assets.into_values());
        info!("bundled document with {} referenced files", assets.len() - 1);
        Ok(Bundle { assets })
    }

    /// Absolute location of `raw`, or the cleaned relative path when there is
    /// no document URL to resolve it against.
    fn locate(&self, raw: &str) -> Option<Location> {
        let raw = raw.trim();
        let resolved = match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => base.join(raw).ok(),
                None => return Some(relative_location(raw, &self.settings.local_directory)),
            },
            Err(_) => None,
        };
        let Some(url) = resolved else {
            warn_once("chrome", &format!("unresolvable reference {raw:?} left in place"));
            return None;
        };
        if !matches!(url.scheme(), "http" | "https" | "file") {
            return None;
        }
        let mut segments: Vec<String> = url
            .path_segments()
            .map(|split| split.map(str::to_string).collect())
            .unwrap_or_default();
        let filename = segments.pop().unwrap_or_default();
        let host = url.host_str().map_or_else(|| self.settings.local_directory.clone(), str::to_string);
        let directories = std::iter::once(host)
            .chain(segments)
            .filter(|segment| !segment.is_empty())
            .collect();
        Some(Location {
            uri: url.to_string(),
            directories,
            filename,
        })
    }
}

/// Location of a relative reference when no document URL is known.
fn relative_location(raw: &str, local_directory: &str) -> Location {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let _ = segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    let filename = if path.ends_with('/') {
        String::new()
    } else {
        segments.pop().unwrap_or_default().to_string()
    };
    let directories = std::iter::once(local_directory)
        .chain(segments)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    Location {
        uri: raw.to_string(),
        directories,
        filename,
    }
}

/// Rewrites the URLs inside one attribute value.
fn rewrite(rewrites: &HashMap<String, String>, tag: &str, attribute: &str, value: &str) -> String {
    let local = |raw: &str| rewrites.get(raw.trim()).cloned();
    if attribute == "style" {
        return replace_css_urls(value, local);
    }
    if SRCSET_ATTRIBUTES.contains(&(tag, attribute)) {
        return value
            .split(',')
            .map(|candidate| {
                let candidate = candidate.trim();
                let (url, descriptor) = candidate.split_once(char::is_whitespace).unwrap_or((candidate, ""));
                match (local(url), descriptor.trim()) {
                    (Some(path), "") => path,
                    (Some(path), descriptor) => format!("{path} {descriptor}"),
                    (None, _) => candidate.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
    }
    if URL_ATTRIBUTES.contains(&(tag, attribute)) {
        if let Some(path) = local(value) {
            return path;
        }
    }
    value.to_string()
}

/// Accumulates assets over one document walk.
struct Collector<'a> {
    bundler: &'a ChromeBundler,
    /// Assets keyed by source uri, in first-reference order.
    assets: IndexMap<String, Asset>,
    /// Raw reference to bundle path.
    rewrites: HashMap<String, String>,
    used_paths: HashSet<String>,
    generated: usize,
}

impl<'a> Collector<'a> {
    fn new(bundler: &'a ChromeBundler) -> Self {
        let mut used_paths = HashSet::new();
        let _ = used_paths.insert(bundler.settings.index_filename.clone());
        Self {
            bundler,
            assets: IndexMap::new(),
            rewrites: HashMap::new(),
            used_paths,
            generated: 0,
        }
    }

    fn element(&mut self, element: &ElementData) {
        let tag = element.tag_name.as_str();
        if tag == "link" && !is_loaded_link(element) {
            return;
        }
        if tag == "script" && !self.bundler.settings.include_scripts {
            return;
        }
        for &(owner, attribute) in URL_ATTRIBUTES {
            if owner == tag {
                if let Some(value) = element.attr(attribute) {
                    self.reference(value, implied_mime(tag, attribute));
                }
            }
        }
        for &(owner, attribute) in SRCSET_ATTRIBUTES {
            if owner == tag {
                for url in srcset_urls(element.attr(attribute).unwrap_or_default()) {
                    self.reference(url, implied_mime(tag, attribute));
                }
            }
        }
        let computed = element.style.get("background-image").unwrap_or_default();
        let inline = element.attr("style").unwrap_or_default();
        for url in css_urls(computed).into_iter().chain(css_urls(inline)) {
            self.reference(url, implied_mime(tag, "background-image"));
        }
    }

    fn reference(&mut self, raw: &str, implied: Option<&'static str>) {
        let raw = raw.trim();
        if !is_bundleable(raw) || self.rewrites.contains_key(raw) {
            return;
        }
        let Some(location) = self.bundler.locate(raw) else {
            return;
        };
        if let Some(existing) = self.assets.get(&location.uri) {
            let _ = self.rewrites.insert(raw.to_string(), existing.path());
            return;
        }

        let mime_type = mime::from_filename(&location.filename)
            .or(implied)
            .unwrap_or(OCTET_STREAM)
            .to_string();
        let pathname = location.directories.join("/");
        let filename = self.unique_filename(&pathname, &location.filename, &mime_type);
        let settings = &self.bundler.settings;
        let asset = Asset {
            compress: settings.compression_for(&mime_type),
            commands: settings.commands_for(&mime_type),
            pathname,
            filename,
            mime_type,
            content: None,
            uri: Some(location.uri.clone()),
        };
        let path = asset.path();
        debug!("asset {raw:?} -> {path}");
        trace!("asset {raw:?} resolved to {}", location.uri);
        let _ = self.used_paths.insert(path.clone());
        let _ = self.rewrites.insert(raw.to_string(), path);
        let _ = self.assets.insert(location.uri, asset);
    }

    /// `filename`, or a generated name when it is empty, made unique within
    /// `pathname` by a numeric suffix.
    fn unique_filename(&mut self, pathname: &str, filename: &str, mime_type: &str) -> String {
        let base = if filename.is_empty() {
            self.generated += 1;
            match mime::extension_for(mime_type) {
                Some(extension) => format!("file_{}.{extension}", self.generated),
                None => format!("file_{}", self.generated),
            }
        } else {
            filename.to_string()
        };
        let path_of = |name: &str| {
            if pathname.is_empty() {
                name.to_string()
            } else {
                format!("{pathname}/{name}")
            }
        };
        if !self.used_paths.contains(&path_of(&base)) {
            return base;
        }
        let (stem, extension) = match base.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem.to_string(), format!(".{extension}")),
            _ => (base.clone(), String::new()),
        };
        (2..)
            .map(|n| format!("{stem}_{n}{extension}"))
            .find(|candidate| !self.used_paths.contains(&path_of(candidate)))
            .unwrap_or(base)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn test_srcset_drops_descriptors() {
        assert_eq!(srcset_urls("small.jpg 480w, large.jpg 1080w"), vec!["small.jpg", "large.jpg"]);
        assert_eq!(srcset_urls("only.png"), vec!["only.png"]);
    }

    #[test]
    fn test_relative_location_without_base() {
        let location = relative_location("./img/../icons/logo.svg?v=2", "assets");
        assert_eq!(location.directories, vec!["assets", "icons"]);
        assert_eq!(location.filename, "logo.svg");
        assert_eq!(location.uri, "./img/../icons/logo.svg?v=2");
    }

    #[quickcheck]
    fn prop_srcset_urls_have_no_whitespace(value: String) -> bool {
        srcset_urls(&value).iter().all(|url| !url.is_empty() && !url.contains(char::is_whitespace))
    }

    #[test]
    fn test_inline_schemes_are_skipped() {
        assert!(!is_bundleable("data:image/png;base64,AAAA"));
        assert!(!is_bundleable("#top"));
        assert!(!is_bundleable("  "));
        assert!(is_bundleable("https://example.com/a.png"));
    }
}
