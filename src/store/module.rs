//! Module-file container.
//!
//! A module file holds one exported object per icon and an aggregate
//! manifest object that maps icon names to those exports:
//!
//! ```text
//! export const homeOutline = {
//!   name: 'home-outline',
//!   body: `<path d="M0 0"/>`,
//!   viewBox: '0 0 24 24'
//! };
//!
//! export const icons = {
//!   'home-outline': homeOutline
//! };
//! ```
//!
//! Every mutation parses the file into a [`ModuleDocument`] of byte spans and
//! then splices only the spans it needs to change. Text outside those spans
//! (other definitions, comments, imports) is carried over byte for byte.

use std::ops::Range;

use tracing::{debug, warn};

use super::literal::{self, Value, field, parse_object};
use super::scan::{declarations, removal_range};
use super::{IconStore, Upsert, UpsertKind};
use crate::error::{Error, Result};
use crate::icon::{Animation, DEFAULT_VIEW_BOX, IconRecord, IconSet, to_identifier};
use crate::markup::splice;

/// Name of the manifest export when none is configured.
pub const DEFAULT_MANIFEST_NAME: &str = "icons";

/// Store for the module-file form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStore {
    manifest_name: String,
    header: Option<String>,
    strict: bool,
}

impl Default for ModuleStore {
    fn default() -> Self {
        Self {
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            header: None,
            strict: false,
        }
    }
}

impl ModuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identifier of the manifest export.
    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    /// Sets the comment written at the top of newly created files.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// In strict mode a missing manifest is an error instead of a degraded
    /// append.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Parses `content` into its definitions and manifest.
    pub(crate) fn parse(&self, content: &str) -> Result<ModuleDocument> {
        ModuleDocument::parse(content, &self.manifest_name)
    }

    /// Storage identifier for an icon name.
    ///
    /// A name that would shadow the manifest export gets an `Icon` suffix.
    pub fn identifier_for(&self, name: &str) -> String {
        let identifier = to_identifier(name);
        if identifier == self.manifest_name {
            format!("{identifier}Icon")
        } else {
            identifier
        }
    }

    fn manifest_head(&self) -> String {
        format!("export const {} = ", self.manifest_name)
    }
}

impl IconStore for ModuleStore {
    fn create(&self, record: &IconRecord) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            for line in header.lines() {
                if line.is_empty() {
                    out.push_str("//\n");
                } else {
                    out.push_str("// ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out.push('\n');
        }

        let identifier = self.identifier_for(&record.name);
        out.push_str(&render_block(&identifier, record));
        let entries = [ManifestEntry::new(record.name.clone(), identifier)];
        out.push_str("\n\n");
        out.push_str(&render_manifest(&self.manifest_head(), &entries, true));
        out.push('\n');
        out
    }

    fn upsert(&self, content: &str, record: &IconRecord) -> Result<Upsert> {
        if content.trim().is_empty() {
            debug!(name = %record.name, "creating module file");
            return Ok(Upsert::new(self.create(record), UpsertKind::Created));
        }

        let doc = self.parse(content)?;
        let identifier = self.identifier_for(&record.name);
        let block = render_block(&identifier, record);

        if let Some(existing) = doc.definition(&identifier) {
            debug!(name = %record.name, %identifier, "replacing definition");
            let mut edits = vec![(existing.span.clone(), block)];
            if let Some(manifest) = &doc.manifest {
                let mut entries = manifest.entries.clone();
                let mut changed = false;
                match entries.iter_mut().find(|e| e.refers_to(&identifier)) {
                    Some(entry) if entry.name != record.name => {
                        entry.name = record.name.clone();
                        changed = true;
                    }
                    Some(_) => {}
                    None => {
                        entries.push(ManifestEntry::new(record.name.clone(), identifier.clone()));
                        changed = true;
                    }
                }
                if changed {
                    edits.push((manifest.span.clone(), manifest.render(&entries)));
                }
            }
            return Ok(Upsert::new(apply(content, edits), UpsertKind::Replaced));
        }

        match &doc.manifest {
            Some(manifest) => {
                debug!(name = %record.name, %identifier, "inserting definition");
                let mut entries: Vec<_> = manifest
                    .entries
                    .iter()
                    .filter(|e| e.name != record.name && !e.refers_to(&identifier))
                    .cloned()
                    .collect();
                entries.push(ManifestEntry::new(record.name.clone(), identifier));
                let replacement = format!("{block}\n\n{}", manifest.render(&entries));
                let edits = vec![(manifest.span.clone(), replacement)];
                Ok(Upsert::new(apply(content, edits), UpsertKind::Inserted))
            }
            None if self.strict => Err(Error::ManifestNotFound(self.manifest_name.clone())),
            None => {
                warn!(
                    name = %record.name,
                    manifest = %self.manifest_name,
                    "manifest not found, appending definition without registering it"
                );
                let appended = format!("{}\n\n{block}\n", content.trim_end());
                Ok(Upsert::new(appended, UpsertKind::AppendedWithoutManifest))
            }
        }
    }

    fn remove(&self, content: &str, name: &str) -> Result<String> {
        let doc = self.parse(content)?;

        let targets: Vec<&Definition> = doc
            .definitions
            .iter()
            .filter(|d| d.record.name == name || d.identifier == name)
            .collect();
        let mut edits: Vec<_> = targets
            .iter()
            .map(|d| (d.removal.clone(), String::new()))
            .collect();

        if let Some(manifest) = &doc.manifest {
            let kept: Vec<_> = manifest
                .entries
                .iter()
                .filter(|e| {
                    e.name != name && !targets.iter().any(|d| e.refers_to(&d.identifier))
                })
                .cloned()
                .collect();
            if kept.len() != manifest.entries.len() {
                edits.push((manifest.span.clone(), manifest.render(&kept)));
            }
        }

        if edits.is_empty() {
            debug!(%name, "nothing to remove");
            return Ok(content.to_string());
        }
        debug!(%name, definitions = targets.len(), "removing definition");
        Ok(apply(content, edits))
    }

    fn records(&self, content: &str) -> Result<IconSet> {
        let doc = self.parse(content)?;
        Ok(IconSet::from_records(
            doc.definitions.into_iter().map(|d| d.record).collect(),
        ))
    }

    fn exists(&self, content: &str, name: &str) -> bool {
        match self.parse(content) {
            Ok(doc) => doc.definition(&self.identifier_for(name)).is_some(),
            Err(err) => {
                warn!(%err, "cannot query malformed module file");
                false
            }
        }
    }
}

// ============================================================================
// Document model
// ============================================================================

/// A parsed module file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ModuleDocument {
    pub definitions: Vec<Definition>,
    pub manifest: Option<Manifest>,
}

/// One icon export.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Definition {
    pub identifier: String,
    pub record: IconRecord,
    pub span: Range<usize>,
    /// `span` plus the separator that follows it.
    pub removal: Range<usize>,
}

/// One manifest property. The value is usually a bare identifier naming a
/// definition; anything else is carried through re-renders unchanged.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ManifestEntry {
    pub name: String,
    pub value: Value,
}

impl ManifestEntry {
    fn new(name: String, identifier: String) -> Self {
        Self {
            name,
            value: Value::Ident(identifier),
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.value.as_ident()
    }

    fn refers_to(&self, identifier: &str) -> bool {
        self.identifier() == Some(identifier)
    }
}

/// The aggregate export object.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Manifest {
    /// Source text before the opening brace, kept when re-rendering.
    pub head: String,
    pub terminated: bool,
    pub span: Range<usize>,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    fn render(&self, entries: &[ManifestEntry]) -> String {
        render_manifest(&self.head, entries, self.terminated)
    }
}

impl ModuleDocument {
    pub fn parse(source: &str, manifest_name: &str) -> Result<Self> {
        let mut definitions = Vec::new();
        let mut manifest = None;

        for decl in declarations(source)? {
            if decl.identifier == manifest_name {
                let fields = parse_object(source, decl.object.start)?;
                let entries = fields
                    .into_iter()
                    .map(|(name, value)| ManifestEntry { name, value })
                    .collect();
                manifest = Some(Manifest {
                    head: decl.head(source).to_string(),
                    terminated: decl.terminated(source),
                    span: decl.span.clone(),
                    entries,
                });
                continue;
            }

            // Exports that are not icon records are left alone.
            let Ok(fields) = parse_object(source, decl.object.start) else {
                debug!(identifier = %decl.identifier, "skipping non-literal export");
                continue;
            };
            let Some(record) = record_from_fields(&decl.identifier, &fields) else {
                continue;
            };
            definitions.push(Definition {
                removal: removal_range(source, &decl.span),
                identifier: decl.identifier,
                record,
                span: decl.span,
            });
        }

        Ok(Self {
            definitions,
            manifest,
        })
    }

    pub fn definition(&self, identifier: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.identifier == identifier)
    }
}

fn record_from_fields(identifier: &str, fields: &[(String, Value)]) -> Option<IconRecord> {
    let body = field(fields, "body")?.as_str()?;
    let name = field(fields, "name")
        .and_then(Value::as_text)
        .unwrap_or_else(|| identifier.to_string());
    let view_box = field(fields, "viewBox")
        .and_then(Value::as_text)
        .unwrap_or_else(|| DEFAULT_VIEW_BOX.to_string());

    let mut record = IconRecord::new(name, body).with_view_box(view_box);
    if let Some(Value::Object(animation)) = field(fields, "animation") {
        record.animation = animation_from_fields(animation);
    }
    Some(record)
}

fn animation_from_fields(fields: &[(String, Value)]) -> Option<Animation> {
    let kind = field(fields, "type")?.as_text()?;
    let text = |key: &str, default: &str| {
        field(fields, key)
            .and_then(Value::as_text)
            .unwrap_or_else(|| default.to_string())
    };
    Some(Animation {
        kind,
        duration: field(fields, "duration").and_then(Value::as_f64).unwrap_or(0.0),
        timing: text("timing", "ease"),
        iteration: text("iteration", "1"),
        delay: field(fields, "delay").and_then(Value::as_f64),
        direction: field(fields, "direction").and_then(Value::as_text),
    })
}

// ============================================================================
// Rendering
// ============================================================================

fn render_block(identifier: &str, record: &IconRecord) -> String {
    let mut out = format!(
        "export const {} = {{\n  name: {},\n  body: {},\n  viewBox: {}",
        identifier,
        literal::quote(&record.name),
        literal::template(&record.body),
        literal::quote(&record.view_box),
    );
    if let Some(animation) = &record.animation {
        out.push_str(",\n  animation: ");
        out.push_str(&render_animation(animation));
    }
    out.push_str("\n};");
    out
}

fn render_animation(animation: &Animation) -> String {
    let mut parts = vec![
        format!("type: {}", literal::quote(&animation.kind)),
        format!("duration: {}", literal::format_number(animation.duration)),
        format!("timing: {}", literal::quote(&animation.timing)),
        format!("iteration: {}", literal::quote(&animation.iteration)),
    ];
    if let Some(delay) = animation.delay {
        parts.push(format!("delay: {}", literal::format_number(delay)));
    }
    if let Some(direction) = &animation.direction {
        parts.push(format!("direction: {}", literal::quote(direction)));
    }
    format!("{{ {} }}", parts.join(", "))
}

fn render_manifest(head: &str, entries: &[ManifestEntry], terminated: bool) -> String {
    let semicolon = if terminated { ";" } else { "" };
    if entries.is_empty() {
        return format!("{head}{{}}{semicolon}");
    }
    let lines: Vec<_> = entries
        .iter()
        .map(|e| format!("  {}: {}", literal::quote(&e.name), e.value.to_source()))
        .collect();
    format!("{head}{{\n{}\n}}{semicolon}", lines.join(",\n"))
}

fn apply(content: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| range.start);
    splice(content, &edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use regex::Regex;

    fn store() -> ModuleStore {
        ModuleStore::new()
    }

    fn icon(name: &str, body: &str) -> IconRecord {
        IconRecord::new(name, body)
    }

    #[test]
    fn create_writes_block_and_manifest() {
        let out = store()
            .with_header("Generated icons.\nDo not edit.")
            .create(&icon("home-outline", r#"<path d="M0 0"/>"#));
        assert_eq!(
            out,
            "// Generated icons.\n// Do not edit.\n\n\
             export const homeOutline = {\n  name: 'home-outline',\n  body: `<path d=\"M0 0\"/>`,\n  viewBox: '0 0 24 24'\n};\n\n\
             export const icons = {\n  'home-outline': homeOutline\n};\n"
        );
    }

    #[test]
    fn upsert_on_blank_creates() {
        let result = store().upsert("  \n", &icon("a", "<path/>")).unwrap();
        assert_eq!(result.kind, UpsertKind::Created);
        assert_eq!(store().list_names(&result.content), vec!["a"]);
    }

    #[test]
    fn add_then_update() {
        let s = store();
        let content = s.create(&icon("home", "<path/>"));
        let added = s.upsert(&content, &icon("star", "<circle/>")).unwrap();
        assert_eq!(added.kind, UpsertKind::Inserted);
        assert_eq!(s.list_names(&added.content), vec!["home", "star"]);
        assert!(added.content.contains("  'home': home,\n  'star': star\n"));

        let updated = s
            .upsert(&added.content, &icon("star", "<rect/>").with_view_box("0 0 16 16"))
            .unwrap();
        assert_eq!(updated.kind, UpsertKind::Replaced);
        assert_eq!(s.count(&updated.content), 2);

        let records = s.records(&updated.content).unwrap();
        let star = records.find("star").unwrap();
        assert_eq!(star.body, "<rect/>");
        assert_eq!(star.view_box, "0 0 16 16");
        assert_eq!(updated.content.matches("'star': star").count(), 1);
    }

    #[test]
    fn untouched_definitions_are_byte_identical() {
        let content = "import type { Icon } from './types';\n\n\
            export const home = {\n    name: \"home\",   // hand edited\n    body: '<path/>'\n};\n\n\
            export const icons = {\n  'home': home\n};\n";
        let s = store();
        let out = s.upsert(content, &icon("star", "<circle/>")).unwrap().content;
        let untouched = "import type { Icon } from './types';\n\n\
            export const home = {\n    name: \"home\",   // hand edited\n    body: '<path/>'\n};\n\n";
        assert!(out.starts_with(untouched));

        let removed = s.remove(&out, "star").unwrap();
        assert_eq!(removed, content);
    }

    #[test]
    fn removing_last_entry_leaves_empty_manifest() {
        let s = store();
        let content = s.create(&icon("home", "<path/>"));
        let out = s.remove(&content, "home").unwrap();
        assert_eq!(out, "export const icons = {};\n");
        let shape = Regex::new(r"export const \w+ = \{\s*\};").unwrap();
        assert!(shape.is_match(&out));
        assert_eq!(s.count(&out), 0);
    }

    #[test]
    fn remove_absent_is_unchanged() {
        let s = store();
        let content = s.create(&icon("home", "<path/>"));
        assert_eq!(s.remove(&content, "star").unwrap(), content);
    }

    #[test]
    fn similar_names_do_not_collide() {
        let s = store();
        let mut content = s.create(&icon("home-outline", "<path/>"));
        content = s.upsert(&content, &icon("home", "<rect/>")).unwrap().content;
        assert_eq!(s.list_names(&content), vec!["home-outline", "home"]);

        let out = s.remove(&content, "home").unwrap();
        assert_eq!(s.list_names(&out), vec!["home-outline"]);
        assert!(out.contains("'home-outline': homeOutline"));
        assert!(!s.exists(&out, "home"));
        assert!(s.exists(&out, "home-outline"));
    }

    #[test]
    fn nested_braces_in_body_are_balanced() {
        let s = store();
        let body = "<style>.a { fill: red; } .b { stroke: `x`; }</style><path d=\"M0 0\"/>";
        let content = s.create(&icon("styled", body));
        let content = s.upsert(&content, &icon("plain", "<path/>")).unwrap().content;

        let styled = s.records(&content).unwrap().find("styled").cloned().unwrap();
        assert_eq!(styled.body, body);

        let out = s.remove(&content, "styled").unwrap();
        assert_eq!(s.list_names(&out), vec!["plain"]);
        assert!(!out.contains("<style>"));
    }

    #[test]
    fn animation_survives_roundtrip() {
        let s = store();
        let animation = Animation::new("spin", 2.0, "linear", "infinite")
            .with_delay(0.0)
            .with_direction("normal");
        let record = icon("loader", "<circle/>").with_animation(animation);
        let content = s.create(&record);
        assert!(content.contains(
            "  animation: { type: 'spin', duration: 2, timing: 'linear', iteration: 'infinite', delay: 0, direction: 'normal' }\n"
        ));
        let restored = s.records(&content).unwrap();
        assert_eq!(restored.find("loader"), Some(&record));
    }

    #[test]
    fn replace_registers_missing_manifest_entry() {
        let content = "export const home = {\n  name: 'home',\n  body: `<path/>`\n};\n\nexport const icons = {};\n";
        let s = store();
        let result = s.upsert(content, &icon("home", "<rect/>")).unwrap();
        assert_eq!(result.kind, UpsertKind::Replaced);
        assert!(result.content.ends_with("export const icons = {\n  'home': home\n};\n"));
    }

    #[test]
    fn missing_manifest_degrades_or_fails_in_strict_mode() {
        let content = "export const home = {\n  name: 'home',\n  body: `<path/>`\n};\n";
        let lenient = store().upsert(content, &icon("star", "<circle/>")).unwrap();
        assert_eq!(lenient.kind, UpsertKind::AppendedWithoutManifest);
        assert!(lenient.is_degraded());
        assert_eq!(store().list_names(&lenient.content), vec!["home", "star"]);

        let err = store()
            .with_strict(true)
            .upsert(content, &icon("star", "<circle/>"))
            .unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound(name) if name == "icons"));
    }

    #[test]
    fn custom_manifest_name_and_typed_head() {
        let content = "export const registry: Record<string, Icon> = {\n  'a': a\n};\n";
        let s = store().with_manifest_name("registry");
        let out = s.upsert(content, &icon("b", "<path/>")).unwrap();
        assert_eq!(out.kind, UpsertKind::Inserted);
        assert!(out.content.contains("export const registry: Record<string, Icon> = {\n  'a': a,\n  'b': b\n};"));
    }

    #[test]
    fn malformed_content_is_reported() {
        let s = store();
        let broken = "export const home = {\n  name: 'home',\n  body: `<path/>\n};\n";
        assert!(matches!(
            s.upsert(broken, &icon("x", "<path/>")),
            Err(Error::Malformed { .. })
        ));
        assert!(s.remove(broken, "home").is_err());
        assert!(s.list_names(broken).is_empty());
        assert!(!s.exists(broken, "home"));
    }

    #[test]
    fn body_with_backticks_is_escaped() {
        let s = store();
        let body = "<text>`${x}` \\ end</text>";
        let content = s.create(&icon("quoted", body));
        assert_eq!(s.records(&content).unwrap().find("quoted").unwrap().body, body);
    }

    #[test]
    fn rename_is_remove_plus_upsert() {
        let s = store();
        let content = s.create(&icon("home", "<path/>"));
        let content = s.upsert(&content, &icon("star", "<circle/>")).unwrap().content;
        let renamed = s.rename(&content, "home", &icon("house", "<path/>")).unwrap();
        assert_eq!(s.list_names(&renamed.content), vec!["star", "house"]);
        assert!(!renamed.content.contains("'home'"));
    }

    #[test]
    fn reserved_word_names_get_escaped_identifiers() {
        let s = store();
        let content = s.create(&icon("delete", "<path/>"));
        assert!(content.contains("export const _delete = {\n  name: 'delete',"));
        assert!(content.contains("  'delete': _delete\n"));

        let content = s.upsert(&content, &icon("new", "<rect/>")).unwrap().content;
        assert!(content.contains("export const _new = {"));
        assert_eq!(s.list_names(&content), vec!["delete", "new"]);
        assert!(s.exists(&content, "new"));
    }

    #[test]
    fn name_matching_manifest_export_is_disambiguated() {
        let s = store();
        let content = s.create(&icon("icons", "<path/>"));
        assert_eq!(content.matches("export const icons =").count(), 1);
        assert!(content.contains("export const iconsIcon = {"));
        assert!(content.contains("  'icons': iconsIcon\n"));
        assert_eq!(s.list_names(&content), vec!["icons"]);
        assert!(s.exists(&content, "icons"));

        let content = s.upsert(&content, &icon("home", "<rect/>")).unwrap().content;
        let updated = s.upsert(&content, &icon("icons", "<circle/>")).unwrap();
        assert_eq!(updated.kind, UpsertKind::Replaced);
        assert_eq!(updated.content.matches("export const icons =").count(), 1);
        assert_eq!(s.list_names(&updated.content), vec!["icons", "home"]);

        let removed = s.remove(&updated.content, "icons").unwrap();
        assert_eq!(s.list_names(&removed), vec!["home"]);
        assert!(!removed.contains("iconsIcon"));

        let custom = store().with_manifest_name("registry");
        let content = custom.create(&icon("registry", "<path/>"));
        assert!(content.contains("export const registryIcon = {"));
        assert_eq!(custom.list_names(&content), vec!["registry"]);
    }

    #[test]
    fn middle_entry_edits_leave_neighbors_byte_identical() {
        let s = store();
        let mut content = s.create(&icon("a", "<path d=\"M1 1\"/>"));
        content = s.upsert(&content, &icon("b", "<rect/>")).unwrap().content;
        content = s.upsert(&content, &icon("c", "<circle/>")).unwrap().content;
        let doc = s.parse(&content).unwrap();
        let block = |doc: &ModuleDocument, content: &str, id: &str| {
            content[doc.definition(id).unwrap().span.clone()].to_string()
        };
        let a = block(&doc, &content, "a");
        let c = block(&doc, &content, "c");

        let replaced = s.upsert(&content, &icon("b", "<ellipse/>")).unwrap().content;
        let doc = s.parse(&replaced).unwrap();
        assert_eq!(block(&doc, &replaced, "a"), a);
        assert_eq!(block(&doc, &replaced, "c"), c);
        assert!(block(&doc, &replaced, "b").contains("<ellipse/>"));
        assert_eq!(replaced.replace("<ellipse/>", "<rect/>"), content);

        let removed = s.remove(&content, "b").unwrap();
        let doc = s.parse(&removed).unwrap();
        assert_eq!(block(&doc, &removed, "a"), a);
        assert_eq!(block(&doc, &removed, "c"), c);
        assert!(doc.definition("b").is_none());
        assert!(removed.starts_with(&format!("{a}\n\n{c}\n\n")));
    }

    #[test]
    fn non_identifier_manifest_entries_are_kept() {
        let content = "export const home = {\n  name: 'home',\n  body: `<path/>`\n};\n\n\
            export const icons = {\n  'home': home,\n  'alias': 'home'\n};\n";
        let s = store();
        let inserted = s.upsert(content, &icon("star", "<circle/>")).unwrap().content;
        assert!(inserted.contains("  'home': home,\n  'alias': 'home',\n  'star': star\n"));

        let removed = s.remove(&inserted, "home").unwrap();
        assert!(removed.ends_with("export const icons = {\n  'alias': 'home',\n  'star': star\n};\n"));
        assert_eq!(s.list_names(&removed), vec!["star"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Upsert(&'static str),
        Remove(&'static str),
    }

    fn op() -> impl Strategy<Value = Op> {
        let names = prop::sample::select(vec!["home", "home-outline", "star", "arrow-left", "a1"]);
        (names, any::<bool>()).prop_map(|(name, add)| if add { Op::Upsert(name) } else { Op::Remove(name) })
    }

    /// Source text of every definition except `target`, in file order.
    fn untouched_blocks(s: &ModuleStore, content: &str, target: &str) -> Vec<String> {
        if content.is_empty() {
            return Vec::new();
        }
        let doc = s.parse(content).unwrap();
        doc.definitions
            .iter()
            .filter(|d| d.identifier != target)
            .map(|d| content[d.span.clone()].to_string())
            .collect()
    }

    proptest! {
        #[test]
        fn names_stay_unique(ops in prop::collection::vec(op(), 1..20)) {
            let s = store();
            let mut content = String::new();
            for op in ops {
                let target = match &op {
                    Op::Upsert(name) | Op::Remove(name) => to_identifier(name),
                };
                let before = untouched_blocks(&s, &content, &target);
                content = match op {
                    Op::Upsert(name) => s.upsert(&content, &icon(name, "<path/>")).unwrap().content,
                    Op::Remove(_) if content.is_empty() => content,
                    Op::Remove(name) => s.remove(&content, name).unwrap(),
                };
                prop_assert_eq!(untouched_blocks(&s, &content, &target), before);
                let names = s.list_names(&content);
                let mut deduped = names.clone();
                deduped.sort();
                deduped.dedup();
                prop_assert_eq!(deduped.len(), names.len());

                let doc = s.parse(&content).unwrap();
                let manifest = doc.manifest.unwrap();
                let mut registered: Vec<_> = manifest.entries.iter().map(|e| e.name.clone()).collect();
                registered.sort();
                let mut defined = names;
                defined.sort();
                prop_assert_eq!(registered, defined);
            }
        }
    }
}
