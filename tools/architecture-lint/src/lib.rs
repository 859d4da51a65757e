//! Layer boundary lint for the cinerate backend.
//!
//! The backend keeps use cases in `domain`, transports in `inbound` and
//! storage in `outbound`. The chat bot under `inbound/bot` is a layer of its
//! own: it turns chat lines into use-case calls and must not know which
//! transport carries them. This crate parses every file under `backend/src`
//! with `syn`, resolves `crate::`, `self::` and `super::` paths against the
//! file's module path, and reports:
//!
//! - `domain` paths into `inbound`/`outbound` or into web, ORM, pool or
//!   OpenAPI crates
//! - `inbound/bot` paths into the HTTP or WebSocket adapters, into
//!   `outbound`, or into any of those crates
//! - other `inbound` paths into `outbound` or into the ORM and pool crates
//! - `outbound` paths into `inbound` or into the web framework
//!
//! Test code (`#[cfg(test)]` items and `*_tests.rs`/`test_*.rs` files) may
//! wire concrete adapters and is skipped.
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Library name of the linted crate, as used in absolute paths.
const CRATE_NAME: &str = "cinerate";

const LAYER_ROOTS: [&str; 3] = ["domain", "inbound", "outbound"];

const WEB_CRATES: &[&str] = &[
    "actix",
    "actix_service",
    "actix_session",
    "actix_web",
    "actix_ws",
    "awc",
];
const STORAGE_CRATES: &[&str] = &[
    "bb8",
    "bb8_redis",
    "diesel",
    "diesel_async",
    "diesel_migrations",
    "redis",
];
const OPENAPI_CRATES: &[&str] = &["utoipa", "utoipa_swagger_ui"];

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// Filesystem traversal or reading failed.
    Io(io::Error),
    /// A file could not be parsed or placed in a layer.
    Parse { file: PathBuf, message: String },
    /// One or more boundary violations were found.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error while linting architecture: {err}"),
            Self::Parse { file, message } => {
                write!(f, "cannot lint {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} architecture boundary violation(s):", violations.len())?;
                for violation in violations {
                    writeln!(f, "- {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Lint the backend crate sources on disk.
///
/// `backend_dir` must be the `backend/` directory at the repository root.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src_dir = backend_dir.join("src");
    let mut sources = Vec::new();
    for root in LAYER_ROOTS {
        let dir = src_dir.join(root);
        if dir.exists() {
            collect_sources_under(&src_dir, &dir, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();

    for source in sources.iter().filter(|s| !is_test_only_file(&s.file)) {
        let layer = Layer::of(&source.file).ok_or_else(|| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message: "file is outside the domain, inbound and outbound layers".to_owned(),
        })?;
        let parsed =
            syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: err.to_string(),
            })?;
        violations.extend(check_file(&source.file, layer, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Bot,
    Inbound,
    Outbound,
}

impl Layer {
    fn of(relative_path: &Path) -> Option<Self> {
        let module = module_path_of(relative_path);
        match module.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["domain", ..] => Some(Self::Domain),
            ["inbound", "bot", ..] => Some(Self::Bot),
            ["inbound", ..] => Some(Self::Inbound),
            ["outbound", ..] => Some(Self::Outbound),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Bot => "bot",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    /// Module prefixes, relative to the crate root, this layer must not use.
    fn forbidden_modules(self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Domain => &[&["inbound"], &["outbound"]],
            Self::Bot => &[&["inbound", "http"], &["inbound", "ws"], &["outbound"]],
            Self::Inbound => &[&["outbound"]],
            Self::Outbound => &[&["inbound"]],
        }
    }

    fn forbidden_crates(self) -> BTreeSet<&'static str> {
        let groups: &[&[&'static str]] = match self {
            Self::Domain | Self::Bot => &[WEB_CRATES, STORAGE_CRATES, OPENAPI_CRATES],
            Self::Inbound => &[STORAGE_CRATES],
            Self::Outbound => &[WEB_CRATES],
        };
        groups.iter().flat_map(|group| group.iter().copied()).collect()
    }
}

/// Module path of a file: `inbound/bot/mod.rs` is `inbound::bot`.
fn module_path_of(relative_path: &Path) -> Vec<String> {
    let mut module: Vec<String> = relative_path
        .with_extension("")
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if module.last().is_some_and(|last| last == "mod") {
        module.pop();
    }
    module
}

/// Where a path points once relative prefixes are resolved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Target {
    Internal(Vec<String>),
    External(String),
}

fn resolve(segments: &[String], module: &[String]) -> Option<Target> {
    let first = segments.first()?.as_str();
    match first {
        "crate" | CRATE_NAME => Some(Target::Internal(segments.iter().skip(1).cloned().collect())),
        "self" | "super" => {
            let mut base = module.to_vec();
            let mut rest = segments;
            while let Some((head, tail)) = rest.split_first() {
                match head.as_str() {
                    "self" => {}
                    "super" => {
                        base.pop()?;
                    }
                    _ => break,
                }
                rest = tail;
            }
            base.extend(rest.iter().cloned());
            Some(Target::Internal(base))
        }
        root if LAYER_ROOTS.contains(&root) => Some(Target::Internal(segments.to_vec())),
        root => Some(Target::External(root.to_owned())),
    }
}

fn check_file(file: &Path, layer: Layer, parsed: &syn::File) -> Vec<Violation> {
    let mut collector = PathCollector::new(module_path_of(file));
    collector.visit_file(parsed);

    let forbidden_crates = layer.forbidden_crates();
    let mut messages = BTreeSet::new();
    for target in &collector.targets {
        match target {
            Target::Internal(path) => {
                if let Some(prefix) = layer
                    .forbidden_modules()
                    .iter()
                    .find(|prefix| has_prefix(path, prefix))
                {
                    messages.insert(format!(
                        "{} module must not depend on crate::{}",
                        layer.name(),
                        prefix.join("::")
                    ));
                }
            }
            Target::External(root) => {
                if forbidden_crates.contains(root.as_str()) {
                    messages.insert(format!(
                        "{} module must not depend on external crate `{root}`",
                        layer.name()
                    ));
                }
            }
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

fn has_prefix(path: &[String], prefix: &[&str]) -> bool {
    path.len() >= prefix.len() && path.iter().zip(prefix).all(|(seg, want)| seg == want)
}

/// Gathers every path a file names, resolved against the enclosing module.
struct PathCollector {
    module: Vec<String>,
    targets: BTreeSet<Target>,
}

impl PathCollector {
    fn new(module: Vec<String>) -> Self {
        Self {
            module,
            targets: BTreeSet::new(),
        }
    }

    fn record(&mut self, segments: &[String]) {
        if let Some(target) = resolve(segments, &self.module) {
            self.targets.insert(target);
        }
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                prefix.push(ident.to_string());
                self.record(prefix);
                prefix.pop();
            }
            syn::UseTree::Glob(_) => self.record(prefix),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix);
                }
            }
        }
    }
}

/// True for `#[cfg(test)]`.
fn is_cfg_test(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        self.record(&segments);
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        if !is_cfg_test(&node.attrs) {
            self.record_use_tree(&node.tree, &mut Vec::new());
        }
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if is_cfg_test(&node.attrs) {
            return;
        }
        self.module.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.module.pop();
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        if !is_cfg_test(&node.attrs) {
            syn::visit::visit_item_fn(self, node);
        }
    }
}

/// Files pulled in only by `#[cfg(test)]` modules.
fn is_test_only_file(relative_path: &Path) -> bool {
    relative_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with("tests") || stem.starts_with("test_"))
}

fn collect_sources_under(
    src_root: &Path,
    current: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources_under(src_root, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let relative = path
                .strip_prefix(src_root)
                .map_err(|err| ArchitectureLintError::Parse {
                    file: path.clone(),
                    message: err.to_string(),
                })?
                .to_path_buf();
            let contents = fs::read_to_string(&path)?;
            sources.push(LintSource {
                file: relative,
                contents,
            });
        }
    }
    Ok(())
}
