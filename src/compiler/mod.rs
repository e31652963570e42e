use crate::cache::BuildCache;
use crate::error::{BuildError, Location};
use crate::model::{
    DEFAULT_DOCUMENT_EXIT, Document, EXPLICIT_EXITS_INFO_KEY, ExitKind, LEGACY_EXIT_INFO_KEY,
    Node,
};
use crate::source::RawDocument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

mod parsing;
mod resolver;
mod skeleton;
mod topics;
mod validation;

/// Scope in which node display names must be unique.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameScope {
    /// Names only collide with names on the same board.
    #[default]
    Board,
    /// Names collide across every validated board of the document.
    Document,
}

/// Which exit nodes satisfy the explicit-exit check.
///
/// Every intro board needs a reachable exit of any kind. `Kind` adds a
/// document-wide requirement for at least one exit of that kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitRequirement {
    #[default]
    Any,
    Kind(ExitKind),
}

impl ExitRequirement {
    pub fn is_satisfied_by(&self, node: &Node) -> bool {
        match self {
            ExitRequirement::Any => node.is_exit(),
            ExitRequirement::Kind(kind) => node.exit_kind() == Some(*kind),
        }
    }
}

impl fmt::Display for ExitRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitRequirement::Any => write!(f, "any"),
            ExitRequirement::Kind(kind) => write!(f, "'{}'", kind),
        }
    }
}

/// Settings of a single build, assembled by [`CompilerBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    pub name_scope: NameScope,
    pub exit_requirement: ExitRequirement,
    /// Only read the document header; boards are not built or validated.
    pub shallow: bool,
    /// Stands in for an empty `conversationID`.
    pub module_id: Option<String>,
    /// Flexible subtype that marks the module as complete. When set, the document
    /// needs at least one connected node of this subtype.
    pub completion_subtype: Option<String>,
}

pub struct CompilerBuilder {
    raw: RawDocument,
    file_path: Option<String>,
    options: BuildOptions,
}

impl CompilerBuilder {
    pub fn new(raw: RawDocument) -> Self {
        Self {
            raw,
            file_path: None,
            options: BuildOptions::default(),
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_name_scope(mut self, scope: NameScope) -> Self {
        self.options.name_scope = scope;
        self
    }

    pub fn with_exit_requirement(mut self, requirement: ExitRequirement) -> Self {
        self.options.exit_requirement = requirement;
        self
    }

    pub fn with_module_id(mut self, module_id: impl Into<String>) -> Self {
        self.options.module_id = Some(module_id.into());
        self
    }

    pub fn with_completion_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.options.completion_subtype = Some(subtype.into());
        self
    }

    pub fn shallow(mut self, shallow: bool) -> Self {
        self.options.shallow = shallow;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            raw: self.raw,
            file_path: self.file_path,
            options: self.options,
        }
    }
}

/// Builds a validated [`Document`] from a parsed EmPath file.
///
/// The build runs skeleton, resolve, sort and validate in that order and either
/// returns a fully resolved document or the first error. `compile` consumes the
/// compiler, so a failed build leaves nothing behind.
pub struct Compiler {
    raw: RawDocument,
    file_path: Option<String>,
    options: BuildOptions,
}

impl Compiler {
    pub fn builder(raw: RawDocument) -> CompilerBuilder {
        CompilerBuilder::new(raw)
    }

    pub fn from_json_str(json: &str) -> Result<CompilerBuilder, BuildError> {
        Ok(CompilerBuilder::new(RawDocument::from_json_str(json, None)?))
    }

    /// Reads `path` and registers it with the build cache.
    ///
    /// Callers that want to skip files already compiled should ask
    /// [`BuildCache::has_seen`] before calling this.
    pub fn from_file(
        path: &Path,
        cache: &mut dyn BuildCache,
    ) -> Result<CompilerBuilder, BuildError> {
        let raw = RawDocument::from_file(path)?;
        cache.register(path);
        Ok(CompilerBuilder::new(raw).with_file_path(path.display().to_string()))
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn compile(self) -> Result<Document, BuildError> {
        tracing::debug!("Setup new document");
        let mut doc = self.read_header()?;
        if self.options.shallow {
            tracing::debug!("Shallow build, skipping boards of '{}'", doc.name);
            return Ok(doc);
        }

        tracing::debug!("Initialize document boards, elements, connections");
        skeleton::build(&self.raw, &mut doc)?;

        tracing::debug!("Set up connections and node data");
        resolver::resolve(&self.raw, &mut doc)?;

        doc.boards.sort_by_key(|board| board.order);

        validation::validate(&mut doc, &self.options)?;

        tracing::info!(
            "Built document '{}': {} boards ({} excluded), {} nodes, {} connections",
            doc.name,
            doc.boards.len(),
            doc.excluded_boards.len(),
            doc.nodes.len(),
            doc.connections.len()
        );
        Ok(doc)
    }

    /// Reads the document-level fields and resolves the legacy exit settings.
    fn read_header(&self) -> Result<Document, BuildError> {
        let raw = &self.raw;
        let location = Location::in_file(self.file_path.as_deref());
        let missing = |field: &str| BuildError::MissingRequiredField {
            field: field.to_string(),
            location: location.clone().with_field(field),
        };

        let name = raw.name.clone().ok_or_else(|| missing("name"))?;
        let version = raw.version.ok_or_else(|| missing("version"))?;
        let mut conversation_id = raw
            .conversation_id
            .clone()
            .ok_or_else(|| missing("conversationID"))?;
        if conversation_id.is_empty() {
            conversation_id = self
                .options
                .module_id
                .clone()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| missing("conversationID"))?;
        }

        let mut legacy_exit_code = String::new();
        let mut uses_explicit_exits = false;
        for (key, value) in raw.doc_info.iter() {
            if key == LEGACY_EXIT_INFO_KEY {
                legacy_exit_code = value.to_string();
            } else if key == EXPLICIT_EXITS_INFO_KEY {
                uses_explicit_exits = value == "Yes";
            }
        }
        // Documents without their own `onExit` hand control back to the shared exit
        // controller of the chat runtime (`^exit_controller()`). An empty code is
        // reserved for documents with explicit exits.
        if uses_explicit_exits {
            legacy_exit_code.clear();
        } else if legacy_exit_code.is_empty() {
            legacy_exit_code = DEFAULT_DOCUMENT_EXIT.to_string();
        }

        Ok(Document {
            name,
            version,
            conversation_id,
            module_id: self.options.module_id.clone(),
            indices: raw.indices.clone().unwrap_or_default(),
            status: raw.document_status.unwrap_or_default(),
            info: raw.doc_info.clone(),
            legacy_exit_code,
            uses_explicit_exits,
            file_path: self.file_path.clone(),
            ..Document::default()
        })
    }
}
