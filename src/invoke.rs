//! Contracts of the two external invocation services.
//!
//! Running the generator and the compiler is the job of an external action
//! layer; this crate only assembles the invocations and hands them over.
//! Both traits are object-safe so a build can select implementations at
//! configuration time.

use camino::Utf8PathBuf;

use crate::artifact::Artifact;
use crate::core::NodeId;
use crate::error::{CompileError, GenerateError};
use crate::view::CompileArgs;

/// Dependency-visibility checking applied by the compiler service.
///
/// The driver always dispatches [`Strictness::Off`]: it only ever compiles
/// generated code. `Warn` and `Error` complete the collaborator contract for
/// compiler services shared with handwritten-code pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// No visibility checking. Used for generated code, whose import
    /// structure mirrors the schema graph rather than the build graph, so
    /// strict checking would fail on transitively visible symbols without
    /// any real layering violation.
    Off,
    Warn,
    Error,
}

/// One request to the external generator collaborator: derive one source
/// unit from a node's own source files.
#[derive(Debug, Clone)]
pub struct GenerateInvocation {
    pub node: NodeId,
    /// The node's own source files.
    pub sources: Vec<Utf8PathBuf>,
    /// Language-specific option string, already formatted with the output
    /// location.
    pub options: String,
    /// Extra generator plugin flags contributed by the extension hook.
    pub plugins: Vec<String>,
    /// The derived source unit to produce.
    pub output: Artifact,
}

/// One request to the external compiler collaborator: compile one derived
/// source unit into one compiled unit.
#[derive(Debug, Clone)]
pub struct CompileInvocation {
    pub node: NodeId,
    /// The derived source unit to compile.
    pub source: Artifact,
    /// The compiled unit to produce.
    pub output: Artifact,
    /// Merged compile arguments of the node's *direct* dependencies only.
    /// Transitive closure is the aggregator's job, not the compiler's.
    pub classpath: CompileArgs,
    /// Implicit inputs: the runtime support unit plus anything the extension
    /// hook attaches.
    pub extra_deps: Vec<Artifact>,
    pub strictness: Strictness,
}

/// What the compiler service hands back: the compiled unit together with the
/// arguments consumers need to compile against it.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub artifact: Artifact,
    pub exported: CompileArgs,
}

/// External generator invocation service.
pub trait Generator: Send + Sync {
    fn generate(&self, invocation: &GenerateInvocation) -> Result<Artifact, GenerateError>;
}

/// External compiler invocation service.
pub trait Compiler: Send + Sync {
    fn compile(&self, invocation: &CompileInvocation) -> Result<CompileOutput, CompileError>;
}
