#![forbid(unsafe_code)]
//! Propagation core for aggregating generated code across a schema
//! dependency graph.
//!
//! Given a graph of source-definition nodes, `genlink` decides per node
//! whether derived code must be generated, issues the generator and compiler
//! invocations exactly once per node through external collaborator traits,
//! and merges the results bottom-up so that every consumer of a node receives
//! a single [`CompilationView`]: everything needed to compile against that
//! node and its whole dependency closure, with each artifact appearing
//! exactly once even when the DAG reaches it through several paths.
//!
//! The building blocks:
//!
//! * [`Node`], the immutable description of one graph node.
//! * [`should_generate`] and [`ExclusionSet`], the policy deciding whether a
//!   node's sources need generation at all.
//! * [`Generator`] and [`Compiler`], the external invocation services.
//! * [`ExtensionHook`], the pluggable contract through which protocol
//!   variants alter invocations without touching the propagation algorithm.
//! * [`AspectDriver`], the per-node orchestration.
//! * [`Schedule`], a thin dependency-ordered evaluation harness.
//!
//! ```
//! use genlink::*;
//!
//! struct Gen;
//!
//! impl Generator for Gen {
//!     fn generate(&self, invocation: &GenerateInvocation) -> Result<Artifact, GenerateError> {
//!         Ok(invocation.output.clone())
//!     }
//! }
//!
//! struct Com;
//!
//! impl Compiler for Com {
//!     fn compile(&self, invocation: &CompileInvocation) -> Result<CompileOutput, CompileError> {
//!         let mut exported = CompileArgs::default();
//!         exported.exported.insert(invocation.output.clone());
//!         Ok(CompileOutput { artifact: invocation.output.clone(), exported })
//!     }
//! }
//!
//! let config = DriverConfig {
//!     exclusions: ExclusionSet::new(),
//!     runtime: Artifact::new("runtime", "librt.unit"),
//!     options: "--gen_out={out}".to_string(),
//! };
//! let driver = AspectDriver::new(config, &Plain, &Gen, &Com);
//!
//! let mut schedule = Schedule::new();
//! schedule.add(Node::new("base").source("base.schema")).unwrap();
//! schedule.add(Node::new("api").dep("base").source("api.schema")).unwrap();
//!
//! let evaluation = schedule.evaluate(&driver).unwrap();
//! let api = evaluation.view("api").unwrap();
//! assert_eq!(api.artifacts.len(), 2);
//! ```

mod artifact;
mod core;
mod driver;
mod error;
mod extension;
mod invoke;
mod node;
mod policy;
mod runner;
mod view;

pub use crate::artifact::{Artifact, ArtifactSet};
pub use crate::core::{Hash32, NodeId};
pub use crate::driver::{AspectDriver, DriverConfig, RESERVED_ATTR_PREFIX};
pub use crate::error::{AspectError, CompileError, GenerateError, PolicyError, ScheduleError};
pub use crate::extension::{ExtensionHook, Plain, STUB_FLAVOR_ATTR, ServiceStub};
pub use crate::invoke::{
    CompileInvocation, CompileOutput, Compiler, GenerateInvocation, Generator, Strictness,
};
pub use crate::node::Node;
pub use crate::policy::{ExclusionSet, should_generate};
pub use crate::runner::{Evaluation, Schedule};
pub use crate::view::{CompilationView, CompileArgs, CompiledUnit, aggregate};
