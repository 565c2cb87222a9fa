//! The pluggable contract for protocol/runtime variants.
//!
//! All variance between downstream flavors, e.g. plain data-structure
//! generation versus additional service-stub generation, is injected through
//! [`ExtensionHook`]. The propagation algorithm itself never special-cases a
//! variant; exactly one hook is active per build invocation.

use crate::artifact::Artifact;
use crate::error::PolicyError;
use crate::invoke::{CompileInvocation, GenerateInvocation};
use crate::node::Node;

/// Capability set a variant may implement. Every method has a neutral
/// default, so a variant only overrides what it actually changes.
pub trait ExtensionHook: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the aspect applies to this node at all. Returning false vetoes
    /// the node: it publishes an empty view and its dependents proceed
    /// normally.
    fn applies_to(&self, _node: &Node) -> bool {
        true
    }

    /// Adjusts the generator invocation before dispatch, e.g. to add plugin
    /// flags or rename the derived output.
    fn mutate_generation(
        &self,
        _node: &Node,
        _invocation: &mut GenerateInvocation,
    ) -> Result<(), PolicyError> {
        Ok(())
    }

    /// Adjusts the compile invocation before dispatch.
    fn mutate_compile(
        &self,
        _node: &Node,
        _invocation: &mut CompileInvocation,
    ) -> Result<(), PolicyError> {
        Ok(())
    }

    /// Extra declared inputs attached to every generated compilation, on top
    /// of the fixed runtime support unit.
    fn implicit_deps(&self) -> Vec<Artifact> {
        Vec::new()
    }
}

/// Plain data-structure generation. Applies to every node and changes
/// nothing.
#[derive(Debug, Default)]
pub struct Plain;

impl ExtensionHook for Plain {
    fn name(&self) -> &'static str {
        "plain"
    }
}

/// Attribute consumed by [`ServiceStub`] to recognize its nodes.
pub const STUB_FLAVOR_ATTR: &str = "stub_flavor";

/// Layers service-stub generation on top of plain generation: adds a stub
/// plugin flag to the generator call and a stub runtime to the compile
/// inputs. Nodes not tagged with the matching flavor are vetoed.
#[derive(Debug)]
pub struct ServiceStub {
    /// The flavor value a node's `stub_flavor` attribute must carry.
    pub flavor: Box<str>,
    /// Pre-built runtime the generated stubs link against.
    pub runtime: Artifact,
    /// Plugin flag passed to the generator.
    pub plugin: String,
}

impl ExtensionHook for ServiceStub {
    fn name(&self) -> &'static str {
        "service-stub"
    }

    fn applies_to(&self, node: &Node) -> bool {
        node.get_attr(STUB_FLAVOR_ATTR) == Some(self.flavor.as_ref())
    }

    fn mutate_generation(
        &self,
        _node: &Node,
        invocation: &mut GenerateInvocation,
    ) -> Result<(), PolicyError> {
        invocation.plugins.push(self.plugin.clone());
        Ok(())
    }

    fn implicit_deps(&self) -> Vec<Artifact> {
        vec![self.runtime.clone()]
    }
}
