//! Per-node orchestration of the propagation algorithm.
//!
//! For every node, in dependency order: check the extension veto, run the
//! exclusion policy, generate and compile the node's own unit if required,
//! then aggregate it with the direct dependencies' already-published views.

use std::sync::Arc;

use crate::artifact::Artifact;
use crate::core::Hash32;
use crate::error::{AspectError, PolicyError};
use crate::extension::ExtensionHook;
use crate::invoke::{CompileInvocation, Compiler, GenerateInvocation, Generator, Strictness};
use crate::node::Node;
use crate::policy::{ExclusionSet, should_generate};
use crate::view::{CompilationView, CompileArgs, CompiledUnit, aggregate};

/// Attribute keys with this prefix are reserved for the aspect machinery;
/// nodes declaring them are rejected as misconfigured.
pub const RESERVED_ATTR_PREFIX: &str = "aspect.";

/// Placeholder in the option template replaced with the derived source path.
const OUT_PLACEHOLDER: &str = "{out}";

/// Build-wide configuration threaded explicitly through the driver, so the
/// same logic runs under arbitrary injected configurations in tests.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Sources the runtime support library already covers.
    pub exclusions: ExclusionSet,
    /// The pre-built unit always added as an implicit dependency of
    /// generated code.
    pub runtime: Artifact,
    /// Language-specific generator option template; `{out}` is replaced with
    /// the derived source location.
    pub options: String,
}

/// Runs the propagation algorithm for one node at a time. Synchronous and
/// stateless across nodes; any concurrency is the caller's business.
pub struct AspectDriver<'a> {
    config: DriverConfig,
    extension: &'a dyn ExtensionHook,
    generator: &'a dyn Generator,
    compiler: &'a dyn Compiler,
}

impl<'a> AspectDriver<'a> {
    pub fn new(
        config: DriverConfig,
        extension: &'a dyn ExtensionHook,
        generator: &'a dyn Generator,
        compiler: &'a dyn Compiler,
    ) -> Self {
        Self {
            config,
            extension,
            generator,
            compiler,
        }
    }

    /// Processes one node given the published views of its direct
    /// dependencies, in the node's declared dependency order.
    pub fn process(
        &self,
        node: &Node,
        deps: &[Arc<CompilationView>],
    ) -> Result<CompilationView, AspectError> {
        if !self.extension.applies_to(node) {
            tracing::debug!(node = %node.id(), extension = self.extension.name(), "vetoed");
            return Ok(CompilationView::empty());
        }

        self.check_attrs(node)?;

        if deps.len() < node.deps().len() {
            return Err(AspectError::MissingView {
                node: node.id().clone(),
                dep: node.deps()[deps.len()].clone(),
            });
        }

        let own = if should_generate(node, &self.config.exclusions) {
            let mut direct = CompileArgs::default();
            for view in deps {
                direct.merge(&view.args);
            }
            Some(self.generate(node, direct)?)
        } else {
            tracing::debug!(node = %node.id(), "no generation, forwarding dependency views");
            None
        };

        Ok(aggregate(own.as_ref(), deps))
    }

    /// Issues the generator invocation and then the compile invocation for a
    /// node that requires generation. Collaborator failures propagate
    /// verbatim, tagged with the node's identity.
    fn generate(&self, node: &Node, direct: CompileArgs) -> Result<CompiledUnit, AspectError> {
        let policy = |source| AspectError::Policy {
            node: node.id().clone(),
            source,
        };

        let derived = derived_source_name(node);
        let mut invocation = GenerateInvocation {
            node: node.id().clone(),
            sources: node.sources().to_vec(),
            options: self
                .config
                .options
                .replace(OUT_PLACEHOLDER, derived.path.as_str()),
            plugins: Vec::new(),
            output: derived,
        };
        self.extension
            .mutate_generation(node, &mut invocation)
            .map_err(policy)?;

        let fingerprint = fingerprint(&invocation);

        let source = self
            .generator
            .generate(&invocation)
            .map_err(|source| AspectError::Generate {
                node: node.id().clone(),
                source,
            })?;

        let mut extra_deps = vec![self.config.runtime.clone()];
        extra_deps.extend(self.extension.implicit_deps());

        let mut invocation = CompileInvocation {
            node: node.id().clone(),
            source: source.clone(),
            output: compiled_unit_name(node),
            classpath: direct,
            extra_deps,
            // Generated imports mirror the schema graph, not the build
            // graph; strict visibility here would only produce noise.
            strictness: Strictness::Off,
        };
        self.extension
            .mutate_compile(node, &mut invocation)
            .map_err(policy)?;

        let compiled = self
            .compiler
            .compile(&invocation)
            .map_err(|source| AspectError::Compile {
                node: node.id().clone(),
                source,
            })?;

        tracing::debug!(node = %node.id(), output = %compiled.artifact, "generated");

        Ok(CompiledUnit {
            source,
            output: compiled.artifact,
            exported: compiled.exported,
            fingerprint,
        })
    }

    fn check_attrs(&self, node: &Node) -> Result<(), AspectError> {
        for (key, _) in node.attrs() {
            if key.starts_with(RESERVED_ATTR_PREFIX) {
                return Err(AspectError::Policy {
                    node: node.id().clone(),
                    source: PolicyError::ReservedAttribute(key.into(), RESERVED_ATTR_PREFIX),
                });
            }
        }
        Ok(())
    }
}

fn derived_source_name(node: &Node) -> Artifact {
    Artifact::new(node.id().clone(), format!("{}-gen.src", node.id()))
}

fn compiled_unit_name(node: &Node) -> Artifact {
    Artifact::new(node.id().clone(), format!("lib{}-gen.unit", node.id()))
}

/// Fingerprints everything that feeds the generator invocation, so that the
/// external action layer can detect staleness without touching file contents.
fn fingerprint(invocation: &GenerateInvocation) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(invocation.node.as_bytes());
    hasher.update(&[0]);
    for source in &invocation.sources {
        hasher.update(source.as_str().as_bytes());
        hasher.update(&[0]);
    }
    hasher.update(invocation.options.as_bytes());
    hasher.update(&[0]);
    for plugin in &invocation.plugins {
        hasher.update(plugin.as_bytes());
        hasher.update(&[0]);
    }
    let bytes: [u8; 32] = hasher.finalize().into();
    Hash32::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::Plain;
    use crate::invoke::CompileOutput;
    use crate::error::{CompileError, GenerateError};

    struct EchoGenerator;

    impl Generator for EchoGenerator {
        fn generate(&self, invocation: &GenerateInvocation) -> Result<Artifact, GenerateError> {
            Ok(invocation.output.clone())
        }
    }

    struct EchoCompiler;

    impl Compiler for EchoCompiler {
        fn compile(&self, invocation: &CompileInvocation) -> Result<CompileOutput, CompileError> {
            Ok(CompileOutput {
                artifact: invocation.output.clone(),
                exported: CompileArgs {
                    exported: [invocation.output.clone()].into_iter().collect(),
                    internal: Default::default(),
                },
            })
        }
    }

    fn config() -> DriverConfig {
        DriverConfig {
            exclusions: ExclusionSet::new(),
            runtime: Artifact::new("runtime", "librt.unit"),
            options: "--gen_out={out}".into(),
        }
    }

    #[test]
    fn test_reserved_attribute_is_a_policy_error() {
        let driver = AspectDriver::new(config(), &Plain, &EchoGenerator, &EchoCompiler);
        let node = Node::new("a").source("a.schema").attr("aspect.internal", "1");

        let err = driver.process(&node, &[]).unwrap_err();
        assert!(matches!(err, AspectError::Policy { .. }));
    }

    #[test]
    fn test_missing_dependency_view_is_reported() {
        let driver = AspectDriver::new(config(), &Plain, &EchoGenerator, &EchoCompiler);
        let node = Node::new("b").dep("a").source("b.schema");

        let err = driver.process(&node, &[]).unwrap_err();
        match err {
            AspectError::MissingView { node, dep } => {
                assert_eq!(node.as_ref(), "b");
                assert_eq!(dep.as_ref(), "a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_options_template_is_formatted() {
        struct CheckOptions;

        impl Generator for CheckOptions {
            fn generate(
                &self,
                invocation: &GenerateInvocation,
            ) -> Result<Artifact, GenerateError> {
                assert_eq!(invocation.options, "--gen_out=a-gen.src");
                Ok(invocation.output.clone())
            }
        }

        let driver = AspectDriver::new(config(), &Plain, &CheckOptions, &EchoCompiler);
        let node = Node::new("a").source("a.schema");
        driver.process(&node, &[]).unwrap();
    }

    #[test]
    fn test_fingerprint_tracks_generation_inputs() {
        let invocation = GenerateInvocation {
            node: "a".into(),
            sources: vec!["a.schema".into()],
            options: "--gen_out=a-gen.src".into(),
            plugins: vec![],
            output: Artifact::new("a", "a-gen.src"),
        };

        let base = fingerprint(&invocation);
        assert_eq!(base, fingerprint(&invocation.clone()));

        let mut with_plugin = invocation.clone();
        with_plugin.plugins.push("--plugin=stub".into());
        assert_ne!(base, fingerprint(&with_plugin));

        let mut more_sources = invocation;
        more_sources.sources.push("b.schema".into());
        assert_ne!(base, fingerprint(&more_sources));
    }
}
