use std::{fmt, num::NonZeroUsize, sync::Arc};

use tracing::{debug, error, info, instrument};

use crate::{
    ast::Template,
    config::EngineConfig,
    eval::{Context, Evaluator},
    host::{MethodRegistry, MethodResolver},
    parser, EngineError, EngineResult,
};

/// Parses and renders templates against a shared method registry.
///
/// The resolution cache lives as long as the engine, so repeated renders of
/// similar call sites skip overload selection.
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    evaluator: Evaluator,
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let capacity = config.cache_capacity().unwrap_or(NonZeroUsize::MIN);
        Self::build(config, Arc::new(MethodRegistry::with_builtins()), capacity)
    }
}

impl Engine {
    pub fn new(config: EngineConfig, registry: Arc<MethodRegistry>) -> EngineResult<Self> {
        let capacity = config.cache_capacity()?;
        Ok(Self::build(config, registry, capacity))
    }

    fn build(config: EngineConfig, registry: Arc<MethodRegistry>, capacity: NonZeroUsize) -> Self {
        info!(
            methods = registry.len(),
            cache_capacity = capacity.get(),
            strict_references = config.strict_references,
            "initialising template engine"
        );
        let evaluator = Evaluator::new(MethodResolver::new(registry, capacity))
            .with_strict_references(config.strict_references);
        Self { config, evaluator }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &MethodRegistry {
        self.evaluator.resolver().registry()
    }

    /// Number of memoised method resolutions.
    pub fn cached_resolutions(&self) -> usize {
        self.evaluator.resolver().cached_resolutions()
    }

    #[instrument(level = "debug", skip(self, source))]
    pub fn parse(&self, label: &str, source: &str) -> EngineResult<Template> {
        parser::parse_template(label, source).map_err(|source| EngineError::Parse {
            label: label.to_string(),
            source,
        })
    }

    pub fn render(
        &self,
        template: &Template,
        context: &mut dyn Context,
        out: &mut dyn fmt::Write,
    ) -> EngineResult<()> {
        self.evaluator
            .render(template, context, out)
            .map_err(|source| EngineError::Eval {
                label: template.label.clone(),
                source,
            })
    }

    /// Parses and renders in one step, keeping parse and evaluation failures distinct.
    pub fn try_evaluate(
        &self,
        context: &mut dyn Context,
        out: &mut dyn fmt::Write,
        label: &str,
        source: &str,
    ) -> EngineResult<()> {
        let template = self.parse(label, source)?;
        debug!(label, nodes = template.nodes.len(), "rendering");
        self.render(&template, context, out)
    }

    /// Like [`Engine::try_evaluate`] but reports only success. The failure is logged.
    /// Output written before a failure is left in `out`.
    pub fn evaluate(
        &self,
        context: &mut dyn Context,
        out: &mut dyn fmt::Write,
        label: &str,
        source: &str,
    ) -> bool {
        match self.try_evaluate(context, out, label, source) {
            Ok(()) => true,
            Err(e) => {
                error!(label, error = %e, "template evaluation failed");
                false
            }
        }
    }
}
