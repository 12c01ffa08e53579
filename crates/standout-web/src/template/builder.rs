//! Engine assembly.
//!
//! Some engines cannot be fully configured when components are wired, because
//! part of their configuration only exists after the host has started. An
//! [`EngineBuilder`] postpones assembly until the engine is first needed.
//!
//! [`TemplateMethodBuilder`] is the usual builder: it starts from a supplied
//! base engine (or a fresh default one) and runs a [`Customize`] step on it.
//!
//! # Synchronization
//!
//! Builders are not synchronized; [`EngineBuilder::build`] takes `&mut self`.
//! [`ResponseWriter`](crate::ResponseWriter) serializes access to its builder.
//! Callers using a builder on their own must do the same.

use std::fmt;

use super::engine::{MiniJinjaEngine, TemplateEngine};
use crate::error::WriterError;

/// Assembles a ready-to-use engine.
pub trait EngineBuilder: Send {
    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if part of the configuration is unavailable. Nothing
    /// of a failed build should be considered usable.
    fn build(&mut self) -> Result<Box<dyn TemplateEngine>, WriterError>;
}

/// A customization applied to an engine during building.
///
/// Implementations may register resolvers or otherwise configure the engine.
/// They receive the engine by reference and cannot replace it.
///
/// Closures taking `&mut dyn TemplateEngine` implement this trait:
///
/// ```rust
/// use std::sync::Arc;
/// use standout_web::{
///     EngineBuilder, InlineResolver, TemplateEngine, TemplateMethodBuilder, WriterError,
/// };
///
/// let mut builder = TemplateMethodBuilder::new(
///     |engine: &mut dyn TemplateEngine| -> Result<(), WriterError> {
///         engine.add_resolver(Arc::new(InlineResolver::new()));
///         Ok(())
///     },
/// );
/// let engine = builder.build().unwrap();
/// assert_eq!(engine.resolver_names(), vec!["inline"]);
/// ```
pub trait Customize: Send {
    /// Applies the customization to `engine`.
    fn process(&self, engine: &mut dyn TemplateEngine) -> Result<(), WriterError>;
}

impl<F> Customize for F
where
    F: Fn(&mut dyn TemplateEngine) -> Result<(), WriterError> + Send,
{
    fn process(&self, engine: &mut dyn TemplateEngine) -> Result<(), WriterError> {
        (self)(engine)
    }
}

/// Creates the default engine when no base engine was supplied.
pub type EngineFactory = Box<dyn Fn() -> Box<dyn TemplateEngine> + Send>;

/// Builds an engine from a base engine and one customization step.
///
/// On [`build`](EngineBuilder::build):
///
/// 1. The base engine is taken if one was supplied (all of its resolvers and
///    configuration are kept); otherwise the factory creates a fresh engine
///    ([`MiniJinjaEngine::new`] by default).
/// 2. The customization step runs exactly once on that engine.
/// 3. The engine is returned.
///
/// The base engine moves into the first successfully built engine, so a
/// second `build` after a success starts from a fresh default engine. If the
/// step fails, the base engine is handed back to the builder and the next
/// `build` customizes it again. Steps should fail before touching the engine.
pub struct TemplateMethodBuilder<C> {
    base: Option<Box<dyn TemplateEngine>>,
    factory: EngineFactory,
    step: C,
}

impl<C: Customize> TemplateMethodBuilder<C> {
    /// Creates a builder running `step` on a default engine.
    pub fn new(step: C) -> Self {
        Self {
            base: None,
            factory: Box::new(|| Box::new(MiniJinjaEngine::new()) as Box<dyn TemplateEngine>),
            step,
        }
    }

    /// Supplies the base engine to customize instead of a fresh one.
    pub fn with_engine(mut self, engine: Box<dyn TemplateEngine>) -> Self {
        self.base = Some(engine);
        self
    }

    /// Replaces the factory used when no base engine is supplied.
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn TemplateEngine> + Send + 'static,
    {
        self.factory = Box::new(factory);
        self
    }

    /// Sets or replaces the base engine.
    pub fn set_engine(&mut self, engine: Box<dyn TemplateEngine>) {
        self.base = Some(engine);
    }

    /// Returns true if a base engine is waiting to be customized.
    pub fn has_engine(&self) -> bool {
        self.base.is_some()
    }

    /// The customization step.
    pub fn step(&self) -> &C {
        &self.step
    }
}

impl<C: Customize> EngineBuilder for TemplateMethodBuilder<C> {
    fn build(&mut self) -> Result<Box<dyn TemplateEngine>, WriterError> {
        let reused = self.base.is_some();
        let mut engine = match self.base.take() {
            Some(engine) => engine,
            None => (self.factory)(),
        };
        match self.step.process(engine.as_mut()) {
            Ok(()) => Ok(engine),
            Err(err) => {
                if reused {
                    self.base = Some(engine);
                }
                Err(err)
            }
        }
    }
}

impl<C> fmt::Debug for TemplateMethodBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateMethodBuilder")
            .field(
                "base",
                &self.base.as_ref().map(|engine| engine.resolver_names()),
            )
            .finish_non_exhaustive()
    }
}
