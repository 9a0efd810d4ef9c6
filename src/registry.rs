//! Name to parser factory registry.

use crate::catalog::{Selector, TemplateCatalog, TemplateDefinition};
use crate::compiler::{CompiledTemplate, TemplateCompiler};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

type Factory = Box<dyn Fn() -> Result<CompiledTemplate> + Send + Sync>;

/// Parser factories keyed by template name.
///
/// Every catalog entry becomes a zero-argument factory that compiles a fresh
/// [`CompiledTemplate`]. Entries added to the catalog later are registered with
/// [`register_new`](Self::register_new).
///
/// ```rust
/// use rsytmpl::{ParserRegistry, TemplateCatalog};
///
/// let catalog = TemplateCatalog::builtin()?;
/// let registry = ParserRegistry::from_catalog(&catalog);
/// let docker = registry.create("DockerCLog")?;
/// assert_eq!(docker.name(), "DockerCLog");
/// # Ok::<(), rsytmpl::Error>(())
/// ```
pub struct ParserRegistry {
    compiler: TemplateCompiler,
    factories: BTreeMap<String, Factory>,
}

impl ParserRegistry {
    /// An empty registry compiling with `compiler`.
    pub fn new(compiler: TemplateCompiler) -> Self {
        Self {
            compiler,
            factories: BTreeMap::new(),
        }
    }

    /// Register every template of `catalog` with the built-in fields.
    pub fn from_catalog(catalog: &TemplateCatalog) -> Self {
        Self::with_compiler(catalog, TemplateCompiler::new())
    }

    /// Register every template of `catalog`, compiling with `compiler`.
    pub fn with_compiler(catalog: &TemplateCatalog, compiler: TemplateCompiler) -> Self {
        let mut registry = Self::new(compiler);
        for def in catalog.iter() {
            registry.register(def.clone());
        }
        info!("Registered {} template parsers", registry.len());
        registry
    }

    /// Register one definition, replacing any factory of the same name.
    pub fn register(&mut self, def: TemplateDefinition) {
        debug!("Registering parser factory: {}", def.name);
        let compiler = self.compiler.clone();
        let name = def.name.clone();
        let factory: Factory = Box::new(move || compiler.compile_definition(&def));
        if self.factories.insert(name.clone(), factory).is_some() {
            warn!("Replaced parser factory: {}", name);
        }
    }

    /// Register the names returned by [`TemplateCatalog::extend`].
    pub fn register_new(&mut self, catalog: &TemplateCatalog, names: &[String]) -> Result<()> {
        for name in names {
            self.register(catalog.get(name)?.clone());
        }
        Ok(())
    }

    /// Compile a fresh parser for `name`.
    pub fn create(&self, name: &str) -> Result<CompiledTemplate> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::template_not_found(name))?;
        factory()
    }

    /// Compile a fresh parser for whatever `selector` picks in `catalog`.
    pub fn create_selected(
        &self,
        catalog: &TemplateCatalog,
        selector: &Selector,
    ) -> Result<CompiledTemplate> {
        let def = catalog.select(selector)?;
        self.create(&def.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("compiler", &self.compiler)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
