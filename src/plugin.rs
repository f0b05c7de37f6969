// Scheme registration — hooks the engine into the host player's networking.

use std::sync::Arc;

use crate::engine::fetch::{FetchEngine, FetchOperation};
use crate::types::FetchRequest;

/// Priority declared when registering a handler; the host dispatches to the
/// highest-priority handler registered for a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginPriority {
    Fallback,
    Preferred,
    Application,
}

/// A registered handler: starts one cancellable fetch per matching request.
pub trait SchemeHandler: Send + Sync {
    fn start(&self, request: FetchRequest) -> FetchOperation;
}

/// Host-side registration surface.
pub trait SchemeRegistry {
    fn register_scheme(
        &mut self,
        scheme: &str,
        priority: PluginPriority,
        handler: Arc<dyn SchemeHandler>,
    );
}

impl SchemeHandler for FetchEngine {
    fn start(&self, request: FetchRequest) -> FetchOperation {
        self.fetch(request)
    }
}

/// Register the engine for the conventional schemes at preferred priority, so
/// matching requests bypass the host's default handler.
pub fn register(registry: &mut dyn SchemeRegistry, engine: Arc<FetchEngine>) {
    registry.register_scheme("http", PluginPriority::Preferred, engine.clone());
    registry.register_scheme("https", PluginPriority::Preferred, engine);
}
