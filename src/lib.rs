use swc_core::{
    common::errors::HANDLER,
    ecma::{ast::Program, visit::VisitMutWith},
    plugin::{
        metadata::TransformPluginMetadataContextKind, plugin_transform,
        proxies::TransformPluginProgramMetadata,
    },
};

pub mod classify;
mod collect;
mod config;
pub mod context;
mod error;
mod markup;
pub mod rules;
mod transform;

pub use collect::ImportSources;
pub use config::PluginConfig;
pub use context::Context;
pub use error::{Arity, Error, Result};
pub use transform::{ConditionalTransform, SiteError};

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

/// Resolves every construct in `program` for the configured build.
///
/// Unresolvable sites are reported through the host's diagnostics handler,
/// which fails the build; the sites themselves are left as written.
#[plugin_transform]
pub fn process_transform(mut program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let raw = metadata.get_transform_plugin_config().unwrap_or_default();
    let config = match PluginConfig::from_json(&raw) {
        Ok(config) => config,
        Err(error) => {
            HANDLER.with(|handler| handler.err(&error.to_string()));
            return program;
        }
    };

    let host_env = metadata.get_context(&TransformPluginMetadataContextKind::Env);
    let process_vars = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    let ctx = config.resolve_context(host_env.as_deref(), process_vars);
    let sources = ImportSources::new(config.import_sources);

    let mut transform = ConditionalTransform::new(ctx, sources);
    program.visit_mut_with(&mut transform);

    for failure in transform.take_failures() {
        HANDLER.with(|handler| {
            handler
                .struct_span_err(failure.span, &failure.error.to_string())
                .emit()
        });
    }

    program
}
