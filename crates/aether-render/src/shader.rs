//! WGSL program lookup and module caching.
//!
//! Programs are resolved by name. Built-in sources are registered at startup
//! (embedded with `include_str!`); a shader directory, when configured,
//! takes precedence so programs can be edited without rebuilding.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("shader '{name}' has no built-in source")]
    NotRegistered { name: String },

    #[error("shader '{name}' is empty")]
    Empty { name: String },

    #[error("shader '{name}' failed validation: {message}")]
    Invalid { name: String, message: String },
}

/// A resolved WGSL program: vertex and fragment (or compute) stages in one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    pub name: String,
    pub source: Arc<str>,
}

/// Registry of WGSL sources and the modules compiled from them.
#[derive(Default)]
pub struct ShaderLibrary {
    builtin: HashMap<String, &'static str>,
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<name>.wgsl` from `dir` instead of the built-in sources.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    /// Register an embedded source under `name`.
    pub fn register_builtin(&mut self, name: &str, source: &'static str) {
        self.builtin.insert(name.to_string(), source);
    }

    /// Resolve the source text for `name`.
    pub fn program(&self, name: &str) -> Result<ShaderProgram, ShaderError> {
        let source: Arc<str> = match &self.shader_dir {
            Some(dir) => {
                let path = dir.join(format!("{name}.wgsl"));
                debug!("Loading shader '{}' from {}", name, path.display());
                if !path.exists() {
                    return Err(ShaderError::FileNotFound { path });
                }
                std::fs::read_to_string(&path)?.into()
            }
            None => self
                .builtin
                .get(name)
                .copied()
                .ok_or_else(|| ShaderError::NotRegistered {
                    name: name.to_string(),
                })?
                .into(),
        };

        if source.trim().is_empty() {
            return Err(ShaderError::Empty {
                name: name.to_string(),
            });
        }

        Ok(ShaderProgram {
            name: name.to_string(),
            source,
        })
    }

    /// Compile `program`, replacing any module cached under the same name.
    ///
    /// Validation runs inside an error scope, so malformed WGSL comes back
    /// as [`ShaderError::Invalid`] and leaves the cache untouched.
    pub fn compile(
        &mut self,
        device: &wgpu::Device,
        program: &ShaderProgram,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&program.name),
            source: wgpu::ShaderSource::Wgsl(program.source.as_ref().into()),
        });
        if let Some(error) = pollster::block_on(scope.pop()) {
            return Err(ShaderError::Invalid {
                name: program.name.clone(),
                message: error.to_string(),
            });
        }

        let module = Arc::new(module);
        if self
            .modules
            .insert(program.name.clone(), module.clone())
            .is_some()
        {
            info!("Replaced shader '{}'", program.name);
        } else {
            info!("Compiled shader '{}'", program.name);
        }
        Ok(module)
    }

    /// Resolve and compile in one step.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        name: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let program = self.program(name)?;
        self.compile(device, &program)
    }

    /// A previously compiled module.
    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }
}
