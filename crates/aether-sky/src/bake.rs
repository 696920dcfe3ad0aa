//! Environment bake lifecycle.
//!
//! At most one bake is alive at any time. A rebake releases the current one
//! before capturing its replacement, so repeated parameter edits never hold
//! more than a single environment's worth of GPU memory.

use std::time::Instant;

use tracing::{debug, info};

use crate::backend::RenderBackend;
use crate::dome::SkyDome;

/// One installed environment and the rebake that produced it.
#[derive(Debug)]
pub struct Bake<E> {
    pub generation: u64,
    pub resource: E,
}

/// Owns the current environment bake.
#[derive(Debug)]
pub struct EnvironmentBaker<E> {
    current: Option<Bake<E>>,
    generation: u64,
    released: u64,
}

impl<E> EnvironmentBaker<E> {
    pub fn new() -> Self {
        Self {
            current: None,
            generation: 0,
            released: 0,
        }
    }

    /// Replace the installed environment with a fresh capture of `sky`.
    pub fn rebake<B>(&mut self, backend: &mut B, sky: &SkyDome) -> &Bake<E>
    where
        B: RenderBackend<Environment = E>,
    {
        self.release(backend);

        let start = Instant::now();
        let resource = backend.bake_environment(sky);
        backend.install_environment(&resource);
        self.generation += 1;
        info!(
            "Environment bake {} installed in {:.2}ms",
            self.generation,
            start.elapsed().as_secs_f64() * 1000.0
        );

        self.current.insert(Bake {
            generation: self.generation,
            resource,
        })
    }

    /// Free the installed environment, if any.
    pub fn release<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend<Environment = E>,
    {
        if let Some(old) = self.current.take() {
            backend.release_environment(old.resource);
            self.released += 1;
            debug!("Released environment bake {}", old.generation);
        }
    }

    pub fn current(&self) -> Option<&Bake<E>> {
        self.current.as_ref()
    }

    /// 0 before the first bake and after release, otherwise 1.
    pub fn live_bakes(&self) -> usize {
        usize::from(self.current.is_some())
    }

    /// Number of bakes produced so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of bakes released so far.
    pub fn released(&self) -> u64 {
        self.released
    }
}

impl<E> Default for EnvironmentBaker<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SceneView;
    use crate::water::WaterSurface;
    use aether_render::TextureImage;

    /// Counts live resources the way a GPU allocator would.
    #[derive(Default)]
    struct CountingBackend {
        next_id: u32,
        live: Vec<u32>,
        installed: Option<u32>,
        peak_live: usize,
    }

    impl RenderBackend for CountingBackend {
        type Environment = u32;
        type Error = String;

        fn upload_materials(&mut self, _: &SkyDome, _: &WaterSurface) {}

        fn bake_environment(&mut self, _: &SkyDome) -> u32 {
            self.next_id += 1;
            self.live.push(self.next_id);
            self.peak_live = self.peak_live.max(self.live.len());
            self.next_id
        }

        fn release_environment(&mut self, id: u32) {
            self.live.retain(|&l| l != id);
            if self.installed == Some(id) {
                self.installed = None;
            }
        }

        fn install_environment(&mut self, id: &u32) {
            self.installed = Some(*id);
        }

        fn render(&mut self, _: &SceneView<'_>) -> Result<(), String> {
            Ok(())
        }

        fn resize(&mut self, _: u32, _: u32) {}
    }

    fn sky() -> SkyDome {
        SkyDome::new(TextureImage::tiling_noise(4, 0), None)
    }

    #[test]
    fn test_first_bake_installs() {
        let mut backend = CountingBackend::default();
        let mut baker = EnvironmentBaker::new();
        let bake = baker.rebake(&mut backend, &sky());
        assert_eq!(bake.generation, 1);
        assert_eq!(bake.resource, 1);
        assert_eq!(backend.installed, Some(1));
        assert_eq!(baker.live_bakes(), 1);
        assert_eq!(baker.released(), 0);
    }

    #[test]
    fn test_rebake_never_holds_two() {
        let mut backend = CountingBackend::default();
        let mut baker = EnvironmentBaker::new();
        let sky = sky();
        for _ in 0..25 {
            baker.rebake(&mut backend, &sky);
            assert_eq!(backend.live.len(), 1);
        }
        assert_eq!(backend.peak_live, 1);
        assert_eq!(baker.generation(), 25);
        assert_eq!(baker.released(), 24);
        assert_eq!(backend.installed, Some(25));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut backend = CountingBackend::default();
        let mut baker = EnvironmentBaker::new();
        baker.rebake(&mut backend, &sky());
        baker.release(&mut backend);
        baker.release(&mut backend);
        assert_eq!(baker.live_bakes(), 0);
        assert_eq!(baker.released(), 1);
        assert!(backend.live.is_empty());
        assert!(baker.current().is_none());
    }
}
