//! The per-frame driver and the single parameter-change entry point.
//!
//! Two paths mutate the scene:
//!
//! * [`OrchestrationLoop::frame`] runs once per display refresh. It advances
//!   the clock, animates the prop, pushes the time uniforms and renders.
//!   It never touches parameters or the environment bake.
//! * [`OrchestrationLoop::apply_parameters`] runs after any batch of edits.
//!   It solves the sun, rebuilds the uniform snapshot, uploads the materials
//!   and rebakes the environment synchronously, so the following frame may
//!   stall by the cost of one bake.

use std::time::Duration;

use aether_config::WaterClock;
use aether_render::Camera;
use glam::Vec3;
use tracing::{debug, info, warn};

use crate::backend::{RenderBackend, SceneView};
use crate::bake::EnvironmentBaker;
use crate::clock::AnimationClock;
use crate::dome::SkyDome;
use crate::overlay::FrameObserver;
use crate::params::ParameterSet;
use crate::prop::DecorativeProp;
use crate::sun::sun_direction;
use crate::uniforms::UniformSnapshot;
use crate::water::WaterSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Everything the loop owns, built once at startup.
pub struct RenderContext<B: RenderBackend> {
    pub backend: B,
    pub camera: Camera,
    pub params: ParameterSet,
    pub sky: SkyDome,
    pub water: WaterSurface,
    pub prop: DecorativeProp,
    pub clock: AnimationClock,
    pub observer: Option<Box<dyn FrameObserver>>,
}

impl<B: RenderBackend> RenderContext<B> {
    /// A context with default parameters, a resting prop and no observer.
    pub fn new(
        backend: B,
        camera: Camera,
        sky: SkyDome,
        water: WaterSurface,
        water_clock: WaterClock,
    ) -> Self {
        Self {
            backend,
            camera,
            params: ParameterSet::default(),
            sky,
            water,
            prop: DecorativeProp::new(),
            clock: AnimationClock::new(water_clock),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn FrameObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

pub struct OrchestrationLoop<B: RenderBackend> {
    ctx: RenderContext<B>,
    baker: EnvironmentBaker<B::Environment>,
    snapshot: UniformSnapshot,
    sun: Vec3,
    state: LoopState,
}

impl<B: RenderBackend> OrchestrationLoop<B> {
    pub fn new(ctx: RenderContext<B>) -> Self {
        let sun = sun_direction(ctx.params.sun.elevation, ctx.params.sun.azimuth);
        let snapshot = UniformSnapshot::bind(&ctx.params, sun);
        Self {
            ctx,
            baker: EnvironmentBaker::new(),
            snapshot,
            sun,
            state: LoopState::Idle,
        }
    }

    /// Enter `Running` and apply the initial parameters, producing the first bake.
    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            return;
        }
        let params = self.ctx.params.clone();
        self.apply_parameters(params);
        self.state = LoopState::Running;
        info!("Orchestration loop running");
    }

    /// One display refresh. `elapsed` is wall-clock time since start.
    ///
    /// Render failures are returned after the observer has seen the frame;
    /// the loop itself keeps running.
    pub fn frame(&mut self, elapsed: Duration) -> Result<(), B::Error> {
        if self.state == LoopState::Idle {
            self.start();
        }

        let ctx = &mut self.ctx;
        ctx.clock.tick(elapsed);
        let sky_time = ctx.clock.elapsed_seconds() as f32;
        ctx.prop.animate(sky_time);
        ctx.sky.set_time(sky_time);
        ctx.water.set_time(ctx.clock.water_time() as f32);

        let result = ctx.backend.render(&SceneView {
            camera: &ctx.camera,
            sky: &ctx.sky,
            water: &ctx.water,
            prop: &ctx.prop,
        });
        if let Err(e) = &result {
            warn!("Frame {} not rendered: {e}", ctx.clock.frame_count());
        }

        if let Some(observer) = ctx.observer.as_mut() {
            observer.on_frame(elapsed);
        }
        result
    }

    /// Make `params` current: solve the sun, rebind every uniform and rebake the environment.
    pub fn apply_parameters(&mut self, params: ParameterSet) {
        self.sun = sun_direction(params.sun.elevation, params.sun.azimuth);
        self.snapshot = UniformSnapshot::bind(&params, self.sun);
        self.ctx.params = params;
        debug!(
            "Applying parameters, sun ({:.3}, {:.3}, {:.3})",
            self.sun.x, self.sun.y, self.sun.z
        );

        let ctx = &mut self.ctx;
        ctx.sky.apply(&self.snapshot);
        ctx.water.apply(&self.snapshot);
        ctx.backend.upload_materials(&ctx.sky, &ctx.water);
        self.baker.rebake(&mut ctx.backend, &ctx.sky);
    }

    /// The viewport is now `width` x `height` physical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.camera.set_aspect_ratio(width as f32, height as f32);
        self.ctx.backend.resize(width, height);
    }

    /// Release the environment bake and hand back the context.
    pub fn shutdown(mut self) -> RenderContext<B> {
        self.baker.release(&mut self.ctx.backend);
        info!(
            "Orchestration loop stopped after {} frames",
            self.ctx.clock.frame_count()
        );
        self.ctx
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn params(&self) -> &ParameterSet {
        &self.ctx.params
    }

    pub fn snapshot(&self) -> &UniformSnapshot {
        &self.snapshot
    }

    pub fn sun_direction(&self) -> Vec3 {
        self.sun
    }

    pub fn context(&self) -> &RenderContext<B> {
        &self.ctx
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.ctx.backend
    }

    pub fn baker(&self) -> &EnvironmentBaker<B::Environment> {
        &self.baker
    }
}
