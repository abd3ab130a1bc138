use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use coordinator::{AnimationCoordinator, MotionPreference, ReadySource, ScrollFade};
use renderer::{time_source, GpuState, RendererSlot, WaveConfig, WaveRenderer};
use tracing::{debug, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::run::RunConfig;

/// Pixels scrolled per wheel notch when the platform reports line deltas.
const LINE_SCROLL_PIXELS: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostAction {
    ToggleColor,
    ToggleMotion,
    Quit,
}

fn action_for_key(key: &Key) -> Option<HostAction> {
    match key {
        Key::Named(NamedKey::Escape) => Some(HostAction::Quit),
        Key::Character(value) => match value.to_ascii_lowercase().as_str() {
            "c" => Some(HostAction::ToggleColor),
            "m" => Some(HostAction::ToggleMotion),
            _ => None,
        },
        _ => None,
    }
}

/// Converts a wheel event into a page scroll offset change (positive = down).
fn scroll_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_SCROLL_PIXELS,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    }
}

fn log_landing(coordinator: &AnimationCoordinator, source: ReadySource) {
    for element in coordinator.timing().elements() {
        let style = coordinator.element_style(&element.id);
        debug!(
            element = %element.id,
            visibility = ?style.visibility,
            delay_ms = style.delay.as_millis() as u64,
            duration_ms = style.duration.as_millis() as u64,
            "landing element transition"
        );
    }
    debug!(
        ?source,
        total_ms = coordinator.total_animation_time().as_millis() as u64,
        "landing sequence released"
    );
}

/// Opens the window and drives the renderer and coordinator until it closes.
pub fn run(config: RunConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.surface_size;
    let window = WindowBuilder::new()
        .with_title("wavefield")
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let preference = MotionPreference::new(config.reduced_motion);
    let mut scroll = ScrollFade::default();
    scroll.set_reduced_motion(config.reduced_motion);
    let mut clock = time_source(config.fixed_time);

    let mut slot: RendererSlot<GpuState> = RendererSlot::new();
    let options = config.gpu;
    let mode = config.mode;
    let completion = slot
        .init_with(|| WaveRenderer::new(|| GpuState::new(window.clone(), options), mode))
        .and_then(|renderer| {
            if config.fixed_time.is_some() {
                renderer.anchor_at(Duration::ZERO);
            }
            renderer.set_reduced_motion(config.reduced_motion);
            renderer.start();
            renderer.is_active().then(|| renderer.subscribe())
        });

    let mut coordinator =
        AnimationCoordinator::new(config.timing.clone(), WaveConfig::STANDARD.total_duration());
    if let Some(source) = coordinator.activate(Instant::now(), preference.watch(), completion) {
        log_landing(&coordinator, source);
    }

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match action_for_key(&event.logical_key) {
                    Some(HostAction::ToggleColor) => {
                        if let Some(renderer) = slot.get_mut() {
                            let next = renderer.color_mode().toggled();
                            renderer.set_color_mode(next);
                            info!(mode = %next, "color mode toggled");
                        }
                    }
                    Some(HostAction::ToggleMotion) => {
                        let reduced = preference.toggle();
                        scroll.set_reduced_motion(reduced);
                        if let Some(renderer) = slot.get_mut() {
                            renderer.set_reduced_motion(reduced);
                        }
                        info!(reduced, "reduced motion toggled");
                    }
                    Some(HostAction::Quit) => elwt.exit(),
                    None => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let opacity = scroll.scroll_by(scroll_delta(delta));
                debug!(offset = scroll.offset(), opacity, "navigation opacity");
            }
            WindowEvent::Resized(_) => {
                if let Some(renderer) = slot.get_mut() {
                    renderer.resize();
                }
            }
            WindowEvent::RedrawRequested => {
                let sample = clock.sample();
                if let Some(renderer) = slot.get_mut() {
                    renderer.render(sample.timestamp);
                }
                if let Some(source) = coordinator.poll(Instant::now()) {
                    log_landing(&coordinator, source);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            if let Some(source) = coordinator.poll(Instant::now()) {
                log_landing(&coordinator, source);
            }
            match coordinator.next_deadline() {
                Some(deadline) => elwt.set_control_flow(ControlFlow::WaitUntil(deadline)),
                None => elwt.set_control_flow(ControlFlow::Wait),
            }
        }
        Event::LoopExiting => {
            slot.shutdown();
            coordinator.deactivate();
            info!("wavefield shutting down");
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(
            action_for_key(&Key::Named(NamedKey::Escape)),
            Some(HostAction::Quit)
        );
        assert_eq!(
            action_for_key(&Key::Character("c".into())),
            Some(HostAction::ToggleColor)
        );
        assert_eq!(
            action_for_key(&Key::Character("M".into())),
            Some(HostAction::ToggleMotion)
        );
        assert_eq!(action_for_key(&Key::Character("x".into())), None);
        assert_eq!(action_for_key(&Key::Named(NamedKey::Space)), None);
    }

    #[test]
    fn wheel_down_scrolls_page_down() {
        assert_eq!(scroll_delta(MouseScrollDelta::LineDelta(0.0, -1.0)), 40.0);
        assert_eq!(scroll_delta(MouseScrollDelta::LineDelta(0.0, 2.0)), -80.0);
        assert_eq!(
            scroll_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -12.5))),
            12.5
        );
    }
}
