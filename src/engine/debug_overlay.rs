// egui debug overlay: stats panel (F3), per-ant velocity arrows (F4), and
// a steering tuner (F6). The tuner exists because the steering constants
// were hand-tuned, not derived — see `steering::SteeringParams`.

use egui::epaint::Shadow;

use super::steering::SteeringParams;

pub struct DebugStats {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub frame_time_min_ms: f32,
    pub frame_time_max_ms: f32,
    pub ant_count: usize,
    pub scroll_progress: f32,
    pub camera_position: (f32, f32, f32),
    pub camera_fov_deg: f32,
    pub resolution: (u32, u32),
}

/// One ant's debug draw data, already projected to egui screen points.
pub struct AntArrowDraw {
    /// Ant centre in egui screen points.
    pub pos: egui::Pos2,
    /// Tip of the velocity arrow (0.5 s ahead) in egui screen points.
    pub vel_tip: egui::Pos2,
}

pub struct DebugOverlay {
    pub stats_visible: bool,
    pub arrows_visible: bool,
    pub tuner_visible: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl DebugOverlay {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        // Style: dark, semi-transparent, small monospace white font
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(0, 0, 0, 180);
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_visuals(visuals);

        let mut style = (*egui_ctx.style()).clone();
        style.override_font_id = Some(egui::FontId::monospace(13.0));
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // no depth
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            stats_visible: false,
            arrows_visible: false,
            tuner_visible: false,
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Render one egui frame covering all enabled debug layers. The tuner
    /// edits `params` in place; changes take effect the next sim tick.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        stats: &DebugStats,
        ant_draws: &[AntArrowDraw],
        params: &mut SteeringParams,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let stats_visible = self.stats_visible;
        let arrows_visible = self.arrows_visible;
        let tuner_visible = self.tuner_visible;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            // ── F4: velocity arrows on a background layer ─────────────────
            if arrows_visible && !ant_draws.is_empty() {
                let painter = ctx.layer_painter(egui::LayerId::new(
                    egui::Order::Background,
                    egui::Id::new("ant_arrows"),
                ));
                let vel_stroke = egui::Stroke::new(
                    2.0,
                    egui::Color32::from_rgba_unmultiplied(80, 255, 140, 220),
                );
                for draw in ant_draws {
                    painter.line_segment([draw.pos, draw.vel_tip], vel_stroke);
                    painter.circle_filled(
                        draw.vel_tip,
                        2.5,
                        egui::Color32::from_rgba_unmultiplied(80, 255, 140, 220),
                    );
                }
            }

            // ── F3: stats panel ───────────────────────────────────────────
            if stats_visible {
                egui::Area::new(egui::Id::new("debug_overlay"))
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .show(ctx, |ui| {
                        egui::Frame::none()
                            .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 180))
                            .inner_margin(egui::Margin::same(8.0))
                            .rounding(4.0)
                            .show(ui, |ui: &mut egui::Ui| {
                                ui.label(format!("FPS: {}", stats.fps));
                                ui.label(format!(
                                    "Frame: {:.2} ms (min: {:.1} | max: {:.1})",
                                    stats.frame_time_avg_ms,
                                    stats.frame_time_min_ms,
                                    stats.frame_time_max_ms
                                ));
                                ui.label(format!("Ants: {}", stats.ant_count));
                                ui.label(format!("Scroll: {:.3}", stats.scroll_progress));
                                ui.label(format!(
                                    "Camera: ({:.1}, {:.1}, {:.1})  fov {:.1}°",
                                    stats.camera_position.0,
                                    stats.camera_position.1,
                                    stats.camera_position.2,
                                    stats.camera_fov_deg
                                ));
                                ui.label(format!(
                                    "Resolution: {} x {}",
                                    stats.resolution.0, stats.resolution.1
                                ));
                            });
                    });
            }

            // ── F6: steering tuner ────────────────────────────────────────
            if tuner_visible {
                egui::Window::new("steering")
                    .default_pos(egui::pos2(10.0, 180.0))
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.add(
                            egui::Slider::new(&mut params.separation_radius, 0.05..=1.0)
                                .text("separation radius"),
                        );
                        ui.add(
                            egui::Slider::new(&mut params.separation_strength, 0.0..=2.0)
                                .text("separation strength"),
                        );
                        ui.add(
                            egui::Slider::new(&mut params.seek_weight_cap, 0.0..=3.0)
                                .text("seek weight cap"),
                        );
                        ui.add(
                            egui::Slider::new(&mut params.seek_falloff, 0.1..=2.0)
                                .text("seek falloff"),
                        );
                        ui.add(
                            egui::Slider::new(&mut params.jitter, 0.0..=0.05).text("jitter"),
                        );
                        if ui.button("reset").clicked() {
                            *params = SteeringParams::default();
                        }
                    });
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
