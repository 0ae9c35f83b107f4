//! Canvas 2D render surface.

use std::f64::consts::TAU;

use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use super::frame::{Frame, Segment, Sprite};
use super::surface::{
    Blending, GeometryDesc, GeometryId, GeometryKind, MaterialDesc, MaterialId, RenderSurface,
    ResourceSlots,
};
use crate::error::EngineError;
use crate::interaction::Viewport;

/// Connection line width in CSS pixels.
const LINE_WIDTH: f64 = 1.0;

/// A `<canvas>` appended to the container.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    pixel_ratio: f64,
    viewport: Viewport,
    geometries: ResourceSlots<GeometryDesc>,
    materials: ResourceSlots<MaterialDesc>,
    blending: Option<Blending>,
}

impl CanvasSurface {
    /// Create the canvas, acquire its 2D context and append it to `container`.
    pub fn mount(
        document: &Document,
        container: &HtmlElement,
        viewport: Viewport,
        pixel_ratio: f64,
    ) -> Result<Self, EngineError> {
        let canvas = document
            .create_element("canvas")
            .map_err(|e| EngineError::from_js("createElement", &e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EngineError::SurfaceUnavailable)?;

        let style = canvas.style();
        for (property, value) in [("display", "block"), ("pointer-events", "none")] {
            style
                .set_property(property, value)
                .map_err(|e| EngineError::from_js("style", &e))?;
        }

        let context = canvas
            .get_context("2d")
            .map_err(|e| EngineError::from_js("getContext", &e))?
            .ok_or(EngineError::SurfaceUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::SurfaceUnavailable)?;

        container
            .append_child(&canvas)
            .map_err(|e| EngineError::from_js("appendChild", &e))?;

        let mut surface = Self {
            canvas,
            context,
            pixel_ratio,
            viewport,
            geometries: ResourceSlots::new(),
            materials: ResourceSlots::new(),
            blending: None,
        };
        surface.resize(viewport);
        Ok(surface)
    }

    fn apply_blending(&mut self, blending: Blending) -> Result<(), EngineError> {
        if self.blending != Some(blending) {
            self.context
                .set_global_composite_operation(blending.composite_operation())
                .map_err(|e| EngineError::from_js("globalCompositeOperation", &e))?;
            self.blending = Some(blending);
        }
        Ok(())
    }

    fn draw_segment(&mut self, segment: &Segment) -> Result<(), EngineError> {
        let Some(material) = self.materials.get(segment.material.0).copied() else {
            return Ok(());
        };
        self.apply_blending(material.blending)?;
        let ctx = &self.context;
        ctx.set_stroke_style_str(&segment.color.to_css(segment.opacity));
        ctx.begin_path();
        ctx.move_to(segment.from.x as f64, segment.from.y as f64);
        ctx.line_to(segment.to.x as f64, segment.to.y as f64);
        ctx.stroke();
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: &Sprite) -> Result<(), EngineError> {
        let (Some(material), Some(geometry)) = (
            self.materials.get(sprite.material.0).copied(),
            self.geometries.get(sprite.geometry.0).copied(),
        ) else {
            return Ok(());
        };
        if sprite.radius <= 0.0 {
            return Ok(());
        }
        self.apply_blending(material.blending)?;

        let ctx = &self.context;
        let (x, y, r) = (
            sprite.center.x as f64,
            sprite.center.y as f64,
            sprite.radius as f64,
        );
        ctx.set_fill_style_str(&material.color.to_css(material.opacity));
        ctx.begin_path();
        match geometry.kind {
            // An unsubdivided icosahedron reads as a hexagon on screen.
            GeometryKind::Icosahedron { detail: 0 } => {
                ctx.move_to(x + r, y);
                for k in 1..6 {
                    let angle = TAU * k as f64 / 6.0;
                    ctx.line_to(x + r * angle.cos(), y + r * angle.sin());
                }
                ctx.close_path();
            }
            _ => ctx
                .arc(x, y, r, 0.0, TAU)
                .map_err(|e| EngineError::from_js("arc", &e))?,
        }
        ctx.fill();
        Ok(())
    }
}

impl RenderSurface for CanvasSurface {
    fn create_geometry(&mut self, desc: &GeometryDesc) -> Result<GeometryId, EngineError> {
        Ok(GeometryId(self.geometries.insert(*desc)))
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialId, EngineError> {
        Ok(MaterialId(self.materials.insert(*desc)))
    }

    fn release_geometry(&mut self, id: GeometryId) {
        self.geometries.remove(id.0);
    }

    fn release_material(&mut self, id: MaterialId) {
        self.materials.remove(id.0);
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport.is_degenerate() {
            return;
        }
        self.viewport = viewport;
        let ratio = self.pixel_ratio;
        self.canvas
            .set_width((viewport.width as f64 * ratio).round() as u32);
        self.canvas
            .set_height((viewport.height as f64 * ratio).round() as u32);

        let style = self.canvas.style();
        for (property, pixels) in [("width", viewport.width), ("height", viewport.height)] {
            if let Err(e) = style.set_property(property, &format!("{pixels}px")) {
                warn!(error = ?e, property, "canvas style update failed");
            }
        }

        // Resizing resets context state.
        if let Err(e) = self.context.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            warn!(error = ?e, ratio, "setTransform failed");
        }
        self.context.set_line_width(LINE_WIDTH);
        self.blending = None;
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), EngineError> {
        self.context.clear_rect(
            0.0,
            0.0,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
        for segment in &frame.segments {
            self.draw_segment(segment)?;
        }
        for sprite in &frame.sprites {
            self.draw_sprite(sprite)?;
        }
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }

    fn detach(&mut self) {
        self.canvas.remove();
        self.geometries.clear();
        self.materials.clear();
    }
}
