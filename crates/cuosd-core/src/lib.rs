//! On-screen-display primitive compositor and box-blur redaction over
//! RGB24, RGBA32, and NV12 (block-linear or pitch-linear) surfaces.
//!
//! [`launch`] is the single entry point: it runs the blur pass (if any
//! rectangles were given) followed by the composite pass (if any commands
//! were given) and always returns, reporting failures only through the
//! `log` facade. There is nothing to poll afterward - unlike the device
//! this module's kernels are modeled on, a host call to `launch` has
//! already finished every quad and every blur rectangle by the time it
//! returns.

pub mod blend;
pub mod blur;
pub mod command;
pub mod compositor;
pub mod config;
pub mod coverage;
pub mod dispatch;
pub mod error;
pub mod surface;

pub use command::{BoundingBox, CommandBody, TextLocation};
pub use compositor::AuxInputs;
pub use config::Config;
pub use error::CuosdError;
pub use surface::{Nv12Layout, Surface, SurfaceFormat};

/// Everything one `launch` call needs beyond the destination surface and
/// the [`Config`].
pub struct LaunchRequest<'a> {
    pub commands: &'a [u8],
    pub offsets: &'a [i32],
    pub aux: AuxInputs<'a>,
    /// Union bounding box of every command in `offsets`; sizes the
    /// composite grid. Ignored if `offsets` is empty.
    pub global_bounds: BoundingBox,
    /// Launch-wide rotation/MSAA capability switch (see [`dispatch`]).
    pub have_rotate_msaa: bool,
    /// Rectangles to box-blur, each with its own odd kernel size, run
    /// before the composite pass.
    pub blur_rects: &'a [(BoundingBox, u32)],
}

/// Run one compositor launch: blur, then composite, over `surface`.
///
/// Never returns an error. Degenerate input (nothing to draw and nothing to
/// blur) is logged as a warning and is otherwise a no-op; an unexpected
/// panic inside either pass is caught, logged as an error, and the launch
/// returns with the surface left in whatever partial state the panicking
/// pass reached - there is no rollback, matching the advisory error model
/// of the GPU runtime this crate stands in for.
pub fn launch(surface: &mut Surface, request: &LaunchRequest, config: &Config) {
    if request.offsets.is_empty() && request.blur_rects.is_empty() {
        log::warn!(target: "cuosd::compositor", "{}", CuosdError::EmptyDrawList);
        return;
    }

    if !request.blur_rects.is_empty() {
        run_guarded("cuosd::blur", || {
            blur::blur(surface, request.blur_rects, config)
        });
    }

    if !request.offsets.is_empty() {
        run_guarded("cuosd::compositor", || {
            compositor::composite(
                surface,
                request.commands,
                request.offsets,
                &request.aux,
                request.global_bounds,
                request.have_rotate_msaa,
                config,
            )
        });
    }
}

/// Run `f`, catching a panic the way an asynchronous kernel-launch error
/// would be polled and logged once by the caller, with no retry.
fn run_guarded(target: &'static str, f: impl FnOnce() -> Result<(), CuosdError>) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!(target: target, "{e}"),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            let err = CuosdError::WorkerPanicked(message);
            log::error!(target: target, "{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Color, RectangleCommand};
    use crate::surface::RgbaSurface;

    #[test]
    fn launch_on_empty_request_logs_and_leaves_surface_untouched() {
        let mut data = vec![9u8; 4 * 4 * 4];
        let before = data.clone();
        let mut surface =
            Surface::Rgba(RgbaSurface { data: &mut data, width: 4, height: 4, stride: 16 });
        let request = LaunchRequest {
            commands: &[],
            offsets: &[],
            aux: AuxInputs::empty(),
            global_bounds: BoundingBox { left: 0, top: 0, right: 0, bottom: 0 },
            have_rotate_msaa: false,
            blur_rects: &[],
        };
        launch(&mut surface, &request, &Config::default());
        drop(surface);
        assert_eq!(data, before);
    }

    #[test]
    fn launch_runs_blur_before_composite() {
        let mut data = vec![0u8; 8 * 8 * 4];
        for px in data.chunks_mut(4) {
            px.copy_from_slice(&[40, 40, 40, 255]);
        }
        let mut buf = Vec::new();
        let rect = CommandBody::Rectangle(RectangleCommand {
            bounds: BoundingBox { left: 2, top: 2, right: 5, bottom: 5 },
            color: Color { r: 200, g: 0, b: 0, a: 255 },
            outer: [(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)],
            inner: [(0.0, 0.0); 4],
            thickness: -1,
            interpolation: false,
        });
        let off = rect.encode_into(&mut buf) as i32;

        let mut surface =
            Surface::Rgba(RgbaSurface { data: &mut data, width: 8, height: 8, stride: 32 });
        let request = LaunchRequest {
            commands: &buf,
            offsets: &[off],
            aux: AuxInputs::empty(),
            global_bounds: BoundingBox { left: 2, top: 2, right: 5, bottom: 5 },
            have_rotate_msaa: true,
            blur_rects: &[(BoundingBox { left: 0, top: 0, right: 7, bottom: 7 }, 3)],
        };
        launch(&mut surface, &request, &Config::default());

        assert_eq!(surface.sample_rgb(3, 3), [200, 0, 0]);
    }
}
