/// Failure kinds raised while preparing or running a compositor launch.
///
/// None of these ever cross the public [`crate::launch`] boundary as an
/// [`Err`] — they are logged and the launch returns quietly, matching the
/// advisory error model of the surface it emulates. They exist as a type so
/// the internal helpers that *can* fail have one place to report through
/// before `launch` catches and logs them.
#[derive(Debug, thiserror::Error)]
pub enum CuosdError {
    /// The command or auxiliary buffers were empty and there was nothing to
    /// draw or blur.
    #[error("empty draw list: no commands and no blur rectangles")]
    EmptyDrawList,

    /// A surface format tag outside the four enumerated kinds.
    #[error("unsupported surface format tag: {0}")]
    UnsupportedFormat(u32),

    /// The composite grid's bounding box collapsed to nothing (right < left
    /// or bottom < top) once rounded to quad granularity.
    #[error("degenerate composite bounding box: {left},{top} .. {right},{bottom}")]
    DegenerateBoundingBox { left: i32, top: i32, right: i32, bottom: i32 },

    /// An offset in the command offsets table does not point at a complete,
    /// well-formed command header.
    #[error("malformed command at offset {offset} (buffer length {buffer_len})")]
    MalformedCommand { offset: usize, buffer_len: usize },

    /// A command's `type` tag is not one of the known variants.
    #[error("unknown command kind tag {0}")]
    UnknownCommandKind(u8),

    /// `line_location_base` referenced a range outside the text-location
    /// array.
    #[error("text location range [{begin}, {end}) out of bounds (len {len})")]
    TextLocationOutOfBounds { begin: usize, end: usize, len: usize },

    /// A worker task panicked while processing a quad or a blur rectangle.
    /// This stands in for the asynchronous kernel-launch failures of the
    /// original GPU runtime: unexpected, not retried, surfaced once.
    #[error("compositor worker panicked: {0}")]
    WorkerPanicked(String),
}
