pub mod blend;
pub mod blitter;
pub mod framebuffer;
