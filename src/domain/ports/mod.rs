mod image_port;
mod item_service_port;

pub use image_port::{ImageDecoderPort, ImageTransportPort};
pub use item_service_port::ItemServicePort;
