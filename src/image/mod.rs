pub mod f32;
pub mod io;
pub mod rgb;

pub use self::f32::ImageF32;
pub use self::io::{save_grayscale_f32, write_json_file};
pub use self::rgb::RgbImageU8;
