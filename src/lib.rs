#![doc = r#"
POLARPRO — polar radar capture to Cartesian PNG renderer.

This crate decodes WAMOS II style polar captures (`.pol`: a textual key/value header
followed by a binary grid of azimuth x range samples), resamples them onto a square
Cartesian raster and writes a lossless PNG with the original header embedded as a
`tEXt` chunk. It powers the `polarpro` CLI and can be embedded in your own Rust
applications.

Quick start: render a capture to a file
---------------------------------------
```rust,no_run
use std::path::Path;

fn main() -> polarpro::Result<()> {
    let image = polarpro::decode(Path::new("/data/scan_0001.pol"))?;
    println!("{} rays, owner {:?}", image.grid().azimuth_count(), polarpro::get(&image, "owner"));

    // north up, clockwise sweep
    let raster = polarpro::render(&image, true, true)?;
    polarpro::save_with_metadata(&image, &raster, Path::new("Output/scan_0001.png"))
}
```

Render parameters
-----------------
```rust,no_run
use std::path::Path;
use polarpro::{FillPolicy, RenderParams};

fn main() -> polarpro::Result<()> {
    let image = polarpro::decode(Path::new("/data/scan_0001.pol"))?;
    let params = RenderParams {
        orient: true,
        fill: FillPolicy::Nearest,
        pixel_size: Some(7.5),
        blind_range: true,
        ..RenderParams::default()
    };
    let raster = polarpro::render_with_params(&image, &params)?;
    println!("{}x{}", raster.width(), raster.height());
    Ok(())
}
```

Reading metadata back
---------------------
```rust,no_run
use std::path::Path;

fn main() -> polarpro::Result<()> {
    let (header, raster) = polarpro::load_with_metadata(Path::new("Output/scan_0001.png"))?;
    for attribute in header.iter() {
        println!("{} = {} ({})", attribute.name, attribute.raw, attribute.description);
    }
    println!("{} pixels", raster.width() * raster.height());
    Ok(())
}
```

Error handling
--------------
All public functions return `polarpro::Result<T>`; match on `polarpro::Error` to handle
specific cases.

```rust,no_run
use std::path::Path;
use polarpro::Error;

fn main() {
    match polarpro::decode(Path::new("/bad/capture.pol")) {
        Ok(_) => {}
        Err(Error::MalformedHeader { attribute, reason }) => eprintln!("{attribute} {reason}"),
        Err(Error::TruncatedFile { expected, actual }) => {
            eprintln!("short file: {actual} of {expected} bytes")
        }
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`types`] — shared enums (`BitDepth`, `ByteOrder`, `FillPolicy`, `OrientationConfig`).
- [`io`] — attribute directory, capture decoding and PNG writers.
- [`core`] — render parameters, resampler and raster.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::RenderParams;
pub use core::raster::CartesianRaster;
pub use error::{Error, Result};
pub use types::{BitDepth, ByteOrder, FillPolicy, OrientationConfig};

// Decoding
pub use io::directory::{AttributeCategory, AttributeDirectory};
pub use io::header::{AttributeValue, Header, HeaderAttribute, HeaderLayout};
pub use io::polar::PolarImage;
pub use io::samples::SampleGrid;

// High-level API re-exports
pub use api::{
    BatchReport, decode, decode_with_directory, default_output_path, describe, get,
    load_with_metadata, process_directory_to_path, process_file_to_path, render,
    render_with_params, save_with_metadata,
};
