use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pcx2tga")]
#[command(about = "Convert PCX images to uncompressed TGA")]
#[command(version)]
pub struct Args {
    /// PCX file to decode
    pub input: PathBuf,

    /// Output TGA path (defaults to the input path with a .tga extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Flip the image vertically while decoding
    #[arg(long)]
    pub flip: bool,

    /// Force the output channel count (1-4)
    #[arg(long, value_name = "N")]
    pub components: Option<u8>,

    /// Knock out opaque-black pixels (requires 4 output components)
    #[arg(long)]
    pub matte: bool,

    /// Also write the palette-index stencil mask to this path
    #[arg(long, value_name = "PATH")]
    pub stencil: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.input.with_extension("tga"),
        }
    }
}
