mod args;

use anyhow::{bail, Context, Result};
use args::Args;
use clap::Parser;
use tracing::info;

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pcx2tga={log_level},pcx_codec=info").into()),
        )
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    // The matte pass inspects the alpha byte, so it only makes sense on
    // 4-component output.
    let components = if args.matte {
        match args.components {
            Some(4) | None => Some(4),
            Some(n) => bail!("--matte requires 4 output components, got {n}"),
        }
    } else {
        args.components
    };

    let image = pcx_codec::decode_file(&args.input, args.flip, components)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;

    info!(
        "decoded {}: {}x{}, {} components",
        args.input.display(),
        image.width,
        image.height,
        image.components
    );

    let width = u16::try_from(image.width).context("image too wide for a TGA container")?;
    let height = u16::try_from(image.height).context("image too tall for a TGA container")?;

    let tga = if args.matte {
        tga_output::wrap_black_matte(&image.pixels, width, height)
    } else {
        tga_output::wrap_truecolor(&image.pixels, width, height, image.components)
    }
    .context("failed to build TGA container")?;

    let output = args.output_path();
    std::fs::write(&output, &tga)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("wrote {} ({} bytes)", output.display(), tga.len());

    if let Some(stencil_path) = &args.stencil {
        let stencil = tga_output::stencil_from_indices(&image.palette_indices, width, height)
            .context("failed to build stencil mask")?;
        std::fs::write(stencil_path, &stencil)
            .with_context(|| format!("failed to write {}", stencil_path.display()))?;
        info!("wrote {} ({} bytes)", stencil_path.display(), stencil.len());
    }

    Ok(())
}
